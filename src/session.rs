// src/session.rs
//
// One interactive tremolo session.
//
// Wires gesture samples through the crossing estimator into a fresh
// oscillator, keeps the modulation loop pointed at the latest oscillator,
// and fires haptic feedback for every sample.

use std::sync::Arc;

use log::{debug, error, info};

use crate::clock::{Clock, MonotonicClock};
use crate::config::EngineConfig;
use crate::estimator::{CrossingEstimator, EstimateUpdate, estimate_depth};
use crate::gesture::{GestureSample, Viewport};
use crate::haptics::{HapticBridge, HapticCapability, HapticOutcome, HapticPattern};
use crate::modulation_loop::{ModulationError, ModulationLoop};
use crate::oscillator::{Oscillator, OscillatorParams};
use crate::volume::VolumeTarget;

/// What a single gesture sample changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutcome {
    /// New frequency estimate, if a crossing produced one.
    pub estimate: Option<EstimateUpdate>,
    /// New depth, if the sample was in the depth strip.
    pub depth: Option<f64>,
    /// Whether a fresh oscillator was installed.
    pub reconfigured: bool,
    pub haptic: HapticOutcome,
}

pub struct TremoloSession {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    viewport: Viewport,
    estimator: CrossingEstimator,
    modulation: ModulationLoop,
    haptics: HapticBridge,
    volume: Arc<dyn VolumeTarget>,
    frequency: f64,
    amplitude: f64,
    playing: bool,
}

impl TremoloSession {
    pub fn new(
        config: EngineConfig,
        volume: Arc<dyn VolumeTarget>,
        haptics: Box<dyn HapticCapability>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = config.sanitized();
        let viewport = Viewport::default();
        Self {
            estimator: CrossingEstimator::with_decay_window(
                viewport.midline(),
                config.decay_window,
            ),
            modulation: ModulationLoop::new(config.tick_interval),
            haptics: HapticBridge::new(haptics),
            frequency: config.initial_frequency,
            amplitude: config.initial_amplitude,
            playing: false,
            config,
            clock,
            viewport,
            volume,
        }
    }

    /// Default configuration on the wall clock.
    pub fn with_defaults(
        volume: Arc<dyn VolumeTarget>,
        haptics: Box<dyn HapticCapability>,
    ) -> Self {
        Self::new(
            EngineConfig::default(),
            volume,
            haptics,
            Arc::new(MonotonicClock::new()),
        )
    }

    // ───────────────────────────────────────────────────────────────
    // Lifecycle
    // ───────────────────────────────────────────────────────────────

    /// Begin modulating with the current frequency and depth.
    pub fn start(&mut self) -> Result<(), ModulationError> {
        let oscillator = self.build_oscillator();
        self.modulation.arm(oscillator, Arc::clone(&self.volume))?;
        self.playing = true;
        info!(
            "tremolo session started at {:.2} Hz, depth {:.2}",
            self.frequency, self.amplitude
        );
        Ok(())
    }

    /// Stop modulating and forget gesture history. Returns once the loop has
    /// stopped; safe to call repeatedly.
    pub fn stop(&mut self) {
        self.modulation.disarm();
        self.estimator.reset();
        if self.playing {
            self.playing = false;
            info!("tremolo session stopped");
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    // ───────────────────────────────────────────────────────────────
    // Gesture Input
    // ───────────────────────────────────────────────────────────────

    /// Follow a resize of the interaction surface.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.estimator.set_midline(viewport.midline());
    }

    /// Process one pointer sample. Ignored (returns `None`) while stopped.
    pub fn on_gesture(&mut self, sample: GestureSample) -> Option<GestureOutcome> {
        if !self.playing {
            return None;
        }

        let estimate = self.estimator.observe(sample.y, sample.timestamp);
        if let Some(update) = estimate {
            self.frequency = update.frequency;
        }

        let depth = estimate_depth(&sample, &self.viewport);
        if let Some(depth) = depth {
            self.amplitude = depth;
        }

        let reconfigured = (estimate.is_some() || depth.is_some()) && self.reconfigure();
        let haptic = self.haptics.trigger(self.frequency, self.amplitude);

        Some(GestureOutcome {
            estimate,
            depth,
            reconfigured,
            haptic,
        })
    }

    /// Play one of the fixed patterns outside the modulation feedback path.
    pub fn play_pattern(&mut self, pattern: &HapticPattern) -> HapticOutcome {
        self.haptics.play_pattern(pattern)
    }

    // ───────────────────────────────────────────────────────────────
    // State Access
    // ───────────────────────────────────────────────────────────────

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn volume(&self) -> &Arc<dyn VolumeTarget> {
        &self.volume
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    fn build_oscillator(&self) -> Arc<Oscillator> {
        let params = OscillatorParams {
            frequency: self.frequency,
            amplitude: self.amplitude,
            offset: self.config.oscillator_offset,
            waveform: self.config.waveform,
        };
        Arc::new(Oscillator::new(params, Arc::clone(&self.clock)))
    }

    fn reconfigure(&mut self) -> bool {
        debug!(
            "reconfiguring oscillator: {:.2} Hz, depth {:.2}",
            self.frequency, self.amplitude
        );
        let oscillator = self.build_oscillator();
        if self.modulation.rearm(oscillator) {
            return true;
        }

        // Loop died underneath a playing session; bring it back.
        let oscillator = self.build_oscillator();
        match self.modulation.arm(oscillator, Arc::clone(&self.volume)) {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }
}

impl Drop for TremoloSession {
    fn drop(&mut self) {
        self.stop();
    }
}
