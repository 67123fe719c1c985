//! Haptic feedback patterns and the bridge that dispatches them.
//!
//! The platform haptic engine is reached through [`HapticCapability`]. The
//! bridge chooses a pattern from the current modulation estimate, and on
//! failure restarts the engine once and drops the event. Nothing is retried
//! and nothing is reported back to the gesture path.

use log::{error, warn};
use thiserror::Error;

/// At or below this rate feedback is a short continuous buzz; above it, a tap.
pub const CONTINUOUS_MAX_FREQUENCY: f64 = 2.0;

const CONTINUOUS_DURATION: f64 = 0.2;
const CONTINUOUS_INTENSITY_SCALE: f64 = 0.7;
const CONTINUOUS_SHARPNESS: f64 = 0.3;
const TRANSIENT_INTENSITY_SCALE: f64 = 0.6;
const TRANSIENT_SHARPNESS: f64 = 0.5;

// Bell-shaped swell
const GRADUAL_DURATION: f64 = 1.2;
const GRADUAL_STEPS: u32 = 20;
const GRADUAL_EVENTS: u32 = 19;
pub const DEFAULT_GRADUAL_PEAK: f64 = 0.6;

/// Haptic event classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    /// Sustained vibration for `duration` seconds.
    Continuous,
    /// Instantaneous tap.
    Transient,
}

/// One event within a pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticEvent {
    pub kind: HapticKind,
    /// 0.0 - 1.0
    pub intensity: f64,
    /// 0.0 - 1.0
    pub sharpness: f64,
    /// Seconds from the start of the pattern.
    pub relative_time: f64,
    /// Seconds; only meaningful for continuous events.
    pub duration: Option<f64>,
}

impl HapticEvent {
    pub fn transient(intensity: f64, sharpness: f64) -> Self {
        Self {
            kind: HapticKind::Transient,
            intensity,
            sharpness,
            relative_time: 0.0,
            duration: None,
        }
    }

    pub fn continuous(intensity: f64, sharpness: f64, duration: f64) -> Self {
        Self {
            kind: HapticKind::Continuous,
            intensity,
            sharpness,
            relative_time: 0.0,
            duration: Some(duration),
        }
    }

    pub fn at(mut self, relative_time: f64) -> Self {
        self.relative_time = relative_time;
        self
    }
}

/// An ordered list of events played as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct HapticPattern {
    events: Vec<HapticEvent>,
}

impl HapticPattern {
    pub fn new(events: Vec<HapticEvent>) -> Self {
        Self { events }
    }

    pub fn single(event: HapticEvent) -> Self {
        Self::new(vec![event])
    }

    /// Feedback for the current modulation estimate.
    pub fn for_modulation(frequency: f64, amplitude: f64) -> Self {
        if frequency <= CONTINUOUS_MAX_FREQUENCY {
            Self::single(HapticEvent::continuous(
                amplitude * CONTINUOUS_INTENSITY_SCALE,
                CONTINUOUS_SHARPNESS,
                CONTINUOUS_DURATION,
            ))
        } else {
            Self::single(HapticEvent::transient(
                amplitude * TRANSIENT_INTENSITY_SCALE,
                TRANSIENT_SHARPNESS,
            ))
        }
    }

    /// A single light tap.
    pub fn tap() -> Self {
        Self::single(HapticEvent::transient(0.4, 0.2))
    }

    /// Swell that rises to `peak` and falls back over ~1.2s.
    pub fn gradual(peak: f64) -> Self {
        let step = GRADUAL_DURATION / GRADUAL_STEPS as f64;
        let events = (0..GRADUAL_EVENTS)
            .map(|i| {
                let progress = i as f64 / GRADUAL_STEPS as f64;
                let shape = 1.0 - (2.0 * progress - 1.0).powi(2);
                HapticEvent::continuous(peak * shape, 0.5, step).at(i as f64 * step)
            })
            .collect();
        Self::new(events)
    }

    /// Strong hit that fades out over one second.
    pub fn heavy() -> Self {
        let events = (0..5)
            .map(|i| {
                let t = i as f64 * 0.2;
                HapticEvent::continuous(1.0 - t, 0.3, 0.2).at(t)
            })
            .collect();
        Self::new(events)
    }

    #[inline]
    pub fn events(&self) -> &[HapticEvent] {
        &self.events
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Failure reported by the platform haptic engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HapticError {
    #[error("haptic engine is not running")]
    EngineStopped,

    #[error("haptics are not supported on this device")]
    Unsupported,

    #[error("haptic playback failed: {0}")]
    Playback(String),
}

/// Platform haptic engine.
pub trait HapticCapability: Send {
    fn play(&mut self, pattern: &HapticPattern) -> Result<(), HapticError>;
    fn restart(&mut self) -> Result<(), HapticError>;
}

/// Capability that accepts and discards everything.
pub struct NullHaptics;

impl HapticCapability for NullHaptics {
    fn play(&mut self, _pattern: &HapticPattern) -> Result<(), HapticError> {
        Ok(())
    }

    fn restart(&mut self) -> Result<(), HapticError> {
        Ok(())
    }
}

/// What happened to a dispatched pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticOutcome {
    Played,
    /// Invalid input, nothing dispatched.
    Skipped,
    /// Playback failed; the engine was restarted once and the event dropped.
    Dropped,
}

/// Maps modulation estimates to haptic patterns.
pub struct HapticBridge {
    capability: Box<dyn HapticCapability>,
}

impl HapticBridge {
    pub fn new(capability: Box<dyn HapticCapability>) -> Self {
        Self { capability }
    }

    /// Feedback for one gesture sample.
    pub fn trigger(&mut self, frequency: f64, amplitude: f64) -> HapticOutcome {
        if !frequency.is_finite() || !amplitude.is_finite() {
            return HapticOutcome::Skipped;
        }
        let pattern = HapticPattern::for_modulation(frequency, amplitude);
        self.play_pattern(&pattern)
    }

    /// Play an arbitrary pattern with the same single-restart recovery.
    pub fn play_pattern(&mut self, pattern: &HapticPattern) -> HapticOutcome {
        if pattern.is_empty() {
            return HapticOutcome::Skipped;
        }
        match self.capability.play(pattern) {
            Ok(()) => HapticOutcome::Played,
            Err(e) => {
                warn!("haptic pattern dropped: {}", e);
                if let Err(e) = self.capability.restart() {
                    error!("failed to restart haptic engine: {}", e);
                }
                HapticOutcome::Dropped
            }
        }
    }
}
