// src/config.rs
//
// Session configuration and its defaults.

use std::time::Duration;

use log::warn;

use crate::estimator::{DEFAULT_DECAY_WINDOW, MAX_DEPTH, MAX_FREQUENCY, MIN_DEPTH, MIN_FREQUENCY};
use crate::modulation_loop::DEFAULT_TICK_INTERVAL;
use crate::oscillator::Waveform;

/// Tunables for a [`TremoloSession`](crate::session::TremoloSession).
///
/// Clamp ranges and haptic thresholds are fixed and live with the components
/// that enforce them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Modulation loop cadence.
    pub tick_interval: Duration,
    /// Seconds without a crossing before the estimator forgets its history.
    pub decay_window: f64,
    /// Frequency used until the first estimate arrives (Hz).
    pub initial_frequency: f64,
    /// Depth used until the first depth gesture arrives.
    pub initial_amplitude: f64,
    pub oscillator_offset: f64,
    pub waveform: Waveform,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            decay_window: DEFAULT_DECAY_WINDOW,
            initial_frequency: 0.1,
            initial_amplitude: 0.6,
            oscillator_offset: 0.1,
            waveform: Waveform::Square,
        }
    }
}

impl EngineConfig {
    /// Pull every value into the range the engine can run with.
    ///
    /// Starting frequency and depth obey the same clamps as estimated values.
    /// A decay window or tick interval that cannot work reverts to its default.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();

        let initial_frequency = if self.initial_frequency.is_finite() {
            self.initial_frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
        } else {
            defaults.initial_frequency
        };
        let initial_amplitude = if self.initial_amplitude.is_finite() {
            self.initial_amplitude.clamp(MIN_DEPTH, MAX_DEPTH)
        } else {
            defaults.initial_amplitude
        };
        let decay_window = if self.decay_window.is_finite() && self.decay_window > 0.0 {
            self.decay_window
        } else {
            defaults.decay_window
        };
        let tick_interval = if self.tick_interval.is_zero() {
            defaults.tick_interval
        } else {
            self.tick_interval
        };
        let oscillator_offset = if self.oscillator_offset.is_finite() {
            self.oscillator_offset
        } else {
            defaults.oscillator_offset
        };

        let sanitized = Self {
            tick_interval,
            decay_window,
            initial_frequency,
            initial_amplitude,
            oscillator_offset,
            waveform: self.waveform,
        };
        if sanitized != self {
            warn!("config adjusted: {:?} -> {:?}", self, sanitized);
        }
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.tick_interval, Duration::from_millis(16));
        assert_eq!(cfg.decay_window, 1.5);
        assert_eq!(cfg.initial_frequency, 0.1);
        assert_eq!(cfg.initial_amplitude, 0.6);
        assert_eq!(cfg.oscillator_offset, 0.1);
        assert_eq!(cfg.waveform, Waveform::Square);
    }

    #[test]
    fn test_defaults_survive_sanitizing() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.sanitized(), cfg);
    }

    #[test]
    fn test_start_values_clamped() {
        let high = EngineConfig {
            initial_frequency: 40.0,
            initial_amplitude: 5.0,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(high.initial_frequency, MAX_FREQUENCY);
        assert_eq!(high.initial_amplitude, MAX_DEPTH);

        let low = EngineConfig {
            initial_frequency: 0.0,
            initial_amplitude: -1.0,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(low.initial_frequency, MIN_FREQUENCY);
        assert_eq!(low.initial_amplitude, MIN_DEPTH);

        let nan = EngineConfig {
            initial_frequency: f64::NAN,
            initial_amplitude: f64::INFINITY,
            oscillator_offset: f64::NAN,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(nan.initial_frequency, 0.1);
        assert_eq!(nan.initial_amplitude, 0.6);
        assert_eq!(nan.oscillator_offset, 0.1);
    }

    #[test]
    fn test_unusable_decay_window_reverts() {
        for window in [f64::NAN, f64::INFINITY, 0.0, -2.0] {
            let cfg = EngineConfig {
                decay_window: window,
                ..EngineConfig::default()
            }
            .sanitized();
            assert_eq!(cfg.decay_window, DEFAULT_DECAY_WINDOW);
        }

        let custom = EngineConfig {
            decay_window: 3.0,
            ..EngineConfig::default()
        };
        assert_eq!(custom.sanitized().decay_window, 3.0);
    }

    #[test]
    fn test_zero_tick_interval_reverts() {
        let cfg = EngineConfig {
            tick_interval: Duration::ZERO,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.tick_interval, DEFAULT_TICK_INTERVAL);

        let custom = EngineConfig {
            tick_interval: Duration::from_millis(5),
            ..EngineConfig::default()
        };
        assert_eq!(custom.sanitized().tick_interval, Duration::from_millis(5));
    }
}
