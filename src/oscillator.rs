// src/oscillator.rs
//
// Low-frequency oscillator driven by elapsed wall-clock time.

use std::f64::consts::TAU;
use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;

/// LFO waveform types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    SawUp,
    SawDown,
}

/// Host waveform index outside `0..=4`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWaveformError {
    #[error("unknown waveform index {0}")]
    UnknownIndex(u32),
}

impl Waveform {
    /// Unit-amplitude value at `phase` (in cycles, not radians).
    #[inline]
    pub fn evaluate(self, phase: f64) -> f64 {
        let frac = phase - phase.floor();
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => (frac * 4.0 - 2.0).abs() - 1.0,
            Waveform::Square => {
                if frac < 0.5 { 1.0 } else { -1.0 }
            }
            Waveform::SawUp => frac * 2.0 - 1.0,
            Waveform::SawDown => (1.0 - frac) * 2.0 - 1.0,
        }
    }

    /// Host-facing index (0=sine, 1=tri, 2=square, 3=saw up, 4=saw down).
    pub fn index(self) -> u32 {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Square => 2,
            Waveform::SawUp => 3,
            Waveform::SawDown => 4,
        }
    }
}

impl TryFrom<u32> for Waveform {
    type Error = ParseWaveformError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Waveform::Sine),
            1 => Ok(Waveform::Triangle),
            2 => Ok(Waveform::Square),
            3 => Ok(Waveform::SawUp),
            4 => Ok(Waveform::SawDown),
            other => Err(ParseWaveformError::UnknownIndex(other)),
        }
    }
}

/// Shape parameters for an [`Oscillator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    /// Hz, > 0
    pub frequency: f64,
    /// 0.0 - 1.0
    pub amplitude: f64,
    pub offset: f64,
    pub waveform: Waveform,
}

/// Periodic generator whose output is a pure function of `now - epoch`.
///
/// There is no per-sample phase accumulator: a fresh instance always starts at
/// phase zero, and reconfiguring means building a new one.
pub struct Oscillator {
    params: OscillatorParams,
    epoch: f64,
    clock: Arc<dyn Clock>,
}

impl Oscillator {
    /// Create an oscillator whose epoch is the clock's current time.
    pub fn new(params: OscillatorParams, clock: Arc<dyn Clock>) -> Self {
        let epoch = clock.now();
        Self {
            params,
            epoch,
            clock,
        }
    }

    #[inline]
    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    #[inline]
    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Value at the clock's current time.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value_at(self.clock.now() - self.epoch)
    }

    /// Value `elapsed` seconds after the epoch.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        let t = elapsed.max(0.0);
        let phase = t * self.params.frequency;
        self.params.waveform.evaluate(phase) * self.params.amplitude + self.params.offset
    }

    /// Restart the waveform at phase zero.
    pub fn reset(&mut self) {
        self.epoch = self.clock.now();
    }
}
