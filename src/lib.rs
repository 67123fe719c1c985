// src/lib.rs
//
// Library entry point for FFI consumers (iOS/Swift).
//
// Gesture-driven tremolo: swipe rate sets an LFO frequency, the LFO
// modulates playback volume, and each gesture sample fires haptic feedback.

mod clock;
mod config;
mod estimator;
mod gesture;
mod haptics;
mod modulation_loop;
mod oscillator;
mod session;
mod volume;

#[cfg(any(feature = "ios", test))]
pub mod ffi;

// Re-export key types for Rust consumers
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::EngineConfig;
pub use estimator::{
    CrossingDirection, CrossingEstimator, EstimateUpdate, MAX_DEPTH, MAX_FREQUENCY, MIN_DEPTH,
    MIN_FREQUENCY, estimate_depth,
};
pub use gesture::{GestureSample, Viewport};
pub use haptics::{
    CONTINUOUS_MAX_FREQUENCY, DEFAULT_GRADUAL_PEAK, HapticBridge, HapticCapability, HapticError,
    HapticEvent, HapticKind, HapticOutcome, HapticPattern, NullHaptics,
};
pub use modulation_loop::{MAX_VOLUME, MIN_VOLUME, ModulationError, ModulationLoop};
pub use oscillator::{Oscillator, OscillatorParams, ParseWaveformError, Waveform};
pub use session::{GestureOutcome, TremoloSession};
pub use volume::{SharedVolume, VolumeTarget};
