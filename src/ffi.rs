// C-compatible FFI bindings for Swift/iOS integration.
//
// Safety requirements:
// - All pointers must be non-null unless documented otherwise
// - All handles must be created by this module and not fabricated
// - Haptic callbacks must stay valid until the session is destroyed
// - Caller must call tremolo_session_destroy for each tremolo_session_create

use std::ffi::c_void;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::MonotonicClock;
use crate::config::EngineConfig;
use crate::gesture::{GestureSample, Viewport};
use crate::haptics::{
    DEFAULT_GRADUAL_PEAK, HapticCapability, HapticError, HapticEvent, HapticKind, HapticOutcome,
    HapticPattern,
};
use crate::oscillator::Waveform;
use crate::session::TremoloSession;
use crate::volume::{SharedVolume, VolumeTarget};

use log::{error, info, warn};
#[cfg(feature = "ios")]
use log::LevelFilter;
#[cfg(feature = "ios")]
use oslog::OsLogger;

// Logger subsystem identifier
#[cfg(feature = "ios")]
const LOG_SUBSYSTEM: &str = "com.tremolo.engine";

// ═══════════════════════════════════════════════════════════════════════════
// Logger Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the oslog logger.
///
/// Call once at application startup. Output appears in Console.app and
/// Xcode's debug console.
#[cfg(feature = "ios")]
#[unsafe(no_mangle)]
pub extern "C" fn tremolo_init_logger() {
    OsLogger::new(LOG_SUBSYSTEM)
        .level_filter(LevelFilter::Debug)
        .init()
        .ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration for creating a session.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TremoloConfig {
    /// Modulation tick interval in milliseconds (e.g., 16 for ~60 Hz).
    pub tick_interval_ms: u32,
    /// Seconds without a crossing before swipe history is discarded.
    pub decay_window_secs: f64,
    /// LFO frequency before the first swipe estimate (Hz).
    pub initial_frequency: f64,
    /// LFO depth before the first depth gesture.
    pub initial_amplitude: f64,
    pub oscillator_offset: f64,
    /// 0=sine, 1=triangle, 2=square, 3=saw up, 4=saw down.
    pub waveform_index: u32,
}

impl Default for TremoloConfig {
    fn default() -> Self {
        let cfg = EngineConfig::default();
        Self {
            tick_interval_ms: cfg.tick_interval.as_millis() as u32,
            decay_window_secs: cfg.decay_window,
            initial_frequency: cfg.initial_frequency,
            initial_amplitude: cfg.initial_amplitude,
            oscillator_offset: cfg.oscillator_offset,
            waveform_index: cfg.waveform.index(),
        }
    }
}

impl From<TremoloConfig> for EngineConfig {
    fn from(c: TremoloConfig) -> Self {
        let defaults = EngineConfig::default();
        let waveform = Waveform::try_from(c.waveform_index).unwrap_or_else(|e| {
            warn!("{}; using {:?}", e, defaults.waveform);
            defaults.waveform
        });
        Self {
            tick_interval: Duration::from_millis(c.tick_interval_ms.max(1) as u64),
            decay_window: c.decay_window_secs,
            initial_frequency: c.initial_frequency,
            initial_amplitude: c.initial_amplitude,
            oscillator_offset: c.oscillator_offset,
            waveform,
        }
    }
}

/// Get the default configuration values.
#[unsafe(no_mangle)]
pub extern "C" fn tremolo_default_config() -> TremoloConfig {
    TremoloConfig::default()
}

// ═══════════════════════════════════════════════════════════════════════════
// Haptic Callbacks
// ═══════════════════════════════════════════════════════════════════════════

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TremoloHapticKind {
    Continuous = 0,
    Transient = 1,
}

/// One haptic event handed to the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloHapticEvent {
    pub kind: TremoloHapticKind,
    pub intensity: f32,
    pub sharpness: f32,
    pub relative_time: f64,
    /// Seconds; negative for transient events.
    pub duration: f64,
}

impl From<&HapticEvent> for TremoloHapticEvent {
    fn from(e: &HapticEvent) -> Self {
        Self {
            kind: match e.kind {
                HapticKind::Continuous => TremoloHapticKind::Continuous,
                HapticKind::Transient => TremoloHapticKind::Transient,
            },
            intensity: e.intensity as f32,
            sharpness: e.sharpness as f32,
            relative_time: e.relative_time,
            duration: e.duration.unwrap_or(-1.0),
        }
    }
}

/// Host-implemented haptic engine.
///
/// `play_pattern` receives `count` events and returns `false` on failure.
/// `restart` returns `false` if the engine could not be restarted.
#[repr(C)]
pub struct TremoloHapticCallbacks {
    pub context: *mut c_void,
    pub play_pattern: Option<
        extern "C" fn(context: *mut c_void, events: *const TremoloHapticEvent, count: u32) -> bool,
    >,
    pub restart: Option<extern "C" fn(context: *mut c_void) -> bool>,
}

struct CallbackHaptics {
    callbacks: TremoloHapticCallbacks,
    scratch: Vec<TremoloHapticEvent>,
}

// SAFETY: the host guarantees `context` may be used from whichever thread
// delivers gestures for this session.
unsafe impl Send for CallbackHaptics {}

impl HapticCapability for CallbackHaptics {
    fn play(&mut self, pattern: &HapticPattern) -> Result<(), HapticError> {
        let Some(play) = self.callbacks.play_pattern else {
            return Err(HapticError::Unsupported);
        };

        self.scratch.clear();
        self.scratch
            .extend(pattern.events().iter().map(TremoloHapticEvent::from));

        if play(
            self.callbacks.context,
            self.scratch.as_ptr(),
            self.scratch.len() as u32,
        ) {
            Ok(())
        } else {
            Err(HapticError::EngineStopped)
        }
    }

    fn restart(&mut self) -> Result<(), HapticError> {
        let Some(restart) = self.callbacks.restart else {
            return Err(HapticError::Unsupported);
        };
        if restart(self.callbacks.context) {
            Ok(())
        } else {
            Err(HapticError::Playback("restart rejected by host".into()))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Session Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

/// Opaque handle to a tremolo session.
pub struct TremoloHandle {
    inner: TremoloSession,
}

/// Create a session.
///
/// `config` may be NULL for defaults. The modulated volume starts at
/// `initial_volume`; read it back with `tremolo_session_volume` and apply it
/// to the player.
///
/// # Safety
/// `config` must be NULL or point to a valid TremoloConfig. The callbacks'
/// context must outlive the session.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_create(
    config: *const TremoloConfig,
    haptics: TremoloHapticCallbacks,
    initial_volume: f32,
) -> *mut TremoloHandle {
    let cfg = if config.is_null() {
        TremoloConfig::default()
    } else {
        unsafe { std::ptr::read(config) }
    };

    let session = TremoloSession::new(
        cfg.into(),
        Arc::new(SharedVolume::new(initial_volume)),
        Box::new(CallbackHaptics {
            callbacks: haptics,
            scratch: Vec::with_capacity(32),
        }),
        Arc::new(MonotonicClock::new()),
    );

    info!("tremolo_session_create");
    Box::into_raw(Box::new(TremoloHandle { inner: session }))
}

/// Destroy a session, stopping modulation first.
///
/// # Safety
/// `handle` must be a valid pointer returned by `tremolo_session_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_destroy(handle: *mut TremoloHandle) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Set the interaction surface size in points.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_set_viewport(
    handle: *mut TremoloHandle,
    width: f64,
    height: f64,
) {
    if handle.is_null() {
        return;
    }
    unsafe { (*handle).inner.set_viewport(Viewport::new(width, height)) };
}

/// Start modulation. Returns `false` if the modulation thread could not start.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_start(handle: *mut TremoloHandle) -> bool {
    if handle.is_null() {
        return false;
    }
    match unsafe { (*handle).inner.start() } {
        Ok(()) => true,
        Err(e) => {
            error!("tremolo_session_start: {}", e);
            false
        }
    }
}

/// Stop modulation and clear swipe history. Returns after the loop stopped.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_stop(handle: *mut TremoloHandle) {
    if handle.is_null() {
        return;
    }
    unsafe { (*handle).inner.stop() };
}

// ═══════════════════════════════════════════════════════════════════════════
// Gesture Input
// ═══════════════════════════════════════════════════════════════════════════

/// Feed one drag sample (surface coordinates, timestamp in seconds).
///
/// Returns `true` if the LFO was reconfigured by this sample.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_gesture(
    handle: *mut TremoloHandle,
    x: f64,
    y: f64,
    timestamp: f64,
) -> bool {
    if handle.is_null() {
        return false;
    }
    let outcome = unsafe { (*handle).inner.on_gesture(GestureSample::new(x, y, timestamp)) };
    outcome.is_some_and(|o| o.reconfigured)
}

// ═══════════════════════════════════════════════════════════════════════════
// Volume & State Readback
// ═══════════════════════════════════════════════════════════════════════════

/// Current modulated volume.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_volume(handle: *const TremoloHandle) -> f32 {
    if handle.is_null() {
        return 0.0;
    }
    unsafe { (*handle).inner.volume().volume() }
}

/// Write the base volume (e.g. from a fade); modulation multiplies into it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_set_volume(handle: *mut TremoloHandle, volume: f32) {
    if handle.is_null() {
        return;
    }
    unsafe { (*handle).inner.volume().set_volume(volume) };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_frequency(handle: *const TremoloHandle) -> f64 {
    if handle.is_null() {
        return 0.0;
    }
    unsafe { (*handle).inner.frequency() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_amplitude(handle: *const TremoloHandle) -> f64 {
    if handle.is_null() {
        return 0.0;
    }
    unsafe { (*handle).inner.amplitude() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_session_is_playing(handle: *const TremoloHandle) -> bool {
    if handle.is_null() {
        return false;
    }
    unsafe { (*handle).inner.is_playing() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Fixed Haptic Patterns
// ═══════════════════════════════════════════════════════════════════════════

/// # Safety
/// `handle` must be NULL or valid.
unsafe fn play(handle: *mut TremoloHandle, pattern: &HapticPattern) -> bool {
    if handle.is_null() {
        return false;
    }
    unsafe { (*handle).inner.play_pattern(pattern) == HapticOutcome::Played }
}

/// Single light tap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_play_tap(handle: *mut TremoloHandle) -> bool {
    unsafe { play(handle, &HapticPattern::tap()) }
}

/// Bell-shaped swell; `peak <= 0` uses the default peak.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_play_gradual(handle: *mut TremoloHandle, peak: f32) -> bool {
    let peak = if peak > 0.0 {
        peak as f64
    } else {
        DEFAULT_GRADUAL_PEAK
    };
    unsafe { play(handle, &HapticPattern::gradual(peak)) }
}

/// Strong hit fading out over one second.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tremolo_play_heavy(handle: *mut TremoloHandle) -> bool {
    unsafe { play(handle, &HapticPattern::heavy()) }
}
