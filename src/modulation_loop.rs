// src/modulation_loop.rs
//
// Fixed-rate task that applies the oscillator to the playback volume.
//
// One worker thread per armed loop. The oscillator slot and the volume target
// live behind a single mutex that each tick holds for its whole
// read-modify-write, so `rearm` and `disarm` are ordered against ticks:
// once either returns, no tick can observe the previous state.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::oscillator::Oscillator;
use crate::volume::VolumeTarget;

pub const MIN_VOLUME: f32 = 0.1;
pub const MAX_VOLUME: f32 = 1.0;

/// ~60 Hz
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error)]
pub enum ModulationError {
    #[error("failed to spawn modulation thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Default)]
struct LoopState {
    oscillator: Option<Arc<Oscillator>>,
    target: Option<Arc<dyn VolumeTarget>>,
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically multiplies the oscillator value into the volume target.
pub struct ModulationLoop {
    tick_interval: Duration,
    state: Arc<Mutex<LoopState>>,
    worker: Option<Worker>,
}

impl ModulationLoop {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            state: Arc::new(Mutex::new(LoopState::default())),
            worker: None,
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.worker.is_some()
    }

    /// Start ticking. Any previously armed cycle is stopped first.
    pub fn arm(
        &mut self,
        oscillator: Arc<Oscillator>,
        target: Arc<dyn VolumeTarget>,
    ) -> Result<(), ModulationError> {
        self.disarm();

        {
            let mut state = lock(&self.state);
            state.oscillator = Some(oscillator);
            state.target = Some(target);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let state = Arc::clone(&self.state);
        let interval = self.tick_interval;

        let spawned = thread::Builder::new()
            .name("tremolo-modulation".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            tick(&state);
                        }
                        // Stop requested, or the loop handle is gone
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { stop_tx, handle });
                info!("modulation loop armed ({:?} ticks)", interval);
                Ok(())
            }
            Err(e) => {
                *lock(&self.state) = LoopState::default();
                Err(ModulationError::Spawn(e))
            }
        }
    }

    /// Swap the oscillator without interrupting the tick cycle.
    ///
    /// Returns `false` (and keeps nothing) when the loop is not armed.
    pub fn rearm(&self, oscillator: Arc<Oscillator>) -> bool {
        if !self.is_armed() {
            return false;
        }
        let mut state = lock(&self.state);
        state.oscillator = Some(oscillator);
        true
    }

    /// Stop ticking and release the oscillator. Returns after the worker has
    /// exited. Calling it again is a no-op.
    pub fn disarm(&mut self) {
        *lock(&self.state) = LoopState::default();

        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
            info!("modulation loop disarmed");
        }
    }

    /// Run one tick on the calling thread.
    ///
    /// Returns the volume written, or `None` if nothing was written.
    pub fn tick_now(&self) -> Option<f32> {
        tick(&self.state)
    }
}

impl Default for ModulationLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Drop for ModulationLoop {
    fn drop(&mut self) {
        self.disarm();
    }
}

fn lock(state: &Mutex<LoopState>) -> MutexGuard<'_, LoopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tick(state: &Mutex<LoopState>) -> Option<f32> {
    let state = lock(state);
    let (Some(oscillator), Some(target)) = (&state.oscillator, &state.target) else {
        return None;
    };

    // Multiplies into the current volume so concurrent fades compound.
    let modulated = target.volume() as f64 * oscillator.value();
    if !modulated.is_finite() {
        debug!("skipping non-finite modulation value");
        return None;
    }

    let volume = (modulated as f32).clamp(MIN_VOLUME, MAX_VOLUME);
    target.set_volume(volume);
    Some(volume)
}
