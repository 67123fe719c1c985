// src/volume.rs
//
// The playback volume the modulation loop writes into.

use std::sync::atomic::{AtomicU32, Ordering};

/// Externally owned playback volume in [0, 1].
///
/// The engine only reads the current value, multiplies into it and writes it
/// back. It never starts or stops playback.
pub trait VolumeTarget: Send + Sync {
    fn volume(&self) -> f32;
    fn set_volume(&self, volume: f32);
}

/// Lock-free volume cell shared between the host and the modulation loop.
///
/// Stored as f32 bits in an AtomicU32.
#[derive(Debug)]
pub struct SharedVolume {
    bits: AtomicU32,
}

impl SharedVolume {
    pub fn new(volume: f32) -> Self {
        Self {
            bits: AtomicU32::new(volume.to_bits()),
        }
    }
}

impl Default for SharedVolume {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl VolumeTarget for SharedVolume {
    #[inline]
    fn volume(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    fn set_volume(&self, volume: f32) {
        self.bits.store(volume.to_bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_volume_roundtrip() {
        let v = SharedVolume::new(0.5);
        assert_eq!(v.volume(), 0.5);
        v.set_volume(0.25);
        assert_eq!(v.volume(), 0.25);
        assert_eq!(SharedVolume::default().volume(), 0.0);
    }
}
