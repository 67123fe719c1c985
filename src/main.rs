// src/main.rs
//
// Sanity run: a simulated up/down swipe drives one tremolo session on the
// wall clock, printing estimates, haptics and the modulated volume.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tremolo::{
    GestureSample, HapticCapability, HapticError, HapticPattern, SharedVolume, TremoloSession,
    Viewport, VolumeTarget,
};

/// ===============================
/// Console haptics
/// ===============================

struct PrintHaptics;

impl HapticCapability for PrintHaptics {
    fn play(&mut self, pattern: &HapticPattern) -> Result<(), HapticError> {
        for event in pattern.events() {
            println!(
                "  haptic {:?} intensity={:.2} sharpness={:.2}",
                event.kind, event.intensity, event.sharpness
            );
        }
        Ok(())
    }

    fn restart(&mut self) -> Result<(), HapticError> {
        Ok(())
    }
}

/// ===============================
/// Main
/// ===============================

fn main() {
    let width = 390.0;
    let height = 844.0;
    let swipe_period = Duration::from_millis(400);
    let samples_per_swipe = 12;

    let volume = Arc::new(SharedVolume::new(1.0));
    let mut session = TremoloSession::with_defaults(volume.clone(), Box::new(PrintHaptics));
    session.set_viewport(Viewport::new(width, height));

    if let Err(e) = session.start() {
        eprintln!("could not start session: {}", e);
        return;
    }

    println!("Starting tremolo sanity run…");

    // Two full up/down swipes through the middle of the screen
    let step = swipe_period / samples_per_swipe;
    let origin = std::time::Instant::now();
    for i in 0..samples_per_swipe * 4 {
        let phase = (i % (samples_per_swipe * 2)) as f64 / samples_per_swipe as f64;
        let y = if phase < 1.0 {
            height * (0.2 + 0.6 * phase)
        } else {
            height * (0.8 - 0.6 * (phase - 1.0))
        };
        let t = origin.elapsed().as_secs_f64();

        if let Some(outcome) = session.on_gesture(GestureSample::new(width / 2.0, y, t)) {
            if let Some(estimate) = outcome.estimate {
                println!(
                    "t={:.2}s frequency -> {:.2} Hz (interval {:.3}s)",
                    t, estimate.frequency, estimate.average_interval
                );
            }
        }
        thread::sleep(step);
    }

    // Depth swipe along the bottom strip
    let t = origin.elapsed().as_secs_f64();
    session.on_gesture(GestureSample::new(width * 0.25, height * 0.95, t));
    println!("depth -> {:.2}", session.amplitude());

    thread::sleep(Duration::from_millis(200));
    println!("volume after modulation: {:.3}", volume.volume());

    session.stop();
    println!("Sanity run completed.");
}
