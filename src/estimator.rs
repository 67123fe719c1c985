// src/estimator.rs
//
// Swipe-rate and depth estimation from raw pointer samples.
//
// Frequency comes from timing alternating crossings of the midline. Depth
// comes from horizontal position inside the bottom strip of the surface.

use std::collections::VecDeque;

use log::debug;

use crate::gesture::{GestureSample, Viewport};

pub const MIN_FREQUENCY: f64 = 0.05;
pub const MAX_FREQUENCY: f64 = 8.0;
pub const MIN_DEPTH: f64 = 0.15;
pub const MAX_DEPTH: f64 = 0.99;

/// Crossings remembered for the interval average.
pub const CROSSING_CAPACITY: usize = 2;

/// Default gap after which remembered crossings are discarded.
pub const DEFAULT_DECAY_WINDOW: f64 = 1.5;

// Two crossings per oscillation, then a boost so fast rates are reachable.
const FREQUENCY_SCALE: f64 = 1.2;
const DEPTH_SCALE: f64 = 0.9;

/// Direction of a midline crossing.
///
/// The names follow an inherited convention: `CrossedUpward` is recorded when
/// the coordinate goes from above the midline value to at-or-below it. In
/// screen coordinates that is an upward swipe; numerically it is a decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDirection {
    CrossedUpward,
    CrossedDownward,
}

/// A new frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateUpdate {
    /// Hz, clamped to [MIN_FREQUENCY, MAX_FREQUENCY].
    pub frequency: f64,
    /// Mean seconds between consecutive recorded crossings.
    pub average_interval: f64,
}

/// Estimates oscillation frequency from 1-D positions crossing a midline.
pub struct CrossingEstimator {
    midline: f64,
    decay_window: f64,
    crossings: VecDeque<f64>,
    last_direction: Option<CrossingDirection>,
    previous: Option<f64>,
}

impl CrossingEstimator {
    pub fn new(midline: f64) -> Self {
        Self::with_decay_window(midline, DEFAULT_DECAY_WINDOW)
    }

    pub fn with_decay_window(midline: f64, decay_window: f64) -> Self {
        Self {
            midline,
            decay_window,
            crossings: VecDeque::with_capacity(CROSSING_CAPACITY + 1),
            last_direction: None,
            previous: None,
        }
    }

    #[inline]
    pub fn midline(&self) -> f64 {
        self.midline
    }

    /// Follow a viewport resize.
    pub fn set_midline(&mut self, midline: f64) {
        self.midline = midline;
    }

    #[inline]
    pub fn last_direction(&self) -> Option<CrossingDirection> {
        self.last_direction
    }

    /// Recorded crossing timestamps, oldest first.
    pub fn crossings(&self) -> impl Iterator<Item = f64> + '_ {
        self.crossings.iter().copied()
    }

    #[inline]
    pub fn crossing_count(&self) -> usize {
        self.crossings.len()
    }

    /// Feed one sample. Returns a new estimate only when a crossing was
    /// recorded and the buffer holds enough history to time it.
    pub fn observe(&mut self, position: f64, timestamp: f64) -> Option<EstimateUpdate> {
        if !position.is_finite() || !timestamp.is_finite() {
            return None;
        }

        // Decay runs before detection too: after a quiet gap the next two
        // genuine crossings must re-accumulate, so a fresh crossing may not
        // pair with the stale one.
        self.decay(timestamp);

        let previous = self.previous.replace(position)?;

        let mut update = None;
        if let Some(direction) = self.classify(previous, position) {
            if self.last_direction != Some(direction) {
                self.crossings.push_back(timestamp);
                if self.crossings.len() > CROSSING_CAPACITY {
                    self.crossings.pop_front();
                }
                self.last_direction = Some(direction);

                if self.crossings.len() >= 2 {
                    update = self.estimate();
                }
            }
        }

        self.decay(timestamp);
        update
    }

    /// Forget everything, including the previous sample.
    pub fn reset(&mut self) {
        self.crossings.clear();
        self.last_direction = None;
        self.previous = None;
    }

    fn classify(&self, previous: f64, current: f64) -> Option<CrossingDirection> {
        let m = self.midline;
        if previous > m && current <= m {
            Some(CrossingDirection::CrossedUpward)
        } else if previous < m && current >= m {
            Some(CrossingDirection::CrossedDownward)
        } else {
            None
        }
    }

    fn estimate(&self) -> Option<EstimateUpdate> {
        let first = *self.crossings.front()?;
        let last = *self.crossings.back()?;
        let average_interval = (last - first) / (self.crossings.len() - 1) as f64;

        // Duplicate or out-of-order timestamps
        if !average_interval.is_finite() || average_interval <= 0.0 {
            return None;
        }

        let raw = (1.0 / (average_interval * 2.0)) * FREQUENCY_SCALE;
        let frequency = raw.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        debug!(
            "frequency estimate {:.2} Hz (avg crossing interval {:.3}s)",
            frequency, average_interval
        );

        Some(EstimateUpdate {
            frequency,
            average_interval,
        })
    }

    fn decay(&mut self, now: f64) {
        if let Some(&last) = self.crossings.back() {
            if now - last > self.decay_window {
                self.crossings.clear();
                self.last_direction = None;
            }
        }
    }
}

/// Depth from horizontal position, or `None` outside the depth strip.
pub fn estimate_depth(sample: &GestureSample, viewport: &Viewport) -> Option<f64> {
    if !sample.is_finite() || !viewport.is_usable() || !viewport.in_depth_zone(sample.y) {
        return None;
    }
    let depth = (sample.x / viewport.width * DEPTH_SCALE + MIN_DEPTH).clamp(MIN_DEPTH, MAX_DEPTH);
    debug!("depth estimate {:.2}", depth);
    Some(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed(est: &mut CrossingEstimator, samples: &[(f64, f64)]) -> Vec<Option<EstimateUpdate>> {
        samples
            .iter()
            .map(|&(pos, t)| est.observe(pos, t))
            .collect()
    }

    #[test]
    fn test_first_sample_only_records() {
        let mut est = CrossingEstimator::new(0.0);
        assert_eq!(est.observe(5.0, 0.0), None);
        assert_eq!(est.crossing_count(), 0);
        assert_eq!(est.last_direction(), None);
    }

    #[test]
    fn test_alternating_swipe_scenario() {
        let mut est = CrossingEstimator::new(0.0);
        let out = feed(
            &mut est,
            &[(5.0, 0.0), (-5.0, 0.3), (5.0, 0.6), (-5.0, 0.9), (5.0, 1.2)],
        );

        assert_eq!(out[0], None);
        // One crossing recorded, nothing to time yet
        assert_eq!(out[1], None);

        let at_06 = out[2].expect("estimate at t=0.6");
        assert!((at_06.frequency - 2.0).abs() < 1e-9);
        assert!((at_06.average_interval - 0.3).abs() < 1e-9);

        assert!(out[3].is_some());
        assert!(out[4].is_some());
        assert_eq!(est.crossings().collect::<Vec<_>>(), vec![0.9, 1.2]);
    }

    #[test]
    fn test_half_second_interval_gives_1_2_hz() {
        let mut est = CrossingEstimator::new(100.0);
        feed(&mut est, &[(150.0, 0.0), (50.0, 1.0)]);
        let update = est.observe(150.0, 1.5).expect("estimate");
        assert!((update.frequency - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_buffer_is_fifo_of_two() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(1.0, 0.0);
        let mut pos = 1.0;
        for i in 1..=6 {
            pos = -pos;
            est.observe(pos, i as f64 * 0.1);
            assert!(est.crossing_count() <= CROSSING_CAPACITY);
        }
        let kept: Vec<f64> = est.crossings().collect();
        assert_eq!(kept.len(), 2);
        assert!((kept[0] - 0.5).abs() < 1e-12);
        assert!((kept[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_same_direction_crossing_is_suppressed() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(5.0, 0.0);
        est.observe(0.0, 0.1); // lands on the line: CrossedUpward
        assert_eq!(est.crossing_count(), 1);
        est.observe(5.0, 0.2); // leaves from the line: no crossing
        assert_eq!(est.observe(-5.0, 0.3), None); // CrossedUpward again
        assert_eq!(est.crossing_count(), 1);
        assert_eq!(est.crossings().collect::<Vec<_>>(), vec![0.1]);
    }

    /// Named-but-unverified convention: a numeric decrease through the
    /// midline is labelled `CrossedUpward`.
    #[test]
    fn test_crossing_labels_follow_numeric_convention() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(5.0, 0.0);
        est.observe(-5.0, 0.1);
        assert_eq!(est.last_direction(), Some(CrossingDirection::CrossedUpward));
        est.observe(5.0, 0.2);
        assert_eq!(
            est.last_direction(),
            Some(CrossingDirection::CrossedDownward)
        );
    }

    #[test]
    fn test_frequency_clamped() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(5.0, 0.0);
        est.observe(-5.0, 0.001);
        let fast = est.observe(5.0, 0.002).expect("estimate");
        assert_eq!(fast.frequency, MAX_FREQUENCY);

        let mut est = CrossingEstimator::with_decay_window(0.0, 100.0);
        est.observe(5.0, 0.0);
        est.observe(-5.0, 1.0);
        let slow = est.observe(5.0, 40.0).expect("estimate");
        assert_eq!(slow.frequency, MIN_FREQUENCY);
    }

    #[test]
    fn test_duplicate_timestamps_produce_no_update() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(5.0, 1.0);
        est.observe(-5.0, 1.0);
        assert_eq!(est.observe(5.0, 1.0), None);
        assert_eq!(est.crossing_count(), 2);
    }

    #[test]
    fn test_decay_clears_after_window() {
        let mut est = CrossingEstimator::new(0.0);
        feed(&mut est, &[(5.0, 0.0), (-5.0, 0.3)]);
        assert_eq!(est.crossing_count(), 1);

        // No crossing, just past the window
        assert_eq!(est.observe(-4.0, 1.81), None);
        assert_eq!(est.crossing_count(), 0);
        assert_eq!(est.last_direction(), None);

        // Two fresh crossings are needed again
        assert_eq!(est.observe(5.0, 2.0), None);
        assert_eq!(est.crossing_count(), 1);
        let update = est.observe(-5.0, 2.5).expect("estimate");
        assert!((update.frequency - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_stale_crossing_never_pairs_with_new_one() {
        let mut est = CrossingEstimator::new(0.0);
        feed(&mut est, &[(5.0, 0.0), (-5.0, 0.3)]);
        // Next sample after the gap is itself a crossing
        assert_eq!(est.observe(5.0, 3.0), None);
        assert_eq!(est.crossings().collect::<Vec<_>>(), vec![3.0]);
    }

    #[test]
    fn test_decay_is_idempotent() {
        let mut est = CrossingEstimator::new(0.0);
        feed(&mut est, &[(5.0, 0.0), (-5.0, 0.3)]);
        est.observe(-5.0, 5.0);
        est.observe(-5.0, 6.0);
        assert_eq!(est.crossing_count(), 0);
        assert_eq!(est.last_direction(), None);
    }

    #[test]
    fn test_non_finite_samples_ignored() {
        let mut est = CrossingEstimator::new(0.0);
        est.observe(5.0, 0.0);
        assert_eq!(est.observe(f64::NAN, 0.1), None);
        assert_eq!(est.observe(-5.0, f64::INFINITY), None);
        // Previous sample is still 5.0
        est.observe(-5.0, 0.2);
        assert_eq!(est.crossing_count(), 1);
    }

    #[test]
    fn test_reset_forgets_previous_sample() {
        let mut est = CrossingEstimator::new(0.0);
        feed(&mut est, &[(5.0, 0.0), (-5.0, 0.3)]);
        est.reset();
        assert_eq!(est.crossing_count(), 0);
        assert_eq!(est.last_direction(), None);
        // Would have been a crossing against the old previous sample
        assert_eq!(est.observe(5.0, 0.4), None);
        assert_eq!(est.crossing_count(), 0);
    }

    #[test]
    fn test_set_midline() {
        let mut est = CrossingEstimator::new(0.0);
        est.set_midline(300.0);
        assert_eq!(est.midline(), 300.0);
        est.observe(400.0, 0.0);
        est.observe(200.0, 0.1);
        assert_eq!(est.crossing_count(), 1);
    }

    #[test]
    fn test_depth_only_in_bottom_strip() {
        let vp = Viewport::new(400.0, 600.0);
        assert_eq!(estimate_depth(&GestureSample::new(200.0, 300.0, 0.0), &vp), None);

        let d = estimate_depth(&GestureSample::new(200.0, 590.0, 0.0), &vp).unwrap();
        assert!((d - 0.6).abs() < 1e-9);

        let left = estimate_depth(&GestureSample::new(0.0, 590.0, 0.0), &vp).unwrap();
        assert_eq!(left, MIN_DEPTH);
        let right = estimate_depth(&GestureSample::new(400.0, 590.0, 0.0), &vp).unwrap();
        assert_eq!(right, MAX_DEPTH);
    }

    #[test]
    fn test_depth_rejects_degenerate_viewport() {
        let vp = Viewport::new(0.0, 600.0);
        assert_eq!(estimate_depth(&GestureSample::new(10.0, 590.0, 0.0), &vp), None);
    }

    proptest! {
        #[test]
        fn frequency_always_within_bounds(
            positions in prop::collection::vec(-100.0f64..100.0, 2..64),
            steps in prop::collection::vec(0.0f64..0.5, 64),
        ) {
            let mut est = CrossingEstimator::new(0.0);
            let mut t = 0.0;
            for (i, pos) in positions.iter().enumerate() {
                t += steps[i];
                if let Some(update) = est.observe(*pos, t) {
                    prop_assert!(update.frequency >= MIN_FREQUENCY);
                    prop_assert!(update.frequency <= MAX_FREQUENCY);
                }
                prop_assert!(est.crossing_count() <= CROSSING_CAPACITY);
            }
        }

        #[test]
        fn depth_always_within_bounds(x in -1000.0f64..2000.0, y in 0.0f64..600.0) {
            let vp = Viewport::new(400.0, 600.0);
            if let Some(d) = estimate_depth(&GestureSample::new(x, y, 0.0), &vp) {
                prop_assert!((MIN_DEPTH..=MAX_DEPTH).contains(&d));
            }
        }
    }
}
