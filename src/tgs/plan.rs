//! Output frame count and delay for a vector animation.

/// GIF delay bounds, in hundredths of a second.
pub const MIN_DELAY: u16 = 2;
pub const MAX_DELAY: u16 = 20;
pub const DEFAULT_DELAY: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub frame_count: usize,
    /// Per-frame delay in hundredths of a second.
    pub delay: u16,
}

impl FramePlan {
    /// `frame_rate <= 0` (or NaN) means the rate is unknown and the count is
    /// chosen from `duration` instead.
    pub fn new(duration: f64, frame_rate: f64) -> Self {
        let frame_count = if frame_rate > 0.0 {
            if frame_rate >= 30.0 {
                24
            } else if frame_rate >= 15.0 {
                20
            } else {
                16
            }
        } else if duration <= 2.0 {
            24
        } else if duration <= 5.0 {
            20
        } else {
            16
        };

        let delay = if duration > 0.0 {
            let hundredths = (duration / frame_count as f64 * 100.0).round();
            hundredths.clamp(MIN_DELAY as f64, MAX_DELAY as f64) as u16
        } else {
            DEFAULT_DELAY
        };

        Self { frame_count, delay }
    }

    /// Native frame sampled for output frame `index`, spreading the output
    /// evenly from the first to the last native frame.
    pub fn source_frame(&self, index: usize, native_total: usize) -> usize {
        if self.frame_count <= 1 || native_total <= 1 {
            return 0;
        }
        let progress = index as f64 / (self.frame_count - 1) as f64;
        let frame = (progress * (native_total - 1) as f64).round() as usize;
        frame.min(native_total - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_follows_native_rate() {
        for rate in [30.0, 59.94, 60.0, 120.0] {
            assert_eq!(FramePlan::new(3.0, rate).frame_count, 24, "rate {rate}");
        }
        for rate in [15.0, 20.0, 25.0, 29.999] {
            assert_eq!(FramePlan::new(3.0, rate).frame_count, 20, "rate {rate}");
        }
        for rate in [0.5, 10.0, 14.99] {
            assert_eq!(FramePlan::new(3.0, rate).frame_count, 16, "rate {rate}");
        }
    }

    #[test]
    fn unknown_rate_falls_back_to_duration() {
        assert_eq!(FramePlan::new(1.0, 0.0).frame_count, 24);
        assert_eq!(FramePlan::new(2.0, 0.0).frame_count, 24);
        assert_eq!(FramePlan::new(2.01, 0.0).frame_count, 20);
        assert_eq!(FramePlan::new(5.0, 0.0).frame_count, 20);
        assert_eq!(FramePlan::new(5.5, 0.0).frame_count, 16);
        assert_eq!(FramePlan::new(3.0, f64::NAN).frame_count, 20);
    }

    #[test]
    fn delay_is_rounded_and_clamped() {
        // 3.0s / 20 frames = 15 hundredths
        assert_eq!(FramePlan::new(3.0, 20.0).delay, 15);
        // 1.0s / 24 = 4.17
        assert_eq!(FramePlan::new(1.0, 60.0).delay, 4);
        // 2.9s / 16 = 18.125
        assert_eq!(FramePlan::new(2.9, 10.0).delay, 18);
        assert_eq!(FramePlan::new(0.01, 60.0).delay, MIN_DELAY);
        assert_eq!(FramePlan::new(30.0, 10.0).delay, MAX_DELAY);

        for tenth in 1..400 {
            let plan = FramePlan::new(tenth as f64 / 10.0, 0.0);
            assert!((MIN_DELAY..=MAX_DELAY).contains(&plan.delay));
        }
    }

    #[test]
    fn zero_duration_uses_default_delay() {
        assert_eq!(FramePlan::new(0.0, 60.0).delay, 4);
        assert_eq!(FramePlan::new(0.0, 0.0).delay, 4);
    }

    #[test]
    fn sampling_spans_first_to_last_native_frame() {
        let plan = FramePlan::new(3.0, 60.0);
        assert_eq!(plan.source_frame(0, 180), 0);
        assert_eq!(plan.source_frame(plan.frame_count - 1, 180), 179);

        let frames: Vec<_> = (0..plan.frame_count).map(|i| plan.source_frame(i, 180)).collect();
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn sampling_rounds_to_nearest_native_frame() {
        let plan = FramePlan { frame_count: 3, delay: 4 };
        // progress 0.5 over frames 0..=4 lands on 2
        assert_eq!(plan.source_frame(1, 5), 2);
        // progress 0.5 over frames 0..=3 is 1.5, rounded up
        assert_eq!(plan.source_frame(1, 4), 2);
    }

    #[test]
    fn degenerate_counts_sample_frame_zero() {
        let single = FramePlan { frame_count: 1, delay: 4 };
        assert_eq!(single.source_frame(0, 60), 0);
        let plan = FramePlan::new(1.0, 30.0);
        assert_eq!(plan.source_frame(5, 1), 0);
    }
}
