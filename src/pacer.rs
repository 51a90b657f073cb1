//! Adaptive cycle pacing: a moving average of recent cycle durations
//! drives an extra-delay accumulator that throttles the loop towards a
//! target rate. The feedback is deliberately asymmetric: running slow
//! sheds the delay much faster than running fast builds it up, because a
//! dropped deadline costs more than momentarily running ahead.

use std::time::{Duration, Instant};

/// Cycle-duration averaging window, in cycles.
pub const WINDOW: usize = 6;

/// Hysteresis band around the target duration, as a fraction of it.
const BAND: f64 = 0.02;

/// Per-cycle decay of the extra delay while the loop sits on target.
const DECAY_ON_TARGET: f64 = 0.99;

/// Per-cycle decay while the loop runs behind; aggressive on purpose.
const DECAY_BEHIND: f64 = 0.90;

/// Rate controller for the control cycle. Fed an [`Instant`] at the start
/// of every cycle, it answers with the absolute deadline the cycle should
/// run (and then sleep) to. Pure in terms of the instants it is given, so
/// tests can drive it with synthetic timelines.
#[derive(Debug, Clone)]
pub struct Pacer {
    target_dt: f64,
    samples: [Instant; WINDOW],
    next: usize,
    filled: usize,
    extra_delay: f64,
}

impl Pacer {
    /// `target_rate` is in cycles per second and must be positive.
    pub fn new(target_rate: f64) -> Self {
        assert!(
            target_rate > 0.0 && target_rate.is_finite(),
            "target rate must be positive"
        );
        Pacer {
            target_dt: 1.0 / target_rate,
            samples: [Instant::now(); WINDOW],
            next: 0,
            filled: 0,
            extra_delay: 0.0,
        }
    }

    /// Records the start of a cycle and returns the absolute deadline for
    /// it: `now + extra_delay` after the asymmetric feedback update.
    pub fn begin_cycle(&mut self, now: Instant) -> Instant {
        let dt = if self.filled == WINDOW {
            let oldest = self.samples[self.next];
            (now - oldest).as_secs_f64() / WINDOW as f64
        } else {
            // Warm-up: no adjustment until the window is full.
            self.target_dt
        };
        self.samples[self.next] = now;
        self.next = (self.next + 1) % WINDOW;
        self.filled = (self.filled + 1).min(WINDOW);

        let band = self.target_dt * BAND;
        if dt < self.target_dt - band {
            // Too fast: react immediately with the full shortfall.
            self.extra_delay = self.target_dt - dt;
        } else if dt <= self.target_dt + band {
            self.extra_delay *= DECAY_ON_TARGET;
        } else {
            self.extra_delay *= DECAY_BEHIND;
        }

        now + Duration::from_secs_f64(self.extra_delay)
    }

    /// Moving-average cycle duration, seconds; reads as the target until
    /// the window has filled.
    pub fn smoothed_dt(&self) -> f64 {
        if self.filled < 2 {
            return self.target_dt;
        }
        let newest = self.samples[(self.next + WINDOW - 1) % WINDOW];
        let span = if self.filled == WINDOW {
            newest - self.samples[self.next]
        } else {
            newest - self.samples[0]
        };
        let cycles = (self.filled - 1).max(1);
        span.as_secs_f64() / cycles as f64
    }

    /// Current rate-limiting delay, seconds.
    pub fn extra_delay(&self) -> f64 {
        self.extra_delay
    }

    /// Cycle duration the pacer steers towards, seconds.
    pub fn target_dt(&self) -> f64 {
        self.target_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives the pacer with a synthetic timeline of cycle durations.
    fn drive(pacer: &mut Pacer, start: Instant, durations: &[f64]) -> Instant {
        let mut now = start;
        for &dt in durations {
            pacer.begin_cycle(now);
            now += Duration::from_secs_f64(dt);
        }
        now
    }

    #[test]
    fn fast_cycles_build_up_the_full_shortfall() {
        let mut pacer = Pacer::new(100.0); // target 10 ms
        let start = Instant::now();
        // Warm up the window, then run at half the target duration.
        drive(&mut pacer, start, &[0.005; 12]);
        let deadline = pacer.begin_cycle(start + Duration::from_secs_f64(0.060));
        assert!((pacer.extra_delay() - 0.005).abs() < 1e-9);
        assert!(deadline > start + Duration::from_secs_f64(0.060));
    }

    #[test]
    fn on_target_cycles_decay_gently() {
        let mut pacer = Pacer::new(100.0);
        let start = Instant::now();
        drive(&mut pacer, start, &[0.005; 12]);
        let built_up = pacer.extra_delay();
        assert!(built_up > 0.0);
        // Switch to exactly on-target cycles. The first few still see a
        // mixed window while the fast samples drain out; after that the
        // update is the pure gentle decay.
        let mut now = drive(
            &mut pacer,
            start + Duration::from_secs_f64(0.060),
            &[0.010; 7],
        );
        let settled = pacer.extra_delay();
        assert!(settled > 0.0);
        for _ in 0..6 {
            pacer.begin_cycle(now);
            now += Duration::from_secs_f64(0.010);
        }
        let expected = settled * DECAY_ON_TARGET.powi(6);
        assert!((pacer.extra_delay() - expected).abs() < 1e-12);
    }

    #[test]
    fn slow_cycles_shed_delay_aggressively() {
        let mut pacer = Pacer::new(100.0);
        let start = Instant::now();
        drive(&mut pacer, start, &[0.005; 12]);
        let built_up = pacer.extra_delay();
        let after_fast = start + Duration::from_secs_f64(0.060);
        // Run at twice the target duration; once the window is dominated
        // by slow samples every cycle multiplies the delay by 0.90.
        drive(&mut pacer, after_fast, &[0.020; 18]);
        assert!(pacer.extra_delay() < built_up * DECAY_BEHIND.powi(10));
    }

    #[test]
    fn alternating_load_settles_into_a_stable_band() {
        // Spec scenario: 20 cycles alternating above/below target. The
        // averaged dt sits inside the hysteresis band, so from the first
        // full window onwards the update rule is the gentle 0.99 decay,
        // deterministically.
        let mut pacer = Pacer::new(100.0);
        let start = Instant::now();
        let mut now = drive(&mut pacer, start, &[0.010; WINDOW]);
        // Seed some delay so the decay is observable.
        pacer.extra_delay = 0.004;
        let mut expected = pacer.extra_delay;
        for i in 0..20 {
            let dt = if i % 2 == 0 { 0.0102 } else { 0.0098 };
            pacer.begin_cycle(now);
            now += Duration::from_secs_f64(dt);
            expected *= DECAY_ON_TARGET;
            assert!((pacer.extra_delay() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn warm_up_makes_no_adjustment() {
        let mut pacer = Pacer::new(60.0);
        let start = Instant::now();
        for i in 0..WINDOW {
            pacer.begin_cycle(start + Duration::from_secs_f64(i as f64 * 0.001));
            assert_eq!(pacer.extra_delay(), 0.0, "warm-up cycle {i}");
        }
    }

    #[test]
    #[should_panic(expected = "target rate must be positive")]
    fn zero_rate_is_a_construction_error() {
        let _ = Pacer::new(0.0);
    }
}
