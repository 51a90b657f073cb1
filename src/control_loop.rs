//! The serial control cycle: drain input, solve, optimise in bounded
//! chunks against the pacer's deadline, expand forward geometry, push to
//! the actuators, then sleep out the remainder of the cycle.
//!
//! Everything runs on one thread; no part of the session is re-entered
//! while a cycle is in flight, and stopping is cooperative between cycles.

use crate::actuator::{LinkStatus, ServoBridge};
use crate::input::InputState;
use crate::kinematics_impl::Platform;
use crate::optimizer::OptimiserSettings;
use crate::pacer::Pacer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::debug;

/// Everything one finished cycle reports to its observer. Emitted after
/// the cycle's work is done and before the pacing sleep, so the observer
/// is the "cycle complete" event driving whatever schedules the next one.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    /// Aggregate error straight after `solve`, before optimisation.
    pub epsilon_before: f64,
    /// Aggregate error at the end of the cycle.
    pub epsilon_after: f64,
    /// Optimiser iterations spent this cycle (0 when disabled).
    pub iterations: usize,
    /// Whether the optimiser converged (also true for a pose that solved
    /// exactly without optimisation).
    pub converged: bool,
    /// Smoothed cycle duration, seconds.
    pub dt: f64,
    /// Servo link state after the actuator update.
    pub link: LinkStatus,
}

/// Owns the session and its collaborators and runs the cycle described in
/// the module docs. Construct once, then either call
/// [`run_cycle`](ControlLoop::run_cycle) from an external driver or hand
/// the thread over to [`run`](ControlLoop::run).
pub struct ControlLoop {
    pub platform: Platform,
    pub input: InputState,
    pub bridge: ServoBridge,
    pacer: Pacer,
    settings: OptimiserSettings,
}

impl ControlLoop {
    pub fn new(platform: Platform, target_rate: f64, settings: OptimiserSettings) -> Self {
        ControlLoop {
            platform,
            input: InputState::new(),
            bridge: ServoBridge::disconnected(),
            pacer: Pacer::new(target_rate),
            settings,
        }
    }

    pub fn settings(&self) -> &OptimiserSettings {
        &self.settings
    }

    /// Runs one full cycle starting at `now` and returns its report plus
    /// the absolute deadline the caller should wait out before the next
    /// cycle.
    pub fn run_cycle(&mut self, now: Instant) -> (CycleReport, Instant) {
        let deadline = self.pacer.begin_cycle(now);
        let dt = self.pacer.smoothed_dt();

        self.input.apply(self.platform.pose_mut(), dt);
        self.platform.solve();
        let epsilon_before = self.platform.epsilon();

        let mut iterations = 0;
        let mut converged = epsilon_before == 0.0;
        if self.input.optimise_enabled() && !converged {
            // At least one chunk runs even with no spare budget; further
            // chunks only while the deadline holds.
            loop {
                converged = self.platform.optimise(
                    &self.settings.freedom,
                    self.settings.jumpscale,
                    self.settings.chunk,
                );
                iterations += self.settings.chunk;
                if converged || Instant::now() >= deadline {
                    break;
                }
            }
        }

        self.platform.configure();
        let link = self.bridge.update(self.platform.struts());

        let report = CycleReport {
            epsilon_before,
            epsilon_after: self.platform.epsilon(),
            iterations,
            converged,
            dt,
            link,
        };
        debug!(
            epsilon_before = report.epsilon_before,
            epsilon_after = report.epsilon_after,
            iterations = report.iterations,
            converged = report.converged,
            rate = 1.0 / report.dt.max(f64::EPSILON),
            "cycle complete"
        );
        (report, deadline)
    }

    /// Drives cycles until `stop` is raised, reporting each to
    /// `on_cycle` and sleeping out each deadline. Never interrupts a
    /// cycle mid-flight; the flag is honoured between cycles.
    pub fn run(&mut self, stop: &AtomicBool, mut on_cycle: impl FnMut(&CycleReport)) {
        while !stop.load(Ordering::Relaxed) {
            let (report, deadline) = self.run_cycle(Instant::now());
            on_cycle(&report);
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
    }

    /// Bounded variant of [`run`](ControlLoop::run) for demos and tests.
    pub fn run_cycles(&mut self, cycles: usize, mut on_cycle: impl FnMut(&CycleReport)) {
        for _ in 0..cycles {
            let (report, deadline) = self.run_cycle(Instant::now());
            on_cycle(&report);
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::input::Buttons;
    use nalgebra::Vector3;

    fn test_loop() -> ControlLoop {
        let platform = Platform::with_seed(Geometry::demo(), 11);
        ControlLoop::new(platform, 240.0, OptimiserSettings::default())
    }

    #[test]
    fn reachable_pose_converges_without_iterations() {
        let mut control = test_loop();
        let (report, _) = control.run_cycle(Instant::now());
        assert_eq!(report.epsilon_before, 0.0);
        assert_eq!(report.epsilon_after, 0.0);
        assert_eq!(report.iterations, 0);
        assert!(report.converged);
        assert_eq!(report.link, LinkStatus::Disconnected);
    }

    #[test]
    fn optimiser_reduces_error_within_a_cycle() {
        let platform = Platform::with_seed(Geometry::demo(), 11);
        let settings = OptimiserSettings {
            freedom: [0.0, 20.0, 0.0, 0.0, 0.0, 0.0],
            jumpscale: 1.0,
            chunk: 200,
        };
        let mut control = ControlLoop::new(platform, 240.0, settings);
        control.platform.pose_mut().displacement = Vector3::new(0.0, 400.0, 0.0);
        let (report, _) = control.run_cycle(Instant::now());
        assert!(report.epsilon_before > 0.0);
        assert!(report.epsilon_after < report.epsilon_before);
        assert!(report.iterations >= control.settings().chunk);
    }

    #[test]
    fn held_optimiser_button_exposes_raw_errors() {
        let mut control = test_loop();
        control.platform.pose_mut().displacement = Vector3::new(0.0, 400.0, 0.0);
        control.input.press(Buttons::HOLD_OPTIMISER);
        let (report, _) = control.run_cycle(Instant::now());
        assert!(report.epsilon_before > 0.0);
        assert_eq!(report.epsilon_after, report.epsilon_before);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn cycles_emit_reports_and_stop_cooperatively() {
        let mut control = test_loop();
        let mut seen = 0;
        control.run_cycles(5, |_| seen += 1);
        assert_eq!(seen, 5);

        let stop = AtomicBool::new(false);
        let mut cycles = 0;
        // Raise the flag from within the observer: the current cycle
        // still completes, the next one never starts.
        control.run(&stop, |_| {
            cycles += 1;
            if cycles == 3 {
                stop.store(true, Ordering::Relaxed);
            }
        });
        assert_eq!(cycles, 3);
    }

    #[test]
    fn strut_geometry_is_fresh_after_each_cycle() {
        let mut control = test_loop();
        control.platform.pose_mut().displacement = Vector3::new(0.0, 20.0, 0.0);
        control.run_cycle(Instant::now());
        let first = control.platform[0].endpoint_platform;
        control.input.pointer(700.0, 100.0, 800.0, 600.0);
        control.run_cycle(Instant::now());
        let second = control.platform[0].endpoint_platform;
        assert!((second - first).norm() > 0.0);
    }
}
