//! Anytime optimiser: coordinate-wise greedy local search that perturbs
//! the live pose to reduce the aggregate positioning error. Interruptible
//! after any iteration and monotone in the fitness, so a caller can run it
//! in small chunks against a wall-clock deadline.

use crate::kinematic_traits::{DOF_COUNT, Freedom};
use crate::kinematics_impl::Platform;
use rand::Rng;

/// Static per-session optimiser parameters, consumed by the control loop.
#[derive(Debug, Clone, Copy)]
pub struct OptimiserSettings {
    /// Per-DOF perturbation weights; `0.0` locks a DOF hard.
    pub freedom: Freedom,
    /// Global step scale multiplying every weighted perturbation.
    pub jumpscale: f64,
    /// Iterations per call between deadline checks (kept small so the
    /// loop reacts to its deadline promptly).
    pub chunk: usize,
}

impl Default for OptimiserSettings {
    fn default() -> Self {
        // Displacement weights are in model units, attitude weights in
        // radians; sized for the demo-scale geometries.
        OptimiserSettings {
            freedom: [5.0, 10.0, 5.0, 0.2, 0.2, 0.2],
            jumpscale: 1.0,
            chunk: 30,
        }
    }
}

impl Platform {
    /// Runs up to `iterations` perturbation trials of the live pose,
    /// accepting only those that strictly decrease
    /// [`epsilon`](Platform::epsilon).
    ///
    /// Returns `true` once the error reaches zero or a full sweep over the
    /// unlocked DOFs accepts nothing (a local optimum); `false` when the
    /// iteration budget runs out first. Exhausting the budget is a normal,
    /// reportable outcome, not an error.
    ///
    /// Non-transactional: the pose is mutated in place. A caller that
    /// wants to keep the original pose on a `false` return must snapshot
    /// it first. On return the strut states are consistent with the final
    /// pose.
    pub fn optimise(
        &mut self,
        freedom: &Freedom,
        jumpscale: f64,
        iterations: usize,
    ) -> bool {
        self.solve();
        let mut best = self.epsilon();
        if best == 0.0 {
            return true;
        }

        // A zero weight is a hard lock, not a bias.
        let unlocked: Vec<usize> =
            (0..DOF_COUNT).filter(|&k| freedom[k] > 0.0).collect();
        if unlocked.is_empty() {
            return false;
        }

        let mut spent = 0;
        loop {
            let mut improved = false;
            for &k in &unlocked {
                if spent >= iterations {
                    self.solve();
                    return false;
                }
                spent += 1;

                let magnitude: f64 =
                    jumpscale * freedom[k] * self.rng.gen_range(f64::EPSILON..=1.0);
                let previous = self.pose().dof(k);
                let mut accepted = false;
                // Try one direction, then the other before giving up on
                // this DOF for the pass.
                for direction in [1.0, -1.0] {
                    self.pose_mut().set_dof(k, previous + direction * magnitude);
                    self.solve();
                    let candidate = self.epsilon();
                    if candidate < best {
                        best = candidate;
                        accepted = true;
                        break;
                    }
                }
                if accepted {
                    improved = true;
                    if best == 0.0 {
                        return true;
                    }
                } else {
                    self.pose_mut().set_dof(k, previous);
                }
            }
            if !improved {
                // Neither direction helped on any unlocked DOF: a local
                // optimum for this step scale.
                self.solve();
                return true;
            }
        }
    }
}
