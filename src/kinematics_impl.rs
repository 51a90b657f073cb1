//! The platform session: owned context bundling the geometric model, the
//! requested pose and the derived per-strut state, with the closed-form
//! inverse-kinematics solver and the forward geometry expander.
//!
//! Each strut is driven by a servo crank of radius `strut_arm` connected
//! to the platform anchor through a rigid rod of length `strut_length`.
//! `solve` inverts that linkage per strut; `configure` expands the solved
//! angles into the 3-D frames consumers (renderers, actuators) need.

use crate::geometry::Geometry;
use crate::kinematic_traits::{Pose, StrutState};
use nalgebra::Vector3;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::ops::Index;

/// Owned session context. Created once at startup from an immutable
/// [`Geometry`]; the pose is then mutated every cycle by input adapters
/// and the optimiser, and the strut states are recomputed from scratch on
/// every [`solve`](Platform::solve).
pub struct Platform {
    geometry: Geometry,
    pose: Pose,
    struts: Vec<StrutState>,
    pub(crate) rng: SmallRng,
}

impl Platform {
    /// Creates a session at the identity pose. Panics if the geometry is
    /// malformed (fewer than 3 struts, non-positive lengths); that is a
    /// programming error, not a runtime condition.
    pub fn new(geometry: Geometry) -> Self {
        Self::with_rng(geometry, SmallRng::from_entropy())
    }

    /// Like [`Platform::new`] but with a fixed optimiser seed, for
    /// reproducible optimisation runs.
    pub fn with_seed(geometry: Geometry, seed: u64) -> Self {
        Self::with_rng(geometry, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(geometry: Geometry, rng: SmallRng) -> Self {
        geometry.assert_valid();
        let struts = vec![StrutState::default(); geometry.struts];
        Platform {
            geometry,
            pose: Pose::default(),
            struts,
            rng,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Mutable access for input adapters and callers that steer the pose.
    /// After mutating, call [`solve`](Platform::solve) (and
    /// [`configure`](Platform::configure) if geometry consumers read the
    /// session) to bring the strut states back in step.
    pub fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }

    /// Read-only view of all strut states, indexable alternative to
    /// `platform[i]`.
    pub fn struts(&self) -> &[StrutState] {
        &self.struts
    }

    /// Crank-plane frame at the base anchor of strut `i`: `normal` is the
    /// servo axle (perimeter tangent), `tangent` the crank zero direction
    /// pointing inward towards the platform column. The crank sweeps the
    /// plane spanned by `tangent` and the vertical.
    fn base_frame(&self, i: usize) -> (Vector3<f64>, Vector3<f64>) {
        let phi = self
            .geometry
            .anchor_angle(self.geometry.base_shape, i);
        let normal = Vector3::new(-phi.sin(), 0.0, phi.cos());
        let tangent = Vector3::new(-phi.cos(), 0.0, -phi.sin());
        (normal, tangent)
    }

    /// Solves the inverse kinematics for the current pose: per strut, the
    /// servo angle realising the required leg length, and the signed
    /// residual when the length falls outside the crank's reach.
    ///
    /// Never fails. An unreachable pose is a first-class result: the
    /// length is clamped to the nearest reach bound and the difference is
    /// reported in [`StrutState::error`].
    pub fn solve(&mut self) {
        let rotation = self.pose.rotation();
        let arm = self.geometry.strut_arm;
        let rod = self.geometry.strut_length;
        let min_reach = self.geometry.min_reach();
        let max_reach = self.geometry.max_reach();

        for i in 0..self.struts.len() {
            let base = self.geometry.base_anchor(i);
            let platform =
                rotation * self.geometry.platform_anchor(i) + self.pose.displacement;
            let leg = platform - base;
            let required = leg.norm();
            let achievable = required.clamp(min_reach, max_reach);

            // Law of cosines over (crank, rod, leg chord): angle at the
            // servo pivot between the crank and the chord.
            let cos_alpha = ((arm * arm + achievable * achievable - rod * rod)
                / (2.0 * arm * achievable))
                .clamp(-1.0, 1.0);
            let alpha = cos_alpha.acos();

            // Elevation of the leg within the crank plane; the elbow-down
            // branch puts the crank below the chord.
            let (_, tangent) = self.base_frame(i);
            let beta = leg.y.atan2(leg.dot(&tangent));

            let strut = &mut self.struts[i];
            strut.motor_angle = beta - alpha;
            strut.error = required - achievable;
        }
    }

    /// Aggregate squared positioning error over all struts; the fitness
    /// signal the optimiser minimises. Zero means the whole pose is
    /// reachable exactly.
    pub fn epsilon(&self) -> f64 {
        self.struts.iter().map(|s| s.error * s.error).sum()
    }

    /// Forward geometry expander: fills in the strut endpoints and the
    /// motor frames for the current pose and solved angles. Consumed by
    /// renderers and the actuator bridge only; it never feeds back into
    /// [`solve`](Platform::solve). Re-run it whenever the pose or the
    /// angles change.
    pub fn configure(&mut self) {
        let rotation = self.pose.rotation();
        let half_wheel = self.geometry.wheel_thickness / 2.0;

        for i in 0..self.struts.len() {
            let base = self.geometry.base_anchor(i);
            let platform =
                rotation * self.geometry.platform_anchor(i) + self.pose.displacement;
            let (normal, tangent) = self.base_frame(i);

            let strut = &mut self.struts[i];
            strut.endpoint_base = base;
            strut.endpoint_platform = platform;
            strut.normal = normal;
            strut.tangent = tangent;
            // Wheel extrudes along the axle, centred on the anchor.
            strut.motor_offset = base - normal * half_wheel;
        }
    }

    /// Tip of the servo crank for strut `i`, from the solved angle. Valid
    /// after [`configure`](Platform::configure).
    pub fn arm_tip(&self, i: usize) -> nalgebra::Point3<f64> {
        let strut = &self.struts[i];
        let swing = strut.tangent * strut.motor_angle.cos()
            + Vector3::y() * strut.motor_angle.sin();
        strut.endpoint_base + swing * self.geometry.strut_arm
    }
}

impl Index<usize> for Platform {
    type Output = StrutState;

    fn index(&self, i: usize) -> &StrutState {
        &self.struts[i]
    }
}
