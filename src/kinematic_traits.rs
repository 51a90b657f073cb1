//! Shared kinematic types: the platform pose and the per-strut derived
//! state. These are the values every other module exchanges; they carry no
//! behaviour beyond the pose transform itself.

use nalgebra::{Point3, Rotation3, Vector3};

/// Number of pose degrees of freedom the optimiser can weight.
pub const DOF_COUNT: usize = 6;

/// Per-DOF optimiser weights, ordered
/// `[displacement.x, displacement.y, displacement.z, yaw, pitch, roll]`.
/// A weight of exactly `0.0` locks that DOF hard; the optimiser will never
/// touch it.
pub type Freedom = [f64; DOF_COUNT];

/// Freedom vector that locks every degree of freedom.
pub const FREEDOM_LOCKED: Freedom = [0.0; DOF_COUNT];

/// Requested pose of the platform plate relative to the base: attitude in
/// radians plus a displacement of the plate centre. There are no intrinsic
/// bounds; poses outside the struts' reach envelope simply solve with
/// non-zero per-strut error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rotation about the vertical (Y) axis.
    pub yaw: f64,
    /// Rotation about the X axis.
    pub pitch: f64,
    /// Rotation about the Z axis.
    pub roll: f64,
    /// Displacement of the platform centre from the base centre.
    pub displacement: Vector3<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            displacement: Vector3::zeros(),
        }
    }
}

impl Pose {
    /// Attitude rotation with the fixed composition order
    /// `R = Ry(yaw) · Rx(pitch) · Rz(roll)`: roll is applied to the local
    /// point first, yaw last. The solver, the forward expander and every
    /// consumer share this one definition; changing the order here changes
    /// the kinematics everywhere at once.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.roll)
    }

    /// Maps a point from the platform's local frame into the base frame:
    /// rotate, then translate by the displacement.
    pub fn transform(&self, local: &Point3<f64>) -> Point3<f64> {
        self.rotation() * local + self.displacement
    }

    /// Reads DOF `k` using the [`Freedom`] ordering.
    pub(crate) fn dof(&self, k: usize) -> f64 {
        match k {
            0 => self.displacement.x,
            1 => self.displacement.y,
            2 => self.displacement.z,
            3 => self.yaw,
            4 => self.pitch,
            5 => self.roll,
            _ => unreachable!("pose has {DOF_COUNT} degrees of freedom"),
        }
    }

    /// Writes DOF `k` using the [`Freedom`] ordering.
    pub(crate) fn set_dof(&mut self, k: usize, value: f64) {
        match k {
            0 => self.displacement.x = value,
            1 => self.displacement.y = value,
            2 => self.displacement.z = value,
            3 => self.yaw = value,
            4 => self.pitch = value,
            5 => self.roll = value,
            _ => unreachable!("pose has {DOF_COUNT} degrees of freedom"),
        }
    }
}

/// Derived state of one strut. Entirely recomputed by
/// [`Platform::solve`](crate::kinematics_impl::Platform::solve) and
/// [`Platform::configure`](crate::kinematics_impl::Platform::configure)
/// every cycle: it is a pure function of (geometry, pose, strut index) and
/// is never mutated independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrutState {
    /// Solved servo crank angle, radians. Conceptually unbounded; the
    /// actuator adapter wraps it into the principal range before scaling.
    pub motor_angle: f64,

    /// Signed residual between the required and the achievable leg length.
    /// `0.0` means the strut fully reaches its anchor; positive means
    /// over-reach (pose too far), negative means under-reach.
    pub error: f64,

    /// Lower strut endpoint: the anchor on the base plate.
    pub endpoint_base: Point3<f64>,

    /// Upper strut endpoint: the platform anchor after the pose transform.
    pub endpoint_platform: Point3<f64>,

    /// Servo axle direction: the perimeter tangent at the base anchor.
    /// The crank rotates in the plane perpendicular to it.
    pub normal: Vector3<f64>,

    /// Crank zero direction, in the crank plane, horizontal.
    pub tangent: Vector3<f64>,

    /// Centre of the servo wheel.
    pub motor_offset: Point3<f64>,
}

impl Default for StrutState {
    fn default() -> Self {
        StrutState {
            motor_angle: 0.0,
            error: 0.0,
            endpoint_base: Point3::origin(),
            endpoint_platform: Point3::origin(),
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            motor_offset: Point3::origin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_pose_is_identity_transform() {
        let pose = Pose::default();
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = pose.transform(&p);
        assert!((q - p).norm() < 1e-12);
    }

    #[test]
    fn displacement_translates() {
        let pose = Pose {
            displacement: Vector3::new(1.0, -2.0, 3.0),
            ..Pose::default()
        };
        let q = pose.transform(&Point3::origin());
        assert!((q.coords - pose.displacement).norm() < 1e-12);
    }

    #[test]
    fn rotation_order_is_yaw_pitch_roll() {
        // With roll applied first, a quarter-turn roll moves the local X
        // axis to Y; the subsequent quarter-turn yaw about Y leaves it
        // there. The reverse order would land it on -Z instead.
        let pose = Pose {
            yaw: FRAC_PI_2,
            roll: FRAC_PI_2,
            ..Pose::default()
        };
        let q = pose.transform(&Point3::new(1.0, 0.0, 0.0));
        assert!((q - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn yaw_spins_about_the_vertical_axis() {
        let pose = Pose {
            yaw: FRAC_PI_2,
            ..Pose::default()
        };
        let q = pose.transform(&Point3::new(1.0, 0.0, 0.0));
        // nalgebra's Y-axis rotation takes +X towards -Z.
        assert!((q - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn dof_accessors_roundtrip() {
        let mut pose = Pose::default();
        for k in 0..DOF_COUNT {
            pose.set_dof(k, k as f64 + 0.5);
        }
        for k in 0..DOF_COUNT {
            assert_eq!(pose.dof(k), k as f64 + 0.5);
        }
        assert_eq!(pose.displacement, Vector3::new(0.5, 1.5, 2.5));
        assert_eq!((pose.yaw, pose.pitch, pose.roll), (3.5, 4.5, 5.5));
    }
}
