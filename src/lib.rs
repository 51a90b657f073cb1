//! Rust implementation of inverse kinematics, anytime error optimisation and
//! real-time pacing for six-strut Stewart motion platforms driven by servo
//! cranks.
//!
//! A session owns an immutable [`geometry::Geometry`] (plate shapes, radii,
//! crank and rod lengths) and a mutable [`kinematic_traits::Pose`] (yaw,
//! pitch, roll, displacement). Each control cycle the
//! [`kinematics_impl::Platform`] session solves the closed-form servo angle
//! per strut, reporting a signed reach error instead of failing when the
//! pose is infeasible; the anytime optimiser in [`optimizer`] then perturbs
//! the pose under caller-weighted priorities to shrink the aggregate error,
//! in bounded chunks against the deadline computed by [`pacer::Pacer`].
//!
//! # Features
//!
//! - Unreachable poses are first-class results: every strut carries a
//!   signed residual, the session a sum-of-squares fitness, and nothing in
//!   the core ever throws for numeric infeasibility.
//! - Degrees of freedom can be locked hard (zero weight) so the optimiser
//!   compromises only on what the caller is willing to give up.
//! - The pacing controller is asymmetric on purpose: it sheds rate-limiting
//!   delay aggressively when the loop runs behind and rebuilds it gently
//!   when ahead.
//! - The servo hardware sits behind the [`actuator::ServoLink`] trait;
//!   link failures degrade the bridge to a disconnected state without
//!   stalling the cycle.
//!
//! # Examples
//!
//! See `src/main.rs` for a complete headless session: demo geometry, a few
//! paced control cycles, optimisation of an unreachable pose and the duty
//! cycles that would go to the servos.

pub mod geometry;
pub mod geometry_presets;

pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod optimizer;

pub mod pacer;
pub mod control_loop;

pub mod input;
pub mod actuator;

pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod session_from_file;
#[cfg(feature = "allow_filesystem")]
pub mod config_error;
