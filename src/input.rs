//! Input adapter: maps pointer position and button state onto the pose.
//! The window system publishes events into [`InputState`]; the control
//! loop drains it exactly once per cycle via [`InputState::apply`].

use crate::kinematic_traits::Pose;
use bitflags::bitflags;
use std::f64::consts::PI;

/// Fraction of the field of view a full window traverse maps to, for both
/// roll and pitch.
pub const FOV_FRACTION: f64 = PI / 4.0;

/// Yaw angular acceleration while a rotate button is held, rad/s².
pub const YAW_ACCELERATION: f64 = 50.0;

/// Base of the per-second exponential yaw-rate decay: `ω *= 0.01^dt`.
pub const YAW_DECAY_BASE: f64 = 0.01;

bitflags! {
    /// Held input buttons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        /// Accelerates yaw in the positive direction while held.
        const ROTATE_LEFT = 1;
        /// Accelerates yaw in the negative direction while held.
        const ROTATE_RIGHT = 2;
        /// Suspends the optimiser while held, exposing raw strut errors.
        const HOLD_OPTIMISER = 4;
    }
}

/// Accumulated input since the last cycle. Pointer attitude is absolute
/// and applied once per event; yaw is integrated from the rotate buttons
/// with exponential decay, so it coasts to a stop when released.
#[derive(Debug, Default)]
pub struct InputState {
    buttons: Buttons,
    yaw_rate: f64,
    pending_attitude: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, buttons: Buttons) {
        self.buttons |= buttons;
    }

    pub fn release(&mut self, buttons: Buttons) {
        self.buttons &= !buttons;
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Pointer moved to `(x, y)` in a window of `width` × `height`:
    /// requests the absolute roll/pitch for the next cycle, scaled so a
    /// full traverse spans [`FOV_FRACTION`] and the window centre is
    /// level.
    pub fn pointer(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let roll = FOV_FRACTION * (x / width - 0.5);
        let pitch = FOV_FRACTION * (y / height - 0.5);
        self.pending_attitude = Some((roll, pitch));
    }

    /// Whether the optimiser should run this cycle.
    pub fn optimise_enabled(&self) -> bool {
        !self.buttons.contains(Buttons::HOLD_OPTIMISER)
    }

    /// Current integrated yaw rate, rad/s.
    pub fn yaw_rate(&self) -> f64 {
        self.yaw_rate
    }

    /// Applies one cycle's worth of input to the pose: takes any pending
    /// pointer attitude, integrates the yaw rate over `dt` seconds and
    /// decays it. Called exactly once per cycle by the control loop.
    pub fn apply(&mut self, pose: &mut Pose, dt: f64) {
        if let Some((roll, pitch)) = self.pending_attitude.take() {
            pose.roll = roll;
            pose.pitch = pitch;
        }
        if self.buttons.contains(Buttons::ROTATE_LEFT) {
            self.yaw_rate += YAW_ACCELERATION * dt;
        }
        if self.buttons.contains(Buttons::ROTATE_RIGHT) {
            self.yaw_rate -= YAW_ACCELERATION * dt;
        }
        pose.yaw += self.yaw_rate * dt;
        self.yaw_rate *= YAW_DECAY_BASE.powf(dt);
    }
}
