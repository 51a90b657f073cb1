//! Bridge between solved motor angles and a servo controller. The
//! hardware itself sits behind the [`ServoLink`] trait; this module owns
//! the degrade-to-disconnected policy so a flaky link can never stall or
//! crash the control cycle.

use crate::kinematic_traits::StrutState;
use std::f64::consts::PI;
use std::fmt;
use tracing::{info, warn};

/// Maps a motor angle onto a normalised duty-cycle fraction in [0, 100]:
/// `asin(sin(angle))` wraps into the principal range [-π/2, π/2], which
/// then scales linearly onto [25, 75] around the 50 midpoint.
pub fn duty_cycle(angle: f64) -> f64 {
    (angle.sin().asin() * 50.0 / PI + 50.0).clamp(0.0, 100.0)
}

/// Neutral duty cycle: crank level, angle zero.
pub const DUTY_NEUTRAL: f64 = 50.0;

/// Failure reported by a [`ServoLink`]. Crossing the core boundary it is
/// always a value, never a panic.
#[derive(Debug)]
pub enum LinkError {
    /// The link is gone (unplugged, closed); reconnect explicitly.
    Disconnected,
    /// The link is present but refused the command.
    Failed(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkError::Disconnected => write!(f, "servo link disconnected"),
            LinkError::Failed(reason) => write!(f, "servo link failed: {}", reason),
        }
    }
}

impl std::error::Error for LinkError {}

/// Connection state of the bridge, reported to the operator after every
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

/// The seam to the servo hardware. Channel numbering follows strut
/// indices. Implementations must not block the control cycle beyond a
/// single command's round trip.
pub trait ServoLink {
    /// Drives one channel to a duty-cycle fraction in [0, 100].
    fn set_duty(&mut self, channel: usize, duty: f64) -> Result<(), LinkError>;

    /// Returns all channels to neutral.
    fn reset(&mut self, channels: usize) -> Result<(), LinkError> {
        for channel in 0..channels {
            self.set_duty(channel, DUTY_NEUTRAL)?;
        }
        Ok(())
    }
}

/// Owns the optional hardware link and keeps the core total: any link
/// failure logs, drops the link and leaves the bridge disconnected; the
/// control loop carries on and the operator reconnects explicitly.
#[derive(Default)]
pub struct ServoBridge {
    link: Option<Box<dyn ServoLink>>,
    channels: usize,
}

impl ServoBridge {
    /// A bridge with no hardware attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LinkStatus {
        if self.link.is_some() {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }

    /// Attaches a link driving `channels` servos. Replaces any previous
    /// link without resetting it.
    pub fn connect(&mut self, link: Box<dyn ServoLink>, channels: usize) {
        info!(channels, "servo link connected");
        self.link = Some(link);
        self.channels = channels;
    }

    /// Detaches the link, returning the servos to neutral first on a best
    /// effort basis.
    pub fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            if let Err(error) = link.reset(self.channels) {
                warn!(%error, "servo reset on disconnect failed");
            }
        }
    }

    /// Pushes the solved angles of all struts to the hardware. On failure
    /// the bridge degrades to disconnected and reports it; it never blocks
    /// the cycle retrying.
    pub fn update(&mut self, struts: &[StrutState]) -> LinkStatus {
        if let Some(link) = self.link.as_mut() {
            let mut failure = None;
            for (channel, strut) in struts.iter().enumerate() {
                if let Err(error) = link.set_duty(channel, duty_cycle(strut.motor_angle)) {
                    failure = Some((channel, error));
                    break;
                }
            }
            if let Some((channel, error)) = failure {
                warn!(channel, %error, "servo link lost; running disconnected");
                self.link = None;
                return LinkStatus::Disconnected;
            }
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[test]
    fn duty_cycle_midpoint_and_extremes() {
        assert_eq!(duty_cycle(0.0), 50.0);
        assert!((duty_cycle(FRAC_PI_2) - 75.0).abs() < 1e-9);
        assert!((duty_cycle(-FRAC_PI_2) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn duty_cycle_wraps_into_the_principal_range() {
        // A full half-turn folds back to neutral; angles beyond π/2 mirror.
        assert!((duty_cycle(PI) - 50.0).abs() < 1e-9);
        assert!((duty_cycle(PI - 0.3) - duty_cycle(0.3)).abs() < 1e-9);
        assert!((duty_cycle(2.0 * PI + 0.3) - duty_cycle(0.3)).abs() < 1e-9);
    }

    /// Records duties; fails every command once poisoned.
    struct MockLink {
        duties: Arc<Mutex<Vec<(usize, f64)>>>,
        poisoned: bool,
    }

    impl ServoLink for MockLink {
        fn set_duty(&mut self, channel: usize, duty: f64) -> Result<(), LinkError> {
            if self.poisoned {
                return Err(LinkError::Failed("mock poisoned".into()));
            }
            self.duties.lock().unwrap().push((channel, duty));
            Ok(())
        }
    }

    fn struts_with_angles(angles: &[f64]) -> Vec<StrutState> {
        angles
            .iter()
            .map(|&motor_angle| StrutState {
                motor_angle,
                ..StrutState::default()
            })
            .collect()
    }

    #[test]
    fn update_pushes_one_duty_per_strut() {
        let duties = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = ServoBridge::disconnected();
        bridge.connect(
            Box::new(MockLink {
                duties: Arc::clone(&duties),
                poisoned: false,
            }),
            6,
        );

        let struts = struts_with_angles(&[0.0, 0.1, -0.1, 0.5, -0.5, 0.0]);
        assert_eq!(bridge.update(&struts), LinkStatus::Connected);

        let sent = duties.lock().unwrap();
        assert_eq!(sent.len(), 6);
        for (channel, duty) in sent.iter() {
            assert!((duty - duty_cycle(struts[*channel].motor_angle)).abs() < 1e-12);
        }
    }

    #[test]
    fn failed_link_degrades_to_disconnected() {
        let duties = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = ServoBridge::disconnected();
        bridge.connect(
            Box::new(MockLink {
                duties,
                poisoned: true,
            }),
            6,
        );

        let struts = struts_with_angles(&[0.0; 6]);
        assert_eq!(bridge.update(&struts), LinkStatus::Disconnected);
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        // Stays disconnected; no implicit retry.
        assert_eq!(bridge.update(&struts), LinkStatus::Disconnected);
    }

    #[test]
    fn disconnect_resets_channels_to_neutral() {
        let duties = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = ServoBridge::disconnected();
        bridge.connect(
            Box::new(MockLink {
                duties: Arc::clone(&duties),
                poisoned: false,
            }),
            3,
        );
        bridge.disconnect();
        let sent = duties.lock().unwrap();
        assert_eq!(sent.as_slice(), &[(0, 50.0), (1, 50.0), (2, 50.0)]);
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
    }

    #[test]
    fn update_without_a_link_is_a_quiet_no_op() {
        let mut bridge = ServoBridge::disconnected();
        let struts = struts_with_angles(&[0.0; 6]);
        assert_eq!(bridge.update(&struts), LinkStatus::Disconnected);
    }
}
