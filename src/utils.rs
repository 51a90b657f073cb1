//! Helper functions

use crate::kinematics_impl::Platform;

/// Print solved motor angles for all struts, converting radians to degrees,
/// with the signed reach error alongside.
#[allow(dead_code)]
pub fn dump_struts(platform: &Platform) {
    for i in 0..platform.geometry().struts {
        let strut = &platform[i];
        println!(
            "strut {}: angle {:7.2}°  error {:+.3}",
            i,
            strut.motor_angle.to_degrees(),
            strut.error
        );
    }
}

/// Allows specifying an attitude in degrees (converts to radians).
#[allow(dead_code)]
pub fn as_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_convert() {
        assert!((as_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
    }
}
