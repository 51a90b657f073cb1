//! Static geometric model of a Stewart platform: base and platform shapes,
//! strut anchor generation and reach bounds. Immutable for the lifetime of
//! a session; everything downstream (solver, optimiser, consumers) reads it.

use nalgebra::Point3;
use std::f64::consts::PI;

/// Outline of the base or platform plate. Closed set; there is no
/// open-ended shape dispatch anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformShape {
    /// Smooth ellipse (circle when both radii are equal).
    Ellipse,
    /// Regular polygon with strut anchors at the vertices.
    Polygon,
    /// Regular polygon with strut anchors on the edge bisectors.
    PolyEdge,
}

impl PlatformShape {
    /// Angular offset applied to every anchor so that `PolyEdge` anchors
    /// fall mid-edge rather than on vertices.
    pub fn anchor_offset(&self, struts: usize) -> f64 {
        match self {
            PlatformShape::PolyEdge => PI / struts as f64,
            PlatformShape::Ellipse | PlatformShape::Polygon => 0.0,
        }
    }

    /// Perimeter tessellation for renderers: polygons keep one segment per
    /// strut, ellipses are drawn smooth.
    pub fn segments(&self, struts: usize) -> usize {
        match self {
            PlatformShape::Ellipse => 60,
            PlatformShape::Polygon | PlatformShape::PolyEdge => struts,
        }
    }
}

/// Geometric description of the platform. Constructed once at startup;
/// see [`Geometry::demo`](crate::geometry_presets) for a ready-made model.
///
/// Lengths are in model units (whatever unit the radii are expressed in);
/// all angles throughout the crate are radians.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Number of struts N. Must be at least 3 and stays constant for the
    /// session.
    pub struts: usize,

    /// Base plate semi-axes `[rx, rz]`. Equal values give a circle or a
    /// regular polygon.
    pub base_radii: [f64; 2],

    /// Platform plate semi-axes `[rx, rz]`.
    pub platform_radii: [f64; 2],

    /// Outline of the base plate.
    pub base_shape: PlatformShape,

    /// Outline of the platform plate.
    pub platform_shape: PlatformShape,

    /// Base plate thickness (carried through to rendering consumers).
    pub base_thickness: f64,

    /// Platform plate thickness.
    pub platform_thickness: f64,

    /// Servo arm (crank) radius.
    pub strut_arm: f64,

    /// Fixed length of the upper strut rod, from the crank tip to the
    /// platform anchor.
    pub strut_length: f64,

    /// Extrusion of the servo wheel along its axle.
    pub wheel_thickness: f64,
}

impl Geometry {
    /// Angle of anchor `i` around the perimeter: `2π·i/N` plus the shape's
    /// edge-bisector offset.
    pub fn anchor_angle(&self, shape: PlatformShape, i: usize) -> f64 {
        2.0 * PI * i as f64 / self.struts as f64 + shape.anchor_offset(self.struts)
    }

    /// Anchor of strut `i` on the base plate, in the base frame (Y up,
    /// plate in the Y = 0 plane).
    pub fn base_anchor(&self, i: usize) -> Point3<f64> {
        let phi = self.anchor_angle(self.base_shape, i);
        Point3::new(
            self.base_radii[0] * phi.cos(),
            0.0,
            self.base_radii[1] * phi.sin(),
        )
    }

    /// Anchor of strut `i` on the platform plate, in the platform's local
    /// frame (before the pose transform is applied).
    pub fn platform_anchor(&self, i: usize) -> Point3<f64> {
        let phi = self.anchor_angle(self.platform_shape, i);
        Point3::new(
            self.platform_radii[0] * phi.cos(),
            0.0,
            self.platform_radii[1] * phi.sin(),
        )
    }

    /// Shortest leg length a strut can realise (crank folded back along
    /// the rod).
    pub fn min_reach(&self) -> f64 {
        (self.strut_length - self.strut_arm).abs()
    }

    /// Longest leg length a strut can realise (crank and rod in line).
    pub fn max_reach(&self) -> f64 {
        self.strut_length + self.strut_arm
    }

    /// Panics on programming-level misconfiguration. Called once when the
    /// session is created; numeric infeasibility of poses is never an
    /// error, but a malformed model is.
    pub(crate) fn assert_valid(&self) {
        assert!(self.struts >= 3, "a platform needs at least 3 struts");
        assert!(
            self.strut_arm > 0.0 && self.strut_length > self.strut_arm,
            "strut rod must be longer than the servo arm, both positive"
        );
        assert!(
            self.base_radii.iter().all(|r| *r > 0.0)
                && self.platform_radii.iter().all(|r| *r > 0.0),
            "plate radii must be positive"
        );
    }
}
