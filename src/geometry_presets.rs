//! Hardcoded platform geometries for demos and tests.

use crate::geometry::{Geometry, PlatformShape};

#[allow(dead_code)]
impl Geometry {
    /// Symmetric 6-strut demo platform. The base is a hexagon with anchors
    /// on the edge bisectors, the platform a hexagon with anchors on the
    /// vertices, so neighbouring struts cross the way the classic hexapod
    /// rigs do. Every strut is reachable at the identity pose.
    pub fn demo() -> Self {
        Geometry {
            struts: 6,
            base_radii: [200.0, 200.0],
            platform_radii: [120.0, 120.0],
            base_shape: PlatformShape::PolyEdge,
            platform_shape: PlatformShape::Polygon,
            base_thickness: 12.0,
            platform_thickness: 8.0,
            strut_arm: 30.0,
            strut_length: 100.0,
            wheel_thickness: 6.0,
        }
    }

    /// Elliptical variant of the demo model, useful for exercising
    /// anisotropic anchor rings.
    pub fn demo_elliptic() -> Self {
        Geometry {
            base_radii: [220.0, 180.0],
            platform_radii: [130.0, 110.0],
            base_shape: PlatformShape::Ellipse,
            platform_shape: PlatformShape::Ellipse,
            ..Self::demo()
        }
    }

    /// Small desktop rig driven by hobby servos; tight reach envelope, so
    /// moderate poses already produce per-strut errors for the optimiser
    /// to work on.
    pub fn desktop_rig() -> Self {
        Geometry {
            struts: 6,
            base_radii: [80.0, 80.0],
            platform_radii: [50.0, 50.0],
            base_shape: PlatformShape::Polygon,
            platform_shape: PlatformShape::Polygon,
            base_thickness: 5.0,
            platform_thickness: 4.0,
            strut_arm: 12.0,
            strut_length: 38.0,
            wheel_thickness: 3.0,
        }
    }
}
