//! Supports reading the session configuration from a YAML file (optional).
//! The file describes everything that is static for a session: the
//! platform geometry, the target cycle rate and the optimiser weights.

use crate::config_error::ConfigError;
use crate::geometry::{Geometry, PlatformShape};
use crate::kinematic_traits::{DOF_COUNT, Freedom};
use crate::optimizer::OptimiserSettings;
use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

/// Static session description loaded at startup; nothing here changes
/// while the control loop runs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub geometry: Geometry,
    pub target_rate: f64,
    pub optimiser: OptimiserSettings,
}

impl SessionConfig {
    /// Reads the session configuration from a YAML file like this:
    /// ```yaml
    /// platform:
    ///   struts: 6
    ///   base_radii: [200, 200]
    ///   base_shape: polyedge
    ///   platform_radii: [120, 120]
    ///   platform_shape: polygon
    ///   base_thickness: 12
    ///   platform_thickness: 8
    ///   strut_arm: 30
    ///   strut_length: 100
    ///   wheel_thickness: 6
    /// control:
    ///   target_rate: 60
    /// optimiser:
    ///   freedom: [5, 10, 5, 0.2, 0.2, 0.2]
    ///   jumpscale: 1.0
    ///   chunk: 30
    /// ```
    /// The `control` and `optimiser` sections are optional and default to
    /// 60 Hz and [`OptimiserSettings::default`].
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parses the configuration from YAML text; see
    /// [`from_yaml_file`](SessionConfig::from_yaml_file) for the format.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}", e)))?;
        let doc = docs
            .first()
            .ok_or_else(|| ConfigError::ParseError("empty configuration".to_string()))?;

        let platform = &doc["platform"];
        if platform.is_badvalue() {
            return Err(ConfigError::MissingField("platform".to_string()));
        }

        let geometry = Geometry {
            struts: usize_field(platform, "struts")?,
            base_radii: radii_field(platform, "base_radii")?,
            platform_radii: radii_field(platform, "platform_radii")?,
            base_shape: shape_field(platform, "base_shape")?,
            platform_shape: shape_field(platform, "platform_shape")?,
            base_thickness: f64_field(platform, "base_thickness")?,
            platform_thickness: f64_field(platform, "platform_thickness")?,
            strut_arm: f64_field(platform, "strut_arm")?,
            strut_length: f64_field(platform, "strut_length")?,
            wheel_thickness: f64_field(platform, "wheel_thickness")?,
        };
        validate_geometry(&geometry)?;

        let control = &doc["control"];
        let target_rate = if control.is_badvalue() {
            60.0
        } else {
            f64_field(control, "target_rate")?
        };
        if !(target_rate > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "target_rate must be positive (got {})",
                target_rate
            )));
        }

        let optimiser = optimiser_section(&doc["optimiser"])?;

        Ok(SessionConfig {
            geometry,
            target_rate,
            optimiser,
        })
    }
}

fn validate_geometry(geometry: &Geometry) -> Result<(), ConfigError> {
    if geometry.struts < 3 {
        return Err(ConfigError::InvalidValue(format!(
            "struts must be at least 3 (got {})",
            geometry.struts
        )));
    }
    if !(geometry.strut_arm > 0.0) || !(geometry.strut_length > geometry.strut_arm) {
        return Err(ConfigError::InvalidValue(
            "strut_length must exceed strut_arm, both positive".to_string(),
        ));
    }
    for (name, radii) in [
        ("base_radii", &geometry.base_radii),
        ("platform_radii", &geometry.platform_radii),
    ] {
        if radii.iter().any(|r| !(*r > 0.0)) {
            return Err(ConfigError::InvalidValue(format!(
                "{} must be positive",
                name
            )));
        }
    }
    Ok(())
}

fn optimiser_section(section: &Yaml) -> Result<OptimiserSettings, ConfigError> {
    if section.is_badvalue() {
        return Ok(OptimiserSettings::default());
    }
    let defaults = OptimiserSettings::default();

    let freedom = match &section["freedom"] {
        Yaml::BadValue => defaults.freedom,
        value => {
            let values = yaml_f64_array(value, "optimiser.freedom")?;
            if values.len() != DOF_COUNT {
                return Err(ConfigError::InvalidValue(format!(
                    "optimiser.freedom needs {} weights (got {})",
                    DOF_COUNT,
                    values.len()
                )));
            }
            let mut freedom: Freedom = [0.0; DOF_COUNT];
            freedom.copy_from_slice(&values);
            if freedom.iter().any(|w| *w < 0.0) {
                return Err(ConfigError::InvalidValue(
                    "optimiser.freedom weights must be non-negative".to_string(),
                ));
            }
            freedom
        }
    };

    let jumpscale = match yaml_f64(&section["jumpscale"]) {
        Some(v) if v > 0.0 => v,
        Some(v) => {
            return Err(ConfigError::InvalidValue(format!(
                "optimiser.jumpscale must be positive (got {})",
                v
            )));
        }
        None => defaults.jumpscale,
    };

    let chunk = match section["chunk"].as_i64() {
        Some(v) if v > 0 => v as usize,
        Some(v) => {
            return Err(ConfigError::InvalidValue(format!(
                "optimiser.chunk must be positive (got {})",
                v
            )));
        }
        None => defaults.chunk,
    };

    Ok(OptimiserSettings {
        freedom,
        jumpscale,
        chunk,
    })
}

/// Reads a scalar as f64, accepting both YAML integers and reals.
fn yaml_f64(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Integer(i) => Some(*i as f64),
        other => other.as_f64(),
    }
}

fn f64_field(section: &Yaml, name: &str) -> Result<f64, ConfigError> {
    yaml_f64(&section[name]).ok_or_else(|| ConfigError::MissingField(name.to_string()))
}

fn usize_field(section: &Yaml, name: &str) -> Result<usize, ConfigError> {
    let value = section[name]
        .as_i64()
        .ok_or_else(|| ConfigError::MissingField(name.to_string()))?;
    if value < 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{} cannot be negative (got {})",
            name, value
        )));
    }
    Ok(value as usize)
}

fn yaml_f64_array(value: &Yaml, name: &str) -> Result<Vec<f64>, ConfigError> {
    let items = value
        .as_vec()
        .ok_or_else(|| ConfigError::InvalidValue(format!("{} must be a sequence", name)))?;
    items
        .iter()
        .map(|item| {
            yaml_f64(item).ok_or_else(|| {
                ConfigError::InvalidValue(format!("{} must contain numbers", name))
            })
        })
        .collect()
}

fn radii_field(section: &Yaml, name: &str) -> Result<[f64; 2], ConfigError> {
    let values = yaml_f64_array(&section[name], name)?;
    match values.as_slice() {
        [rx, rz] => Ok([*rx, *rz]),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} needs exactly two semi-axes (got {})",
            name,
            values.len()
        ))),
    }
}

fn shape_field(section: &Yaml, name: &str) -> Result<PlatformShape, ConfigError> {
    let text = section[name]
        .as_str()
        .ok_or_else(|| ConfigError::MissingField(name.to_string()))?;
    match text {
        "ellipse" => Ok(PlatformShape::Ellipse),
        "polygon" => Ok(PlatformShape::Polygon),
        "polyedge" => Ok(PlatformShape::PolyEdge),
        other => Err(ConfigError::InvalidValue(format!(
            "{}: unknown shape '{}' (expected ellipse, polygon or polyedge)",
            name, other
        ))),
    }
}
