//! File configuration for tab parameters.
//!
//! Angles are written in degrees; [`TabParameters`] holds radians.

use std::path::Path;

use bintab_math::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TabError;
use crate::params::{
    TabFillets, TabMethod, TabParameters, DEFAULT_LABEL_ANGLE, DEFAULT_OVERHANG_ANGLE,
    DEFAULT_ROOT_THICKNESS, DEFAULT_TIP_THICKNESS,
};

/// Errors from loading or converting a [`TabConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON parse or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The values parsed but do not form valid parameters.
    #[error(transparent)]
    Invalid(#[from] TabError),
}

/// Profile method as written in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum MethodConfig {
    /// Triangular tab from an overhang angle.
    Angle {
        /// Overhang angle from vertical, in degrees.
        #[serde(default = "default_overhang_deg")]
        overhang_angle_deg: f64,
        /// Label face tilt, in degrees.
        #[serde(default = "default_label_deg")]
        label_angle_deg: f64,
    },
    /// Quadrilateral tab from explicit thicknesses.
    Dimensions {
        /// Thickness at the wall.
        #[serde(default = "default_root_thickness")]
        root_thickness: f64,
        /// Thickness at the tip.
        #[serde(default = "default_tip_thickness")]
        tip_thickness: f64,
    },
}

fn default_overhang_deg() -> f64 {
    DEFAULT_OVERHANG_ANGLE.to_degrees()
}

fn default_label_deg() -> f64 {
    DEFAULT_LABEL_ANGLE.to_degrees()
}

fn default_root_thickness() -> f64 {
    DEFAULT_ROOT_THICKNESS
}

fn default_tip_thickness() -> f64 {
    DEFAULT_TIP_THICKNESS
}

impl Default for MethodConfig {
    fn default() -> Self {
        TabMethod::default().into()
    }
}

impl From<TabMethod> for MethodConfig {
    fn from(method: TabMethod) -> Self {
        match method {
            TabMethod::Angle {
                overhang_angle,
                label_angle,
            } => MethodConfig::Angle {
                overhang_angle_deg: overhang_angle.to_degrees(),
                label_angle_deg: label_angle.to_degrees(),
            },
            TabMethod::Dimensions {
                root_thickness,
                tip_thickness,
            } => MethodConfig::Dimensions {
                root_thickness,
                tip_thickness,
            },
        }
    }
}

impl From<MethodConfig> for TabMethod {
    fn from(method: MethodConfig) -> Self {
        match method {
            MethodConfig::Angle {
                overhang_angle_deg,
                label_angle_deg,
            } => TabMethod::Angle {
                overhang_angle: overhang_angle_deg.to_radians(),
                label_angle: label_angle_deg.to_radians(),
            },
            MethodConfig::Dimensions {
                root_thickness,
                tip_thickness,
            } => TabMethod::Dimensions {
                root_thickness,
                tip_thickness,
            },
        }
    }
}

/// Fillet radii; missing entries take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilletConfig {
    /// Upper tip edge.
    pub top: f64,
    /// Lower tip edge.
    pub bottom: f64,
    /// Root-bottom corner.
    pub back: f64,
}

impl Default for FilletConfig {
    fn default() -> Self {
        TabFillets::default().into()
    }
}

impl From<TabFillets> for FilletConfig {
    fn from(f: TabFillets) -> Self {
        Self {
            top: f.top,
            bottom: f.bottom,
            back: f.back,
        }
    }
}

/// A tab description as stored in TOML or JSON.
///
/// ```toml
/// origin = [0.0, 0.0, 4.2]
/// width = 1.2
/// length = 4.2
///
/// [method]
/// type = "dimensions"
/// root_thickness = 0.14
/// tip_thickness = 0.14
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabConfig {
    /// Reference corner `[x, y, z]`.
    #[serde(default)]
    pub origin: [f64; 3],
    /// Drop from `origin.z` to the top edge.
    #[serde(default)]
    pub top_clearance: f64,
    /// Tab depth.
    pub width: f64,
    /// Extrusion distance.
    pub length: f64,
    /// Profile method.
    #[serde(default)]
    pub method: MethodConfig,
    /// Fillet radii.
    #[serde(default)]
    pub fillets: FilletConfig,
}

impl TabConfig {
    /// Parse TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Render as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate into [`TabParameters`].
    pub fn to_parameters(&self) -> Result<TabParameters, TabError> {
        let [x, y, z] = self.origin;
        TabParameters::builder()
            .origin(Point3::new(x, y, z))
            .top_clearance(self.top_clearance)
            .width(self.width)
            .length(self.length)
            .method(self.method.into())
            .fillets(TabFillets {
                top: self.fillets.top,
                bottom: self.fillets.bottom,
                back: self.fillets.back,
            })
            .build()
    }
}

impl From<&TabParameters> for TabConfig {
    fn from(params: &TabParameters) -> Self {
        let origin = params.origin();
        Self {
            origin: [origin.x, origin.y, origin.z],
            top_clearance: params.top_clearance(),
            width: params.width(),
            length: params.length(),
            method: params.method().into(),
            fillets: params.fillets().into(),
        }
    }
}
