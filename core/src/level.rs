use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::error::{RelayError, Result};

// The level shape the game expects back. Only used for the strict check;
// the relay always returns the model's JSON untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    pub platforms: Vec<Platform>,
    pub collectibles: Vec<Point>,
    pub goal_position: Point,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// How much the relay checks parsed model output before returning it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any valid JSON object is returned as-is.
    #[default]
    Passthrough,
    /// The JSON must deserialize into [`LevelDescriptor`].
    Strict,
}

impl ValidationMode {
    pub fn check(self, value: &Value) -> Result<()> {
        match self {
            Self::Passthrough => Ok(()),
            Self::Strict => LevelDescriptor::deserialize(value)
                .map(|_| ())
                .map_err(RelayError::Schema),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "" => Ok(Self::Passthrough),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown validation mode '{other}' (expected 'passthrough' or 'strict')"
            )),
        }
    }
}
