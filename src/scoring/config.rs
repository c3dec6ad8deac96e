use serde::{Deserialize, Serialize};

/// Default share of the list (from the bottom) that scores linearly.
pub const DEFAULT_PIVOT_FRACTION: f64 = 0.5;

/// Default ratio between the best score and the pivot score.
pub const DEFAULT_TOP_MULTIPLIER: f64 = 8.0;

/// How fractional points on the exponential part of the curve are rounded.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    #[default]
    Nearest,
    Floor,
    Ceil,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Nearest => value.round(),
            Rounding::Floor => value.floor(),
            Rounding::Ceil => value.ceil(),
        }
    }
}

/// Points curve configuration.
///
/// The bottom `pivot_fraction` of the list scores 1, 2, 3, ... and the rest
/// grows geometrically up to `top_multiplier` times the pivot score.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   pivot_fraction: 0.5
///   top_multiplier: 8
///   rounding: nearest
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Fraction of the list (0.0..=1.0) scored linearly (default: 0.5)
    #[serde(default)]
    pub pivot_fraction: Option<f64>,

    /// Best score as a multiple of the pivot score, must be >= 1 (default: 8)
    #[serde(default)]
    pub top_multiplier: Option<f64>,

    /// Rounding mode: "nearest", "floor" or "ceil" (default: nearest)
    #[serde(default)]
    pub rounding: Option<Rounding>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pivot_fraction: Some(DEFAULT_PIVOT_FRACTION),
            top_multiplier: Some(DEFAULT_TOP_MULTIPLIER),
            rounding: Some(Rounding::Nearest),
        }
    }
}

impl ScoringConfig {
    pub fn pivot_fraction(&self) -> f64 {
        self.pivot_fraction.unwrap_or(DEFAULT_PIVOT_FRACTION)
    }

    pub fn top_multiplier(&self) -> f64 {
        self.top_multiplier.unwrap_or(DEFAULT_TOP_MULTIPLIER)
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding.unwrap_or_default()
    }
}
