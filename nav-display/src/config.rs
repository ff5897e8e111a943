//! Display configuration.
//!
//! Everything here has a sensible default so a missing or partial file still
//! yields a working display.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arinc429::Arinc429Word;
use crate::deviation::{DeviationKind, DeviationScale};
use crate::modes::EfisSide;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How cross-track error validity is judged for the L/DEV scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XtkValidityPolicy {
    /// Valid whenever the cross-track error is non-zero
    #[default]
    NonZero,
    /// Always valid; visibility depends on the L/DEV request alone
    Always,
    /// The `xtk` channel carries a validated word; valid in normal operation
    Word,
}

impl XtkValidityPolicy {
    /// Whether an xtk reading counts as valid under this policy.
    pub fn is_valid(self, xtk: &Arinc429Word) -> bool {
        match self {
            XtkValidityPolicy::NonZero => xtk.value.abs() > 0.0,
            XtkValidityPolicy::Always => true,
            XtkValidityPolicy::Word => xtk.is_normal_operation(),
        }
    }
}

/// Optional replacement values for a deviation scale
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOverride {
    pub full_scale_dots: Option<f64>,
    pub px_per_dot: Option<f64>,
    pub time_constant_s: Option<f64>,
}

impl ScaleOverride {
    pub fn apply(&self, mut scale: DeviationScale) -> DeviationScale {
        if let Some(divisor) = self.full_scale_dots {
            scale.full_scale_dots = divisor;
        }
        if let Some(px) = self.px_per_dot {
            scale.px_per_dot = px;
        }
        if let Some(tau) = self.time_constant_s {
            scale.time_constant_s = Some(tau);
        }
        scale
    }

    fn validate(&self, field: &'static str) -> ConfigResult<()> {
        let values = [self.full_scale_dots, self.px_per_dot, self.time_constant_s];
        match values.into_iter().flatten().find(|v| !v.is_finite() || *v <= 0.0) {
            Some(bad) => Err(ConfigError::Invalid {
                field,
                reason: format!("{bad} is not a positive finite number"),
            }),
            None => Ok(()),
        }
    }
}

/// Per-indicator scale overrides
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorOverrides {
    pub localizer: ScaleOverride,
    pub glideslope: ScaleOverride,
    pub lateral_deviation: ScaleOverride,
    pub vertical_deviation: ScaleOverride,
}

impl IndicatorOverrides {
    pub fn get(&self, kind: DeviationKind) -> &ScaleOverride {
        match kind {
            DeviationKind::Localizer => &self.localizer,
            DeviationKind::Glideslope => &self.glideslope,
            DeviationKind::LateralDeviation => &self.lateral_deviation,
            DeviationKind::VerticalDeviation => &self.vertical_deviation,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbologyConfig {
    /// PFD display index (1 captain, 2 first officer)
    pub display_index: u8,
    /// EFIS side the ND belongs to
    pub side: EfisSide,
    /// Aircraft heading reference is true north
    pub aircraft_true_ref: bool,
    /// ND is in track-up orientation
    pub track_up: bool,
    pub xtk_validity: XtkValidityPolicy,
    pub indicators: IndicatorOverrides,
}

impl Default for SymbologyConfig {
    fn default() -> Self {
        Self {
            display_index: 1,
            side: EfisSide::L,
            aircraft_true_ref: false,
            track_up: false,
            xtk_validity: XtkValidityPolicy::default(),
            indicators: IndicatorOverrides::default(),
        }
    }
}

impl SymbologyConfig {
    /// Preset scale for `kind` with any configured overrides applied.
    pub fn scale(&self, kind: DeviationKind) -> DeviationScale {
        self.indicators.get(kind).apply(DeviationScale::preset(kind))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=2).contains(&self.display_index) {
            return Err(ConfigError::Invalid {
                field: "display_index",
                reason: format!("{} is not 1 or 2", self.display_index),
            });
        }
        self.indicators.localizer.validate("indicators.localizer")?;
        self.indicators.glideslope.validate("indicators.glideslope")?;
        self.indicators
            .lateral_deviation
            .validate("indicators.lateral_deviation")?;
        self.indicators
            .vertical_deviation
            .validate("indicators.vertical_deviation")?;
        Ok(())
    }

    /// Save to a JSON file
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file and validate
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
