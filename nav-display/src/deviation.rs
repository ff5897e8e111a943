//! Deviation indicators: localizer, glideslope, lateral and vertical deviation.
//!
//! All four share one pipeline:
//!
//! 1. Optional input quantisation (L/DEV only reacts to 0.001 nm changes)
//! 2. Optional lag filter
//! 3. Division by the full-scale divisor to obtain dots
//! 4. Classification against the ±2 dot limits
//!
//! The governing validity signal is coupled to the filter: whenever it is
//! absent the indicator is hidden *and* the filter is reset in the same call,
//! so that a re-acquired signal never resumes from a stale average.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::LagFilter;

/// Dots at which the indicator pegs (strictly beyond this value)
pub const PEG_LIMIT_DOTS: f64 = 2.0;

/// Direction in which a centered symbol is translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Discrete indication derived from a dots reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    /// Beyond +2 dots; only the high peg symbol is shown
    PeggedHigh,
    /// Beyond -2 dots; only the low peg symbol is shown
    PeggedLow,
    /// Within ±2 dots (inclusive); centered symbol translated by `offset_px`
    Centered { dots: f64, offset_px: f64 },
}

impl IndicatorState {
    pub fn is_pegged(&self) -> bool {
        !matches!(self, IndicatorState::Centered { .. })
    }
}

/// Classify a dots reading. Exactly ±2 dots stays centered.
pub fn classify_dots(dots: f64, px_per_dot: f64) -> IndicatorState {
    if dots > PEG_LIMIT_DOTS {
        IndicatorState::PeggedHigh
    } else if dots < -PEG_LIMIT_DOTS {
        IndicatorState::PeggedLow
    } else {
        IndicatorState::Centered {
            dots,
            offset_px: dots * px_per_dot,
        }
    }
}

/// Which deviation a preset describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum DeviationKind {
    #[strum(to_string = "LOC")]
    Localizer,
    #[strum(to_string = "G/S")]
    Glideslope,
    #[strum(to_string = "L/DEV")]
    LateralDeviation,
    #[strum(to_string = "V/DEV")]
    VerticalDeviation,
}

/// Static scaling of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationScale {
    /// Raw deviation units per dot
    pub full_scale_dots: f64,
    /// Pixel translation per dot of the centered symbol
    pub px_per_dot: f64,
    /// Axis of translation
    pub axis: Axis,
    /// Lag filter time constant in seconds, `None` for unfiltered indicators
    pub time_constant_s: Option<f64>,
    /// Round the raw input to this many decimals before processing
    pub input_precision: Option<u32>,
}

impl DeviationScale {
    /// Default scaling for an indicator kind.
    pub fn preset(kind: DeviationKind) -> Self {
        match kind {
            // 0.8 degrees per dot
            DeviationKind::Localizer => Self {
                full_scale_dots: 0.8,
                px_per_dot: 30.221 / 2.0,
                axis: Axis::Horizontal,
                time_constant_s: Some(1.5),
                input_precision: None,
            },
            // 0.4 degrees per dot
            DeviationKind::Glideslope => Self {
                full_scale_dots: 0.4,
                px_per_dot: 30.238 / 2.0,
                axis: Axis::Vertical,
                time_constant_s: Some(1.5),
                input_precision: None,
            },
            // 0.1 nm per dot
            DeviationKind::LateralDeviation => Self {
                full_scale_dots: 0.1,
                px_per_dot: 30.238 / 2.0,
                axis: Axis::Horizontal,
                time_constant_s: None,
                input_precision: Some(3),
            },
            // 100 ft per dot
            DeviationKind::VerticalDeviation => Self {
                full_scale_dots: 100.0,
                px_per_dot: 30.238 / 2.0,
                axis: Axis::Vertical,
                time_constant_s: None,
                input_precision: None,
            },
        }
    }
}

/// Output of one indicator for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationReading {
    /// False when the governing signal is absent
    pub visible: bool,
    /// Indication, present only when visible
    pub state: Option<IndicatorState>,
    pub axis: Axis,
}

impl DeviationReading {
    fn hidden(axis: Axis) -> Self {
        Self {
            visible: false,
            state: None,
            axis,
        }
    }

    /// The reading as seen inside a parent group; a hidden parent hides it.
    pub fn within(self, parent_visible: bool) -> Self {
        if parent_visible {
            self
        } else {
            Self::hidden(self.axis)
        }
    }

    /// Translation `(x, y)` of the centered symbol, if it is shown.
    pub fn translation_px(&self) -> Option<(f64, f64)> {
        match self.state? {
            IndicatorState::Centered { offset_px, .. } => Some(match self.axis {
                Axis::Horizontal => (offset_px, 0.0),
                Axis::Vertical => (0.0, offset_px),
            }),
            _ => None,
        }
    }
}

/// One deviation indicator with exclusively owned filter state.
#[derive(Debug, Clone)]
pub struct DeviationIndicator {
    kind: DeviationKind,
    scale: DeviationScale,
    filter: Option<LagFilter>,
    had_signal: bool,
}

impl DeviationIndicator {
    pub fn new(kind: DeviationKind) -> Self {
        Self::with_scale(kind, DeviationScale::preset(kind))
    }

    pub fn with_scale(kind: DeviationKind, scale: DeviationScale) -> Self {
        Self {
            kind,
            scale,
            filter: scale.time_constant_s.map(LagFilter::new),
            had_signal: false,
        }
    }

    pub fn kind(&self) -> DeviationKind {
        self.kind
    }

    pub fn scale(&self) -> &DeviationScale {
        &self.scale
    }

    /// Current filtered deviation in raw units (0 for unfiltered indicators).
    pub fn filtered_deviation(&self) -> f64 {
        self.filter.as_ref().map_or(0.0, LagFilter::output)
    }

    /// Run the pipeline on one sample against an explicit divisor.
    ///
    /// A non-positive or non-finite divisor yields a centered indication at 0
    /// dots rather than dividing by zero.
    pub fn evaluate(
        &mut self,
        raw_deviation: f64,
        dt_s: f64,
        full_scale_dots: f64,
    ) -> IndicatorState {
        let input = match self.scale.input_precision {
            Some(decimals) => round_to(raw_deviation, decimals),
            None => raw_deviation,
        };

        let deviation = match self.filter.as_mut() {
            Some(filter) => filter.step(input, dt_s),
            None => input,
        };

        let usable = full_scale_dots.is_finite() && full_scale_dots > 0.0 && deviation.is_finite();
        let dots = if usable {
            deviation / full_scale_dots
        } else {
            0.0
        };

        classify_dots(dots, self.scale.px_per_dot)
    }

    /// Process one tick.
    ///
    /// `deviation` is `None` when the governing validity signal is absent
    /// (localizer lost, word not in normal operation, gate closed). In that
    /// case the indicator is hidden and its filter is reset.
    pub fn update(&mut self, deviation: Option<f64>, dt_s: f64) -> DeviationReading {
        let Some(raw) = deviation else {
            self.reset();
            return DeviationReading::hidden(self.scale.axis);
        };

        if !self.had_signal {
            debug!("{} signal acquired", self.kind);
            self.had_signal = true;
        }

        let state = self.evaluate(raw, dt_s, self.scale.full_scale_dots);
        DeviationReading {
            visible: true,
            state: Some(state),
            axis: self.scale.axis,
        }
    }

    /// Drop filter memory.
    pub fn reset(&mut self) {
        if self.had_signal {
            debug!("{} signal lost, resetting filter", self.kind);
            self.had_signal = false;
        }
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
