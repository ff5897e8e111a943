//! Render state handed to the presentation layer.
//!
//! Components never touch a drawing surface; they emit one [`RenderState`]
//! per element per tick and the presentation layer applies it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::deviation::{DeviationReading, IndicatorState};

/// Visual state of a single element
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderState {
    pub visible: bool,
    /// Identifier or path data of the geometry to draw
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_id: Option<&'static str>,
    /// Translation `(x, y)` in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_px: Option<(f64, f64)>,
    /// Rotation in degrees about `pivot_px`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_px: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RenderState {
    /// Invisible element with no payload.
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn shown_if(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry_id: &'static str) -> Self {
        self.geometry_id = Some(geometry_id);
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_px = Some((x, y));
        self
    }

    pub fn with_rotation(mut self, degrees: f64, pivot_x: f64, pivot_y: f64) -> Self {
        self.rotation_deg = Some(degrees);
        self.pivot_px = Some((pivot_x, pivot_y));
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_style(mut self, class: impl Into<String>) -> Self {
        self.style_class = Some(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Element ids of the three symbols of a deviation scale
#[derive(Debug, Clone, Copy)]
pub struct DeviationSymbolIds {
    pub high: &'static str,
    pub low: &'static str,
    pub centered: &'static str,
}

/// All element states of one display for one tick, keyed by element id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RenderSnapshot {
    elements: BTreeMap<&'static str, RenderState>,
}

impl RenderSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &'static str, state: RenderState) {
        self.elements.insert(id, state);
    }

    pub fn get(&self, id: &str) -> Option<&RenderState> {
        self.elements.get(id)
    }

    /// True if the element exists and is visible.
    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|s| s.visible)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RenderState)> {
        self.elements.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Merge another snapshot in, overwriting duplicate ids.
    pub fn extend(&mut self, other: RenderSnapshot) {
        self.elements.extend(other.elements);
    }

    /// Emit the three symbols of a deviation scale. Exactly one is visible
    /// while the reading is visible; none otherwise.
    pub fn insert_deviation(&mut self, ids: DeviationSymbolIds, reading: &DeviationReading) {
        let (high, low, centered) = match reading.state {
            Some(IndicatorState::PeggedHigh) => (true, false, false),
            Some(IndicatorState::PeggedLow) => (false, true, false),
            Some(IndicatorState::Centered { .. }) => (false, false, true),
            None => (false, false, false),
        };

        self.insert(ids.high, RenderState::shown_if(high));
        self.insert(ids.low, RenderState::shown_if(low));

        let mut centered_state = RenderState::shown_if(centered);
        if let Some((x, y)) = reading.translation_px() {
            centered_state = centered_state.with_offset(x, y);
        }
        self.insert(ids.centered, centered_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deviation::Axis;

    const IDS: DeviationSymbolIds = DeviationSymbolIds {
        high: "High",
        low: "Low",
        centered: "Centered",
    };

    #[test]
    fn test_deviation_symbols_exclusive() {
        let mut snapshot = RenderSnapshot::new();
        let reading = DeviationReading {
            visible: true,
            state: Some(IndicatorState::PeggedLow),
            axis: Axis::Horizontal,
        };
        snapshot.insert_deviation(IDS, &reading);
        assert!(!snapshot.is_visible("High"));
        assert!(snapshot.is_visible("Low"));
        assert!(!snapshot.is_visible("Centered"));
    }

    #[test]
    fn test_centered_symbol_carries_offset() {
        let mut snapshot = RenderSnapshot::new();
        let reading = DeviationReading {
            visible: true,
            state: Some(IndicatorState::Centered {
                dots: 1.0,
                offset_px: 15.0,
            }),
            axis: Axis::Vertical,
        };
        snapshot.insert_deviation(IDS, &reading);
        assert_eq!(
            snapshot.get("Centered").unwrap().offset_px,
            Some((0.0, 15.0))
        );
    }

    #[test]
    fn test_hidden_reading_hides_all() {
        let mut snapshot = RenderSnapshot::new();
        let reading = DeviationReading {
            visible: false,
            state: None,
            axis: Axis::Horizontal,
        };
        snapshot.insert_deviation(IDS, &reading);
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|(_, s)| !s.visible));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let state = RenderState::visible().with_text("MM");
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"visible":true,"text":"MM"}"#);
    }
}
