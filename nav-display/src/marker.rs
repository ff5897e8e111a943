//! Marker beacon annunciation (OM / MM / IM).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

/// Classes present on the annunciation in every state
pub const BASE_CLASS: &str = "FontLarge StartAlign";

/// Which marker the receiver is passing over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum MarkerBeacon {
    #[strum(to_string = "OM")]
    Outer,
    #[strum(to_string = "MM")]
    Middle,
    #[strum(to_string = "IM")]
    Inner,
}

impl MarkerBeacon {
    /// Decode the receiver state. 0 means no marker; 3 and any other
    /// non-zero value read as the inner marker.
    pub fn from_state(state: i64) -> Option<Self> {
        match state {
            0 => None,
            1 => Some(MarkerBeacon::Outer),
            2 => Some(MarkerBeacon::Middle),
            _ => Some(MarkerBeacon::Inner),
        }
    }

    fn color(self) -> &'static str {
        match self {
            MarkerBeacon::Outer => "Cyan",
            MarkerBeacon::Middle => "Amber",
            MarkerBeacon::Inner => "White",
        }
    }

    fn blink_class(self) -> &'static str {
        match self {
            MarkerBeacon::Outer => "OuterMarkerBlink",
            MarkerBeacon::Middle => "MiddleMarkerBlink",
            MarkerBeacon::Inner => "InnerMarkerBlink",
        }
    }
}

/// Annunciation for one marker state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerDisplay {
    pub visible: bool,
    pub text: String,
    pub style_class: String,
}

impl Default for MarkerDisplay {
    fn default() -> Self {
        Self {
            visible: false,
            text: String::new(),
            style_class: format!("{BASE_CLASS} HiddenElement"),
        }
    }
}

/// Map a raw marker state onto its annunciation.
pub fn classify(state: i64) -> MarkerDisplay {
    match MarkerBeacon::from_state(state) {
        None => MarkerDisplay::default(),
        Some(marker) => MarkerDisplay {
            visible: true,
            text: marker.to_string(),
            style_class: format!("{BASE_CLASS} {} {}", marker.color(), marker.blink_class()),
        },
    }
}

/// Holds the current annunciation between marker state changes.
///
/// The marker channel is delivered on change only, so the last classified
/// state has to be kept until the next change arrives.
#[derive(Debug, Clone, Default)]
pub struct MarkerBeaconClassifier {
    current: MarkerDisplay,
}

impl MarkerBeaconClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a state change, if any, and return the current annunciation.
    pub fn update(&mut self, changed_state: Option<i64>) -> &MarkerDisplay {
        if let Some(state) = changed_state {
            let next = classify(state);
            if next.visible {
                self.current = next;
            } else {
                // Text is retained while hidden
                self.current.visible = false;
                self.current.style_class = next.style_class;
            }
            debug!(state, text = %self.current.text, "marker beacon changed");
        }
        &self.current
    }

    pub fn current(&self) -> &MarkerDisplay {
        &self.current
    }
}
