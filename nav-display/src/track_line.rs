//! Selected track line on the navigation display.
//!
//! A line from the aircraft symbol towards the current track, shown only
//! while lateral guidance is selected (or absent) and no NAV capture is armed.

use tracing::{debug, error};

use crate::arinc429::Arinc429Word;
use crate::channel::{Channel, Frame};
use crate::gate::{mode_lookup, VisibilityDecision, VisibilityGate};
use crate::modes::{ArmedLateralMode, EfisNdMode, LateralMode};
use crate::render::RenderState;

/// Line end y per ND mode. Modes without an entry never show the line.
pub const TRACK_LINE_Y: &[(EfisNdMode, f64)] =
    &[(EfisNdMode::RoseNav, 384.0), (EfisNdMode::Arc, 620.0)];

pub const LINE_X: f64 = 384.0;
pub const LINE_TOP_Y: f64 = 149.0;

const SHADOW_STROKE_WIDTH: f64 = 3.0;
const LINE_STROKE_WIDTH: f64 = 2.5;

/// Signed shortest angle from `from_deg` to `to_deg`, in `(-180, 180]`.
pub fn diff_angle(from_deg: f64, to_deg: f64) -> f64 {
    let diff = (to_deg - from_deg).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Inputs for one evaluation of the track line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLineInputs {
    /// `None` when the raw mode value is unknown
    pub nd_mode: Option<EfisNdMode>,
    pub heading: Arinc429Word,
    pub track: Arinc429Word,
    /// `None` when the FG has not reported or sent an unknown code
    pub lateral_mode: Option<LateralMode>,
    pub lateral_armed: ArmedLateralMode,
    pub track_up: bool,
}

/// Geometry and visibility of the line for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLineState {
    pub decision: VisibilityDecision,
    pub rotation_deg: f64,
    /// Line end and rotation pivot y; 0 when the mode has no entry
    pub y: f64,
}

impl TrackLineState {
    pub fn visible(&self) -> bool {
        self.decision.visible
    }
}

/// Evaluate the track line from a set of inputs.
pub fn evaluate(inputs: &TrackLineInputs) -> TrackLineState {
    let mode_y = inputs
        .nd_mode
        .and_then(|mode| mode_lookup(TRACK_LINE_Y, mode));

    let decision = VisibilityGate::new()
        .require("nd mode", mode_y.is_some())
        .require_valid("heading", &inputs.heading)
        .require_valid("track", &inputs.track)
        .require_lateral_mode(
            "lateral mode",
            inputs.lateral_mode,
            LateralMode::is_selected_or_none,
        )
        .hide_if_armed("nav armed", inputs.lateral_armed, ArmedLateralMode::NAV)
        .decide();

    let rotation_deg = match (
        inputs.track_up,
        inputs.heading.normal_value(),
        inputs.track.normal_value(),
    ) {
        (false, Some(heading), Some(track)) => diff_angle(f64::from(heading), f64::from(track)),
        _ => 0.0,
    };

    TrackLineState {
        decision,
        rotation_deg,
        y: mode_y.unwrap_or(0.0),
    }
}

/// Track line wired to its channels.
#[derive(Debug, Clone)]
pub struct TrackLine {
    nd_mode: Channel<i64>,
    heading: Channel<Arinc429Word>,
    track: Channel<Arinc429Word>,
    lateral_mode: Channel<i64>,
    lateral_armed: Channel<i64>,
    track_up: bool,
    last_decision: Option<VisibilityDecision>,
}

impl TrackLine {
    pub fn new(track_up: bool) -> Self {
        Self {
            nd_mode: Channel::continuous("ndMode"),
            heading: Channel::continuous("heading"),
            track: Channel::continuous("track"),
            lateral_mode: Channel::continuous("fg.fma.lateralMode"),
            lateral_armed: Channel::continuous("fg.fma.lateralArmedBitmask"),
            track_up,
            last_decision: None,
        }
    }

    pub fn set_track_up(&mut self, track_up: bool) {
        self.track_up = track_up;
    }

    /// Read the inputs for this tick. The ND mode defaults to ARC until
    /// reported.
    pub fn inputs(&self, frame: &Frame<'_>) -> TrackLineInputs {
        let nd_mode = match frame.get(&self.nd_mode) {
            None => Some(EfisNdMode::Arc),
            Some(raw) => EfisNdMode::from_raw(raw)
                .map_err(|e| error!("TrackLine: {e}"))
                .ok(),
        };

        TrackLineInputs {
            nd_mode,
            heading: frame.get(&self.heading).unwrap_or_default(),
            track: frame.get(&self.track).unwrap_or_default(),
            lateral_mode: frame.get(&self.lateral_mode).and_then(LateralMode::from_raw),
            lateral_armed: frame
                .get(&self.lateral_armed)
                .map_or_else(ArmedLateralMode::empty, ArmedLateralMode::from_raw),
            track_up: self.track_up,
        }
    }

    pub fn update(&mut self, frame: &Frame<'_>) -> TrackLineState {
        let state = evaluate(&self.inputs(frame));
        if self.last_decision != Some(state.decision) {
            match state.decision.hidden_by {
                Some(reason) => debug!(reason, "track line hidden"),
                None => debug!("track line shown"),
            }
            self.last_decision = Some(state.decision);
        }
        state
    }

    /// Shadow and green strokes for a state. The line runs from
    /// `(LINE_X, LINE_TOP_Y)` down to the rotation pivot.
    pub fn strokes(state: &TrackLineState) -> (RenderState, RenderState) {
        let base = RenderState::shown_if(state.visible())
            .with_rotation(state.rotation_deg, LINE_X, state.y);
        let shadow = base
            .clone()
            .with_stroke_width(SHADOW_STROKE_WIDTH)
            .with_style("rounded shadow");
        let line = base
            .with_stroke_width(LINE_STROKE_WIDTH)
            .with_style("rounded Green");
        (shadow, line)
    }
}
