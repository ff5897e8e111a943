//! ADF / VOR bearing needles on the navigation display.
//!
//! Each EFIS side has two needles. The navaid selector for a needle picks the
//! receiver (off, ADF or VOR) and the ND mode picks the geometry. Needle
//! geometry is only defined for ARC and the three ROSE modes; anything else
//! is reported through the log and the needle is simply not drawn.

use serde::Serialize;
use strum::Display;
use tracing::error;

use crate::channel::{Channel, Frame};
use crate::error::{SymbologyError, SymbologyResult};
use crate::modes::{EfisNdMode, EfisSide, NavAidMode};
use crate::render::{RenderSnapshot, RenderState};

pub const SHADOW_STROKE_WIDTH: f64 = 3.7;
pub const NEEDLE_STROKE_WIDTH: f64 = 3.2;

/// Stations north of this latitude may be referenced to true north
const TRUE_REF_LATITUDE_DEG: f64 = 75.0;

/// Pixel x of the compass centre
pub const CENTRE_X: f64 = 384.0;

/// Receiver driving a needle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum NeedleKind {
    #[strum(to_string = "ADF")]
    Adf,
    #[strum(to_string = "VOR")]
    Vor,
}

/// Path data and rotation pivot for one needle in one ND mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeedleGeometry {
    pub path: &'static str,
    /// Pixel y of the compass centre the needle rotates about
    pub pivot_y: f64,
}

const ADF_ARC: [&str; 2] = [
    "M384,251 L384,128 M370,179 L384,155 L398,179 M384,1112 L384,989 M370,1085 L384,1061 L398,1085",
    "M370,251 L370,219 L384,195 L398,219 L398,251 M384,195 L384,128 M384,1112 L384,1023 M370,989 L370,1040 L384,1023 L398,1040 L398,989",
];

const ADF_ROSE: [&str; 2] = [
    "M384,257 L384,134 M370,185 L384,161 L398,185 M384,634 L384,511 M370,607 L384,583 L398,607",
    "M370,257 L370,225 L384,201 L398,225 L398,257 M384,201 L384,134 M384,634 L384,545 M370,511 L370,562 L384,545 L398,562 L398,511",
];

const VOR_ARC: [&str; 2] = [
    "M384,251 L384,179 M384,128 L384,155 L370,179 L398,179 L384,155 M384,1112 L384,1085 M384,989 L384,1061 L370,1085 L398,1085 L384,1061",
    "M377,251 L377,219 L370,219 L384,195 L398,219 L391,219 L391,251 M384,195 L384,128 M384,1112 L384,1045 M377,989 L377,1045 L391,1045 L391,989",
];

const VOR_ROSE: [&str; 2] = [
    "M384,257 L384,185 M384,134 L384,161 L370,185 L398,185 L384,161 M384,634 L384,607 M384,511 L384,583 L370,607 L398,607 L384,583",
    "M377,257 L377,225 L370,225 L384,201 L398,225 L391,225 L391,256 M384,201 L384,134 M384,634 L384,567 M377,511 L377,567 L391,567 L391,511",
];

const ARC_CENTRE_Y: f64 = 620.0;
const ROSE_CENTRE_Y: f64 = 384.0;

/// Look up needle geometry for a receiver, ND mode and needle index.
pub fn needle_geometry(
    kind: NeedleKind,
    mode: EfisNdMode,
    index: u8,
) -> SymbologyResult<NeedleGeometry> {
    let slot = match index {
        1 | 2 => usize::from(index - 1),
        other => return Err(SymbologyError::InvalidNeedleIndex(other)),
    };

    let (paths, pivot_y) = match (kind, mode) {
        (NeedleKind::Adf, EfisNdMode::Arc) => (ADF_ARC, ARC_CENTRE_Y),
        (NeedleKind::Vor, EfisNdMode::Arc) => (VOR_ARC, ARC_CENTRE_Y),
        (NeedleKind::Adf, m) if m.is_rose() => (ADF_ROSE, ROSE_CENTRE_Y),
        (NeedleKind::Vor, m) if m.is_rose() => (VOR_ROSE, ROSE_CENTRE_Y),
        (_, m) => return Err(SymbologyError::UnsupportedDisplayMode(m)),
    };

    Ok(NeedleGeometry {
        path: paths[slot],
        pivot_y,
    })
}

/// Whether a VOR station is referenced to true north.
///
/// Only high-latitude stations with no published declination are.
pub fn station_is_true_ref(latitude_deg: f64, declination_deg: f64) -> bool {
    latitude_deg > TRUE_REF_LATITUDE_DEG && declination_deg.abs() < f64::EPSILON
}

/// Needle colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum NeedleColor {
    Green,
    White,
    /// Station and aircraft heading references disagree
    Magenta,
}

/// Per-tick ADF receiver inputs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdfInputs {
    /// `None` when no bearing has been received
    pub relative_bearing_deg: Option<f64>,
    pub available: bool,
}

/// Per-tick VOR receiver inputs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VorInputs {
    /// `None` when no bearing has been received
    pub relative_bearing_deg: Option<f64>,
    pub available: bool,
    /// Tuned station is a localizer
    pub is_localizer: bool,
    pub station_declination_deg: f64,
    pub station_latitude_deg: f64,
}

/// Receiver selected for a needle together with its inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReceiverInputs {
    Off,
    Adf(AdfInputs),
    Vor(VorInputs),
}

/// A needle to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeedleRender {
    pub kind: NeedleKind,
    pub geometry: NeedleGeometry,
    pub rotation_deg: f64,
    pub color: NeedleColor,
    /// VOR station reference differs from the aircraft reference
    pub reference_mismatch: bool,
}

impl NeedleRender {
    /// Shadow and colour strokes, drawn in that order.
    pub fn strokes(&self) -> (RenderState, RenderState) {
        let base = RenderState::visible()
            .with_geometry(self.geometry.path)
            .with_rotation(self.rotation_deg, CENTRE_X, self.geometry.pivot_y);
        let shadow = base
            .clone()
            .with_stroke_width(SHADOW_STROKE_WIDTH)
            .with_style("rounded shadow");
        let stroke = base
            .with_stroke_width(NEEDLE_STROKE_WIDTH)
            .with_style(format!("rounded {}", self.color));
        (shadow, stroke)
    }
}

/// Choose what, if anything, a needle shows.
///
/// `Ok(None)` is an ordinary "nothing to draw" (receiver off, no signal,
/// localizer tuned). Errors are unsupported display modes or indices.
pub fn try_select(
    receiver: &ReceiverInputs,
    display_mode: EfisNdMode,
    index: u8,
    aircraft_true_ref: bool,
) -> SymbologyResult<Option<NeedleRender>> {
    match receiver {
        ReceiverInputs::Off => Ok(None),
        ReceiverInputs::Adf(adf) => {
            let geometry = needle_geometry(NeedleKind::Adf, display_mode, index)?;
            let bearing = adf.relative_bearing_deg.filter(|_| adf.available);
            Ok(bearing.map(|rotation_deg| NeedleRender {
                kind: NeedleKind::Adf,
                geometry,
                rotation_deg,
                color: NeedleColor::Green,
                reference_mismatch: false,
            }))
        }
        ReceiverInputs::Vor(vor) => {
            let geometry = needle_geometry(NeedleKind::Vor, display_mode, index)?;
            let Some(bearing) = vor.relative_bearing_deg else {
                return Ok(None);
            };
            if !vor.available || vor.is_localizer {
                return Ok(None);
            }

            let station_true =
                station_is_true_ref(vor.station_latitude_deg, vor.station_declination_deg);
            let reference_mismatch = aircraft_true_ref != station_true;
            Ok(Some(NeedleRender {
                kind: NeedleKind::Vor,
                geometry,
                rotation_deg: bearing,
                color: if reference_mismatch {
                    NeedleColor::Magenta
                } else {
                    NeedleColor::White
                },
                reference_mismatch,
            }))
        }
    }
}

/// [`try_select`] at the render boundary: errors are logged and nothing is
/// drawn.
pub fn select(
    receiver: &ReceiverInputs,
    display_mode: EfisNdMode,
    index: u8,
    aircraft_true_ref: bool,
) -> Option<NeedleRender> {
    try_select(receiver, display_mode, index, aircraft_true_ref).unwrap_or_else(|e| {
        error!("RadioNeedle: {e}");
        None
    })
}

/// Element ids of one needle
#[derive(Debug, Clone, Copy)]
struct NeedleIds {
    shadow: &'static str,
    stroke: &'static str,
}

fn needle_ids(index: u8) -> NeedleIds {
    if index == 1 {
        NeedleIds {
            shadow: "RadioNeedle1Shadow",
            stroke: "RadioNeedle1",
        }
    } else {
        NeedleIds {
            shadow: "RadioNeedle2Shadow",
            stroke: "RadioNeedle2",
        }
    }
}

/// One needle wired to its selector and receiver channels.
#[derive(Debug, Clone)]
pub struct RadioNeedle {
    index: u8,
    mode: Channel<i64>,
    adf_bearing: Channel<f64>,
    adf_signal: Channel<bool>,
    vor_bearing: Channel<f64>,
    vor_has_nav: Channel<bool>,
    vor_has_localizer: Channel<bool>,
    vor_magvar: Channel<f64>,
    vor_latitude: Channel<f64>,
}

impl RadioNeedle {
    /// Wire needle `index` (1 or 2) of an EFIS side.
    pub fn new(side: EfisSide, index: u8) -> SymbologyResult<Self> {
        if !(1..=2).contains(&index) {
            return Err(SymbologyError::InvalidNeedleIndex(index));
        }
        Ok(Self {
            index,
            mode: Channel::continuous(format!("L:A32NX_EFIS_{side}_NAVAID_{index}_MODE")),
            adf_bearing: Channel::continuous(format!("ADF RADIAL:{index}")),
            adf_signal: Channel::continuous(format!("ADF SIGNAL:{index}")),
            vor_bearing: Channel::continuous(format!("NAV RELATIVE BEARING TO STATION:{index}")),
            vor_has_nav: Channel::continuous(format!("NAV HAS NAV:{index}")),
            vor_has_localizer: Channel::continuous(format!("NAV HAS LOCALIZER:{index}")),
            vor_magvar: Channel::continuous(format!("NAV MAGVAR:{index}")),
            vor_latitude: Channel::continuous(format!("NAV VOR LATLONALT:{index}")),
        })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn mode_channel(&self) -> &str {
        self.mode.name()
    }

    /// Gather the selected receiver's inputs from the frame.
    pub fn receiver_inputs(&self, frame: &Frame<'_>) -> ReceiverInputs {
        let raw_mode = frame.get(&self.mode).unwrap_or(0);
        let mode = match NavAidMode::from_raw(raw_mode) {
            Ok(mode) => mode,
            Err(e) => {
                error!("RadioNeedle {}: {e}", self.index);
                NavAidMode::Off
            }
        };

        match mode {
            NavAidMode::Off => ReceiverInputs::Off,
            NavAidMode::Adf => ReceiverInputs::Adf(AdfInputs {
                relative_bearing_deg: frame.get(&self.adf_bearing),
                available: frame.get(&self.adf_signal).unwrap_or(false),
            }),
            NavAidMode::Vor => ReceiverInputs::Vor(VorInputs {
                relative_bearing_deg: frame.get(&self.vor_bearing),
                available: frame.get(&self.vor_has_nav).unwrap_or(false),
                is_localizer: frame.get(&self.vor_has_localizer).unwrap_or(false),
                station_declination_deg: frame.get(&self.vor_magvar).unwrap_or(0.0),
                station_latitude_deg: frame.get(&self.vor_latitude).unwrap_or(0.0),
            }),
        }
    }

    /// Evaluate the needle for this tick.
    pub fn update(
        &self,
        frame: &Frame<'_>,
        display_mode: EfisNdMode,
        aircraft_true_ref: bool,
    ) -> Option<NeedleRender> {
        let inputs = self.receiver_inputs(frame);
        select(&inputs, display_mode, self.index, aircraft_true_ref)
    }

    /// Write both strokes into a snapshot; hidden when there is nothing to draw.
    pub fn render_into(&self, snapshot: &mut RenderSnapshot, needle: Option<&NeedleRender>) {
        let ids = needle_ids(self.index);
        let (shadow, stroke) = needle.map_or_else(
            || (RenderState::hidden(), RenderState::hidden()),
            NeedleRender::strokes,
        );
        snapshot.insert(ids.shadow, shadow);
        snapshot.insert(ids.stroke, stroke);
    }
}
