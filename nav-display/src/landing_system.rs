//! PFD landing system composition.
//!
//! Owns every LS related symbol of one PFD: the LS pushbutton latch, the LS
//! information block, localizer and glideslope scales, the marker beacon
//! annunciation, the glideslope reference line and the L/DEV and V/DEV
//! scales shown in place of the LS scales.
//!
//! Each tick pulls its inputs from a committed [`Frame`]; nothing is pushed
//! into the component between ticks.

use tracing::debug;

use crate::arinc429::Arinc429Word;
use crate::channel::{Channel, Frame};
use crate::config::{SymbologyConfig, XtkValidityPolicy};
use crate::deviation::{DeviationIndicator, DeviationKind, DeviationReading};
use crate::error::{SymbologyError, SymbologyResult};
use crate::gate::VisibilityGate;
use crate::ls_info::{LandingSystemInfo, LsInfoInputs, TextField};
use crate::marker::MarkerBeaconClassifier;
use crate::render::{DeviationSymbolIds, RenderSnapshot, RenderState};

const LOC_IDS: DeviationSymbolIds = DeviationSymbolIds {
    high: "LocDiamondRight",
    low: "LocDiamondLeft",
    centered: "LocDiamond",
};

// Above the glideslope the diamond sits low on the scale
const GS_IDS: DeviationSymbolIds = DeviationSymbolIds {
    high: "GlideSlopeDiamondLower",
    low: "GlideSlopeDiamondUpper",
    centered: "GlideSlopeDiamond",
};

const LDEV_IDS: DeviationSymbolIds = DeviationSymbolIds {
    high: "LDevSymbolRight",
    low: "LDevSymbolLeft",
    centered: "LDevSymbol",
};

const VDEV_IDS: DeviationSymbolIds = DeviationSymbolIds {
    high: "VDevSymbolLower",
    low: "VDevSymbolUpper",
    centered: "VDevSymbol",
};

/// LS pushbutton latch.
///
/// The stored button state is authoritative when it changes; a button press
/// event toggles the latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LsLatch {
    on: bool,
}

impl LsLatch {
    pub fn get(&self) -> bool {
        self.on
    }

    pub fn set(&mut self, on: bool) {
        if self.on != on {
            debug!(on, "LS latch set");
        }
        self.on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.on);
    }
}

/// Channel handles of one PFD, chosen by display index.
#[derive(Debug, Clone)]
pub struct LandingSystemChannels {
    pub ls_button: Channel<bool>,
    pub ls_button_event: String,
    pub ldev_request: Channel<bool>,
    pub vdev_request: Channel<bool>,
    pub has_loc: Channel<bool>,
    pub has_glideslope: Channel<bool>,
    pub nav_radial_error: Channel<f64>,
    pub glide_slope_error: Channel<f64>,
    pub xtk: Channel<f64>,
    pub xtk_word: Channel<Arinc429Word>,
    pub vertical_deviation: Channel<Arinc429Word>,
    pub marker_beacon: Channel<i64>,
    pub nav_ident: Channel<String>,
    pub nav_freq: Channel<f64>,
    pub has_dme: Channel<bool>,
    pub dme: Channel<f64>,
    pub fm1_nav_discrete: Channel<Arinc429Word>,
    pub baro_corrected_altitude: Channel<Arinc429Word>,
}

impl LandingSystemChannels {
    /// Handles for PFD 1 (captain) or 2 (first officer).
    pub fn for_display(display_index: u8) -> SymbologyResult<Self> {
        let (ls_button, side) = match display_index {
            1 => ("ls1Button", "Left"),
            2 => ("ls2Button", "Right"),
            other => return Err(SymbologyError::InvalidDisplayIndex(other)),
        };

        Ok(Self {
            ls_button: Channel::on_change(ls_button),
            ls_button_event: format!("A320_Neo_PFD_BTN_LS_{display_index}"),
            ldev_request: Channel::continuous(format!("ldevRequest{side}")),
            vdev_request: Channel::continuous(format!("vdevRequest{side}")),
            has_loc: Channel::continuous("hasLoc"),
            has_glideslope: Channel::continuous("hasGlideslope"),
            nav_radial_error: Channel::continuous("navRadialError"),
            glide_slope_error: Channel::continuous("glideSlopeError"),
            xtk: Channel::continuous("xtk"),
            xtk_word: Channel::continuous("xtk"),
            vertical_deviation: Channel::continuous("verticalDeviation"),
            marker_beacon: Channel::on_change("markerBeacon"),
            nav_ident: Channel::continuous("navIdent"),
            nav_freq: Channel::continuous("navFreq"),
            has_dme: Channel::continuous("hasDme"),
            dme: Channel::continuous("dme"),
            fm1_nav_discrete: Channel::continuous("fm1NavDiscrete"),
            baro_corrected_altitude: Channel::continuous("baroCorrectedAltitude"),
        })
    }
}

/// LS and deviation symbology of one PFD.
#[derive(Debug, Clone)]
pub struct LandingSystemDisplay {
    display_index: u8,
    channels: LandingSystemChannels,
    xtk_validity: XtkValidityPolicy,
    latch: LsLatch,
    info: LandingSystemInfo,
    localizer: DeviationIndicator,
    glideslope: DeviationIndicator,
    lateral: DeviationIndicator,
    vertical: DeviationIndicator,
    marker: MarkerBeaconClassifier,
}

impl LandingSystemDisplay {
    pub fn new(config: &SymbologyConfig) -> SymbologyResult<Self> {
        let indicator = |kind| DeviationIndicator::with_scale(kind, config.scale(kind));
        Ok(Self {
            display_index: config.display_index,
            channels: LandingSystemChannels::for_display(config.display_index)?,
            xtk_validity: config.xtk_validity,
            latch: LsLatch::default(),
            info: LandingSystemInfo::new(),
            localizer: indicator(DeviationKind::Localizer),
            glideslope: indicator(DeviationKind::Glideslope),
            lateral: indicator(DeviationKind::LateralDeviation),
            vertical: indicator(DeviationKind::VerticalDeviation),
            marker: MarkerBeaconClassifier::new(),
        })
    }

    pub fn display_index(&self) -> u8 {
        self.display_index
    }

    pub fn channels(&self) -> &LandingSystemChannels {
        &self.channels
    }

    pub fn ls_visible(&self) -> bool {
        self.latch.get()
    }

    pub fn set_ls_visible(&mut self, on: bool) {
        self.latch.set(on);
    }

    pub fn toggle_ls(&mut self) {
        self.latch.toggle();
    }

    pub fn localizer(&self) -> &DeviationIndicator {
        &self.localizer
    }

    pub fn glideslope(&self) -> &DeviationIndicator {
        &self.glideslope
    }

    /// Cross-track error and whether it counts as valid. Never valid when
    /// nothing usable was published.
    fn xtk(&self, frame: &Frame<'_>) -> (f64, bool) {
        let word = match self.xtk_validity {
            XtkValidityPolicy::Word => frame.get(&self.channels.xtk_word),
            _ => frame
                .get(&self.channels.xtk)
                .map(|xtk| Arinc429Word::normal(xtk as f32)),
        };
        match word {
            Some(word) => (f64::from(word.value), self.xtk_validity.is_valid(&word)),
            None => (0.0, false),
        }
    }

    fn ls_info_inputs(&self, frame: &Frame<'_>) -> LsInfoInputs {
        let ch = &self.channels;
        LsInfoInputs {
            has_loc: frame.get(&ch.has_loc).unwrap_or(false),
            ident: frame.get(&ch.nav_ident).unwrap_or_default(),
            freq_mhz: frame.get(&ch.nav_freq).unwrap_or(0.0),
            has_dme: frame.get(&ch.has_dme).unwrap_or(false),
            dme_nm: frame.get(&ch.dme).unwrap_or(0.0),
            fm1_nav_discrete: frame.get(&ch.fm1_nav_discrete).unwrap_or_default(),
        }
    }

    /// Run one tick and produce the element states.
    pub fn update(&mut self, frame: &Frame<'_>) -> RenderSnapshot {
        let dt = frame.dt_s;

        if let Some(on) = frame.get(&self.channels.ls_button) {
            self.latch.set(on);
        }
        if frame.event(&self.channels.ls_button_event) {
            self.latch.toggle();
        }
        let ls_visible = self.latch.get();

        let mut snapshot = RenderSnapshot::new();
        snapshot.insert("LSGroup", RenderState::shown_if(ls_visible));

        // LS info
        let info_inputs = self.ls_info_inputs(frame);
        let view = self.info.update(ls_visible, &info_inputs);
        let text = |field: &TextField| RenderState::shown_if(field.visible).with_text(&field.text);
        snapshot.insert("ILSIdent", text(&view.ident));
        snapshot.insert("ILSFreqLeading", text(&view.freq_leading));
        snapshot.insert("ILSFreqTrailing", text(&view.freq_trailing));
        snapshot.insert("ILSDistGroup", RenderState::shown_if(view.dme_visible()));
        snapshot.insert("ILSDistLeading", text(&view.dme_leading));
        snapshot.insert("ILSDistTrailing", text(&view.dme_trailing));

        // Localizer and glideslope scales run whether or not LS is shown
        // A missing or mistyped deviation hides the scale like a lost signal
        let has_loc = info_inputs.has_loc;
        let loc_input = has_loc
            .then(|| frame.get(&self.channels.nav_radial_error))
            .flatten();
        let loc = self.localizer.update(loc_input, dt).within(ls_visible);
        snapshot.insert_deviation(LOC_IDS, &loc);

        let has_gs = frame.get(&self.channels.has_glideslope).unwrap_or(false);
        let gs_input = has_gs
            .then(|| frame.get(&self.channels.glide_slope_error))
            .flatten();
        let gs = self.glideslope.update(gs_input, dt).within(ls_visible);
        snapshot.insert_deviation(GS_IDS, &gs);

        let marker = self.marker.update(frame.get(&self.channels.marker_beacon));
        snapshot.insert(
            "ILSMarkerText",
            RenderState::shown_if(ls_visible && marker.visible)
                .with_text(&marker.text)
                .with_style(&marker.style_class),
        );

        let altitude = frame
            .get(&self.channels.baro_corrected_altitude)
            .unwrap_or_default();
        let altitude_invalid = !altitude.is_normal_operation();
        let gs_reference = VisibilityGate::new()
            .hide_if("ls off and altitude invalid", !ls_visible && altitude_invalid)
            .decide();
        snapshot.insert("GsReferenceLine", RenderState::shown_if(gs_reference.visible));

        // Deviation group replaces the LS scales
        snapshot.insert("DeviationGroup", RenderState::shown_if(!ls_visible));

        let (xtk, xtk_valid) = self.xtk(frame);
        let ldev_request = frame.get(&self.channels.ldev_request).unwrap_or(false);
        let ldev_gate = VisibilityGate::new()
            .hide_if("ls shown", ls_visible)
            .require("ldev requested", ldev_request)
            .require("xtk valid", xtk_valid);
        let ldev = self.gated(DeviationKind::LateralDeviation, &ldev_gate, xtk, dt);
        snapshot.insert("LateralDeviationGroup", RenderState::shown_if(ldev.visible));
        snapshot.insert_deviation(LDEV_IDS, &ldev);

        let vdev_word = frame
            .get(&self.channels.vertical_deviation)
            .unwrap_or_default();
        let vdev_request = frame.get(&self.channels.vdev_request).unwrap_or(false);
        let vdev_gate = VisibilityGate::new()
            .hide_if("ls shown", ls_visible)
            .require("vdev requested", vdev_request)
            .require_valid("vertical deviation", &vdev_word);
        let vdev = self.gated(
            DeviationKind::VerticalDeviation,
            &vdev_gate,
            f64::from(vdev_word.value),
            dt,
        );
        snapshot.insert("VerticalDeviationGroup", RenderState::shown_if(vdev.visible));
        snapshot.insert_deviation(VDEV_IDS, &vdev);

        snapshot
    }

    fn gated(
        &mut self,
        kind: DeviationKind,
        gate: &VisibilityGate,
        value: f64,
        dt_s: f64,
    ) -> DeviationReading {
        let indicator = match kind {
            DeviationKind::Localizer => &mut self.localizer,
            DeviationKind::Glideslope => &mut self.glideslope,
            DeviationKind::LateralDeviation => &mut self.lateral,
            DeviationKind::VerticalDeviation => &mut self.vertical,
        };
        indicator.update(gate.is_visible().then_some(value), dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arinc429::SignStatus;
    use crate::channel::ChannelBus;

    fn display(index: u8) -> LandingSystemDisplay {
        let config = SymbologyConfig {
            display_index: index,
            ..Default::default()
        };
        LandingSystemDisplay::new(&config).unwrap()
    }

    #[test]
    fn test_channels_per_display() {
        let one = LandingSystemChannels::for_display(1).unwrap();
        assert_eq!(one.ls_button.name(), "ls1Button");
        assert_eq!(one.ldev_request.name(), "ldevRequestLeft");
        assert_eq!(one.ls_button_event, "A320_Neo_PFD_BTN_LS_1");

        let two = LandingSystemChannels::for_display(2).unwrap();
        assert_eq!(two.ls_button.name(), "ls2Button");
        assert_eq!(two.ldev_request.name(), "ldevRequestRight");

        assert_eq!(
            LandingSystemChannels::for_display(3).unwrap_err(),
            SymbologyError::InvalidDisplayIndex(3)
        );
    }

    #[test]
    fn test_latch() {
        let mut latch = LsLatch::default();
        assert!(!latch.get());
        latch.toggle();
        assert!(latch.get());
        latch.set(false);
        assert!(!latch.get());
    }

    #[test]
    fn test_button_event_toggles_only_own_display() {
        let mut pfd = display(2);
        let mut bus = ChannelBus::new();

        bus.raise("A320_Neo_PFD_BTN_LS_1");
        pfd.update(&bus.commit(0.05));
        assert!(!pfd.ls_visible());

        bus.raise("A320_Neo_PFD_BTN_LS_2");
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(pfd.ls_visible());
        assert!(snapshot.is_visible("LSGroup"));
        assert!(!snapshot.is_visible("DeviationGroup"));

        bus.raise("A320_Neo_PFD_BTN_LS_2");
        pfd.update(&bus.commit(0.05));
        assert!(!pfd.ls_visible());
    }

    #[test]
    fn test_button_state_channel_sets_latch() {
        let mut pfd = display(1);
        let mut bus = ChannelBus::new();
        bus.publish("ls1Button", true);
        pfd.update(&bus.commit(0.05));
        assert!(pfd.ls_visible());

        // Unchanged stored state does not undo a later toggle
        bus.publish("ls1Button", true);
        bus.raise("A320_Neo_PFD_BTN_LS_1");
        pfd.update(&bus.commit(0.05));
        assert!(!pfd.ls_visible());
    }

    #[test]
    fn test_gs_reference_line() {
        let mut pfd = display(1);
        let mut bus = ChannelBus::new();

        let failed = Arinc429Word::new(0.0, SignStatus::FailureWarning);
        bus.publish("baroCorrectedAltitude", failed);
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("GsReferenceLine"));

        pfd.set_ls_visible(true);
        assert!(pfd.update(&bus.commit(0.05)).is_visible("GsReferenceLine"));

        pfd.set_ls_visible(false);
        bus.publish("baroCorrectedAltitude", Arinc429Word::normal(3000.0));
        assert!(pfd.update(&bus.commit(0.05)).is_visible("GsReferenceLine"));
    }

    #[test]
    fn test_ldev_gating() {
        let mut pfd = display(1);
        let mut bus = ChannelBus::new();
        bus.publish("ldevRequestLeft", true);
        bus.publish("xtk", 0.05);
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(snapshot.is_visible("LateralDeviationGroup"));
        assert!(snapshot.is_visible("LDevSymbol"));

        // Zero xtk reads as invalid under the default policy
        bus.publish("xtk", 0.0);
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("LDevSymbol"));

        bus.publish("xtk", 0.5);
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(snapshot.is_visible("LDevSymbolRight"));

        pfd.set_ls_visible(true);
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(!snapshot.is_visible("LDevSymbolRight"));
        assert!(!snapshot.is_visible("DeviationGroup"));
    }

    #[test]
    fn test_ldev_word_policy() {
        let config = SymbologyConfig {
            xtk_validity: XtkValidityPolicy::Word,
            ..Default::default()
        };
        let mut pfd = LandingSystemDisplay::new(&config).unwrap();
        let mut bus = ChannelBus::new();
        bus.publish("ldevRequestLeft", true);
        bus.publish("xtk", Arinc429Word::normal(0.0));
        assert!(pfd.update(&bus.commit(0.05)).is_visible("LDevSymbol"));

        bus.publish("xtk", Arinc429Word::new(0.0, SignStatus::NoComputedData));
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("LDevSymbol"));
    }

    #[test]
    fn test_vdev_requires_request_and_valid_word() {
        let mut pfd = display(1);
        let mut bus = ChannelBus::new();
        bus.publish("verticalDeviation", Arinc429Word::normal(-50.0));
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("VDevSymbol"));

        bus.publish("vdevRequestLeft", true);
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(snapshot.is_visible("VDevSymbol"));
        assert_eq!(
            snapshot.get("VDevSymbol").unwrap().offset_px,
            Some((0.0, -0.5 * 30.238 / 2.0))
        );

        let in_test = Arinc429Word::new(-50.0, SignStatus::FunctionalTest);
        bus.publish("verticalDeviation", in_test);
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("VDevSymbol"));
    }

    #[test]
    fn test_localizer_hidden_without_signal() {
        let mut pfd = display(1);
        pfd.set_ls_visible(true);
        let mut bus = ChannelBus::new();
        bus.publish("hasLoc", false);
        bus.publish("navRadialError", 0.3);
        let snapshot = pfd.update(&bus.commit(0.1));
        assert!(!snapshot.is_visible("LocDiamond"));
        assert_eq!(pfd.localizer().filtered_deviation(), 0.0);

        bus.publish("hasLoc", true);
        let snapshot = pfd.update(&bus.commit(0.1));
        assert!(snapshot.is_visible("LocDiamond"));
        assert!(pfd.localizer().filtered_deviation() > 0.0);
    }

    #[test]
    fn test_missing_deviation_hides_scales() {
        let mut pfd = display(1);
        pfd.set_ls_visible(true);
        let mut bus = ChannelBus::new();
        bus.publish("hasLoc", true);
        bus.publish("hasGlideslope", true);

        let all_hidden = |snapshot: &RenderSnapshot| {
            [LOC_IDS, GS_IDS].iter().all(|ids| {
                !snapshot.is_visible(ids.high)
                    && !snapshot.is_visible(ids.low)
                    && !snapshot.is_visible(ids.centered)
            })
        };
        assert!(all_hidden(&pfd.update(&bus.commit(0.1))));

        // Words on a plain number channel are not a deviation
        let failed = Arinc429Word::new(0.0, SignStatus::FailureWarning);
        bus.publish("navRadialError", failed);
        bus.publish("glideSlopeError", failed);
        assert!(all_hidden(&pfd.update(&bus.commit(0.1))));
        assert_eq!(pfd.localizer().filtered_deviation(), 0.0);

        bus.publish("navRadialError", 0.2);
        bus.publish("glideSlopeError", -0.1);
        let snapshot = pfd.update(&bus.commit(0.1));
        assert!(snapshot.is_visible("LocDiamond"));
        assert!(snapshot.is_visible("GlideSlopeDiamond"));
    }

    #[test]
    fn test_missing_xtk_hides_ldev_under_any_policy() {
        let config = SymbologyConfig {
            xtk_validity: XtkValidityPolicy::Always,
            ..Default::default()
        };
        let mut pfd = LandingSystemDisplay::new(&config).unwrap();
        let mut bus = ChannelBus::new();
        bus.publish("ldevRequestLeft", true);
        assert!(!pfd.update(&bus.commit(0.05)).is_visible("LDevSymbol"));

        bus.publish("xtk", 0.0);
        assert!(pfd.update(&bus.commit(0.05)).is_visible("LDevSymbol"));
    }

    #[test]
    fn test_marker_only_with_ls() {
        let mut pfd = display(1);
        let mut bus = ChannelBus::new();
        bus.publish("markerBeacon", 2.0);
        let snapshot = pfd.update(&bus.commit(0.05));
        assert!(!snapshot.is_visible("ILSMarkerText"));

        pfd.set_ls_visible(true);
        let snapshot = pfd.update(&bus.commit(0.05));
        let marker = snapshot.get("ILSMarkerText").unwrap();
        assert!(marker.visible);
        assert_eq!(marker.text.as_deref(), Some("MM"));
        assert!(marker.style_class.as_deref().unwrap().contains("Amber"));
    }
}
