//! Navigation display composition: track line and the two bearing needles
//! of one EFIS side.

use crate::channel::{Channel, Frame};
use crate::config::SymbologyConfig;
use crate::error::SymbologyResult;
use crate::modes::{EfisNdMode, EfisSide};
use crate::radio_needle::{NeedleRender, RadioNeedle};
use crate::render::RenderSnapshot;
use crate::track_line::{TrackLine, TrackLineState};

/// Per-tick ND output before it is flattened into a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationDisplayState {
    pub track_line: TrackLineState,
    pub needles: [Option<NeedleRender>; 2],
}

#[derive(Debug, Clone)]
pub struct NavigationDisplay {
    side: EfisSide,
    aircraft_true_ref: bool,
    nd_mode: Channel<i64>,
    track_line: TrackLine,
    needles: [RadioNeedle; 2],
}

impl NavigationDisplay {
    pub fn new(config: &SymbologyConfig) -> SymbologyResult<Self> {
        Ok(Self {
            side: config.side,
            aircraft_true_ref: config.aircraft_true_ref,
            nd_mode: Channel::continuous("ndMode"),
            track_line: TrackLine::new(config.track_up),
            needles: [
                RadioNeedle::new(config.side, 1)?,
                RadioNeedle::new(config.side, 2)?,
            ],
        })
    }

    pub fn side(&self) -> EfisSide {
        self.side
    }

    pub fn set_track_up(&mut self, track_up: bool) {
        self.track_line.set_track_up(track_up);
    }

    pub fn set_aircraft_true_ref(&mut self, true_ref: bool) {
        self.aircraft_true_ref = true_ref;
    }

    /// Evaluate every ND element for this tick.
    pub fn evaluate(&mut self, frame: &Frame<'_>) -> NavigationDisplayState {
        let track_line = self.track_line.update(frame);

        // The needles have no geometry for an unknown mode; PLAN stands in
        // so that the selector logs and draws nothing.
        let mode = needle_display_mode(frame, &self.nd_mode);
        let needles = [
            self.needles[0].update(frame, mode, self.aircraft_true_ref),
            self.needles[1].update(frame, mode, self.aircraft_true_ref),
        ];

        NavigationDisplayState {
            track_line,
            needles,
        }
    }

    /// Run one tick and produce the element states.
    pub fn update(&mut self, frame: &Frame<'_>) -> RenderSnapshot {
        let state = self.evaluate(frame);

        let mut snapshot = RenderSnapshot::new();
        let (shadow, line) = TrackLine::strokes(&state.track_line);
        snapshot.insert("TrackLineShadow", shadow);
        snapshot.insert("TrackLine", line);

        for (needle, render) in self.needles.iter().zip(state.needles.iter()) {
            needle.render_into(&mut snapshot, render.as_ref());
        }
        snapshot
    }
}

fn needle_display_mode(frame: &Frame<'_>, channel: &Channel<i64>) -> EfisNdMode {
    match frame.get(channel) {
        None => EfisNdMode::Arc,
        Some(raw) => EfisNdMode::from_raw(raw).unwrap_or(EfisNdMode::Plan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arinc429::Arinc429Word;
    use crate::channel::ChannelBus;
    use crate::radio_needle::{NeedleColor, NeedleKind};

    fn nd(side: EfisSide) -> NavigationDisplay {
        let config = SymbologyConfig {
            side,
            ..Default::default()
        };
        NavigationDisplay::new(&config).unwrap()
    }

    #[test]
    fn test_track_line_and_needles() {
        let mut nd = nd(EfisSide::L);
        let mut bus = ChannelBus::new();
        bus.publish("ndMode", 3.0);
        bus.publish("heading", Arinc429Word::normal(200.0));
        bus.publish("track", Arinc429Word::normal(190.0));
        bus.publish("fg.fma.lateralMode", 10.0);
        bus.publish("L:A32NX_EFIS_L_NAVAID_1_MODE", 2.0);
        bus.publish("NAV HAS NAV:1", true);
        bus.publish("NAV HAS LOCALIZER:1", false);
        bus.publish("NAV RELATIVE BEARING TO STATION:1", 30.0);
        bus.publish("NAV MAGVAR:1", 4.0);
        bus.publish("NAV VOR LATLONALT:1", 47.0);

        let state = nd.evaluate(&bus.commit(0.05));
        assert!(state.track_line.visible());
        assert_eq!(state.track_line.rotation_deg, -10.0);

        let vor = state.needles[0].unwrap();
        assert_eq!(vor.kind, NeedleKind::Vor);
        assert_eq!(vor.color, NeedleColor::White);
        assert!(state.needles[1].is_none());
    }

    #[test]
    fn test_side_selects_navaid_channels() {
        let mut right = nd(EfisSide::R);
        let mut bus = ChannelBus::new();
        bus.publish("L:A32NX_EFIS_L_NAVAID_2_MODE", 1.0);
        bus.publish("ADF SIGNAL:2", 1.0);
        bus.publish("ADF RADIAL:2", 90.0);
        let snapshot = right.update(&bus.commit(0.05));
        assert!(!snapshot.is_visible("RadioNeedle2"));

        bus.publish("L:A32NX_EFIS_R_NAVAID_2_MODE", 1.0);
        let snapshot = right.update(&bus.commit(0.05));
        assert!(snapshot.is_visible("RadioNeedle2"));
        assert!(snapshot.is_visible("RadioNeedle2Shadow"));
    }

    #[test]
    fn test_plan_mode_hides_everything() {
        let mut nd = nd(EfisSide::L);
        let mut bus = ChannelBus::new();
        bus.publish("ndMode", 4.0);
        bus.publish("heading", Arinc429Word::normal(0.0));
        bus.publish("track", Arinc429Word::normal(0.0));
        bus.publish("fg.fma.lateralMode", 0.0);
        bus.publish("L:A32NX_EFIS_L_NAVAID_1_MODE", 1.0);
        bus.publish("ADF SIGNAL:1", 1.0);

        let snapshot = nd.update(&bus.commit(0.05));
        assert!(!snapshot.is_empty());
        assert!(snapshot.iter().all(|(_, s)| !s.visible));
    }
}
