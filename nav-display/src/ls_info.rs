//! Landing system information block: ILS ident, frequency and DME distance.
//!
//! Text is only derived while the element showing it is active. An inactive
//! field keeps whatever it last showed; reactivation always re-derives it
//! from the latest source values instead of trusting the cached text.

use serde::Serialize;

use crate::arinc429::Arinc429Word;

/// Frequencies outside this band (MHz) are not ILS and are not shown
pub const ILS_FREQ_MIN_MHZ: f64 = 108.0;
pub const ILS_FREQ_MAX_MHZ: f64 = 112.0;

/// Below this distance (nm) the DME readout carries one decimal
pub const DME_DECIMAL_BELOW_NM: f64 = 20.0;

/// Source values for one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LsInfoInputs {
    pub has_loc: bool,
    pub ident: String,
    pub freq_mhz: f64,
    pub has_dme: bool,
    pub dme_nm: f64,
    pub fm1_nav_discrete: Arinc429Word,
}

impl LsInfoInputs {
    pub fn ident_hidden(&self) -> bool {
        self.ident.is_empty() || !self.has_loc
    }

    pub fn freq_hidden(&self) -> bool {
        self.freq_mhz < ILS_FREQ_MIN_MHZ || self.freq_mhz > ILS_FREQ_MAX_MHZ
    }

    /// The DME receiver only reads valid when the FM is tuning the navaids.
    pub fn dme_available(&self) -> bool {
        self.has_dme && self.fm1_nav_discrete.is_normal_operation()
    }
}

/// Integer part of a frequency
pub fn freq_leading(freq_mhz: f64) -> String {
    format!("{}", freq_mhz.trunc() as i64)
}

/// Two-digit fractional part of a frequency with its decimal point
pub fn freq_trailing(freq_mhz: f64) -> String {
    let hundredths = ((freq_mhz - freq_mhz.trunc()) * 100.0).round() as i64;
    format!(".{hundredths:02}")
}

/// DME distance split into a large leading part and a small trailing part.
pub fn dme_text(distance_nm: f64) -> (String, String) {
    let rounded = (distance_nm * 10.0).round() / 10.0;
    if rounded < DME_DECIMAL_BELOW_NM {
        let tenths = ((rounded - rounded.trunc()) * 10.0).round() as i64;
        (format!("{}", rounded.trunc() as i64), format!(".{tenths}"))
    } else {
        (format!("{}", rounded.round() as i64), String::new())
    }
}

/// A text element with its own active flag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextField {
    pub visible: bool,
    pub text: String,
}

impl TextField {
    /// Recompute only while active; otherwise keep the cached text.
    fn refresh(&mut self, active: bool, derive: impl FnOnce() -> String) {
        self.visible = active;
        if active {
            self.text = derive();
        }
    }
}

/// Derived texts of the block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LsInfoView {
    pub visible: bool,
    pub ident: TextField,
    pub freq_leading: TextField,
    pub freq_trailing: TextField,
    pub dme_leading: TextField,
    pub dme_trailing: TextField,
}

impl LsInfoView {
    pub fn dme_visible(&self) -> bool {
        self.dme_leading.visible
    }
}

/// The LS information block
#[derive(Debug, Clone, Default)]
pub struct LandingSystemInfo {
    view: LsInfoView,
}

impl LandingSystemInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one tick. `group_visible` is the LS latch; while it is off
    /// nothing is recomputed.
    pub fn update(&mut self, group_visible: bool, inputs: &LsInfoInputs) -> &LsInfoView {
        let view = &mut self.view;
        view.visible = group_visible;

        let ident_active = group_visible && !inputs.ident_hidden();
        view.ident.refresh(ident_active, || inputs.ident.clone());

        let freq_active = group_visible && !inputs.freq_hidden();
        view.freq_leading.refresh(freq_active, || freq_leading(inputs.freq_mhz));
        view.freq_trailing.refresh(freq_active, || freq_trailing(inputs.freq_mhz));

        let dme_active = group_visible && inputs.dme_available();
        let (leading, trailing) = if dme_active {
            dme_text(inputs.dme_nm)
        } else {
            Default::default()
        };
        view.dme_leading.refresh(dme_active, || leading);
        view.dme_trailing.refresh(dme_active, || trailing);

        &self.view
    }

    pub fn view(&self) -> &LsInfoView {
        &self.view
    }
}
