//! Discrete mode enumerations shared by the displays.
//!
//! Raw numeric values match the simulation variables that carry them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::{SymbologyError, SymbologyResult};

/// Navigation display range/format mode
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EfisNdMode {
    #[strum(to_string = "ROSE_ILS")]
    RoseIls = 0,
    #[strum(to_string = "ROSE_VOR")]
    RoseVor = 1,
    #[strum(to_string = "ROSE_NAV")]
    RoseNav = 2,
    #[strum(to_string = "ARC")]
    Arc = 3,
    #[strum(to_string = "PLAN")]
    Plan = 4,
}

impl EfisNdMode {
    pub fn from_raw(raw: i64) -> SymbologyResult<Self> {
        match raw {
            0 => Ok(EfisNdMode::RoseIls),
            1 => Ok(EfisNdMode::RoseVor),
            2 => Ok(EfisNdMode::RoseNav),
            3 => Ok(EfisNdMode::Arc),
            4 => Ok(EfisNdMode::Plan),
            other => Err(SymbologyError::UnknownDisplayMode(other)),
        }
    }

    pub fn is_rose(self) -> bool {
        matches!(
            self,
            EfisNdMode::RoseIls | EfisNdMode::RoseVor | EfisNdMode::RoseNav
        )
    }
}

/// Captain (L) or first officer (R) EFIS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum EfisSide {
    L,
    R,
}

impl std::str::FromStr for EfisSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" | "l" => Ok(EfisSide::L),
            "R" | "r" => Ok(EfisSide::R),
            _ => Err(format!("Invalid EFIS side: {s}, expected L or R")),
        }
    }
}

/// Receiver selected for a bearing needle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum NavAidMode {
    Off,
    #[strum(to_string = "ADF")]
    Adf,
    #[strum(to_string = "VOR")]
    Vor,
}

impl NavAidMode {
    pub fn from_raw(raw: i64) -> SymbologyResult<Self> {
        match raw {
            0 => Ok(NavAidMode::Off),
            1 => Ok(NavAidMode::Adf),
            2 => Ok(NavAidMode::Vor),
            other => Err(SymbologyError::UnknownNavAidMode(other)),
        }
    }
}

/// Active lateral guidance mode (FMA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LateralMode {
    #[strum(to_string = "NONE")]
    None,
    #[strum(to_string = "HDG")]
    Hdg,
    #[strum(to_string = "TRACK")]
    Track,
    #[strum(to_string = "NAV")]
    Nav,
    #[strum(to_string = "LOC_CPT")]
    LocCpt,
    #[strum(to_string = "LOC_TRACK")]
    LocTrack,
    #[strum(to_string = "LAND")]
    Land,
    #[strum(to_string = "FLARE")]
    Flare,
    #[strum(to_string = "ROLL_OUT")]
    RollOut,
    #[strum(to_string = "RWY")]
    Rwy,
    #[strum(to_string = "RWY_TRACK")]
    RwyTrack,
    #[strum(to_string = "GA_TRACK")]
    GaTrack,
}

impl LateralMode {
    /// Decode the FG lateral mode code. Unknown codes are `None`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        Some(match raw {
            0 => LateralMode::None,
            10 => LateralMode::Hdg,
            11 => LateralMode::Track,
            20 => LateralMode::Nav,
            30 => LateralMode::LocCpt,
            31 => LateralMode::LocTrack,
            32 => LateralMode::Land,
            33 => LateralMode::Flare,
            34 => LateralMode::RollOut,
            40 => LateralMode::Rwy,
            41 => LateralMode::RwyTrack,
            50 => LateralMode::GaTrack,
            _ => return None,
        })
    }

    pub fn raw(self) -> i64 {
        match self {
            LateralMode::None => 0,
            LateralMode::Hdg => 10,
            LateralMode::Track => 11,
            LateralMode::Nav => 20,
            LateralMode::LocCpt => 30,
            LateralMode::LocTrack => 31,
            LateralMode::Land => 32,
            LateralMode::Flare => 33,
            LateralMode::RollOut => 34,
            LateralMode::Rwy => 40,
            LateralMode::RwyTrack => 41,
            LateralMode::GaTrack => 50,
        }
    }

    /// Selected (non-managed) lateral guidance
    pub fn is_selected_or_none(self) -> bool {
        matches!(
            self,
            LateralMode::None | LateralMode::Hdg | LateralMode::Track
        )
    }
}

bitflags! {
    /// Armed lateral modes, one bit per mode
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ArmedLateralMode: u32 {
        const NAV = 1 << 0;
        const LOC = 1 << 1;
    }
}

impl ArmedLateralMode {
    /// Interpret a raw bitmask, ignoring unknown bits.
    pub fn from_raw(raw: i64) -> Self {
        Self::from_bits_truncate(raw.clamp(0, i64::from(u32::MAX)) as u32)
    }
}
