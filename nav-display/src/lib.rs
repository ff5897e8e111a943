//! Deviation and guidance symbology for the primary flight and navigation
//! displays.
//!
//! Turns raw, possibly invalid bus values into render decisions: which
//! symbols are visible, where the deviation symbols sit, how the bearing
//! needles and track line are rotated. Drawing itself is left to the caller.
//!
//! Values arrive through a [`ChannelBus`]; once per display tick the bus is
//! committed into a [`Frame`] and each display pulls its inputs from that
//! frame and returns a [`RenderSnapshot`].

pub mod arinc429;
pub mod channel;
pub mod config;
pub mod config_storage;
pub mod deviation;
mod error;
pub mod filter;
pub mod gate;
pub mod landing_system;
pub mod ls_info;
pub mod marker;
pub mod modes;
pub mod nd;
pub mod radio_needle;
pub mod render;
pub mod scenario;
pub mod track_line;

pub use arinc429::{Arinc429Word, SignStatus, ValidatedValue};
pub use channel::{Channel, ChannelBus, ChannelValue, Delivery, Frame};
pub use config::{ConfigError, SymbologyConfig, XtkValidityPolicy};
pub use config_storage::ConfigStorage;
pub use deviation::{DeviationIndicator, DeviationKind, DeviationReading, IndicatorState};
pub use error::{SymbologyError, SymbologyResult};
pub use filter::LagFilter;
pub use gate::{VisibilityDecision, VisibilityGate};
pub use landing_system::LandingSystemDisplay;
pub use marker::{MarkerBeaconClassifier, MarkerDisplay};
pub use modes::{ArmedLateralMode, EfisNdMode, EfisSide, LateralMode, NavAidMode};
pub use nd::NavigationDisplay;
pub use radio_needle::{NeedleColor, NeedleRender, ReceiverInputs};
pub use render::{RenderSnapshot, RenderState};
pub use scenario::{Scenario, ScenarioError};
