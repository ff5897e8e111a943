//! Recorded bus traffic for offline replay.
//!
//! A scenario is a list of ticks; each tick carries the channel updates and
//! discrete events published since the previous one, and the elapsed time.
//!
//! ```json
//! { "ticks": [
//!     { "dt": 0.1, "updates": { "hasLoc": true, "navRadialError": 0.5 } },
//!     { "dt": 0.1, "events": ["A320_Neo_PFD_BTN_LS_1"] }
//! ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::{ChannelBus, ChannelValue, Frame};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tick {index}: {reason}")]
    InvalidTick { index: usize, reason: String },
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Traffic of one tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioTick {
    /// Seconds since the previous tick
    pub dt: f64,
    #[serde(default)]
    pub updates: BTreeMap<String, ChannelValue>,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub ticks: Vec<ScenarioTick>,
}

impl Scenario {
    pub fn from_json(json: &str) -> ScenarioResult<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject ticks whose elapsed time is negative or not a number.
    pub fn validate(&self) -> ScenarioResult<()> {
        for (index, tick) in self.ticks.iter().enumerate() {
            if !tick.dt.is_finite() || tick.dt < 0.0 {
                return Err(ScenarioError::InvalidTick {
                    index,
                    reason: format!("dt must be a non-negative number, got {}", tick.dt),
                });
            }
        }
        Ok(())
    }

    /// Publish each tick into `bus`, commit it and hand the frame to `on_tick`.
    pub fn replay<F>(&self, bus: &mut ChannelBus, mut on_tick: F)
    where
        F: FnMut(usize, &Frame<'_>),
    {
        for (index, tick) in self.ticks.iter().enumerate() {
            for (name, value) in &tick.updates {
                bus.publish(name.clone(), value.clone());
            }
            for event in &tick.events {
                bus.raise(event.clone());
            }
            let frame = bus.commit(tick.dt);
            on_tick(index, &frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arinc429::{Arinc429Word, SignStatus};
    use crate::channel::Channel;

    const SCENARIO: &str = r#"{
        "ticks": [
            { "dt": 0.1, "updates": { "hasLoc": true, "navRadialError": 0.5 } },
            { "dt": 0.1, "updates": {
                "heading": { "value": 90.0, "status": "failure_warning" }
            }, "events": ["A320_Neo_PFD_BTN_LS_1"] },
            { "dt": 0.1 }
        ]
    }"#;

    #[test]
    fn test_parse() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        assert_eq!(scenario.ticks.len(), 3);
        assert_eq!(
            scenario.ticks[0].updates["hasLoc"],
            ChannelValue::Bool(true)
        );
        assert_eq!(
            scenario.ticks[1].updates["heading"],
            ChannelValue::Word(Arinc429Word::new(90.0, SignStatus::FailureWarning))
        );
        assert!(scenario.ticks[2].updates.is_empty());
    }

    #[test]
    fn test_negative_dt_rejected() {
        let err = Scenario::from_json(r#"{ "ticks": [ { "dt": 0.1 }, { "dt": -1 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidTick { index: 1, .. }));
    }

    #[test]
    fn test_replay_feeds_bus() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let radial = Channel::<f64>::continuous("navRadialError");
        let mut seen = Vec::new();

        let mut bus = ChannelBus::new();
        scenario.replay(&mut bus, |index, frame| {
            seen.push((
                index,
                frame.get(&radial),
                frame.event("A320_Neo_PFD_BTN_LS_1"),
            ));
        });

        assert_eq!(
            seen,
            vec![
                (0, Some(0.5), false),
                (1, Some(0.5), true),
                (2, Some(0.5), false)
            ]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
