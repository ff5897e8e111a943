//! Visibility gating with "hide wins" precedence.
//!
//! A gate is an ordered list of hide conditions. The element is visible only
//! when none of them holds; the first holding condition is reported so the
//! reason an element disappeared shows up in the logs. Gates are rebuilt from
//! fresh inputs every tick and never cache a decision.

use crate::arinc429::ValidatedValue;
use crate::modes::{ArmedLateralMode, EfisNdMode, LateralMode};

/// Outcome of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityDecision {
    pub visible: bool,
    /// Label of the first hide condition that held
    pub hidden_by: Option<&'static str>,
}

impl VisibilityDecision {
    pub fn shown() -> Self {
        Self {
            visible: true,
            hidden_by: None,
        }
    }

    pub fn hidden(reason: &'static str) -> Self {
        Self {
            visible: false,
            hidden_by: Some(reason),
        }
    }
}

/// Ordered list of labelled hide conditions.
#[derive(Debug, Clone, Default)]
pub struct VisibilityGate {
    conditions: Vec<(&'static str, bool)>,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide the element when `condition` holds.
    pub fn hide_if(mut self, label: &'static str, condition: bool) -> Self {
        self.conditions.push((label, condition));
        self
    }

    /// Hide the element unless `condition` holds.
    pub fn require(self, label: &'static str, condition: bool) -> Self {
        self.hide_if(label, !condition)
    }

    /// Hide the element unless the word is in normal operation.
    pub fn require_valid<T: Copy>(self, label: &'static str, word: &ValidatedValue<T>) -> Self {
        self.hide_if(label, !word.is_normal_operation())
    }

    /// Hide the element unless `mode` has an entry in `table`.
    pub fn require_mode<V>(
        self,
        label: &'static str,
        mode: EfisNdMode,
        table: &[(EfisNdMode, V)],
    ) -> Self {
        let known = table.iter().any(|(m, _)| *m == mode);
        self.hide_if(label, !known)
    }

    /// Hide the element when any of `modes` is armed.
    pub fn hide_if_armed(
        self,
        label: &'static str,
        armed: ArmedLateralMode,
        modes: ArmedLateralMode,
    ) -> Self {
        self.hide_if(label, armed.intersects(modes))
    }

    /// Hide the element unless the active lateral mode satisfies `allowed`.
    pub fn require_lateral_mode(
        self,
        label: &'static str,
        mode: Option<LateralMode>,
        allowed: impl Fn(LateralMode) -> bool,
    ) -> Self {
        let ok = mode.is_some_and(allowed);
        self.hide_if(label, !ok)
    }

    pub fn decide(&self) -> VisibilityDecision {
        self.conditions
            .iter()
            .find(|(_, hide)| *hide)
            .map_or_else(VisibilityDecision::shown, |(label, _)| {
                VisibilityDecision::hidden(*label)
            })
    }

    pub fn is_visible(&self) -> bool {
        self.decide().visible
    }
}

/// Look up a per-mode value; absence means the element does not apply.
pub fn mode_lookup<V: Copy>(table: &[(EfisNdMode, V)], mode: EfisNdMode) -> Option<V> {
    table.iter().find(|(m, _)| *m == mode).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arinc429::{Arinc429Word, SignStatus};

    const TABLE: &[(EfisNdMode, f64)] =
        &[(EfisNdMode::RoseNav, 384.0), (EfisNdMode::Arc, 620.0)];

    #[test]
    fn test_empty_gate_is_visible() {
        assert!(VisibilityGate::new().is_visible());
    }

    #[test]
    fn test_hide_wins() {
        let decision = VisibilityGate::new()
            .require("a", true)
            .hide_if("b", true)
            .require("c", true)
            .decide();
        assert_eq!(decision, VisibilityDecision::hidden("b"));
    }

    #[test]
    fn test_first_hide_reason_reported() {
        let decision = VisibilityGate::new()
            .hide_if("first", true)
            .hide_if("second", true)
            .decide();
        assert_eq!(decision.hidden_by, Some("first"));
    }

    #[test]
    fn test_require_valid_rejects_plausible_invalid_word() {
        let word = Arinc429Word::new(0.0, SignStatus::FailureWarning);
        assert!(!VisibilityGate::new().require_valid("word", &word).is_visible());
        let word = Arinc429Word::normal(0.0);
        assert!(VisibilityGate::new().require_valid("word", &word).is_visible());
    }

    #[test]
    fn test_mode_membership() {
        assert!(VisibilityGate::new()
            .require_mode("mode", EfisNdMode::Arc, TABLE)
            .is_visible());
        assert!(!VisibilityGate::new()
            .require_mode("mode", EfisNdMode::RoseVor, TABLE)
            .is_visible());
        assert_eq!(mode_lookup(TABLE, EfisNdMode::RoseNav), Some(384.0));
        assert_eq!(mode_lookup(TABLE, EfisNdMode::Plan), None);
    }

    #[test]
    fn test_armed_and_lateral_mode() {
        let gate = |mode, armed| {
            VisibilityGate::new()
                .require_lateral_mode("lat", mode, LateralMode::is_selected_or_none)
                .hide_if_armed("armed", armed, ArmedLateralMode::NAV)
                .decide()
        };

        assert!(gate(Some(LateralMode::Hdg), ArmedLateralMode::empty()).visible);
        assert!(gate(Some(LateralMode::Hdg), ArmedLateralMode::LOC).visible);
        assert_eq!(
            gate(Some(LateralMode::Hdg), ArmedLateralMode::NAV).hidden_by,
            Some("armed")
        );
        assert_eq!(
            gate(Some(LateralMode::Nav), ArmedLateralMode::empty()).hidden_by,
            Some("lat")
        );
        assert_eq!(
            gate(None, ArmedLateralMode::empty()).hidden_by,
            Some("lat")
        );
    }
}
