//! Typed channel handles and per-tick coalescing of bus updates.
//!
//! The transport behind the bus is opaque: something publishes named values
//! and discrete events into a [`ChannelBus`], and once per display tick the
//! bus is committed into a [`Frame`]. Components only ever read a frame, so
//! several updates to the same channel within one tick collapse into the
//! last one and nothing observes a half-updated tick.
//!
//! Each channel declares its [`Delivery`]: continuous channels are read every
//! tick, on-change channels only report on the tick their value changed.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arinc429::Arinc429Word;
use crate::error::SymbologyError;

/// Value carried by a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelValue {
    Bool(bool),
    Number(f64),
    Word(Arinc429Word),
    Text(String),
}

impl ChannelValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ChannelValue::Bool(_) => "bool",
            ChannelValue::Number(_) => "number",
            ChannelValue::Word(_) => "word",
            ChannelValue::Text(_) => "text",
        }
    }
}

impl From<bool> for ChannelValue {
    fn from(v: bool) -> Self {
        ChannelValue::Bool(v)
    }
}

impl From<f64> for ChannelValue {
    fn from(v: f64) -> Self {
        ChannelValue::Number(v)
    }
}

impl From<Arinc429Word> for ChannelValue {
    fn from(v: Arinc429Word) -> Self {
        ChannelValue::Word(v)
    }
}

impl From<&str> for ChannelValue {
    fn from(v: &str) -> Self {
        ChannelValue::Text(v.to_string())
    }
}

impl From<String> for ChannelValue {
    fn from(v: String) -> Self {
        ChannelValue::Text(v)
    }
}

/// Rust types that can be read out of a [`ChannelValue`].
pub trait ChannelType: Sized {
    const NAME: &'static str;

    fn from_value(value: &ChannelValue) -> Option<Self>;
}

impl ChannelType for bool {
    const NAME: &'static str = "bool";

    fn from_value(value: &ChannelValue) -> Option<Self> {
        match value {
            ChannelValue::Bool(b) => Some(*b),
            // Simulation booleans are frequently published as 0/1 numbers
            ChannelValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }
}

impl ChannelType for f64 {
    const NAME: &'static str = "number";

    fn from_value(value: &ChannelValue) -> Option<Self> {
        match value {
            ChannelValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl ChannelType for i64 {
    const NAME: &'static str = "enum";

    fn from_value(value: &ChannelValue) -> Option<Self> {
        match value {
            ChannelValue::Number(n) if n.is_finite() => Some(n.round() as i64),
            _ => None,
        }
    }
}

impl ChannelType for Arinc429Word {
    const NAME: &'static str = "word";

    fn from_value(value: &ChannelValue) -> Option<Self> {
        match value {
            ChannelValue::Word(w) => Some(*w),
            ChannelValue::Number(n) => Some(Arinc429Word::from_carrier(*n)),
            _ => None,
        }
    }
}

impl ChannelType for String {
    const NAME: &'static str = "text";

    fn from_value(value: &ChannelValue) -> Option<Self> {
        match value {
            ChannelValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// How a channel's value reaches its consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Latest value is available every tick
    Continuous,
    /// Value is only reported on the tick it changed
    OnChange,
}

/// Typed handle to a named channel.
///
/// Components are constructed with the handles they need instead of reaching
/// for channels by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel<T> {
    name: String,
    delivery: Delivery,
    _ty: PhantomData<fn() -> T>,
}

impl<T: ChannelType> Channel<T> {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delivery: Delivery::Continuous,
            _ty: PhantomData,
        }
    }

    pub fn on_change(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delivery: Delivery::OnChange,
            _ty: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }
}

/// Staging area for bus traffic between ticks.
#[derive(Debug, Default)]
pub struct ChannelBus {
    latest: BTreeMap<String, ChannelValue>,
    pending: BTreeMap<String, ChannelValue>,
    pending_events: BTreeSet<String>,
    changed: BTreeSet<String>,
    events: BTreeSet<String>,
    /// Channel and expected type of every mismatch already warned about
    mismatches: RefCell<BTreeSet<(String, &'static str)>>,
}

impl ChannelBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a value. Later publishes in the same tick overwrite earlier ones.
    pub fn publish(&mut self, name: impl Into<String>, value: impl Into<ChannelValue>) {
        self.pending.insert(name.into(), value.into());
    }

    /// Stage a discrete event (button press, key event).
    pub fn raise(&mut self, event: impl Into<String>) {
        self.pending_events.insert(event.into());
    }

    /// Apply everything staged since the last commit and expose the
    /// end-of-tick state.
    pub fn commit(&mut self, dt_s: f64) -> Frame<'_> {
        self.changed.clear();
        for (name, value) in std::mem::take(&mut self.pending) {
            if let Some(previous) = self.latest.get(&name) {
                if previous.type_name() != value.type_name() {
                    self.mismatches.get_mut().retain(|(n, _)| *n != name);
                }
            }
            if self.latest.get(&name) != Some(&value) {
                self.changed.insert(name.clone());
            }
            self.latest.insert(name, value);
        }
        self.events = std::mem::take(&mut self.pending_events);

        Frame {
            dt_s,
            values: &self.latest,
            changed: &self.changed,
            events: &self.events,
            mismatches: &self.mismatches,
        }
    }
}

/// Read-only, coalesced view of the bus for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Time since the previous tick in seconds
    pub dt_s: f64,
    values: &'a BTreeMap<String, ChannelValue>,
    changed: &'a BTreeSet<String>,
    events: &'a BTreeSet<String>,
    mismatches: &'a RefCell<BTreeSet<(String, &'static str)>>,
}

impl<'a> Frame<'a> {
    /// Latest value of a channel regardless of its delivery style.
    ///
    /// `None` if nothing was ever published or the value has the wrong type.
    /// A mismatch is warned about once until the channel changes type.
    pub fn latest<T: ChannelType>(&self, channel: &Channel<T>) -> Option<T> {
        let value = self.values.get(channel.name())?;
        let typed = T::from_value(value);
        if typed.is_none() {
            let err = SymbologyError::ChannelType {
                name: channel.name().to_string(),
                expected: T::NAME,
                found: value.type_name(),
            };
            let first = self
                .mismatches
                .borrow_mut()
                .insert((channel.name().to_string(), T::NAME));
            if first {
                warn!("{err}");
            } else {
                debug!("{err}");
            }
        }
        typed
    }

    /// Value as seen through the channel's declared delivery: continuous
    /// channels always report, on-change channels only on the tick they
    /// changed.
    pub fn get<T: ChannelType>(&self, channel: &Channel<T>) -> Option<T> {
        match channel.delivery() {
            Delivery::Continuous => self.latest(channel),
            Delivery::OnChange if self.has_changed(channel.name()) => self.latest(channel),
            Delivery::OnChange => None,
        }
    }

    pub fn has_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    /// True if the discrete event was raised during this tick.
    pub fn event(&self, name: &str) -> bool {
        self.events.contains(name)
    }
}
