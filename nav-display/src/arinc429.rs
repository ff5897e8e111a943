//! ARINC 429 style validated words.
//!
//! Every numeric value that crosses the avionics bus carries a sign/status
//! matrix (SSM) alongside its payload. A payload is only meaningful when the
//! SSM reports normal operation; a failed or not-computed word usually still
//! carries a plausible number (most often 0), so consumers must branch on the
//! status before touching the value.
//!
//! # Raw encoding
//!
//! The bus transports a word as a 64-bit quantity:
//!
//! ```text
//!  63            34 33  32 31                              0
//! +----------------+------+---------------------------------+
//! |    reserved    | SSM  |   IEEE-754 f32 payload bits     |
//! +----------------+------+---------------------------------+
//! ```
//!
//! The simulation variables that carry these words are doubles holding the
//! integer value of that 64-bit quantity, see [`Arinc429Word::from_carrier`].

use serde::{Deserialize, Serialize};

/// Bit offset of the sign/status matrix within a raw word
pub const SSM_SHIFT: u32 = 32;

/// Mask for the two SSM bits after shifting
pub const SSM_MASK: u64 = 0b11;

/// Mask for the 32-bit payload
pub const VALUE_MASK: u64 = 0xFFFF_FFFF;

/// Sign/status matrix of a transmitted word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum SignStatus {
    /// Source has detected a failure; payload is meaningless
    #[strum(to_string = "FW")]
    FailureWarning,
    /// Source is healthy but has nothing to report
    #[strum(to_string = "NCD")]
    NoComputedData,
    /// Payload is a test pattern
    #[strum(to_string = "FT")]
    FunctionalTest,
    /// Payload is valid for use
    #[strum(to_string = "NO")]
    NormalOperation,
}

impl SignStatus {
    /// Decode from the two SSM bits.
    pub fn from_bits(bits: u64) -> Self {
        match bits & SSM_MASK {
            0b00 => SignStatus::FailureWarning,
            0b01 => SignStatus::NoComputedData,
            0b10 => SignStatus::FunctionalTest,
            _ => SignStatus::NormalOperation,
        }
    }

    /// Encode to the two SSM bits.
    pub fn bits(self) -> u64 {
        match self {
            SignStatus::FailureWarning => 0b00,
            SignStatus::NoComputedData => 0b01,
            SignStatus::FunctionalTest => 0b10,
            SignStatus::NormalOperation => 0b11,
        }
    }
}

/// A value tagged with the validity status it was transmitted with.
///
/// Superseded as a whole by the next bus update; never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedValue<T> {
    /// Payload. Only trustworthy when `status` is normal operation.
    pub value: T,
    /// Transmitted sign/status matrix
    pub status: SignStatus,
}

/// Numeric bus word as used by the display channels
pub type Arinc429Word = ValidatedValue<f32>;

impl<T: Copy> ValidatedValue<T> {
    /// Create a word with an explicit status.
    pub fn new(value: T, status: SignStatus) -> Self {
        Self { value, status }
    }

    /// Create a word in normal operation.
    pub fn normal(value: T) -> Self {
        Self::new(value, SignStatus::NormalOperation)
    }

    /// The single predicate gating all use of `value`.
    pub fn is_normal_operation(&self) -> bool {
        self.status == SignStatus::NormalOperation
    }

    pub fn is_failure_warning(&self) -> bool {
        self.status == SignStatus::FailureWarning
    }

    pub fn is_no_computed_data(&self) -> bool {
        self.status == SignStatus::NoComputedData
    }

    pub fn is_functional_test(&self) -> bool {
        self.status == SignStatus::FunctionalTest
    }

    /// Payload if the word is in normal operation.
    pub fn normal_value(&self) -> Option<T> {
        self.is_normal_operation().then_some(self.value)
    }

    /// Payload if the word is in normal operation, `default` otherwise.
    pub fn value_or(&self, default: T) -> T {
        self.normal_value().unwrap_or(default)
    }
}

impl Arinc429Word {
    /// Word with no data: failure warning, zero payload (raw word 0).
    pub fn empty() -> Self {
        Self::new(0.0, SignStatus::FailureWarning)
    }

    /// Decode a raw 64-bit word.
    pub fn from_raw(raw: u64) -> Self {
        let value = f32::from_bits((raw & VALUE_MASK) as u32);
        let status = SignStatus::from_bits(raw >> SSM_SHIFT);
        Self { value, status }
    }

    /// Encode into a raw 64-bit word.
    pub fn to_raw(&self) -> u64 {
        (self.status.bits() << SSM_SHIFT) | u64::from(self.value.to_bits())
    }

    /// Decode a word from the double that carries it on the simulation bus.
    ///
    /// Carriers that cannot hold a word (negative, fractional garbage beyond
    /// 34 bits, NaN, infinities) decode to [`Arinc429Word::empty`].
    pub fn from_carrier(carrier: f64) -> Self {
        const MAX_CARRIER: f64 = ((SSM_MASK << SSM_SHIFT) | VALUE_MASK) as f64;
        if !carrier.is_finite() || carrier < 0.0 || carrier > MAX_CARRIER {
            return Self::empty();
        }
        Self::from_raw(carrier as u64)
    }

    /// Encode into the double carrier used by the simulation bus.
    pub fn to_carrier(&self) -> f64 {
        self.to_raw() as f64
    }
}

impl Default for Arinc429Word {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_word_is_failure_warning() {
        let word = Arinc429Word::empty();
        assert!(word.is_failure_warning());
        assert!(!word.is_normal_operation());
        assert_eq!(word.to_raw(), 0);
        assert_eq!(Arinc429Word::from_raw(0), word);
    }

    #[test]
    fn test_decode_normal_operation() {
        let raw = (0b11u64 << 32) | u64::from(123.5f32.to_bits());
        let word = Arinc429Word::from_raw(raw);
        assert!(word.is_normal_operation());
        assert_relative_eq!(word.value, 123.5);
    }

    #[test]
    fn test_decode_each_status() {
        let payload = u64::from(7.0f32.to_bits());
        assert!(Arinc429Word::from_raw(payload).is_failure_warning());
        assert!(Arinc429Word::from_raw((0b01 << 32) | payload).is_no_computed_data());
        assert!(Arinc429Word::from_raw((0b10 << 32) | payload).is_functional_test());
        assert!(Arinc429Word::from_raw((0b11 << 32) | payload).is_normal_operation());
    }

    #[test]
    fn test_plausible_payload_is_not_trusted() {
        // Zero heading with NCD looks perfectly reasonable but must not be used
        let word = Arinc429Word::new(0.0, SignStatus::NoComputedData);
        assert_eq!(word.normal_value(), None);
        assert_relative_eq!(word.value_or(-1.0), -1.0);
    }

    #[test]
    fn test_negative_payload_survives_encoding() {
        let word = Arinc429Word::normal(-0.42);
        let decoded = Arinc429Word::from_raw(word.to_raw());
        assert_eq!(decoded, word);
    }

    #[test]
    fn test_carrier_decoding() {
        let word = Arinc429Word::normal(271.0);
        let decoded = Arinc429Word::from_carrier(word.to_carrier());
        assert_eq!(decoded, word);
    }

    #[test]
    fn test_bad_carriers_decode_empty() {
        assert_eq!(Arinc429Word::from_carrier(f64::NAN), Arinc429Word::empty());
        assert_eq!(Arinc429Word::from_carrier(-1.0), Arinc429Word::empty());
        assert_eq!(
            Arinc429Word::from_carrier(f64::INFINITY),
            Arinc429Word::empty()
        );
        assert_eq!(Arinc429Word::from_carrier(1e30), Arinc429Word::empty());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SignStatus::NormalOperation.to_string(), "NO");
        assert_eq!(SignStatus::NoComputedData.to_string(), "NCD");
        assert_eq!(SignStatus::FunctionalTest.to_string(), "FT");
        assert_eq!(SignStatus::FailureWarning.to_string(), "FW");
    }
}
