//! First-order lag filter for deviation smoothing.

/// Single-pole low-pass filter with an explicit reset.
///
/// Each step moves the output toward the input by `1 - exp(-dt / tau)` of the
/// remaining error, so the response is independent of the tick rate.
#[derive(Debug, Clone, PartialEq)]
pub struct LagFilter {
    time_constant_s: f64,
    last_output: f64,
}

impl LagFilter {
    /// Baseline output after construction or [`reset`](Self::reset)
    pub const BASELINE: f64 = 0.0;

    /// Create a filter with the given time constant in seconds.
    ///
    /// A non-positive or non-finite time constant yields a pass-through filter.
    pub fn new(time_constant_s: f64) -> Self {
        Self {
            time_constant_s,
            last_output: Self::BASELINE,
        }
    }

    pub fn time_constant_s(&self) -> f64 {
        self.time_constant_s
    }

    /// Most recent output.
    pub fn output(&self) -> f64 {
        self.last_output
    }

    /// Advance the filter by `dt_s` seconds toward `input`.
    ///
    /// `dt_s <= 0` (or non-finite) leaves the state untouched, as does a
    /// non-finite input.
    pub fn step(&mut self, input: f64, dt_s: f64) -> f64 {
        if !input.is_finite() || !dt_s.is_finite() || dt_s <= 0.0 {
            return self.last_output;
        }

        let gain = if self.time_constant_s.is_finite() && self.time_constant_s > 0.0 {
            1.0 - (-dt_s / self.time_constant_s).exp()
        } else {
            1.0
        };

        self.last_output += (input - self.last_output) * gain;
        self.last_output
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.last_output = Self::BASELINE;
    }
}
