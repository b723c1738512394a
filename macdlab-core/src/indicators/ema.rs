//! Streaming Exponential Moving Average (EMA) with a warm-up gate.
//!
//! Recursive: EMA[t] = alpha * price[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1).
//!
//! The first `period - 1` updates return `None` (untrained): the recursion is
//! seeded from zero and needs a period's worth of observations before the
//! value means anything. This mirrors a simple-moving-average warm-up policy
//! rather than a bias-corrected EMA.

/// Streaming EMA over a scalar series.
///
/// Owned exclusively by the signal or backtest run that created it; `update`
/// is the only mutation. Callers must not feed NaN.
#[derive(Debug, Clone)]
pub struct EmaTracker {
    alpha: f64,
    period: usize,
    seen: usize,
    value: f64,
}

impl EmaTracker {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            alpha: 2.0 / (period as f64 + 1.0),
            period,
            seen: 0,
            value: 0.0,
        }
    }

    /// Advance the average by one observation.
    ///
    /// Returns `None` until the tracker has seen `period` observations;
    /// from the `period`-th update onward returns the current value.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        self.value = price * self.alpha + self.value * (1.0 - self.alpha);
        if self.seen < self.period {
            self.seen += 1;
        }
        if self.seen < self.period {
            None
        } else {
            Some(self.value)
        }
    }

    pub fn is_trained(&self) -> bool {
        self.seen >= self.period
    }

    /// Current average, meaningful only once trained.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Discard all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.seen = 0;
        self.value = 0.0;
    }
}
