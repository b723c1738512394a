//! Strategy parameter tuple: the grid-search key.

use serde::{Deserialize, Serialize};

/// EMA periods plus the decision sampling interval. All components are >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamSet {
    /// Fast EMA period.
    pub fast: usize,
    /// Slow EMA period.
    pub slow: usize,
    /// Signal-line EMA period (over the MACD line).
    pub signal: usize,
    /// Decide on every Nth valid observation.
    pub tick: usize,
}

impl ParamSet {
    pub fn new(fast: usize, slow: usize, signal: usize, tick: usize) -> Self {
        assert!(fast >= 1, "fast period must be >= 1");
        assert!(slow >= 1, "slow period must be >= 1");
        assert!(signal >= 1, "signal period must be >= 1");
        assert!(tick >= 1, "tick interval must be >= 1");
        Self {
            fast,
            slow,
            signal,
            tick,
        }
    }
}

impl std::fmt::Display for ParamSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.fast, self.slow, self.signal, self.tick
        )
    }
}
