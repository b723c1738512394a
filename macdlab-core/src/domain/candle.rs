//! OHLCV candle and the exchange's allowed candle periods.

use serde::{Deserialize, Serialize};

/// A single OHLCV candle as returned by the chart-data collaborator.
///
/// Immutable once produced; the engine only ever reads it. `timestamp` is the
/// candle's open time in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candle periods the chart API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CandlePeriod {
    M5,
    M15,
    M30,
    H2,
    H4,
    D1,
}

impl CandlePeriod {
    /// Period length in seconds.
    pub fn seconds(self) -> u32 {
        match self {
            CandlePeriod::M5 => 300,
            CandlePeriod::M15 => 900,
            CandlePeriod::M30 => 1800,
            CandlePeriod::H2 => 7200,
            CandlePeriod::H4 => 14400,
            CandlePeriod::D1 => 86400,
        }
    }
}

impl TryFrom<u32> for CandlePeriod {
    type Error = String;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        match secs {
            300 => Ok(CandlePeriod::M5),
            900 => Ok(CandlePeriod::M15),
            1800 => Ok(CandlePeriod::M30),
            7200 => Ok(CandlePeriod::H2),
            14400 => Ok(CandlePeriod::H4),
            86400 => Ok(CandlePeriod::D1),
            other => Err(format!("unsupported candle period: {other}s")),
        }
    }
}

impl From<CandlePeriod> for u32 {
    fn from(p: CandlePeriod) -> u32 {
        p.seconds()
    }
}
