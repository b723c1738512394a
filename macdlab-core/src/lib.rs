//! macdlab core — streaming MACD signal path, position state machine, and
//! the live execution loop.
//!
//! The decision path is identical in both modes:
//! candles → tick sampler → MACD crossover → position machine. Backtests
//! (in `macdlab-runner`) replay historical candle slices through it; the
//! live worker feeds it freshly polled candles and translates direction
//! changes into margin orders via the `Exchange` collaborator trait.

pub mod domain;
pub mod engine;
pub mod exchange;
pub mod indicators;
pub mod live;
pub mod sampler;
pub mod signal;

pub use domain::{Candle, CandlePeriod, Direction, ParamSet, Position, StepEvent};
pub use engine::{step, StrategyConfig};
pub use exchange::{Exchange, ExchangeError};
pub use indicators::EmaTracker;
pub use sampler::{sample, TickSampler};
pub use signal::{MacdCross, MacdPoint};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    /// Workers run one per symbol on plain threads; everything they carry
    /// must cross a thread boundary.
    #[test]
    fn domain_types_are_send_sync() {
        assert_send::<Candle>();
        assert_sync::<Candle>();
        assert_send::<Position>();
        assert_sync::<Position>();
        assert_send::<ParamSet>();
        assert_sync::<ParamSet>();
        assert_send::<StrategyConfig>();
        assert_sync::<StrategyConfig>();
        assert_send::<MacdCross>();
        assert_sync::<MacdCross>();
        assert_send::<TickSampler>();
        assert_sync::<TickSampler>();
    }
}
