//! macdlab runner — backtest orchestration over the core decision path.
//!
//! Builds on `macdlab-core` to provide:
//! - Single-trial backtests with win/loss statistics and Tharp expectancy
//! - Parallel grid sweeps with a (fast, slow) × tick profit matrix
//! - Stability ranking: average rank across progressively longer windows
//! - Bounded-row maximum submatrix search for stable parameter regions
//! - CSV candle and legacy bot-log ingest
//! - Serializable, content-addressed run configuration

pub mod backtest;
pub mod config;
pub mod ranker;
pub mod replay;
pub mod submatrix;
pub mod sweep;

pub use backtest::{run_trial, run_trial_prices, TradeStats, TrialResult};
pub use config::{ConfigError, RunConfig, RunId, SweepConfig};
pub use ranker::{stability_rank, RankAccumulator, WindowPlan};
pub use replay::{load_candles_csv, load_prices_logfmt, ReplayError};
pub use submatrix::{max_submatrix, Region, DEFAULT_MAX_ROWS};
pub use sweep::{sweep_window, GridSpec, ProfitMatrix, WindowSweep};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    /// Sweeps fan trials out across rayon workers.
    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<TrialResult>();
        assert_sync::<TrialResult>();
        assert_send::<GridSpec>();
        assert_sync::<GridSpec>();
        assert_send::<ProfitMatrix>();
        assert_sync::<ProfitMatrix>();
    }
}
