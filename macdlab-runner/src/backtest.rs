//! Single-trial backtest: one parameter tuple over one candle slice.
//!
//! Pure and deterministic: identical `(params, strategy, candles)` inputs
//! produce bit-identical results on every invocation.

use serde::{Deserialize, Serialize};

use macdlab_core::engine::{step, StrategyConfig};
use macdlab_core::sampler::sample;
use macdlab_core::signal::MacdCross;
use macdlab_core::{Candle, ParamSet, Position};

/// Trade-level win/loss statistics for one trial.
///
/// Degenerate runs keep their NaNs: zero trades leave both rates undefined,
/// an all-winning run leaves `avg_loss` (and therefore `tharp_expectancy`)
/// undefined. Ranking code treats NaN as strictly worse than any number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub win_rate: f64,
    pub avg_win: f64,
    pub loss_rate: f64,
    pub avg_loss: f64,
    pub tharp_expectancy: f64,
    pub trade_count: usize,
}

impl TradeStats {
    /// Split realized per-trade deltas into winners/losers by sign and fold
    /// them into rates and averages.
    pub fn from_deltas(deltas: &[f64]) -> Self {
        let mut winners = Vec::new();
        let mut losers = Vec::new();
        for &d in deltas {
            if d > 0.0 {
                winners.push(d);
            } else {
                losers.push(d);
            }
        }

        let total = (winners.len() + losers.len()) as f64;
        let win_rate = winners.len() as f64 / total;
        let loss_rate = losers.len() as f64 / total;
        let avg_win = winners.iter().sum::<f64>() / winners.len() as f64;
        let avg_loss = losers.iter().sum::<f64>() / losers.len() as f64;

        // Tharp expectancy: expected value per unit risked, where the unit
        // of risk is the average loss.
        let tharp_expectancy = (avg_win * win_rate + avg_loss * loss_rate) / -avg_loss;

        Self {
            win_rate,
            avg_win,
            loss_rate,
            avg_loss,
            tharp_expectancy,
            trade_count: deltas.len(),
        }
    }
}

/// Result of one (params, window) trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub params: ParamSet,
    /// Net realized profit as a fraction of the initial stake.
    pub profit: f64,
    pub fees: f64,
    pub stats: TradeStats,
}

/// Replay a raw price series through the decision path.
pub fn run_trial_prices(params: ParamSet, strategy: &StrategyConfig, prices: &[f64]) -> TrialResult {
    let mut signal = MacdCross::new(params.fast, params.slow, params.signal);
    let mut position = Position::flat();
    let mut deltas = Vec::new();

    for price in sample(prices.iter().copied(), params.tick) {
        let point = signal.update(price);
        let (next, event) = step(strategy, position, point, price);
        position = next;
        if let Some(delta) = event.realized_delta() {
            deltas.push(delta);
        }
    }

    TrialResult {
        params,
        profit: position.realized_profit,
        fees: position.realized_fees,
        stats: TradeStats::from_deltas(&deltas),
    }
}

/// Replay a historical candle series (close prices) through the decision path.
pub fn run_trial(params: ParamSet, strategy: &StrategyConfig, candles: &[Candle]) -> TrialResult {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    run_trial_prices(params, strategy, &closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_trades_yields_nan_rates_without_panicking() {
        let stats = TradeStats::from_deltas(&[]);
        assert!(stats.win_rate.is_nan());
        assert!(stats.loss_rate.is_nan());
        assert!(stats.avg_win.is_nan());
        assert!(stats.avg_loss.is_nan());
        assert!(stats.tharp_expectancy.is_nan());
        assert_eq!(stats.trade_count, 0);
    }

    #[test]
    fn all_winning_run_propagates_nan_expectancy() {
        let stats = TradeStats::from_deltas(&[0.1, 0.2]);
        assert_eq!(stats.win_rate, 1.0);
        assert_eq!(stats.loss_rate, 0.0);
        assert!((stats.avg_win - 0.15).abs() < 1e-12);
        assert!(stats.avg_loss.is_nan());
        assert!(stats.tharp_expectancy.is_nan());
    }

    #[test]
    fn mixed_run_computes_tharp_expectancy() {
        // Two wins of 0.2, two losses of -0.1:
        // expectancy = (0.2*0.5 + (-0.1)*0.5) / 0.1 = 0.5
        let stats = TradeStats::from_deltas(&[0.2, -0.1, 0.2, -0.1]);
        assert!((stats.win_rate - 0.5).abs() < 1e-12);
        assert!((stats.avg_win - 0.2).abs() < 1e-12);
        assert!((stats.avg_loss + 0.1).abs() < 1e-12);
        assert!((stats.tharp_expectancy - 0.5).abs() < 1e-12);
        assert_eq!(stats.trade_count, 4);
    }

    #[test]
    fn run_trial_is_deterministic() {
        let prices: Vec<f64> = (0..300)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.17).sin())
            .collect();
        let params = ParamSet::new(3, 8, 2, 1);
        let strategy = StrategyConfig::default();

        let a = run_trial_prices(params, &strategy, &prices);
        let b = run_trial_prices(params, &strategy, &prices);

        // Bit-level comparison so NaN stats also count as identical.
        assert_eq!(a.profit.to_bits(), b.profit.to_bits());
        assert_eq!(a.fees.to_bits(), b.fees.to_bits());
        assert_eq!(a.stats.trade_count, b.stats.trade_count);
        assert_eq!(a.stats.win_rate.to_bits(), b.stats.win_rate.to_bits());
        assert_eq!(a.stats.avg_win.to_bits(), b.stats.avg_win.to_bits());
        assert_eq!(a.stats.avg_loss.to_bits(), b.stats.avg_loss.to_bits());
        assert_eq!(
            a.stats.tharp_expectancy.to_bits(),
            b.stats.tharp_expectancy.to_bits()
        );
    }

    #[test]
    fn oscillating_prices_produce_trades_and_fees() {
        let prices: Vec<f64> = (0..500)
            .map(|i| 100.0 + 20.0 * ((i as f64) * 0.12).sin())
            .collect();
        let result =
            run_trial_prices(ParamSet::new(3, 10, 2, 1), &StrategyConfig::default(), &prices);
        assert!(result.stats.trade_count > 0);
        assert!(result.fees > 0.0);
    }
}
