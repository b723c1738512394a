//! Stability ranking across progressively longer backtest windows.
//!
//! One window's trials are sorted descending by profit; a tuple's rank is its
//! 1-based index in that order. Ranks accumulate per tuple across windows and
//! the average rank (ascending) decides the board: rewarding configurations
//! that are consistently good across horizons, not accidentally peak in one
//! lucky window.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use macdlab_core::engine::StrategyConfig;
use macdlab_core::{Candle, ParamSet};

use crate::backtest::TrialResult;
use crate::sweep::{nan_worst, sweep_window, GridSpec};

/// The set of historical window lengths (in candles) to rank across.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPlan {
    /// Shortest window, in candles.
    pub shortest: usize,
    /// Number of windows.
    pub windows: usize,
    /// Length increment between consecutive windows, in candles.
    pub step: usize,
}

impl WindowPlan {
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.windows).map(move |i| self.shortest + i * self.step)
    }
}

/// Running rank sums per parameter tuple.
#[derive(Debug, Clone, Default)]
pub struct RankAccumulator {
    sums: HashMap<ParamSet, f64>,
    windows: usize,
}

impl RankAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Fold one window's trials into the accumulator.
    ///
    /// NaN profits sort last, so degenerate trials always carry the worst
    /// ranks of their window.
    pub fn add_window(&mut self, trials: &[TrialResult]) {
        let mut ordered: Vec<&TrialResult> = trials.iter().collect();
        ordered.sort_by(|a, b| nan_worst(b.profit, a.profit));

        for (index, trial) in ordered.iter().enumerate() {
            *self.sums.entry(trial.params).or_insert(0.0) += (index + 1) as f64;
        }
        self.windows += 1;
    }

    /// Average rank per tuple, ascending: lowest first (most consistently
    /// profitable across horizons).
    pub fn average_ranks(&self) -> Vec<(ParamSet, f64)> {
        let mut board: Vec<(ParamSet, f64)> = self
            .sums
            .iter()
            .map(|(&params, &sum)| (params, sum / self.windows as f64))
            .collect();
        board.sort_by(|a, b| nan_worst(a.1, b.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
        board
    }
}

/// Sweep the grid across every window in the plan and return the average-rank
/// board, best first.
pub fn stability_rank(
    grid: GridSpec,
    strategy: &StrategyConfig,
    candles: &[Candle],
    plan: WindowPlan,
) -> Vec<(ParamSet, f64)> {
    let mut accumulator = RankAccumulator::new();
    for length in plan.lengths() {
        let start = candles.len().saturating_sub(length);
        let sweep = sweep_window(grid, strategy, &candles[start..]);
        accumulator.add_window(&sweep.trials);
    }
    accumulator.average_ranks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::TradeStats;

    fn trial(params: ParamSet, profit: f64) -> TrialResult {
        TrialResult {
            params,
            profit,
            fees: 0.0,
            stats: TradeStats::from_deltas(&[profit]),
        }
    }

    fn p(fast: usize) -> ParamSet {
        ParamSet::new(fast, 10, 2, 1)
    }

    #[test]
    fn rank_one_in_every_window_averages_to_exactly_one() {
        let mut acc = RankAccumulator::new();
        for window in 0..7 {
            let spread = window as f64;
            acc.add_window(&[
                trial(p(1), 5.0 + spread),
                trial(p(2), 1.0),
                trial(p(3), -2.0),
            ]);
        }

        let board = acc.average_ranks();
        assert_eq!(board[0].0, p(1));
        assert_eq!(board[0].1, 1.0);
    }

    #[test]
    fn average_rank_rewards_consistency_over_single_peaks() {
        let mut acc = RankAccumulator::new();
        // p(1): rank 2 in both windows (avg 2.0).
        // p(2): rank 1 then rank 3 (avg 2.0) — ties p(1).
        // p(3): rank 3 then rank 1 (avg 2.0).
        // Make the consistent one strictly better instead:
        acc.add_window(&[trial(p(1), 2.0), trial(p(2), 3.0), trial(p(3), 1.0)]);
        acc.add_window(&[trial(p(1), 2.0), trial(p(2), -1.0), trial(p(3), 3.0)]);
        acc.add_window(&[trial(p(1), 2.0), trial(p(2), -1.0), trial(p(3), 1.0)]);

        let board = acc.average_ranks();
        // p(1): ranks 2,1,1 → 4/3. p(2): 1,3,3 → 7/3. p(3): 3,2,2 → 7/3.
        assert_eq!(board[0].0, p(1));
        assert!((board[0].1 - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn nan_profit_takes_the_worst_rank() {
        let mut acc = RankAccumulator::new();
        acc.add_window(&[
            trial(p(1), f64::NAN),
            trial(p(2), -10.0),
            trial(p(3), 0.5),
        ]);

        let board = acc.average_ranks();
        assert_eq!(board[0].0, p(3));
        assert_eq!(board[2].0, p(1));
        assert_eq!(board[2].1, 3.0);
    }

    #[test]
    fn window_plan_lengths() {
        let plan = WindowPlan {
            shortest: 100,
            windows: 4,
            step: 50,
        };
        let lengths: Vec<usize> = plan.lengths().collect();
        assert_eq!(lengths, vec![100, 150, 200, 250]);
    }

    #[test]
    fn stability_rank_covers_every_tuple() {
        let candles: Vec<Candle> = (0..200)
            .map(|i| {
                let close = 100.0 + 10.0 * ((i as f64) * 0.2).sin();
                Candle {
                    timestamp: 1_700_000_000 + (i as i64) * 300,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1.0,
                }
            })
            .collect();

        let grid = GridSpec {
            max_fast: 2,
            max_slow: 2,
            max_signal: 1,
            max_tick: 2,
        };
        let plan = WindowPlan {
            shortest: 100,
            windows: 3,
            step: 40,
        };

        let board = stability_rank(grid, &StrategyConfig::default(), &candles, plan);
        assert_eq!(board.len(), grid.size());
        // Best average rank can never beat 1.
        assert!(board[0].1 >= 1.0);
        // Board is ascending.
        for pair in board.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }
}
