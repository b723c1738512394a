//! Parameter grid sweep over (fast, slow, signal, tick).
//!
//! Trials are independent pure computations over an immutable candle slice
//! and run in parallel across tuples. The profit matrix view (rows keyed by
//! (fast, slow), columns by tick, one matrix per signal period) feeds the
//! bounded submatrix maximizer and the plain-text dump.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use macdlab_core::engine::StrategyConfig;
use macdlab_core::{Candle, ParamSet};

use crate::backtest::{run_trial, TrialResult};
use crate::submatrix::{max_submatrix, Region};

/// Inclusive upper bounds of the swept ranges; every dimension starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub max_fast: usize,
    pub max_slow: usize,
    pub max_signal: usize,
    pub max_tick: usize,
}

impl GridSpec {
    /// Grid bounds matching the original exploration: fast up to 50, slow up
    /// to 100, signal up to 10, tick up to 24 (two hours of 5m candles).
    pub fn exploratory() -> Self {
        Self {
            max_fast: 50,
            max_slow: 100,
            max_signal: 10,
            max_tick: 24,
        }
    }

    pub fn size(&self) -> usize {
        self.max_fast * self.max_slow * self.max_signal * self.max_tick
    }

    /// All tuples in the grid, fast-major like the matrix layout.
    pub fn tuples(&self) -> Vec<ParamSet> {
        let mut out = Vec::with_capacity(self.size());
        for signal in 1..=self.max_signal {
            for fast in 1..=self.max_fast {
                for slow in 1..=self.max_slow {
                    for tick in 1..=self.max_tick {
                        out.push(ParamSet::new(fast, slow, signal, tick));
                    }
                }
            }
        }
        out
    }
}

/// Profit matrix for one signal period: rows keyed (fast, slow), columns by
/// tick, cells holding profit in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitMatrix {
    pub signal: usize,
    /// (fast, slow) per row, fast-major.
    pub row_keys: Vec<(usize, usize)>,
    /// Tick value per column.
    pub col_keys: Vec<usize>,
    pub cells: Vec<Vec<f64>>,
    /// Rows per fast band (= max_slow).
    band_rows: usize,
}

impl ProfitMatrix {
    /// Best bounded region within each fast band, and the best band overall.
    ///
    /// Restricting the search to one fast value at a time keeps the region's
    /// rows adjacent in `slow` (the matrix is fast-major, so a rectangle
    /// spanning bands would mix unrelated parameter neighborhoods).
    pub fn best_region(&self, max_rows: usize) -> Option<(ParamSet, ParamSet, Region)> {
        let bands = self.cells.len() / self.band_rows;
        let mut best: Option<Region> = None;

        for band in 0..bands {
            let rows = &self.cells[band * self.band_rows..(band + 1) * self.band_rows];
            if let Some(mut region) = max_submatrix(rows, max_rows) {
                region.top += band * self.band_rows;
                region.bottom += band * self.band_rows;
                if best.map_or(true, |b| region.sum > b.sum) {
                    best = Some(region);
                }
            }
        }

        best.map(|region| {
            let (f0, s0) = self.row_keys[region.top];
            let (f1, s1) = self.row_keys[region.bottom];
            let top_left = ParamSet::new(f0, s0, self.signal, self.col_keys[region.left]);
            let bottom_right = ParamSet::new(f1, s1, self.signal, self.col_keys[region.right]);
            (top_left, bottom_right, region)
        })
    }

    /// Plain-text dump: tick axis on top, fast/slow labels on the left.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("f/s    ");
        for tick in &self.col_keys {
            out.push_str(&format!(" {tick:<7}"));
        }
        out.push('\n');

        for (keys, row) in self.row_keys.iter().zip(&self.cells) {
            out.push_str(&format!("{:3}/{:<3} ", keys.0, keys.1));
            for cell in row {
                out.push_str(&format!(" {cell:<7.1}"));
            }
            out.push('\n');
        }
        out
    }
}

/// Everything a single window's sweep produced.
#[derive(Debug, Clone)]
pub struct WindowSweep {
    pub trials: Vec<TrialResult>,
    grid: GridSpec,
}

impl WindowSweep {
    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    /// Profit matrix slice for one signal period, cells in percent.
    pub fn profit_matrix(&self, signal: usize) -> ProfitMatrix {
        let mut row_keys = Vec::with_capacity(self.grid.max_fast * self.grid.max_slow);
        for fast in 1..=self.grid.max_fast {
            for slow in 1..=self.grid.max_slow {
                row_keys.push((fast, slow));
            }
        }
        let col_keys: Vec<usize> = (1..=self.grid.max_tick).collect();

        let mut cells = vec![vec![f64::NAN; col_keys.len()]; row_keys.len()];
        for trial in &self.trials {
            if trial.params.signal != signal {
                continue;
            }
            let row =
                (trial.params.fast - 1) * self.grid.max_slow + (trial.params.slow - 1);
            cells[row][trial.params.tick - 1] = 100.0 * trial.profit;
        }

        ProfitMatrix {
            signal,
            row_keys,
            col_keys,
            cells,
            band_rows: self.grid.max_slow,
        }
    }

    /// Highest-profit trial, NaN-profit trials last.
    pub fn best(&self) -> Option<&TrialResult> {
        self.trials
            .iter()
            .max_by(|a, b| nan_worst(a.profit, b.profit))
    }
}

/// Sweep the full grid over one candle window.
pub fn sweep_window(
    grid: GridSpec,
    strategy: &StrategyConfig,
    candles: &[Candle],
) -> WindowSweep {
    let trials: Vec<TrialResult> = grid
        .tuples()
        .par_iter()
        .map(|&params| run_trial(params, strategy, candles))
        .collect();
    WindowSweep { trials, grid }
}

/// Total order on f64 that ranks NaN strictly below every real number.
pub fn nan_worst(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: 1_700_000_000 + (i as i64) * 300,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1.0,
            })
            .collect()
    }

    fn small_grid() -> GridSpec {
        GridSpec {
            max_fast: 2,
            max_slow: 3,
            max_signal: 2,
            max_tick: 2,
        }
    }

    #[test]
    fn grid_enumerates_every_tuple_once() {
        let grid = small_grid();
        let tuples = grid.tuples();
        assert_eq!(tuples.len(), grid.size());

        let unique: std::collections::HashSet<_> = tuples.iter().collect();
        assert_eq!(unique.len(), tuples.len());
    }

    #[test]
    fn sweep_produces_one_trial_per_tuple() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + 5.0 * ((i as f64) * 0.3).sin())
            .collect();
        let sweep = sweep_window(small_grid(), &StrategyConfig::default(), &candles_from(&closes));
        assert_eq!(sweep.trials.len(), small_grid().size());
    }

    #[test]
    fn profit_matrix_places_trials_by_key() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + 5.0 * ((i as f64) * 0.3).sin())
            .collect();
        let sweep = sweep_window(small_grid(), &StrategyConfig::default(), &candles_from(&closes));

        let matrix = sweep.profit_matrix(1);
        assert_eq!(matrix.cells.len(), 6); // 2 fast * 3 slow
        assert_eq!(matrix.cells[0].len(), 2); // 2 ticks

        for trial in sweep.trials.iter().filter(|t| t.params.signal == 1) {
            let row = (trial.params.fast - 1) * 3 + (trial.params.slow - 1);
            let cell = matrix.cells[row][trial.params.tick - 1];
            assert!((cell - 100.0 * trial.profit).abs() < 1e-12);
        }
    }

    #[test]
    fn nan_worst_ordering() {
        assert_eq!(nan_worst(1.0, f64::NAN), std::cmp::Ordering::Greater);
        assert_eq!(nan_worst(f64::NAN, -5.0), std::cmp::Ordering::Less);
        assert_eq!(nan_worst(2.0, 3.0), std::cmp::Ordering::Less);
    }

    #[test]
    fn render_includes_axis_labels() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let sweep = sweep_window(small_grid(), &StrategyConfig::default(), &candles_from(&closes));
        let text = sweep.profit_matrix(1).render();
        assert!(text.starts_with("f/s"));
        assert!(text.contains("1/1"));
        assert!(text.contains("2/3"));
    }
}
