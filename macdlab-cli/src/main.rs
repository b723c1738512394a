//! macdlab CLI — backtest, sweep, and log-replay commands.
//!
//! Commands:
//! - `backtest` — run a single parameter tuple over a candle CSV
//! - `sweep` — grid-search the parameter space, rank for stability, and
//!   report the best single tuple plus the best bounded parameter region
//! - `replay` — replay a legacy bot log (logfmt `Last=` prices) through one
//!   parameter tuple

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use macdlab_core::engine::StrategyConfig;
use macdlab_core::{Candle, ParamSet};
use macdlab_runner::{
    load_candles_csv, load_prices_logfmt, run_trial, run_trial_prices, stability_rank,
    sweep_window, GridSpec, RunConfig, SweepConfig, TrialResult, WindowPlan, DEFAULT_MAX_ROWS,
};

#[derive(Parser)]
#[command(name = "macdlab", about = "macdlab — MACD crossover backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest over a candle CSV.
    Backtest {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML run config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Parameter tuple as fast/slow/signal/tick (e.g. 12/26/9/1).
        #[arg(long)]
        params: Option<String>,
    },
    /// Grid-search the parameter space over a candle CSV.
    Sweep {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML sweep config. Defaults to the exploratory grid.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Leaderboard entries to print.
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Print the full profit matrix for the reported signal period.
        #[arg(long, default_value_t = false)]
        matrix: bool,
    },
    /// Replay a legacy bot log through one parameter tuple.
    Replay {
        /// Log file with one `Last=<price>` observation per line.
        #[arg(long)]
        log: PathBuf,

        /// Parameter tuple as fast/slow/signal/tick (e.g. 12/26/9/1).
        #[arg(long, default_value = "12/26/9/1")]
        params: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Backtest {
            data,
            config,
            params,
        } => run_backtest_cmd(data, config, params),
        Commands::Sweep {
            data,
            config,
            top,
            matrix,
        } => run_sweep_cmd(data, config, top, matrix),
        Commands::Replay { log, params } => run_replay_cmd(log, &params),
    }
}

fn run_backtest_cmd(
    data: PathBuf,
    config_path: Option<PathBuf>,
    params: Option<String>,
) -> Result<()> {
    if config_path.is_some() && params.is_some() {
        bail!("--config and --params are mutually exclusive");
    }

    let (params, strategy, symbol) = if let Some(path) = config_path {
        let config = RunConfig::from_toml_path(&path)?;
        println!("Run id: {}", config.run_id());
        (config.params, config.strategy, config.symbol)
    } else if let Some(text) = params {
        (parse_params(&text)?, StrategyConfig::default(), String::new())
    } else {
        bail!("one of --config or --params is required");
    };

    let candles = load_candles_csv(&data)?;
    if candles.is_empty() {
        bail!("no candles loaded from {}", data.display());
    }
    info!(path = %data.display(), candles = candles.len(), "candle history loaded");
    println!("Window: {}", window_label(&candles));

    let result = run_trial(params, &strategy, &candles);
    print_trial(&result, &symbol, candles.len());
    Ok(())
}

fn run_sweep_cmd(
    data: PathBuf,
    config_path: Option<PathBuf>,
    top: usize,
    matrix: bool,
) -> Result<()> {
    let candles = load_candles_csv(&data)?;
    if candles.is_empty() {
        bail!("no candles loaded from {}", data.display());
    }
    info!(path = %data.display(), candles = candles.len(), "candle history loaded");
    println!("Window: {}", window_label(&candles));

    let (grid, strategy, plan, matrix_signal) = match config_path {
        Some(path) => {
            let config = SweepConfig::from_toml_path(&path)?;
            println!("Run id: {}", config.run_id());
            (config.grid, config.strategy, config.plan, config.matrix_signal)
        }
        None => {
            let grid = GridSpec::exploratory();
            // Three window lengths ending at the full history.
            let step = candles.len() / 4;
            let plan = WindowPlan {
                shortest: candles.len() - 2 * step,
                windows: 3,
                step,
            };
            (grid, StrategyConfig::default(), plan, 9usize.min(grid.max_signal))
        }
    };

    println!(
        "Sweeping {} tuples over {} candles...",
        grid.size(),
        candles.len()
    );

    let sweep = sweep_window(grid, &strategy, &candles);
    if let Some(best) = sweep.best() {
        println!();
        println!("=== Best tuple (full window) ===");
        print_trial(best, "", candles.len());
    }

    let profit_matrix = sweep.profit_matrix(matrix_signal);
    if let Some((top_left, bottom_right, region)) = profit_matrix.best_region(DEFAULT_MAX_ROWS) {
        println!();
        println!("=== Best region (signal={matrix_signal}) ===");
        println!("From:  {top_left}");
        println!("To:    {bottom_right}");
        println!(
            "Sum:   {:.1} over {} cells",
            region.sum,
            region.height() * region.width()
        );
    }

    if matrix {
        println!();
        print!("{}", profit_matrix.render());
    }

    println!();
    println!("=== Stability leaderboard (avg rank over {} windows) ===", plan.windows);
    let board = stability_rank(grid, &strategy, &candles, plan);
    println!("{:<4} {:<16} {:>10}", "#", "Params", "Avg Rank");
    for (index, (params, rank)) in board.iter().take(top).enumerate() {
        println!("{:<4} {:<16} {:>10.2}", index + 1, params.to_string(), rank);
    }

    Ok(())
}

fn run_replay_cmd(log: PathBuf, params: &str) -> Result<()> {
    let params = parse_params(params)?;
    let prices = load_prices_logfmt(&log)?;
    if prices.is_empty() {
        bail!("no prices loaded from {}", log.display());
    }

    let result = run_trial_prices(params, &StrategyConfig::default(), &prices);
    print_trial(&result, "", prices.len());
    Ok(())
}

fn window_label(candles: &[Candle]) -> String {
    let fmt = |ts: i64| {
        DateTime::from_timestamp(ts, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ts.to_string())
    };
    format!(
        "{} to {} UTC",
        fmt(candles[0].timestamp),
        fmt(candles[candles.len() - 1].timestamp)
    )
}

fn parse_params(text: &str) -> Result<ParamSet> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 4 {
        bail!("expected fast/slow/signal/tick, got '{text}'");
    }
    let mut values = [0usize; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid number '{part}' in '{text}'"))?;
        if *slot == 0 {
            bail!("all parameters must be at least 1, got '{text}'");
        }
    }
    Ok(ParamSet::new(values[0], values[1], values[2], values[3]))
}

fn print_trial(result: &TrialResult, symbol: &str, observations: usize) {
    println!();
    println!("=== Trial Result ===");
    if !symbol.is_empty() {
        println!("Symbol:       {symbol}");
    }
    println!("Params:       {}", result.params);
    println!("Observations: {observations}");
    println!("Trades:       {}", result.stats.trade_count);
    println!("Profit:       {:.2}%", result.profit * 100.0);
    println!("Fees:         {:.4}", result.fees);
    println!("Win Rate:     {:.1}%", result.stats.win_rate * 100.0);
    println!("Avg Win:      {:.4}", result.stats.avg_win);
    println!("Avg Loss:     {:.4}", result.stats.avg_loss);
    println!("Expectancy:   {:.3}", result.stats.tharp_expectancy);
    println!();
}
