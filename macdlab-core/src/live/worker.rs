//! Live execution loop: one sequential worker per symbol.
//!
//! Lifecycle: seed from history, then poll one candle per period and replay
//! it through the exact decision path the backtester uses. A position
//! direction change (other than the seeding transition) closes any open
//! exchange position and reallocates the full available balance in the new
//! direction.
//!
//! Error posture follows the taxonomy: chart fetches are retried with a fixed
//! delay up to a bounded attempt count and exhaustion is fatal for this
//! worker only; an ordering-cycle failure (rejected placement, mid-cycle
//! transport error) is surfaced as a warning and the loop keeps polling,
//! operator intervention assumed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{Candle, CandlePeriod, Direction, ParamSet, Position, StepEvent};
use crate::engine::{step, StrategyConfig};
use crate::exchange::{Exchange, ExchangeError};
use crate::live::clock::Clock;
use crate::live::executor::{ExecError, ExecutorConfig, OrderExecutor};
use crate::sampler::TickSampler;
use crate::signal::MacdCross;

/// Live-loop tuning for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Candle period polled from the chart collaborator.
    pub period: CandlePeriod,

    /// Chart fetch attempts before the worker gives up.
    pub fetch_attempts: u32,

    /// Fixed delay between fetch attempts.
    pub retry_delay: Duration,

    pub executor: ExecutorConfig,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            period: CandlePeriod::M5,
            fetch_attempts: 5,
            retry_delay: Duration::from_secs(10),
            executor: ExecutorConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LiveError {
    /// The bounded fetch retry budget is spent; fatal for this worker.
    #[error("chart fetch for {symbol} failed after {attempts} attempts: {last}")]
    FetchExhausted {
        symbol: String,
        attempts: u32,
        last: ExchangeError,
    },

    /// A non-chart collaborator call failed during seeding.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Per-symbol trading worker. Strictly sequential: signal update, position
/// decision, and order execution happen in order, never concurrently.
pub struct LiveWorker<E: Exchange, C: Clock> {
    exchange: E,
    clock: C,
    symbol: String,
    params: ParamSet,
    strategy: StrategyConfig,
    config: LiveConfig,
    signal: MacdCross,
    sampler: TickSampler,
    position: Position,
    last_timestamp: i64,
    seeded: bool,
}

impl<E: Exchange, C: Clock> LiveWorker<E, C> {
    pub fn new(
        exchange: E,
        clock: C,
        symbol: impl Into<String>,
        params: ParamSet,
        strategy: StrategyConfig,
        config: LiveConfig,
    ) -> Self {
        let signal = MacdCross::new(params.fast, params.slow, params.signal);
        let sampler = TickSampler::new(params.tick);
        Self {
            exchange,
            clock,
            symbol: symbol.into(),
            params,
            strategy,
            config,
            signal,
            sampler,
            position: Position::flat(),
            last_timestamp: 0,
            seeded: false,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Entry point for the process supervisor: seed, then poll forever.
    /// Returns only on a fatal condition for this worker.
    pub fn start(mut self) -> Result<(), LiveError> {
        self.seed()?;
        let period = Duration::from_secs(self.config.period.seconds() as u64);
        loop {
            self.clock.sleep(period);
            self.sync()?;
        }
    }

    /// Replay enough history to train the signal path, then reconcile with
    /// any position already open on the exchange.
    pub fn seed(&mut self) -> Result<(), LiveError> {
        let period_secs = self.config.period.seconds() as i64;
        let needed = (self.signal.warmup_ticks() + 1) * self.params.tick;
        let now = self.clock.now();
        let start = now - needed as i64 * period_secs;

        let candles = self.fetch_with_retry(start, now)?;
        info!(symbol = %self.symbol, candles = candles.len(), "seeding from history");
        for candle in candles {
            self.process_candle(candle);
        }

        // A still-open position from a previous run overrides whatever the
        // replay concluded; the exchange's book is the truth.
        if let Some(open) = self.exchange.margin_position(&self.symbol)? {
            if open.direction != Direction::Flat {
                info!(symbol = %self.symbol, direction = ?open.direction,
                    entry = open.entry_price, "adopting open exchange position");
                self.position.direction = open.direction;
                self.position.entry_price = open.entry_price;
            }
        }

        self.seeded = true;
        Ok(())
    }

    /// Fetch and process every candle that closed since the last one seen.
    /// Duplicate or out-of-order candles are detected and skipped.
    pub fn sync(&mut self) -> Result<Vec<StepEvent>, LiveError> {
        let now = self.clock.now();
        let candles = self.fetch_with_retry(self.last_timestamp + 1, now)?;

        let mut events = Vec::new();
        for candle in candles {
            if candle.timestamp <= self.last_timestamp {
                warn!(symbol = %self.symbol, timestamp = candle.timestamp,
                    last = self.last_timestamp, "stale candle skipped");
                continue;
            }
            let event = self.process_candle(candle);
            if self.seeded && event.is_tradeable_change() {
                self.reallocate(event);
            }
            events.push(event);
        }
        Ok(events)
    }

    fn process_candle(&mut self, candle: Candle) -> StepEvent {
        self.last_timestamp = candle.timestamp;
        let Some(price) = self.sampler.accept(candle.close) else {
            return StepEvent::Held;
        };

        let point = self.signal.update(price);
        let (next, event) = step(&self.strategy, self.position, point, price);
        self.position = next;

        info!(symbol = %self.symbol, timestamp = candle.timestamp, price,
            macd = ?point.macd, signal = ?point.signal, event = ?event, "tick processed");
        if event.is_tradeable_change() {
            info!(symbol = %self.symbol, direction = ?self.position.direction,
                profit = self.position.realized_profit,
                fees = self.position.realized_fees, "position changed");
        }
        event
    }

    /// All-in reallocation: flatten on the exchange, then fill the new
    /// direction sized to the entire available balance.
    fn reallocate(&mut self, event: StepEvent) {
        let direction = self.position.direction;
        if let Err(e) = self.try_reallocate(direction) {
            warn!(symbol = %self.symbol, event = ?event, error = %e,
                "ordering cycle aborted");
        }
    }

    fn try_reallocate(&self, direction: Direction) -> Result<(), ExecError> {
        if self.exchange.margin_position(&self.symbol)?.is_some() {
            self.exchange.close_margin_position(&self.symbol)?;
            info!(symbol = %self.symbol, "closed open exchange position");
        }

        let is_buy = direction == Direction::Long;
        let balance = self.exchange.available_balance(&self.symbol)?;
        let ticker = self.exchange.ticker(&self.symbol)?;
        let reference = if is_buy {
            ticker.best_ask
        } else {
            ticker.best_bid
        };
        let amount = balance / reference;

        let executor = OrderExecutor::new(&self.exchange, &self.clock, self.config.executor);
        let report = executor.execute(&self.symbol, amount, is_buy)?;
        info!(symbol = %self.symbol, direction = ?direction,
            filled = report.filled_amount, average_price = report.average_price,
            "order filled");
        Ok(())
    }

    fn fetch_with_retry(&self, start: i64, end: i64) -> Result<Vec<Candle>, LiveError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .exchange
                .chart_data(&self.symbol, start, end, self.config.period)
            {
                Ok(candles) => return Ok(candles),
                Err(e) if attempt < self.config.fetch_attempts => {
                    warn!(symbol = %self.symbol, attempt, error = %e,
                        "chart fetch failed, retrying");
                    self.clock.sleep(self.config.retry_delay);
                }
                Err(e) => {
                    error!(symbol = %self.symbol, attempts = attempt, error = %e,
                        "chart fetch retry budget spent, worker stopping");
                    return Err(LiveError::FetchExhausted {
                        symbol: self.symbol.clone(),
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }
    }
}
