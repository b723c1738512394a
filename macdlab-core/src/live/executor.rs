//! Maker-priced order execution with partial-fill reconciliation.
//!
//! One `execute` call is one fill cycle: place a limit order nudged just
//! inside the spread, poll for fills, and after a bounded wait cancel and
//! re-place the remainder at a refreshed price. Fills are deduplicated by
//! trade id and accumulated into a volume-weighted average price.
//!
//! A partial-fill timeout is expected steady state, not an error. A rejected
//! placement aborts the cycle: a stuck half-filled state is reported, never
//! silently retried forever.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Fill, OrderRequest, TradeId};
use crate::exchange::{Exchange, ExchangeError};
use crate::live::clock::Clock;

/// Tuning for one executor instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Absolute price nudge inside the spread: buys rest just above the best
    /// bid, sells just below the best ask.
    pub price_nudge: f64,

    /// Interval between fill polls.
    pub fill_poll: Duration,

    /// Residual unfilled amount after this long triggers cancel-and-reprice.
    pub reprice_after: Duration,

    /// Filled-vs-requested tolerance that counts as done.
    pub fill_epsilon: f64,

    /// Maximum lending rate passed through to margin orders.
    pub max_lending_rate: f64,

    /// Request post-only (maker) placement.
    pub post_only: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            price_nudge: 1e-8,
            fill_poll: Duration::from_secs(5),
            reprice_after: Duration::from_secs(60),
            fill_epsilon: 1e-8,
            max_lending_rate: 0.02,
            post_only: true,
        }
    }
}

/// Final accounting for one fill cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub requested_amount: f64,
    pub filled_amount: f64,
    /// Volume-weighted average fill price across all placements.
    pub average_price: f64,
    /// Number of orders placed (1 + one per reprice).
    pub placements: u32,
}

#[derive(Debug, Error)]
pub enum ExecError {
    /// The exchange rejected a placement; the cycle is aborted with whatever
    /// was filled so far described in the message.
    #[error("order placement failed after {filled} of {requested} filled: {source}")]
    Placement {
        requested: f64,
        filled: f64,
        source: ExchangeError,
    },

    /// A ticker/fills/cancel call failed mid-cycle.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Places and babysits orders for one symbol.
pub struct OrderExecutor<'a, E: Exchange, C: Clock> {
    exchange: &'a E,
    clock: &'a C,
    config: ExecutorConfig,
}

impl<'a, E: Exchange, C: Clock> OrderExecutor<'a, E, C> {
    pub fn new(exchange: &'a E, clock: &'a C, config: ExecutorConfig) -> Self {
        Self {
            exchange,
            clock,
            config,
        }
    }

    /// Fill `amount` units of `symbol` in the given direction.
    ///
    /// Returns once the accumulated fills reach the requested amount within
    /// `fill_epsilon`.
    pub fn execute(
        &self,
        symbol: &str,
        amount: f64,
        is_buy: bool,
    ) -> Result<ExecutionReport, ExecError> {
        let mut seen: HashSet<TradeId> = HashSet::new();
        let mut filled = 0.0_f64;
        let mut notional = 0.0_f64;
        let mut placements = 0_u32;

        while amount - filled > self.config.fill_epsilon {
            let ticker = self.exchange.ticker(symbol)?;
            let rate = if is_buy {
                ticker.best_bid + self.config.price_nudge
            } else {
                ticker.best_ask - self.config.price_nudge
            };

            let request = OrderRequest {
                symbol: symbol.to_string(),
                rate,
                amount: amount - filled,
                max_lending_rate: self.config.max_lending_rate,
                post_only: self.config.post_only,
                is_buy,
            };

            let ack = match self.exchange.place_margin_order(&request) {
                Ok(ack) => ack,
                Err(e) => {
                    warn!(symbol, rate, remaining = amount - filled, error = %e,
                        "order placement failed, aborting cycle");
                    return Err(ExecError::Placement {
                        requested: amount,
                        filled,
                        source: e,
                    });
                }
            };
            placements += 1;
            info!(symbol, order_id = ack.order_id.0, rate, amount = request.amount, is_buy,
                "order placed");
            absorb(&ack.fills, &mut seen, &mut filled, &mut notional);

            let deadline = self.clock.now() + self.config.reprice_after.as_secs() as i64;
            while amount - filled > self.config.fill_epsilon && self.clock.now() < deadline {
                self.clock.sleep(self.config.fill_poll);
                let fills = self.exchange.order_fills(ack.order_id)?;
                let newly = absorb(&fills, &mut seen, &mut filled, &mut notional);
                if newly > 0.0 {
                    info!(symbol, order_id = ack.order_id.0, filled, requested = amount,
                        "fills accumulated");
                }
            }

            if amount - filled > self.config.fill_epsilon {
                self.exchange.cancel_order(ack.order_id)?;
                // Catch fills that landed between the last poll and the cancel.
                let fills = self.exchange.order_fills(ack.order_id)?;
                absorb(&fills, &mut seen, &mut filled, &mut notional);
                info!(symbol, order_id = ack.order_id.0, filled, requested = amount,
                    "fill wait elapsed, repricing remainder");
            }
        }

        let average_price = if filled > 0.0 { notional / filled } else { 0.0 };
        info!(symbol, filled, average_price, placements, "order cycle complete");
        Ok(ExecutionReport {
            requested_amount: amount,
            filled_amount: filled,
            average_price,
            placements,
        })
    }
}

/// Fold unseen fills into the running totals; returns the newly added volume.
fn absorb(
    fills: &[Fill],
    seen: &mut HashSet<TradeId>,
    filled: &mut f64,
    notional: &mut f64,
) -> f64 {
    let mut added = 0.0;
    for fill in fills {
        if seen.insert(fill.trade_id) {
            *filled += fill.amount;
            *notional += fill.amount * fill.rate;
            added += fill.amount;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fill;

    fn fill(id: u64, amount: f64, rate: f64) -> Fill {
        Fill {
            trade_id: TradeId(id),
            amount,
            rate,
            total: amount * rate,
        }
    }

    #[test]
    fn absorb_dedupes_by_trade_id() {
        let mut seen = HashSet::new();
        let mut filled = 0.0;
        let mut notional = 0.0;

        let batch = vec![fill(1, 2.0, 10.0), fill(2, 1.0, 11.0)];
        absorb(&batch, &mut seen, &mut filled, &mut notional);
        // Same fills repeated: nothing changes.
        let added = absorb(&batch, &mut seen, &mut filled, &mut notional);

        assert_eq!(added, 0.0);
        assert_eq!(filled, 3.0);
        assert_eq!(notional, 31.0);
    }

    #[test]
    fn vwap_weights_by_volume() {
        let mut seen = HashSet::new();
        let mut filled = 0.0;
        let mut notional = 0.0;
        absorb(&[fill(1, 3.0, 10.0)], &mut seen, &mut filled, &mut notional);
        absorb(&[fill(2, 1.0, 14.0)], &mut seen, &mut filled, &mut notional);
        assert!((notional / filled - 11.0).abs() < 1e-12);
    }
}
