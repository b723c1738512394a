//! Exchange collaborator seam.
//!
//! The engine consumes market data and places orders exclusively through this
//! trait; the per-exchange REST/auth client behind it (nonce generation,
//! signing, JSON transport) lives outside this crate. Tests drive the live
//! loop with a scripted mock implementation.

use thiserror::Error;

use crate::domain::{Candle, CandlePeriod, Fill, MarginPosition, OrderAck, OrderId, OrderRequest, Ticker};

/// Errors surfaced by a collaborator call.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transient transport-level failure; the caller may retry.
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange rejected the request (balance, precision, frozen pair).
    /// Not retryable without operator intervention.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The referenced order is unknown to the exchange.
    #[error("unknown order id {0:?}")]
    UnknownOrder(OrderId),
}

impl ExchangeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ExchangeError::Transport(_))
    }
}

/// Method-level contract for everything the engine needs from an exchange.
pub trait Exchange {
    /// Ordered candle series for `[start, end]` unix seconds at `period`.
    fn chart_data(
        &self,
        symbol: &str,
        start: i64,
        end: i64,
        period: CandlePeriod,
    ) -> Result<Vec<Candle>, ExchangeError>;

    /// Current best bid/ask.
    fn ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Currently open margin position, if any.
    fn margin_position(&self, symbol: &str) -> Result<Option<MarginPosition>, ExchangeError>;

    /// Balance available for margin trading, in quote units.
    fn available_balance(&self, symbol: &str) -> Result<f64, ExchangeError>;

    /// Place a margin order; may fill (partially) on placement.
    fn place_margin_order(&self, request: &OrderRequest) -> Result<OrderAck, ExchangeError>;

    /// All fills recorded so far for an order. May repeat earlier fills.
    fn order_fills(&self, order_id: OrderId) -> Result<Vec<Fill>, ExchangeError>;

    /// Cancel a resting order. `false` when nothing was left to cancel.
    fn cancel_order(&self, order_id: OrderId) -> Result<bool, ExchangeError>;

    /// Close the open margin position at market.
    fn close_margin_position(&self, symbol: &str) -> Result<bool, ExchangeError>;
}
