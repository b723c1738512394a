//! Order, fill, and ticker types exchanged with the collaborator layer.

use serde::{Deserialize, Serialize};

use super::Direction;

/// Exchange-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Exchange-assigned trade (fill) identifier, used to deduplicate repeated
/// fill queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub u64);

/// Best bid/ask snapshot from the ticker collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub best_bid: f64,
    pub best_ask: f64,
}

/// An open margin position as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginPosition {
    pub direction: Direction,
    pub entry_price: f64,
    pub amount: f64,
    pub unrealized_pl: f64,
}

/// Margin order placement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub rate: f64,
    pub amount: f64,
    pub max_lending_rate: f64,
    pub post_only: bool,
    pub is_buy: bool,
}

/// A single execution against a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub trade_id: TradeId,
    pub amount: f64,
    pub rate: f64,
    pub total: f64,
}

/// Placement acknowledgement: the order id plus any fills that executed
/// immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: OrderId,
    pub fills: Vec<Fill>,
}
