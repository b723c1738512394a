//! Domain types: candles, positions, orders, fills.

pub mod candle;
pub mod order;
pub mod params;
pub mod position;

pub use candle::{Candle, CandlePeriod};
pub use order::{Fill, MarginPosition, OrderAck, OrderId, OrderRequest, Ticker, TradeId};
pub use params::ParamSet;
pub use position::{Direction, Position, StepEvent};
