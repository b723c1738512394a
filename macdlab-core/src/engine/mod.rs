//! Position state machine driven by the MACD crossover.
//!
//! One `step` per sampled tick: close check first, then open check. Ties
//! (`macd == signal`) are sticky no-ops. The very first trained signal only
//! seeds a direction unless `open_on_seed` is set.
//!
//! Closing realizes P/L relative to the entry price, optionally scaled by a
//! compounding stake of `1 + realized_profit`, minus a round-trip fee and an
//! extra margin-lending fee on short closes. All knobs live in
//! `StrategyConfig` so fee schedules are swappable per exchange and the
//! divergent historical behaviors stay reachable.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Position, StepEvent};
use crate::signal::MacdPoint;

/// Trading constants and behavior toggles for one strategy instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Round-trip fee charged on every close, as a fraction of the stake.
    pub round_trip_fee: f64,

    /// Extra fixed lending fee charged when a short closes.
    pub margin_lend_fee: f64,

    /// Scale each trade's P/L by `1 + realized_profit` so later trades risk
    /// a stake sized by trailing equity.
    pub compound: bool,

    /// Charge the round-trip fee on the compounded stake rather than the
    /// initial one. Only meaningful when `compound` is set.
    pub compound_fees: bool,

    /// Record an entry price on the seeding tick, turning the first signal
    /// into a real open.
    pub open_on_seed: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            round_trip_fee: 0.0025,
            margin_lend_fee: 0.0002,
            compound: true,
            compound_fees: true,
            open_on_seed: false,
        }
    }
}

/// Advance the position machine by one sampled tick.
///
/// Pure: consumes the current position and returns the next one plus the
/// event describing what happened. Untrained signals are a no-op.
pub fn step(
    cfg: &StrategyConfig,
    mut pos: Position,
    point: MacdPoint,
    price: f64,
) -> (Position, StepEvent) {
    let Some((macd, signal)) = point.trained() else {
        return (pos, StepEvent::Held);
    };

    if pos.direction.is_flat() {
        let direction = if macd > signal {
            Direction::Long
        } else if macd < signal {
            Direction::Short
        } else {
            // Tie before any direction exists: stay unseeded.
            return (pos, StepEvent::Held);
        };

        pos.direction = direction;
        if cfg.open_on_seed {
            pos.entry_price = price;
            return (pos, StepEvent::Opened { direction });
        }
        return (pos, StepEvent::Seeded { direction });
    }

    let closing = match pos.direction {
        Direction::Long => macd < signal,
        Direction::Short => macd > signal,
        Direction::Flat => unreachable!("flat handled above"),
    };
    if !closing {
        return (pos, StepEvent::Held);
    }

    let closed_side = pos.direction;
    let opened = closed_side.opposite();

    // Settle the close fully before the new side is considered. A seeded
    // direction with no recorded entry closes without realizing anything.
    if pos.entry_price > 0.0 {
        let rel = match closed_side {
            Direction::Long => (price - pos.entry_price) / pos.entry_price,
            Direction::Short => (pos.entry_price - price) / pos.entry_price,
            Direction::Flat => unreachable!(),
        };

        let stake = if cfg.compound {
            1.0 + pos.realized_profit
        } else {
            1.0
        };
        let fee_stake = if cfg.compound && cfg.compound_fees {
            stake
        } else {
            1.0
        };

        let mut fee = cfg.round_trip_fee * fee_stake;
        if closed_side == Direction::Short {
            fee += cfg.margin_lend_fee;
        }
        let pnl = rel * stake - fee;

        pos.realized_profit += pnl;
        pos.realized_fees += fee;
        pos.direction = opened;
        pos.entry_price = price;
        return (pos, StepEvent::Reversed { opened, pnl, fee });
    }

    pos.direction = opened;
    pos.entry_price = price;
    (pos, StepEvent::Opened { direction: opened })
}
