//! Position state: direction, entry price, and realized profit/fee accounting.

use serde::{Deserialize, Serialize};

/// Held direction of a margin position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Flat,
    Long,
    Short,
}

impl Direction {
    /// The direction entered by a buy order.
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn is_flat(self) -> bool {
        self == Direction::Flat
    }

    /// Opposite held direction. Flat has no opposite.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Flat => Direction::Flat,
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// Mutable position state owned by one decision path.
///
/// `realized_profit` and `realized_fees` are fractions of the initial stake
/// and accumulate monotonically over a run (fees only ever grow; profit moves
/// with each settled trade). `entry_price == 0.0` means no entry has been
/// recorded yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub realized_profit: f64,
    pub realized_fees: f64,
}

impl Position {
    /// Fresh flat position with zero accounting.
    pub fn flat() -> Self {
        Self {
            direction: Direction::Flat,
            entry_price: 0.0,
            realized_profit: 0.0,
            realized_fees: 0.0,
        }
    }

    /// Position seeded from an already-open exchange position.
    pub fn seeded_from_exchange(direction: Direction, entry_price: f64) -> Self {
        Self {
            direction,
            entry_price,
            realized_profit: 0.0,
            realized_fees: 0.0,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}

/// Outcome of one position-machine step.
///
/// A direction reversal settles the close fully (pnl and fee landed in the
/// position's accounting) before the new side is opened, and both legs are
/// reported as one `Reversed` event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    /// No transition: untrained signal, tie, or trend continuation.
    Held,
    /// First trained signal seeded a direction without opening a trade.
    Seeded { direction: Direction },
    /// Opened from flat (only with `open_on_seed`, or after an unrealized close).
    Opened { direction: Direction },
    /// Closed the held side and opened the opposite one in the same tick.
    Reversed {
        opened: Direction,
        /// Net profit delta realized by the close (gross minus fee).
        pnl: f64,
        fee: f64,
    },
}

impl StepEvent {
    /// True when the event should trigger live order placement.
    ///
    /// Seeding is excluded: it aligns the machine with history, it is not a
    /// crossover the exchange should act on.
    pub fn is_tradeable_change(&self) -> bool {
        matches!(self, StepEvent::Opened { .. } | StepEvent::Reversed { .. })
    }

    /// Net realized profit delta carried by this event, if it settled a trade.
    pub fn realized_delta(&self) -> Option<f64> {
        match self {
            StepEvent::Reversed { pnl, .. } => Some(*pnl),
            _ => None,
        }
    }
}
