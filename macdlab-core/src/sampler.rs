//! Every-Nth tick sampler.
//!
//! Decouples candle granularity from decision granularity: the decision path
//! sees one price per `every` valid observations. A price of `0` is the
//! feed's no-trade sentinel and is skipped without counting toward the
//! interval.

/// Stateful sampling gate used by the live loop.
#[derive(Debug, Clone)]
pub struct TickSampler {
    every: usize,
    seen: usize,
}

impl TickSampler {
    pub fn new(every: usize) -> Self {
        assert!(every >= 1, "sample interval must be >= 1");
        Self { every, seen: 0 }
    }

    /// Offer one observation; returns it back when it is the Nth valid one.
    pub fn accept(&mut self, price: f64) -> Option<f64> {
        if price == 0.0 {
            return None;
        }
        self.seen += 1;
        if self.seen % self.every == 0 {
            Some(price)
        } else {
            None
        }
    }

    pub fn every(&self) -> usize {
        self.every
    }
}

/// Single-pass lazy adapter over a price iterator, for backtest replay.
pub fn sample<I>(prices: I, every: usize) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut gate = TickSampler::new(every);
    prices.into_iter().filter_map(move |p| gate.accept(p))
}
