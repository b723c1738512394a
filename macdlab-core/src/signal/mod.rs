//! MACD-style crossover oscillator.
//!
//! MACD line: fast EMA minus slow EMA of price.
//! Signal line: a third EMA over the MACD line itself.
//!
//! Both price EMAs advance on every update; the signal EMA is fed only once
//! the MACD line is trained, so its warm-up counts MACD observations, not raw
//! prices.

use crate::indicators::EmaTracker;

/// One oscillator output per input price. Either side may still be warming up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
}

impl MacdPoint {
    /// Both lines trained.
    pub fn trained(&self) -> Option<(f64, f64)> {
        match (self.macd, self.signal) {
            (Some(m), Some(s)) => Some((m, s)),
            _ => None,
        }
    }
}

/// Fast/slow EMA pair plus a signal EMA over their difference.
#[derive(Debug, Clone)]
pub struct MacdCross {
    fast: EmaTracker,
    slow: EmaTracker,
    signal: EmaTracker,
}

impl MacdCross {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast: EmaTracker::new(fast_period),
            slow: EmaTracker::new(slow_period),
            signal: EmaTracker::new(signal_period),
        }
    }

    /// Advance all three trackers by one price observation.
    pub fn update(&mut self, price: f64) -> MacdPoint {
        let f = self.fast.update(price);
        let s = self.slow.update(price);

        let macd = match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        };
        let signal = match macd {
            Some(m) => self.signal.update(m),
            None => None,
        };

        MacdPoint { macd, signal }
    }

    /// Updates needed before both lines are trained.
    ///
    /// The MACD line trains on the `max(fast, slow)`-th price, which also
    /// feeds the signal line its first value; the signal line needs
    /// `signal_period` MACD values in total.
    pub fn warmup_ticks(&self) -> usize {
        self.fast.period().max(self.slow.period()) + self.signal.period() - 1
    }

    pub fn is_trained(&self) -> bool {
        self.fast.is_trained() && self.slow.is_trained() && self.signal.is_trained()
    }

    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_is_pointwise_fast_minus_slow() {
        let prices: Vec<f64> = (1..=40).map(|i| 100.0 + (i as f64) * 0.7).collect();

        let mut cross = MacdCross::new(3, 7, 2);
        let mut fast = EmaTracker::new(3);
        let mut slow = EmaTracker::new(7);

        for &p in &prices {
            let point = cross.update(p);
            let f = fast.update(p);
            let s = slow.update(p);
            match (f, s) {
                (Some(f), Some(s)) => {
                    let macd = point.macd.expect("macd should be trained");
                    assert!((macd - (f - s)).abs() < 1e-12);
                }
                _ => assert_eq!(point.macd, None),
            }
        }
    }

    #[test]
    fn signal_trains_after_macd() {
        let mut cross = MacdCross::new(2, 4, 3);
        let mut macd_trained_at = None;
        let mut signal_trained_at = None;

        for i in 0..20 {
            let point = cross.update(50.0 + i as f64);
            if macd_trained_at.is_none() && point.macd.is_some() {
                macd_trained_at = Some(i);
            }
            if signal_trained_at.is_none() && point.signal.is_some() {
                signal_trained_at = Some(i);
            }
        }

        // MACD trains once the slow EMA does (4th update, index 3); the
        // signal line needs 3 MACD values on top (index 5).
        assert_eq!(macd_trained_at, Some(3));
        assert_eq!(signal_trained_at, Some(5));
    }

    #[test]
    fn warmup_ticks_covers_both_lines() {
        let mut cross = MacdCross::new(12, 26, 9);
        assert_eq!(cross.warmup_ticks(), 34);

        for i in 0..cross.warmup_ticks() {
            let point = cross.update(100.0 + i as f64);
            if i + 1 < cross.warmup_ticks() {
                assert_eq!(point.trained(), None, "tick {i} should not be trained");
            } else {
                assert!(point.trained().is_some(), "final warmup tick must train");
            }
        }
        assert!(cross.is_trained());
    }

    #[test]
    fn constant_series_converges_macd_to_signal() {
        // Flat prices: macd goes to 0 and the signal line follows it exactly
        // after its own warm-up.
        let mut cross = MacdCross::new(3, 5, 2);
        let mut last = MacdPoint {
            macd: None,
            signal: None,
        };
        for _ in 0..200 {
            last = cross.update(42.0);
        }
        let (m, s) = last.trained().unwrap();
        assert!(m.abs() < 1e-9);
        assert!((m - s).abs() < 1e-9);
    }
}
