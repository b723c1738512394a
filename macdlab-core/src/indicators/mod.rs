//! Streaming indicator primitives.

pub mod ema;

pub use ema::EmaTracker;
