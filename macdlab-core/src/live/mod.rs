//! Live trading: per-symbol worker loop and order execution.

pub mod clock;
pub mod executor;
pub mod worker;

pub use clock::{Clock, SystemClock};
pub use executor::{ExecError, ExecutionReport, ExecutorConfig, OrderExecutor};
pub use worker::{LiveConfig, LiveError, LiveWorker};
