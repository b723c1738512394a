//! Historical data ingest: CSV candle files and legacy bot-log replay.
//!
//! The legacy format is the bot's own logfmt output, one observation per
//! line with a `Last=<price>` field. Malformed records — in either format —
//! are skipped with a warning and processing continues; a partially dirty
//! file still replays.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use macdlab_core::Candle;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Load candles from a CSV file with a
/// `timestamp,open,high,low,close,volume` header. Unparseable records are
/// skipped with a warning.
pub fn load_candles_csv(path: &Path) -> Result<Vec<Candle>, ReplayError> {
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut candles = Vec::new();
    for (index, record) in reader.deserialize::<Candle>().enumerate() {
        match record {
            Ok(candle) => candles.push(candle),
            Err(e) => {
                warn!(path = %path.display(), record = index + 1, error = %e,
                    "malformed candle record skipped");
            }
        }
    }
    Ok(candles)
}

/// Extract the `Last=<price>` observation from each line of a legacy log
/// file. Lines without a parseable field are skipped with a warning.
///
/// Zero prices are kept: they are the feed's no-trade sentinel and the tick
/// sampler discards them downstream.
pub fn load_prices_logfmt(path: &Path) -> Result<Vec<f64>, ReplayError> {
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut prices = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_last_field(&line) {
            Some(price) => prices.push(price),
            None => {
                warn!(path = %path.display(), line = index + 1,
                    "no parseable Last= field, line skipped");
            }
        }
    }
    Ok(prices)
}

/// Pull the value of the first `Last=` token out of a logfmt line.
fn parse_last_field(line: &str) -> Option<f64> {
    line.split_whitespace()
        .find_map(|token| token.strip_prefix("Last="))
        .and_then(|value| value.parse::<f64>().ok())
}
