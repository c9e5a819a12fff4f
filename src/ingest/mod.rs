mod driver;

pub use driver::{DayOutcome, DayStatus, FetchDriver, RangeReport};

use crate::provider::ProviderError;
use thiserror::Error;

/// Errors that can occur while loading one day.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Database write failed: {0:#}")]
    Store(anyhow::Error),
}
