use chrono::NaiveDate;
use thiserror::Error;

use crate::llm::LlmError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid setting, including the model credential
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Check-out {checkout} must be after check-in {checkin}")]
    InvalidDateRange {
        checkin: NaiveDate,
        checkout: NaiveDate,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),
}
