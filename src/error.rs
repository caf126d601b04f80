use thiserror::Error;

use crate::types::HotelCode;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not find coordinates for {city}, {state}")]
    GeocodeNotFound { city: String, state: String },

    #[error("geocoding service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("reference index not loaded")]
    IndexNotLoaded,

    #[error("reference state already initialized")]
    AlreadyInitialized,

    #[error("dangling reference: hotel {0} has no record in the dataset")]
    DanglingReference(HotelCode),

    #[error("feature schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("duplicate hotel code {0}")]
    DuplicateHotelCode(HotelCode),

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Artifact(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
