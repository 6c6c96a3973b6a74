use thiserror::Error;

#[derive(Error, Debug)]
pub enum SellerFinanceError {
    #[error("Invalid period '{0}': expected 'YYYY-Www' or 'YYYY-MM'")]
    InvalidPeriod(String),

    #[error("Invalid tariff for warehouse '{warehouse}': {details}")]
    InvalidTariff { warehouse: String, details: String },

    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(String),

    #[error("Failed to fetch period {period}: {details}")]
    FetchError { period: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SellerFinanceError>;
