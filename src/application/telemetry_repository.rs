// Repository trait for time-series data access
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot connect to {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Execute a Flux query and return the raw CSV response body
    async fn query_csv(&self, flux: &str) -> Result<String, QueryError>;

    /// Base URL of the backend, used in diagnostics
    fn endpoint(&self) -> &str;
}
