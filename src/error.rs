//! Error types for the data source boundary and the render lifecycle.

use thiserror::Error;

/// Failures of a single data source round trip.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} answered with HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path} returned a body that is not JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} returned an unexpected shape: {message}")]
    Schema { path: String, message: String },
}

impl DataSourceError {
    pub fn path(&self) -> &str {
        match self {
            DataSourceError::Http { path, .. }
            | DataSourceError::Status { path, .. }
            | DataSourceError::Decode { path, .. }
            | DataSourceError::Schema { path, .. } => path,
        }
    }
}

/// Failures surfaced by `render()` and command submission.
///
/// A missing mount point is not an error; render reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error("container {selector} is not rendered yet")]
    NotRendered { selector: String },

    #[error("{selector}: refresh interval must be greater than zero")]
    InvalidInterval { selector: String },
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
