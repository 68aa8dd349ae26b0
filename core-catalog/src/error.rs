//! Catalog error types.
//!
//! These never cross the crate boundary: callers of [`crate::CatalogClient`]
//! always receive a (possibly empty) result set. The error type exists so the
//! fetch pipeline can log and report the precise failure before degrading.

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CatalogError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] BridgeError),

    #[error("Catalog API returned status {status}")]
    Api { status: u16 },

    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub(crate) type Result<T> = std::result::Result<T, CatalogError>;
