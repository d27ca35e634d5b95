/// StockView error type
///
/// The view, statistics and category paths never fail; errors only come
/// from decoding snapshots, parsing configuration and local patching.

use crate::record::RecordId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("unknown sort key: '{0}'")]
    UnknownSortKey(String),

    /// A local patch could not be applied; the caller should reload the
    /// full collection from the service.
    #[error("conflict on record {id:?}: {reason}")]
    Conflict {
        id: Option<RecordId>,
        reason: &'static str,
    },

    #[error("sale draft is not valid: {0}")]
    InvalidDraft(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
