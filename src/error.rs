use thiserror::Error;

use crate::types::EntityKind;

#[derive(Error, Debug)]
pub enum GhxError {
    #[error("unsupported entity kind: {0}")]
    UnsupportedKind(String),

    #[error("cannot render {found} rows in a {expected} table")]
    HeterogeneousRows {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("malformed {kind}: missing required attribute `{attribute}`")]
    MalformedEntity {
        kind: EntityKind,
        attribute: &'static str,
    },

    #[error("no such item #{position} (last listing had {len}), run a list command first")]
    PositionNotFound { position: usize, len: usize },

    #[error("no such item, run a list command first")]
    EmptyCache,

    #[error("index cache is unreadable: {0}")]
    CorruptCache(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GhxError {
    /// Errors the user can fix by running a listing first.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            GhxError::PositionNotFound { .. } | GhxError::EmptyCache
        )
    }
}

pub type Result<T> = std::result::Result<T, GhxError>;
