//! Error taxonomy shared by every screen.

use thiserror::Error;

use crate::config::Endpoint;

/// Broad class of a [`ClientError`], used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input failed a precondition; no request was issued.
    ValidationRejection,
    /// A candidate file could not be read as text.
    DecodeFailure,
    /// Non-success status or transport failure on a service endpoint.
    RequestFailure,
    /// A fetched index snapshot is internally inconsistent.
    DataContractViolation,
    /// The client could not be configured.
    Configuration,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed index snapshot: {0}")]
    Contract(#[from] ContractViolation),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationRejection,
            Self::Decode { .. } => ErrorKind::DecodeFailure,
            Self::Status { .. } | Self::Transport { .. } => ErrorKind::RequestFailure,
            Self::Contract(_) => ErrorKind::DataContractViolation,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }
}

/// A snapshot field the tables need is absent.
///
/// Distinct from an empty snapshot, which renders as two empty tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("no tf entry for document {doc}")]
    MissingTfRow { doc: usize },

    #[error("no idf value for term {term:?}")]
    MissingIdf { term: String },

    #[error("tfidf for term {term:?} has no score for document {doc}")]
    MissingTfidf { term: String, doc: usize },

    #[error("tfidf for term {term:?} has {found} scores for {expected} documents")]
    ExtraTfidf { term: String, expected: usize, found: usize },
}
