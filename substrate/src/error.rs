//! # Errors
//!
//! [`SubstrateError`] is what every public operation returns. Each variant
//! is one kind callers can match on, and each carries the structured context
//! (operation, record kind, storage key label, call name) needed to diagnose
//! it without retrying.
//!
//! ```text
//! RecordError::Empty            ─► NotFound
//! RecordError::UnknownVersion   ─► UnknownVersion
//! RecordError::Decode           ─► Decode
//! sentinel 0 from an index      ─► NotFound
//! BuildError                    ─► Build
//! ExtrinsicFailed(Module)       ─► Dispatch
//! ExtrinsicFailed(other)        ─► DispatchRejected
//! no terminal event             ─► IndeterminateOutcome
//! ChainError::Cancelled         ─► Cancelled
//! ChainError::{Transport, ..}   ─► Connection
//! ```

use thiserror::Error;

use crate::chain::{BlockHash, ChainError};
use crate::codec::{DecodeError, RecordError, RecordKind};
use crate::transaction::BuildError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SubstrateError> = std::result::Result<T, E>;

/// Errors returned by [`crate::client::Substrate`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstrateError {
    /// Nothing is stored under the key, or an index resolved to the
    /// sentinel ID zero.
    #[error("{what} not found ({key})")]
    NotFound { what: &'static str, key: String },

    /// The record's schema version is outside what this build understands.
    #[error("unknown {kind} schema version {version} ({key})")]
    UnknownVersion {
        kind: RecordKind,
        version: u8,
        key: String,
    },

    /// The stored bytes are not a valid encoding.
    #[error("failed to decode {what} ({key}): {source}")]
    Decode {
        what: &'static str,
        key: String,
        #[source]
        source: DecodeError,
    },

    #[error("failed to build call: {0}")]
    Build(#[from] BuildError),

    /// The call was included but a pallet rejected it.
    #[error("{call} failed: {module}.{error} (module {module_index}, error {error_index})")]
    Dispatch {
        call: String,
        module_index: u8,
        error_index: u8,
        module: String,
        error: String,
    },

    /// The call was included but failed outside any pallet (bad origin, ...).
    #[error("{call} rejected: {reason}")]
    DispatchRejected { call: String, reason: String },

    /// The call was included but its block carries no verdict for it.
    #[error("{call} outcome indeterminate in block {block}")]
    IndeterminateOutcome { call: String, block: BlockHash },

    #[error("{operation} cancelled")]
    Cancelled { operation: String },

    #[error("{operation}: connection failure: {reason}")]
    Connection { operation: String, reason: String },

    /// Rejected locally before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SubstrateError {
    /// Returns a mapper from [`ChainError`] that tags the failure with
    /// `operation`. Use with `map_err`.
    pub fn chain(operation: impl Into<String>) -> impl FnOnce(ChainError) -> Self {
        let operation = operation.into();
        move |err| match err {
            ChainError::Cancelled => Self::Cancelled { operation },
            other => Self::Connection {
                operation,
                reason: other.to_string(),
            },
        }
    }

    /// Translates a record-decoding failure for the record at `key`.
    pub fn record(kind: RecordKind, key: impl Into<String>, err: RecordError) -> Self {
        let key = key.into();
        match err {
            RecordError::Empty => Self::NotFound {
                what: kind.as_str(),
                key,
            },
            RecordError::UnknownVersion(version) => Self::UnknownVersion { kind, version, key },
            RecordError::Decode(source) => Self::Decode {
                what: kind.as_str(),
                key,
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// `true` for both module errors and other dispatch rejections.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. } | Self::DispatchRejected { .. })
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::IndeterminateOutcome { .. })
    }

    /// `(module_index, error_index)` of a module dispatch error.
    pub fn dispatch_index(&self) -> Option<(u8, u8)> {
        match self {
            Self::Dispatch {
                module_index,
                error_index,
                ..
            } => Some((*module_index, *error_index)),
            _ => None,
        }
    }
}
