//! Version-gated decoding of persisted records.
//!
//! Every record the chain stores starts with a one-byte schema version. The
//! version is checked against the record kind's dispatch table *before* any
//! structural decoding is attempted, so a buffer with an unknown version is
//! rejected even if the rest of it would happen to parse.
//!
//! | Kind     | Accepted versions | Layout      |
//! |----------|-------------------|-------------|
//! | Entity   | 1                 | current     |
//! | Node     | 0, 1, 2           | current     |
//! | Farm     | 1, 2, 3           | current     |
//! | Contract | not checked       | current     |
//!
//! Contract records are not version-gated. Existing on-chain contracts were
//! written without a dispatch table and the accepted set was never pinned
//! down; until it is, any version byte decodes with the current layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{DecodeError, WireDecode, WireReader};
use crate::config;
use crate::types::{Contract, Entity, Farm, Node};

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// The persisted record families this crate knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Entity,
    Node,
    Farm,
    Contract,
}

impl RecordKind {
    /// Schema versions this build can interpret, or `None` when the kind is
    /// not version-gated.
    pub fn supported_versions(self) -> Option<&'static [u8]> {
        match self {
            Self::Entity => Some(config::ENTITY_VERSIONS),
            Self::Node => Some(config::NODE_VERSIONS),
            Self::Farm => Some(config::FARM_VERSIONS),
            Self::Contract => None,
        }
    }

    /// Returns `true` if a record of this kind written under `version` can be
    /// decoded.
    pub fn accepts(self, version: u8) -> bool {
        self.supported_versions()
            .map_or(true, |versions| versions.contains(&version))
    }

    /// Lower-case name used in errors and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Node => "node",
            Self::Farm => "farm",
            Self::Contract => "contract",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecordError
// ---------------------------------------------------------------------------

/// Why a raw storage value could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Zero-length value: nothing is stored under the key.
    #[error("no record stored")]
    Empty,

    /// The leading version byte is outside the kind's supported set.
    #[error("unknown schema version {0}")]
    UnknownVersion(u8),

    /// The version was accepted but the body is malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// VersionedRecord
// ---------------------------------------------------------------------------

/// A record whose wire form begins with a schema-version byte.
///
/// The version byte is also the first field of the struct, so the
/// [`WireDecode`] impl reads it back along with everything else.
pub trait VersionedRecord: WireDecode {
    /// Which dispatch table applies.
    const KIND: RecordKind;

    /// Schema version the record was decoded from.
    fn version(&self) -> u8;
}

/// Decodes a raw storage value as `R`.
///
/// - empty input → [`RecordError::Empty`]
/// - version outside `R::KIND`'s table → [`RecordError::UnknownVersion`]
/// - anything else wrong → [`RecordError::Decode`]
///
/// Bytes after the record are ignored, matching how the chain's own client
/// libraries read storage.
pub fn decode_record<R: VersionedRecord>(raw: &[u8]) -> Result<R, RecordError> {
    let version = *raw.first().ok_or(RecordError::Empty)?;
    if !R::KIND.accepts(version) {
        return Err(RecordError::UnknownVersion(version));
    }

    let mut reader = WireReader::new(raw);
    let record = R::decode_from(&mut reader)?;
    if !reader.is_exhausted() {
        tracing::debug!(
            kind = %R::KIND,
            version,
            trailing = reader.remaining(),
            "record decoded with trailing bytes"
        );
    }
    Ok(record)
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A decoded record of any kind, for callers that pick the kind at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    Entity(Entity),
    Node(Node),
    Farm(Farm),
    Contract(Contract),
}

impl Record {
    /// Decodes `raw` using the dispatch table for `kind`.
    pub fn decode(raw: &[u8], kind: RecordKind) -> Result<Self, RecordError> {
        Ok(match kind {
            RecordKind::Entity => Self::Entity(decode_record(raw)?),
            RecordKind::Node => Self::Node(decode_record(raw)?),
            RecordKind::Farm => Self::Farm(decode_record(raw)?),
            RecordKind::Contract => Self::Contract(decode_record(raw)?),
        })
    }

    /// Kind of the contained record.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Entity(_) => RecordKind::Entity,
            Self::Node(_) => RecordKind::Node,
            Self::Farm(_) => RecordKind::Farm,
            Self::Contract(_) => RecordKind::Contract,
        }
    }

    /// Schema version the record was decoded from.
    pub fn version(&self) -> u8 {
        match self {
            Self::Entity(r) => r.version(),
            Self::Node(r) => r.version(),
            Self::Farm(r) => r.version(),
            Self::Contract(r) => r.version(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
