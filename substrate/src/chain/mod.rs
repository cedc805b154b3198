//! # Chain Capabilities
//!
//! Everything this crate needs from the outside world, expressed as traits.
//! The client never talks to a transport, a keystore or a metadata decoder
//! directly; it borrows them through these seams.
//!
//! ```text
//! ┌──────────────────┐  acquire/release   ┌──────────────────┐
//! │  ConnectionPool  │ ─────────────────► │ ChainConnection  │
//! └──────────────────┘  (PooledConnection │  storage()       │
//!                         guard)          │  submit_and_watch│
//!                                         │  block_events()  │
//!                                         │  metadata() ─────┼──► Metadata
//! ┌──────────────────┐                    └──────────────────┘     storage_key()
//! │     Identity     │  account_id(), sign()                       call()
//! └──────────────────┘                                             module_error()
//! ```
//!
//! All calls are blocking. A connection is borrowed for one logical
//! operation and handed back by the guard's `Drop`, including on error
//! paths. Cancellation is the connection's business; it surfaces here as
//! [`ChainError::Cancelled`] and is never folded into "not found".

pub mod memory;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

use crate::transaction::SignedExtrinsic;
use crate::types::AccountId;

// ---------------------------------------------------------------------------
// ChainError
// ---------------------------------------------------------------------------

/// Failures reported by an external capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The caller cancelled the operation or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,

    /// The transport failed (connection dropped, RPC error, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Metadata has no storage item by that name.
    #[error("storage item {module}::{item} not present in metadata")]
    MissingStorageItem { module: String, item: String },
}

// ---------------------------------------------------------------------------
// StorageKey / BlockHash
// ---------------------------------------------------------------------------

/// Fully hashed storage key, as produced by [`Metadata::storage_key`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(pub Vec<u8>);

impl StorageKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey(0x{})", hex::encode(&self.0))
    }
}

/// Hash of the block an extrinsic was included in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("block hash must be 32 bytes"))?;
        Ok(Self(array))
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Position and parameter count of a dispatchable call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSignature {
    pub module_index: u8,
    pub call_index: u8,
    pub arity: usize,
}

/// Human-readable names for a `(module, error)` index pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleErrorInfo {
    pub module: String,
    pub error: String,
}

/// Already-resolved runtime metadata.
///
/// Key hashing lives behind [`Metadata::storage_key`]; this crate only
/// supplies the module name, item name and SCALE-encoded key parts.
pub trait Metadata {
    /// `hash(module) ++ hash(item) ++ parts...`, hashed the way the chain does.
    fn storage_key(&self, module: &str, item: &str, parts: &[Vec<u8>])
        -> Result<StorageKey, ChainError>;

    /// Looks up a dispatchable by name.
    fn call(&self, module: &str, function: &str) -> Option<CallSignature>;

    /// Resolves a module error index pair to names.
    fn module_error(&self, module_index: u8, error_index: u8) -> Option<ModuleErrorInfo>;
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Where in block execution an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// During the extrinsic at this index.
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

/// Why a dispatch failed, as reported by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchFailure {
    /// A pallet returned one of its declared errors.
    Module { index: u8, error: u8 },
    BadOrigin,
    CannotLookup,
    Other(String),
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { index, error } => write!(f, "module error {index}:{error}"),
            Self::BadOrigin => f.write_str("bad origin"),
            Self::CannotLookup => f.write_str("cannot lookup"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// The subset of runtime events the outcome checker understands. Anything
/// else is carried through as [`ChainEvent::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    ExtrinsicSuccess,
    ExtrinsicFailed(DispatchFailure),
    /// Emitted once per signed extrinsic; ties the extrinsic index to its signer.
    TransactionFeePaid { who: AccountId, fee: u128 },
    Other { module: String, name: String },
}

/// One entry of a block's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub phase: Phase,
    pub event: ChainEvent,
}

// ---------------------------------------------------------------------------
// Connection / Identity / Pool
// ---------------------------------------------------------------------------

/// A live connection to a chain node.
pub trait ChainConnection {
    /// Metadata of the runtime this connection talks to.
    fn metadata(&self) -> &dyn Metadata;

    /// Raw value under `key`, or `None` if nothing is stored there.
    fn storage(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, ChainError>;

    /// Submits `extrinsic` and blocks until it is included in a block.
    fn submit_and_watch(&self, extrinsic: &SignedExtrinsic) -> Result<BlockHash, ChainError>;

    /// Event log of `block`.
    fn block_events(&self, block: &BlockHash) -> Result<Vec<EventRecord>, ChainError>;
}

/// A signing account.
pub trait Identity {
    fn account_id(&self) -> AccountId;

    /// Signs `payload`. Key handling is entirely the implementor's.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ChainError>;
}

/// Source of chain connections. Retry and reconnect policy live here.
pub trait ConnectionPool {
    type Connection: ChainConnection;

    fn acquire(&self) -> Result<Self::Connection, ChainError>;

    fn release(&self, connection: Self::Connection);
}

/// A connection borrowed from a pool, returned when dropped.
pub struct PooledConnection<'p, P: ConnectionPool> {
    pool: &'p P,
    connection: Option<P::Connection>,
}

impl<'p, P: ConnectionPool> PooledConnection<'p, P> {
    /// Borrows one connection from `pool`.
    pub fn acquire(pool: &'p P) -> Result<Self, ChainError> {
        let connection = pool.acquire()?;
        Ok(Self {
            pool,
            connection: Some(connection),
        })
    }
}

impl<P: ConnectionPool> Deref for PooledConnection<'_, P> {
    type Target = P::Connection;

    fn deref(&self) -> &Self::Target {
        match &self.connection {
            Some(connection) => connection,
            // Only `Drop` takes the connection out.
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<P: ConnectionPool> Drop for PooledConnection<'_, P> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
