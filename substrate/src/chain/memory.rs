//! In-memory chain implementing every capability in [`super`].
//!
//! Used by the test suite and by anyone wiring the client up without a
//! node. It is a chain in miniature:
//!
//! - a key/value store addressed by the same `module ++ item ++ parts`
//!   scheme as the real chain, with truncated SHA-256 standing in for the
//!   chain's hashers;
//! - a call registry: each registered call gets the next call index in its
//!   module and a handler that reads positional args and mutates storage;
//! - one block per submitted extrinsic, with the extrinsic at index 0 and
//!   a `TransactionFeePaid` + success/failure event pair in its phase.
//!   A failed dispatch rolls storage back, as the runtime does;
//! - scripted faults (`fail_next`, `omit_next_outcome`) and counters so
//!   tests can assert what was (and was not) read.
//!
//! State sits behind `Arc<parking_lot::Mutex<_>>`, so clones share one chain
//! and the chain doubles as its own [`ConnectionPool`].

use parity_scale_codec::Encode;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::{
    BlockHash, CallSignature, ChainConnection, ChainError, ChainEvent, ConnectionPool,
    DispatchFailure, EventRecord, Identity, Metadata, ModuleErrorInfo, Phase, StorageKey,
};
use crate::codec::{WireDecode, WireReader};
use crate::transaction::SignedExtrinsic;
use crate::types::AccountId;

/// Fee charged for every extrinsic.
pub const FLAT_FEE: u128 = 1_000;

/// Bytes of each name digest in a storage key.
const NAME_HASH_LEN: usize = 16;

/// Dispatch handler for a registered call.
pub type Handler = Arc<dyn Fn(&mut Dispatch<'_>) -> Result<(), DispatchFailure> + Send + Sync>;

/// `sha256(module)[..16] ++ sha256(item)[..16] ++ parts...`
pub fn hashed_key(module: &str, item: &str, parts: &[Vec<u8>]) -> StorageKey {
    let mut key = Vec::with_capacity(2 * NAME_HASH_LEN + parts.iter().map(Vec::len).sum::<usize>());
    key.extend_from_slice(&Sha256::digest(module.as_bytes())[..NAME_HASH_LEN]);
    key.extend_from_slice(&Sha256::digest(item.as_bytes())[..NAME_HASH_LEN]);
    for part in parts {
        key.extend_from_slice(part);
    }
    StorageKey(key)
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Key/value state of the chain.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStorage {
    /// Decoded value, or `None` if absent or undecodable.
    pub fn get<T: WireDecode>(&self, module: &str, item: &str, parts: &[Vec<u8>]) -> Option<T> {
        let raw = self.get_raw(module, item, parts)?;
        T::decode_from(&mut WireReader::new(raw)).ok()
    }

    pub fn get_raw(&self, module: &str, item: &str, parts: &[Vec<u8>]) -> Option<&[u8]> {
        self.values
            .get(&hashed_key(module, item, parts).0)
            .map(Vec::as_slice)
    }

    pub fn contains(&self, module: &str, item: &str, parts: &[Vec<u8>]) -> bool {
        self.values.contains_key(&hashed_key(module, item, parts).0)
    }

    pub fn insert<T: Encode + ?Sized>(
        &mut self,
        module: &str,
        item: &str,
        parts: &[Vec<u8>],
        value: &T,
    ) {
        self.insert_raw(module, item, parts, value.encode());
    }

    pub fn insert_raw(&mut self, module: &str, item: &str, parts: &[Vec<u8>], raw: Vec<u8>) {
        self.values.insert(hashed_key(module, item, parts).0, raw);
    }

    pub fn remove(&mut self, module: &str, item: &str, parts: &[Vec<u8>]) {
        self.values.remove(&hashed_key(module, item, parts).0);
    }

    /// Reads a `u32`/`u64` counter, bumps it and returns the new value.
    pub fn next_id<T>(&mut self, module: &str, item: &str) -> T
    where
        T: WireDecode + Encode + Default + Copy + std::ops::Add<Output = T> + From<u8>,
    {
        let next = self.get::<T>(module, item, &[]).unwrap_or_default() + T::from(1);
        self.insert(module, item, &[], &next);
        next
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What a call handler sees: the signer, the positional args and storage.
pub struct Dispatch<'a> {
    pub signer: AccountId,
    pub storage: &'a mut MemoryStorage,
    args: WireReader<'a>,
}

impl Dispatch<'_> {
    /// Decodes the next positional argument.
    pub fn arg<T: WireDecode>(&mut self) -> Result<T, DispatchFailure> {
        T::decode_from(&mut self.args)
            .map_err(|err| DispatchFailure::Other(format!("bad argument: {err}")))
    }
}

// ---------------------------------------------------------------------------
// MemoryChain
// ---------------------------------------------------------------------------

struct CallEntry {
    name: String,
    arity: usize,
    handler: Handler,
}

struct ModuleEntry {
    name: String,
    index: u8,
    calls: Vec<CallEntry>,
    errors: HashMap<u8, String>,
}

#[derive(Default)]
struct State {
    modules: Vec<ModuleEntry>,
    storage: MemoryStorage,
    blocks: HashMap<BlockHash, Vec<EventRecord>>,
    block_number: u64,
    faults: VecDeque<ChainError>,
    omit_outcome: bool,
    storage_reads: usize,
    submissions: usize,
    outstanding: usize,
}

impl State {
    fn module(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn take_fault(&mut self) -> Result<(), ChainError> {
        match self.faults.pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

/// A shared in-memory chain. Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct MemoryChain {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for MemoryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryChain")
            .field("modules", &state.modules.len())
            .field("values", &state.storage.values.len())
            .field("blocks", &state.block_number)
            .finish()
    }
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a pallet at `index`.
    pub fn register_module(&self, name: &str, index: u8) {
        self.state.lock().modules.push(ModuleEntry {
            name: name.to_string(),
            index,
            calls: Vec::new(),
            errors: HashMap::new(),
        });
    }

    /// Declares `module.function` taking `arity` positional args. Call
    /// indices follow registration order within the module.
    pub fn register_call<F>(&self, module: &str, function: &str, arity: usize, handler: F)
    where
        F: Fn(&mut Dispatch<'_>) -> Result<(), DispatchFailure> + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        match state.modules.iter_mut().find(|m| m.name == module) {
            Some(entry) => entry.calls.push(CallEntry {
                name: function.to_string(),
                arity,
                handler: Arc::new(handler),
            }),
            None => tracing::warn!(module, function, "call registered on unknown module"),
        }
    }

    /// Declares error `index` of `module` under `name`.
    pub fn register_error(&self, module: &str, index: u8, name: &str) {
        let mut state = self.state.lock();
        match state.modules.iter_mut().find(|m| m.name == module) {
            Some(entry) => {
                entry.errors.insert(index, name.to_string());
            }
            None => tracing::warn!(module, index, "error registered on unknown module"),
        }
    }

    pub fn insert<T: Encode + ?Sized>(&self, module: &str, item: &str, parts: &[Vec<u8>], value: &T) {
        self.state.lock().storage.insert(module, item, parts, value);
    }

    pub fn insert_raw(&self, module: &str, item: &str, parts: &[Vec<u8>], raw: Vec<u8>) {
        self.state.lock().storage.insert_raw(module, item, parts, raw);
    }

    pub fn remove(&self, module: &str, item: &str, parts: &[Vec<u8>]) {
        self.state.lock().storage.remove(module, item, parts);
    }

    pub fn get<T: WireDecode>(&self, module: &str, item: &str, parts: &[Vec<u8>]) -> Option<T> {
        self.state.lock().storage.get(module, item, parts)
    }

    /// The next chain operation (read, submit or event fetch) fails with `err`.
    pub fn fail_next(&self, err: ChainError) {
        self.state.lock().faults.push_back(err);
    }

    /// The next submitted extrinsic is included without a terminal event.
    pub fn omit_next_outcome(&self) {
        self.state.lock().omit_outcome = true;
    }

    pub fn storage_reads(&self) -> usize {
        self.state.lock().storage_reads
    }

    pub fn submissions(&self) -> usize {
        self.state.lock().submissions
    }

    /// Connections acquired and not yet released.
    pub fn outstanding_connections(&self) -> usize {
        self.state.lock().outstanding
    }
}

impl Metadata for MemoryChain {
    fn storage_key(
        &self,
        module: &str,
        item: &str,
        parts: &[Vec<u8>],
    ) -> Result<StorageKey, ChainError> {
        if self.state.lock().module(module).is_none() {
            return Err(ChainError::MissingStorageItem {
                module: module.to_string(),
                item: item.to_string(),
            });
        }
        Ok(hashed_key(module, item, parts))
    }

    fn call(&self, module: &str, function: &str) -> Option<CallSignature> {
        let state = self.state.lock();
        let entry = state.module(module)?;
        let position = entry.calls.iter().position(|c| c.name == function)?;
        Some(CallSignature {
            module_index: entry.index,
            call_index: u8::try_from(position).ok()?,
            arity: entry.calls[position].arity,
        })
    }

    fn module_error(&self, module_index: u8, error_index: u8) -> Option<ModuleErrorInfo> {
        let state = self.state.lock();
        let entry = state.modules.iter().find(|m| m.index == module_index)?;
        Some(ModuleErrorInfo {
            module: entry.name.clone(),
            error: entry.errors.get(&error_index)?.clone(),
        })
    }
}

impl ChainConnection for MemoryChain {
    fn metadata(&self) -> &dyn Metadata {
        self
    }

    fn storage(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, ChainError> {
        let mut state = self.state.lock();
        state.take_fault()?;
        state.storage_reads += 1;
        Ok(state.storage.values.get(key.as_bytes()).cloned())
    }

    fn submit_and_watch(&self, extrinsic: &SignedExtrinsic) -> Result<BlockHash, ChainError> {
        let mut state = self.state.lock();
        state.take_fault()?;
        state.submissions += 1;

        let (module_index, call_index) = extrinsic.call.index();
        let handler = state
            .modules
            .iter()
            .find(|m| m.index == module_index)
            .and_then(|m| m.calls.get(usize::from(call_index)))
            .map(|c| Arc::clone(&c.handler))
            .ok_or_else(|| {
                ChainError::Transport(format!(
                    "invalid transaction: no call {module_index}:{call_index}"
                ))
            })?;

        let snapshot = state.storage.clone();
        let result = handler(&mut Dispatch {
            signer: extrinsic.signer,
            storage: &mut state.storage,
            args: WireReader::new(extrinsic.call.args()),
        });
        if result.is_err() {
            state.storage = snapshot;
        }

        state.block_number += 1;
        let mut hasher = Sha256::new();
        hasher.update(state.block_number.to_le_bytes());
        hasher.update(extrinsic.encode());
        let block = BlockHash(hasher.finalize().into());

        let phase = Phase::ApplyExtrinsic(0);
        let mut events = vec![EventRecord {
            phase,
            event: ChainEvent::TransactionFeePaid {
                who: extrinsic.signer,
                fee: FLAT_FEE,
            },
        }];
        if std::mem::take(&mut state.omit_outcome) {
            tracing::debug!(block = %block, "terminal event omitted");
        } else {
            events.push(EventRecord {
                phase,
                event: match result {
                    Ok(()) => ChainEvent::ExtrinsicSuccess,
                    Err(failure) => ChainEvent::ExtrinsicFailed(failure),
                },
            });
        }
        state.blocks.insert(block, events);
        Ok(block)
    }

    fn block_events(&self, block: &BlockHash) -> Result<Vec<EventRecord>, ChainError> {
        let mut state = self.state.lock();
        state.take_fault()?;
        state
            .blocks
            .get(block)
            .cloned()
            .ok_or_else(|| ChainError::Transport(format!("unknown block {block}")))
    }
}

impl ConnectionPool for MemoryChain {
    type Connection = MemoryChain;

    fn acquire(&self) -> Result<Self::Connection, ChainError> {
        self.state.lock().outstanding += 1;
        Ok(self.clone())
    }

    fn release(&self, _connection: Self::Connection) {
        let mut state = self.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// MemoryIdentity
// ---------------------------------------------------------------------------

/// Deterministic identity derived from a seed phrase.
///
/// The "signature" is `sha256(seed ++ payload)`; the in-memory chain does
/// not verify it.
#[derive(Clone)]
pub struct MemoryIdentity {
    seed: Vec<u8>,
    account: AccountId,
}

impl MemoryIdentity {
    pub fn from_seed(seed: &str) -> Self {
        let account = AccountId(Sha256::digest(seed.as_bytes()).into());
        Self {
            seed: seed.as_bytes().to_vec(),
            account,
        }
    }
}

impl fmt::Debug for MemoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryIdentity")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl Identity for MemoryIdentity {
    fn account_id(&self) -> AccountId {
        self.account
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ChainError> {
        let mut hasher = Sha256::new();
        hasher.update(&self.seed);
        hasher.update(payload);
        Ok(hasher.finalize().to_vec())
    }
}
