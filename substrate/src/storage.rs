//! # Storage Accessor
//!
//! Reads values out of chain state. A [`StorageQuery`] names a module, an
//! item and the SCALE-encoded key parts; the connection's metadata turns
//! that into a hashed key, the connection returns raw bytes, and the bytes
//! go through the record decoder untouched.
//!
//! Derived indexes (twin ID → node ID, node+hash → contract ID) are plain
//! values rather than versioned records. [`fetch_index`] reads them and
//! treats both "nothing stored" and the sentinel zero as not found, so
//! [`fetch_by_index`] never attempts the second read when the first misses.

use parity_scale_codec::Encode;
use std::fmt;

use crate::chain::{ChainConnection, StorageKey};
use crate::codec::{decode_record, VersionedRecord, WireDecode, WireReader};
use crate::config;
use crate::error::{Result, SubstrateError};

/// One storage lookup: `module::item(parts...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageQuery {
    module: &'static str,
    item: &'static str,
    parts: Vec<Vec<u8>>,
    labels: Vec<String>,
}

impl StorageQuery {
    pub fn new(module: &'static str, item: &'static str) -> Self {
        Self {
            module,
            item,
            parts: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Appends a key part. `name` only shows up in errors and logs.
    pub fn key<T: Encode + fmt::Debug + ?Sized>(mut self, name: &str, value: &T) -> Self {
        self.parts.push(value.encode());
        self.labels.push(format!("{name}={value:?}"));
        self
    }

    /// Hashes the query into a storage key using the connection's metadata.
    pub fn storage_key<C: ChainConnection + ?Sized>(&self, connection: &C) -> Result<StorageKey> {
        connection
            .metadata()
            .storage_key(self.module, self.item, &self.parts)
            .map_err(SubstrateError::chain(format!("build key {self}")))
    }
}

impl fmt::Display for StorageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}({})", self.module, self.item, self.labels.join(", "))
    }
}

/// Raw bytes under `query`. An absent value is returned as an empty buffer,
/// which the record decoder reports as not found.
pub fn fetch_raw<C: ChainConnection + ?Sized>(
    connection: &C,
    query: &StorageQuery,
) -> Result<Vec<u8>> {
    let key = query.storage_key(connection)?;
    let raw = connection
        .storage(&key)
        .map_err(SubstrateError::chain(format!("read {query}")))?;
    tracing::debug!(
        query = %query,
        bytes = raw.as_ref().map_or(0, Vec::len),
        "storage read"
    );
    Ok(raw.unwrap_or_default())
}

/// Fetches and decodes a versioned record.
pub fn fetch_record<R: VersionedRecord, C: ChainConnection + ?Sized>(
    connection: &C,
    query: &StorageQuery,
) -> Result<R> {
    let raw = fetch_raw(connection, query)?;
    decode_record::<R>(&raw).map_err(|err| SubstrateError::record(R::KIND, query.to_string(), err))
}

/// Fetches a plain (unversioned) value. `None` when nothing is stored.
pub fn fetch_value<T: WireDecode, C: ChainConnection + ?Sized>(
    connection: &C,
    query: &StorageQuery,
    what: &'static str,
) -> Result<Option<T>> {
    let raw = fetch_raw(connection, query)?;
    if raw.is_empty() {
        return Ok(None);
    }
    let mut reader = WireReader::new(&raw);
    T::decode_from(&mut reader)
        .map(Some)
        .map_err(|source| SubstrateError::Decode {
            what,
            key: query.to_string(),
            source,
        })
}

/// Reads a derived-index entry. Absent and sentinel-zero both mean not found.
pub fn fetch_index<T, C>(connection: &C, query: &StorageQuery, what: &'static str) -> Result<T>
where
    T: WireDecode + Copy + Into<u64>,
    C: ChainConnection + ?Sized,
{
    match fetch_value::<T, C>(connection, query, what)? {
        Some(id) if id.into() != config::SENTINEL_ID => Ok(id),
        _ => Err(SubstrateError::NotFound {
            what,
            key: query.to_string(),
        }),
    }
}

/// Two-step lookup: resolve `index` to a primary ID, then fetch the record
/// `primary(id)` names. A miss on the first step never reaches the second.
pub fn fetch_by_index<R, T, C, F>(
    connection: &C,
    index: &StorageQuery,
    primary: F,
) -> Result<R>
where
    R: VersionedRecord,
    T: WireDecode + Copy + Into<u64>,
    C: ChainConnection + ?Sized,
    F: FnOnce(T) -> StorageQuery,
{
    let id = fetch_index::<T, C>(connection, index, R::KIND.as_str())?;
    fetch_record(connection, &primary(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::memory::MemoryChain;
    use crate::chain::ChainError;
    use crate::types::{AccountId, Entity};

    const MODULE: &str = "TfgridModule";

    fn entity() -> Entity {
        Entity {
            version: 1,
            id: 3,
            name: "acme".into(),
            account: AccountId([3; 32]),
            country: "Belgium".into(),
            city: "Ghent".into(),
        }
    }

    fn chain() -> MemoryChain {
        let chain = MemoryChain::new();
        chain.register_module(MODULE, 5);
        chain
    }

    #[test]
    fn query_label_names_item_and_parts() {
        let query = StorageQuery::new(MODULE, "ContractIDByNodeIDAndHash")
            .key("node", &4u32)
            .key("hash", "abc");
        assert_eq!(
            query.to_string(),
            "TfgridModule::ContractIDByNodeIDAndHash(node=4, hash=\"abc\")"
        );
    }

    #[test]
    fn record_roundtrip_through_storage() {
        let chain = chain();
        chain.insert(MODULE, "Entities", &[3u32.encode()], &entity());

        let query = StorageQuery::new(MODULE, "Entities").key("id", &3u32);
        let fetched: Entity = fetch_record(&chain, &query).unwrap();
        assert_eq!(fetched, entity());
    }

    #[test]
    fn absent_record_is_not_found() {
        let chain = chain();
        let query = StorageQuery::new(MODULE, "Entities").key("id", &9u32);
        let err = fetch_record::<Entity, _>(&chain, &query).unwrap_err();
        assert_eq!(
            err,
            SubstrateError::NotFound {
                what: "entity",
                key: "TfgridModule::Entities(id=9)".into()
            }
        );
    }

    #[test]
    fn unknown_version_names_the_key() {
        let chain = chain();
        let mut stale = entity();
        stale.version = 4;
        chain.insert(MODULE, "Entities", &[3u32.encode()], &stale);

        let query = StorageQuery::new(MODULE, "Entities").key("id", &3u32);
        let err = fetch_record::<Entity, _>(&chain, &query).unwrap_err();
        assert!(matches!(
            err,
            SubstrateError::UnknownVersion { version: 4, ref key, .. } if key == "TfgridModule::Entities(id=3)"
        ));
    }

    #[test]
    fn sentinel_zero_index_is_not_found() {
        let chain = chain();
        chain.insert(MODULE, "NodeIdByTwinID", &[7u32.encode()], &0u32);

        let query = StorageQuery::new(MODULE, "NodeIdByTwinID").key("twin_id", &7u32);
        let err = fetch_index::<u32, _>(&chain, &query, "node").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn index_miss_short_circuits_second_read() {
        let chain = chain();
        let index = StorageQuery::new(MODULE, "NodeIdByTwinID").key("twin_id", &7u32);

        let before = chain.storage_reads();
        let err = fetch_by_index::<Entity, u32, _, _>(&chain, &index, |id| {
            StorageQuery::new(MODULE, "Entities").key("id", &id)
        })
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(chain.storage_reads() - before, 1);
    }

    #[test]
    fn index_hit_reads_primary() {
        let chain = chain();
        chain.insert(MODULE, "EntityIdByName", &["acme".encode()], &3u32);
        chain.insert(MODULE, "Entities", &[3u32.encode()], &entity());

        let index = StorageQuery::new(MODULE, "EntityIdByName").key("name", "acme");
        let fetched: Entity = fetch_by_index::<Entity, u32, _, _>(&chain, &index, |id| {
            StorageQuery::new(MODULE, "Entities").key("id", &id)
        })
        .unwrap();
        assert_eq!(fetched.id, 3);
    }

    #[test]
    fn cancellation_is_not_masked() {
        let chain = chain();
        chain.fail_next(ChainError::Cancelled);
        let query = StorageQuery::new(MODULE, "Entities").key("id", &3u32);
        let err = fetch_record::<Entity, _>(&chain, &query).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn corrupt_index_value_is_decode_error() {
        let chain = chain();
        chain.insert_raw(MODULE, "NodeIdByTwinID", &[7u32.encode()], vec![1, 2]);
        let query = StorageQuery::new(MODULE, "NodeIdByTwinID").key("twin_id", &7u32);
        let err = fetch_index::<u32, _>(&chain, &query, "node").unwrap_err();
        assert!(matches!(err, SubstrateError::Decode { what: "node", .. }));
    }
}
