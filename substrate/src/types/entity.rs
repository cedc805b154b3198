//! Registered legal entities.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use super::AccountId;
use crate::codec::{impl_wire_decode, RecordKind, VersionedRecord};

/// `TfgridModule::Entities` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub struct Entity {
    pub version: u8,
    pub id: u32,
    pub name: String,
    pub account: AccountId,
    pub country: String,
    pub city: String,
}

impl_wire_decode!(Entity {
    version,
    id,
    name,
    account,
    country,
    city,
});

impl VersionedRecord for Entity {
    const KIND: RecordKind = RecordKind::Entity;

    fn version(&self) -> u8 {
        self.version
    }
}
