//! # Chain Types
//!
//! Field definitions for every record and call argument the client touches.
//! Layouts mirror the runtime's storage structs field-for-field; reordering a
//! field here is a wire-format change.
//!
//! ```text
//! mod.rs      — shared value types (AccountId, Resources, Location, PublicIp)
//! entity.rs   — Entity
//! node.rs     — Node, Role, NodeCertification, PublicConfig, Interface
//! farm.rs     — Farm, FarmCertification, FarmingPolicyLimit
//! contract.rs — Contract and its state/type variants, billing reports
//! ```
//!
//! Records refer to each other by numeric ID only (a node's `farm_id`, a
//! contract's `twin_id`). Resolving those is a separate storage read.

pub mod contract;
pub mod entity;
pub mod farm;
pub mod node;

use parity_scale_codec::Encode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::codec::{impl_wire_decode, DecodeError, WireDecode, WireReader};

pub use contract::{
    ContractResources, Contract, ContractState, ContractType, DeletedState, NameContract,
    NodeContract, NruConsumption, RentContract,
};
pub use entity::Entity;
pub use farm::{Farm, FarmCertification, FarmingPolicyLimit};
pub use node::{Interface, Node, NodeCertification, PublicConfig, Role};

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A 32-byte on-chain account identifier (an sr25519/ed25519 public key).
///
/// Serializes as a lower-case hex string in JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Encode)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Hex rendering without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_hex())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl WireDecode for AccountId {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self(reader.leaf("AccountId")?))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("account id must be 32 bytes"))?;
        Ok(Self(array))
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Capacity footprint: hard disk, solid state, compute units and memory.
///
/// Storage and memory are in bytes, `cru` is a core count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct Resources {
    pub hru: u64,
    pub sru: u64,
    pub cru: u64,
    pub mru: u64,
}

impl_wire_decode!(Resources { hru, sru, cru, mru });

impl Resources {
    /// Returns `true` if every quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.hru == 0 && self.sru == 0 && self.cru == 0 && self.mru == 0
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Geographic coordinates as the chain stores them: decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct Location {
    pub longitude: String,
    pub latitude: String,
}

impl_wire_decode!(Location { longitude, latitude });

// ---------------------------------------------------------------------------
// PublicIp
// ---------------------------------------------------------------------------

/// A public IP owned by a farm, optionally reserved by a contract.
///
/// `contract_id == 0` means the address is free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct PublicIp {
    pub ip: String,
    pub gateway: String,
    pub contract_id: u64,
}

impl_wire_decode!(PublicIp { ip, gateway, contract_id });

impl PublicIp {
    /// Returns `true` if no contract holds this address.
    pub fn is_free(&self) -> bool {
        self.contract_id == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    #[test]
    fn resources_layout_is_four_le_u64() {
        let r = Resources {
            hru: 1,
            sru: 2,
            cru: 3,
            mru: 4,
        };
        let bytes = r.encode();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(decode::<Resources>(&bytes).unwrap(), (r, 32));
    }

    #[test]
    fn account_id_is_raw_32_bytes_on_the_wire() {
        let id = AccountId([0xAB; 32]);
        let bytes = id.encode();
        assert_eq!(bytes, vec![0xAB; 32]);
        assert_eq!(decode::<AccountId>(&bytes).unwrap().0, id);
    }

    #[test]
    fn account_id_json_is_hex() {
        let id = AccountId([1; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn account_id_json_rejects_wrong_length() {
        assert!(serde_json::from_str::<AccountId>("\"abcd\"").is_err());
    }

    #[test]
    fn public_ip_free_when_unassigned() {
        let ip = PublicIp {
            ip: "185.206.122.33/24".into(),
            gateway: "185.206.122.1".into(),
            contract_id: 0,
        };
        assert!(ip.is_free());
    }
}
