//! # Contracts
//!
//! A contract binds a twin to capacity on the grid. Its `state` and
//! `contract_type` are both tagged variants, and `state` nests a second
//! variant (`DeletedState`) inside its `Deleted` alternative:
//!
//! ```text
//! ContractState
//!   0  Created
//!   1  Deleted(DeletedState)
//!        0  CanceledByUser
//!        1  OutOfFunds
//!        2  Reserved
//!   2  GracePeriod(u64 block number)
//!
//! ContractType
//!   0  NodeContract { node, deployment_data, deployment_hash, public_ips_count, public_ips }
//!   1  NameContract { name }
//!   2  RentContract { node }
//! ```
//!
//! Billing reports (`NruConsumption`, `ContractResources`) live here too since
//! they are only ever submitted against a contract ID.

use parity_scale_codec::{Encode, Output};
use serde::{Deserialize, Serialize};

use super::{PublicIp, Resources};
use crate::codec::variant::impl_variant_encode;
use crate::codec::{
    impl_wire_decode, DecodeError, RecordKind, TaggedVariant, VersionedRecord, WireDecode,
    WireReader,
};

// ---------------------------------------------------------------------------
// DeletedState
// ---------------------------------------------------------------------------

/// Why a contract was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeletedState {
    CanceledByUser,
    OutOfFunds,
    /// Discriminant 2 is accepted by the runtime but carries no meaning yet.
    Reserved,
}

impl TaggedVariant for DeletedState {
    const FAMILY: &'static str = "DeletedState";

    fn discriminant(&self) -> u8 {
        match self {
            Self::CanceledByUser => 0,
            Self::OutOfFunds => 1,
            Self::Reserved => 2,
        }
    }
}

impl WireDecode for DeletedState {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::CanceledByUser),
            1 => Ok(Self::OutOfFunds),
            2 => Ok(Self::Reserved),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ContractState
// ---------------------------------------------------------------------------

/// Lifecycle state of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractState {
    Created,
    Deleted(DeletedState),
    /// Out of funds; deleted at the given block unless topped up.
    GracePeriod(u64),
}

impl TaggedVariant for ContractState {
    const FAMILY: &'static str = "ContractState";

    fn discriminant(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Deleted(_) => 1,
            Self::GracePeriod(_) => 2,
        }
    }

    fn encode_payload<O: Output + ?Sized>(&self, dest: &mut O) {
        match self {
            Self::Created => {}
            Self::Deleted(reason) => reason.encode_to(dest),
            Self::GracePeriod(block) => block.encode_to(dest),
        }
    }
}

impl WireDecode for ContractState {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::Created),
            1 => Ok(Self::Deleted(DeletedState::decode_from(reader)?)),
            2 => Ok(Self::GracePeriod(u64::decode_from(reader)?)),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Contract payloads
// ---------------------------------------------------------------------------

/// A deployment on a single node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct NodeContract {
    pub node: u32,
    #[serde(with = "hex_bytes")]
    pub deployment_data: Vec<u8>,
    pub deployment_hash: String,
    pub public_ips_count: u32,
    pub public_ips: Vec<PublicIp>,
}

impl_wire_decode!(NodeContract {
    node,
    deployment_data,
    deployment_hash,
    public_ips_count,
    public_ips,
});

/// A registered gateway name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct NameContract {
    pub name: String,
}

impl_wire_decode!(NameContract { name });

/// Exclusive rental of a whole node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct RentContract {
    pub node: u32,
}

impl_wire_decode!(RentContract { node });

/// What a contract pays for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    NodeContract(NodeContract),
    NameContract(NameContract),
    RentContract(RentContract),
}

impl TaggedVariant for ContractType {
    const FAMILY: &'static str = "ContractType";

    fn discriminant(&self) -> u8 {
        match self {
            Self::NodeContract(_) => 0,
            Self::NameContract(_) => 1,
            Self::RentContract(_) => 2,
        }
    }

    fn encode_payload<O: Output + ?Sized>(&self, dest: &mut O) {
        match self {
            Self::NodeContract(c) => c.encode_to(dest),
            Self::NameContract(c) => c.encode_to(dest),
            Self::RentContract(c) => c.encode_to(dest),
        }
    }
}

impl WireDecode for ContractType {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::NodeContract(NodeContract::decode_from(reader)?)),
            1 => Ok(Self::NameContract(NameContract::decode_from(reader)?)),
            2 => Ok(Self::RentContract(RentContract::decode_from(reader)?)),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

impl_variant_encode!(DeletedState, ContractState, ContractType);

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// `SmartContractModule::Contracts` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub struct Contract {
    pub version: u8,
    pub state: ContractState,
    pub contract_id: u64,
    pub twin_id: u32,
    pub contract_type: ContractType,
}

impl_wire_decode!(Contract {
    version,
    state,
    contract_id,
    twin_id,
    contract_type,
});

impl VersionedRecord for Contract {
    const KIND: RecordKind = RecordKind::Contract;

    fn version(&self) -> u8 {
        self.version
    }
}

impl Contract {
    /// Returns `true` once the contract has been deleted for any reason.
    pub fn is_deleted(&self) -> bool {
        matches!(self.state, ContractState::Deleted(_))
    }

    /// The node this contract is bound to, if any. Name contracts have none.
    pub fn node_id(&self) -> Option<u32> {
        match &self.contract_type {
            ContractType::NodeContract(c) => Some(c.node),
            ContractType::RentContract(c) => Some(c.node),
            ContractType::NameContract(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Billing reports
// ---------------------------------------------------------------------------

/// Public network traffic consumed by a contract over a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct NruConsumption {
    pub contract_id: u64,
    pub timestamp: u64,
    pub window: u64,
    pub nru: u64,
}

impl_wire_decode!(NruConsumption {
    contract_id,
    timestamp,
    window,
    nru,
});

impl NruConsumption {
    /// Returns `true` if no traffic was consumed.
    pub fn is_empty(&self) -> bool {
        self.nru == 0
    }
}

/// Resources a node reports as actually used by one of its contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct ContractResources {
    pub contract_id: u64,
    pub used: Resources,
}

impl_wire_decode!(ContractResources { contract_id, used });

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
