//! Nodes and their configuration variants.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use super::{Location, Resources};
use crate::codec::variant::impl_variant_encode;
use crate::codec::{
    impl_wire_decode, DecodeError, RecordKind, TaggedVariant, VersionedRecord, WireDecode,
    WireReader,
};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a registered machine acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 0
    Node,
    /// 1
    Gateway,
}

impl TaggedVariant for Role {
    const FAMILY: &'static str = "Role";

    fn discriminant(&self) -> u8 {
        match self {
            Self::Node => 0,
            Self::Gateway => 1,
        }
    }
}

impl WireDecode for Role {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::Node),
            1 => Ok(Self::Gateway),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeCertification
// ---------------------------------------------------------------------------

/// Hardware certification level of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeCertification {
    /// 0: self-built hardware.
    #[default]
    Diy,
    /// 1: vendor certified.
    Certified,
}

impl TaggedVariant for NodeCertification {
    const FAMILY: &'static str = "NodeCertification";

    fn discriminant(&self) -> u8 {
        match self {
            Self::Diy => 0,
            Self::Certified => 1,
        }
    }
}

impl WireDecode for NodeCertification {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::Diy),
            1 => Ok(Self::Certified),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

impl_variant_encode!(Role, NodeCertification);

// ---------------------------------------------------------------------------
// PublicConfig / Interface
// ---------------------------------------------------------------------------

/// Public network configuration. Only the farmer can set it, so node
/// create/update calls never carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct PublicConfig {
    pub ipv4: String,
    pub ipv6: String,
    pub gw4: String,
    pub gw6: String,
    pub domain: String,
}

impl_wire_decode!(PublicConfig {
    ipv4,
    ipv6,
    gw4,
    gw6,
    domain,
});

/// A physical network interface reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct Interface {
    pub name: String,
    pub mac: String,
    pub ips: Vec<String>,
}

impl_wire_decode!(Interface { name, mac, ips });

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// `TfgridModule::Nodes` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub struct Node {
    pub version: u8,
    pub id: u32,
    pub farm_id: u32,
    pub twin_id: u32,
    pub resources: Resources,
    pub location: Location,
    pub country: String,
    pub city: String,
    pub public_config: Option<PublicConfig>,
    pub created: u64,
    pub farming_policy: u32,
    pub interfaces: Vec<Interface>,
    pub certification_type: NodeCertification,
}

impl_wire_decode!(Node {
    version,
    id,
    farm_id,
    twin_id,
    resources,
    location,
    country,
    city,
    public_config,
    created,
    farming_policy,
    interfaces,
    certification_type,
});

impl VersionedRecord for Node {
    const KIND: RecordKind = RecordKind::Node;

    fn version(&self) -> u8 {
        self.version
    }
}

impl Node {
    /// Returns `true` if the farmer has configured public networking.
    pub fn has_public_config(&self) -> bool {
        self.public_config.is_some()
    }
}
