//! Farms, their certification level and farming-policy limits.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use super::PublicIp;
use crate::codec::variant::impl_variant_encode;
use crate::codec::{
    impl_wire_decode, DecodeError, RecordKind, TaggedVariant, VersionedRecord, WireDecode,
    WireReader,
};

/// Certification level of a farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FarmCertification {
    /// 0
    #[default]
    NotCertified,
    /// 1
    Gold,
}

impl TaggedVariant for FarmCertification {
    const FAMILY: &'static str = "FarmCertification";

    fn discriminant(&self) -> u8 {
        match self {
            Self::NotCertified => 0,
            Self::Gold => 1,
        }
    }
}

impl WireDecode for FarmCertification {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(Self::FAMILY)? {
            0 => Ok(Self::NotCertified),
            1 => Ok(Self::Gold),
            other => Err(DecodeError::unknown::<Self>(other)),
        }
    }
}

impl_variant_encode!(FarmCertification);

/// Caps attached to a farm by the farming policy it was granted.
///
/// Every bound is optional; `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode)]
pub struct FarmingPolicyLimit {
    pub farming_policy_id: u32,
    pub cu: Option<u64>,
    pub su: Option<u64>,
    pub end: Option<u64>,
    pub node_count: Option<u32>,
    pub node_certification: bool,
}

impl_wire_decode!(FarmingPolicyLimit {
    farming_policy_id,
    cu,
    su,
    end,
    node_count,
    node_certification,
});

/// `TfgridModule::Farms` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub struct Farm {
    pub version: u8,
    pub id: u32,
    pub name: String,
    pub twin_id: u32,
    pub pricing_policy_id: u32,
    pub certification_type: FarmCertification,
    pub public_ips: Vec<PublicIp>,
    pub dedicated_farm: bool,
    pub farming_policy_limits: Option<FarmingPolicyLimit>,
}

impl_wire_decode!(Farm {
    version,
    id,
    name,
    twin_id,
    pricing_policy_id,
    certification_type,
    public_ips,
    dedicated_farm,
    farming_policy_limits,
});

impl VersionedRecord for Farm {
    const KIND: RecordKind = RecordKind::Farm;

    fn version(&self) -> u8 {
        self.version
    }
}

impl Farm {
    /// Public IPs not currently reserved by a contract.
    pub fn free_ips(&self) -> impl Iterator<Item = &PublicIp> {
        self.public_ips.iter().filter(|ip| ip.is_free())
    }
}
