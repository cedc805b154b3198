//! # Chain Names & Schema Tables
//!
//! Every pallet name, storage item, call name and schema-version table the
//! client depends on lives here. These strings are resolved against runtime
//! metadata at call time, so a typo here surfaces as a `BuildError` or a
//! missing-storage error rather than silently reading the wrong key.
//!
//! Renames on the chain side are breaking changes for this crate; keep the
//! constants grouped by pallet so they are easy to audit against a runtime
//! upgrade.

// ---------------------------------------------------------------------------
// Pallets
// ---------------------------------------------------------------------------

/// Grid registry pallet: entities, twins, farms, nodes.
pub const TFGRID_MODULE: &str = "TfgridModule";

/// Contract pallet: node, name and rent contracts plus billing reports.
pub const SMART_CONTRACT_MODULE: &str = "SmartContractModule";

// ---------------------------------------------------------------------------
// Storage Items
// ---------------------------------------------------------------------------

/// `TfgridModule::Entities: u32 -> Entity`
pub const ENTITIES: &str = "Entities";

/// `TfgridModule::Nodes: u32 -> Node`
pub const NODES: &str = "Nodes";

/// `TfgridModule::NodeIdByTwinID: u32 -> u32` (derived index)
pub const NODE_ID_BY_TWIN_ID: &str = "NodeIdByTwinID";

/// `TfgridModule::Farms: u32 -> Farm`
pub const FARMS: &str = "Farms";

/// `SmartContractModule::Contracts: u64 -> Contract`
pub const CONTRACTS: &str = "Contracts";

/// `SmartContractModule::ContractIDByNodeIDAndHash: (u32, String) -> u64` (derived index)
pub const CONTRACT_ID_BY_NODE_ID_AND_HASH: &str = "ContractIDByNodeIDAndHash";

/// `SmartContractModule::ContractIDByNameRegistration: String -> u64` (derived index)
pub const CONTRACT_ID_BY_NAME_REGISTRATION: &str = "ContractIDByNameRegistration";

/// `SmartContractModule::ActiveNodeContracts: u32 -> Vec<u64>`
pub const ACTIVE_NODE_CONTRACTS: &str = "ActiveNodeContracts";

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

pub const CREATE_NODE: &str = "create_node";
pub const UPDATE_NODE: &str = "update_node";
pub const REPORT_UPTIME: &str = "report_uptime";

pub const CREATE_NODE_CONTRACT: &str = "create_node_contract";
pub const CREATE_NAME_CONTRACT: &str = "create_name_contract";
pub const CREATE_RENT_CONTRACT: &str = "create_rent_contract";
pub const UPDATE_NODE_CONTRACT: &str = "update_node_contract";
pub const CANCEL_CONTRACT: &str = "cancel_contract";
pub const REPORT_CONTRACT_RESOURCES: &str = "report_contract_resources";
pub const ADD_NRU_REPORTS: &str = "add_nru_reports";

// ---------------------------------------------------------------------------
// Schema Versions
// ---------------------------------------------------------------------------

/// Entity records: only the v1 layout has ever been written.
pub const ENTITY_VERSIONS: &[u8] = &[1];

/// Node records: v0..=v2 share the current layout.
pub const NODE_VERSIONS: &[u8] = &[0, 1, 2];

/// Farm records: v1..=v3 share the current layout.
pub const FARM_VERSIONS: &[u8] = &[1, 2, 3];

// ---------------------------------------------------------------------------
// Sentinels
// ---------------------------------------------------------------------------

/// Identifier value meaning "no such record". Never a valid ID.
pub const SENTINEL_ID: u64 = 0;
