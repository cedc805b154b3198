//! End-to-end tests for the grid client.
//!
//! Every test runs the public [`Substrate`] facade against an in-memory
//! chain loaded with a small simulation of the grid runtime: the registry
//! pallet (twins, farms, nodes) and the contract pallet. The simulated
//! pallets keep the same storage items and index semantics the client reads,
//! so these tests exercise the full path: build, sign, submit, verify from
//! events, then read back through the derived indexes.
//!
//! Each test builds its own chain. No shared state.

use parity_scale_codec::Encode;

use grid_substrate::chain::memory::{MemoryChain, MemoryIdentity, MemoryStorage};
use grid_substrate::chain::{ChainError, DispatchFailure, Identity};
use grid_substrate::codec::RecordKind;
use grid_substrate::config::{
    ACTIVE_NODE_CONTRACTS, CONTRACTS, CONTRACT_ID_BY_NAME_REGISTRATION,
    CONTRACT_ID_BY_NODE_ID_AND_HASH, ENTITIES, FARMS, NODES, NODE_ID_BY_TWIN_ID,
    SMART_CONTRACT_MODULE, TFGRID_MODULE,
};
use grid_substrate::types::{
    AccountId, Contract, ContractResources, ContractState, ContractType, DeletedState, Entity,
    Farm, FarmCertification, Interface, Location, NameContract, Node, NodeCertification,
    NodeContract, NruConsumption, PublicConfig, PublicIp, RentContract, Resources,
};
use grid_substrate::{Substrate, SubstrateError};

// ---------------------------------------------------------------------------
// Simulated runtime
// ---------------------------------------------------------------------------

const TFGRID_INDEX: u8 = 5;
const CONTRACT_INDEX: u8 = 7;

const TWIN_BY_ACCOUNT: &str = "TwinIdByAccountID";
const NODE_COUNTER: &str = "NodeID";
const CONTRACT_COUNTER: &str = "ContractID";
const NODE_UPTIME: &str = "NodeUptime";
const USED_RESOURCES: &str = "NodeContractResources";
const NRU_REPORTS: &str = "NruReports";

const FARMER_TWIN: u32 = 1;
const NODE_TWIN: u32 = 2;
const USER_TWIN: u32 = 3;
const FARM_ID: u32 = 1;

fn tfgrid_error(error: u8) -> DispatchFailure {
    DispatchFailure::Module {
        index: TFGRID_INDEX,
        error,
    }
}

fn contract_error(error: u8) -> DispatchFailure {
    DispatchFailure::Module {
        index: CONTRACT_INDEX,
        error,
    }
}

fn twin_of(storage: &MemoryStorage, who: &AccountId) -> Option<u32> {
    storage.get(TFGRID_MODULE, TWIN_BY_ACCOUNT, &[who.encode()])
}

fn register_tfgrid(chain: &MemoryChain) {
    chain.register_module(TFGRID_MODULE, TFGRID_INDEX);
    for (index, name) in [
        "TwinNotExists",
        "FarmNotExists",
        "NodeWithTwinIdExists",
        "NodeNotExists",
        "NodeUpdateNotAuthorized",
    ]
    .into_iter()
    .enumerate()
    {
        chain.register_error(TFGRID_MODULE, index as u8, name);
    }

    chain.register_call(TFGRID_MODULE, "create_node", 6, |d| {
        let farm_id: u32 = d.arg()?;
        let resources: Resources = d.arg()?;
        let location: Location = d.arg()?;
        let country: String = d.arg()?;
        let city: String = d.arg()?;
        let interfaces: Vec<Interface> = d.arg()?;

        let twin_id = twin_of(d.storage, &d.signer).ok_or(tfgrid_error(0))?;
        if !d.storage.contains(TFGRID_MODULE, FARMS, &[farm_id.encode()]) {
            return Err(tfgrid_error(1));
        }
        if d.storage.contains(TFGRID_MODULE, NODE_ID_BY_TWIN_ID, &[twin_id.encode()]) {
            return Err(tfgrid_error(2));
        }

        let id: u32 = d.storage.next_id(TFGRID_MODULE, NODE_COUNTER);
        let node = Node {
            version: 2,
            id,
            farm_id,
            twin_id,
            resources,
            location,
            country,
            city,
            public_config: None,
            created: 1_650_000_000 + u64::from(id),
            farming_policy: 1,
            interfaces,
            certification_type: NodeCertification::Diy,
        };
        d.storage.insert(TFGRID_MODULE, NODES, &[id.encode()], &node);
        d.storage.insert(TFGRID_MODULE, NODE_ID_BY_TWIN_ID, &[twin_id.encode()], &id);
        Ok(())
    });

    chain.register_call(TFGRID_MODULE, "update_node", 7, |d| {
        let id: u32 = d.arg()?;
        let farm_id: u32 = d.arg()?;
        let resources: Resources = d.arg()?;
        let location: Location = d.arg()?;
        let country: String = d.arg()?;
        let city: String = d.arg()?;
        let interfaces: Vec<Interface> = d.arg()?;

        let twin_id = twin_of(d.storage, &d.signer).ok_or(tfgrid_error(0))?;
        let mut node: Node = d
            .storage
            .get(TFGRID_MODULE, NODES, &[id.encode()])
            .ok_or(tfgrid_error(3))?;
        if node.twin_id != twin_id {
            return Err(tfgrid_error(4));
        }
        node.farm_id = farm_id;
        node.resources = resources;
        node.location = location;
        node.country = country;
        node.city = city;
        node.interfaces = interfaces;
        d.storage.insert(TFGRID_MODULE, NODES, &[id.encode()], &node);
        Ok(())
    });

    chain.register_call(TFGRID_MODULE, "report_uptime", 1, |d| {
        let uptime: u64 = d.arg()?;
        let node_id: u32 = twin_of(d.storage, &d.signer)
            .and_then(|twin| d.storage.get(TFGRID_MODULE, NODE_ID_BY_TWIN_ID, &[twin.encode()]))
            .ok_or(DispatchFailure::BadOrigin)?;
        d.storage.insert(TFGRID_MODULE, NODE_UPTIME, &[node_id.encode()], &uptime);
        Ok(())
    });
}

fn register_contracts(chain: &MemoryChain) {
    chain.register_module(SMART_CONTRACT_MODULE, CONTRACT_INDEX);
    for (index, name) in [
        "TwinNotExists",
        "NodeNotExists",
        "ContractIsNotUnique",
        "NameExists",
        "ContractNotExists",
        "TwinNotAuthorized",
        "NodeNotAuthorizedToReportResources",
    ]
    .into_iter()
    .enumerate()
    {
        chain.register_error(SMART_CONTRACT_MODULE, index as u8, name);
    }

    fn store(
        storage: &mut MemoryStorage,
        contract: &Contract,
    ) {
        storage.insert(
            SMART_CONTRACT_MODULE,
            CONTRACTS,
            &[contract.contract_id.encode()],
            contract,
        );
    }

    fn load(
        storage: &MemoryStorage,
        id: u64,
    ) -> Result<Contract, DispatchFailure> {
        storage
            .get(SMART_CONTRACT_MODULE, CONTRACTS, &[id.encode()])
            .ok_or(contract_error(4))
    }

    chain.register_call(SMART_CONTRACT_MODULE, "create_node_contract", 4, |d| {
        let node: u32 = d.arg()?;
        let deployment_data: Vec<u8> = d.arg()?;
        let deployment_hash: String = d.arg()?;
        let public_ips_count: u32 = d.arg()?;

        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        if !d.storage.contains(TFGRID_MODULE, NODES, &[node.encode()]) {
            return Err(contract_error(1));
        }
        let index = [node.encode(), deployment_hash.encode()];
        if d.storage.contains(SMART_CONTRACT_MODULE, CONTRACT_ID_BY_NODE_ID_AND_HASH, &index) {
            return Err(contract_error(2));
        }

        let id: u64 = d.storage.next_id(SMART_CONTRACT_MODULE, CONTRACT_COUNTER);
        store(
            d.storage,
            &Contract {
                version: 3,
                state: ContractState::Created,
                contract_id: id,
                twin_id,
                contract_type: ContractType::NodeContract(NodeContract {
                    node,
                    deployment_data,
                    deployment_hash,
                    public_ips_count,
                    public_ips: Vec::new(),
                }),
            },
        );
        d.storage.insert(SMART_CONTRACT_MODULE, CONTRACT_ID_BY_NODE_ID_AND_HASH, &index, &id);

        let active = [node.encode()];
        let mut contracts: Vec<u64> = d
            .storage
            .get(SMART_CONTRACT_MODULE, ACTIVE_NODE_CONTRACTS, &active)
            .unwrap_or_default();
        contracts.push(id);
        d.storage.insert(SMART_CONTRACT_MODULE, ACTIVE_NODE_CONTRACTS, &active, &contracts);
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "create_name_contract", 1, |d| {
        let name: String = d.arg()?;
        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        let index = [name.encode()];
        if d.storage.contains(SMART_CONTRACT_MODULE, CONTRACT_ID_BY_NAME_REGISTRATION, &index) {
            return Err(contract_error(3));
        }

        let id: u64 = d.storage.next_id(SMART_CONTRACT_MODULE, CONTRACT_COUNTER);
        store(
            d.storage,
            &Contract {
                version: 3,
                state: ContractState::Created,
                contract_id: id,
                twin_id,
                contract_type: ContractType::NameContract(NameContract { name }),
            },
        );
        d.storage.insert(SMART_CONTRACT_MODULE, CONTRACT_ID_BY_NAME_REGISTRATION, &index, &id);
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "create_rent_contract", 1, |d| {
        let node: u32 = d.arg()?;
        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        if !d.storage.contains(TFGRID_MODULE, NODES, &[node.encode()]) {
            return Err(contract_error(1));
        }
        let id: u64 = d.storage.next_id(SMART_CONTRACT_MODULE, CONTRACT_COUNTER);
        store(
            d.storage,
            &Contract {
                version: 3,
                state: ContractState::Created,
                contract_id: id,
                twin_id,
                contract_type: ContractType::RentContract(RentContract { node }),
            },
        );
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "update_node_contract", 3, |d| {
        let id: u64 = d.arg()?;
        let deployment_data: Vec<u8> = d.arg()?;
        let deployment_hash: String = d.arg()?;

        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        let mut contract = load(d.storage, id)?;
        if contract.twin_id != twin_id {
            return Err(contract_error(5));
        }
        let ContractType::NodeContract(ref mut body) = contract.contract_type else {
            return Err(DispatchFailure::Other("not a node contract".into()));
        };

        d.storage.remove(
            SMART_CONTRACT_MODULE,
            CONTRACT_ID_BY_NODE_ID_AND_HASH,
            &[body.node.encode(), body.deployment_hash.encode()],
        );
        d.storage.insert(
            SMART_CONTRACT_MODULE,
            CONTRACT_ID_BY_NODE_ID_AND_HASH,
            &[body.node.encode(), deployment_hash.encode()],
            &id,
        );
        body.deployment_data = deployment_data;
        body.deployment_hash = deployment_hash;
        store(d.storage, &contract);
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "cancel_contract", 1, |d| {
        let id: u64 = d.arg()?;
        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        let mut contract = load(d.storage, id)?;
        if contract.twin_id != twin_id {
            return Err(contract_error(5));
        }

        match &contract.contract_type {
            ContractType::NodeContract(body) => {
                d.storage.remove(
                    SMART_CONTRACT_MODULE,
                    CONTRACT_ID_BY_NODE_ID_AND_HASH,
                    &[body.node.encode(), body.deployment_hash.encode()],
                );
                let active = [body.node.encode()];
                let mut contracts: Vec<u64> = d
                    .storage
                    .get(SMART_CONTRACT_MODULE, ACTIVE_NODE_CONTRACTS, &active)
                    .unwrap_or_default();
                contracts.retain(|c| *c != id);
                d.storage.insert(SMART_CONTRACT_MODULE, ACTIVE_NODE_CONTRACTS, &active, &contracts);
            }
            ContractType::NameContract(body) => d.storage.remove(
                SMART_CONTRACT_MODULE,
                CONTRACT_ID_BY_NAME_REGISTRATION,
                &[body.name.encode()],
            ),
            ContractType::RentContract(_) => {}
        }

        contract.state = ContractState::Deleted(DeletedState::CanceledByUser);
        store(d.storage, &contract);
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "report_contract_resources", 1, |d| {
        let reports: Vec<ContractResources> = d.arg()?;
        let twin_id = twin_of(d.storage, &d.signer).ok_or(contract_error(0))?;
        for report in &reports {
            let contract = load(d.storage, report.contract_id)?;
            let host: Option<Node> = contract
                .node_id()
                .and_then(|node| d.storage.get(TFGRID_MODULE, NODES, &[node.encode()]));
            if host.map(|n| n.twin_id) != Some(twin_id) {
                return Err(contract_error(6));
            }
            d.storage.insert(
                SMART_CONTRACT_MODULE,
                USED_RESOURCES,
                &[report.contract_id.encode()],
                &report.used,
            );
        }
        Ok(())
    });

    chain.register_call(SMART_CONTRACT_MODULE, "add_nru_reports", 1, |d| {
        let reports: Vec<NruConsumption> = d.arg()?;
        for report in &reports {
            load(d.storage, report.contract_id)?;
            d.storage.insert(
                SMART_CONTRACT_MODULE,
                NRU_REPORTS,
                &[report.contract_id.encode()],
                report,
            );
        }
        Ok(())
    });
}

fn farm(version: u8) -> Farm {
    Farm {
        version,
        id: FARM_ID,
        name: "freefarm".into(),
        twin_id: FARMER_TWIN,
        pricing_policy_id: 1,
        certification_type: FarmCertification::NotCertified,
        public_ips: vec![PublicIp {
            ip: "185.206.122.33/24".into(),
            gateway: "185.206.122.1".into(),
            contract_id: 0,
        }],
        dedicated_farm: false,
        farming_policy_limits: None,
    }
}

struct Grid {
    client: Substrate<MemoryChain>,
    chain: MemoryChain,
    farmer: MemoryIdentity,
    node: MemoryIdentity,
    user: MemoryIdentity,
}

/// A chain with three twins (farmer, node, user) and one farm.
fn grid() -> Grid {
    let chain = MemoryChain::new();
    register_tfgrid(&chain);
    register_contracts(&chain);

    let farmer = MemoryIdentity::from_seed("//Farmer");
    let node = MemoryIdentity::from_seed("//Node");
    let user = MemoryIdentity::from_seed("//Alice");
    for (identity, twin) in [(&farmer, FARMER_TWIN), (&node, NODE_TWIN), (&user, USER_TWIN)] {
        chain.insert(
            TFGRID_MODULE,
            TWIN_BY_ACCOUNT,
            &[identity.account_id().encode()],
            &twin,
        );
    }
    chain.insert(TFGRID_MODULE, FARMS, &[FARM_ID.encode()], &farm(3));

    Grid {
        client: Substrate::new(chain.clone()),
        chain,
        farmer,
        node,
        user,
    }
}

fn node_args(twin_id: u32) -> Node {
    Node {
        version: 0,
        id: 0,
        farm_id: FARM_ID,
        twin_id,
        resources: Resources {
            hru: 4 << 40,
            sru: 1 << 40,
            cru: 32,
            mru: 128 << 30,
        },
        location: Location {
            longitude: "4.3517".into(),
            latitude: "50.8503".into(),
        },
        country: "Belgium".into(),
        city: "Brussels".into(),
        // Never sent; the chain must not pick it up.
        public_config: Some(PublicConfig {
            ipv4: "185.206.122.50/24".into(),
            ..PublicConfig::default()
        }),
        created: 0,
        farming_policy: 0,
        interfaces: vec![Interface {
            name: "zos".into(),
            mac: "52:54:00:12:34:56".into(),
            ips: vec!["10.0.0.2".into()],
        }],
        certification_type: NodeCertification::Diy,
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[test]
fn get_entity_reads_record() {
    let g = grid();
    let entity = Entity {
        version: 1,
        id: 8,
        name: "acme".into(),
        account: g.farmer.account_id(),
        country: "Belgium".into(),
        city: "Ghent".into(),
    };
    g.chain.insert(TFGRID_MODULE, ENTITIES, &[8u32.encode()], &entity);

    assert_eq!(g.client.get_entity(8).unwrap(), entity);
    assert!(g.client.get_entity(9).unwrap_err().is_not_found());
}

#[test]
fn farm_versions_two_and_three_read_identically() {
    let g = grid();
    g.chain.insert(TFGRID_MODULE, FARMS, &[2u32.encode()], &Farm { id: 2, ..farm(2) });
    g.chain.insert(TFGRID_MODULE, FARMS, &[3u32.encode()], &Farm { id: 3, ..farm(3) });

    let v2 = g.client.get_farm(2).unwrap();
    let v3 = g.client.get_farm(3).unwrap();
    assert_eq!(v2.version, 2);
    assert_eq!(v3.version, 3);
    assert_eq!(Farm { id: 3, version: 3, ..v2 }, v3);
}

#[test]
fn unsupported_farm_version_is_not_decoded() {
    let g = grid();
    g.chain.insert(TFGRID_MODULE, FARMS, &[4u32.encode()], &Farm { id: 4, ..farm(4) });

    let err = g.client.get_farm(4).unwrap_err();
    assert!(matches!(
        err,
        SubstrateError::UnknownVersion {
            kind: RecordKind::Farm,
            version: 4,
            ..
        }
    ));
}

#[test]
fn corrupt_node_record_is_decode_error() {
    let g = grid();
    // Version 1, then a truncated body.
    g.chain.insert_raw(TFGRID_MODULE, NODES, &[6u32.encode()], vec![1, 6, 0]);

    let err = g.client.get_node(6).unwrap_err();
    assert!(matches!(err, SubstrateError::Decode { what: "node", .. }), "{err}");
}

#[test]
fn sentinel_zero_twin_index_is_not_found() {
    let g = grid();
    g.chain.insert(TFGRID_MODULE, NODE_ID_BY_TWIN_ID, &[9u32.encode()], &0u32);

    let err = g.client.get_node_by_twin_id(9).unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[test]
fn cancellation_is_distinct_from_not_found() {
    let g = grid();
    g.chain.fail_next(ChainError::Cancelled);

    let err = g.client.get_node(1).unwrap_err();
    assert!(err.is_cancelled());
    assert!(!err.is_not_found());
    assert_eq!(g.chain.outstanding_connections(), 0);

    // The fault is consumed; the same read now reports the real state.
    assert!(g.client.get_node(1).unwrap_err().is_not_found());
}

#[test]
fn transport_failure_is_connection_error() {
    let g = grid();
    g.chain.fail_next(ChainError::Transport("connection reset".into()));

    let err = g.client.get_contract(1).unwrap_err();
    assert!(matches!(err, SubstrateError::Connection { .. }), "{err}");
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[test]
fn create_node_then_read_back_by_twin() {
    let g = grid();
    let args = node_args(NODE_TWIN);

    let created = g.client.create_node(&g.node, &args).unwrap();
    assert_eq!(created.twin_id, NODE_TWIN);
    assert_eq!(created.farm_id, args.farm_id);
    assert_eq!(created.resources, args.resources);
    assert_eq!(created.location, args.location);
    assert_eq!(created.interfaces, args.interfaces);
    assert_eq!(created.public_config, None);
    assert_ne!(created.id, 0);

    assert_eq!(g.client.get_node_by_twin_id(NODE_TWIN).unwrap(), created.id);
    assert_eq!(g.client.get_node(created.id).unwrap(), created);
    assert_eq!(g.chain.outstanding_connections(), 0);
}

#[test]
fn create_node_without_twin_is_rejected_locally() {
    let g = grid();
    let err = g.client.create_node(&g.node, &node_args(0)).unwrap_err();

    assert!(matches!(err, SubstrateError::InvalidArgument(_)));
    assert_eq!(g.chain.submissions(), 0);
}

#[test]
fn dispatch_failure_carries_indices_and_skips_read_back() {
    let g = grid();
    g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();

    let reads_before = g.chain.storage_reads();
    let err = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap_err();

    assert_eq!(err.dispatch_index(), Some((5, 2)));
    assert_eq!(
        err,
        SubstrateError::Dispatch {
            call: "TfgridModule.create_node".into(),
            module_index: 5,
            error_index: 2,
            module: "TfgridModule".into(),
            error: "NodeWithTwinIdExists".into(),
        }
    );
    assert_eq!(g.chain.storage_reads(), reads_before);
    assert_eq!(g.chain.outstanding_connections(), 0);
}

#[test]
fn update_node_replaces_fields_and_keeps_id() {
    let g = grid();
    let created = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();

    let mut changed = node_args(NODE_TWIN);
    changed.id = created.id;
    changed.city = "Antwerp".into();
    changed.resources.cru = 64;

    let updated = g.client.update_node(&g.node, &changed).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.city, "Antwerp");
    assert_eq!(updated.resources.cru, 64);
    assert_eq!(updated.created, created.created);
}

#[test]
fn update_node_by_another_twin_is_dispatch_error() {
    let g = grid();
    let created = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();

    let mut hijack = node_args(USER_TWIN);
    hijack.id = created.id;
    let err = g.client.update_node(&g.user, &hijack).unwrap_err();
    assert_eq!(err.dispatch_index(), Some((5, 4)));
}

#[test]
fn uptime_report_from_unregistered_node_is_rejected() {
    let g = grid();
    g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    g.client.update_node_uptime(&g.node, 3_600).unwrap();

    let err = g.client.update_node_uptime(&g.user, 3_600).unwrap_err();
    assert_eq!(
        err,
        SubstrateError::DispatchRejected {
            call: "TfgridModule.report_uptime".into(),
            reason: "bad origin".into(),
        }
    );
}

#[test]
fn missing_outcome_fails_closed() {
    let g = grid();
    g.chain.omit_next_outcome();

    let err = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap_err();
    assert!(err.is_indeterminate(), "{err}");
    assert_eq!(g.chain.outstanding_connections(), 0);
}

#[test]
fn cancelled_submission_is_reported_as_cancelled() {
    let g = grid();
    g.chain.fail_next(ChainError::Cancelled);

    let err = g.client.update_node_uptime(&g.node, 60).unwrap_err();
    assert_eq!(
        err,
        SubstrateError::Cancelled {
            operation: "submit TfgridModule.report_uptime".into()
        }
    );
    assert_eq!(g.chain.submissions(), 0);
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[test]
fn node_contract_lifecycle() {
    let g = grid();
    let node = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    assert!(g.client.get_node_contracts(node.id).unwrap().is_empty());

    let id = g
        .client
        .create_node_contract(&g.user, node.id, b"{\"vm\":1}", "hash-1", 0)
        .unwrap();
    assert_eq!(g.client.get_contract_with_hash(node.id, "hash-1").unwrap(), id);
    assert_eq!(g.client.get_node_contracts(node.id).unwrap(), vec![id]);

    let contract = g.client.get_contract(id).unwrap();
    assert_eq!(contract.twin_id, USER_TWIN);
    assert_eq!(contract.node_id(), Some(node.id));
    assert_eq!(contract.state, ContractState::Created);

    let same = g
        .client
        .update_node_contract(&g.user, id, b"{\"vm\":2}", "hash-2")
        .unwrap();
    assert_eq!(same, id);
    assert_eq!(g.client.get_contract_with_hash(node.id, "hash-2").unwrap(), id);
    assert!(g
        .client
        .get_contract_with_hash(node.id, "hash-1")
        .unwrap_err()
        .is_not_found());

    g.client.cancel_contract(&g.user, id).unwrap();
    let cancelled = g.client.get_contract(id).unwrap();
    assert!(cancelled.is_deleted());
    assert_eq!(
        cancelled.state,
        ContractState::Deleted(DeletedState::CanceledByUser)
    );
    assert!(g.client.get_node_contracts(node.id).unwrap().is_empty());
}

#[test]
fn duplicate_deployment_hash_is_dispatch_error() {
    let g = grid();
    let node = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    g.client
        .create_node_contract(&g.user, node.id, b"a", "same", 0)
        .unwrap();

    let err = g
        .client
        .create_node_contract(&g.user, node.id, b"b", "same", 0)
        .unwrap_err();
    assert_eq!(err.dispatch_index(), Some((7, 2)));
}

#[test]
fn name_contract_create_and_lookup() {
    let g = grid();
    let id = g.client.create_name_contract(&g.user, "docs").unwrap();
    assert_eq!(
        g.client.get_contract_id_by_name_registration("docs").unwrap(),
        id
    );
    assert_eq!(
        g.client.get_contract(id).unwrap().contract_type,
        ContractType::NameContract(NameContract {
            name: "docs".into()
        })
    );

    let err = g.client.create_name_contract(&g.farmer, "docs").unwrap_err();
    assert!(matches!(
        err,
        SubstrateError::Dispatch { ref error, .. } if error == "NameExists"
    ));
}

#[test]
fn rent_contract_returns_block_only() {
    let g = grid();
    let node = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    let submissions = g.chain.submissions();

    let block = g.client.create_rent_contract(&g.user, node.id).unwrap();
    assert_ne!(block.to_hex(), "00".repeat(32));
    assert_eq!(g.chain.submissions(), submissions + 1);

    // First contract on this chain.
    let contract = g.client.get_contract(1).unwrap();
    assert_eq!(
        contract.contract_type,
        ContractType::RentContract(RentContract { node: node.id })
    );
}

#[test]
fn consumption_reports_must_come_from_hosting_node() {
    let g = grid();
    let node = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    let id = g
        .client
        .create_node_contract(&g.user, node.id, b"{}", "h", 1)
        .unwrap();
    let report = [ContractResources {
        contract_id: id,
        used: Resources {
            hru: 0,
            sru: 10 << 30,
            cru: 2,
            mru: 4 << 30,
        },
    }];

    g.client.set_contract_consumption(&g.node, &report).unwrap();

    let err = g.client.set_contract_consumption(&g.user, &report).unwrap_err();
    assert_eq!(err.dispatch_index(), Some((7, 6)));
}

#[test]
fn nru_report_is_verified() {
    let g = grid();
    let id = g.client.create_name_contract(&g.user, "gw").unwrap();
    let reports = [NruConsumption {
        contract_id: id,
        timestamp: 1_700_000_000,
        window: 3_600,
        nru: 512,
    }];
    g.client.report(&g.node, &reports).unwrap();

    let unknown = [NruConsumption {
        contract_id: 999,
        ..reports[0]
    }];
    let err = g.client.report(&g.node, &unknown).unwrap_err();
    assert_eq!(err.dispatch_index(), Some((7, 4)));
}

#[test]
fn contract_with_unknown_state_is_decode_error() {
    let g = grid();
    let mut raw = Contract {
        version: 1,
        state: ContractState::GracePeriod(10),
        contract_id: 40,
        twin_id: USER_TWIN,
        contract_type: ContractType::RentContract(RentContract { node: 1 }),
    }
    .encode();
    raw[1] = 9;
    g.chain.insert_raw(SMART_CONTRACT_MODULE, CONTRACTS, &[40u64.encode()], raw);

    let err = g.client.get_contract(40).unwrap_err();
    let SubstrateError::Decode { source, .. } = err else {
        panic!("expected decode error, got {err}");
    };
    assert_eq!(source.field_path(), vec!["state"]);
}

#[test]
fn every_operation_releases_its_connection() {
    let g = grid();
    let node = g.client.create_node(&g.node, &node_args(NODE_TWIN)).unwrap();
    let _ = g.client.create_node(&g.node, &node_args(NODE_TWIN));
    let _ = g.client.get_farm(99);
    let id = g.client.create_name_contract(&g.user, "x").unwrap();
    let _ = g.client.cancel_contract(&g.farmer, id);
    let _ = g.client.get_node_contracts(node.id);
    assert_eq!(g.chain.outstanding_connections(), 0);
}
