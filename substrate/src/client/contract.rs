use super::Substrate;
use crate::chain::{BlockHash, ConnectionPool, Identity};
use crate::config;
use crate::error::Result;
use crate::storage::{self, StorageQuery};
use crate::transaction::CallBuilder;
use crate::types::{Contract, ContractResources, NruConsumption};

fn contract_by_hash(node: u32, hash: &str) -> StorageQuery {
    StorageQuery::new(
        config::SMART_CONTRACT_MODULE,
        config::CONTRACT_ID_BY_NODE_ID_AND_HASH,
    )
    .key("node", &node)
    .key("hash", hash)
}

fn contract_by_name(name: &str) -> StorageQuery {
    StorageQuery::new(
        config::SMART_CONTRACT_MODULE,
        config::CONTRACT_ID_BY_NAME_REGISTRATION,
    )
    .key("name", name)
}

impl<P: ConnectionPool> Substrate<P> {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Contract with `id`. Contract records are not version-gated.
    pub fn get_contract(&self, id: u64) -> Result<Contract> {
        self.read("get_contract", |conn| {
            let query =
                StorageQuery::new(config::SMART_CONTRACT_MODULE, config::CONTRACTS).key("id", &id);
            storage::fetch_record(conn, &query)
        })
    }

    /// ID of the contract deploying `hash` on `node`.
    pub fn get_contract_with_hash(&self, node: u32, hash: &str) -> Result<u64> {
        self.read("get_contract_with_hash", |conn| {
            storage::fetch_index(conn, &contract_by_hash(node, hash), "contract")
        })
    }

    /// ID of the name contract registering `name`.
    pub fn get_contract_id_by_name_registration(&self, name: &str) -> Result<u64> {
        self.read("get_contract_id_by_name_registration", |conn| {
            storage::fetch_index(conn, &contract_by_name(name), "contract")
        })
    }

    /// Active contracts on `node`. A node with none yields an empty list.
    pub fn get_node_contracts(&self, node: u32) -> Result<Vec<u64>> {
        self.read("get_node_contracts", |conn| {
            let query =
                StorageQuery::new(config::SMART_CONTRACT_MODULE, config::ACTIVE_NODE_CONTRACTS)
                    .key("node", &node);
            Ok(storage::fetch_value::<Vec<u64>, _>(conn, &query, "node contracts")?
                .unwrap_or_default())
        })
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Creates a deployment contract and returns its ID, recovered through
    /// the `(node, hash)` index.
    pub fn create_node_contract(
        &self,
        identity: &dyn Identity,
        node: u32,
        body: &[u8],
        hash: &str,
        public_ips: u32,
    ) -> Result<u64> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::CREATE_NODE_CONTRACT)
            .arg(&node)
            .arg(body)
            .arg(hash)
            .arg(&public_ips);
        self.execute(identity, call)?;
        self.get_contract_with_hash(node, hash)
    }

    /// Registers `name` and returns the new contract's ID.
    pub fn create_name_contract(&self, identity: &dyn Identity, name: &str) -> Result<u64> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::CREATE_NAME_CONTRACT)
            .arg(name);
        self.execute(identity, call)?;
        self.get_contract_id_by_name_registration(name)
    }

    /// Rents `node` outright.
    ///
    /// Returns the including block only: the chain keeps no index from which
    /// the new contract's ID could be recovered.
    pub fn create_rent_contract(&self, identity: &dyn Identity, node: u32) -> Result<BlockHash> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::CREATE_RENT_CONTRACT)
            .arg(&node);
        self.execute(identity, call)
    }

    /// Replaces the deployment of `contract`. Returns `contract` on success.
    pub fn update_node_contract(
        &self,
        identity: &dyn Identity,
        contract: u64,
        body: &[u8],
        hash: &str,
    ) -> Result<u64> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::UPDATE_NODE_CONTRACT)
            .arg(&contract)
            .arg(body)
            .arg(hash);
        self.execute(identity, call)?;
        Ok(contract)
    }

    pub fn cancel_contract(&self, identity: &dyn Identity, contract: u64) -> Result<()> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::CANCEL_CONTRACT)
            .arg(&contract);
        self.execute(identity, call).map(|_| ())
    }

    /// Reports resources actually used by contracts. Only the node hosting
    /// the contracts may call this.
    pub fn set_contract_consumption(
        &self,
        identity: &dyn Identity,
        resources: &[ContractResources],
    ) -> Result<()> {
        let call =
            CallBuilder::new(config::SMART_CONTRACT_MODULE, config::REPORT_CONTRACT_RESOURCES)
                .arg(resources);
        self.execute(identity, call).map(|_| ())
    }

    /// Submits network usage reports and returns the including block.
    pub fn report(
        &self,
        identity: &dyn Identity,
        consumptions: &[NruConsumption],
    ) -> Result<BlockHash> {
        let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::ADD_NRU_REPORTS)
            .arg(consumptions);
        self.execute(identity, call)
    }
}
