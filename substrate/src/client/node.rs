use super::Substrate;
use crate::chain::{ConnectionPool, Identity};
use crate::config;
use crate::error::{Result, SubstrateError};
use crate::storage::{self, StorageQuery};
use crate::transaction::CallBuilder;
use crate::types::Node;

fn node_query(id: u32) -> StorageQuery {
    StorageQuery::new(config::TFGRID_MODULE, config::NODES).key("id", &id)
}

fn twin_index(twin_id: u32) -> StorageQuery {
    StorageQuery::new(config::TFGRID_MODULE, config::NODE_ID_BY_TWIN_ID).key("twin_id", &twin_id)
}

impl<P: ConnectionPool> Substrate<P> {
    /// Node with `id`.
    pub fn get_node(&self, id: u32) -> Result<Node> {
        self.read("get_node", |conn| storage::fetch_record(conn, &node_query(id)))
    }

    /// ID of the node registered by `twin_id`.
    pub fn get_node_by_twin_id(&self, twin_id: u32) -> Result<u32> {
        self.read("get_node_by_twin_id", |conn| {
            storage::fetch_index(conn, &twin_index(twin_id), "node")
        })
    }

    /// Registers `node` and returns the record as stored.
    ///
    /// `public_config` is never sent; only the farmer can set it. The node's
    /// ID is assigned by the chain and recovered through `twin_id`.
    pub fn create_node(&self, identity: &dyn Identity, node: &Node) -> Result<Node> {
        require_twin(node)?;
        let call = CallBuilder::new(config::TFGRID_MODULE, config::CREATE_NODE)
            .arg(&node.farm_id)
            .arg(&node.resources)
            .arg(&node.location)
            .arg(&node.country)
            .arg(&node.city)
            .arg(&node.interfaces);
        self.execute(identity, call)?;
        self.node_by_twin("create_node", node.twin_id)
    }

    /// Replaces the registration of `node.id` and returns the stored record.
    ///
    /// The chain keeps whatever public config the farmer set.
    pub fn update_node(&self, identity: &dyn Identity, node: &Node) -> Result<Node> {
        require_twin(node)?;
        let call = CallBuilder::new(config::TFGRID_MODULE, config::UPDATE_NODE)
            .arg(&node.id)
            .arg(&node.farm_id)
            .arg(&node.resources)
            .arg(&node.location)
            .arg(&node.country)
            .arg(&node.city)
            .arg(&node.interfaces);
        let block = self.execute(identity, call)?;
        tracing::debug!(node = node.id, block = %block, "node updated");
        self.node_by_twin("update_node", node.twin_id)
    }

    /// Reports the node's uptime in seconds.
    pub fn update_node_uptime(&self, identity: &dyn Identity, uptime: u64) -> Result<()> {
        let call = CallBuilder::new(config::TFGRID_MODULE, config::REPORT_UPTIME).arg(&uptime);
        self.execute(identity, call).map(|_| ())
    }

    fn node_by_twin(&self, operation: &str, twin_id: u32) -> Result<Node> {
        self.read(operation, |conn| {
            storage::fetch_by_index::<Node, u32, _, _>(conn, &twin_index(twin_id), node_query)
        })
    }
}

fn require_twin(node: &Node) -> Result<()> {
    if node.twin_id == 0 {
        return Err(SubstrateError::InvalidArgument("twin id is required".into()));
    }
    Ok(())
}

