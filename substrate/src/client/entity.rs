use super::Substrate;
use crate::chain::ConnectionPool;
use crate::config;
use crate::error::Result;
use crate::storage::{self, StorageQuery};
use crate::types::Entity;

impl<P: ConnectionPool> Substrate<P> {
    /// Entity with `id`.
    pub fn get_entity(&self, id: u32) -> Result<Entity> {
        self.read("get_entity", |conn| {
            let query = StorageQuery::new(config::TFGRID_MODULE, config::ENTITIES).key("id", &id);
            storage::fetch_record(conn, &query)
        })
    }
}
