use super::Substrate;
use crate::chain::ConnectionPool;
use crate::config;
use crate::error::Result;
use crate::storage::{self, StorageQuery};
use crate::types::Farm;

impl<P: ConnectionPool> Substrate<P> {
    /// Farm with `id`. Schema versions 1 through 3 decode to the same shape.
    pub fn get_farm(&self, id: u32) -> Result<Farm> {
        self.read("get_farm", |conn| {
            let query = StorageQuery::new(config::TFGRID_MODULE, config::FARMS).key("id", &id);
            storage::fetch_record(conn, &query)
        })
    }
}
