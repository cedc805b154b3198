//! # Client
//!
//! [`Substrate`] is the public face of the crate: one method per grid
//! operation, each returning a typed [`Result`](crate::error::Result).
//!
//! ```text
//! mod.rs      — Substrate facade, connection scoping, read/execute helpers
//! entity.rs   — get_entity
//! node.rs     — get_node, get_node_by_twin_id, create/update node, uptime
//! farm.rs     — get_farm
//! contract.rs — contract reads, create/update/cancel, billing reports
//! ```
//!
//! Every operation borrows exactly one connection from the pool for each
//! step it performs and hands it back before the next. A write followed by
//! a read-back therefore uses two borrows; the submission connection is
//! never held across the follow-up lookup.

mod contract;
mod entity;
mod farm;
mod node;

use crate::chain::{BlockHash, ChainConnection, ConnectionPool, Identity, PooledConnection};
use crate::error::{Result, SubstrateError};
use crate::transaction::{self, CallBuilder};

/// Grid client over a pool of chain connections.
#[derive(Debug)]
pub struct Substrate<P: ConnectionPool> {
    pool: P,
}

impl<P: ConnectionPool> Substrate<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    fn connection(&self, operation: &str) -> Result<PooledConnection<'_, P>> {
        PooledConnection::acquire(&self.pool).map_err(SubstrateError::chain(operation))
    }

    /// Runs `f` against a freshly borrowed connection.
    fn read<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&P::Connection) -> Result<T>,
    ) -> Result<T> {
        let connection = self.connection(operation)?;
        f(&connection)
    }

    /// Builds, submits and verifies a call on one borrowed connection.
    fn execute(&self, identity: &dyn Identity, call: CallBuilder) -> Result<BlockHash> {
        let name = call.name();
        let connection = self.connection(&name)?;
        let call = call.build(connection.metadata())?;
        let block = transaction::execute(&*connection, identity, call)?;
        tracing::info!(call = %name, block = %block, "call executed");
        Ok(block)
    }
}
