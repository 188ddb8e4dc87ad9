//! Connector trait definition

use crate::{ConnectParams, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The external component that performs the handshake with a database.
///
/// A pool never looks inside `Connection`; it only asks the connector to open
/// one, to check one is still alive, and to tear one down.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The live connection produced by this connector
    type Connection: Send + 'static;

    /// Open a new connection using the given parameters
    async fn connect(&self, params: &ConnectParams) -> Result<Self::Connection>;

    /// Close a connection, releasing whatever the driver holds for it
    async fn teardown(&self, conn: Self::Connection) -> Result<()>;

    /// Cheap liveness check run before a pooled connection is handed out.
    ///
    /// Default implementation assumes the connection is alive.
    async fn ping(&self, _conn: &mut Self::Connection) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Connector> Connector for Arc<T> {
    type Connection = T::Connection;

    async fn connect(&self, params: &ConnectParams) -> Result<Self::Connection> {
        (**self).connect(params).await
    }

    async fn teardown(&self, conn: Self::Connection) -> Result<()> {
        (**self).teardown(conn).await
    }

    async fn ping(&self, conn: &mut Self::Connection) -> Result<()> {
        (**self).ping(conn).await
    }
}
