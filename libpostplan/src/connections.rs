//! Connections provider seam and the connection gate
//!
//! Publishing credentials live with an external collaborator; the core
//! only ever reads the list of active connections and keeps the boolean
//! outcome of the gate. Credential material never passes through here, and
//! a stale or expired connection is the provider's problem to omit.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{PostplanError, Result};
use crate::types::Connection;

/// Read-only view over an owner's active platform connections.
#[async_trait]
pub trait ConnectionsProvider: Send + Sync {
    async fn list_connections(&self, owner_id: &str) -> Result<Vec<Connection>>;
}

/// The gate every schedule-bound transition must pass: "does this owner
/// have a usable connection for this platform right now".
#[derive(Clone)]
pub struct ConnectionGate {
    provider: Arc<dyn ConnectionsProvider>,
}

impl ConnectionGate {
    pub fn new(provider: Arc<dyn ConnectionsProvider>) -> Self {
        Self { provider }
    }

    pub async fn has_active_connection(&self, owner_id: &str, platform: &str) -> Result<bool> {
        let connections = self.provider.list_connections(owner_id).await?;
        Ok(connections.iter().any(|c| c.platform == platform))
    }

    /// Fail with `PlatformNotConnected` when the owner has no usable
    /// connection for the platform.
    pub async fn require(&self, owner_id: &str, platform: &str) -> Result<()> {
        if self.has_active_connection(owner_id, platform).await? {
            Ok(())
        } else {
            Err(PostplanError::PlatformNotConnected {
                platform: platform.to_string(),
            })
        }
    }
}

/// In-memory provider, available in all builds so tests and embedding
/// callers can drive connect/disconnect sequences deterministically.
#[derive(Default)]
pub struct StaticConnections {
    connections: RwLock<Vec<Connection>>,
}

impl StaticConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or refresh a connection for an owner+platform pair.
    pub fn connect(&self, connection: Connection) {
        let mut connections = self.connections.write().unwrap();
        connections
            .retain(|c| !(c.owner_id == connection.owner_id && c.platform == connection.platform));
        connections.push(connection);
    }

    pub fn disconnect(&self, owner_id: &str, platform: &str) {
        self.connections
            .write()
            .unwrap()
            .retain(|c| !(c.owner_id == owner_id && c.platform == platform));
    }
}

#[async_trait]
impl ConnectionsProvider for StaticConnections {
    async fn list_connections(&self, owner_id: &str) -> Result<Vec<Connection>> {
        Ok(self
            .connections
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
