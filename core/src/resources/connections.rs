//! Connections: routing links from one source to one destination.
//!
//! Lists arrive as `{"connections": [..]}`, single records as
//! `{"connection": {..}}`; both wrappers are stripped here.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::types::{Connection, CreateConnection, UpdateConnection};

#[derive(Deserialize)]
struct ConnectionList {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct ConnectionEnvelope {
    connection: Connection,
}

impl VolleyClient {
    pub fn list_connections(&self, project_id: u64) -> Result<Vec<Connection>> {
        let list: ConnectionList = self.get(&format!("/api/projects/{project_id}/connections"))?;
        Ok(list.connections)
    }

    /// Route events from a source to a destination.
    pub fn create_connection(&self, project_id: u64, input: &CreateConnection) -> Result<Connection> {
        let envelope: ConnectionEnvelope =
            self.post(&format!("/api/projects/{project_id}/connections"), input)?;
        Ok(envelope.connection)
    }

    pub fn get_connection(&self, connection_id: u64) -> Result<Connection> {
        let envelope: ConnectionEnvelope = self.get(&format!("/api/connections/{connection_id}"))?;
        Ok(envelope.connection)
    }

    pub fn update_connection(
        &self,
        connection_id: u64,
        input: &UpdateConnection,
    ) -> Result<Connection> {
        let envelope: ConnectionEnvelope =
            self.put(&format!("/api/connections/{connection_id}"), input)?;
        Ok(envelope.connection)
    }

    pub fn delete_connection(&self, connection_id: u64) -> Result<()> {
        self.delete(&format!("/api/connections/{connection_id}"))
    }
}
