//! Destinations: the outbound URLs events are forwarded to.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::types::{CreateDestination, Destination, UpdateDestination};

#[derive(Deserialize)]
struct DestinationList {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    destinations: Vec<Destination>,
}

#[derive(Deserialize)]
struct DestinationEnvelope {
    destination: Destination,
}

impl VolleyClient {
    pub fn list_destinations(&self, project_id: u64) -> Result<Vec<Destination>> {
        let list: DestinationList = self.get(&format!("/api/projects/{project_id}/destinations"))?;
        Ok(list.destinations)
    }

    pub fn create_destination(&self, project_id: u64, input: &CreateDestination) -> Result<Destination> {
        let envelope: DestinationEnvelope =
            self.post(&format!("/api/projects/{project_id}/destinations"), input)?;
        Ok(envelope.destination)
    }

    pub fn get_destination(&self, destination_id: u64) -> Result<Destination> {
        let envelope: DestinationEnvelope = self.get(&format!("/api/destinations/{destination_id}"))?;
        Ok(envelope.destination)
    }

    pub fn update_destination(
        &self,
        destination_id: u64,
        input: &UpdateDestination,
    ) -> Result<Destination> {
        let envelope: DestinationEnvelope =
            self.put(&format!("/api/destinations/{destination_id}"), input)?;
        Ok(envelope.destination)
    }

    pub fn delete_destination(&self, destination_id: u64) -> Result<()> {
        self.delete(&format!("/api/destinations/{destination_id}"))
    }
}
