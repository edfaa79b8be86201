//! Sources: inbound webhook endpoints, each with a public ingestion id.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::types::{CreateSource, Source, UpdateSource};

#[derive(Deserialize)]
struct SourceList {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    sources: Vec<Source>,
}

#[derive(Deserialize)]
struct SourceEnvelope {
    source: Source,
}

impl VolleyClient {
    pub fn list_sources(&self, project_id: u64) -> Result<Vec<Source>> {
        let list: SourceList = self.get(&format!("/api/projects/{project_id}/sources"))?;
        Ok(list.sources)
    }

    /// Create a source. The returned `ingestion_id` is the path segment
    /// webhooks are posted to.
    pub fn create_source(&self, project_id: u64, input: &CreateSource) -> Result<Source> {
        let envelope: SourceEnvelope =
            self.post(&format!("/api/projects/{project_id}/sources"), input)?;
        Ok(envelope.source)
    }

    pub fn get_source(&self, source_id: u64) -> Result<Source> {
        let envelope: SourceEnvelope = self.get(&format!("/api/sources/{source_id}"))?;
        Ok(envelope.source)
    }

    pub fn update_source(&self, source_id: u64, input: &UpdateSource) -> Result<Source> {
        let envelope: SourceEnvelope = self.put(&format!("/api/sources/{source_id}"), input)?;
        Ok(envelope.source)
    }

    pub fn delete_source(&self, source_id: u64) -> Result<()> {
        self.delete(&format!("/api/sources/{source_id}"))
    }
}
