//! Projects within the scoped organization. Listing and creating require
//! a scope; the server rejects them with `organization_required` otherwise.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::types::{CreateProject, Project, UpdateProject};

#[derive(Deserialize)]
struct ProjectList {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

impl VolleyClient {
    /// Projects of the organization in scope. The server rejects this call
    /// when no organization scope is set.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let list: ProjectList = self.get("/api/projects")?;
        Ok(list.projects)
    }

    pub fn create_project(&self, input: &CreateProject) -> Result<Project> {
        let envelope: ProjectEnvelope = self.post("/api/projects", input)?;
        Ok(envelope.project)
    }

    /// Rename a project.
    pub fn update_project(&self, project_id: u64, input: &UpdateProject) -> Result<Project> {
        let envelope: ProjectEnvelope = self.put(&format!("/api/projects/{project_id}"), input)?;
        Ok(envelope.project)
    }

    pub fn delete_project(&self, project_id: u64) -> Result<()> {
        self.delete(&format!("/api/projects/{project_id}"))
    }
}
