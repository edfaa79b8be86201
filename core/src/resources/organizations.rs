//! Organizations the token can see.
//!
//! # Design
//! `get_organization(Some(id))` sends that id as the scope for one call
//! without touching the client's own scope, so there is nothing to
//! restore afterwards.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::query::QueryParams;
use crate::types::{CreateOrganization, Organization};

#[derive(Deserialize)]
struct OrganizationList {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    organizations: Vec<Organization>,
}

impl VolleyClient {
    /// All organizations the token has access to. Not scoped.
    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        let list: OrganizationList = self.get("/api/org/list")?;
        Ok(list.organizations)
    }

    /// The organization selected by `organization_id`, or by the client's
    /// current scope when `None`. Without either, the server returns the
    /// first organization the token can access.
    ///
    /// The override applies to this call only; the client's scope is the
    /// same afterwards whether the call succeeds or fails.
    pub fn get_organization(&self, organization_id: Option<u64>) -> Result<Organization> {
        let scope = organization_id.or(self.organization_id());
        self.execute_scoped::<(), _>(HttpMethod::Get, "/api/org", None, &QueryParams::new(), scope)
    }

    pub fn create_organization(&self, input: &CreateOrganization) -> Result<Organization> {
        self.post("/api/org", input)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::http::{HttpMethod, AUTHORIZATION, ORGANIZATION_ID};
    use crate::testing::{client_with, RecordingTransport};
    use crate::types::CreateOrganization;

    const ORG: &str = r#"{"id":123,"name":"Test Org","slug":"test-org","account_id":100,"role":"owner","created_at":"2024-05-01T12:00:00Z"}"#;

    #[test]
    fn list_organizations_unwraps_envelope() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, &format!(r#"{{"organizations":[{ORG}]}}"#));
        let orgs = client_with(&transport).list_organizations().unwrap();

        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "Test Org");
        assert_eq!(orgs[0].account_id, 100);
        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/org/list");
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer test-token"));
    }

    #[test]
    fn get_organization_override_is_call_scoped() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, ORG);
        let client = client_with(&transport);

        let org = client.get_organization(Some(123)).unwrap();
        assert_eq!(org.id, 123);
        assert_eq!(transport.last_request().header(ORGANIZATION_ID), Some("123"));
        assert_eq!(client.organization_id(), None);
    }

    #[test]
    fn get_organization_restores_scope_after_failure() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(403, r#"{"error":"forbidden"}"#);
        let mut client = client_with(&transport);
        client.set_organization_id(1);

        let err = client.get_organization(Some(2)).unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(transport.last_request().header(ORGANIZATION_ID), Some("2"));
        assert_eq!(client.organization_id(), Some(1));
    }

    #[test]
    fn get_organization_falls_back_to_client_scope() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, ORG);
        transport.respond(200, ORG);
        let mut client = client_with(&transport);

        client.get_organization(None).unwrap();
        assert_eq!(transport.last_request().header(ORGANIZATION_ID), None);

        client.set_organization_id(55);
        client.get_organization(None).unwrap();
        assert_eq!(transport.last_request().header(ORGANIZATION_ID), Some("55"));
    }

    #[test]
    fn create_organization_posts_name() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(201, ORG);
        let org = client_with(&transport)
            .create_organization(&CreateOrganization {
                name: "Test Org".to_string(),
            })
            .unwrap();

        assert_eq!(org.slug, "test-org");
        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/org");
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Test Org"}"#));
    }
}
