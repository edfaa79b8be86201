//! Delivery attempts across a project, filtered and sorted server-side.

use crate::client::VolleyClient;
use crate::error::Result;
use crate::filters::ListDeliveryAttemptsOptions;
use crate::types::DeliveryAttemptList;

impl VolleyClient {
    pub fn list_delivery_attempts(
        &self,
        project_id: u64,
        options: &ListDeliveryAttemptsOptions,
    ) -> Result<DeliveryAttemptList> {
        self.get_with_query(
            &format!("/api/projects/{project_id}/delivery-attempts"),
            &options.to_query(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::filters::{AttemptSort, AttemptStatus, ListDeliveryAttemptsOptions};
    use crate::testing::{client_with, RecordingTransport};

    #[test]
    fn list_delivery_attempts_formats_filters() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(
            200,
            r#"{"attempts":[{"id":1,"event_id":"evt_abc123","connection_id":30,"status":"failed","status_code":503,"error_reason":"Service Unavailable","duration_ms":30012,"created_at":"2024-05-01T12:00:00Z"}],"total":1,"limit":10,"offset":0}"#,
        );
        let attempts = client_with(&transport)
            .list_delivery_attempts(
                1,
                &ListDeliveryAttemptsOptions {
                    connection_id: Some(30),
                    status: Some(AttemptStatus::Failed),
                    start_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
                    sort: Some(AttemptSort::Duration),
                    limit: Some(10),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(attempts.pagination.total, 1);
        assert_eq!(attempts.attempts[0].duration_ms, 30012);
        assert_eq!(
            attempts.attempts[0].error_reason.as_deref(),
            Some("Service Unavailable")
        );
        assert_eq!(
            transport.last_request().url,
            "http://localhost:3000/api/projects/1/delivery-attempts?connection_id=30&limit=10&sort=duration&start_time=2024-05-01T00%3A00%3A00Z&status=failed"
        );
    }
}
