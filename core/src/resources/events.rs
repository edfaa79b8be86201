//! Received events (the API calls them requests) and replays.
//!
//! # Design
//! `get_event` takes the numeric database id; `replay_event` takes the
//! string `event_id`. A replay runs synchronously and reports the
//! resulting delivery attempt.

use serde::Deserialize;

use crate::client::VolleyClient;
use crate::error::Result;
use crate::filters::ListEventsOptions;
use crate::types::{Event, EventList, ReplayEvent, ReplayEventResult};

#[derive(Deserialize)]
struct EventEnvelope {
    request: Event,
}

impl VolleyClient {
    /// Events received by a project, newest first, filtered by `options`.
    pub fn list_events(&self, project_id: u64, options: &ListEventsOptions) -> Result<EventList> {
        self.get_with_query(
            &format!("/api/projects/{project_id}/requests"),
            &options.to_query(),
        )
    }

    /// A single event by its numeric id, including its delivery attempts.
    pub fn get_event(&self, id: u64) -> Result<Event> {
        let envelope: EventEnvelope = self.get(&format!("/api/requests/{id}"))?;
        Ok(envelope.request)
    }

    /// Redeliver an event synchronously and report the outcome.
    pub fn replay_event(&self, input: &ReplayEvent) -> Result<ReplayEventResult> {
        self.post("/api/replay-event", input)
    }
}
