//! Filter options for the event and delivery-attempt list endpoints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::{QueryParams, QueryValue};

/// Delivery status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Processed,
    Pending,
    Failed,
    Dropped,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Processed => "processed",
            EventStatus::Pending => "pending",
            EventStatus::Failed => "failed",
            EventStatus::Dropped => "dropped",
        }
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::Success => "success",
            AttemptStatus::Failed => "failed",
        }
    }
}

/// Ordering of delivery attempts. `Time` is newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptSort {
    Time,
    TimeOldest,
    Duration,
    StatusCode,
}

impl AttemptSort {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptSort::Time => "time",
            AttemptSort::TimeOldest => "time_oldest",
            AttemptSort::Duration => "duration",
            AttemptSort::StatusCode => "status_code",
        }
    }
}

macro_rules! vocabulary_display {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl QueryValue for $t {
                fn to_query_value(&self) -> String {
                    self.as_str().to_string()
                }
            }
        )*
    };
}

vocabulary_display!(EventStatus, AttemptStatus, AttemptSort);

/// Filters for `list_events`. Every `None` field is left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEventsOptions {
    pub source_id: Option<u64>,
    pub connection_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub status: Option<EventStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Free-text search over event ids and bodies.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListEventsOptions {
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.insert_opt("source_id", self.source_id);
        query.insert_opt("connection_id", self.connection_id);
        query.insert_opt("destination_id", self.destination_id);
        query.insert_opt("status", self.status);
        query.insert_opt("start_time", self.start_time);
        query.insert_opt("end_time", self.end_time);
        query.insert_opt("search", self.search.as_deref());
        query.insert_opt("limit", self.limit);
        query.insert_opt("offset", self.offset);
        query
    }
}

/// Filters for `list_delivery_attempts`. Every `None` field is left out of
/// the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDeliveryAttemptsOptions {
    /// External event id (`evt_...`), not the numeric event id.
    pub event_id: Option<String>,
    pub source_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub connection_id: Option<u64>,
    pub status: Option<AttemptStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub sort: Option<AttemptSort>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListDeliveryAttemptsOptions {
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.insert_opt("event_id", self.event_id.as_deref());
        query.insert_opt("source_id", self.source_id);
        query.insert_opt("destination_id", self.destination_id);
        query.insert_opt("connection_id", self.connection_id);
        query.insert_opt("status", self.status);
        query.insert_opt("start_time", self.start_time);
        query.insert_opt("end_time", self.end_time);
        query.insert_opt("sort", self.sort);
        query.insert_opt("limit", self.limit);
        query.insert_opt("offset", self.offset);
        query
    }
}
