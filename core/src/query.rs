//! Query-string construction for list endpoints.
//!
//! Parameters are single-valued and kept sorted by name, so the encoded URL
//! for a given set of filters is deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

/// Canonical query-string rendering of a filter value.
pub trait QueryValue {
    fn to_query_value(&self) -> String;
}

macro_rules! impl_query_value_for_int {
    ($($t:ty),*) => {
        $(impl QueryValue for $t {
            fn to_query_value(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_query_value_for_int!(u16, u32, u64, i32, i64);

impl QueryValue for str {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }
}

/// RFC 3339 with whole seconds and a `Z` suffix, e.g. `2024-05-01T12:00:00Z`.
impl QueryValue for DateTime<Utc> {
    fn to_query_value(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_value(&self) -> String {
        (**self).to_query_value()
    }
}

/// Name → value map appended to a request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<&'static str, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn insert(&mut self, name: &'static str, value: impl QueryValue) {
        self.params.insert(name, value.to_query_value());
    }

    /// Set `name` only when `value` is present.
    pub fn insert_opt<T: QueryValue>(&mut self, name: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.params.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Append every parameter to `url` with form URL-encoding.
    pub fn append_to(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &self.params {
            pairs.append_pair(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn absent_values_are_skipped() {
        let mut query = QueryParams::new();
        query.insert_opt("source_id", None::<u64>);
        query.insert_opt("limit", Some(25u32));
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("limit"), Some("25"));
        assert_eq!(query.get("source_id"), None);
    }

    #[test]
    fn timestamps_render_as_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(at.to_query_value(), "2024-05-01T12:30:00Z");
    }

    #[test]
    fn append_encodes_and_sorts() {
        let mut url = Url::parse("https://api.volleyhooks.com/api/projects/1/requests").unwrap();
        let mut query = QueryParams::new();
        query.insert("search", "order created&paid");
        query.insert("limit", 10u32);
        query.append_to(&mut url);
        assert_eq!(
            url.as_str(),
            "https://api.volleyhooks.com/api/projects/1/requests?limit=10&search=order+created%26paid"
        );
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let mut url = Url::parse("https://api.volleyhooks.com/api/org").unwrap();
        QueryParams::new().append_to(&mut url);
        assert_eq!(url.as_str(), "https://api.volleyhooks.com/api/org");
    }
}
