// Filter query parameters shared by the list endpoints.
//
// Every list endpoint accepts a subset of the same parameter names. The
// builder keeps insertion order so request URLs are deterministic, and
// never emits a parameter whose value is empty.

use std::fmt::Display;

use chrono::NaiveDate;
use url::Url;

/// Parameter names accepted by the backend's list endpoints.
pub const KNOWN_PARAMS: &[&str] = &[
    "facility",
    "zone",
    "status",
    "severity",
    "acknowledged",
    "search",
    "sort_by",
    "order",
    "is_active",
    "days",
    "date",
];

/// Typed builder over the list-endpoint query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(&'static str, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter by name. Empty values remove it; names outside
    /// [`KNOWN_PARAMS`] are ignored.
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// In-place variant of [`set`](Self::set).
    pub fn insert(&mut self, key: &str, value: String) {
        let Some(name) = KNOWN_PARAMS.iter().copied().find(|k| *k == key) else {
            return;
        };
        self.params.retain(|(k, _)| *k != name);
        let value = value.trim().to_owned();
        if !value.is_empty() {
            self.params.push((name, value));
        }
    }

    pub fn facility(self, id: impl Display) -> Self {
        self.set("facility", id.to_string())
    }

    pub fn zone(self, id: impl Display) -> Self {
        self.set("zone", id.to_string())
    }

    pub fn status(self, status: impl Display) -> Self {
        self.set("status", status.to_string())
    }

    pub fn severity(self, severity: impl Display) -> Self {
        self.set("severity", severity.to_string())
    }

    pub fn acknowledged(self, acknowledged: bool) -> Self {
        self.set("acknowledged", acknowledged.to_string())
    }

    pub fn is_active(self, active: bool) -> Self {
        self.set("is_active", active.to_string())
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.set("search", term)
    }

    pub fn sort_by(self, field: impl Into<String>) -> Self {
        self.set("sort_by", field)
    }

    pub fn order(self, order: impl Into<String>) -> Self {
        self.set("order", order)
    }

    pub fn days(self, days: u32) -> Self {
        self.set("days", days.to_string())
    }

    pub fn date(self, date: NaiveDate) -> Self {
        self.set("date", date.format("%Y-%m-%d").to_string())
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Append every parameter to `url`'s query string.
    pub fn apply(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &self.params {
            pairs.append_pair(k, v);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_never_sent() {
        let q = ListQuery::new().facility(2).search("  ").zone("");
        assert_eq!(q.pairs().collect::<Vec<_>>(), vec![("facility", "2")]);
    }

    #[test]
    fn later_set_replaces_earlier_value() {
        let q = ListQuery::new().status("OK").status("WARNING");
        assert_eq!(q.get("status"), Some("WARNING"));
        assert_eq!(q.pairs().count(), 1);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let q = ListQuery::new().set("page", "3");
        assert!(q.is_empty());
    }

    #[test]
    fn apply_appends_in_insertion_order() {
        let mut url = Url::parse("http://localhost/api/alerts/").unwrap();
        ListQuery::new()
            .severity("CRITICAL")
            .acknowledged(false)
            .apply(&mut url);
        assert_eq!(url.query(), Some("severity=CRITICAL&acknowledged=false"));
    }

    #[test]
    fn date_is_iso_formatted() {
        let q = ListQuery::new().date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(q.get("date"), Some("2024-03-05"));
    }
}
