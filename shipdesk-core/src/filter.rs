//! Filter-to-query translation.

use crate::schema::{FilterKind, FilterSpec, SEARCH_PARAM};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw control values keyed by filter param.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues(BTreeMap<String, String>);

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: &str) -> Option<&str> {
        self.0.get(param).map(String::as_str)
    }

    pub fn set(&mut self, param: impl Into<String>, value: impl Into<String>) {
        self.0.insert(param.into(), value.into());
    }

    pub fn remove(&mut self, param: &str) -> Option<String> {
        self.0.remove(param)
    }

    pub fn search(&self) -> &str {
        self.get(SEARCH_PARAM).unwrap_or("")
    }

    /// Drop every value except the search term. Applied on lifecycle state
    /// switches so a typed search survives while state-specific filters do not.
    pub fn retain_search(&mut self) {
        self.0.retain(|param, _| param == SEARCH_PARAM);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Backend query derived from the active schema and filter values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// `Some` whenever the schema declares a search filter, even if empty.
    pub search: Option<String>,
    pub params: BTreeMap<String, String>,
}

impl QueryParams {
    /// Every key this query would put on the wire.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.search
            .as_ref()
            .map(|_| SEARCH_PARAM)
            .into_iter()
            .chain(self.params.keys().map(String::as_str))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Translate raw filter values into query params, in schema order.
///
/// Only params the schema declares ever appear in the result. Search is
/// copied through (defaulting to the empty string); date and select values
/// are copied verbatim when present; blank values and unknown filter kinds
/// are skipped.
pub fn translate(filters: &[FilterSpec], values: &FilterValues) -> QueryParams {
    let mut query = QueryParams::default();

    for filter in filters {
        match &filter.kind {
            FilterKind::Search { .. } => {
                query.search = Some(values.get(&filter.param).unwrap_or("").to_string());
            }
            FilterKind::Date { .. } | FilterKind::Select { .. } => {
                if let Some(value) = non_blank(values.get(&filter.param)) {
                    query.params.insert(filter.param.clone(), value.to_string());
                }
            }
            FilterKind::Unsupported => {}
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OptionSource;
    use crate::schema::DateMode;

    fn pending_filters() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("Order ID"),
            FilterSpec::date("order_date", "Order Date", DateMode::Range),
            FilterSpec::select("pickup_location", "Pickup", OptionSource::PickupLocations),
        ]
    }

    #[test]
    fn copies_declared_values_only() {
        let values: FilterValues = [
            ("search", "ORD1"),
            ("order_date", "last7days"),
            ("zone", "A"),
        ]
        .into_iter()
        .collect();

        let query = translate(&pending_filters(), &values);
        assert_eq!(query.search.as_deref(), Some("ORD1"));
        assert_eq!(query.params.get("order_date").map(String::as_str), Some("last7days"));
        assert!(!query.params.contains_key("zone"));
        assert!(!query.params.contains_key("pickup_location"));
    }

    #[test]
    fn search_defaults_to_empty_string() {
        let query = translate(&pending_filters(), &FilterValues::new());
        assert_eq!(query.search.as_deref(), Some(""));
        assert!(query.params.is_empty());
    }

    #[test]
    fn no_search_filter_means_no_search_key() {
        let filters = vec![FilterSpec::select("zone", "Zone", OptionSource::Zones)];
        let values: FilterValues = [("search", "x")].into_iter().collect();
        let query = translate(&filters, &values);
        assert_eq!(query.search, None);
        assert_eq!(query.keys().count(), 0);
    }

    #[test]
    fn blank_values_are_omitted() {
        let values: FilterValues = [("order_date", "  ")].into_iter().collect();
        let query = translate(&pending_filters(), &values);
        assert!(query.params.is_empty());
    }

    #[test]
    fn unsupported_kinds_are_skipped() {
        let filters = vec![FilterSpec {
            param: "weight".to_string(),
            label: "Weight".to_string(),
            kind: FilterKind::Unsupported,
        }];
        let values: FilterValues = [("weight", "2")].into_iter().collect();
        assert_eq!(translate(&filters, &values), QueryParams::default());
    }

    #[test]
    fn retain_search_keeps_only_the_term() {
        let mut values: FilterValues = [("search", "abc"), ("zone", "B"), ("order_date", "today")]
            .into_iter()
            .collect();
        values.retain_search();
        assert_eq!(values.len(), 1);
        assert_eq!(values.search(), "abc");
    }
}
