//! Static option tables backing `select` and `date` filter controls.

use serde::{Deserialize, Serialize};

/// Named option table a select filter draws its choices from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionSource {
    PickupLocations,
    TransportModes,
    Zones,
    PaymentModes,
    DateRanges,
    ReturnReasons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Token sent to the backend.
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> FilterOption {
    FilterOption { value, label }
}

const PICKUP_LOCATIONS: &[FilterOption] = &[
    opt("WH-DEL-01", "Delhi Warehouse (Okhla)"),
    opt("WH-BOM-01", "Mumbai Warehouse (Bhiwandi)"),
    opt("WH-BLR-01", "Bengaluru Warehouse (Hosur Rd)"),
    opt("WH-HYD-01", "Hyderabad Warehouse (Shamshabad)"),
    opt("WH-CCU-01", "Kolkata Warehouse (Dankuni)"),
];

const TRANSPORT_MODES: &[FilterOption] = &[
    opt("surface", "Surface"),
    opt("air", "Air"),
    opt("express", "Express"),
];

const ZONES: &[FilterOption] = &[
    opt("A", "Zone A - Within City"),
    opt("B", "Zone B - Within State"),
    opt("C", "Zone C - Metro to Metro"),
    opt("D", "Zone D - Rest of India"),
    opt("E", "Zone E - North East & J&K"),
];

const PAYMENT_MODES: &[FilterOption] = &[opt("prepaid", "Prepaid"), opt("cod", "Cash on Delivery")];

const DATE_RANGES: &[FilterOption] = &[
    opt("today", "Today"),
    opt("yesterday", "Yesterday"),
    opt("last7days", "Last 7 Days"),
    opt("last30days", "Last 30 Days"),
    opt("this_month", "This Month"),
    opt("last_month", "Last Month"),
];

const RETURN_REASONS: &[FilterOption] = &[
    opt("damaged", "Damaged Product"),
    opt("wrong_item", "Wrong Item Delivered"),
    opt("size_issue", "Size / Fit Issue"),
    opt("not_required", "No Longer Required"),
    opt("quality", "Quality Not As Expected"),
];

/// All options for a source, in display order.
pub fn options(source: OptionSource) -> &'static [FilterOption] {
    match source {
        OptionSource::PickupLocations => PICKUP_LOCATIONS,
        OptionSource::TransportModes => TRANSPORT_MODES,
        OptionSource::Zones => ZONES,
        OptionSource::PaymentModes => PAYMENT_MODES,
        OptionSource::DateRanges => DATE_RANGES,
        OptionSource::ReturnReasons => RETURN_REASONS,
    }
}

pub fn label_for(source: OptionSource, value: &str) -> Option<&'static str> {
    options(source)
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label)
}

/// The option after `current` in display order, wrapping to "no selection"
/// after the last one.
pub fn next_value(source: OptionSource, current: Option<&str>) -> Option<&'static str> {
    let table = options(source);
    match current.and_then(|value| table.iter().position(|o| o.value == value)) {
        None => table.first().map(|o| o.value),
        Some(index) => table.get(index + 1).map(|o| o.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_has_options() {
        for source in [
            OptionSource::PickupLocations,
            OptionSource::TransportModes,
            OptionSource::Zones,
            OptionSource::PaymentModes,
            OptionSource::DateRanges,
            OptionSource::ReturnReasons,
        ] {
            assert!(!options(source).is_empty(), "{:?}", source);
        }
    }

    #[test]
    fn label_lookup() {
        assert_eq!(label_for(OptionSource::PaymentModes, "cod"), Some("Cash on Delivery"));
        assert_eq!(label_for(OptionSource::Zones, "Z"), None);
    }

    #[test]
    fn next_value_cycles_through_none() {
        let source = OptionSource::PaymentModes;
        assert_eq!(next_value(source, None), Some("prepaid"));
        assert_eq!(next_value(source, Some("prepaid")), Some("cod"));
        assert_eq!(next_value(source, Some("cod")), None);
        assert_eq!(next_value(source, Some("bogus")), Some("prepaid"));
    }
}
