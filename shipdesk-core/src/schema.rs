//! Presentation contract types: columns, filters, actions and the per-state
//! schema record tying them together.

use crate::catalog::OptionSource;
use crate::enums::{Lifecycle, ResourceKind, SortDirection};
use crate::error::SchemaError;
use crate::records::Record;
use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

// ============================================================================
// CELL VALUES
// ============================================================================

/// Renderable value produced by a column accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// Rupees.
    Amount(f64),
    /// Kilograms.
    Weight(f64),
    Count(u64),
    Date(Timestamp),
    /// Status badge label.
    Status(&'static str),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
            _ => CellValue::Empty,
        }
    }

    pub fn opt_date(value: Option<Timestamp>) -> Self {
        value.map(CellValue::Date).unwrap_or(CellValue::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Total order for client-side sorting. Empty cells sort after every
    /// value; mixed variants fall back to their rendered text.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Greater,
            (_, CellValue::Empty) => Ordering::Less,
            (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (CellValue::Amount(a), CellValue::Amount(b))
            | (CellValue::Weight(a), CellValue::Weight(b)) => a.total_cmp(b),
            (CellValue::Count(a), CellValue::Count(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Status(a), CellValue::Status(b)) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Amount(amount) => write!(f, "₹{:.2}", amount),
            CellValue::Weight(kg) => write!(f, "{:.2} kg", kg),
            CellValue::Count(count) => write!(f, "{}", count),
            CellValue::Date(ts) => write!(f, "{}", ts.format("%d %b %Y")),
            CellValue::Status(label) => f.write_str(label),
            CellValue::Empty => f.write_str("-"),
        }
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// One table column. The accessor is a plain function pointer so it cannot
/// capture state.
pub struct ColumnSpec<Row> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&Row) -> CellValue,
    pub sortable: bool,
    /// Hide the column when the table is narrower than this many cells.
    pub hide_below: Option<u16>,
    pub min_width: Option<u16>,
}

impl<Row> ColumnSpec<Row> {
    pub fn new(id: &'static str, header: &'static str, accessor: fn(&Row) -> CellValue) -> Self {
        Self {
            id,
            header,
            accessor,
            sortable: false,
            hide_below: None,
            min_width: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn hide_below(mut self, width: u16) -> Self {
        self.hide_below = Some(width);
        self
    }

    pub fn min_width(mut self, width: u16) -> Self {
        self.min_width = Some(width);
        self
    }

    pub fn value(&self, row: &Row) -> CellValue {
        (self.accessor)(row)
    }

    pub fn visible_at(&self, width: u16) -> bool {
        self.hide_below.map_or(true, |breakpoint| width >= breakpoint)
    }
}

impl<Row> fmt::Debug for ColumnSpec<Row> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("hide_below", &self.hide_below)
            .field("min_width", &self.min_width)
            .finish()
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Param name of the free-text search filter.
pub const SEARCH_PARAM: &str = "search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    Single,
    Range,
}

/// Filter control kinds. Kinds this build does not know deserialize to
/// `Unsupported` and are skipped by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    Search { placeholder: String },
    Date { mode: DateMode },
    Select { source: OptionSource },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub param: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterSpec {
    pub fn search(placeholder: impl Into<String>) -> Self {
        Self {
            param: SEARCH_PARAM.to_string(),
            label: "Search".to_string(),
            kind: FilterKind::Search {
                placeholder: placeholder.into(),
            },
        }
    }

    pub fn date(param: impl Into<String>, label: impl Into<String>, mode: DateMode) -> Self {
        Self {
            param: param.into(),
            label: label.into(),
            kind: FilterKind::Date { mode },
        }
    }

    pub fn select(param: impl Into<String>, label: impl Into<String>, source: OptionSource) -> Self {
        Self {
            param: param.into(),
            label: label.into(),
            kind: FilterKind::Select { source },
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self.kind, FilterKind::Search { .. })
    }

    /// Option table backing this control, if it is a picker.
    pub fn option_source(&self) -> Option<OptionSource> {
        match &self.kind {
            FilterKind::Select { source } => Some(*source),
            FilterKind::Date { .. } => Some(OptionSource::DateRanges),
            FilterKind::Search { .. } | FilterKind::Unsupported => None,
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// What the console does when a row action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    ViewDetails,
    GenerateAwb,
    Manifest,
    /// Handled by a screen outside the table engine.
    External,
}

/// A closed set of row actions for one resource kind.
pub trait RowAction: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn icon(&self) -> &'static str;
    /// Uppercase key that triggers the action on the focused row.
    fn hotkey(&self) -> char;
    fn effect(&self) -> ActionEffect;

    /// Only offered on rows that already carry an AWB.
    fn requires_awb(&self) -> bool {
        false
    }

    /// Only offered on rows without an AWB.
    fn forbids_awb(&self) -> bool {
        false
    }

    fn available_for<R: Record>(&self, row: &R) -> bool {
        let has_awb = row.awb_number().is_some();
        !(self.requires_awb() && !has_awb) && !(self.forbids_awb() && has_awb)
    }
}

// ============================================================================
// SCHEMA RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column_id: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(column_id: &'static str, direction: SortDirection) -> Self {
        Self {
            column_id,
            direction,
        }
    }
}

/// A list resource with its lifecycle, row type and action set.
pub trait Resource: Sized + Send + Sync + fmt::Debug + 'static {
    type State: Lifecycle;
    type Row: Record;
    type Action: RowAction;

    const KIND: ResourceKind;

    /// Schema for `state`. Total over the state enum.
    fn schema(state: Self::State) -> &'static SchemaRecord<Self>;

    fn all_schemas() -> impl Iterator<Item = &'static SchemaRecord<Self>> {
        <Self::State as Lifecycle>::ALL
            .iter()
            .map(|state| Self::schema(*state))
    }
}

/// Everything the table shows for one lifecycle state.
#[derive(Debug)]
pub struct SchemaRecord<R: Resource> {
    pub state: R::State,
    pub columns: Vec<ColumnSpec<R::Row>>,
    pub filters: Vec<FilterSpec>,
    pub row_actions: Vec<R::Action>,
    pub default_sort: SortSpec,
}

impl<R: Resource> SchemaRecord<R> {
    pub fn column(&self, id: &str) -> Option<&ColumnSpec<R::Row>> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn filter(&self, param: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|filter| filter.param == param)
    }

    pub fn declares_param(&self, param: &str) -> bool {
        self.filter(param).is_some()
    }

    pub fn has_search(&self) -> bool {
        self.filters.iter().any(FilterSpec::is_search)
    }

    pub fn action_for_hotkey(&self, key: char) -> Option<R::Action> {
        self.row_actions.iter().copied().find(|a| a.hotkey() == key)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let state = self.state.as_str();

        let mut column_ids = HashSet::new();
        for column in &self.columns {
            if !column_ids.insert(column.id) {
                return Err(SchemaError::DuplicateColumn {
                    state,
                    column: column.id.to_string(),
                });
            }
        }

        let mut params = HashSet::new();
        let mut searches = 0usize;
        for filter in &self.filters {
            if !params.insert(filter.param.as_str()) {
                return Err(SchemaError::DuplicateParam {
                    state,
                    param: filter.param.clone(),
                });
            }
            if filter.is_search() {
                searches += 1;
                if filter.param != SEARCH_PARAM {
                    return Err(SchemaError::MisnamedSearch {
                        state,
                        param: filter.param.clone(),
                    });
                }
            }
        }
        if searches > 1 {
            return Err(SchemaError::MultipleSearch { state, count: searches });
        }

        let mut actions = HashSet::new();
        let mut hotkeys = HashSet::new();
        for action in &self.row_actions {
            if !actions.insert(*action) || !hotkeys.insert(action.hotkey()) {
                return Err(SchemaError::DuplicateAction {
                    state,
                    action: action.as_str(),
                });
            }
        }

        match self.column(self.default_sort.column_id) {
            Some(column) if column.sortable => Ok(()),
            Some(_) => Err(SchemaError::UnsortableDefault {
                state,
                column: self.default_sort.column_id.to_string(),
            }),
            None => Err(SchemaError::UnknownDefaultSort {
                state,
                column: self.default_sort.column_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_cells_sort_last() {
        let a = CellValue::Amount(10.0);
        assert_eq!(CellValue::Empty.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&CellValue::Empty), Ordering::Less);
        assert_eq!(CellValue::Empty.compare(&CellValue::Empty), Ordering::Equal);
    }

    #[test]
    fn numeric_cells_compare_numerically() {
        assert_eq!(
            CellValue::Amount(9.5).compare(&CellValue::Amount(100.0)),
            Ordering::Less
        );
        assert_eq!(CellValue::Count(3).compare(&CellValue::Count(12)), Ordering::Less);
    }

    #[test]
    fn text_compares_case_insensitively() {
        assert_eq!(
            CellValue::text("alpha").compare(&CellValue::text("Beta")),
            Ordering::Less
        );
    }

    #[test]
    fn cell_display() {
        assert_eq!(CellValue::Amount(1299.5).to_string(), "₹1299.50");
        assert_eq!(CellValue::Weight(0.5).to_string(), "0.50 kg");
        assert_eq!(CellValue::Empty.to_string(), "-");
        let ts = Utc.with_ymd_and_hms(2026, 10, 3, 12, 0, 0).unwrap();
        assert_eq!(CellValue::Date(ts).to_string(), "03 Oct 2026");
        assert_eq!(CellValue::opt_text(Some("")), CellValue::Empty);
    }

    #[test]
    fn unknown_filter_kind_deserializes_as_unsupported() {
        let json = serde_json::json!({"param": "weight", "label": "Weight", "kind": "slider"});
        let spec: FilterSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.kind, FilterKind::Unsupported);
        assert_eq!(spec.option_source(), None);
    }

    #[test]
    fn select_filter_round_trips_its_source() {
        let spec = FilterSpec::select("zone", "Zone", OptionSource::Zones);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "select");
        assert_eq!(json["source"], "zones");
    }

    #[test]
    fn column_breakpoints() {
        let column: ColumnSpec<String> =
            ColumnSpec::new("id", "ID", |s: &String| CellValue::text(s.clone())).hide_below(100);
        assert!(!column.visible_at(80));
        assert!(column.visible_at(100));
    }
}
