//! Canonical list state held by a fetch controller.

use crate::enums::Lifecycle;
use crate::records::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// PAGINATION
// ============================================================================

/// Rows per page, restricted to the sizes the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const ALLOWED: [u32; 4] = [10, 20, 50, 100];

    pub fn new(size: u32) -> Option<Self> {
        Self::ALLOWED.contains(&size).then_some(Self(size))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Next larger allowed size, saturating at the largest.
    pub fn larger(&self) -> Self {
        Self::ALLOWED
            .iter()
            .copied()
            .find(|size| *size > self.0)
            .map(Self)
            .unwrap_or(*self)
    }

    /// Next smaller allowed size, saturating at the smallest.
    pub fn smaller(&self) -> Self {
        Self::ALLOWED
            .iter()
            .rev()
            .copied()
            .find(|size| *size < self.0)
            .map(Self)
            .unwrap_or(*self)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(20)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        Self::new(size).ok_or_else(|| {
            format!("page size {} is not one of {:?}", size, Self::ALLOWED)
        })
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> u32 {
        size.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub page_size: PageSize,
    pub total: u64,
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_size,
            total: 0,
        }
    }

    /// Number of pages, never less than one.
    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.page_size.get());
        let pages = self.total.div_ceil(size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether `page` lies inside the window for the current total.
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && (self.total == 0 || page <= self.total_pages())
    }

    /// Pull `page` back inside the window. Returns whether it moved.
    pub fn clamp(&mut self) -> bool {
        let last = self.total_pages();
        let clamped = self.page.clamp(1, last);
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    /// 1-based index of the first row on this page, 0 when empty.
    pub fn first_row(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            u64::from(self.page - 1) * u64::from(self.page_size.get()) + 1
        }
    }

    pub fn last_row(&self, rows_on_page: usize) -> u64 {
        if rows_on_page == 0 {
            self.first_row()
        } else {
            self.first_row() + rows_on_page as u64 - 1
        }
    }
}

// ============================================================================
// STATUS COUNTS
// ============================================================================

/// Per-state row counts. Every state has an entry, and the aggregate entry is
/// always the sum of the concrete ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCounts<S: Lifecycle> {
    counts: BTreeMap<S, u64>,
}

impl<S: Lifecycle> StatusCounts<S> {
    pub fn zeroed() -> Self {
        Self {
            counts: S::ALL.iter().map(|state| (*state, 0)).collect(),
        }
    }

    /// Build from the wire map. Unknown keys are ignored, missing states
    /// count as zero and any aggregate value sent by the server is replaced
    /// by the recomputed sum.
    pub fn from_wire(wire: &HashMap<String, u64>) -> Self {
        let mut counts = Self::zeroed();
        for (key, count) in wire {
            match S::parse(key) {
                Some(state) if !state.is_aggregate() => {
                    counts.counts.insert(state, *count);
                }
                _ => {}
            }
        }
        counts.recompute_aggregate();
        counts
    }

    fn recompute_aggregate(&mut self) {
        let sum = S::concrete()
            .map(|state| self.get(state))
            .fold(0u64, u64::saturating_add);
        self.counts.insert(S::AGGREGATE, sum);
    }

    pub fn get(&self, state: S) -> u64 {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    /// Entries in tab order.
    pub fn iter(&self) -> impl Iterator<Item = (S, u64)> + '_ {
        S::ALL.iter().map(move |state| (*state, self.get(*state)))
    }
}

impl<S: Lifecycle> Default for StatusCounts<S> {
    fn default() -> Self {
        Self::zeroed()
    }
}

// ============================================================================
// LIST STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ListState<Row, S: Lifecycle> {
    /// Rows in backend arrival order.
    pub items: Vec<Row>,
    pub pagination: Pagination,
    pub status_counts: StatusCounts<S>,
    pub loading: bool,
    pub error: Option<String>,
    /// Row whose AWB is being generated.
    pub generating_id: Option<String>,
}

impl<Row: Record, S: Lifecycle> ListState<Row, S> {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
            status_counts: StatusCounts::zeroed(),
            loading: false,
            error: None,
            generating_id: None,
        }
    }

    /// Replace items, total and counts from one successful response. The page
    /// is clamped into the new window; returns whether it had to move.
    pub fn apply_page(&mut self, items: Vec<Row>, total: u64, counts: StatusCounts<S>) -> bool {
        self.items = items;
        self.pagination.total = total;
        self.status_counts = counts;
        self.loading = false;
        self.error = None;
        self.pagination.clamp()
    }

    /// Record a failed fetch. Items and pagination are kept as they were.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.items.iter().find(|row| row.id() == id)
    }

    /// Attach an AWB to the row with `id`. Returns whether a row changed.
    pub fn patch_awb(&mut self, id: &str, awb: String) -> bool {
        self.items
            .iter_mut()
            .find(|row| row.id() == id)
            .map(|row| row.attach_awb(awb))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{ForwardState, PickupState};
    use crate::records::PickupRequest;

    #[test]
    fn page_size_accepts_only_allowed_values() {
        assert!(PageSize::new(20).is_some());
        assert!(PageSize::new(0).is_none());
        assert!(PageSize::new(25).is_none());
        assert_eq!(PageSize::default().get(), 20);
    }

    #[test]
    fn page_size_steps_saturate() {
        let smallest = PageSize::new(10).unwrap();
        let largest = PageSize::new(100).unwrap();
        assert_eq!(smallest.smaller(), smallest);
        assert_eq!(largest.larger(), largest);
        assert_eq!(smallest.larger().get(), 20);
        assert_eq!(largest.smaller().get(), 50);
    }

    #[test]
    fn page_size_rejects_bad_wire_values() {
        assert!(serde_json::from_str::<PageSize>("50").is_ok());
        assert!(serde_json::from_str::<PageSize>("7").is_err());
    }

    #[test]
    fn pagination_window() {
        let mut p = Pagination::new(PageSize::default());
        p.total = 41;
        assert_eq!(p.total_pages(), 3);
        assert!(p.contains(3));
        assert!(!p.contains(4));
        assert!(!p.contains(0));

        p.page = 3;
        assert_eq!(p.first_row(), 41);
        assert_eq!(p.last_row(1), 41);
    }

    #[test]
    fn clamp_pulls_page_back_after_total_shrinks() {
        let mut p = Pagination::new(PageSize::default());
        p.total = 100;
        p.page = 5;
        assert!(!p.clamp());

        p.total = 30;
        assert!(p.clamp());
        assert_eq!(p.page, 2);

        p.total = 0;
        assert!(p.clamp());
        assert_eq!(p.page, 1);
    }

    #[test]
    fn counts_fill_missing_and_recompute_aggregate() {
        let wire: HashMap<String, u64> = [
            ("pending".to_string(), 4),
            ("delivered".to_string(), 6),
            ("all_shipments".to_string(), 999),
            ("lost".to_string(), 3),
        ]
        .into_iter()
        .collect();

        let counts = StatusCounts::<ForwardState>::from_wire(&wire);
        assert_eq!(counts.get(ForwardState::Pending), 4);
        assert_eq!(counts.get(ForwardState::InTransit), 0);
        assert_eq!(counts.get(ForwardState::AllShipments), 10);
        assert_eq!(counts.iter().count(), ForwardState::ALL.len());
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut list: ListState<PickupRequest, PickupState> = ListState::new(PageSize::default());
        list.pagination.total = 7;
        list.loading = true;
        list.fail("boom");
        assert!(!list.loading);
        assert_eq!(list.error.as_deref(), Some("boom"));
        assert_eq!(list.pagination.total, 7);
    }
}
