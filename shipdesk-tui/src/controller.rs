//! Fetch controller: owns one resource's list state and every transition
//! that touches it.
//!
//! List fetches are split into `begin_fetch` (build the request, stamp a
//! sequence number) and `complete_fetch` (apply the response). Only the
//! response carrying the most recent sequence number is ever applied, so an
//! older request that resolves late cannot overwrite newer results.

use shipdesk_core::catalog;
use shipdesk_core::{
    translate, ApiError, BatchOutcome, CellValue, FilterValues, Lifecycle, ListRequest,
    ListResponse, ListState, PageSize, Record, Resource, ResourceApi, RowAction, SchemaRecord,
    SortDirection, SortSpec, StatusCounts, UploadFile, SEARCH_PARAM,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("No lifecycle state at position {0}")]
    UnknownState(usize),
    #[error("Page numbers start at 1 (got {0})")]
    InvalidPage(u32),
    #[error("Page {page} is outside 1..={pages}")]
    PageOutOfRange { page: u32, pages: u32 },
    #[error("Page size {0} is not one of 10, 20, 50, 100")]
    InvalidPageSize(u32),
    #[error("Filter '{param}' is not offered for {state}")]
    UndeclaredFilter { param: String, state: &'static str },
    #[error("Column '{0}' cannot be sorted")]
    UnsortableColumn(String),
    #[error("No rows selected")]
    NothingSelected,
    #[error("AWB generation already running for {0}")]
    AwbInProgress(String),
    #[error("Row {0} is not on this page")]
    UnknownRow(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ControllerError {
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// A list request stamped with its sequence number, ready to run off the UI
/// loop.
pub struct PendingFetch<R: Resource> {
    pub seq: u64,
    pub request: ListRequest,
    api: Arc<dyn ResourceApi<R>>,
}

impl<R: Resource> PendingFetch<R> {
    pub async fn run(self) -> FetchOutcome<R> {
        let result = self.api.list(&self.request).await;
        FetchOutcome {
            seq: self.seq,
            result,
        }
    }
}

impl<R: Resource> fmt::Debug for PendingFetch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("seq", &self.seq)
            .field("request", &self.request)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome<R: Resource> {
    pub seq: u64,
    pub result: Result<ListResponse<R::Row>, ApiError>,
}

pub struct FetchController<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    state: R::State,
    filters: FilterValues,
    list: ListState<R::Row, R::State>,
    /// Row ids, kept across pages of the same state.
    selected: BTreeSet<String>,
    /// Index into `visible_rows()`.
    focus: usize,
    sort: SortSpec,
    debounce: Duration,
    search_deadline: Option<Instant>,
    dirty: bool,
    seq: u64,
    latest_seq: Option<u64>,
}

impl<R: Resource> FetchController<R> {
    /// Starts on the first lifecycle state, dirty so the first tick fetches.
    pub fn new(api: Arc<dyn ResourceApi<R>>, page_size: PageSize, debounce: Duration) -> Self {
        let state = <R::State as Lifecycle>::ALL
            .first()
            .copied()
            .unwrap_or(<R::State as Lifecycle>::AGGREGATE);
        Self {
            api,
            state,
            filters: FilterValues::new(),
            list: ListState::new(page_size),
            selected: BTreeSet::new(),
            focus: 0,
            sort: R::schema(state).default_sort,
            debounce,
            search_deadline: None,
            dirty: true,
            seq: 0,
            latest_seq: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> R::State {
        self.state
    }

    pub fn schema(&self) -> &'static SchemaRecord<R> {
        R::schema(self.state)
    }

    pub fn list(&self) -> &ListState<R::Row, R::State> {
        &self.list
    }

    pub fn filters(&self) -> &FilterValues {
        &self.filters
    }

    pub fn search(&self) -> &str {
        self.filters.search()
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn search_pending(&self) -> bool {
        self.search_deadline.is_some()
    }

    pub fn status_counts(&self) -> &StatusCounts<R::State> {
        &self.list.status_counts
    }

    // ------------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------------

    /// Update the search term and restart the debounce window.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.set_search_at(text, Instant::now());
    }

    pub fn set_search_at(&mut self, text: impl Into<String>, now: Instant) {
        self.filters.set(SEARCH_PARAM, text);
        self.list.pagination.page = 1;
        self.search_deadline = Some(now + self.debounce);
    }

    /// Switch lifecycle state. Selection, focus and every filter except the
    /// search term are dropped; sort returns to the new state's default.
    pub fn set_status(&mut self, state: R::State) {
        self.state = state;
        self.list.pagination.page = 1;
        self.selected.clear();
        self.focus = 0;
        self.filters.retain_search();
        self.sort = R::schema(state).default_sort;
        self.search_deadline = None;
        self.dirty = true;
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ControllerError> {
        if page < 1 {
            return Err(ControllerError::InvalidPage(page));
        }
        if !self.list.pagination.contains(page) {
            return Err(ControllerError::PageOutOfRange {
                page,
                pages: self.list.pagination.total_pages(),
            });
        }
        self.list.pagination.page = page;
        self.focus = 0;
        self.dirty = true;
        Ok(())
    }

    pub fn set_page_size(&mut self, size: u32) -> Result<(), ControllerError> {
        let page_size = PageSize::new(size).ok_or(ControllerError::InvalidPageSize(size))?;
        self.list.pagination.page_size = page_size;
        self.list.pagination.page = 1;
        self.focus = 0;
        self.dirty = true;
        Ok(())
    }

    fn check_param(&self, param: &str) -> Result<(), ControllerError> {
        if self.schema().declares_param(param) {
            Ok(())
        } else {
            Err(ControllerError::UndeclaredFilter {
                param: param.to_string(),
                state: self.state.as_str(),
            })
        }
    }

    /// Set a date or select filter. A blank value clears it.
    pub fn set_filter(&mut self, param: &str, value: &str) -> Result<(), ControllerError> {
        self.check_param(param)?;
        if value.trim().is_empty() {
            self.filters.remove(param);
        } else {
            self.filters.set(param, value);
        }
        self.list.pagination.page = 1;
        self.dirty = true;
        Ok(())
    }

    pub fn clear_filter(&mut self, param: &str) -> Result<(), ControllerError> {
        self.check_param(param)?;
        self.filters.remove(param);
        self.list.pagination.page = 1;
        self.dirty = true;
        Ok(())
    }

    /// Advance a picker filter to its next catalog option, wrapping to unset.
    pub fn cycle_filter(&mut self, param: &str) -> Result<Option<&'static str>, ControllerError> {
        self.check_param(param)?;
        let source = self.schema().filter(param).and_then(|f| f.option_source());
        let Some(source) = source else {
            return Ok(None);
        };
        let next = catalog::next_value(source, self.filters.get(param));
        match next {
            Some(value) => self.set_filter(param, value)?,
            None => self.clear_filter(param)?,
        }
        Ok(next)
    }

    /// Force a refetch with the current parameters.
    pub fn refresh(&mut self) {
        self.dirty = true;
    }

    // ------------------------------------------------------------------------
    // Fetch lifecycle
    // ------------------------------------------------------------------------

    /// A fetch to run now, if the controller is dirty or the search debounce
    /// has elapsed.
    pub fn next_fetch(&mut self, now: Instant) -> Option<PendingFetch<R>> {
        let debounce_due = self.search_deadline.is_some_and(|deadline| now >= deadline);
        if self.dirty || debounce_due {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    pub fn build_request(&self) -> ListRequest {
        let query = translate(&self.schema().filters, &self.filters);
        ListRequest::new(self.state, &self.list.pagination, query)
    }

    /// Stamp a new request. Any fetch still in flight becomes stale.
    pub fn begin_fetch(&mut self) -> PendingFetch<R> {
        self.seq += 1;
        self.latest_seq = Some(self.seq);
        self.dirty = false;
        self.search_deadline = None;
        self.list.loading = true;

        let request = self.build_request();
        debug!(
            resource = %R::KIND,
            seq = self.seq,
            status = request.status,
            page = request.page,
            page_size = request.page_size,
            "Dispatching list fetch"
        );

        PendingFetch {
            seq: self.seq,
            request,
            api: Arc::clone(&self.api),
        }
    }

    /// Apply a finished fetch. Returns `false` when the outcome was stale and
    /// discarded.
    pub fn complete_fetch(&mut self, outcome: FetchOutcome<R>) -> bool {
        if self.latest_seq != Some(outcome.seq) {
            debug!(
                resource = %R::KIND,
                seq = outcome.seq,
                latest = ?self.latest_seq,
                "Discarding stale list response"
            );
            return false;
        }

        match outcome.result {
            Ok(response) => {
                let counts = StatusCounts::from_wire(&response.status_counts);
                let moved = self
                    .list
                    .apply_page(response.items, response.pagination.total, counts);
                if moved {
                    debug!(
                        resource = %R::KIND,
                        page = self.list.pagination.page,
                        "Page fell outside the result window, refetching"
                    );
                    self.dirty = true;
                }
                self.clamp_focus();
            }
            Err(err) => {
                warn!(resource = %R::KIND, seq = outcome.seq, error = %err, "List fetch failed");
                self.list.fail(err.user_message());
            }
        }
        true
    }

    /// Run one list fetch to completion on the caller's task.
    pub async fn fetch_list(&mut self) -> bool {
        let pending = self.begin_fetch();
        let outcome = pending.run().await;
        self.complete_fetch(outcome)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Generate an AWB for one row and attach it in place. Total and counts
    /// are left alone; the failure is returned instead of stored. A list
    /// fetch still in flight predates the patch, so it is superseded by a
    /// fresh one on the next tick.
    pub async fn generate_awb(&mut self, id: &str) -> Result<String, ControllerError> {
        if let Some(running) = &self.list.generating_id {
            return Err(ControllerError::AwbInProgress(running.clone()));
        }
        if self.list.row(id).is_none() {
            return Err(ControllerError::UnknownRow(id.to_string()));
        }

        self.list.generating_id = Some(id.to_string());
        let result = self.api.generate_awb(id).await;
        self.list.generating_id = None;

        match result {
            Ok(response) => {
                info!(resource = %R::KIND, id, awb = %response.awb_number, "AWB generated");
                self.list.patch_awb(id, response.awb_number.clone());
                if self.list.loading {
                    self.dirty = true;
                }
                Ok(response.awb_number)
            }
            Err(err) => {
                warn!(resource = %R::KIND, id, error = %err, "AWB generation failed");
                Err(err.into())
            }
        }
    }

    /// Manifest `ids`, then refetch the list. Partial failures come back in
    /// the outcome.
    pub async fn manifest_orders(&mut self, ids: Vec<String>) -> Result<BatchOutcome, ControllerError> {
        if ids.is_empty() {
            return Err(ControllerError::NothingSelected);
        }
        let outcome = self.api.manifest(&ids).await.map_err(|err| {
            warn!(resource = %R::KIND, count = ids.len(), error = %err, "Manifest failed");
            ControllerError::from(err)
        })?;
        info!(
            resource = %R::KIND,
            successful = outcome.summary.successful,
            failed = outcome.summary.failed,
            "Manifest finished"
        );
        for row in &outcome.successful {
            self.selected.remove(&row.id);
        }
        self.fetch_list().await;
        Ok(outcome)
    }

    pub async fn manifest_selected(&mut self) -> Result<BatchOutcome, ControllerError> {
        let ids: Vec<String> = self.selected.iter().cloned().collect();
        self.manifest_orders(ids).await
    }

    /// Upload a batch file, then refetch the list.
    pub async fn bulk_upload(&mut self, file: UploadFile) -> Result<BatchOutcome, ControllerError> {
        let file_name = file.file_name.clone();
        let outcome = self.api.bulk_upload(file).await.map_err(|err| {
            warn!(resource = %R::KIND, file = %file_name, error = %err, "Bulk upload failed");
            ControllerError::from(err)
        })?;
        info!(
            resource = %R::KIND,
            file = %file_name,
            successful = outcome.summary.successful,
            failed = outcome.summary.failed,
            "Bulk upload finished"
        );
        self.fetch_list().await;
        Ok(outcome)
    }

    // ------------------------------------------------------------------------
    // Selection and focus
    // ------------------------------------------------------------------------

    pub fn toggle_row(&mut self, id: &str) -> Result<bool, ControllerError> {
        if self.list.row(id).is_none() {
            return Err(ControllerError::UnknownRow(id.to_string()));
        }
        if self.selected.remove(id) {
            Ok(false)
        } else {
            self.selected.insert(id.to_string());
            Ok(true)
        }
    }

    pub fn toggle_focused(&mut self) -> Result<bool, ControllerError> {
        let id = self
            .focused_row()
            .map(|row| row.id().to_string())
            .ok_or(ControllerError::NothingSelected)?;
        self.toggle_row(&id)
    }

    /// Select every row on the page, or clear them if all are selected.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<String> = self.list.items.iter().map(|r| r.id().to_string()).collect();
        if ids.iter().all(|id| self.selected.contains(id)) {
            for id in &ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn focus_next(&mut self) {
        if self.focus + 1 < self.list.items.len() {
            self.focus += 1;
        }
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    fn clamp_focus(&mut self) {
        self.focus = self.focus.min(self.list.items.len().saturating_sub(1));
    }

    pub fn focused_row(&self) -> Option<&R::Row> {
        self.visible_rows().get(self.focus).copied()
    }

    /// Action bound to `hotkey` if the active schema offers it and the
    /// focused row qualifies.
    pub fn action_for_hotkey(&self, hotkey: char) -> Option<(R::Action, &R::Row)> {
        let action = self.schema().action_for_hotkey(hotkey)?;
        let row = self.focused_row()?;
        action.available_for(row).then_some((action, row))
    }

    // ------------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------------

    pub fn apply_sort(&mut self, intent: SortSpec) -> Result<(), ControllerError> {
        match self.schema().column(intent.column_id) {
            Some(column) if column.sortable => {
                self.sort = intent;
                Ok(())
            }
            _ => Err(ControllerError::UnsortableColumn(intent.column_id.to_string())),
        }
    }

    /// Items ordered by the active sort. Stable, and empty cells stay last in
    /// either direction.
    pub fn visible_rows(&self) -> Vec<&R::Row> {
        let mut rows: Vec<&R::Row> = self.list.items.iter().collect();
        if let Some(column) = self.schema().column(self.sort.column_id) {
            let direction = self.sort.direction;
            rows.sort_by(|a, b| sort_cells(&column.value(a), &column.value(b), direction));
        }
        rows
    }
}

fn sort_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => a.compare(b).reverse(),
        },
    }
}
