//! Application state and key dispatch.

use crate::config::TuiConfig;
use crate::controller::{ControllerError, FetchController, FetchOutcome, PendingFetch};
use crate::events::TuiEvent;
use crate::keys::{map_input_key, map_key, Action, InputKey};
use crate::nav::View;
use crate::notifications::{NotificationLevel, Notifications};
use crate::theme::DispatchTheme;
use crate::views::table::{next_sort_column, sort_intent, TableIntent};
use crossterm::event::KeyEvent;
use shipdesk_core::{
    ActionEffect, BatchOutcome, ForwardOrders, Lifecycle, PickupRequests, Record, Resource,
    ResourceApi, ResourceKind, ReverseOrders, RowAction, UploadFile,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search filter; every keystroke restarts the debounce.
    Search(String),
    /// Typing the path of a file to bulk upload.
    UploadPath(String),
}

/// Result of the last manifest or bulk upload, shown until dismissed.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub resource: ResourceKind,
    pub operation: &'static str,
    pub outcome: BatchOutcome,
}

/// What a table key did, for the app to surface.
#[derive(Debug)]
enum Feedback {
    Nothing,
    Notice(NotificationLevel, String),
    Batch(BatchReport),
    OpenDetail,
}

impl From<ControllerError> for Feedback {
    fn from(err: ControllerError) -> Self {
        Feedback::Notice(NotificationLevel::Error, err.user_message())
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: DispatchTheme,
    pub active_view: View,
    pub orders: FetchController<ForwardOrders>,
    pub returns: FetchController<ReverseOrders>,
    pub pickups: FetchController<PickupRequests>,
    pub input: InputMode,
    /// Position among the active schema's picker filters.
    pub focused_filter: usize,
    pub detail_open: bool,
    pub notifications: Notifications,
    pub last_batch: Option<BatchReport>,
    /// Terminal width, drives responsive column hiding.
    pub width: u16,
}

impl App {
    pub fn new(
        config: TuiConfig,
        orders_api: Arc<dyn ResourceApi<ForwardOrders>>,
        returns_api: Arc<dyn ResourceApi<ReverseOrders>>,
        pickups_api: Arc<dyn ResourceApi<PickupRequests>>,
    ) -> Self {
        let page_size = config.page_size();
        let debounce = config.search_debounce();
        Self {
            theme: DispatchTheme::dispatch(),
            active_view: View::Orders,
            orders: FetchController::new(orders_api, page_size, debounce),
            returns: FetchController::new(returns_api, page_size, debounce),
            pickups: FetchController::new(pickups_api, page_size, debounce),
            input: InputMode::Normal,
            focused_filter: 0,
            detail_open: false,
            notifications: Notifications::default(),
            last_batch: None,
            width: 120,
            config,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(level, message);
    }

    /// Param of the picker filter `f`/`v`/`x` act on, if the active state has any.
    pub fn focused_filter_param(&self) -> Option<&'static str> {
        match self.active_view {
            View::Orders => picker_param(&self.orders, self.focused_filter),
            View::Returns => picker_param(&self.returns, self.focused_filter),
            View::Pickups => picker_param(&self.pickups, self.focused_filter),
        }
    }

    pub fn active_search(&self) -> &str {
        match self.active_view {
            View::Orders => self.orders.search(),
            View::Returns => self.returns.search(),
            View::Pickups => self.pickups.search(),
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Apply one loop event. Returns `true` when the app should exit.
    pub async fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Input(key) => return self.handle_key(key).await,
            TuiEvent::Resize { width, .. } => self.width = width,
            TuiEvent::OrdersFetched(outcome) => {
                self.orders.complete_fetch(outcome);
            }
            TuiEvent::ReturnsFetched(outcome) => {
                self.returns.complete_fetch(outcome);
            }
            TuiEvent::PickupsFetched(outcome) => {
                self.pickups.complete_fetch(outcome);
            }
            TuiEvent::Tick => {}
        }
        false
    }

    /// Spawn a list fetch for every controller that is dirty or whose search
    /// debounce has elapsed. Results come back through `sender`.
    pub fn dispatch_fetches(&mut self, now: Instant, sender: &mpsc::Sender<TuiEvent>) {
        if let Some(pending) = self.orders.next_fetch(now) {
            spawn_fetch(pending, sender.clone(), TuiEvent::OrdersFetched);
        }
        if let Some(pending) = self.returns.next_fetch(now) {
            spawn_fetch(pending, sender.clone(), TuiEvent::ReturnsFetched);
        }
        if let Some(pending) = self.pickups.next_fetch(now) {
            spawn_fetch(pending, sender.clone(), TuiEvent::PickupsFetched);
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
        match std::mem::replace(&mut self.input, InputMode::Normal) {
            InputMode::Normal => {}
            InputMode::Search(buffer) => {
                if let Some(input) = map_input_key(key) {
                    self.handle_search_input(buffer, input);
                } else {
                    self.input = InputMode::Search(buffer);
                }
                return false;
            }
            InputMode::UploadPath(buffer) => {
                if let Some(input) = map_input_key(key) {
                    self.handle_upload_input(buffer, input).await;
                } else {
                    self.input = InputMode::UploadPath(buffer);
                }
                return false;
            }
        }

        match map_key(key) {
            Some(action) => self.handle_action(action).await,
            None => false,
        }
    }

    pub async fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextView => self.switch_view(self.active_view.next()),
            Action::PrevView => self.switch_view(self.active_view.previous()),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.switch_view(view);
                }
            }
            Action::OpenSearch => {
                self.input = InputMode::Search(self.active_search().to_string());
            }
            Action::OpenUpload => {
                if self.active_view.resource().supports_shipping() {
                    self.input = InputMode::UploadPath(String::new());
                } else {
                    self.notify(
                        NotificationLevel::Warning,
                        format!("Bulk upload is not available for {}", self.active_view.title()),
                    );
                }
            }
            Action::Confirm => self.detail_open = !self.detail_open,
            Action::Cancel => {
                if self.detail_open {
                    self.detail_open = false;
                } else {
                    self.last_batch = None;
                }
            }
            table_key => {
                let width = self.width;
                let feedback = match self.active_view {
                    View::Orders => {
                        table_action(&mut self.orders, &mut self.focused_filter, width, table_key).await
                    }
                    View::Returns => {
                        table_action(&mut self.returns, &mut self.focused_filter, width, table_key).await
                    }
                    View::Pickups => {
                        table_action(&mut self.pickups, &mut self.focused_filter, width, table_key).await
                    }
                };
                self.apply_feedback(feedback);
            }
        }
        false
    }

    fn switch_view(&mut self, view: View) {
        if view != self.active_view {
            self.active_view = view;
            self.focused_filter = 0;
            self.detail_open = false;
        }
    }

    fn apply_feedback(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Nothing => {}
            Feedback::Notice(level, message) => self.notify(level, message),
            Feedback::OpenDetail => self.detail_open = true,
            Feedback::Batch(report) => {
                let summary = &report.outcome.summary;
                let level = if report.outcome.has_failures() {
                    NotificationLevel::Warning
                } else {
                    NotificationLevel::Success
                };
                let message = format!(
                    "{}: {} of {} succeeded, {} failed",
                    report.operation, summary.successful, summary.total, summary.failed
                );
                self.notify(level, message);
                self.last_batch = Some(report);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------------

    fn handle_search_input(&mut self, mut buffer: String, input: InputKey) {
        match input {
            InputKey::Char(c) => buffer.push(c),
            InputKey::Backspace => {
                buffer.pop();
            }
            InputKey::Submit | InputKey::Cancel => return,
        }
        match self.active_view {
            View::Orders => self.orders.set_search(buffer.clone()),
            View::Returns => self.returns.set_search(buffer.clone()),
            View::Pickups => self.pickups.set_search(buffer.clone()),
        }
        self.input = InputMode::Search(buffer);
    }

    async fn handle_upload_input(&mut self, mut buffer: String, input: InputKey) {
        match input {
            InputKey::Char(c) => {
                buffer.push(c);
                self.input = InputMode::UploadPath(buffer);
            }
            InputKey::Backspace => {
                buffer.pop();
                self.input = InputMode::UploadPath(buffer);
            }
            InputKey::Cancel => {}
            InputKey::Submit => self.submit_upload(buffer.trim()).await,
        }
    }

    /// Read `path` and bulk upload it to the active resource.
    pub async fn submit_upload(&mut self, path: &str) {
        if path.is_empty() {
            self.notify(NotificationLevel::Warning, "No file given");
            return;
        }
        let file = match read_upload(Path::new(path)).await {
            Ok(file) => file,
            Err(err) => {
                warn!(path, error = %err, "Could not read upload file");
                self.notify(NotificationLevel::Error, format!("Cannot read {}: {}", path, err));
                return;
            }
        };

        let result = match self.active_view {
            View::Orders => self.orders.bulk_upload(file).await,
            View::Returns => self.returns.bulk_upload(file).await,
            View::Pickups => self.pickups.bulk_upload(file).await,
        };
        let feedback = match result {
            Ok(outcome) => Feedback::Batch(BatchReport {
                resource: self.active_view.resource(),
                operation: "Bulk upload",
                outcome,
            }),
            Err(err) => err.into(),
        };
        self.apply_feedback(feedback);
    }
}

async fn read_upload(path: &Path) -> std::io::Result<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    Ok(UploadFile { file_name, bytes })
}

fn spawn_fetch<R: Resource>(
    pending: PendingFetch<R>,
    sender: mpsc::Sender<TuiEvent>,
    wrap: fn(FetchOutcome<R>) -> TuiEvent,
) {
    tokio::spawn(async move {
        let outcome = pending.run().await;
        if sender.send(wrap(outcome)).await.is_err() {
            warn!(resource = %R::KIND, "Event loop gone, dropping list response");
        }
    });
}

fn picker_param<R: Resource>(controller: &FetchController<R>, index: usize) -> Option<&'static str> {
    let pickers: Vec<&'static str> = controller
        .schema()
        .filters
        .iter()
        .filter(|filter| filter.option_source().is_some())
        .map(|filter| filter.param.as_str())
        .collect();
    if pickers.is_empty() {
        None
    } else {
        Some(pickers[index % pickers.len()])
    }
}

/// Translate a table key into an intent, when it maps to one.
pub fn key_intent<R: Resource>(
    controller: &FetchController<R>,
    action: Action,
    width: u16,
) -> Option<TableIntent> {
    let all = <R::State as Lifecycle>::ALL;
    let ordinal = controller.state().ordinal();
    let pagination = controller.list().pagination;
    let schema = controller.schema();
    let sort = controller.sort();

    match action {
        Action::NextStatus => Some(TableIntent::SetStatus((ordinal + 1) % all.len())),
        Action::PrevStatus => Some(TableIntent::SetStatus((ordinal + all.len() - 1) % all.len())),
        Action::NextPage => {
            let next = pagination.page.saturating_add(1);
            (next <= pagination.total_pages()).then_some(TableIntent::GoToPage(next))
        }
        Action::PrevPage => (pagination.page > 1).then(|| TableIntent::GoToPage(pagination.page - 1)),
        Action::LargerPageSize => Some(TableIntent::SetPageSize(pagination.page_size.larger().get())),
        Action::SmallerPageSize => Some(TableIntent::SetPageSize(pagination.page_size.smaller().get())),
        Action::ToggleSelect => controller
            .focused_row()
            .map(|row| TableIntent::ToggleRow(row.id().to_string())),
        Action::SelectAll => Some(TableIntent::SelectAllVisible),
        Action::NextSortColumn => next_sort_column(schema, sort.column_id, width)
            .and_then(|column| sort_intent(schema, sort, column))
            .map(TableIntent::Sort),
        Action::ToggleSortDirection => sort_intent(schema, sort, sort.column_id).map(TableIntent::Sort),
        _ => None,
    }
}

pub fn apply_intent<R: Resource>(
    controller: &mut FetchController<R>,
    intent: TableIntent,
) -> Result<(), ControllerError> {
    match intent {
        TableIntent::Sort(spec) => controller.apply_sort(spec),
        TableIntent::ToggleRow(id) => controller.toggle_row(&id).map(|_| ()),
        TableIntent::SelectAllVisible => {
            controller.select_all_visible();
            Ok(())
        }
        TableIntent::GoToPage(page) => controller.set_page(page),
        TableIntent::SetPageSize(size) => controller.set_page_size(size),
        TableIntent::SetStatus(index) => {
            let state = <R::State as Lifecycle>::ALL
                .get(index)
                .copied()
                .ok_or(ControllerError::UnknownState(index))?;
            controller.set_status(state);
            Ok(())
        }
    }
}

async fn table_action<R: Resource>(
    controller: &mut FetchController<R>,
    focused_filter: &mut usize,
    width: u16,
    action: Action,
) -> Feedback {
    if let Some(intent) = key_intent(controller, action, width) {
        let resets_filter = matches!(intent, TableIntent::SetStatus(_));
        if let Err(err) = apply_intent(controller, intent) {
            return err.into();
        }
        if resets_filter {
            *focused_filter = 0;
        }
        return Feedback::Nothing;
    }

    match action {
        Action::MoveUp => controller.focus_previous(),
        Action::MoveDown => controller.focus_next(),
        Action::Refresh => controller.refresh(),
        Action::NextFilter => *focused_filter = focused_filter.wrapping_add(1),
        Action::CycleFilterValue => {
            let Some(param) = picker_param(controller, *focused_filter) else {
                return Feedback::Nothing;
            };
            if let Err(err) = controller.cycle_filter(param) {
                return err.into();
            }
        }
        Action::ClearFilter => {
            let Some(param) = picker_param(controller, *focused_filter) else {
                return Feedback::Nothing;
            };
            if let Err(err) = controller.clear_filter(param) {
                return err.into();
            }
        }
        Action::Manifest => {
            return match controller.manifest_selected().await {
                Ok(outcome) => Feedback::Batch(BatchReport {
                    resource: R::KIND,
                    operation: "Manifest",
                    outcome,
                }),
                Err(err) => err.into(),
            };
        }
        Action::RowAction(hotkey) => return row_action(controller, hotkey).await,
        _ => {}
    }
    Feedback::Nothing
}

async fn row_action<R: Resource>(controller: &mut FetchController<R>, hotkey: char) -> Feedback {
    let (action, id) = match controller.action_for_hotkey(hotkey) {
        Some((action, row)) => (action, row.id().to_string()),
        None => return Feedback::Nothing,
    };

    match action.effect() {
        ActionEffect::ViewDetails => Feedback::OpenDetail,
        ActionEffect::GenerateAwb => match controller.generate_awb(&id).await {
            Ok(awb) => Feedback::Notice(
                NotificationLevel::Success,
                format!("AWB {} generated for {}", awb, id),
            ),
            Err(err) => err.into(),
        },
        ActionEffect::Manifest => match controller.manifest_orders(vec![id]).await {
            Ok(outcome) => Feedback::Batch(BatchReport {
                resource: R::KIND,
                operation: action.label(),
                outcome,
            }),
            Err(err) => err.into(),
        },
        ActionEffect::External => Feedback::Notice(
            NotificationLevel::Info,
            format!("{} for {} opens outside the order table", action.label(), id),
        ),
    }
}
