use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use shipdesk_core::{ForwardState, Lifecycle, ReverseState, SortDirection, SortSpec, StatusCounts};
use shipdesk_test_utils::assertions::{assert_counts_consistent, assert_page_in_window};
use shipdesk_test_utils::fixtures::{batch_outcome, pending_orders, pickup_request, reverse_order};
use shipdesk_test_utils::generators::{
    arb_forward_page, arb_page_size, arb_pickup_request, arb_pickup_state, arb_reverse_order,
    arb_reverse_state, arb_wire_counts,
};
use shipdesk_test_utils::{
    ForwardOrders, MockResourceApi, PageSize, PickupRequests, PickupState, Resource,
    ReverseOrders,
};
use shipdesk_tui::config::{AuthConfig, ConfigError, ThemeConfig, TuiConfig};
use shipdesk_tui::controller::FetchController;
use shipdesk_tui::keys::{map_input_key, map_key, Action, InputKey};
use shipdesk_tui::nav::View;
use shipdesk_tui::notifications::{NotificationLevel, Notifications};
use shipdesk_tui::state::{apply_intent, key_intent, App, InputMode};
use shipdesk_tui::views::render_view;
use shipdesk_tui::views::table::{next_sort_column, visible_columns, TableIntent};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:8080".to_string(),
        auth: AuthConfig {
            api_key: Some("test-key".to_string()),
            jwt: None,
        },
        request_timeout_ms: 5_000,
        tick_ms: 100,
        search_debounce_ms: 300,
        default_page_size: 20,
        log_path: "tmp/shipdesk-tui.log".into(),
        log_filter: None,
        theme: ThemeConfig {
            name: "dispatch".to_string(),
        },
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

struct Backends {
    orders: Arc<MockResourceApi<ForwardOrders>>,
    pickups: Arc<MockResourceApi<PickupRequests>>,
}

/// App over three pending orders and two scheduled pickups, with the order list
/// already loaded.
async fn loaded_app() -> (App, Backends) {
    let orders = Arc::new(MockResourceApi::<ForwardOrders>::with_rows(pending_orders(3)));
    let returns = Arc::new(MockResourceApi::<ReverseOrders>::with_rows(Vec::new()));
    let pickups = Arc::new(MockResourceApi::<PickupRequests>::with_rows(vec![
        pickup_request("PU001", PickupState::Scheduled),
        pickup_request("PU002", PickupState::Scheduled),
    ]));
    let mut app = App::new(base_config(), orders.clone(), returns, pickups.clone());
    assert!(app.orders.fetch_list().await);
    (app, Backends { orders, pickups })
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const VALID_TOML: &str = r#"
api_base_url = "https://ship.example.com"
request_timeout_ms = 5000
tick_ms = 100
default_page_size = 50
log_path = "tmp/shipdesk.log"

[auth]
api_key = "key-1"

[theme]
name = "Dispatch"
"#;

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_loads_from_toml_with_default_debounce() {
    let file = write_config(VALID_TOML);
    let config = TuiConfig::from_path(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.search_debounce(), Duration::from_millis(300));
    assert_eq!(config.page_size().get(), 50);
    assert_eq!(config.log_filter, None);
}

#[test]
fn config_rejects_unknown_fields() {
    let file = write_config(&VALID_TOML.replace("[auth]", "refresh_interval_ms = 10\n\n[auth]"));
    assert!(matches!(TuiConfig::from_path(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn config_requires_auth() {
    let mut config = base_config();
    config.auth = AuthConfig {
        api_key: None,
        jwt: None,
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "auth", .. })
    ));
}

#[test]
fn config_rejects_page_size_outside_allowed_set() {
    let mut config = base_config();
    config.default_page_size = 25;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue {
            field: "default_page_size",
            ..
        })
    ));
}

#[test]
fn config_rejects_tick_slower_than_debounce() {
    let mut config = base_config();
    config.tick_ms = 500;
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "ftp://ship.example.com".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_theme_name() {
    let mut config = base_config();
    config.theme = ThemeConfig {
        name: "unknown".to_string(),
    };
    assert!(config.validate().is_err());
}

// ============================================================================
// Keys and navigation
// ============================================================================

#[test]
fn uppercase_letters_are_row_actions_except_sort_toggle() {
    assert_eq!(map_key(char_key('A')), Some(Action::RowAction('A')));
    assert_eq!(map_key(char_key('D')), Some(Action::RowAction('D')));
    assert_eq!(map_key(char_key('S')), Some(Action::ToggleSortDirection));
    assert_eq!(map_key(char_key('s')), Some(Action::NextSortColumn));
}

#[test]
fn control_keys_quit_and_refresh() {
    let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
    assert_eq!(map_key(ctrl('c')), Some(Action::Quit));
    assert_eq!(map_key(ctrl('r')), Some(Action::Refresh));
    assert_eq!(map_key(ctrl('x')), None);
}

#[test]
fn prompt_keys_capture_letters() {
    assert_eq!(map_input_key(char_key('q')), Some(InputKey::Char('q')));
    assert_eq!(map_input_key(key(KeyCode::Backspace)), Some(InputKey::Backspace));
    assert_eq!(map_input_key(key(KeyCode::Enter)), Some(InputKey::Submit));
    assert_eq!(map_input_key(key(KeyCode::Esc)), Some(InputKey::Cancel));
    assert_eq!(map_input_key(key(KeyCode::Left)), None);
}

#[test]
fn notifications_are_bounded() {
    let mut notifications = Notifications::default();
    for n in 0..(Notifications::CAPACITY + 5) {
        notifications.push(NotificationLevel::Info, format!("note {}", n));
    }
    assert_eq!(notifications.len(), Notifications::CAPACITY);
    assert_eq!(
        notifications.last().map(|note| note.message.as_str()),
        Some("note 54")
    );
}

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let expected = match ch {
            '1' => Some(Action::SwitchView(0)),
            '2' => Some(Action::SwitchView(1)),
            '3' => Some(Action::SwitchView(2)),
            _ => None,
        };
        prop_assert_eq!(map_key(char_key(ch)), expected);
    }

    #[test]
    fn view_next_and_previous_are_inverse(index in 0usize..3) {
        let view = View::from_index(index).unwrap();
        prop_assert_eq!(view.next().previous(), view);
        prop_assert_eq!(View::from_index(view.index()), Some(view));
    }

    #[test]
    fn narrow_terminals_only_drop_columns(width in 40u16..200) {
        let schema = ForwardOrders::schema(ForwardState::Pending);
        let narrow = visible_columns(schema, width);
        let wide = visible_columns(schema, width.saturating_add(40));
        prop_assert!(narrow.len() <= wide.len());
        prop_assert_eq!(narrow.first().map(|c| c.id), Some("order_id"));
    }

    #[test]
    fn next_sort_column_stays_visible_and_sortable(width in 40u16..200) {
        let schema = ForwardOrders::schema(ForwardState::Pending);
        let next = next_sort_column(schema, "order_date", width).unwrap();
        let column = schema.column(next).unwrap();
        prop_assert!(column.sortable);
        prop_assert!(column.visible_at(width));
    }

    #[test]
    fn status_tabs_wrap_in_both_directions(index in 0usize..5) {
        let api = Arc::new(MockResourceApi::<ForwardOrders>::with_rows(Vec::new()));
        let mut controller: FetchController<ForwardOrders> =
            FetchController::new(api, PageSize::default(), Duration::from_millis(300));
        let all = ForwardState::ALL;
        let state = all[index % all.len()];
        controller.set_status(state);

        let next = key_intent(&controller, Action::NextStatus, 120);
        prop_assert_eq!(next, Some(TableIntent::SetStatus((state.ordinal() + 1) % all.len())));
        apply_intent(&mut controller, TableIntent::SetStatus((state.ordinal() + 1) % all.len())).unwrap();
        let back = key_intent(&controller, Action::PrevStatus, 120);
        prop_assert_eq!(back, Some(TableIntent::SetStatus(state.ordinal())));
    }
}

// ============================================================================
// Table intents
// ============================================================================

#[test]
fn narrow_terminal_hides_order_date() {
    let schema = ForwardOrders::schema(ForwardState::Pending);
    let ids = |width| {
        visible_columns(schema, width)
            .into_iter()
            .map(|column| column.id)
            .collect::<Vec<_>>()
    };
    assert!(!ids(80).contains(&"order_date"));
    assert!(ids(200).contains(&"order_date"));
    assert_eq!(next_sort_column(schema, "order_date", 80), Some("order_id"));
}

#[tokio::test]
async fn page_keys_stop_at_the_window_edges() {
    let (app, _) = loaded_app().await;
    assert_eq!(key_intent(&app.orders, Action::PrevPage, 120), None);
    assert_eq!(key_intent(&app.orders, Action::NextPage, 120), None);
    assert_eq!(
        key_intent(&app.orders, Action::LargerPageSize, 120),
        Some(TableIntent::SetPageSize(50))
    );
    assert_eq!(
        key_intent(&app.orders, Action::SmallerPageSize, 120),
        Some(TableIntent::SetPageSize(10))
    );
}

#[tokio::test]
async fn sort_toggle_intent_flips_direction() {
    let (mut app, _) = loaded_app().await;
    let intent = key_intent(&app.orders, Action::ToggleSortDirection, 120).unwrap();
    assert_eq!(
        intent,
        TableIntent::Sort(SortSpec::new("order_date", SortDirection::Asc))
    );
    apply_intent(&mut app.orders, intent).unwrap();
    let ids: Vec<&str> = app
        .orders
        .visible_rows()
        .into_iter()
        .map(|order| order.order_id.as_str())
        .collect();
    assert_eq!(ids, vec!["ORD001", "ORD002", "ORD003"]);
}

#[tokio::test]
async fn toggle_intent_targets_the_focused_row() {
    let (app, _) = loaded_app().await;
    // Default sort is newest first.
    assert_eq!(
        key_intent(&app.orders, Action::ToggleSelect, 120),
        Some(TableIntent::ToggleRow("ORD003".to_string()))
    );
}

// ============================================================================
// App key handling
// ============================================================================

#[tokio::test]
async fn awb_hotkey_generates_for_focused_row() {
    let (mut app, backends) = loaded_app().await;
    assert!(!app.handle_key(char_key('A')).await);

    assert_eq!(backends.orders.awb_calls(), vec!["ORD003".to_string()]);
    let note = app.notifications.last().unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert!(note.message.contains("AWB-ORD003-1234"));
    let order = app.orders.list().items.iter().find(|o| o.order_id == "ORD003").unwrap();
    assert_eq!(order.awb_number.as_deref(), Some("AWB-ORD003-1234"));
}

#[tokio::test]
async fn manifest_without_selection_reports_error() {
    let (mut app, backends) = loaded_app().await;
    app.handle_key(char_key('m')).await;

    assert!(backends.orders.manifest_calls().is_empty());
    assert_eq!(
        app.notifications.last().map(|note| note.level),
        Some(NotificationLevel::Error)
    );
    assert!(app.last_batch.is_none());
}

#[tokio::test]
async fn manifest_selected_rows_opens_batch_report() {
    let (mut app, backends) = loaded_app().await;
    backends
        .orders
        .script_manifest(Ok(batch_outcome(&["ORD003"], &["ORD002"])));
    app.handle_key(char_key(' ')).await;
    app.handle_key(char_key('j')).await;
    app.handle_key(char_key(' ')).await;
    app.handle_key(char_key('m')).await;

    assert_eq!(
        backends.orders.manifest_calls(),
        vec![vec!["ORD002".to_string(), "ORD003".to_string()]]
    );
    let report = app.last_batch.as_ref().unwrap();
    assert_eq!(report.operation, "Manifest");
    assert_eq!(report.outcome.summary.failed, 1);
    assert_eq!(
        app.notifications.last().map(|note| note.level),
        Some(NotificationLevel::Warning)
    );

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(app.last_batch.is_none());
}

#[tokio::test]
async fn search_prompt_updates_term_and_keeps_it_on_close() {
    let (mut app, _) = loaded_app().await;
    app.handle_key(char_key('/')).await;
    for c in "ord2".chars() {
        app.handle_key(char_key(c)).await;
    }
    app.handle_key(key(KeyCode::Backspace)).await;
    assert_eq!(app.input, InputMode::Search("ord".to_string()));
    assert_eq!(app.orders.search(), "ord");
    assert!(app.orders.search_pending());

    app.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(app.input, InputMode::Normal);
    assert_eq!(app.active_search(), "ord");
}

#[tokio::test]
async fn filter_keys_walk_pickers_and_cycle_values() {
    let (mut app, _) = loaded_app().await;
    assert_eq!(app.focused_filter_param(), Some("order_date"));
    app.handle_key(char_key('f')).await;
    app.handle_key(char_key('f')).await;
    assert_eq!(app.focused_filter_param(), Some("payment_mode"));

    app.handle_key(char_key('v')).await;
    assert_eq!(app.orders.filters().get("payment_mode"), Some("prepaid"));
    assert!(app.orders.is_dirty());

    app.handle_key(char_key('x')).await;
    assert_eq!(app.orders.filters().get("payment_mode"), None);
}

#[tokio::test]
async fn status_switch_resets_filter_focus() {
    let (mut app, _) = loaded_app().await;
    app.handle_key(char_key('f')).await;
    app.handle_key(char_key(']')).await;
    assert_eq!(app.focused_filter, 0);
    assert_ne!(app.orders.state(), ForwardState::Pending);
}

#[tokio::test]
async fn upload_is_refused_for_pickups() {
    let (mut app, backends) = loaded_app().await;
    app.handle_key(char_key('3')).await;
    assert_eq!(app.active_view, View::Pickups);

    app.handle_key(char_key('u')).await;
    assert_eq!(app.input, InputMode::Normal);
    assert_eq!(
        app.notifications.last().map(|note| note.level),
        Some(NotificationLevel::Warning)
    );
    assert!(backends.pickups.upload_calls().is_empty());
}

#[tokio::test]
async fn upload_reads_file_and_reports_batch() {
    let (mut app, backends) = loaded_app().await;
    let file = write_config("order_id,customer\nORD900,Asha\n");
    let path = file.path().to_string_lossy().into_owned();
    app.submit_upload(&path).await;

    let uploads = backends.orders.upload_calls();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].bytes.starts_with(b"order_id"));
    assert_eq!(app.last_batch.as_ref().map(|r| r.operation), Some("Bulk upload"));
}

#[tokio::test]
async fn missing_upload_file_is_reported() {
    let (mut app, backends) = loaded_app().await;
    app.submit_upload("/definitely/not/here.csv").await;
    assert!(backends.orders.upload_calls().is_empty());
    assert_eq!(
        app.notifications.last().map(|note| note.level),
        Some(NotificationLevel::Error)
    );
}

#[tokio::test]
async fn quit_key_ends_the_loop() {
    let (mut app, _) = loaded_app().await;
    assert!(app.handle_key(char_key('q')).await);
}

// ============================================================================
// Rendering
// ============================================================================

fn rendered_text(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| render_view(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[tokio::test]
async fn render_shows_rows_and_header() {
    let (mut app, _) = loaded_app().await;
    app.width = 160;
    let text = rendered_text(&app, 160, 40);
    assert!(text.contains("SHIPDESK"));
    assert!(text.contains("ORD001"));
    assert!(text.contains("ORD003"));
}

#[tokio::test]
async fn render_shows_detail_and_batch_panels() {
    let (mut app, backends) = loaded_app().await;
    backends
        .orders
        .script_manifest(Ok(batch_outcome(&["ORD003"], &[])));
    app.handle_key(char_key(' ')).await;
    app.handle_key(char_key('m')).await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.detail_open);

    let text = rendered_text(&app, 160, 48);
    assert!(text.contains("Details"));
    assert!(text.contains("Succeeded"));
}

#[tokio::test]
async fn render_empty_table_says_so() {
    let orders = Arc::new(MockResourceApi::<ForwardOrders>::with_rows(Vec::new()));
    let returns = Arc::new(MockResourceApi::<ReverseOrders>::with_rows(Vec::new()));
    let pickups = Arc::new(MockResourceApi::<PickupRequests>::with_rows(Vec::new()));
    let mut app = App::new(base_config(), orders, returns, pickups);
    app.orders.fetch_list().await;
    let text = rendered_text(&app, 120, 30);
    assert!(text.contains("in Pending"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn render_never_panics_on_generated_pages(rows in arb_forward_page(12), width in 60u16..200) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let app = runtime.block_on(async {
            let orders = Arc::new(MockResourceApi::<ForwardOrders>::with_rows(rows));
            let returns = Arc::new(MockResourceApi::<ReverseOrders>::with_rows(Vec::new()));
            let pickups = Arc::new(MockResourceApi::<PickupRequests>::with_rows(Vec::new()));
            let mut app = App::new(base_config(), orders, returns, pickups);
            app.width = width;
            app.orders.fetch_list().await;
            app
        });
        let text = rendered_text(&app, width, 40);
        prop_assert!(text.contains("SHIPDESK"));
    }
}

// ============================================================================
// Returns and pickups
// ============================================================================

fn returns_and_pickups_app(
    returns: Vec<shipdesk_test_utils::ReverseOrder>,
    pickups: Vec<shipdesk_test_utils::PickupRequest>,
) -> App {
    let orders = Arc::new(MockResourceApi::<ForwardOrders>::with_rows(Vec::new()));
    let returns = Arc::new(MockResourceApi::<ReverseOrders>::with_rows(returns));
    let pickups = Arc::new(MockResourceApi::<PickupRequests>::with_rows(pickups));
    App::new(base_config(), orders, returns, pickups)
}

#[tokio::test]
async fn returns_tab_renders_its_own_rows() {
    let mut app = returns_and_pickups_app(
        vec![
            reverse_order("RET001", ReverseState::Pending),
            reverse_order("RET002", ReverseState::Pending),
        ],
        Vec::new(),
    );
    app.handle_key(char_key('2')).await;
    assert_eq!(app.active_view, View::Returns);
    assert!(app.returns.fetch_list().await);

    assert_eq!(app.returns.list().pagination.total, 2);
    assert_counts_consistent(app.returns.status_counts());
    let text = rendered_text(&app, 160, 40);
    assert!(text.contains("RET001"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn wire_counts_always_recompute_the_aggregate(
        reverse in arb_wire_counts::<ReverseState>(),
        pickup in arb_wire_counts::<PickupState>(),
    ) {
        assert_counts_consistent(&StatusCounts::<ReverseState>::from_wire(&reverse));
        assert_counts_consistent(&StatusCounts::<PickupState>::from_wire(&pickup));
    }

    #[test]
    fn page_size_keys_stay_in_allowed_set(size in arb_page_size()) {
        let api = Arc::new(MockResourceApi::<ReverseOrders>::with_rows(Vec::new()));
        let mut controller: FetchController<ReverseOrders> =
            FetchController::new(api, size, Duration::from_millis(300));
        for action in [Action::LargerPageSize, Action::SmallerPageSize] {
            if let Some(intent) = key_intent(&controller, action, 120) {
                apply_intent(&mut controller, intent).unwrap();
            }
            let current = controller.list().pagination.page_size.get();
            prop_assert!(PageSize::ALLOWED.contains(&current));
            prop_assert_eq!(controller.list().pagination.page, 1);
        }
    }

    #[test]
    fn generated_returns_and_pickups_load_into_the_window(
        returns in prop::collection::vec(arb_reverse_order(), 0..30),
        pickups in prop::collection::vec(arb_pickup_request(), 0..30),
        reverse_state in arb_reverse_state(),
        pickup_state in arb_pickup_state(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let expected = (returns.len() as u64, pickups.len() as u64);
        let app = runtime.block_on(async {
            let mut app = returns_and_pickups_app(returns, pickups);
            app.returns.set_status(reverse_state);
            app.pickups.set_status(pickup_state);
            app.returns.fetch_list().await;
            app.pickups.fetch_list().await;
            app
        });

        prop_assert_eq!(app.returns.list().pagination.total, expected.0);
        prop_assert_eq!(app.pickups.list().pagination.total, expected.1);
        prop_assert!(app.returns.list().items.len() <= 20);
        assert_page_in_window(&app.returns.list().pagination);
        assert_page_in_window(&app.pickups.list().pagination);
        assert_counts_consistent(app.pickups.status_counts());
    }
}
