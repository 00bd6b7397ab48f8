//! Shipdesk Test Utilities
//!
//! Shared test infrastructure for the Shipdesk workspace:
//! - A scriptable mock backend implementing `ResourceApi`
//! - Proptest generators for rows and lifecycle states
//! - Fixtures for the common order-table scenarios
//! - Assertions for list-state invariants

pub use shipdesk_core::{
    ApiError, AwbResponse, BatchOutcome, BatchRow, BatchSummary, ForwardOrder, ForwardOrders,
    ForwardState, Lifecycle, ListRequest, ListResponse, PageInfo, PageSize, Pagination,
    PickupRequest, PickupRequests, PickupState, Record, Resource, ResourceApi, ReverseOrder,
    ReverseOrders, ReverseState, StatusCounts, Timestamp, UploadFile,
};

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

// ============================================================================
// MOCK BACKEND
// ============================================================================

type ListHandler<Row> = Box<dyn Fn(&ListRequest) -> Result<ListResponse<Row>, ApiError> + Send + Sync>;

struct MockCalls {
    list: Vec<ListRequest>,
    awb: Vec<String>,
    manifest: Vec<Vec<String>>,
    upload: Vec<UploadFile>,
}

struct MockScript {
    awb: HashMap<String, Result<AwbResponse, ApiError>>,
    manifest: VecDeque<Result<BatchOutcome, ApiError>>,
    upload: VecDeque<Result<BatchOutcome, ApiError>>,
    /// Gates consumed by the next list calls, in order.
    list_gates: VecDeque<oneshot::Receiver<()>>,
}

/// In-memory backend for one resource.
///
/// List responses come from a handler evaluated against each request, so
/// replies can be told apart when two fetches overlap. `hold_next_list`
/// parks the next list call until the returned sender fires, which lets a
/// test complete requests out of order.
pub struct MockResourceApi<R: Resource> {
    handler: ListHandler<R::Row>,
    calls: Mutex<MockCalls>,
    script: Mutex<MockScript>,
}

impl<R: Resource> MockResourceApi<R> {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ListRequest) -> Result<ListResponse<R::Row>, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(MockCalls {
                list: Vec::new(),
                awb: Vec::new(),
                manifest: Vec::new(),
                upload: Vec::new(),
            }),
            script: Mutex::new(MockScript {
                awb: HashMap::new(),
                manifest: VecDeque::new(),
                upload: VecDeque::new(),
                list_gates: VecDeque::new(),
            }),
        }
    }

    /// Serve `rows` as a paged table. Search matches row ids
    /// case-insensitively; the requested status gets the matching count.
    pub fn with_rows(rows: Vec<R::Row>) -> Self {
        Self::new(move |request| {
            let needle = request.search.as_deref().unwrap_or("").to_lowercase();
            let matching: Vec<R::Row> = rows
                .iter()
                .filter(|row| needle.is_empty() || row.id().to_lowercase().contains(&needle))
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let size = request.page_size.max(1) as usize;
            let start = (request.page.max(1) as usize - 1) * size;
            let items = matching.into_iter().skip(start).take(size).collect();
            let mut counts = HashMap::new();
            counts.insert(request.status.to_string(), total);
            Ok(fixtures::list_response(items, request.page, request.page_size, total, counts))
        })
    }

    /// Fail every list call with `error`.
    pub fn failing(error: ApiError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn script_awb(&self, id: &str, result: Result<AwbResponse, ApiError>) {
        lock(&self.script).awb.insert(id.to_string(), result);
    }

    pub fn script_manifest(&self, result: Result<BatchOutcome, ApiError>) {
        lock(&self.script).manifest.push_back(result);
    }

    pub fn script_upload(&self, result: Result<BatchOutcome, ApiError>) {
        lock(&self.script).upload.push_back(result);
    }

    /// Park the next list call until the returned sender is fired or dropped.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.script).list_gates.push_back(rx);
        tx
    }

    pub fn list_requests(&self) -> Vec<ListRequest> {
        lock(&self.calls).list.clone()
    }

    pub fn list_calls(&self) -> usize {
        lock(&self.calls).list.len()
    }

    pub fn awb_calls(&self) -> Vec<String> {
        lock(&self.calls).awb.clone()
    }

    pub fn manifest_calls(&self) -> Vec<Vec<String>> {
        lock(&self.calls).manifest.clone()
    }

    pub fn upload_calls(&self) -> Vec<UploadFile> {
        lock(&self.calls).upload.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for MockResourceApi<R> {
    async fn list(&self, request: &ListRequest) -> Result<ListResponse<R::Row>, ApiError> {
        lock(&self.calls).list.push(request.clone());
        let gate = lock(&self.script).list_gates.pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        (self.handler)(request)
    }

    async fn generate_awb(&self, id: &str) -> Result<AwbResponse, ApiError> {
        lock(&self.calls).awb.push(id.to_string());
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("AWB generation"));
        }
        let scripted = lock(&self.script).awb.remove(id);
        scripted.unwrap_or_else(|| {
            Ok(AwbResponse {
                awb_number: format!("AWB-{}-1234", id),
            })
        })
    }

    async fn bulk_upload(&self, file: UploadFile) -> Result<BatchOutcome, ApiError> {
        lock(&self.calls).upload.push(file);
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("Bulk upload"));
        }
        let scripted = lock(&self.script).upload.pop_front();
        scripted.unwrap_or_else(|| Ok(BatchOutcome::default()))
    }

    async fn manifest(&self, ids: &[String]) -> Result<BatchOutcome, ApiError> {
        lock(&self.calls).manifest.push(ids.to_vec());
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("Manifest"));
        }
        let scripted = lock(&self.script).manifest.pop_front();
        scripted.unwrap_or_else(|| {
            let ok: Vec<&str> = ids.iter().map(String::as_str).collect();
            Ok(fixtures::batch_outcome(&ok, &[]))
        })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Shipdesk rows and lifecycle values.

    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    /// Generate a Timestamp within 2024-2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1704067200i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_forward_state() -> impl Strategy<Value = ForwardState> {
        prop::sample::select(ForwardState::ALL.to_vec())
    }

    pub fn arb_reverse_state() -> impl Strategy<Value = ReverseState> {
        prop::sample::select(ReverseState::ALL.to_vec())
    }

    pub fn arb_pickup_state() -> impl Strategy<Value = PickupState> {
        prop::sample::select(PickupState::ALL.to_vec())
    }

    pub fn arb_page_size() -> impl Strategy<Value = PageSize> {
        prop::sample::select(PageSize::ALLOWED.to_vec())
            .prop_map(|size| PageSize::new(size).unwrap_or_default())
    }

    /// Wire status-count maps, including unknown keys and a bogus aggregate.
    pub fn arb_wire_counts<S: Lifecycle>() -> impl Strategy<Value = HashMap<String, u64>> {
        let keys: Vec<String> = S::ALL.iter().map(|s| s.as_str().to_string()).collect();
        let key = prop_oneof![prop::sample::select(keys), "[a-z_]{1,10}"];
        prop::collection::hash_map(key, 0u64..50_000, 0..10)
    }

    fn arb_pincode() -> impl Strategy<Value = String> {
        "[1-8][0-9]{5}"
    }

    fn arb_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,10} [A-Z][a-z]{2,12}"
    }

    fn arb_awb() -> impl Strategy<Value = Option<String>> {
        prop::option::of("AWB[0-9]{8}")
    }

    fn arb_courier() -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop::sample::select(vec![
            "BlueDart".to_string(),
            "Delhivery".to_string(),
            "Ecom Express".to_string(),
            "XpressBees".to_string(),
        ]))
    }

    /// Generate a ForwardOrder with any combination of optional fields.
    pub fn arb_forward_order() -> impl Strategy<Value = ForwardOrder> {
        (
            (
                "ORD[0-9]{6}",
                arb_timestamp(),
                arb_name(),
                prop::option::of("[6-9][0-9]{9}"),
                "[A-Z][a-z]{3,10}",
                arb_pincode(),
                prop::sample::select(vec!["WH-DEL-01", "WH-BOM-01", "WH-BLR-01"]),
                prop::sample::select(vec!["prepaid", "cod"]),
                prop::sample::select(vec!["surface", "air", "express"]),
            ),
            (
                prop::option::of(prop::sample::select(vec!["A", "B", "C", "D", "E"])),
                0.0f64..100_000.0,
                0.05f64..50.0,
                arb_courier(),
                arb_awb(),
                arb_forward_state(),
                prop::option::of(arb_timestamp()),
                prop::option::of(arb_timestamp()),
                prop::option::of("[A-Za-z ]{0,40}"),
            ),
        )
            .prop_map(
                |(
                    (
                        order_id,
                        order_date,
                        customer_name,
                        customer_phone,
                        destination_city,
                        destination_pincode,
                        pickup_location,
                        payment_mode,
                        transport_mode,
                    ),
                    (zone, amount, weight_kg, courier, awb_number, status, pickup_date, delivered_at, last_update),
                )| ForwardOrder {
                    order_id,
                    order_date,
                    customer_name,
                    customer_phone,
                    destination_city,
                    destination_pincode,
                    pickup_location: pickup_location.to_string(),
                    payment_mode: payment_mode.to_string(),
                    transport_mode: transport_mode.to_string(),
                    zone: zone.map(str::to_string),
                    amount,
                    weight_kg,
                    courier,
                    awb_number,
                    status,
                    pickup_date,
                    delivered_at,
                    last_update,
                },
            )
    }

    /// Generate a ReverseOrder; return reasons may fall outside the catalog.
    pub fn arb_reverse_order() -> impl Strategy<Value = ReverseOrder> {
        (
            (
                "RET[0-9]{6}",
                "ORD[0-9]{6}",
                arb_timestamp(),
                arb_name(),
                "[A-Z][a-z]{3,10}",
                arb_pincode(),
                prop_oneof![
                    prop::sample::select(vec!["damaged", "wrong_item", "size_issue"])
                        .prop_map(str::to_string),
                    "[a-z_]{3,12}",
                ],
            ),
            (
                prop::sample::select(vec!["WH-DEL-01", "WH-HYD-01"]),
                0.0f64..50_000.0,
                arb_courier(),
                arb_awb(),
                arb_reverse_state(),
                prop::option::of(arb_timestamp()),
                prop::option::of(arb_timestamp()),
            ),
        )
            .prop_map(
                |(
                    (return_id, original_order_id, created_at, customer_name, pickup_city, pickup_pincode, return_reason),
                    (pickup_location, amount, courier, awb_number, status, pickup_date, delivered_at),
                )| ReverseOrder {
                    return_id,
                    original_order_id,
                    created_at,
                    customer_name,
                    customer_phone: None,
                    pickup_city,
                    pickup_pincode,
                    return_reason,
                    pickup_location: pickup_location.to_string(),
                    amount,
                    courier,
                    awb_number,
                    status,
                    pickup_date,
                    delivered_at,
                },
            )
    }

    pub fn arb_pickup_request() -> impl Strategy<Value = PickupRequest> {
        (
            "PCK[0-9]{5}",
            prop::sample::select(vec!["WH-DEL-01", "WH-BOM-01", "WH-XYZ-99"]),
            arb_timestamp(),
            prop::sample::select(vec!["10:00-13:00", "14:00-18:00"]),
            prop::sample::select(vec!["BlueDart", "Delhivery"]),
            prop::sample::select(vec!["surface", "air"]),
            1u32..500,
            prop::option::of(0u32..500),
            arb_pickup_state(),
            arb_timestamp(),
        )
            .prop_map(
                |(
                    pickup_id,
                    pickup_location,
                    pickup_date,
                    slot,
                    courier,
                    transport_mode,
                    expected_packages,
                    picked_packages,
                    status,
                    created_at,
                )| PickupRequest {
                    pickup_id,
                    pickup_location: pickup_location.to_string(),
                    pickup_date,
                    slot: slot.to_string(),
                    courier: courier.to_string(),
                    transport_mode: transport_mode.to_string(),
                    expected_packages,
                    picked_packages,
                    status,
                    created_at,
                },
            )
    }

    /// Rows with unique ids, as a backend page would return them.
    pub fn arb_forward_page(max: usize) -> impl Strategy<Value = Vec<ForwardOrder>> {
        prop::collection::vec(arb_forward_order(), 0..=max).prop_map(|mut rows| {
            for (index, row) in rows.iter_mut().enumerate() {
                row.order_id = format!("ORD{:06}", index + 1);
            }
            rows
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built rows and responses for common scenarios.

    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn base_time() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// A pending forward order without courier or AWB.
    pub fn forward_order(id: &str, status: ForwardState) -> ForwardOrder {
        ForwardOrder {
            order_id: id.to_string(),
            order_date: base_time(),
            customer_name: format!("Customer {}", id),
            customer_phone: Some("9876543210".to_string()),
            destination_city: "Pune".to_string(),
            destination_pincode: "411001".to_string(),
            pickup_location: "WH-BOM-01".to_string(),
            payment_mode: "prepaid".to_string(),
            transport_mode: "surface".to_string(),
            zone: Some("B".to_string()),
            amount: 999.0,
            weight_kg: 0.5,
            courier: None,
            awb_number: None,
            status,
            pickup_date: None,
            delivered_at: None,
            last_update: None,
        }
    }

    /// ORD001..ORD00n, pending, one hour apart, amounts ascending.
    pub fn pending_orders(count: usize) -> Vec<ForwardOrder> {
        (1..=count)
            .map(|n| {
                let mut order = forward_order(&format!("ORD{:03}", n), ForwardState::Pending);
                order.order_date = base_time() + Duration::hours(n as i64);
                order.amount = 100.0 * n as f64;
                order
            })
            .collect()
    }

    pub fn reverse_order(id: &str, status: ReverseState) -> ReverseOrder {
        ReverseOrder {
            return_id: id.to_string(),
            original_order_id: format!("ORD-{}", id),
            created_at: base_time(),
            customer_name: format!("Customer {}", id),
            customer_phone: None,
            pickup_city: "Chennai".to_string(),
            pickup_pincode: "600001".to_string(),
            return_reason: "damaged".to_string(),
            pickup_location: "WH-BLR-01".to_string(),
            amount: 499.0,
            courier: None,
            awb_number: None,
            status,
            pickup_date: None,
            delivered_at: None,
        }
    }

    pub fn pickup_request(id: &str, status: PickupState) -> PickupRequest {
        PickupRequest {
            pickup_id: id.to_string(),
            pickup_location: "WH-DEL-01".to_string(),
            pickup_date: base_time() + Duration::days(1),
            slot: "10:00-13:00".to_string(),
            courier: "Delhivery".to_string(),
            transport_mode: "surface".to_string(),
            expected_packages: 12,
            picked_packages: None,
            status,
            created_at: base_time(),
        }
    }

    pub fn list_response<Row>(
        items: Vec<Row>,
        page: u32,
        page_size: u32,
        total: u64,
        status_counts: HashMap<String, u64>,
    ) -> ListResponse<Row> {
        ListResponse {
            items,
            pagination: PageInfo {
                page,
                page_size,
                total,
            },
            status_counts,
        }
    }

    /// Counts map from `(state, count)` pairs.
    pub fn wire_counts<S: Lifecycle>(pairs: &[(S, u64)]) -> HashMap<String, u64> {
        pairs
            .iter()
            .map(|(state, count)| (state.as_str().to_string(), *count))
            .collect()
    }

    /// Batch outcome where `ok` rows received AWBs and `failed` rows carry an error.
    pub fn batch_outcome(ok: &[&str], failed: &[&str]) -> BatchOutcome {
        BatchOutcome {
            successful: ok
                .iter()
                .map(|id| BatchRow {
                    id: id.to_string(),
                    awb_number: Some(format!("AWB-{}-1234", id)),
                    courier: Some("BlueDart".to_string()),
                    error: None,
                })
                .collect(),
            failed: failed
                .iter()
                .map(|id| BatchRow {
                    id: id.to_string(),
                    awb_number: None,
                    courier: None,
                    error: Some("Pincode not serviceable".to_string()),
                })
                .collect(),
            summary: BatchSummary {
                total: (ok.len() + failed.len()) as u64,
                successful: ok.len() as u64,
                failed: failed.len() as u64,
            },
        }
    }

    pub fn csv_upload() -> UploadFile {
        UploadFile {
            file_name: "orders.csv".to_string(),
            bytes: b"order_id,customer,pincode\nORD900,Asha,411001\n".to_vec(),
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for list-state invariants.

    use super::*;

    /// Assert the aggregate count equals the sum of the concrete states.
    #[track_caller]
    pub fn assert_counts_consistent<S: Lifecycle>(counts: &StatusCounts<S>) {
        let sum: u64 = S::concrete().map(|state| counts.get(state)).sum();
        assert_eq!(
            counts.get(S::AGGREGATE),
            sum,
            "aggregate count drifted from per-state sum"
        );
    }

    /// Assert `(page-1)*page_size < total` whenever `total > 0`.
    #[track_caller]
    pub fn assert_page_in_window(pagination: &Pagination) {
        assert!(pagination.page >= 1, "page below 1: {:?}", pagination);
        if pagination.total > 0 {
            let offset = u64::from(pagination.page - 1) * u64::from(pagination.page_size.get());
            assert!(offset < pagination.total, "page outside window: {:?}", pagination);
        }
    }

    /// Assert a write failed with an application error carrying `status`.
    #[track_caller]
    pub fn assert_application_error(error: &ApiError, status: u16) {
        match error {
            ApiError::Application { status: got, .. } => {
                assert_eq!(*got, status, "wrong status in {:?}", error)
            }
            other => panic!("Expected Application error, got: {:?}", other),
        }
    }
}
