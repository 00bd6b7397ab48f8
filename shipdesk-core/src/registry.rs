//! State schema registry.
//!
//! One schema per lifecycle state per resource, built once on first use and
//! handed out by `&'static` reference. This is the single place that decides
//! what a pending order looks like versus a delivered one.

use crate::actions::{ForwardAction, PickupAction, ReverseAction};
use crate::catalog::{self, OptionSource};
use crate::enums::{ForwardState, Lifecycle, PickupState, ResourceKind, ReverseState, SortDirection};
use crate::records::{ForwardOrder, PickupRequest, ReverseOrder};
use crate::schema::{CellValue, ColumnSpec, DateMode, FilterSpec, Resource, SchemaRecord, SortSpec};
use once_cell::sync::Lazy;

use SortDirection::{Asc, Desc};

/// Outbound orders.
#[derive(Debug, Clone, Copy)]
pub struct ForwardOrders;

/// Customer returns.
#[derive(Debug, Clone, Copy)]
pub struct ReverseOrders;

/// Courier pickup requests.
#[derive(Debug, Clone, Copy)]
pub struct PickupRequests;

static FORWARD_SCHEMAS: Lazy<Vec<SchemaRecord<ForwardOrders>>> = Lazy::new(|| {
    ForwardState::ALL
        .iter()
        .map(|state| forward_schema(*state))
        .collect()
});

static REVERSE_SCHEMAS: Lazy<Vec<SchemaRecord<ReverseOrders>>> = Lazy::new(|| {
    ReverseState::ALL
        .iter()
        .map(|state| reverse_schema(*state))
        .collect()
});

static PICKUP_SCHEMAS: Lazy<Vec<SchemaRecord<PickupRequests>>> = Lazy::new(|| {
    PickupState::ALL
        .iter()
        .map(|state| pickup_schema(*state))
        .collect()
});

impl Resource for ForwardOrders {
    type State = ForwardState;
    type Row = ForwardOrder;
    type Action = ForwardAction;

    const KIND: ResourceKind = ResourceKind::ForwardOrders;

    fn schema(state: ForwardState) -> &'static SchemaRecord<Self> {
        &FORWARD_SCHEMAS[state.ordinal()]
    }
}

impl Resource for ReverseOrders {
    type State = ReverseState;
    type Row = ReverseOrder;
    type Action = ReverseAction;

    const KIND: ResourceKind = ResourceKind::ReverseOrders;

    fn schema(state: ReverseState) -> &'static SchemaRecord<Self> {
        &REVERSE_SCHEMAS[state.ordinal()]
    }
}

impl Resource for PickupRequests {
    type State = PickupState;
    type Row = PickupRequest;
    type Action = PickupAction;

    const KIND: ResourceKind = ResourceKind::PickupRequests;

    fn schema(state: PickupState) -> &'static SchemaRecord<Self> {
        &PICKUP_SCHEMAS[state.ordinal()]
    }
}

fn catalog_label(source: OptionSource, value: &str) -> CellValue {
    match catalog::label_for(source, value) {
        Some(label) => CellValue::text(label),
        None => CellValue::opt_text(Some(value)),
    }
}

// ============================================================================
// FORWARD ORDERS
// ============================================================================

mod forward {
    use super::*;

    type Col = ColumnSpec<ForwardOrder>;

    pub fn order_id() -> Col {
        Col::new("order_id", "Order ID", |o: &ForwardOrder| {
            CellValue::text(o.order_id.clone())
        })
        .sortable()
        .min_width(10)
    }

    pub fn order_date() -> Col {
        Col::new("order_date", "Order Date", |o: &ForwardOrder| {
            CellValue::Date(o.order_date)
        })
        .sortable()
        .hide_below(90)
    }

    pub fn customer() -> Col {
        Col::new("customer", "Customer", |o: &ForwardOrder| {
            CellValue::text(o.customer_name.clone())
        })
        .sortable()
        .min_width(14)
    }

    pub fn destination() -> Col {
        Col::new("destination", "Destination", |o: &ForwardOrder| {
            CellValue::text(format!("{} - {}", o.destination_city, o.destination_pincode))
        })
        .hide_below(110)
    }

    pub fn payment_mode() -> Col {
        Col::new("payment_mode", "Payment", |o: &ForwardOrder| {
            catalog_label(OptionSource::PaymentModes, &o.payment_mode)
        })
        .sortable()
        .hide_below(100)
    }

    pub fn amount() -> Col {
        Col::new("amount", "Amount", |o: &ForwardOrder| CellValue::Amount(o.amount))
            .sortable()
            .min_width(10)
    }

    pub fn weight() -> Col {
        Col::new("weight", "Weight", |o: &ForwardOrder| CellValue::Weight(o.weight_kg))
            .sortable()
            .hide_below(120)
    }

    pub fn pickup_location() -> Col {
        Col::new("pickup_location", "Pickup From", |o: &ForwardOrder| {
            CellValue::text(o.pickup_location.clone())
        })
        .hide_below(130)
    }

    pub fn courier() -> Col {
        Col::new("courier", "Courier", |o: &ForwardOrder| {
            CellValue::opt_text(o.courier.as_deref())
        })
        .sortable()
    }

    pub fn awb() -> Col {
        Col::new("awb_number", "AWB", |o: &ForwardOrder| {
            CellValue::opt_text(o.awb_number.as_deref())
        })
        .min_width(12)
    }

    pub fn status() -> Col {
        Col::new("status", "Status", |o: &ForwardOrder| {
            CellValue::Status(o.status.label())
        })
        .sortable()
    }

    pub fn pickup_date() -> Col {
        Col::new("pickup_date", "Pickup Date", |o: &ForwardOrder| {
            CellValue::opt_date(o.pickup_date)
        })
        .sortable()
    }

    pub fn delivered_at() -> Col {
        Col::new("delivered_at", "Delivered On", |o: &ForwardOrder| {
            CellValue::opt_date(o.delivered_at)
        })
        .sortable()
    }

    pub fn last_update() -> Col {
        Col::new("last_update", "Last Update", |o: &ForwardOrder| {
            CellValue::opt_text(o.last_update.as_deref())
        })
        .hide_below(120)
    }

    pub fn search() -> FilterSpec {
        FilterSpec::search("Order ID, AWB, customer or phone")
    }

    pub fn order_date_filter() -> FilterSpec {
        FilterSpec::date("order_date", "Order Date", DateMode::Range)
    }

    pub fn pickup_location_filter() -> FilterSpec {
        FilterSpec::select("pickup_location", "Pickup Location", OptionSource::PickupLocations)
    }

    pub fn payment_mode_filter() -> FilterSpec {
        FilterSpec::select("payment_mode", "Payment Mode", OptionSource::PaymentModes)
    }

    pub fn transport_mode_filter() -> FilterSpec {
        FilterSpec::select("transport_mode", "Transport Mode", OptionSource::TransportModes)
    }

    pub fn zone_filter() -> FilterSpec {
        FilterSpec::select("zone", "Zone", OptionSource::Zones)
    }
}

fn forward_schema(state: ForwardState) -> SchemaRecord<ForwardOrders> {
    use forward::*;
    use ForwardAction as A;

    let (columns, filters, row_actions, default_sort) = match state {
        ForwardState::Pending => (
            vec![
                order_id(),
                order_date(),
                customer(),
                destination(),
                payment_mode(),
                amount(),
                weight(),
                pickup_location(),
            ],
            vec![
                search(),
                order_date_filter(),
                pickup_location_filter(),
                payment_mode_filter(),
                transport_mode_filter(),
            ],
            vec![A::ViewDetails, A::GenerateAwb, A::ShipNow, A::CloneOrder, A::Cancel],
            SortSpec::new("order_date", Desc),
        ),
        ForwardState::ReadyToShip => (
            vec![
                order_id(),
                order_date(),
                customer(),
                destination(),
                amount(),
                courier(),
                awb(),
                pickup_location(),
            ],
            vec![
                search(),
                order_date_filter(),
                pickup_location_filter(),
                transport_mode_filter(),
                zone_filter(),
            ],
            vec![A::ViewDetails, A::PrintLabel, A::SchedulePickup, A::Cancel],
            SortSpec::new("order_date", Desc),
        ),
        ForwardState::ReadyForPickup => (
            vec![
                order_id(),
                customer(),
                courier(),
                awb(),
                pickup_location(),
                pickup_date(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Pickup Date", DateMode::Single),
                pickup_location_filter(),
            ],
            vec![A::ViewDetails, A::PrintLabel, A::Track, A::Cancel],
            SortSpec::new("pickup_date", Asc),
        ),
        ForwardState::InTransit => (
            vec![
                order_id(),
                customer(),
                destination(),
                courier(),
                awb(),
                last_update(),
                pickup_date(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Picked Up", DateMode::Range),
                zone_filter(),
                transport_mode_filter(),
            ],
            vec![A::ViewDetails, A::Track, A::RaiseNdr],
            SortSpec::new("pickup_date", Desc),
        ),
        ForwardState::RtoInTransit => (
            vec![
                order_id(),
                order_date(),
                customer(),
                courier(),
                awb(),
                last_update(),
                amount(),
            ],
            vec![search(), order_date_filter(), zone_filter()],
            vec![A::ViewDetails, A::Track],
            SortSpec::new("order_date", Desc),
        ),
        ForwardState::Delivered => (
            vec![
                order_id(),
                customer(),
                destination(),
                courier(),
                awb(),
                amount(),
                delivered_at(),
            ],
            vec![
                search(),
                FilterSpec::date("delivered_date", "Delivered On", DateMode::Range),
                payment_mode_filter(),
                zone_filter(),
            ],
            vec![A::ViewDetails, A::Track, A::CloneOrder],
            SortSpec::new("delivered_at", Desc),
        ),
        ForwardState::AllShipments => (
            vec![
                order_id(),
                order_date(),
                customer(),
                status(),
                courier(),
                awb(),
                amount(),
            ],
            vec![
                search(),
                order_date_filter(),
                payment_mode_filter(),
                pickup_location_filter(),
                transport_mode_filter(),
                zone_filter(),
            ],
            vec![A::ViewDetails, A::Track, A::CloneOrder],
            SortSpec::new("order_date", Desc),
        ),
    };

    SchemaRecord {
        state,
        columns,
        filters,
        row_actions,
        default_sort,
    }
}

// ============================================================================
// REVERSE ORDERS
// ============================================================================

mod reverse {
    use super::*;

    type Col = ColumnSpec<ReverseOrder>;

    pub fn return_id() -> Col {
        Col::new("return_id", "Return ID", |r: &ReverseOrder| {
            CellValue::text(r.return_id.clone())
        })
        .sortable()
        .min_width(10)
    }

    pub fn original_order() -> Col {
        Col::new("original_order_id", "Order ID", |r: &ReverseOrder| {
            CellValue::text(r.original_order_id.clone())
        })
        .hide_below(110)
    }

    pub fn created_at() -> Col {
        Col::new("created_at", "Requested On", |r: &ReverseOrder| {
            CellValue::Date(r.created_at)
        })
        .sortable()
        .hide_below(90)
    }

    pub fn customer() -> Col {
        Col::new("customer", "Customer", |r: &ReverseOrder| {
            CellValue::text(r.customer_name.clone())
        })
        .sortable()
        .min_width(14)
    }

    pub fn pickup_address() -> Col {
        Col::new("pickup_address", "Pickup From", |r: &ReverseOrder| {
            CellValue::text(format!("{} - {}", r.pickup_city, r.pickup_pincode))
        })
        .hide_below(110)
    }

    pub fn reason() -> Col {
        Col::new("return_reason", "Reason", |r: &ReverseOrder| {
            catalog_label(OptionSource::ReturnReasons, &r.return_reason)
        })
        .sortable()
        .hide_below(100)
    }

    pub fn warehouse() -> Col {
        Col::new("warehouse", "Return To", |r: &ReverseOrder| {
            CellValue::text(r.pickup_location.clone())
        })
        .hide_below(130)
    }

    pub fn amount() -> Col {
        Col::new("amount", "Refund", |r: &ReverseOrder| CellValue::Amount(r.amount))
            .sortable()
            .min_width(10)
    }

    pub fn courier() -> Col {
        Col::new("courier", "Courier", |r: &ReverseOrder| {
            CellValue::opt_text(r.courier.as_deref())
        })
        .sortable()
    }

    pub fn awb() -> Col {
        Col::new("awb_number", "AWB", |r: &ReverseOrder| {
            CellValue::opt_text(r.awb_number.as_deref())
        })
        .min_width(12)
    }

    pub fn status() -> Col {
        Col::new("status", "Status", |r: &ReverseOrder| {
            CellValue::Status(r.status.label())
        })
        .sortable()
    }

    pub fn pickup_date() -> Col {
        Col::new("pickup_date", "Pickup Date", |r: &ReverseOrder| {
            CellValue::opt_date(r.pickup_date)
        })
        .sortable()
    }

    pub fn delivered_at() -> Col {
        Col::new("delivered_at", "Received On", |r: &ReverseOrder| {
            CellValue::opt_date(r.delivered_at)
        })
        .sortable()
    }

    pub fn search() -> FilterSpec {
        FilterSpec::search("Return ID, order ID, AWB or customer")
    }

    pub fn created_filter() -> FilterSpec {
        FilterSpec::date("created_date", "Requested On", DateMode::Range)
    }

    pub fn reason_filter() -> FilterSpec {
        FilterSpec::select("return_reason", "Reason", OptionSource::ReturnReasons)
    }

    pub fn warehouse_filter() -> FilterSpec {
        FilterSpec::select("pickup_location", "Return To", OptionSource::PickupLocations)
    }

    pub fn pickup_date_filter() -> FilterSpec {
        FilterSpec::date("pickup_date", "Pickup Date", DateMode::Range)
    }
}

fn reverse_schema(state: ReverseState) -> SchemaRecord<ReverseOrders> {
    use reverse::*;
    use ReverseAction as A;

    let (columns, filters, row_actions, default_sort) = match state {
        ReverseState::Pending => (
            vec![
                return_id(),
                original_order(),
                created_at(),
                customer(),
                pickup_address(),
                reason(),
                amount(),
            ],
            vec![search(), created_filter(), reason_filter(), warehouse_filter()],
            vec![A::ViewDetails, A::GenerateAwb, A::Cancel],
            SortSpec::new("created_at", Desc),
        ),
        ReverseState::ReadyForPickup => (
            vec![
                return_id(),
                customer(),
                pickup_address(),
                courier(),
                awb(),
                pickup_date(),
                warehouse(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Pickup Date", DateMode::Single),
                warehouse_filter(),
            ],
            vec![A::ViewDetails, A::PrintLabel, A::SchedulePickup, A::Cancel],
            SortSpec::new("pickup_date", Asc),
        ),
        ReverseState::InTransit => (
            vec![
                return_id(),
                customer(),
                courier(),
                awb(),
                pickup_date(),
                warehouse(),
            ],
            vec![search(), pickup_date_filter(), warehouse_filter()],
            vec![A::ViewDetails, A::Track],
            SortSpec::new("pickup_date", Desc),
        ),
        ReverseState::OutForDelivery => (
            vec![
                return_id(),
                customer(),
                courier(),
                awb(),
                pickup_date(),
                warehouse(),
            ],
            vec![search(), pickup_date_filter(), warehouse_filter()],
            vec![A::ViewDetails, A::Track],
            SortSpec::new("pickup_date", Desc),
        ),
        ReverseState::Delivered => (
            vec![
                return_id(),
                original_order(),
                customer(),
                courier(),
                awb(),
                amount(),
                delivered_at(),
            ],
            vec![
                search(),
                FilterSpec::date("delivered_date", "Received On", DateMode::Range),
                reason_filter(),
                warehouse_filter(),
            ],
            vec![A::ViewDetails, A::Track],
            SortSpec::new("delivered_at", Desc),
        ),
        ReverseState::Cancelled => (
            vec![return_id(), original_order(), created_at(), customer(), reason()],
            vec![search(), created_filter(), reason_filter()],
            vec![A::ViewDetails],
            SortSpec::new("created_at", Desc),
        ),
        ReverseState::AllShipments => (
            vec![
                return_id(),
                created_at(),
                customer(),
                status(),
                reason(),
                courier(),
                awb(),
                amount(),
            ],
            vec![search(), created_filter(), reason_filter(), warehouse_filter()],
            vec![A::ViewDetails, A::Track],
            SortSpec::new("created_at", Desc),
        ),
    };

    SchemaRecord {
        state,
        columns,
        filters,
        row_actions,
        default_sort,
    }
}

// ============================================================================
// PICKUP REQUESTS
// ============================================================================

mod pickup {
    use super::*;

    type Col = ColumnSpec<PickupRequest>;

    pub fn pickup_id() -> Col {
        Col::new("pickup_id", "Pickup ID", |p: &PickupRequest| {
            CellValue::text(p.pickup_id.clone())
        })
        .sortable()
        .min_width(10)
    }

    pub fn location() -> Col {
        Col::new("pickup_location", "Location", |p: &PickupRequest| {
            catalog_label(OptionSource::PickupLocations, &p.pickup_location)
        })
        .sortable()
        .min_width(16)
    }

    pub fn pickup_date() -> Col {
        Col::new("pickup_date", "Pickup Date", |p: &PickupRequest| {
            CellValue::Date(p.pickup_date)
        })
        .sortable()
    }

    pub fn slot() -> Col {
        Col::new("slot", "Slot", |p: &PickupRequest| CellValue::text(p.slot.clone()))
            .hide_below(100)
    }

    pub fn courier() -> Col {
        Col::new("courier", "Courier", |p: &PickupRequest| {
            CellValue::text(p.courier.clone())
        })
        .sortable()
    }

    pub fn transport_mode() -> Col {
        Col::new("transport_mode", "Mode", |p: &PickupRequest| {
            catalog_label(OptionSource::TransportModes, &p.transport_mode)
        })
        .hide_below(120)
    }

    pub fn expected() -> Col {
        Col::new("expected_packages", "Packages", |p: &PickupRequest| {
            CellValue::Count(u64::from(p.expected_packages))
        })
        .sortable()
    }

    pub fn picked() -> Col {
        Col::new("picked_packages", "Picked", |p: &PickupRequest| {
            p.picked_packages
                .map(|count| CellValue::Count(u64::from(count)))
                .unwrap_or(CellValue::Empty)
        })
        .sortable()
    }

    pub fn status() -> Col {
        Col::new("status", "Status", |p: &PickupRequest| {
            CellValue::Status(p.status.label())
        })
        .sortable()
    }

    pub fn created_at() -> Col {
        Col::new("created_at", "Requested On", |p: &PickupRequest| {
            CellValue::Date(p.created_at)
        })
        .sortable()
        .hide_below(110)
    }

    pub fn search() -> FilterSpec {
        FilterSpec::search("Pickup ID or courier")
    }

    pub fn location_filter() -> FilterSpec {
        FilterSpec::select("pickup_location", "Location", OptionSource::PickupLocations)
    }

    pub fn mode_filter() -> FilterSpec {
        FilterSpec::select("transport_mode", "Transport Mode", OptionSource::TransportModes)
    }
}

fn pickup_schema(state: PickupState) -> SchemaRecord<PickupRequests> {
    use pickup::*;
    use PickupAction as A;

    let (columns, filters, row_actions, default_sort) = match state {
        PickupState::Scheduled => (
            vec![
                pickup_id(),
                location(),
                pickup_date(),
                slot(),
                courier(),
                transport_mode(),
                expected(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Pickup Date", DateMode::Single),
                location_filter(),
                mode_filter(),
            ],
            vec![A::ViewDetails, A::Reschedule, A::Cancel],
            SortSpec::new("pickup_date", Asc),
        ),
        PickupState::PickedUp => (
            vec![
                pickup_id(),
                location(),
                pickup_date(),
                courier(),
                expected(),
                picked(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Pickup Date", DateMode::Range),
                location_filter(),
            ],
            vec![A::ViewDetails],
            SortSpec::new("pickup_date", Desc),
        ),
        PickupState::Cancelled => (
            vec![pickup_id(), location(), pickup_date(), courier(), created_at()],
            vec![search(), location_filter()],
            vec![A::ViewDetails],
            SortSpec::new("created_at", Desc),
        ),
        PickupState::AllShipments => (
            vec![
                pickup_id(),
                location(),
                pickup_date(),
                courier(),
                status(),
                expected(),
                picked(),
                created_at(),
            ],
            vec![
                search(),
                FilterSpec::date("pickup_date", "Pickup Date", DateMode::Range),
                location_filter(),
                mode_filter(),
            ],
            vec![A::ViewDetails],
            SortSpec::new("pickup_date", Desc),
        ),
    };

    SchemaRecord {
        state,
        columns,
        filters,
        row_actions,
        default_sort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ActionEffect, FilterKind, RowAction};

    fn assert_registry_integrity<R: Resource>() {
        let mut seen = 0;
        for schema in R::all_schemas() {
            schema
                .validate()
                .unwrap_or_else(|e| panic!("{:?} {:?}: {}", R::KIND, schema.state, e));
            assert!(schema.has_search(), "{:?} has no search", schema.state);
            assert!(!schema.columns.is_empty());
            assert!(!schema.row_actions.is_empty());
            seen += 1;
        }
        assert_eq!(seen, <R::State as Lifecycle>::ALL.len());
    }

    #[test]
    fn every_schema_validates() {
        assert_registry_integrity::<ForwardOrders>();
        assert_registry_integrity::<ReverseOrders>();
        assert_registry_integrity::<PickupRequests>();
    }

    #[test]
    fn lookup_returns_schema_for_requested_state() {
        for state in ForwardState::ALL {
            assert_eq!(ForwardOrders::schema(*state).state, *state);
        }
        for state in ReverseState::ALL {
            assert_eq!(ReverseOrders::schema(*state).state, *state);
        }
        for state in PickupState::ALL {
            assert_eq!(PickupRequests::schema(*state).state, *state);
        }
    }

    #[test]
    fn lookups_share_one_static_record() {
        let a = ForwardOrders::schema(ForwardState::Pending) as *const _;
        let b = ForwardOrders::schema(ForwardState::Pending) as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn awb_generation_only_offered_before_shipping() {
        for schema in ForwardOrders::all_schemas() {
            let offers = schema
                .row_actions
                .iter()
                .any(|a| a.effect() == ActionEffect::GenerateAwb);
            assert_eq!(offers, schema.state == ForwardState::Pending, "{:?}", schema.state);
        }
    }

    #[test]
    fn select_filters_resolve_against_catalog() {
        let sources = ForwardOrders::all_schemas()
            .flat_map(|s| s.filters.iter())
            .chain(ReverseOrders::all_schemas().flat_map(|s| s.filters.iter()))
            .chain(PickupRequests::all_schemas().flat_map(|s| s.filters.iter()))
            .filter_map(|f| match &f.kind {
                FilterKind::Select { source } => Some(*source),
                _ => None,
            });
        for source in sources {
            assert!(!catalog::options(source).is_empty());
        }
    }

    #[test]
    fn aggregate_view_shows_status_column() {
        assert!(ForwardOrders::schema(ForwardState::AllShipments)
            .column("status")
            .is_some());
        assert!(ForwardOrders::schema(ForwardState::Pending)
            .column("status")
            .is_none());
    }
}
