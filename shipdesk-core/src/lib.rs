//! Shipdesk Core - Order Table Engine
//!
//! Lifecycle states, the per-state schema registry, filter translation, list
//! state and the backend contract. No I/O lives here; the TUI crate supplies
//! the HTTP client and event loop.

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

pub mod actions;
pub mod api;
pub mod catalog;
pub mod enums;
pub mod error;
pub mod filter;
pub mod list;
pub mod records;
pub mod registry;
pub mod schema;

pub use actions::{ForwardAction, PickupAction, ReverseAction};
pub use api::{
    AwbResponse, BatchOutcome, BatchRow, BatchSummary, ListRequest, ListResponse, PageInfo,
    ResourceApi, UploadFile,
};
pub use catalog::{FilterOption, OptionSource};
pub use enums::{ForwardState, Lifecycle, PickupState, ResourceKind, ReverseState, SortDirection};
pub use error::{ApiError, SchemaError};
pub use filter::{translate, FilterValues, QueryParams};
pub use list::{ListState, PageSize, Pagination, StatusCounts};
pub use records::{ForwardOrder, PickupRequest, Record, ReverseOrder};
pub use registry::{ForwardOrders, PickupRequests, ReverseOrders};
pub use schema::{
    ActionEffect, CellValue, ColumnSpec, DateMode, FilterKind, FilterSpec, Resource, RowAction,
    SchemaRecord, SortSpec, SEARCH_PARAM,
};
