//! Backend contract: request/response shapes and the per-resource API trait.

use crate::enums::Lifecycle;
use crate::error::ApiError;
use crate::filter::QueryParams;
use crate::list::Pagination;
use crate::schema::Resource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// LIST
// ============================================================================

/// Body of `POST {base}/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub status: &'static str,
    pub page: u32,
    pub page_size: u32,
    /// Date and select filter values, flattened into the body.
    #[serde(flatten)]
    pub params: BTreeMap<String, String>,
}

impl ListRequest {
    pub fn new<S: Lifecycle>(state: S, pagination: &Pagination, query: QueryParams) -> Self {
        Self {
            search: query.search,
            status: state.as_str(),
            page: pagination.page,
            page_size: pagination.page_size.get(),
            params: query.params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    pub total: u64,
}

/// Response of `POST {base}/list`. The rows arrive under a resource-specific
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<Row> {
    #[serde(rename = "orders", alias = "returns", alias = "pickups", default = "Vec::new")]
    pub items: Vec<Row>,
    pub pagination: PageInfo,
    #[serde(default)]
    pub status_counts: HashMap<String, u64>,
}

// ============================================================================
// WRITES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwbResponse {
    pub awb_number: String,
}

/// File handed to a bulk upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One row of a manifest or bulk-upload result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    #[serde(
        alias = "order_id",
        alias = "orderId",
        alias = "return_id",
        alias = "returnId",
        alias = "pickup_id",
        alias = "pickupId",
        alias = "row"
    )]
    pub id: String,
    #[serde(default, alias = "awbNumber", skip_serializing_if = "Option::is_none")]
    pub awb_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Result of a batch write. Failed rows are part of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    #[serde(default)]
    pub successful: Vec<BatchRow>,
    #[serde(default)]
    pub failed: Vec<BatchRow>,
    #[serde(default)]
    pub summary: BatchSummary,
}

impl BatchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.summary.failed > 0
    }
}

// ============================================================================
// API TRAIT
// ============================================================================

/// Backend operations for one resource. Writes default to `Unsupported` so
/// resources without shipping only implement `list`.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self, request: &ListRequest) -> Result<ListResponse<R::Row>, ApiError>;

    async fn generate_awb(&self, _id: &str) -> Result<AwbResponse, ApiError> {
        Err(ApiError::Unsupported("AWB generation"))
    }

    async fn bulk_upload(&self, _file: UploadFile) -> Result<BatchOutcome, ApiError> {
        Err(ApiError::Unsupported("Bulk upload"))
    }

    async fn manifest(&self, _ids: &[String]) -> Result<BatchOutcome, ApiError> {
        Err(ApiError::Unsupported("Manifest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ForwardState;
    use crate::list::PageSize;
    use crate::records::ReverseOrder;

    #[test]
    fn list_request_flattens_params() {
        let mut pagination = Pagination::new(PageSize::default());
        pagination.page = 2;
        let query = QueryParams {
            search: Some("AWB1".to_string()),
            params: [("zone".to_string(), "A".to_string())].into_iter().collect(),
        };
        let body = serde_json::to_value(ListRequest::new(ForwardState::Pending, &pagination, query))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "search": "AWB1",
                "status": "pending",
                "page": 2,
                "pageSize": 20,
                "zone": "A"
            })
        );
    }

    #[test]
    fn list_request_omits_search_without_search_filter() {
        let pagination = Pagination::new(PageSize::default());
        let body = serde_json::to_value(ListRequest::new(
            ForwardState::Delivered,
            &pagination,
            QueryParams::default(),
        ))
        .unwrap();
        assert!(body.get("search").is_none());
    }

    #[test]
    fn list_response_accepts_resource_specific_key() {
        let json = serde_json::json!({
            "returns": [{
                "returnId": "RET1",
                "originalOrderId": "ORD9",
                "createdAt": "2026-10-01T10:00:00Z",
                "customerName": "Ravi",
                "pickupCity": "Chennai",
                "pickupPincode": "600001",
                "returnReason": "damaged",
                "pickupLocation": "WH-BLR-01",
                "amount": 499.0,
                "status": "pending"
            }],
            "pagination": {"page": 1, "pageSize": 20, "total": 1},
            "statusCounts": {"pending": 1}
        });
        let response: ListResponse<ReverseOrder> = serde_json::from_value(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.pagination.total, 1);
    }

    #[test]
    fn batch_rows_accept_resource_id_keys() {
        let json = serde_json::json!({
            "successful": [{"order_id": "ORD1", "awb_number": "AWB1", "courier": "BlueDart"}],
            "failed": [{"orderId": "ORD2", "error": "Pincode not serviceable"}],
            "summary": {"total": 2, "successful": 1, "failed": 1}
        });
        let outcome: BatchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(outcome.successful[0].id, "ORD1");
        assert_eq!(outcome.failed[0].id, "ORD2");
        assert!(outcome.has_failures());
    }
}
