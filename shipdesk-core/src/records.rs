//! Row records returned by the list endpoints.

use crate::enums::{ForwardState, PickupState, ReverseState};
use crate::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row the fetch controller can hold and patch.
pub trait Record: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;

    fn awb_number(&self) -> Option<&str> {
        None
    }

    /// Attach a freshly generated AWB. Returns `false` for records that
    /// never carry one.
    fn attach_awb(&mut self, _awb: String) -> bool {
        false
    }
}

/// Outbound order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardOrder {
    pub order_id: String,
    pub order_date: Timestamp,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub destination_city: String,
    pub destination_pincode: String,
    pub pickup_location: String,
    pub payment_mode: String,
    pub transport_mode: String,
    #[serde(default)]
    pub zone: Option<String>,
    pub amount: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub awb_number: Option<String>,
    pub status: ForwardState,
    #[serde(default)]
    pub pickup_date: Option<Timestamp>,
    #[serde(default)]
    pub delivered_at: Option<Timestamp>,
    /// Latest courier scan text.
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Record for ForwardOrder {
    fn id(&self) -> &str {
        &self.order_id
    }

    fn awb_number(&self) -> Option<&str> {
        self.awb_number.as_deref()
    }

    fn attach_awb(&mut self, awb: String) -> bool {
        self.awb_number = Some(awb);
        true
    }
}

/// Customer return travelling back to a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseOrder {
    pub return_id: String,
    pub original_order_id: String,
    pub created_at: Timestamp,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub pickup_city: String,
    pub pickup_pincode: String,
    pub return_reason: String,
    /// Warehouse receiving the return.
    pub pickup_location: String,
    pub amount: f64,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub awb_number: Option<String>,
    pub status: ReverseState,
    #[serde(default)]
    pub pickup_date: Option<Timestamp>,
    #[serde(default)]
    pub delivered_at: Option<Timestamp>,
}

impl Record for ReverseOrder {
    fn id(&self) -> &str {
        &self.return_id
    }

    fn awb_number(&self) -> Option<&str> {
        self.awb_number.as_deref()
    }

    fn attach_awb(&mut self, awb: String) -> bool {
        self.awb_number = Some(awb);
        true
    }
}

/// Courier pickup scheduled at a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub pickup_id: String,
    pub pickup_location: String,
    pub pickup_date: Timestamp,
    pub slot: String,
    pub courier: String,
    pub transport_mode: String,
    pub expected_packages: u32,
    #[serde(default)]
    pub picked_packages: Option<u32>,
    pub status: PickupState,
    pub created_at: Timestamp,
}

impl Record for PickupRequest {
    fn id(&self) -> &str {
        &self.pickup_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_order_decodes_camel_case() {
        let json = serde_json::json!({
            "orderId": "ORD001",
            "orderDate": "2026-10-01T10:00:00Z",
            "customerName": "Asha Rao",
            "destinationCity": "Pune",
            "destinationPincode": "411001",
            "pickupLocation": "WH-BOM-01",
            "paymentMode": "cod",
            "transportMode": "surface",
            "amount": 1299.0,
            "weightKg": 0.8,
            "status": "pending"
        });
        let order: ForwardOrder = serde_json::from_value(json).unwrap();
        assert_eq!(order.id(), "ORD001");
        assert_eq!(order.awb_number(), None);
        assert_eq!(order.status, ForwardState::Pending);
    }

    #[test]
    fn pickups_never_take_an_awb() {
        let json = serde_json::json!({
            "pickupId": "PCK1",
            "pickupLocation": "WH-DEL-01",
            "pickupDate": "2026-10-02T09:00:00Z",
            "slot": "10:00-13:00",
            "courier": "Delhivery",
            "transportMode": "surface",
            "expectedPackages": 12,
            "status": "scheduled",
            "createdAt": "2026-10-01T09:00:00Z"
        });
        let mut pickup: PickupRequest = serde_json::from_value(json).unwrap();
        assert!(!pickup.attach_awb("AWB1".to_string()));
        assert_eq!(pickup.awb_number(), None);
    }
}
