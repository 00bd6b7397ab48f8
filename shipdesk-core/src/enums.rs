//! Enum types for Shipdesk resources and their lifecycle states

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// ============================================================================
// RESOURCE KINDS
// ============================================================================

/// The list resources served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ForwardOrders,
    ReverseOrders,
    PickupRequests,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::ForwardOrders,
            ResourceKind::ReverseOrders,
            ResourceKind::PickupRequests,
        ]
    }

    /// REST path prefix for this resource.
    pub fn base_path(&self) -> &'static str {
        match self {
            ResourceKind::ForwardOrders => "/orders",
            ResourceKind::ReverseOrders => "/reverse-orders",
            ResourceKind::PickupRequests => "/pickup-requests",
        }
    }

    /// Body key carrying row ids in batch requests (manifest).
    pub fn id_field(&self) -> &'static str {
        match self {
            ResourceKind::ForwardOrders => "order_ids",
            ResourceKind::ReverseOrders => "return_ids",
            ResourceKind::PickupRequests => "pickup_ids",
        }
    }

    /// Whether AWB generation, manifesting and bulk upload exist for this resource.
    pub fn supports_shipping(&self) -> bool {
        matches!(self, ResourceKind::ForwardOrders | ResourceKind::ReverseOrders)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::ForwardOrders => "Orders",
            ResourceKind::ReverseOrders => "Returns",
            ResourceKind::PickupRequests => "Pickups",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ============================================================================
// LIFECYCLE STATES
// ============================================================================

/// A closed set of lifecycle states for one resource kind.
///
/// `ALL` lists every state in tab order and always ends with the synthetic
/// aggregate state. `ordinal` is the position of a state inside `ALL`.
pub trait Lifecycle:
    Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const ALL: &'static [Self];
    const AGGREGATE: Self;

    fn as_str(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn ordinal(&self) -> usize;

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|state| state.as_str() == s)
    }

    fn is_aggregate(&self) -> bool {
        *self == Self::AGGREGATE
    }

    /// Every state except the aggregate one.
    fn concrete() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(|state| !state.is_aggregate())
    }
}

/// Lifecycle of a forward (outbound) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardState {
    Pending,
    ReadyToShip,
    ReadyForPickup,
    InTransit,
    RtoInTransit,
    Delivered,
    AllShipments,
}

impl Lifecycle for ForwardState {
    const ALL: &'static [Self] = &[
        ForwardState::Pending,
        ForwardState::ReadyToShip,
        ForwardState::ReadyForPickup,
        ForwardState::InTransit,
        ForwardState::RtoInTransit,
        ForwardState::Delivered,
        ForwardState::AllShipments,
    ];
    const AGGREGATE: Self = ForwardState::AllShipments;

    fn as_str(&self) -> &'static str {
        match self {
            ForwardState::Pending => "pending",
            ForwardState::ReadyToShip => "ready_to_ship",
            ForwardState::ReadyForPickup => "ready_for_pickup",
            ForwardState::InTransit => "in_transit",
            ForwardState::RtoInTransit => "rto_in_transit",
            ForwardState::Delivered => "delivered",
            ForwardState::AllShipments => "all_shipments",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ForwardState::Pending => "Pending",
            ForwardState::ReadyToShip => "Ready To Ship",
            ForwardState::ReadyForPickup => "Ready For Pickup",
            ForwardState::InTransit => "In Transit",
            ForwardState::RtoInTransit => "RTO In Transit",
            ForwardState::Delivered => "Delivered",
            ForwardState::AllShipments => "All Shipments",
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            ForwardState::Pending => 0,
            ForwardState::ReadyToShip => 1,
            ForwardState::ReadyForPickup => 2,
            ForwardState::InTransit => 3,
            ForwardState::RtoInTransit => 4,
            ForwardState::Delivered => 5,
            ForwardState::AllShipments => 6,
        }
    }
}

/// Lifecycle of a reverse order (customer return).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverseState {
    Pending,
    ReadyForPickup,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
    AllShipments,
}

impl Lifecycle for ReverseState {
    const ALL: &'static [Self] = &[
        ReverseState::Pending,
        ReverseState::ReadyForPickup,
        ReverseState::InTransit,
        ReverseState::OutForDelivery,
        ReverseState::Delivered,
        ReverseState::Cancelled,
        ReverseState::AllShipments,
    ];
    const AGGREGATE: Self = ReverseState::AllShipments;

    fn as_str(&self) -> &'static str {
        match self {
            ReverseState::Pending => "pending",
            ReverseState::ReadyForPickup => "ready_for_pickup",
            ReverseState::InTransit => "in_transit",
            ReverseState::OutForDelivery => "out_for_delivery",
            ReverseState::Delivered => "delivered",
            ReverseState::Cancelled => "cancelled",
            ReverseState::AllShipments => "all_shipments",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReverseState::Pending => "Pending",
            ReverseState::ReadyForPickup => "Ready For Pickup",
            ReverseState::InTransit => "In Transit",
            ReverseState::OutForDelivery => "Out For Delivery",
            ReverseState::Delivered => "Delivered",
            ReverseState::Cancelled => "Cancelled",
            ReverseState::AllShipments => "All Shipments",
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            ReverseState::Pending => 0,
            ReverseState::ReadyForPickup => 1,
            ReverseState::InTransit => 2,
            ReverseState::OutForDelivery => 3,
            ReverseState::Delivered => 4,
            ReverseState::Cancelled => 5,
            ReverseState::AllShipments => 6,
        }
    }
}

/// Lifecycle of a courier pickup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupState {
    Scheduled,
    PickedUp,
    Cancelled,
    AllShipments,
}

impl Lifecycle for PickupState {
    const ALL: &'static [Self] = &[
        PickupState::Scheduled,
        PickupState::PickedUp,
        PickupState::Cancelled,
        PickupState::AllShipments,
    ];
    const AGGREGATE: Self = PickupState::AllShipments;

    fn as_str(&self) -> &'static str {
        match self {
            PickupState::Scheduled => "scheduled",
            PickupState::PickedUp => "picked_up",
            PickupState::Cancelled => "cancelled",
            PickupState::AllShipments => "all_shipments",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PickupState::Scheduled => "Scheduled",
            PickupState::PickedUp => "Picked Up",
            PickupState::Cancelled => "Cancelled",
            PickupState::AllShipments => "All Requests",
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            PickupState::Scheduled => 0,
            PickupState::PickedUp => 1,
            PickupState::Cancelled => 2,
            PickupState::AllShipments => 3,
        }
    }
}

macro_rules! lifecycle_display {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

lifecycle_display!(ForwardState, ReverseState, PickupState);

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordinals_match_positions<S: Lifecycle>() {
        for (index, state) in S::ALL.iter().enumerate() {
            assert_eq!(state.ordinal(), index, "{:?}", state);
            assert_eq!(S::parse(state.as_str()), Some(*state));
        }
        assert_eq!(S::ALL.last(), Some(&S::AGGREGATE));
        assert_eq!(S::concrete().count(), S::ALL.len() - 1);
    }

    #[test]
    fn lifecycle_ordinals_follow_tab_order() {
        ordinals_match_positions::<ForwardState>();
        ordinals_match_positions::<ReverseState>();
        ordinals_match_positions::<PickupState>();
    }

    #[test]
    fn wire_names_match_serde() {
        let json = serde_json::to_string(&ForwardState::RtoInTransit).unwrap();
        assert_eq!(json, "\"rto_in_transit\"");
        let state: ReverseState = serde_json::from_str("\"out_for_delivery\"").unwrap();
        assert_eq!(state, ReverseState::OutForDelivery);
    }

    #[test]
    fn unknown_state_does_not_parse() {
        assert_eq!(ForwardState::parse("lost"), None);
        assert_eq!(PickupState::parse("pending"), None);
    }

    #[test]
    fn only_shipments_support_awb() {
        assert!(ResourceKind::ForwardOrders.supports_shipping());
        assert!(ResourceKind::ReverseOrders.supports_shipping());
        assert!(!ResourceKind::PickupRequests.supports_shipping());
    }
}
