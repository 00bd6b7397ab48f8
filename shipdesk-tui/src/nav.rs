//! Navigation between the resource tables.

use serde::{Deserialize, Serialize};
use shipdesk_core::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Orders,
    Returns,
    Pickups,
}

impl View {
    pub fn title(&self) -> &'static str {
        self.resource().title()
    }

    pub fn resource(&self) -> ResourceKind {
        match self {
            View::Orders => ResourceKind::ForwardOrders,
            View::Returns => ResourceKind::ReverseOrders,
            View::Pickups => ResourceKind::PickupRequests,
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Orders, View::Returns, View::Pickups]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
