//! Event types for the TUI event loop.

use crate::controller::FetchOutcome;
use crossterm::event::KeyEvent;
use shipdesk_core::{ForwardOrders, PickupRequests, ReverseOrders};

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    OrdersFetched(FetchOutcome<ForwardOrders>),
    ReturnsFetched(FetchOutcome<ReverseOrders>),
    PickupsFetched(FetchOutcome<PickupRequests>),
}
