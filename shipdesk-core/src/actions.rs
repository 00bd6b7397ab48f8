//! Row actions per resource kind.

use crate::schema::{ActionEffect, RowAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAction {
    ViewDetails,
    GenerateAwb,
    ShipNow,
    SchedulePickup,
    PrintLabel,
    Track,
    Cancel,
    RaiseNdr,
    CloneOrder,
}

impl RowAction for ForwardAction {
    fn as_str(&self) -> &'static str {
        match self {
            ForwardAction::ViewDetails => "view_details",
            ForwardAction::GenerateAwb => "generate_awb",
            ForwardAction::ShipNow => "ship_now",
            ForwardAction::SchedulePickup => "schedule_pickup",
            ForwardAction::PrintLabel => "print_label",
            ForwardAction::Track => "track",
            ForwardAction::Cancel => "cancel",
            ForwardAction::RaiseNdr => "raise_ndr",
            ForwardAction::CloneOrder => "clone_order",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ForwardAction::ViewDetails => "Details",
            ForwardAction::GenerateAwb => "Generate AWB",
            ForwardAction::ShipNow => "Ship Now",
            ForwardAction::SchedulePickup => "Schedule Pickup",
            ForwardAction::PrintLabel => "Label",
            ForwardAction::Track => "Track",
            ForwardAction::Cancel => "Cancel",
            ForwardAction::RaiseNdr => "NDR",
            ForwardAction::CloneOrder => "Clone",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            ForwardAction::ViewDetails => "👁",
            ForwardAction::GenerateAwb => "🏷",
            ForwardAction::ShipNow => "🚚",
            ForwardAction::SchedulePickup => "📅",
            ForwardAction::PrintLabel => "🖨",
            ForwardAction::Track => "📍",
            ForwardAction::Cancel => "✖",
            ForwardAction::RaiseNdr => "⚠",
            ForwardAction::CloneOrder => "⧉",
        }
    }

    fn hotkey(&self) -> char {
        match self {
            ForwardAction::ViewDetails => 'D',
            ForwardAction::GenerateAwb => 'A',
            ForwardAction::ShipNow => 'H',
            ForwardAction::SchedulePickup => 'P',
            ForwardAction::PrintLabel => 'L',
            ForwardAction::Track => 'T',
            ForwardAction::Cancel => 'C',
            ForwardAction::RaiseNdr => 'N',
            ForwardAction::CloneOrder => 'O',
        }
    }

    fn effect(&self) -> ActionEffect {
        match self {
            ForwardAction::ViewDetails => ActionEffect::ViewDetails,
            ForwardAction::GenerateAwb => ActionEffect::GenerateAwb,
            ForwardAction::ShipNow => ActionEffect::Manifest,
            ForwardAction::SchedulePickup
            | ForwardAction::PrintLabel
            | ForwardAction::Track
            | ForwardAction::Cancel
            | ForwardAction::RaiseNdr
            | ForwardAction::CloneOrder => ActionEffect::External,
        }
    }

    fn requires_awb(&self) -> bool {
        matches!(
            self,
            ForwardAction::PrintLabel | ForwardAction::Track | ForwardAction::SchedulePickup
        )
    }

    fn forbids_awb(&self) -> bool {
        matches!(self, ForwardAction::GenerateAwb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverseAction {
    ViewDetails,
    GenerateAwb,
    SchedulePickup,
    PrintLabel,
    Track,
    Cancel,
}

impl RowAction for ReverseAction {
    fn as_str(&self) -> &'static str {
        match self {
            ReverseAction::ViewDetails => "view_details",
            ReverseAction::GenerateAwb => "generate_awb",
            ReverseAction::SchedulePickup => "schedule_pickup",
            ReverseAction::PrintLabel => "print_label",
            ReverseAction::Track => "track",
            ReverseAction::Cancel => "cancel",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReverseAction::ViewDetails => "Details",
            ReverseAction::GenerateAwb => "Generate AWB",
            ReverseAction::SchedulePickup => "Schedule Pickup",
            ReverseAction::PrintLabel => "Label",
            ReverseAction::Track => "Track",
            ReverseAction::Cancel => "Cancel",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            ReverseAction::ViewDetails => "👁",
            ReverseAction::GenerateAwb => "🏷",
            ReverseAction::SchedulePickup => "📅",
            ReverseAction::PrintLabel => "🖨",
            ReverseAction::Track => "📍",
            ReverseAction::Cancel => "✖",
        }
    }

    fn hotkey(&self) -> char {
        match self {
            ReverseAction::ViewDetails => 'D',
            ReverseAction::GenerateAwb => 'A',
            ReverseAction::SchedulePickup => 'P',
            ReverseAction::PrintLabel => 'L',
            ReverseAction::Track => 'T',
            ReverseAction::Cancel => 'C',
        }
    }

    fn effect(&self) -> ActionEffect {
        match self {
            ReverseAction::ViewDetails => ActionEffect::ViewDetails,
            ReverseAction::GenerateAwb => ActionEffect::GenerateAwb,
            ReverseAction::SchedulePickup
            | ReverseAction::PrintLabel
            | ReverseAction::Track
            | ReverseAction::Cancel => ActionEffect::External,
        }
    }

    fn requires_awb(&self) -> bool {
        matches!(
            self,
            ReverseAction::PrintLabel | ReverseAction::Track | ReverseAction::SchedulePickup
        )
    }

    fn forbids_awb(&self) -> bool {
        matches!(self, ReverseAction::GenerateAwb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupAction {
    ViewDetails,
    Reschedule,
    Cancel,
}

impl RowAction for PickupAction {
    fn as_str(&self) -> &'static str {
        match self {
            PickupAction::ViewDetails => "view_details",
            PickupAction::Reschedule => "reschedule",
            PickupAction::Cancel => "cancel",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PickupAction::ViewDetails => "Details",
            PickupAction::Reschedule => "Reschedule",
            PickupAction::Cancel => "Cancel",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            PickupAction::ViewDetails => "👁",
            PickupAction::Reschedule => "📅",
            PickupAction::Cancel => "✖",
        }
    }

    fn hotkey(&self) -> char {
        match self {
            PickupAction::ViewDetails => 'D',
            PickupAction::Reschedule => 'R',
            PickupAction::Cancel => 'C',
        }
    }

    fn effect(&self) -> ActionEffect {
        match self {
            PickupAction::ViewDetails => ActionEffect::ViewDetails,
            PickupAction::Reschedule | PickupAction::Cancel => ActionEffect::External,
        }
    }
}
