//! Dispatch theme and color utilities.

use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct DispatchTheme {
    pub bg: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl DispatchTheme {
    pub fn dispatch() -> Self {
        Self {
            bg: Color::Rgb(12, 14, 20),
            bg_secondary: Color::Rgb(24, 28, 38),
            bg_highlight: Color::Rgb(40, 46, 62),
            primary: Color::Rgb(255, 140, 0),
            primary_dim: Color::Rgb(140, 78, 0),
            secondary: Color::Rgb(90, 170, 255),
            tertiary: Color::Rgb(190, 130, 255),
            success: Color::Rgb(60, 200, 110),
            warning: Color::Rgb(250, 200, 50),
            error: Color::Rgb(240, 70, 70),
            info: Color::Rgb(90, 170, 255),
            text: Color::Rgb(235, 235, 235),
            text_dim: Color::Rgb(140, 140, 150),
            text_muted: Color::Rgb(80, 80, 90),
            border: Color::Rgb(70, 74, 88),
            border_focus: Color::Rgb(255, 140, 0),
        }
    }
}

/// Badge color for a lifecycle label as rendered in status cells and tabs.
pub fn status_color(label: &str, theme: &DispatchTheme) -> Color {
    match label.trim().to_ascii_lowercase().as_str() {
        "pending" | "scheduled" => theme.warning,
        "ready to ship" | "ready for pickup" => theme.secondary,
        "in transit" | "out for delivery" | "picked up" => theme.primary,
        "rto in transit" => theme.tertiary,
        "delivered" => theme.success,
        "cancelled" => theme.error,
        _ => theme.text_dim,
    }
}

pub fn batch_color(failed: u64, theme: &DispatchTheme) -> Color {
    if failed == 0 {
        theme.success
    } else {
        theme.warning
    }
}
