//! Reusable widget components.

pub mod detail;
pub mod filter;
pub mod status;

pub use detail::DetailPanel;
pub use filter::{filter_chips, FilterBar, FilterChip};
pub use status::StatusIndicator;
