// Domain Layer - Widget, poll and action definitions

pub mod action;
pub mod dashboard;
pub mod error;
pub mod name;
pub mod poll;
pub mod snapshot;
pub mod widget;

// Re-exports
pub use action::ActionSpec;
pub use dashboard::DashboardSpec;
pub use error::DomainError;
pub use name::validate_name;
pub use poll::{normalize_output, PollOutcome, PollSpec, PollState};
pub use snapshot::{DashboardSnapshot, RowSnapshot, WidgetSnapshot};
pub use widget::{WidgetRow, WidgetSpec};
