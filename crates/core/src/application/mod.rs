// Application Layer - Polling primitives and dashboard use cases

pub mod catalog;
pub mod constants;
pub mod dashboard;
pub mod dispatcher;
pub mod poller;
mod shutdown;

// Re-exports
pub use dashboard::{Dashboard, DashboardOptions, DashboardStats, MountedDashboard, PollChange};
pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher};
pub use poller::{PollHandle, PollObserver, Poller};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
