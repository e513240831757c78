//! dashpanel SDK - Rust Client Library
//!
//! Reads widget values from a running `dashpaneld` and presses its buttons.
//!
//! # Example
//!
//! ```no_run
//! use dashpanel_sdk::DashpanelClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashpanelClient::connect("http://127.0.0.1:9531").await?;
//!
//!     let volume = client.widget("volume").await?;
//!     println!("Volume: {}", volume.field_value("level").unwrap_or("?"));
//!
//!     client.press("volume", "up").await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::DashpanelClient;
pub use error::{Result, SdkError};
pub use types::{
    DashboardSnapshot, DispatchResponse, PollOutcome, RowSnapshot, StatsResponse,
    WidgetSnapshot,
};
