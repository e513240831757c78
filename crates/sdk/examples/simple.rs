//! Simple SDK Example
//!
//! Reads the volume widget, presses its mute toggle and reads it again.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package dashpanel-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use dashpanel_sdk::DashpanelClient;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("dashpanel SDK - Simple Example");
    println!("==============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = DashpanelClient::connect("http://127.0.0.1:9531").await?;
    println!("   ✓ Connected\n");

    // 2. Whole dashboard
    println!("2. Fetching snapshot...");
    let snapshot = client.snapshot().await?;
    for widget in &snapshot.widgets {
        println!("   {} {} ({} rows)", widget.icon, widget.title, widget.rows.len());
    }
    println!();

    // 3. One widget
    println!("3. Reading volume...");
    let volume = client.widget("volume").await?;
    println!("   - Level: {}", volume.field_value("level").unwrap_or("?"));
    println!("   - Mute:  {}\n", volume.field_value("mute").unwrap_or("?"));

    // 4. Press a button
    println!("4. Toggling mute...");
    let response = client.press("volume", "toggle_mute").await?;
    println!("   ✓ Dispatched: {}\n", response.dispatch_id);

    // 5. The change shows up on the next poll (every 500 ms)
    println!("5. Waiting for the next poll...");
    tokio::time::sleep(Duration::from_millis(800)).await;
    let volume = client.widget("volume").await?;
    println!("   - Mute:  {}", volume.field_value("mute").unwrap_or("?"));

    println!("\n✓ Example completed successfully!");

    Ok(())
}
