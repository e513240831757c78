//! dashpanel Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{DashboardSnapshot, DispatchResponse, StatsResponse, WidgetSnapshot};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// dashpanel daemon client
///
/// # Example
///
/// ```no_run
/// use dashpanel_sdk::DashpanelClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DashpanelClient::connect("http://127.0.0.1:9531").await?;
/// # Ok(())
/// # }
/// ```
pub struct DashpanelClient {
    client: HttpClient,
}

impl DashpanelClient {
    /// Connect to the daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9531`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Every widget with its rows resolved against current values
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        let snapshot: DashboardSnapshot = self
            .client
            .request("dashboard.snapshot.v1", rpc_params![])
            .await?;

        Ok(snapshot)
    }

    /// One widget by name
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use dashpanel_sdk::DashpanelClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = DashpanelClient::connect("http://127.0.0.1:9531").await?;
    /// let network = client.widget("network").await?;
    /// println!("{}", network.field_value("speed").unwrap_or_default());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn widget(&self, name: impl Into<String>) -> Result<WidgetSnapshot> {
        let mut params = ObjectParams::new();
        params.insert("widget", name.into())?;

        let widget: WidgetSnapshot = self.client.request("widget.get.v1", params).await?;
        Ok(widget)
    }

    /// Press a widget button
    ///
    /// Returns once the command is queued. Its effect shows up on the
    /// affected values' next poll.
    pub async fn press(
        &self,
        widget: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<DispatchResponse> {
        let mut params = ObjectParams::new();
        params.insert("widget", widget.into())?;
        params.insert("action", action.into())?;

        let response: DispatchResponse =
            self.client.request("action.dispatch.v1", params).await?;
        Ok(response)
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let stats: StatsResponse = self.client.request("admin.stats.v1", rpc_params![]).await?;
        Ok(stats)
    }
}
