//! SDK Response Types
//!
//! Mirrors the snapshot and RPC types served by the daemon.

use serde::{Deserialize, Serialize};

/// Where a displayed value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// No run has completed yet; the value is the fallback
    Pending,
    Success,
    /// The last run failed; the value is the fallback
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowSnapshot {
    Text {
        text: String,
    },
    Field {
        label: Option<String>,
        poll: String,
        value: String,
        outcome: PollOutcome,
    },
    Button {
        label: String,
        action: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub name: String,
    pub title: String,
    pub icon: String,
    pub rows: Vec<RowSnapshot>,
}

impl WidgetSnapshot {
    /// Current value of a bound field
    pub fn field_value(&self, poll: &str) -> Option<&str> {
        self.rows.iter().find_map(|row| match row {
            RowSnapshot::Field {
                poll: p, value, ..
            } if p == poll => Some(value.as_str()),
            _ => None,
        })
    }

    /// Action names of the widget's buttons, in display order
    pub fn actions(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                RowSnapshot::Button { action, .. } => Some(action.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub taken_at_ms: i64,
    pub widgets: Vec<WidgetSnapshot>,
}

impl DashboardSnapshot {
    pub fn widget(&self, name: &str) -> Option<&WidgetSnapshot> {
        self.widgets.iter().find(|w| w.name == name)
    }
}

/// Response from action.dispatch.v1
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchResponse {
    pub widget: String,
    pub action: String,
    pub dispatch_id: String,
    pub accepted: bool,
}

/// Response from admin.stats.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub widgets: usize,
    pub polls: usize,
    pub poll_runs: u64,
    pub poll_failures: u64,
    pub dispatched: u64,
    pub dispatch_succeeded: u64,
    pub dispatch_failed: u64,
    pub uptime_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_snapshot_from_wire() {
        let widget: WidgetSnapshot = serde_json::from_value(json!({
            "name": "volume",
            "title": "Volume",
            "icon": "🔊",
            "rows": [
                { "kind": "field", "label": null, "poll": "level", "value": "42%", "outcome": "success" },
                { "kind": "button", "label": "🔇", "action": "toggle_mute" },
                { "kind": "button", "label": "+", "action": "up" }
            ]
        }))
        .unwrap();

        assert_eq!(widget.field_value("level"), Some("42%"));
        assert_eq!(widget.field_value("mute"), None);
        assert_eq!(widget.actions(), vec!["toggle_mute", "up"]);
    }
}
