// Snapshots - widget rows resolved against current poll values

use serde::{Deserialize, Serialize};

use super::poll::PollOutcome;

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
    /// Current value of a bound field, if the widget shows that poll
    pub fn field_value(&self, poll: &str) -> Option<&str> {
        self.rows.iter().find_map(|row| match row {
            RowSnapshot::Field {
                poll: p, value, ..
            } if p == poll => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub taken_at_ms: i64,
    pub widgets: Vec<WidgetSnapshot>,
}
