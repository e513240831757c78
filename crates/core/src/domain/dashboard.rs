// Dashboard - ordered composition of widgets

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::{DomainError, Result};
use super::widget::WidgetSpec;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSpec {
    pub widgets: Vec<WidgetSpec>,
}

impl DashboardSpec {
    pub fn new(widgets: Vec<WidgetSpec>) -> Self {
        Self { widgets }
    }

    pub fn widget(&self, name: &str) -> Option<&WidgetSpec> {
        self.widgets.iter().find(|w| w.name == name)
    }

    pub fn poll_count(&self) -> usize {
        self.widgets.iter().map(|w| w.polls.len()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for widget in &self.widgets {
            if !names.insert(widget.name.as_str()) {
                return Err(DomainError::Duplicate {
                    kind: "widget",
                    name: widget.name.clone(),
                });
            }
            widget.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PollSpec;

    #[test]
    fn test_duplicate_widget_names_are_rejected() {
        let spec = DashboardSpec::new(vec![
            WidgetSpec::new("clock", "Clock"),
            WidgetSpec::new("clock", "Clock again"),
        ]);
        assert_eq!(
            spec.validate().unwrap_err(),
            DomainError::Duplicate {
                kind: "widget",
                name: "clock".to_string()
            }
        );
    }

    #[test]
    fn test_poll_count_spans_widgets() {
        let spec = DashboardSpec::new(vec![
            WidgetSpec::new("a", "A").poll("x", PollSpec::new("", 10, "true")),
            WidgetSpec::new("b", "B")
                .poll("y", PollSpec::new("", 10, "true"))
                .poll("z", PollSpec::new("", 10, "true")),
        ]);
        assert_eq!(spec.poll_count(), 3);
    }
}
