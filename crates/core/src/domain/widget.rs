// Widget - a named group of polls, actions and display rows
//
// The row list is the declarative tree handed to a UI toolkit: rows bind
// labels to poll names and buttons to action names, never to commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::ActionSpec;
use super::error::{DomainError, Result};
use super::name::validate_name;
use super::poll::PollSpec;

/// One display row of a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetRow {
    /// Static text
    Text { text: String },
    /// Label bound to a poll value, with an optional caption ("CPU:")
    Field {
        #[serde(default)]
        label: Option<String>,
        poll: String,
    },
    /// Button dispatching an action; its label may itself be bound to a poll
    Button {
        label: String,
        action: String,
        #[serde(default)]
        label_poll: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSpec {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    /// External utilities the snippets expect on PATH
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub polls: BTreeMap<String, PollSpec>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionSpec>,
    #[serde(default)]
    pub rows: Vec<WidgetRow>,
}

impl WidgetSpec {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            icon: String::new(),
            requires: Vec::new(),
            polls: BTreeMap::new(),
            actions: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn requires(mut self, tools: &[&str]) -> Self {
        self.requires.extend(tools.iter().map(|t| t.to_string()));
        self
    }

    pub fn poll(mut self, name: impl Into<String>, spec: PollSpec) -> Self {
        self.polls.insert(name.into(), spec);
        self
    }

    pub fn action(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.actions.insert(name.into(), ActionSpec::new(command));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.rows.push(WidgetRow::Text { text: text.into() });
        self
    }

    /// Row showing a poll value with a caption
    pub fn field(mut self, label: impl Into<String>, poll: impl Into<String>) -> Self {
        self.rows.push(WidgetRow::Field {
            label: Some(label.into()),
            poll: poll.into(),
        });
        self
    }

    /// Row showing a bare poll value
    pub fn value(mut self, poll: impl Into<String>) -> Self {
        self.rows.push(WidgetRow::Field {
            label: None,
            poll: poll.into(),
        });
        self
    }

    pub fn button(mut self, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.rows.push(WidgetRow::Button {
            label: label.into(),
            action: action.into(),
            label_poll: None,
        });
        self
    }

    /// Button whose label follows a poll value (e.g. mute icon)
    pub fn bound_button(
        mut self,
        label: impl Into<String>,
        action: impl Into<String>,
        label_poll: impl Into<String>,
    ) -> Self {
        self.rows.push(WidgetRow::Button {
            label: label.into(),
            action: action.into(),
            label_poll: Some(label_poll.into()),
        });
        self
    }

    /// Validate names, poll intervals and that every row points at a declared poll/action
    pub fn validate(&self) -> Result<()> {
        validate_name("widget", &self.name)?;

        for (name, poll) in &self.polls {
            poll.validate(name)?;
        }
        for (name, action) in &self.actions {
            action.validate(name)?;
        }

        for row in &self.rows {
            match row {
                WidgetRow::Text { .. } => {}
                WidgetRow::Field { poll, .. } => self.check_poll(poll)?,
                WidgetRow::Button {
                    action, label_poll, ..
                } => {
                    if !self.actions.contains_key(action) {
                        return Err(self.dangling("action", action));
                    }
                    if let Some(poll) = label_poll {
                        self.check_poll(poll)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_poll(&self, poll: &str) -> Result<()> {
        if self.polls.contains_key(poll) {
            Ok(())
        } else {
            Err(self.dangling("poll", poll))
        }
    }

    fn dangling(&self, kind: &'static str, name: &str) -> DomainError {
        DomainError::DanglingReference {
            widget: self.name.clone(),
            kind,
            name: name.to_string(),
        }
    }
}
