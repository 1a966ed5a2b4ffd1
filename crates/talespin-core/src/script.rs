//! Script identity and position bookmarks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an executable script: the root script of an authored event or
/// one of its named branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRef {
    /// The authored event id.
    pub event_id: String,
    /// The branch name, or `None` for the event's root script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl ScriptRef {
    /// Refers to the root script of `event_id`.
    #[must_use]
    pub fn event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            branch: None,
        }
    }

    /// Refers to branch `branch` of `event_id`.
    #[must_use]
    pub fn branch(event_id: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            branch: Some(branch.into()),
        }
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}/{branch}", self.event_id),
            None => f.write_str(&self.event_id),
        }
    }
}

/// Position pointer into the currently active script.
///
/// `current_step` counts the suspension calls of `current_event` that have
/// completed. `replies[i]` holds the value the `(i + 1)`-th call resolved
/// with, so replay can hand the same answers back to the script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// The script being executed, if any.
    pub current_event: Option<ScriptRef>,
    /// Number of completed suspension calls.
    pub current_step: u32,
    /// Resolution values of the completed calls, oldest first.
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}
