//! Presenter port: what the engine would show the player.
//!
//! Rendering is an external collaborator. The engine reports every
//! presentation through this port so hosts (and tests) can observe it.

use serde::{Deserialize, Serialize};

use crate::script::ScriptRef;

/// One option offered by a choice presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Value handed back to the script when picked.
    pub id: String,
    /// Label shown to the player.
    pub label: String,
}

impl Choice {
    /// Creates a choice.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Summary of a player action for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    /// The action id.
    pub id: String,
    /// The display name.
    pub name: String,
}

/// Something the engine wants shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Presentation {
    /// A line of text waiting for the player to continue.
    Text {
        /// The script presenting the text.
        script: ScriptRef,
        /// Completed steps before this one.
        step: u32,
        /// Who is speaking, if anyone.
        speaker: Option<String>,
        /// The text itself.
        text: String,
    },
    /// A set of choices waiting for a selection.
    Choices {
        /// The script presenting the choices.
        script: ScriptRef,
        /// Completed steps before this one.
        step: u32,
        /// The offered choices.
        choices: Vec<Choice>,
    },
    /// A custom blocking interaction resolved by the host.
    CustomLogic {
        /// The script requesting the interaction.
        script: ScriptRef,
        /// Completed steps before this one.
        step: u32,
        /// Name of the interaction.
        name: String,
        /// Arguments for the interaction.
        payload: serde_json::Value,
    },
    /// The background image changed.
    Background {
        /// The new background.
        image: String,
    },
    /// The foreground overlay changed.
    Foreground {
        /// The new overlay, or `None` to clear it.
        image: Option<String>,
    },
    /// The set of accessible actions changed.
    Actions {
        /// Accessible actions, global first.
        actions: Vec<ActionSummary>,
    },
    /// A script ran to completion.
    ScriptFinished {
        /// The finished script.
        script: ScriptRef,
    },
}

impl Presentation {
    /// Returns `true` for presentations that block on player input.
    #[must_use]
    pub fn is_suspension(&self) -> bool {
        matches!(
            self,
            Self::Text { .. } | Self::Choices { .. } | Self::CustomLogic { .. }
        )
    }

    /// Returns the step of a suspension presentation.
    #[must_use]
    pub fn step(&self) -> Option<u32> {
        match self {
            Self::Text { step, .. } | Self::Choices { step, .. } | Self::CustomLogic { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }
}

/// UI collaborator receiving presentations.
pub trait Presenter: Send + Sync {
    /// Shows (or records) a presentation. Must not block.
    fn present(&self, presentation: Presentation);
}
