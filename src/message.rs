use serde::{Deserialize, Serialize};

use crate::prompts::PLAYER_LABEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Player,
    Storyteller,
}

/// One line of a dialogue sub-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    pub speaker: Option<String>,
}

impl Message {
    pub fn from_player(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::Player,
            content: content.into(),
            speaker: Some(PLAYER_LABEL.to_string()),
        }
    }

    pub fn from_storyteller(content: impl Into<String>, speaker: impl Into<String>) -> Self {
        let speaker = speaker.into();
        Message {
            sender: Sender::Storyteller,
            content: content.into(),
            speaker: (!speaker.is_empty()).then_some(speaker),
        }
    }
}
