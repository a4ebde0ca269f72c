// src/ai_response.rs
use crate::error::AIError;
use crate::game_state::{GamePhase, Scene};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;

pub const TURN_SCHEMA_NAME: &str = "linglong_turn";

/// Phases the Game Master is allowed to declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    Narrative,
    Investigation,
    Dialogue,
}

impl From<TurnPhase> for GamePhase {
    fn from(phase: TurnPhase) -> Self {
        match phase {
            TurnPhase::Narrative => GamePhase::Narrative,
            TurnPhase::Investigation => GamePhase::Investigation,
            TurnPhase::Dialogue => GamePhase::Dialogue,
        }
    }
}

/// One structured reply from the Game Master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub narrative: String,
    pub speaker: String,
    pub game_phase: TurnPhase,
    pub scene: Scene,
}

impl TurnResult {
    /// Parses the raw completion text, tolerating a wrapping Markdown code fence.
    pub fn from_ai_text(raw: &str) -> Result<Self, AIError> {
        let cleaned = strip_code_fence(raw);
        let turn: TurnResult = serde_json::from_str(cleaned)?;
        turn.validate()?;
        Ok(turn)
    }

    fn validate(&self) -> Result<(), AIError> {
        let mut seen = HashSet::new();
        for point in &self.scene.investigation_points {
            if !seen.insert(point.id.as_str()) {
                return Err(AIError::InvalidTurn(format!(
                    "duplicate investigation point id '{}'",
                    point.id
                )));
            }
        }
        Ok(())
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let opened = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    opened
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(opened)
        .trim()
}

/// JSON schema handed to the model as its structured output format.
pub fn turn_result_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["narrative", "speaker", "gamePhase", "scene"],
        "properties": {
            "narrative": {
                "type": "string",
                "description": "The story text or the spoken line for this turn, shown to the player."
            },
            "speaker": {
                "type": "string",
                "description": "Name of the character speaking. Use '旁白' for narration."
            },
            "gamePhase": {
                "type": "string",
                "enum": ["NARRATIVE", "INVESTIGATION", "DIALOGUE"],
                "description": "Phase of the game after this turn."
            },
            "scene": {
                "type": "object",
                "additionalProperties": false,
                "required": ["location", "locationImagePrompt", "characters", "investigationPoints"],
                "description": "The complete, updated state of the current scene.",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Name of the current location, e.g. '书房'."
                    },
                    "locationImagePrompt": {
                        "type": "string",
                        "description": "Detailed English prompt describing the location for an illustration."
                    },
                    "characters": {
                        "type": "array",
                        "description": "Characters present in the location. Never includes '岳玲珑'.",
                        "items": { "type": "string" }
                    },
                    "investigationPoints": {
                        "type": "array",
                        "description": "Points of interest the player can investigate, each with a unique id.",
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["id", "name"],
                            "properties": {
                                "id": { "type": "string", "description": "Unique id, e.g. 'desk_clue_1'." },
                                "name": { "type": "string", "description": "Name shown to the player." }
                            }
                        }
                    }
                }
            }
        }
    })
}
