use crate::message::Message;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Coarse UI mode gating which player actions are available.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    Starting,
    Narrative,
    Investigation,
    Dialogue,
}

/// A clickable hotspot in the current scene. Identity is the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationPoint {
    pub id: String,
    pub name: String,
}

/// The scene as last described by the Game Master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub location: String,
    pub location_image_prompt: String,
    // Present NPCs, never the partner.
    pub characters: Vec<String>,
    pub investigation_points: Vec<InvestigationPoint>,
}

impl Scene {
    pub fn find_point(&self, id: &str) -> Option<&InvestigationPoint> {
        self.investigation_points.iter().find(|point| point.id == id)
    }

    /// Drops the point with the given id and reports whether one was removed.
    pub fn remove_point(&mut self, id: &str) -> bool {
        let before = self.investigation_points.len();
        self.investigation_points.retain(|point| point.id != id);
        self.investigation_points.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedClue {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A clue description waiting for the player to acknowledge it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInvestigation {
    pub point: InvestigationPoint,
    pub description: String,
}

impl PendingInvestigation {
    pub fn into_clue(self) -> CollectedClue {
        CollectedClue {
            id: self.point.id,
            name: self.point.name,
            description: self.description,
        }
    }
}

/// The narrative currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    pub speaker: String,
    pub content: String,
}

/// Everything the front-end needs to render one frame of the game.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: GamePhase,
    pub scene: Option<Scene>,
    pub narrative: Narrative,
    pub dialogue_history: Vec<Message>,
    pub active_character: Option<String>,
    pub collected_clues: Vec<CollectedClue>,
    pub pending_investigation: Option<PendingInvestigation>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_in_dialogue(&self) -> bool {
        self.phase == GamePhase::Dialogue
    }

    pub fn clue_names(&self) -> Vec<&str> {
        self.collected_clues
            .iter()
            .map(|clue| clue.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene {
            location: "书房".to_string(),
            location_image_prompt: "A Ming dynasty study".to_string(),
            characters: vec!["管家".to_string()],
            investigation_points: vec![
                InvestigationPoint {
                    id: "desk_letter".to_string(),
                    name: "桌上的信件".to_string(),
                },
                InvestigationPoint {
                    id: "ink_stone".to_string(),
                    name: "砚台".to_string(),
                },
            ],
        }
    }

    #[test]
    fn remove_point_only_drops_matching_id() {
        let mut scene = scene();
        assert!(scene.remove_point("desk_letter"));
        assert!(!scene.remove_point("desk_letter"));
        assert_eq!(scene.investigation_points.len(), 1);
        assert_eq!(scene.investigation_points[0].id, "ink_stone");
    }

    #[test]
    fn pending_investigation_becomes_clue() {
        let pending = PendingInvestigation {
            point: scene().investigation_points[0].clone(),
            description: "dusty letter".to_string(),
        };
        let clue = pending.into_clue();
        assert_eq!(clue.id, "desk_letter");
        assert_eq!(clue.name, "桌上的信件");
        assert_eq!(clue.description, "dusty letter");
    }

    #[test]
    fn phase_displays_as_wire_name() {
        assert_eq!(GamePhase::Investigation.to_string(), "INVESTIGATION");
        assert_eq!(GamePhase::default(), GamePhase::Starting);
    }
}
