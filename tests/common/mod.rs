//! Scripted Game Master for driving a `Session` without network access.
#![allow(dead_code)]

use async_openai::error::OpenAIError;
use async_trait::async_trait;
use linglong::{
    AIError, Channel, InvestigationPoint, Scene, SessionState, TurnGateway, TurnPhase, TurnResult,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub enum Reply {
    Turn(TurnResult),
    Fail(AIError),
    // Held until the test releases it, to stage overlapping requests.
    Gated(oneshot::Receiver<Result<TurnResult, AIError>>),
}

#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    channels: Mutex<Vec<Channel>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, turn: TurnResult) {
        self.replies.lock().unwrap().push_back(Reply::Turn(turn));
    }

    pub fn queue_error(&self, error: AIError) {
        self.replies.lock().unwrap().push_back(Reply::Fail(error));
    }

    /// Queues a reply that only arrives once the returned sender fires.
    pub fn queue_gated(&self) -> oneshot::Sender<Result<TurnResult, AIError>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn channels_opened(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    /// Yields until `count` prompts have been sent.
    pub async fn wait_for_prompts(&self, count: usize) {
        while self.prompts.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl TurnGateway for ScriptedGateway {
    async fn open_channel(&self) -> Result<Channel, AIError> {
        let channel = Channel::new();
        self.channels.lock().unwrap().push(channel.clone());
        Ok(channel)
    }

    async fn send_turn(&self, _channel: &Channel, prompt: &str) -> Result<TurnResult, AIError> {
        let reply = self.replies.lock().unwrap().pop_front();
        self.prompts.lock().unwrap().push(prompt.to_string());
        match reply {
            Some(Reply::Turn(turn)) => Ok(turn),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Gated(rx)) => rx.await.unwrap_or(Err(AIError::NoMessageFound)),
            None => Err(AIError::NoMessageFound),
        }
    }
}

pub fn transport_error() -> AIError {
    AIError::Transport(OpenAIError::InvalidArgument(
        "connection reset by peer".to_string(),
    ))
}

pub fn point(id: &str, name: &str) -> InvestigationPoint {
    InvestigationPoint {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn scene(location: &str, characters: &[&str], points: &[InvestigationPoint]) -> Scene {
    Scene {
        location: location.to_string(),
        location_image_prompt: format!("A Ming dynasty {location}"),
        characters: characters.iter().map(|name| name.to_string()).collect(),
        investigation_points: points.to_vec(),
    }
}

pub fn turn(phase: TurnPhase, speaker: &str, narrative: &str, scene: Scene) -> TurnResult {
    TurnResult {
        narrative: narrative.to_string(),
        speaker: speaker.to_string(),
        game_phase: phase,
        scene,
    }
}

pub fn study_points() -> Vec<InvestigationPoint> {
    vec![point("desk_letter", "桌上的信件"), point("broken_cup", "碎裂的茶杯")]
}

/// The opening turn: a NARRATIVE reply that already carries the study's two points.
pub fn opening_turn() -> TurnResult {
    turn(
        TurnPhase::Narrative,
        "旁白",
        "知府遇害，你与搭档岳玲珑连夜赶到书房。",
        scene("书房", &["管家", "李捕头"], &study_points()),
    )
}

/// Invariants that must hold after every operation.
pub fn assert_invariants(state: &SessionState) {
    assert_eq!(
        state.is_in_dialogue(),
        state.active_character.is_some(),
        "phase {:?} with active character {:?}",
        state.phase,
        state.active_character
    );
    if !state.dialogue_history.is_empty() {
        assert!(state.is_in_dialogue() && state.active_character.is_some());
    }
    if let Some(scene) = &state.scene {
        let ids: HashSet<&str> = scene
            .investigation_points
            .iter()
            .map(|point| point.id.as_str())
            .collect();
        assert_eq!(ids.len(), scene.investigation_points.len());
        for clue in &state.collected_clues {
            assert!(!ids.contains(clue.id.as_str()), "clue {} still in scene", clue.id);
        }
    }
}
