//! The session coordinator.
//!
//! A [`Session`] owns the phase state machine of one playthrough and is the only
//! place game state changes. Operations that talk to the Game Master release the
//! state lock while the request is in flight and re-check two guards once it
//! lands: the playthrough must still be alive, and a clue popup masks any
//! full turn that arrives while it is open.

use crate::ai::{Channel, TurnGateway};
use crate::ai_response::TurnResult;
use crate::error::{AIError, GameError};
use crate::game_state::{GamePhase, InvestigationPoint, Narrative, PendingInvestigation, SessionState};
use crate::message::Message;
use crate::prompts::{self, PARTNER_NAME};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    gateway: Arc<dyn TurnGateway>,
    core: Mutex<SessionCore>,
}

struct SessionCore {
    state: SessionState,
    channel: Option<Channel>,
    // Cancelled on teardown and whenever the playthrough is abandoned for a new one.
    liveness: CancellationToken,
    // Set once by teardown. A new game does not reopen the session.
    closed: bool,
}

impl Session {
    pub fn new(gateway: Arc<dyn TurnGateway>) -> Self {
        Session {
            inner: Arc::new(SessionInner {
                gateway,
                core: Mutex::new(SessionCore {
                    state: SessionState::default(),
                    channel: None,
                    liveness: CancellationToken::new(),
                    closed: false,
                }),
            }),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.core.lock().await.state.clone()
    }

    /// Ends the session. Requests still in flight complete without effect and
    /// every later operation is rejected with [`GameError::SessionClosed`].
    pub async fn teardown(&self) {
        let mut core = self.inner.core.lock().await;
        core.closed = true;
        core.liveness.cancel();
        log::info!("Session torn down");
    }

    pub async fn is_alive(&self) -> bool {
        !self.inner.core.lock().await.closed
    }

    /// Resets everything, opens a fresh Game Master channel and plays the opening turn.
    pub async fn start_new_game(&self) -> Result<(), GameError> {
        let liveness = {
            let mut core = self.inner.core.lock().await;
            core.ensure_open()?;
            core.liveness.cancel();
            core.liveness = CancellationToken::new();
            core.channel = None;
            core.state = SessionState {
                is_loading: true,
                ..SessionState::default()
            };
            core.liveness.clone()
        };
        log::info!("Starting a new game");

        let gateway = &self.inner.gateway;
        let (channel, result) = match gateway.open_channel().await {
            Ok(channel) => {
                let result = gateway.send_turn(&channel, prompts::GAME_START_PROMPT).await;
                (Some(channel), result)
            }
            Err(e) => (None, Err(e)),
        };

        let mut core = self.inner.core.lock().await;
        if !liveness.is_cancelled() {
            core.channel = channel;
        }
        core.complete(&liveness, result, SessionCore::apply_turn);
        Ok(())
    }

    /// Closes the narrative box. No request is made.
    pub async fn advance_narrative(&self) -> Result<(), GameError> {
        let mut core = self.inner.core.lock().await;
        core.ensure_open()?;
        core.expect_phase(GamePhase::Narrative)?;
        core.state.phase = GamePhase::Investigation;
        log::debug!("Narrative finished, investigation open");
        Ok(())
    }

    /// Asks for the description of a single point. The reply only fills the clue
    /// popup, whatever phase the Game Master declares.
    pub async fn investigate(&self, point: &InvestigationPoint) -> Result<(), GameError> {
        let (channel, liveness) = {
            let mut core = self.inner.core.lock().await;
            core.ensure_open()?;
            core.expect_phase(GamePhase::Investigation)?;
            if core.state.pending_investigation.is_some() {
                return Err(GameError::PendingInvestigation);
            }
            let known = core
                .state
                .scene
                .as_ref()
                .is_some_and(|scene| scene.find_point(&point.id).is_some());
            if !known {
                return Err(GameError::UnknownInvestigationPoint(point.id.clone()));
            }
            core.begin_request()?
        };
        log::debug!("Investigating {} ({})", point.name, point.id);

        let result = self
            .inner
            .gateway
            .send_turn(&channel, &prompts::investigate_prompt(&point.name))
            .await;

        let mut core = self.inner.core.lock().await;
        core.complete(&liveness, result, |core, turn| {
            if core.state.pending_investigation.is_some() {
                log::warn!("Another clue is already open, dropping {}", point.id);
                return;
            }
            core.state.pending_investigation = Some(PendingInvestigation {
                point: point.clone(),
                description: turn.narrative,
            });
        });
        Ok(())
    }

    /// Files the open clue and removes its point from the scene.
    pub async fn dismiss_investigation_popup(&self) -> Result<(), GameError> {
        let mut core = self.inner.core.lock().await;
        core.ensure_open()?;
        let pending = core
            .state
            .pending_investigation
            .take()
            .ok_or(GameError::NoPendingInvestigation)?;
        if let Some(scene) = core.state.scene.as_mut() {
            scene.remove_point(&pending.point.id);
        }
        log::debug!("Clue collected: {}", pending.point.name);
        core.state.collected_clues.push(pending.into_clue());
        Ok(())
    }

    pub async fn start_dialogue(&self, character: &str) -> Result<(), GameError> {
        let character = character.trim();
        self.open_dialogue(character, prompts::start_dialogue_prompt(character))
            .await
    }

    /// Starts a conversation with the partner, handing over the names of every clue found so far.
    pub async fn consult_partner(&self) -> Result<(), GameError> {
        let prompt = {
            let core = self.inner.core.lock().await;
            prompts::consult_partner_prompt(core.state.clue_names())
        };
        self.open_dialogue(PARTNER_NAME, prompt).await
    }

    async fn open_dialogue(&self, character: &str, prompt: String) -> Result<(), GameError> {
        let (channel, liveness) = {
            let mut core = self.inner.core.lock().await;
            core.ensure_open()?;
            core.expect_phase(GamePhase::Investigation)?;
            if character.is_empty() {
                return Err(GameError::EmptyInput);
            }
            if core.state.pending_investigation.is_some() {
                return Err(GameError::PendingInvestigation);
            }
            let request = core.begin_request()?;
            core.state.dialogue_history.clear();
            core.state.active_character = Some(character.to_string());
            core.state.phase = GamePhase::Dialogue;
            request
        };
        log::debug!("Opening dialogue with {}", character);

        let result = self.inner.gateway.send_turn(&channel, &prompt).await;

        let mut core = self.inner.core.lock().await;
        core.complete(&liveness, result, SessionCore::apply_turn);
        Ok(())
    }

    /// Sends the player's line as-is. The reply is appended to the dialogue and the
    /// phase stays DIALOGUE no matter what the Game Master declares.
    pub async fn send_dialogue_message(&self, text: &str) -> Result<(), GameError> {
        let (channel, liveness, character) = {
            let mut core = self.inner.core.lock().await;
            core.ensure_open()?;
            let character = core
                .state
                .active_character
                .clone()
                .ok_or(GameError::NoActiveCharacter)?;
            if text.trim().is_empty() {
                return Err(GameError::EmptyInput);
            }
            let (channel, liveness) = core.begin_request()?;
            core.state.dialogue_history.push(Message::from_player(text));
            (channel, liveness, character)
        };

        let result = self.inner.gateway.send_turn(&channel, text).await;

        let mut core = self.inner.core.lock().await;
        core.complete(&liveness, result, |core, turn| {
            if core.state.active_character.as_deref() != Some(character.as_str()) {
                log::debug!("Conversation with {} is over, dropping reply", character);
                return;
            }
            core.state
                .dialogue_history
                .push(Message::from_storyteller(turn.narrative, turn.speaker));
            core.state.phase = GamePhase::Dialogue;
        });
        Ok(())
    }

    /// Leaves the conversation and asks for a short description of the scene.
    pub async fn end_dialogue(&self) -> Result<(), GameError> {
        let (channel, liveness) = {
            let mut core = self.inner.core.lock().await;
            core.ensure_open()?;
            core.expect_phase(GamePhase::Dialogue)?;
            let request = core.begin_request()?;
            core.state.active_character = None;
            core.state.phase = GamePhase::Investigation;
            core.state.dialogue_history.clear();
            request
        };
        log::debug!("Dialogue ended");

        let result = self
            .inner
            .gateway
            .send_turn(&channel, prompts::END_DIALOGUE_PROMPT)
            .await;

        let mut core = self.inner.core.lock().await;
        core.complete(&liveness, result, SessionCore::apply_turn);
        Ok(())
    }
}

impl SessionCore {
    fn ensure_open(&self) -> Result<(), GameError> {
        if self.closed {
            Err(GameError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                expected,
                actual: self.state.phase,
            })
        }
    }

    fn begin_request(&mut self) -> Result<(Channel, CancellationToken), GameError> {
        self.ensure_open()?;
        let channel = self.channel.clone().ok_or(GameError::NoActiveGame)?;
        self.state.is_loading = true;
        self.state.error = None;
        Ok((channel, self.liveness.clone()))
    }

    // Runs when a request lands. Stale playthroughs are ignored entirely.
    fn complete<F>(&mut self, liveness: &CancellationToken, result: Result<TurnResult, AIError>, apply: F)
    where
        F: FnOnce(&mut SessionCore, TurnResult),
    {
        if liveness.is_cancelled() {
            log::debug!("Discarding a reply for an abandoned session");
            return;
        }
        match result {
            Ok(turn) => apply(self, turn),
            Err(e) => self.record_failure(e),
        }
        self.state.is_loading = false;
    }

    fn record_failure(&mut self, error: AIError) {
        if error.is_malformed() {
            log::error!("Game Master sent an unreadable turn: {}", error);
        } else {
            log::error!("Game Master request failed: {}", error);
        }
        self.state.error = Some(error.to_string());
    }

    fn apply_turn(&mut self, turn: TurnResult) {
        if self.state.pending_investigation.is_some() {
            log::debug!("Clue popup open, turn dropped");
            return;
        }

        let TurnResult {
            narrative,
            speaker,
            game_phase,
            mut scene,
        } = turn;
        scene.characters.retain(|name| name != PARTNER_NAME);
        // Collected clues stay out of the scene even if the Game Master lists them again.
        let collected = &self.state.collected_clues;
        scene
            .investigation_points
            .retain(|point| !collected.iter().any(|clue| clue.id == point.id));

        let mut phase = GamePhase::from(game_phase);
        if phase == GamePhase::Dialogue && self.state.active_character.is_none() {
            log::warn!("Game Master opened a dialogue with nobody, staying in investigation");
            phase = GamePhase::Investigation;
        }

        self.state.narrative = Narrative {
            speaker,
            content: narrative,
        };
        self.state.scene = Some(scene);
        self.state.phase = phase;
        if phase != GamePhase::Dialogue {
            self.state.active_character = None;
            self.state.dialogue_history.clear();
        }
    }
}
