// /app.rs
use crate::game_state::{GamePhase, InvestigationPoint, SessionState};
use crate::prompts::PARTNER_NAME;
use crate::session::Session;
use crate::tui::{Tui, TuiEvent};
use crate::ui::{self, spinner::Spinner};

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tui_textarea::TextArea;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    StartNewGame,
    AdvanceNarrative,
    Investigate(InvestigationPoint),
    DismissClue,
    StartDialogue(String),
    ConsultPartner,
    SendMessage(String),
    EndDialogue,
}

/// One selectable line of the investigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Point(InvestigationPoint),
    Character(String),
    Partner,
}

impl Entry {
    fn action(&self) -> Action {
        match self {
            Entry::Point(point) => Action::Investigate(point.clone()),
            Entry::Character(name) => Action::StartDialogue(name.clone()),
            Entry::Partner => Action::ConsultPartner,
        }
    }
}

// Points first, then the people in the scene, then the partner who is always there.
pub fn investigation_entries(view: &SessionState) -> Vec<Entry> {
    let mut entries = Vec::new();
    if let Some(scene) = &view.scene {
        entries.extend(scene.investigation_points.iter().cloned().map(Entry::Point));
        entries.extend(scene.characters.iter().cloned().map(Entry::Character));
    }
    entries.push(Entry::Partner);
    entries
}

pub struct App {
    running: bool,
    session: Session,

    // --- UI elements
    pub(crate) view: SessionState,
    pub(crate) selection: ListState,
    pub(crate) input: TextArea<'static>,
    pub(crate) spinner: Spinner,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut selection = ListState::default();
        selection.select(Some(0));
        Self {
            running: true,
            session,
            view: SessionState::default(),
            selection,
            input: ui::dialogue_input(),
            spinner: Spinner::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(8.0) // spinner speed
            .frame_rate(30.0);

        tui.enter()?; // Starts event handler, enters raw mode, enters alternate screen
        self.handle_action(Action::StartNewGame);

        while self.running {
            let Some(event) = tui.next().await else {
                break;
            };
            match event {
                TuiEvent::Render | TuiEvent::Resize(_, _) | TuiEvent::Init => {
                    self.refresh().await;
                    tui.draw(|frame| ui::draw(frame, self))?;
                }
                TuiEvent::Tick => {
                    if self.view.is_loading {
                        self.spinner.next_frame();
                    }
                }
                TuiEvent::Key(key_event) => {
                    self.refresh().await;
                    if let Some(action) = self.on_key(key_event) {
                        self.handle_action(action);
                    }
                }
                TuiEvent::Error => log::warn!("Terminal event error"),
            }
        }

        self.session.teardown().await;
        tui.exit()?; // stops event handler, exits raw mode, exits alternate screen
        Ok(())
    }

    async fn refresh(&mut self) {
        self.view = self.session.snapshot().await;
        let entries = investigation_entries(&self.view).len();
        match self.selection.selected() {
            Some(index) if index >= entries => self.selection.select(Some(entries - 1)),
            None => self.selection.select(Some(0)),
            _ => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => return Some(Action::Quit),
            KeyCode::Char('n') if ctrl => return Some(Action::StartNewGame),
            _ => {}
        }

        // The clue popup sits on top of everything else.
        if self.view.pending_investigation.is_some() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Action::DismissClue),
                _ => None,
            };
        }

        match self.view.phase {
            GamePhase::Starting => match key.code {
                KeyCode::Esc => Some(Action::Quit),
                KeyCode::Enter if !self.view.is_loading => Some(Action::StartNewGame),
                _ => None,
            },
            GamePhase::Narrative => match key.code {
                KeyCode::Esc => Some(Action::Quit),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::AdvanceNarrative),
                _ => None,
            },
            GamePhase::Investigation => self.on_investigation_key(key),
            GamePhase::Dialogue => self.on_dialogue_key(key),
        }
    }

    fn on_investigation_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = investigation_entries(&self.view).len().saturating_sub(1);
                let next = self.selection.selected().map_or(0, |i| (i + 1).min(last));
                self.selection.select(Some(next));
                None
            }
            KeyCode::Enter if !self.view.is_loading => {
                let entries = investigation_entries(&self.view);
                self.selection
                    .selected()
                    .and_then(|index| entries.get(index))
                    .map(Entry::action)
            }
            _ => None,
        }
    }

    fn on_dialogue_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc if !self.view.is_loading => Some(Action::EndDialogue),
            KeyCode::Enter => {
                let text = self.input.lines().join("\n");
                if self.view.is_loading || text.trim().is_empty() {
                    return None;
                }
                self.input = ui::dialogue_input();
                Some(Action::SendMessage(text))
            }
            _ => {
                self.input.input(key);
                None
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.running = false;
            return;
        }
        if matches!(action, Action::StartNewGame) {
            self.selection.select(Some(0));
            self.input = ui::dialogue_input();
        }

        let session = self.session.clone();
        tokio::spawn(async move {
            let outcome = match action {
                Action::StartNewGame => session.start_new_game().await,
                Action::AdvanceNarrative => session.advance_narrative().await,
                Action::Investigate(point) => session.investigate(&point).await,
                Action::DismissClue => session.dismiss_investigation_popup().await,
                Action::StartDialogue(name) => session.start_dialogue(&name).await,
                Action::ConsultPartner => session.consult_partner().await,
                Action::SendMessage(text) => session.send_dialogue_message(&text).await,
                Action::EndDialogue => session.end_dialogue().await,
                Action::Quit => Ok(()),
            };
            if let Err(e) = outcome {
                log::debug!("Action ignored: {e}");
            }
        });
    }

    pub fn active_speaker(&self) -> &str {
        self.view.active_character.as_deref().unwrap_or(PARTNER_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::Scene;

    fn view_with_scene() -> SessionState {
        SessionState {
            phase: GamePhase::Investigation,
            scene: Some(Scene {
                location: "书房".to_string(),
                location_image_prompt: String::new(),
                characters: vec!["管家".to_string()],
                investigation_points: vec![InvestigationPoint {
                    id: "desk_letter".to_string(),
                    name: "桌上的信件".to_string(),
                }],
            }),
            ..SessionState::default()
        }
    }

    #[test]
    fn entries_list_points_characters_then_partner() {
        let entries = investigation_entries(&view_with_scene());
        assert_eq!(entries.len(), 3);
        assert!(matches!(&entries[0], Entry::Point(point) if point.id == "desk_letter"));
        assert_eq!(entries[1], Entry::Character("管家".to_string()));
        assert_eq!(entries[2], Entry::Partner);
    }

    #[test]
    fn partner_is_always_reachable() {
        assert_eq!(investigation_entries(&SessionState::default()), vec![Entry::Partner]);
    }

    #[test]
    fn entry_actions_match_session_operations() {
        assert_eq!(Entry::Partner.action(), Action::ConsultPartner);
        assert_eq!(
            Entry::Character("管家".to_string()).action(),
            Action::StartDialogue("管家".to_string())
        );
    }
}
