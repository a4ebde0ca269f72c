pub mod ai;
pub mod ai_response;
pub mod app;
pub mod error;
pub mod game_state;
pub mod logging;
pub mod message;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use ai::{Channel, GameAI, TurnGateway};
pub use ai_response::{TurnPhase, TurnResult};
pub use error::{AIError, AppError, GameError};
pub use game_state::{
    CollectedClue, GamePhase, InvestigationPoint, Narrative, PendingInvestigation, Scene,
    SessionState,
};
pub use message::{Message, Sender};
pub use session::Session;
pub use settings::Settings;
