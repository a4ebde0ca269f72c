use crate::game_state::GamePhase;
use thiserror::Error;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {0}")]
    AI(#[from] AIError), // Errors related to the Game Master channel.

    #[error("Game error: {0}")]
    Game(#[from] GameError), // Errors specific to game logic or state.

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

// Rejected player actions. None of them touch the session state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Action requires the {expected} phase, but the game is in {actual}")]
    InvalidPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("No game in progress")]
    NoActiveGame,

    #[error("The session has been closed")]
    SessionClosed,

    #[error("No clue is waiting to be acknowledged")]
    NoPendingInvestigation,

    #[error("A clue is still waiting to be acknowledged")]
    PendingInvestigation,

    #[error("Unknown investigation point: {0}")]
    UnknownInvestigationPoint(String),

    #[error("Nobody is being talked to")]
    NoActiveCharacter,

    #[error("Nothing to send")]
    EmptyInput,
}

// Errors raised while talking to the Game Master.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    Transport(#[from] async_openai::error::OpenAIError), // Network or service failure.

    #[error("Failed to parse AI response. The response was not valid JSON: {0}")]
    MalformedTurnResult(String),

    #[error("AI response did not match the turn schema: {0}")]
    InvalidTurn(String), // Parsed, but breaks a rule the schema cannot express.

    #[error("Timeout occurred")]
    Timeout,

    #[error("No message found")]
    NoMessageFound, // The completion came back without any content.

    #[error("Conversation channel not found")]
    ChannelNotFound,
}

impl AIError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, AIError::MalformedTurnResult(_) | AIError::InvalidTurn(_))
    }
}

impl From<serde_json::Error> for AIError {
    fn from(err: serde_json::Error) -> AIError {
        AIError::MalformedTurnResult(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not locate the home directory")]
    NoHomeDir,

    #[error("No OpenAI API key configured. Set OPENAI_API_KEY or add it to {0}")]
    MissingApiKey(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
