use crate::ai_response::{TURN_SCHEMA_NAME, TurnResult, turn_result_schema};
use crate::error::{AIError, SettingsError};
use crate::prompts::SYSTEM_INSTRUCTION;
use crate::settings::Settings;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, timeout};
use uuid::Uuid;

/// Handle on one stateful conversation with the Game Master.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    id: Uuid,
}

impl Channel {
    pub fn new() -> Self {
        Channel { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

/// The remote storyteller: one channel per playthrough, one structured turn per prompt.
#[async_trait]
pub trait TurnGateway: Send + Sync {
    async fn open_channel(&self) -> Result<Channel, AIError>;

    async fn send_turn(&self, channel: &Channel, prompt: &str) -> Result<TurnResult, AIError>;
}

pub struct GameAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    request_timeout: Option<Duration>,
    transcripts: Mutex<HashMap<Uuid, Vec<ChatCompletionRequestMessage>>>,
}

impl GameAI {
    pub fn new(api_key: String, model: impl Into<String>, temperature: f32) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(openai_config),
            model: model.into(),
            temperature,
            request_timeout: None,
            transcripts: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or_else(|| SettingsError::MissingApiKey(Settings::display_path()))?;
        let mut ai = Self::new(api_key, settings.model.clone(), settings.temperature);
        ai.request_timeout = settings.request_timeout_secs.map(Duration::from_secs);
        Ok(ai)
    }

    fn response_format() -> ResponseFormat {
        ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: TURN_SCHEMA_NAME.into(),
                schema: Some(turn_result_schema()),
                strict: Some(true),
            },
        }
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String, AIError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .response_format(Self::response_format())
            .messages(messages)
            .build()?;

        let chat = self.client.chat();
        let call = chat.create(request);
        let response = match self.request_timeout {
            Some(limit) => timeout(limit, call).await.map_err(|_| AIError::Timeout)??,
            None => call.await?,
        };

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AIError::NoMessageFound)
    }
}

#[async_trait]
impl TurnGateway for GameAI {
    async fn open_channel(&self) -> Result<Channel, AIError> {
        let channel = Channel::new();
        let system: ChatCompletionRequestMessage = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_INSTRUCTION)
            .build()?
            .into();
        self.transcripts
            .lock()
            .await
            .insert(channel.id(), vec![system]);
        log::debug!("Opened Game Master channel {}", channel.id());
        Ok(channel)
    }

    async fn send_turn(&self, channel: &Channel, prompt: &str) -> Result<TurnResult, AIError> {
        let user: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?
            .into();

        let mut messages = self
            .transcripts
            .lock()
            .await
            .get(&channel.id())
            .cloned()
            .ok_or(AIError::ChannelNotFound)?;
        messages.push(user.clone());

        log::debug!("Sending turn on channel {}: {}", channel.id(), prompt);
        let raw = self.complete(messages).await?;
        log::debug!("Raw Game Master reply: {}", raw);

        let reply: ChatCompletionRequestMessage = ChatCompletionRequestAssistantMessageArgs::default()
            .content(raw.clone())
            .build()?
            .into();
        if let Some(transcript) = self.transcripts.lock().await.get_mut(&channel.id()) {
            transcript.push(user);
            transcript.push(reply);
        }

        TurnResult::from_ai_text(&raw)
    }
}
