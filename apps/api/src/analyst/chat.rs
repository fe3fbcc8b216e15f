//! Multi-turn chat sessions. A session's grounding is fixed when it is created.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyst::context::profile_chat_system;
use crate::analyst::prompts::{
    GENERAL_CHAT_GREETING, GENERAL_CHAT_SYSTEM, PROFILE_CHAT_GREETING_TEMPLATE,
};
use crate::analyst::ProfileAnalyst;
use crate::errors::AppError;
use crate::github::{Profile, Repository};
use crate::llm_client::{Message, Role};

pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// A message as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub text: String,
}

impl ChatEntry {
    fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    system: String,
    /// Successful turns only; this is what the model sees.
    conversation: Vec<Message>,
    /// Everything shown to the user, including the greeting and error replies.
    transcript: Vec<ChatEntry>,
}

impl ChatSession {
    pub fn general() -> Self {
        Self {
            system: GENERAL_CHAT_SYSTEM.to_string(),
            conversation: Vec::new(),
            transcript: vec![ChatEntry::assistant(GENERAL_CHAT_GREETING)],
        }
    }

    pub fn for_profile(profile: &Profile, repos: &[Repository]) -> Self {
        Self {
            system: profile_chat_system(profile, repos),
            conversation: Vec::new(),
            transcript: vec![ChatEntry::assistant(
                PROFILE_CHAT_GREETING_TEMPLATE.replace("{name}", profile.display_name()),
            )],
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    /// Sends one user message. AI failures do not propagate: the user sees a fixed
    /// apology and the failed turn is left out of the model's conversation.
    pub async fn send(
        &mut self,
        analyst: &dyn ProfileAnalyst,
        text: &str,
    ) -> Result<ChatEntry, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message cannot be empty.".to_string()));
        }

        self.transcript.push(ChatEntry {
            role: Role::User,
            text: text.to_string(),
        });

        let mut turn = self.conversation.clone();
        turn.push(Message::user(text));

        let reply = match analyst.chat(&self.system, &turn).await {
            Ok(reply) => {
                turn.push(Message::assistant(reply.clone()));
                self.conversation = turn;
                ChatEntry::assistant(reply)
            }
            Err(e) => {
                warn!("Chat turn failed: {e}");
                ChatEntry::assistant(CHAT_ERROR_REPLY)
            }
        };

        self.transcript.push(reply.clone());
        Ok(reply)
    }
}
