use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::adapter::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    /// Local notices. Shown in the transcript, never sent to the provider.
    System,
}

impl Sender {
    /// Role used when the turn is sent back to the provider, `None` for local-only turns.
    pub fn chat_role(self) -> Option<ChatRole> {
        match self {
            Sender::User => Some(ChatRole::User),
            Sender::Assistant => Some(ChatRole::Assistant),
            Sender::System => None,
        }
    }
}

/// One message unit of a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    id: u64,
    sender: Sender,
    text: String,
    created_at: DateTime<Local>,
}

impl Turn {
    pub fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display-formatted time, e.g. `09:41`.
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }

    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        self.sender.chat_role().map(|role| ChatMessage {
            role,
            content: self.text.clone(),
        })
    }
}
