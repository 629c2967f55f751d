use super::turn::Turn;
use crate::adapter::ChatMessage;

/// Ordered transcript of one chat session. Turns are only ever appended at the end.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Messages to transmit to the provider, in stored order, without `system` turns.
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().filter_map(Turn::to_chat_message).collect()
    }
}
