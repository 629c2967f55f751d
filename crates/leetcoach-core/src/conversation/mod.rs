mod controller;
mod history;
mod turn;

pub use controller::{
    ChatBackend, ControllerOptions, ConversationController, HttpChatBackend, SubmitOutcome,
    CONTEXT_FAILED_NOTICE, REPLY_FAILED_NOTICE,
};
pub use history::Conversation;
pub use turn::{Sender, Turn};
