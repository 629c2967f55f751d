pub mod adapter;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod problem;

// Re-export key types
pub use adapter::{ChatCompletion, ChatMessage, ChatRequest, ChatRole, ErrorBody, ProviderAdapter};
pub use config::Settings;
pub use conversation::{
    ChatBackend, ControllerOptions, Conversation, ConversationController, HttpChatBackend,
    Sender, SubmitOutcome, Turn,
};
pub use error::CoachError;
pub use llm::LlmClient;
pub use problem::{
    Difficulty, HttpProblemLookup, ProblemCatalog, ProblemContext, ProblemLookup,
    ProblemUrlMatcher,
};
