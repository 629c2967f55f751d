mod gemini;
mod openai;
mod traits;

pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use traits::*;
