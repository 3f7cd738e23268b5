pub mod engine;
pub mod media;
pub mod persona;
pub mod providers;

pub use engine::{ChatEngine, ChatOutcome, ChatRequest};
pub use providers::{
    ChatMessage, ChatRole, ContentBlock, GeminiProvider, LlmProvider, LlmRequest, LlmResponse,
    MessagePart, Usage,
};
