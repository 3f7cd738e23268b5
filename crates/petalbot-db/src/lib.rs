pub mod conversation_store;

pub use conversation_store::{ConversationStore, DEFAULT_HISTORY_LEN};
