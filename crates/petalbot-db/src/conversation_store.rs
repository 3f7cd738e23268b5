use dashmap::DashMap;
use petalbot_common::{Turn, TurnRole};
use tracing::debug;

/// Default number of turns retained per user when no length is configured.
pub const DEFAULT_HISTORY_LEN: usize = 20;

/// Bounded per-user conversation history.
///
/// Volatile: everything is lost on process restart. Each user id maps to an
/// ordered turn sequence clipped to the most recent `max_len` entries.
/// Append and trim run under the map's entry guard, so concurrent requests
/// for the same user cannot lose a turn or observe a half-applied update.
pub struct ConversationStore {
    turns: DashMap<i64, Vec<Turn>>,
    max_len: usize,
}

impl ConversationStore {
    pub fn new(max_len: usize) -> Self {
        Self {
            turns: DashMap::new(),
            max_len,
        }
    }

    /// Append a turn for `user_id`, creating the sequence if absent, then
    /// clip to the most recent `max_len` turns. Clipping never reorders.
    pub fn append(&self, user_id: i64, role: TurnRole, content: impl Into<String>) {
        let mut history = self.turns.entry(user_id).or_default();
        history.push(Turn::new(role, content));

        let len = history.len();
        if len > self.max_len {
            history.drain(..len - self.max_len);
        }
    }

    /// Stored turns for `user_id`, oldest first. Empty if none.
    pub fn history(&self, user_id: i64) -> Vec<Turn> {
        self.turns
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// History rendered as alternating `User:` / `Assistant:` lines.
    /// Empty string when the user has no history.
    pub fn context_text(&self, user_id: i64) -> String {
        self.history(user_id)
            .iter()
            .map(|turn| match turn.role {
                TurnRole::User => format!("User: {}", turn.content),
                TurnRole::Assistant => format!("Assistant: {}", turn.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop all history for `user_id`. No-op if there is none.
    pub fn clear(&self, user_id: i64) {
        if self.turns.remove(&user_id).is_some() {
            debug!(user_id, "cleared conversation history");
        }
    }

    /// Number of users with stored history.
    pub fn active_users(&self) -> usize {
        self.turns.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}
