/// Per-request identity passed explicitly to anything that logs or stores
/// on behalf of a user. Built once per inbound message by the channel.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Telegram user id of the requester.
    pub user_id: i64,
    /// Chat the request arrived in (equals `user_id` in private chats).
    pub chat_id: i64,
    /// First name as reported by the transport, for log readability only.
    pub display_name: String,
}

impl RequestContext {
    pub fn new(user_id: i64, chat_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            display_name: display_name.into(),
        }
    }
}
