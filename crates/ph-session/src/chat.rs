use ph_core::{marker, ID};
use ph_engine::Ring;

const CHAT_RING_CAPACITY: usize = 50;

/// One chat line, server-assigned id and timestamp.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u64,
    pub user_id: ID<marker::User>,
    pub username: String,
    pub message: String,
    pub timestamp: i64,
}

/// Per-table bounded chat backlog, sent as `chat_history` on connect.
#[derive(Debug)]
pub struct ChatLog {
    next_id: u64,
    ring: Ring<ChatMessage>,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            next_id: 0,
            ring: Ring::new(CHAT_RING_CAPACITY),
        }
    }
}

impl ChatLog {
    /// Validates, trims, and appends a chat line. Rejects empty-after-trim
    /// messages the way the channel protocol requires.
    pub fn push(&mut self, user_id: ID<marker::User>, username: String, message: &str, now: i64) -> ph_core::Result<ChatMessage> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ph_core::Error::invalid("chat message must not be empty"));
        }
        let entry = ChatMessage {
            id: self.next_id,
            user_id,
            username,
            message: trimmed.to_owned(),
            timestamp: now,
        };
        self.next_id += 1;
        self.ring.push(entry.clone());
        Ok(entry)
    }

    pub fn backlog(&self) -> Vec<ChatMessage> {
        self.ring.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_message() {
        let mut log = ChatLog::default();
        let err = log.push(ID::default(), "alice".into(), "   ", 0).unwrap_err();
        assert!(matches!(err, ph_core::Error::InvalidArgument(_)));
    }

    #[test]
    fn retains_only_the_last_fifty() {
        let mut log = ChatLog::default();
        for i in 0..60 {
            log.push(ID::default(), "alice".into(), &format!("msg {i}"), 0).unwrap();
        }
        let backlog = log.backlog();
        assert_eq!(backlog.len(), 50);
        assert_eq!(backlog.first().unwrap().message, "msg 10");
    }
}
