//! Outbound notifications produced by the hub.
//!
//! These are protocol-independent; the infrastructure layer encodes them to
//! wire frames just before they are enqueued on a session.

use std::collections::BTreeMap;

use super::{ChatMessage, ChatTarget, Group, Handle, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// A relayed private or group message
    Chat(ChatMessage),
    /// Free-text notice from the server
    System { content: String, timestamp: Timestamp },
    /// Every currently registered handle
    UserList {
        handles: Vec<Handle>,
        timestamp: Timestamp,
    },
    /// Groups the recipient belongs to
    GroupList {
        groups: Vec<Group>,
        timestamp: Timestamp,
    },
    /// Snapshot of one conversation, in arrival order
    History {
        chat: ChatTarget,
        messages: Vec<ChatMessage>,
        timestamp: Timestamp,
    },
    /// Non-zero unread counts keyed by chat id
    UnreadCount {
        recipient: Handle,
        counts: BTreeMap<String, usize>,
        timestamp: Timestamp,
    },
}

impl OutboundMessage {
    pub fn system(content: impl Into<String>, timestamp: Timestamp) -> Self {
        OutboundMessage::System {
            content: content.into(),
            timestamp,
        }
    }
}
