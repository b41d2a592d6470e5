//! Domain layer: value objects, entities, sessions and the ports the hub needs.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod outbound;
pub mod repository;
pub mod session;
pub mod unread;
pub mod value_object;

pub use entity::{ChatMessage, Group, MemberRemoval};
pub use error::{GroupError, MessagePushError, ValueObjectError};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use message_pusher::MessagePusher;
pub use outbound::OutboundMessage;
pub use repository::{GroupMembershipChange, GroupRepository, LastSeenRepository, MessageRepository};
pub use session::{ConnectionSession, DEFAULT_OUTBOUND_QUEUE_CAPACITY, SessionId, SessionMailbox};
pub use value_object::{
    ChatTarget, ChatType, ConversationKey, GroupId, GroupIncarnation, GroupName, Handle,
    MessageContent, Timestamp,
};
