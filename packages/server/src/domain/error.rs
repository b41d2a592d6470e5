//! Domain error types.

use thiserror::Error;

use super::{GroupId, Handle};

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("handle must not be empty")]
    HandleEmpty,
    #[error("handle must be at most {0} characters")]
    HandleTooLong(usize),
    #[error("handle '{0}' contains whitespace or control characters")]
    HandleInvalidCharacter(String),
    #[error("group name must not be empty")]
    GroupNameEmpty,
    #[error("group name must be at most {0} characters")]
    GroupNameTooLong(usize),
    #[error("group name '{0}' contains control characters")]
    GroupNameInvalidCharacter(String),
    #[error("message content must not be empty")]
    ContentEmpty,
    #[error("message content must be at most {0} characters")]
    ContentTooLong(usize),
    #[error("invalid RFC 3339 timestamp '{0}'")]
    TimestampInvalid(String),
}

/// Group Directory の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group '{0}' does not exist")]
    GroupNotFound(GroupId),
    #[error("group '{0}' already exists")]
    GroupAlreadyExists(GroupId),
    #[error("only the admin of group '{group_id}' can do that ({requester} is not the admin)")]
    NotAdmin { group_id: GroupId, requester: Handle },
    #[error("{member} is not a member of group '{group_id}'")]
    NotMember { group_id: GroupId, member: Handle },
    #[error("a group needs at least one member besides its creator")]
    NoMembers,
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not online")]
    ClientNotFound(String),
    #[error("outbound queue of client '{0}' is full")]
    QueueFull(String),
    #[error("connection of client '{0}' is closed")]
    Closed(String),
    #[error("failed to encode outbound message: {0}")]
    Encode(String),
}
