//! WebSocket frame DTOs.
//!
//! Every frame is one JSON object carrying a `type` discriminator. Inbound
//! frames are decoded leniently (all fields optional) so that the dispatcher
//! can tell malformed JSON apart from an unknown `type`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Message type discriminators used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    // client -> server
    PrivateMessage,
    GroupMessage,
    CreateGroup,
    AddGroupMember,
    RemoveGroupMember,
    LeaveGroup,
    RequestHistory,
    UpdateLastSeen,
    // server -> client
    UserList,
    GroupList,
    System,
    History,
    UnreadCount,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::PrivateMessage => "private_message",
            MessageType::GroupMessage => "group_message",
            MessageType::CreateGroup => "create_group",
            MessageType::AddGroupMember => "add_group_member",
            MessageType::RemoveGroupMember => "remove_group_member",
            MessageType::LeaveGroup => "leave_group",
            MessageType::RequestHistory => "request_history",
            MessageType::UpdateLastSeen => "update_last_seen",
            MessageType::UserList => "user_list",
            MessageType::GroupList => "group_list",
            MessageType::System => "system",
            MessageType::History => "history",
            MessageType::UnreadCount => "unread_count",
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private_message" => Ok(MessageType::PrivateMessage),
            "group_message" => Ok(MessageType::GroupMessage),
            "create_group" => Ok(MessageType::CreateGroup),
            "add_group_member" => Ok(MessageType::AddGroupMember),
            "remove_group_member" => Ok(MessageType::RemoveGroupMember),
            "leave_group" => Ok(MessageType::LeaveGroup),
            "request_history" => Ok(MessageType::RequestHistory),
            "update_last_seen" => Ok(MessageType::UpdateLastSeen),
            "user_list" => Ok(MessageType::UserList),
            "group_list" => Ok(MessageType::GroupList),
            "system" => Ok(MessageType::System),
            "history" => Ok(MessageType::History),
            "unread_count" => Ok(MessageType::UnreadCount),
            other => Err(other.to_string()),
        }
    }
}

/// Frame received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub r#type: String,
    /// Ignored by the server: the sender is always the session's handle
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

/// Chat, system and unread-count frames share this flat shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub from: String,
    pub to: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListMessage {
    pub r#type: MessageType,
    /// handle -> handle
    pub users: BTreeMap<String, String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub admin: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupListMessage {
    pub r#type: MessageType,
    pub groups: Vec<GroupInfo>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub r#type: MessageType,
    pub chat_type: String,
    pub chat_id: String,
    pub content: Vec<ChatMessage>,
    pub timestamp: String,
}

/// Any frame the server sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Chat(ChatMessage),
    UserList(UserListMessage),
    GroupList(GroupListMessage),
    History(HistoryMessage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_frame_tolerates_missing_fields() {
        // テスト項目: type 以外のフィールドが無くてもデコードできる
        // given (前提条件):
        let json = r#"{"type":"leave_group","to":"team"}"#;

        // when (操作):
        let frame: InboundFrame = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(frame.r#type, "leave_group");
        assert_eq!(frame.to.as_deref(), Some("team"));
        assert_eq!(frame.content, None);
        assert_eq!(frame.members, None);
    }

    #[test]
    fn test_inbound_frame_without_type_is_malformed() {
        // テスト項目: type が無い JSON はデコードエラーになる
        // given (前提条件):
        let json = r#"{"to":"bob","content":"hi"}"#;

        // when (操作):
        let result = serde_json::from_str::<InboundFrame>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_message_type_round_trips_through_str() {
        // テスト項目: 文字列表現と FromStr が一致する
        // given (前提条件):
        let types = [
            MessageType::PrivateMessage,
            MessageType::CreateGroup,
            MessageType::UpdateLastSeen,
            MessageType::UnreadCount,
        ];

        // when / then (操作 / 期待する結果):
        for t in types {
            assert_eq!(t.as_str().parse::<MessageType>(), Ok(t));
            assert_eq!(
                serde_json::to_string(&t).unwrap(),
                format!("\"{}\"", t.as_str())
            );
        }
        assert_eq!("typing".parse::<MessageType>(), Err("typing".to_string()));
    }
}
