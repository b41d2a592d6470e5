//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatTarget, Group, OutboundMessage, entity};
use crate::infrastructure::dto::websocket as dto;

/// Sender name used for server-generated frames that carry one
const SYSTEM_SENDER: &str = "system";

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&entity::ChatMessage> for dto::ChatMessage {
    fn from(model: &entity::ChatMessage) -> Self {
        let r#type = match model.to {
            ChatTarget::Direct(_) => dto::MessageType::PrivateMessage,
            ChatTarget::Group(_) => dto::MessageType::GroupMessage,
        };
        Self {
            r#type,
            from: model.from.as_str().to_string(),
            to: model.to.chat_id().to_string(),
            content: model.content.as_str().to_string(),
            timestamp: model.timestamp.to_rfc3339(),
        }
    }
}

impl From<&Group> for dto::GroupInfo {
    fn from(model: &Group) -> Self {
        Self {
            id: model.id().as_str().to_string(),
            name: model.name().as_str().to_string(),
            admin: model.admin().as_str().to_string(),
            members: model
                .members()
                .iter()
                .map(|member| member.as_str().to_string())
                .collect(),
        }
    }
}

impl TryFrom<&OutboundMessage> for dto::OutboundFrame {
    type Error = serde_json::Error;

    fn try_from(model: &OutboundMessage) -> Result<Self, Self::Error> {
        let frame = match model {
            OutboundMessage::Chat(message) => dto::OutboundFrame::Chat(message.into()),
            OutboundMessage::System { content, timestamp } => {
                dto::OutboundFrame::Chat(dto::ChatMessage {
                    r#type: dto::MessageType::System,
                    from: String::new(),
                    to: String::new(),
                    content: content.clone(),
                    timestamp: timestamp.to_rfc3339(),
                })
            }
            OutboundMessage::UserList { handles, timestamp } => {
                dto::OutboundFrame::UserList(dto::UserListMessage {
                    r#type: dto::MessageType::UserList,
                    users: handles
                        .iter()
                        .map(|h| (h.as_str().to_string(), h.as_str().to_string()))
                        .collect(),
                    timestamp: timestamp.to_rfc3339(),
                })
            }
            OutboundMessage::GroupList { groups, timestamp } => {
                dto::OutboundFrame::GroupList(dto::GroupListMessage {
                    r#type: dto::MessageType::GroupList,
                    groups: groups.iter().map(dto::GroupInfo::from).collect(),
                    timestamp: timestamp.to_rfc3339(),
                })
            }
            OutboundMessage::History {
                chat,
                messages,
                timestamp,
            } => dto::OutboundFrame::History(dto::HistoryMessage {
                r#type: dto::MessageType::History,
                chat_type: chat.chat_type().as_str().to_string(),
                chat_id: chat.chat_id().to_string(),
                content: messages.iter().map(dto::ChatMessage::from).collect(),
                timestamp: timestamp.to_rfc3339(),
            }),
            OutboundMessage::UnreadCount {
                recipient,
                counts,
                timestamp,
            } => dto::OutboundFrame::Chat(dto::ChatMessage {
                r#type: dto::MessageType::UnreadCount,
                from: SYSTEM_SENDER.to_string(),
                to: recipient.as_str().to_string(),
                content: serde_json::to_string(counts)?,
                timestamp: timestamp.to_rfc3339(),
            }),
        };
        Ok(frame)
    }
}

/// Encode an outbound notification into one JSON text frame
pub fn encode_outbound(message: &OutboundMessage) -> Result<String, serde_json::Error> {
    let frame = dto::OutboundFrame::try_from(message)?;
    serde_json::to_string(&frame)
}
