//! Inbound frame dispatcher
//!
//! 1 フレームごとに次を行います（フレーム間で状態は持たない）。
//!
//! 1. JSON としてデコード（失敗したらログに残して破棄。接続は切らない）
//! 2. 送信者をセッションのハンドル名で、時刻をサーバー受信時刻で上書き
//! 3. type に応じて 1 つのユースケースを呼ぶ（未知の type はログに残して無視）
//! 4. 拒否された操作は要求者に system 通知で返す

use thiserror::Error;

use crate::{
    domain::{
        ChatTarget, ChatType, GroupError, GroupId, GroupName, Handle, MessageContent, Timestamp,
        ValueObjectError,
    },
    infrastructure::dto::websocket::{InboundFrame, MessageType},
    ui::state::AppState,
    usecase::{HistoryError, SendMessageError},
};

/// 要求者に返す拒否理由
#[derive(Debug, Error)]
enum Refusal {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("unknown chat type '{0}'")]
    UnknownChatType(String),
    #[error(transparent)]
    Invalid(#[from] ValueObjectError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Send(#[from] SendMessageError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// 1 フレームを処理する
pub async fn dispatch(state: &AppState, sender: &Handle, text: &str) {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Dropping malformed frame from '{}': {}", sender, e);
            return;
        }
    };

    let message_type = match frame.r#type.parse::<MessageType>() {
        Ok(message_type) => message_type,
        Err(unknown) => {
            tracing::warn!("Ignoring frame of unknown type '{}' from '{}'", unknown, sender);
            return;
        }
    };

    if let Some(claimed) = frame.from.as_deref() {
        if !claimed.is_empty() && claimed != sender.as_str() {
            tracing::debug!(
                "Frame from '{}' claimed sender '{}'; using the session handle",
                sender,
                claimed
            );
        }
    }
    let received_at = state.notifier.now();

    tracing::debug!("Dispatching '{}' from '{}'", message_type.as_str(), sender);
    let result = match message_type {
        MessageType::PrivateMessage => private_message(state, sender, frame, received_at).await,
        MessageType::GroupMessage => group_message(state, sender, frame, received_at).await,
        MessageType::CreateGroup => create_group(state, sender, frame).await,
        MessageType::AddGroupMember => add_group_member(state, sender, frame).await,
        MessageType::RemoveGroupMember => remove_group_member(state, sender, frame).await,
        MessageType::LeaveGroup => leave_group(state, sender, frame).await,
        MessageType::RequestHistory => request_history(state, sender, frame).await,
        MessageType::UpdateLastSeen => update_last_seen(state, sender, frame).await,
        outbound_only => {
            tracing::warn!(
                "Ignoring server-only frame type '{}' from '{}'",
                outbound_only.as_str(),
                sender
            );
            Ok(())
        }
    };

    if let Err(refusal) = result {
        tracing::warn!(
            "Refused '{}' from '{}': {}",
            message_type.as_str(),
            sender,
            refusal
        );
        state.notifier.notify(sender, refusal.to_string()).await;
    }
}

async fn private_message(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
    received_at: Timestamp,
) -> Result<(), Refusal> {
    let to = Handle::new(required(frame.to, "to")?)?;
    let content = MessageContent::new(frame.content.unwrap_or_default())?;

    state
        .send_private_message_usecase
        .execute(sender.clone(), to, content, received_at)
        .await;
    Ok(())
}

async fn group_message(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
    received_at: Timestamp,
) -> Result<(), Refusal> {
    let group_id = group_id_of(frame.group_id, frame.to)?;
    let content = MessageContent::new(frame.content.unwrap_or_default())?;

    state
        .send_group_message_usecase
        .execute(sender.clone(), group_id, content, received_at)
        .await?;
    Ok(())
}

async fn create_group(state: &AppState, sender: &Handle, frame: InboundFrame) -> Result<(), Refusal> {
    let name = GroupName::new(required(present(frame.group_name).or(frame.to), "group_name")?)?;
    let members = match frame.members {
        Some(members) => handles(members)?,
        None => handles(split_list(frame.content.as_deref()))?,
    };

    state
        .create_group_usecase
        .execute(sender.clone(), name, members)
        .await?;
    Ok(())
}

async fn add_group_member(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
) -> Result<(), Refusal> {
    let group_id = group_id_of(frame.group_id, frame.to)?;
    let members = match (frame.members, present(frame.member)) {
        (Some(members), _) if !members.is_empty() => handles(members)?,
        (_, Some(member)) => vec![Handle::new(member)?],
        _ => handles(split_list(frame.content.as_deref()))?,
    };
    if members.is_empty() {
        return Err(Refusal::MissingField("member"));
    }

    state
        .add_group_member_usecase
        .execute(group_id, sender.clone(), members)
        .await?;
    Ok(())
}

async fn remove_group_member(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
) -> Result<(), Refusal> {
    let group_id = group_id_of(frame.group_id, frame.to)?;
    let target = Handle::new(required(present(frame.member).or(frame.content), "member")?)?;

    state
        .remove_group_member_usecase
        .execute(group_id, sender.clone(), target)
        .await?;
    Ok(())
}

async fn leave_group(state: &AppState, sender: &Handle, frame: InboundFrame) -> Result<(), Refusal> {
    let group_id = group_id_of(frame.group_id, frame.to)?;

    state
        .leave_group_usecase
        .execute(group_id, sender.clone())
        .await?;
    Ok(())
}

async fn request_history(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
) -> Result<(), Refusal> {
    let chat = match present(frame.group_id) {
        Some(group_id) => ChatTarget::Group(GroupId::new(group_id)?),
        None => {
            let chat_type = required(frame.to, "to")?;
            let chat_id = required(frame.content, "content")?;
            match ChatType::parse(&chat_type) {
                Some(ChatType::Private) => ChatTarget::Direct(Handle::new(chat_id)?),
                Some(ChatType::Group) => ChatTarget::Group(GroupId::new(chat_id)?),
                None => return Err(Refusal::UnknownChatType(chat_type)),
            }
        }
    };

    state
        .request_history_usecase
        .execute(sender.clone(), chat)
        .await?;
    Ok(())
}

async fn update_last_seen(
    state: &AppState,
    sender: &Handle,
    frame: InboundFrame,
) -> Result<(), Refusal> {
    let usecase = &state.update_last_seen_usecase;
    let chat = match present(frame.group_id) {
        Some(group_id) => ChatTarget::Group(GroupId::new(group_id)?),
        None => {
            let chat_id = required(frame.to, "to")?;
            let hint = frame.content.as_deref().and_then(ChatType::parse);
            usecase.resolve_target(sender, chat_id, hint).await?
        }
    };

    usecase
        .execute(sender.clone(), chat, frame.timestamp.as_deref())
        .await;
    Ok(())
}

/// `group_id`、無ければ `to` をグループ ID として使う
fn group_id_of(group_id: Option<String>, to: Option<String>) -> Result<GroupId, Refusal> {
    let raw = required(present(group_id).or(to), "group_id")?;
    Ok(GroupId::new(raw)?)
}

/// 空文字列は未指定として扱う
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Refusal> {
    present(value).ok_or(Refusal::MissingField(field))
}

/// カンマ区切りのリスト
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn handles(values: Vec<String>) -> Result<Vec<Handle>, ValueObjectError> {
    values
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .map(Handle::new)
        .collect()
}
