//! Value Object 定義
//!
//! ハンドル名・グループ ID・メッセージ本文などの不変値を型で表現し、
//! 生成時にバリデーションを行います。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// ハンドル名の最大文字数
pub const HANDLE_MAX_LEN: usize = 32;
/// グループ名の最大文字数
pub const GROUP_NAME_MAX_LEN: usize = 64;
/// メッセージ本文の最大文字数
pub const MESSAGE_CONTENT_MAX_LEN: usize = 4000;

/// 接続ユーザーのハンドル名（Registry のキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::HandleEmpty);
        }
        if value.chars().count() > HANDLE_MAX_LEN {
            return Err(ValueObjectError::HandleTooLong(HANDLE_MAX_LEN));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValueObjectError::HandleInvalidCharacter(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// グループの表示名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::GroupNameEmpty);
        }
        if value.chars().count() > GROUP_NAME_MAX_LEN {
            return Err(ValueObjectError::GroupNameTooLong(GROUP_NAME_MAX_LEN));
        }
        if value.chars().any(char::is_control) {
            return Err(ValueObjectError::GroupNameInvalidCharacter(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// グループ ID
///
/// 作成時のグループ名をそのまま ID として採用する。生存中のグループ間で一意。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        GroupName::new(value).map(Self::from)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<GroupName> for GroupId {
    fn from(name: GroupName) -> Self {
        Self(name.0)
    }
}

impl TryFrom<String> for GroupId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// グループの世代
///
/// 作成のたびに採番する。削除後に同じ ID で作り直されたグループとは別の値になり、
/// 履歴と既読位置はこの値で区別される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupIncarnation(Uuid);

impl GroupIncarnation {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GroupIncarnation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// メッセージ本文（不透明なテキストペイロード）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::ContentEmpty);
        }
        if value.chars().count() > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValueObjectError::ContentTooLong(MESSAGE_CONTENT_MAX_LEN));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// サーバー受信時刻（Unix ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// RFC 3339 文字列から生成する
    pub fn parse_rfc3339(value: &str) -> Result<Self, ValueObjectError> {
        nagare_shared::time::parse_rfc3339_millis(value)
            .map(Self)
            .ok_or_else(|| ValueObjectError::TimestampInvalid(value.to_string()))
    }

    /// ワイヤ上の表現（JST, ミリ秒精度の RFC 3339）
    pub fn to_rfc3339(&self) -> String {
        nagare_shared::time::timestamp_to_jst_rfc3339(self.0)
    }
}

/// 会話の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatType {
    Private,
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "private" => Some(ChatType::Private),
            "group" => Some(ChatType::Group),
            _ => None,
        }
    }
}

/// あるユーザーから見た会話の相手（個別チャットの相手 or グループ）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChatTarget {
    Direct(Handle),
    Group(GroupId),
}

impl ChatTarget {
    pub fn chat_type(&self) -> ChatType {
        match self {
            ChatTarget::Direct(_) => ChatType::Private,
            ChatTarget::Group(_) => ChatType::Group,
        }
    }

    /// クライアントが使うチャット ID（相手のハンドル名 or グループ ID）
    pub fn chat_id(&self) -> &str {
        match self {
            ChatTarget::Direct(handle) => handle.as_str(),
            ChatTarget::Group(group_id) => group_id.as_str(),
        }
    }
}

/// MessageStore と LastSeen のキー
///
/// 個別チャットは 2 人のハンドル名を辞書順に並べた非順序ペアで正規化する。
/// `direct(a, b) == direct(b, a)`。グループは ID と世代の組で、
/// 削除済みグループのキーが作り直されたグループのキーと一致することはない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversationKey {
    Direct(Handle, Handle),
    Group(GroupId, GroupIncarnation),
}

impl ConversationKey {
    pub fn direct(a: &Handle, b: &Handle) -> Self {
        if a <= b {
            ConversationKey::Direct(a.clone(), b.clone())
        } else {
            ConversationKey::Direct(b.clone(), a.clone())
        }
    }

    /// 個別チャットのキーであれば、`handle` の相手を返す
    pub fn partner_of(&self, handle: &Handle) -> Option<&Handle> {
        match self {
            ConversationKey::Direct(a, b) if a == handle => Some(b),
            ConversationKey::Direct(a, b) if b == handle => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationKey::Direct(a, b) => write!(f, "{}:{}", a, b),
            ConversationKey::Group(group_id, incarnation) => {
                write!(f, "group:{}@{}", group_id, incarnation)
            }
        }
    }
}
