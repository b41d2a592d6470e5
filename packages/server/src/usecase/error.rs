//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::GroupId;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 宛先のグループが存在しない
    #[error("group '{0}' does not exist")]
    GroupNotFound(GroupId),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// グループが存在しない
    #[error("group '{0}' does not exist")]
    GroupNotFound(GroupId),

    /// 要求者がグループのメンバーではない
    #[error("you are not a member of group '{0}'")]
    NotMember(GroupId),
}
