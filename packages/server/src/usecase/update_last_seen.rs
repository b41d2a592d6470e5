//! UseCase: 既読位置の更新処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateLastSeenUseCase::execute() と resolve_target()
//!
//! ### なぜこのテストが必要か
//! - 既読位置が最新メッセージ以降なら未読数が 0 になることを保証
//! - 解釈できないタイムスタンプでも拒否せず、サーバーの現在時刻で記録することを確認
//! - チャット ID がグループか個別チャットかの判定を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：クライアントが申告したタイムスタンプで記録
//! - 異常系：不正なタイムスタンプ
//! - エッジケース：ハンドル名とグループ ID が同じ文字列

use std::sync::Arc;

use crate::domain::{
    ChatTarget, ChatType, ConversationKey, GroupId, GroupRepository, Handle, LastSeenRepository,
    Timestamp, ValueObjectError,
};

use super::notifier::Notifier;

/// 既読位置更新のユースケース
pub struct UpdateLastSeenUseCase {
    group_repository: Arc<dyn GroupRepository>,
    last_seen_repository: Arc<dyn LastSeenRepository>,
    notifier: Arc<Notifier>,
}

impl UpdateLastSeenUseCase {
    /// 新しい UpdateLastSeenUseCase を作成
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        last_seen_repository: Arc<dyn LastSeenRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            group_repository,
            last_seen_repository,
            notifier,
        }
    }

    /// チャット ID を会話に解決する
    ///
    /// 種類の指定があればそれに従う。無ければ、要求者が所属するグループの ID と一致する場合は
    /// グループ、それ以外は個別チャットとして扱う。
    pub async fn resolve_target(
        &self,
        requester: &Handle,
        chat_id: String,
        chat_type: Option<ChatType>,
    ) -> Result<ChatTarget, ValueObjectError> {
        match chat_type {
            Some(ChatType::Group) => Ok(ChatTarget::Group(GroupId::new(chat_id)?)),
            Some(ChatType::Private) => Ok(ChatTarget::Direct(Handle::new(chat_id)?)),
            None => {
                if let Ok(group_id) = GroupId::new(chat_id.clone()) {
                    let is_member = self
                        .group_repository
                        .get_group(&group_id)
                        .await
                        .is_some_and(|group| group.is_member(requester));
                    if is_member {
                        return Ok(ChatTarget::Group(group_id));
                    }
                }
                Ok(ChatTarget::Direct(Handle::new(chat_id)?))
            }
        }
    }

    /// 既読位置の更新を実行し、要求者に最新の未読数を返す
    ///
    /// # Arguments
    ///
    /// * `requester` - 要求者
    /// * `chat` - 対象の会話
    /// * `seen_at` - クライアントが申告した既読時刻（RFC 3339）。解釈できなければ現在時刻を使う
    pub async fn execute(
        &self,
        requester: Handle,
        chat: ChatTarget,
        seen_at: Option<&str>,
    ) -> Timestamp {
        let at = match seen_at.map(Timestamp::parse_rfc3339) {
            Some(Ok(at)) => at,
            Some(Err(e)) => {
                tracing::debug!("{}; using server time instead", e);
                self.notifier.now()
            }
            None => self.notifier.now(),
        };

        let key = match &chat {
            ChatTarget::Direct(other) => Some(ConversationKey::direct(&requester, other)),
            ChatTarget::Group(group_id) => self
                .group_repository
                .get_group(group_id)
                .await
                .map(|group| group.conversation_key()),
        };
        match key {
            Some(key) => {
                self.last_seen_repository
                    .mark_seen(requester.clone(), key, at)
                    .await;
                tracing::debug!(
                    "'{}' has seen '{}' up to {}",
                    requester,
                    chat.chat_id(),
                    at.to_rfc3339()
                );
            }
            None => tracing::debug!(
                "Ignored last seen of '{}' for missing group '{}'",
                requester,
                chat.chat_id()
            ),
        }

        self.notifier.push_unread_counts(&requester).await;
        at
    }
}
