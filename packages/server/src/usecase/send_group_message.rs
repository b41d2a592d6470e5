//! UseCase: グループメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendGroupMessageUseCase::execute() メソッド
//! - 保存 → 全メンバーへのファンアウト → 他メンバーの未読数更新
//!
//! ### なぜこのテストが必要か
//! - 存在しないグループ宛てでは何も保存されないことを保証
//! - 送信者を含む全メンバーに届くこと（クライアントはエコーで画面を更新する）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：オンライン / オフラインのメンバーが混在するグループへの送信
//! - 異常系：存在しないグループへの送信

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ChatTarget, GroupId, GroupRepository, Handle, MessageContent, MessagePusher,
    MessageRepository, OutboundMessage, Timestamp,
};

use super::{error::SendMessageError, notifier::Notifier};

/// グループメッセージ送信のユースケース
pub struct SendGroupMessageUseCase {
    group_repository: Arc<dyn GroupRepository>,
    message_repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl SendGroupMessageUseCase {
    /// 新しい SendGroupMessageUseCase を作成
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            group_repository,
            message_repository,
            message_pusher,
            notifier,
        }
    }

    /// グループメッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Handle>)` - ファンアウトの対象にしたメンバー
    /// * `Err(SendMessageError)` - グループが存在しない（何も保存しない）
    pub async fn execute(
        &self,
        from: Handle,
        group_id: GroupId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<Vec<Handle>, SendMessageError> {
        // 1. グループの存在確認とメンバーのスナップショット
        let group = self
            .group_repository
            .get_group(&group_id)
            .await
            .ok_or_else(|| SendMessageError::GroupNotFound(group_id.clone()))?;
        let members: Vec<Handle> = group.members().iter().cloned().collect();

        // 2. グループのログに追記
        let message = ChatMessage::new(from.clone(), ChatTarget::Group(group_id.clone()), content, timestamp);
        let message = self
            .message_repository
            .append(group.conversation_key(), message)
            .await;

        // 3. 送信者を含む全メンバーにファンアウト
        if let Err(e) = self
            .message_pusher
            .broadcast(members.clone(), &OutboundMessage::Chat(message))
            .await
        {
            tracing::warn!("Failed to fan out message to group '{}': {}", group_id, e);
        }

        // 4. 他のメンバーの未読数を更新
        for member in members.iter().filter(|member| **member != from) {
            self.notifier.push_unread_counts(member).await;
        }

        tracing::debug!(
            "Group message from '{}' fanned out to {} members of '{}'",
            from,
            members.len(),
            group_id
        );
        Ok(members)
    }
}
