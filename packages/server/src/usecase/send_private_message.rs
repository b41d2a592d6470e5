//! UseCase: 個別メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendPrivateMessageUseCase::execute() メソッド
//! - 保存 → 宛先への配送 → 宛先の未読数更新
//!
//! ### なぜこのテストが必要か
//! - 相手がオフラインでもメッセージが保存され、後から履歴で読めることを保証
//! - 配送できなかった場合に送信者へ通知が届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：オンラインの相手への送信
//! - 異常系：オフラインの相手への送信

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ChatTarget, ConversationKey, Handle, MessageContent, MessagePushError,
    MessagePusher, MessageRepository, OutboundMessage, Timestamp,
};

use super::notifier::Notifier;

/// 個別メッセージの配送結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateDelivery {
    /// 宛先のキューに積んだ
    Delivered,
    /// 宛先がオフライン（または追い出された）。保存のみ
    StoredOnly,
}

/// 個別メッセージ送信のユースケース
pub struct SendPrivateMessageUseCase {
    message_repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl SendPrivateMessageUseCase {
    /// 新しい SendPrivateMessageUseCase を作成
    pub fn new(
        message_repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            message_repository,
            message_pusher,
            notifier,
        }
    }

    /// 個別メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信者（セッションのハンドル名）
    /// * `to` - 宛先のハンドル名
    /// * `content` - 本文
    /// * `timestamp` - サーバー受信時刻
    pub async fn execute(
        &self,
        from: Handle,
        to: Handle,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> PrivateDelivery {
        let key = ConversationKey::direct(&from, &to);
        let message = ChatMessage::new(from.clone(), ChatTarget::Direct(to.clone()), content, timestamp);

        // 1. 会話ログに追記（宛先がオフラインでも保存する）
        let message = self.message_repository.append(key.clone(), message).await;
        tracing::debug!("Stored private message in '{}'", key);

        // 2. 宛先へ配送
        let delivery = match self
            .message_pusher
            .push_to(&to, &OutboundMessage::Chat(message))
            .await
        {
            Ok(()) => PrivateDelivery::Delivered,
            Err(MessagePushError::ClientNotFound(_)) => PrivateDelivery::StoredOnly,
            Err(e) => {
                tracing::warn!("Failed to deliver private message to '{}': {}", to, e);
                PrivateDelivery::StoredOnly
            }
        };

        // 3. 宛先の未読数更新、または送信者への通知
        match delivery {
            PrivateDelivery::Delivered => self.notifier.push_unread_counts(&to).await,
            PrivateDelivery::StoredOnly => {
                self.notifier
                    .notify(
                        &from,
                        format!("{} is not online; the message was saved to your history", to),
                    )
                    .await
            }
        }
        delivery
    }
}
