//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 登録解除と、退室通知・user_list の配り直し
//!
//! ### なぜこのテストが必要か
//! - 再接続で置き換えられた古いセッションの終了が、新しいセッションを消さないことを保証
//! - 置き換えの場合に誤って退室通知が出ないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中クライアントの切断
//! - エッジケース：置き換え済みセッションの終了
//! - エッジケース：追い出し済みセッションの終了

use std::sync::Arc;

use crate::domain::{Handle, MessagePusher, SessionId};

use super::notifier::Notifier;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// MessagePusher（接続中セッションの登録簿）
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>, notifier: Arc<Notifier>) -> Self {
        Self {
            message_pusher,
            notifier,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `true` - ハンドルがオフラインになり、退室を通知した
    /// * `false` - 同じハンドルの新しいセッションが残っている
    pub async fn execute(&self, handle: &Handle, session_id: SessionId) -> bool {
        // 1. 登録解除（自分のセッションのときだけ削除される）
        self.message_pusher
            .unregister_client(handle, session_id)
            .await;

        // 2. 新しいセッションがハンドルを引き継いでいれば何も通知しない
        if self.message_pusher.lookup(handle).await.is_some() {
            tracing::debug!(
                "Session {} of '{}' ended; a newer session holds the handle",
                session_id,
                handle
            );
            return false;
        }

        // 3. 退室通知と user_list の配り直し
        self.notifier
            .broadcast_system(format!("{} left the chat", handle))
            .await;
        self.notifier.push_user_list().await;

        tracing::info!("Client '{}' disconnected", handle);
        true
    }
}
