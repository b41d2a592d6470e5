//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - セッションの登録と、接続直後に送られる通知（user_list, group_list, unread_count, 入室通知）
//!
//! ### なぜこのテストが必要か
//! - 1 ハンドルにつき生存セッションは高々 1 つ、という不変条件を保証
//! - 再接続時に古いセッションが close されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規クライアントの接続
//! - 正常系：同じハンドルでの再接続（後勝ち）

use std::sync::Arc;

use crate::domain::{ConnectionSession, MessagePusher};

use super::notifier::Notifier;

/// 接続の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// 新規接続
    Joined,
    /// 同じハンドルの既存セッションを置き換えた
    Replaced,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（接続中セッションの登録簿）
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>, notifier: Arc<Notifier>) -> Self {
        Self {
            message_pusher,
            notifier,
        }
    }

    /// 参加者接続を実行
    ///
    /// 登録は常に成功する。同じハンドルのセッションが既にあれば、そちらを close して置き換える。
    pub async fn execute(&self, session: ConnectionSession) -> ConnectOutcome {
        let handle = session.handle().clone();

        // 1. 登録簿にセッションを登録（後勝ち）
        let outcome = match self.message_pusher.register_client(session).await {
            Some(_) => ConnectOutcome::Replaced,
            None => ConnectOutcome::Joined,
        };

        // 2. 在室者・グループ一覧を全員に配り直す
        self.notifier.push_user_list().await;
        self.notifier.push_group_lists().await;

        // 3. 本人の未読数
        self.notifier.push_unread_counts(&handle).await;

        // 4. 入室通知
        self.notifier
            .broadcast_system(format!("{} joined the chat", handle))
            .await;

        tracing::info!("Client '{}' connected ({:?})", handle, outcome);
        outcome
    }
}
