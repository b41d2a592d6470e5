//! 通知の共通処理
//!
//! 複数のユースケースが使うファンアウト（user_list / group_list / unread_count /
//! system 通知）をまとめます。
//!
//! ## 送信失敗の扱い
//!
//! 通知はすべてベストエフォートです。送信に失敗してもユースケースは失敗させず、
//! ログに残すだけにします（満杯キューのセッションの追い出しは MessagePusher が行う）。

use std::{collections::BTreeMap, sync::Arc};

use nagare_shared::time::Clock;

use crate::domain::{
    ConversationKey, GroupRepository, Handle, LastSeenRepository, MessagePushError,
    MessagePusher, MessageRepository, OutboundMessage, Timestamp,
};

/// 通知の共通処理
pub struct Notifier {
    group_repository: Arc<dyn GroupRepository>,
    message_repository: Arc<dyn MessageRepository>,
    last_seen_repository: Arc<dyn LastSeenRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl Notifier {
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        last_seen_repository: Arc<dyn LastSeenRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            group_repository,
            message_repository,
            last_seen_repository,
            message_pusher,
            clock,
        }
    }

    /// サーバーの現在時刻
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 接続中の全員に最新の user_list を送る
    pub async fn push_user_list(&self) {
        let handles = self.message_pusher.connected_handles().await;
        let message = OutboundMessage::UserList {
            handles: handles.clone(),
            timestamp: self.now(),
        };
        log_failure("user_list", self.message_pusher.broadcast(handles, &message).await);
    }

    /// 接続中の全員に、それぞれが所属するグループだけの group_list を送る
    pub async fn push_group_lists(&self) {
        for handle in self.message_pusher.connected_handles().await {
            self.push_group_list_to(&handle).await;
        }
    }

    /// 1 人に group_list を送る
    pub async fn push_group_list_to(&self, handle: &Handle) {
        let message = OutboundMessage::GroupList {
            groups: self.group_repository.list_groups_for(handle).await,
            timestamp: self.now(),
        };
        log_failure("group_list", self.message_pusher.push_to(handle, &message).await);
    }

    /// `handle` から見た未読数（チャット ID → 件数、0 件は含めない）
    ///
    /// 個別チャットはログを共有する相手全員、グループは所属グループ全部が対象。
    pub async fn unread_counts(&self, handle: &Handle) -> BTreeMap<String, usize> {
        let mut chats: Vec<(String, ConversationKey)> = self
            .message_repository
            .direct_partners(handle)
            .await
            .into_iter()
            .map(|partner| {
                let key = ConversationKey::direct(handle, &partner);
                (partner.as_str().to_string(), key)
            })
            .collect();
        chats.extend(
            self.group_repository
                .list_groups_for(handle)
                .await
                .into_iter()
                .map(|group| (group.id().as_str().to_string(), group.conversation_key())),
        );

        let mut counts = BTreeMap::new();
        for (chat_id, key) in chats {
            let last_seen = self.last_seen_repository.last_seen(handle, &key).await;
            let unread = self
                .message_repository
                .count_unread(&key, handle, last_seen)
                .await;
            if unread > 0 {
                // ハンドル名とグループ ID が衝突した場合は合算する
                *counts.entry(chat_id).or_insert(0) += unread;
            }
        }
        counts
    }

    /// オンラインであれば `handle` に unread_count を送る
    pub async fn push_unread_counts(&self, handle: &Handle) {
        if self.message_pusher.lookup(handle).await.is_none() {
            return;
        }
        let message = OutboundMessage::UnreadCount {
            recipient: handle.clone(),
            counts: self.unread_counts(handle).await,
            timestamp: self.now(),
        };
        log_failure("unread_count", self.message_pusher.push_to(handle, &message).await);
    }

    /// 1 人に system 通知を送る
    pub async fn notify(&self, handle: &Handle, text: impl Into<String>) {
        let message = OutboundMessage::system(text, self.now());
        log_failure("system", self.message_pusher.push_to(handle, &message).await);
    }

    /// 指定したメンバーに system 通知を送る
    pub async fn notify_members(
        &self,
        members: impl IntoIterator<Item = Handle>,
        text: impl Into<String>,
    ) {
        let message = OutboundMessage::system(text, self.now());
        let targets: Vec<Handle> = members.into_iter().collect();
        log_failure("system", self.message_pusher.broadcast(targets, &message).await);
    }

    /// 接続中の全員に system 通知を送る
    pub async fn broadcast_system(&self, text: impl Into<String>) {
        let targets = self.message_pusher.connected_handles().await;
        self.notify_members(targets, text).await;
    }
}

fn log_failure(kind: &str, result: Result<(), MessagePushError>) {
    match result {
        Ok(()) => {}
        Err(MessagePushError::ClientNotFound(handle)) => {
            tracing::debug!("Skipped {} for offline client '{}'", kind, handle);
        }
        Err(e) => tracing::warn!("Failed to push {}: {}", kind, e),
    }
}
