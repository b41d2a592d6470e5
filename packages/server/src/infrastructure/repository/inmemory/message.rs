//! InMemory Message Store 実装
//!
//! 外側のマップは RwLock で保護し、会話ごとのログはそれぞれ独立した Mutex で保護します。
//! 異なる会話への追記は互いに待たず、同じ会話への追記は到着順に直列化されます。
//!
//! 追記時のタイムスタンプは会話ごとに狭義単調増加になるよう、ログのロックの内側で
//! 直前のメッセージ + 1ms 以上に丸めます。ログの順序とタイムスタンプの順序は常に一致し、
//! 既読位置と同じミリ秒に届いた後続のメッセージも未読として数えられます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ChatMessage, ConversationKey, Handle, MessageRepository, Timestamp, unread::count_unread,
};

type ConversationLog = Arc<Mutex<Vec<ChatMessage>>>;

/// インメモリ Message Store
#[derive(Default)]
pub struct InMemoryMessageRepository {
    /// Key: 会話キー, Value: 到着順のメッセージログ
    logs: RwLock<HashMap<ConversationKey, ConversationLog>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn log(&self, key: &ConversationKey) -> Option<ConversationLog> {
        let logs = self.logs.read().await;
        logs.get(key).cloned()
    }

    async fn log_or_create(&self, key: ConversationKey) -> ConversationLog {
        if let Some(log) = self.log(&key).await {
            return log;
        }
        let mut logs = self.logs.write().await;
        logs.entry(key).or_default().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, key: ConversationKey, mut message: ChatMessage) -> ChatMessage {
        tracing::debug!("Appending message from '{}' to conversation {}", message.from, key);
        let log = self.log_or_create(key).await;
        let mut log = log.lock().await;
        if let Some(last) = log.last() {
            let floor = last.timestamp.value().saturating_add(1);
            if message.timestamp.value() < floor {
                message.timestamp = Timestamp::new(floor);
            }
        }
        log.push(message.clone());
        message
    }

    async fn history(&self, key: &ConversationKey) -> Vec<ChatMessage> {
        match self.log(key).await {
            Some(log) => log.lock().await.clone(),
            None => Vec::new(),
        }
    }

    async fn count_unread(
        &self,
        key: &ConversationKey,
        reader: &Handle,
        last_seen: Option<Timestamp>,
    ) -> usize {
        match self.log(key).await {
            Some(log) => count_unread(&log.lock().await, reader, last_seen),
            None => 0,
        }
    }

    async fn count_messages(&self, key: &ConversationKey) -> usize {
        match self.log(key).await {
            Some(log) => log.lock().await.len(),
            None => 0,
        }
    }

    async fn direct_partners(&self, handle: &Handle) -> Vec<Handle> {
        let logs = self.logs.read().await;
        let mut partners: Vec<Handle> = logs
            .keys()
            .filter_map(|key| key.partner_of(handle).cloned())
            .collect();
        partners.sort();
        partners
    }

    async fn purge(&self, key: &ConversationKey) {
        let mut logs = self.logs.write().await;
        if logs.remove(key).is_some() {
            tracing::info!("Purged message log of conversation {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatTarget, GroupId, GroupIncarnation, MessageContent};

    fn handle(name: &str) -> Handle {
        Handle::new(name.to_string()).unwrap()
    }

    fn direct(from: &str, to: &str, content: &str, at: i64) -> (ConversationKey, ChatMessage) {
        let (from, to) = (handle(from), handle(to));
        let key = ConversationKey::direct(&from, &to);
        let message = ChatMessage::new(
            from,
            ChatTarget::Direct(to),
            MessageContent::new(content.to_string()).unwrap(),
            Timestamp::new(at),
        );
        (key, message)
    }

    #[tokio::test]
    async fn test_history_is_shared_by_both_participants() {
        // テスト項目: A→B のメッセージは history(A,B) と history(B,A) に同じ順序で現れる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        for (i, (from, to)) in [("alice", "bob"), ("bob", "alice"), ("alice", "bob")]
            .into_iter()
            .enumerate()
        {
            let (key, message) = direct(from, to, &format!("m{i}"), i as i64);
            repo.append(key, message).await;
        }

        // when (操作):
        let from_alice = repo
            .history(&ConversationKey::direct(&handle("alice"), &handle("bob")))
            .await;
        let from_bob = repo
            .history(&ConversationKey::direct(&handle("bob"), &handle("alice")))
            .await;

        // then (期待する結果):
        assert_eq!(from_alice, from_bob);
        let contents: Vec<&str> = from_alice.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);
    }

    #[tokio::test]
    async fn test_history_of_unknown_conversation_is_empty() {
        // テスト項目: ログが無い会話の履歴は空
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();

        // when (操作):
        let history = repo
            .history(&ConversationKey::direct(&handle("alice"), &handle("bob")))
            .await;

        // then (期待する結果):
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_count_unread_uses_watermark() {
        // テスト項目: 既読位置より新しい相手のメッセージだけが未読として数えられる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        for at in [10, 20, 30] {
            let (key, message) = direct("alice", "bob", "hi", at);
            repo.append(key, message).await;
        }
        let key = ConversationKey::direct(&handle("alice"), &handle("bob"));

        // when (操作):
        let never_seen = repo.count_unread(&key, &handle("bob"), None).await;
        let seen_20 = repo
            .count_unread(&key, &handle("bob"), Some(Timestamp::new(20)))
            .await;
        let own = repo.count_unread(&key, &handle("alice"), None).await;

        // then (期待する結果):
        assert_eq!(never_seen, 3);
        assert_eq!(seen_20, 1);
        assert_eq!(own, 0);
    }

    #[tokio::test]
    async fn test_direct_partners_lists_conversations_of_handle() {
        // テスト項目: 個別チャットの相手だけが列挙され、グループのログは含まれない
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let (key, message) = direct("alice", "bob", "hi", 1);
        repo.append(key, message).await;
        let (key, message) = direct("carol", "alice", "yo", 2);
        repo.append(key, message).await;
        let (key, message) = direct("bob", "carol", "hey", 3);
        repo.append(key, message).await;
        let group_id = GroupId::new("team".to_string()).unwrap();
        repo.append(
            ConversationKey::Group(group_id.clone(), GroupIncarnation::generate()),
            ChatMessage::new(
                handle("alice"),
                ChatTarget::Group(group_id),
                MessageContent::new("all".to_string()).unwrap(),
                Timestamp::new(4),
            ),
        )
        .await;

        // when (操作):
        let partners = repo.direct_partners(&handle("alice")).await;

        // then (期待する結果):
        assert_eq!(partners, vec![handle("bob"), handle("carol")]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_same_conversation_are_all_kept() {
        // テスト項目: 同じ会話への並行追記でもメッセージが失われない
        // given (前提条件):
        let repo = Arc::new(InMemoryMessageRepository::new());

        // when (操作):
        let mut tasks = Vec::new();
        for i in 0..50 {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                let (key, message) = direct("alice", "bob", &format!("m{i}"), i);
                repo.append(key, message).await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // then (期待する結果):
        let key = ConversationKey::direct(&handle("alice"), &handle("bob"));
        assert_eq!(repo.count_messages(&key).await, 50);
    }

    #[tokio::test]
    async fn test_append_keeps_timestamps_strictly_increasing() {
        // テスト項目: 直前のメッセージと同時刻・過去時刻の追記は直前 + 1ms に丸められる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let (key, first) = direct("alice", "bob", "first", 100);
        repo.append(key.clone(), first).await;

        // when (操作):
        let (_, same_millis) = direct("alice", "bob", "same", 100);
        let stored_same = repo.append(key.clone(), same_millis).await;
        let (_, earlier) = direct("bob", "alice", "late", 50);
        let stored_earlier = repo.append(key.clone(), earlier).await;

        // then (期待する結果):
        assert_eq!(stored_same.timestamp, Timestamp::new(101));
        assert_eq!(stored_earlier.timestamp, Timestamp::new(102));
        let stamps: Vec<i64> = repo
            .history(&key)
            .await
            .iter()
            .map(|m| m.timestamp.value())
            .collect();
        assert_eq!(stamps, vec![100, 101, 102]);
    }

    #[tokio::test]
    async fn test_message_in_same_millisecond_as_watermark_is_unread() {
        // テスト項目: 既読にしたメッセージと同じミリ秒に届いたメッセージは未読として数えられる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let (key, seen) = direct("alice", "bob", "seen", 100);
        let watermark = repo.append(key.clone(), seen).await.timestamp;

        // when (操作):
        let (_, next) = direct("alice", "bob", "next", 100);
        repo.append(key.clone(), next).await;

        // then (期待する結果):
        assert_eq!(
            repo.count_unread(&key, &handle("bob"), Some(watermark)).await,
            1
        );
    }

    #[tokio::test]
    async fn test_purge_removes_log() {
        // テスト項目: purge したログは履歴から消える
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let (key, message) = direct("alice", "bob", "hi", 1);
        repo.append(key.clone(), message).await;

        // when (操作):
        repo.purge(&key).await;

        // then (期待する結果):
        assert_eq!(repo.count_messages(&key).await, 0);
    }
}
