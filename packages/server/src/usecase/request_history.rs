//! UseCase: 履歴取得処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RequestHistoryUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 個別チャットの履歴がどちらの参加者から見ても同じ順序であることを保証
//! - オフライン中に届いたメッセージが到着順で読めることを確認
//! - グループの履歴がメンバー以外に漏れないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：個別チャット / グループの履歴
//! - 異常系：存在しないグループ、メンバーではないグループ

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ChatTarget, ConversationKey, GroupRepository, Handle, MessagePusher,
    MessageRepository, OutboundMessage,
};

use super::{error::HistoryError, notifier::Notifier};

/// 履歴取得のユースケース
pub struct RequestHistoryUseCase {
    group_repository: Arc<dyn GroupRepository>,
    message_repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<Notifier>,
}

impl RequestHistoryUseCase {
    /// 新しい RequestHistoryUseCase を作成
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

    /// 履歴取得を実行し、要求者に history フレームを返す
    ///
    /// 呼び出し時点のスナップショットを到着順で返す。
    pub async fn execute(
        &self,
        requester: Handle,
        chat: ChatTarget,
    ) -> Result<Vec<ChatMessage>, HistoryError> {
        // 1. 会話キーを決める（グループの場合はメンバーであることを確認）
        let key = match &chat {
            ChatTarget::Direct(other) => ConversationKey::direct(&requester, other),
            ChatTarget::Group(group_id) => {
                let group = self
                    .group_repository
                    .get_group(group_id)
                    .await
                    .ok_or_else(|| HistoryError::GroupNotFound(group_id.clone()))?;
                if !group.is_member(&requester) {
                    return Err(HistoryError::NotMember(group_id.clone()));
                }
                group.conversation_key()
            }
        };

        // 2. スナップショットを取得
        let messages = self.message_repository.history(&key).await;
        tracing::debug!(
            "History of '{}' requested by '{}' ({} messages)",
            key,
            requester,
            messages.len()
        );

        // 3. 要求者に返す
        let reply = OutboundMessage::History {
            chat,
            messages: messages.clone(),
            timestamp: self.notifier.now(),
        };
        if let Err(e) = self.message_pusher.push_to(&requester, &reply).await {
            tracing::warn!("Failed to send history to '{}': {}", requester, e);
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Group, GroupId, GroupName, MessageContent, Timestamp};
    use crate::usecase::notifier::test_support::*;

    fn usecase(hub: &Hub) -> RequestHistoryUseCase {
        RequestHistoryUseCase::new(
            hub.groups.clone(),
            hub.messages.clone(),
            hub.registry.clone(),
            hub.notifier.clone(),
        )
    }

    async fn send_direct(hub: &Hub, from: &str, to: &str, text: &str, at: i64) {
        hub.messages
            .append(
                ConversationKey::direct(&handle(from), &handle(to)),
                ChatMessage::new(
                    handle(from),
                    ChatTarget::Direct(handle(to)),
                    MessageContent::new(text.to_string()).unwrap(),
                    Timestamp::new(at),
                ),
            )
            .await;
    }

    #[tokio::test]
    async fn test_private_history_is_returned_in_arrival_order() {
        // テスト項目: オフライン中に届いた 3 通が、送信順の history フレームとして返る
        // given (前提条件):
        let hub = Hub::new();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            send_direct(&hub, "alice", "bob", text, T0 + i as i64).await;
        }
        let mut bob = hub.connect("bob").await;

        // when (操作):
        let messages = usecase(&hub)
            .execute(handle("bob"), ChatTarget::Direct(handle("alice")))
            .await
            .unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);

        let history = of_type(&drain(&mut bob), "history");
        assert_eq!(history[0]["chat_type"], "private");
        assert_eq!(history[0]["chat_id"], "alice");
        let contents: Vec<&str> = history[0]["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_private_history_is_identical_from_both_sides() {
        // テスト項目: history(A, B) と history(B, A) が同一
        // given (前提条件):
        let hub = Hub::new();
        send_direct(&hub, "alice", "bob", "hi", T0).await;
        send_direct(&hub, "bob", "alice", "hello", T0 + 1).await;
        let usecase = usecase(&hub);

        // when (操作):
        let from_alice = usecase
            .execute(handle("alice"), ChatTarget::Direct(handle("bob")))
            .await
            .unwrap();
        let from_bob = usecase
            .execute(handle("bob"), ChatTarget::Direct(handle("alice")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(from_alice.len(), 2);
        assert_eq!(from_alice, from_bob);
    }

    #[tokio::test]
    async fn test_group_history_requires_membership() {
        // テスト項目: メンバー以外はグループの履歴を取得できない
        // given (前提条件):
        let hub = Hub::new();
        let group = Group::create(
            GroupName::new("team".to_string()).unwrap(),
            handle("alice"),
            [handle("bob")],
        )
        .unwrap();
        hub.groups.create_group(group).await.unwrap();
        let team = GroupId::new("team".to_string()).unwrap();

        // when (操作):
        let result = usecase(&hub)
            .execute(handle("dave"), ChatTarget::Group(team.clone()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(HistoryError::NotMember(team)));
    }

    #[tokio::test]
    async fn test_history_of_missing_group() {
        // テスト項目: 存在しないグループの履歴は GroupNotFound
        // given (前提条件):
        let hub = Hub::new();
        let ghost = GroupId::new("ghost".to_string()).unwrap();

        // when (操作):
        let result = usecase(&hub)
            .execute(handle("alice"), ChatTarget::Group(ghost.clone()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(HistoryError::GroupNotFound(ghost)));
    }
}
