//! UseCase: ハブの状態取得（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Group, GroupRepository, Handle, MessagePusher, MessageRepository};

/// グループとそのログのメッセージ数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: Group,
    pub message_count: usize,
}

/// ハブの状態取得のユースケース
pub struct GetHubStateUseCase {
    group_repository: Arc<dyn GroupRepository>,
    message_repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetHubStateUseCase {
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            group_repository,
            message_repository,
            message_pusher,
        }
    }

    /// 接続中のハンドル名（ソート済み）
    pub async fn online_users(&self) -> Vec<Handle> {
        self.message_pusher.connected_handles().await
    }

    /// 全グループとメッセージ数（ID 順）
    pub async fn groups(&self) -> Vec<GroupSummary> {
        let mut summaries = Vec::new();
        for group in self.group_repository.list_groups().await {
            let message_count = self
                .message_repository
                .count_messages(&group.conversation_key())
                .await;
            summaries.push(GroupSummary {
                group,
                message_count,
            });
        }
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, ChatTarget, GroupName, MessageContent, Timestamp};
    use crate::usecase::notifier::test_support::*;

    #[tokio::test]
    async fn test_groups_include_message_count() {
        // テスト項目: グループ一覧にログのメッセージ数が含まれる
        // given (前提条件):
        let hub = Hub::new();
        let group = Group::create(
            GroupName::new("team".to_string()).unwrap(),
            handle("alice"),
            [handle("bob")],
        )
        .unwrap();
        let group = hub.groups.create_group(group).await.unwrap();
        hub.messages
            .append(
                group.conversation_key(),
                ChatMessage::new(
                    handle("alice"),
                    ChatTarget::Group(group.id().clone()),
                    MessageContent::new("hi".to_string()).unwrap(),
                    Timestamp::new(T0),
                ),
            )
            .await;
        let _alice = hub.connect("alice").await;
        let usecase = GetHubStateUseCase::new(
            hub.groups.clone(),
            hub.messages.clone(),
            hub.registry.clone(),
        );

        // when (操作):
        let summaries = usecase.groups().await;
        let users = usecase.online_users().await;

        // then (期待する結果):
        assert_eq!(
            summaries,
            vec![GroupSummary {
                group,
                message_count: 1
            }]
        );
        assert_eq!(users, vec![handle("alice")]);
    }
}
