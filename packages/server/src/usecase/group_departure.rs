//! グループからの離脱（remove / leave）の後処理
//!
//! - 残ったメンバーへの通知（管理者が引き継がれた場合はその通知も）
//! - グループが削除された場合は、その世代のログと既読位置を破棄する
//! - group_list の配り直し

use std::sync::Arc;

use crate::domain::{GroupMembershipChange, LastSeenRepository, MessageRepository};

use super::notifier::Notifier;

pub(super) struct GroupDeparture {
    message_repository: Arc<dyn MessageRepository>,
    last_seen_repository: Arc<dyn LastSeenRepository>,
    notifier: Arc<Notifier>,
}

impl GroupDeparture {
    pub(super) fn new(
        message_repository: Arc<dyn MessageRepository>,
        last_seen_repository: Arc<dyn LastSeenRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            message_repository,
            last_seen_repository,
            notifier,
        }
    }

    pub(super) async fn settle(&self, change: &GroupMembershipChange, announcement: String) {
        match &change.group {
            Some(group) => {
                self.notifier
                    .notify_members(group.members().iter().cloned(), announcement)
                    .await;
                if let Some(new_admin) = &change.removal.new_admin {
                    tracing::info!("'{}' is now the admin of group '{}'", new_admin, group.id());
                    self.notifier
                        .notify_members(
                            group.members().iter().cloned(),
                            format!(
                                "{} is now the admin of group '{}'",
                                new_admin,
                                group.name().as_str()
                            ),
                        )
                        .await;
                }
            }
            None => {
                // 削除された世代のキーだけを破棄する。同名で作り直されたグループのキーとは一致しない
                self.message_repository
                    .purge(&change.conversation_key)
                    .await;
                self.last_seen_repository
                    .forget_conversation(&change.conversation_key)
                    .await;
            }
        }

        self.notifier.push_group_lists().await;
    }
}
