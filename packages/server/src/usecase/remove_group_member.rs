//! UseCase: 管理者によるメンバー削除処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RemoveGroupMemberUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 管理者以外の削除が拒否されることを保証
//! - 削除されたメンバーの group_list からグループが消えることを確認
//! - 管理者が自分を削除した場合に管理者が引き継がれることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：管理者によるメンバー削除
//! - 異常系：管理者以外による削除
//! - エッジケース：管理者が自分自身を削除

use std::sync::Arc;

use crate::domain::{
    GroupError, GroupId, GroupMembershipChange, GroupRepository, Handle, LastSeenRepository,
    MessageRepository,
};

use super::{group_departure::GroupDeparture, notifier::Notifier};

/// メンバー削除のユースケース
pub struct RemoveGroupMemberUseCase {
    group_repository: Arc<dyn GroupRepository>,
    notifier: Arc<Notifier>,
    departure: GroupDeparture,
}

impl RemoveGroupMemberUseCase {
    /// 新しい RemoveGroupMemberUseCase を作成
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        last_seen_repository: Arc<dyn LastSeenRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            group_repository,
            departure: GroupDeparture::new(
                message_repository,
                last_seen_repository,
                notifier.clone(),
            ),
            notifier,
        }
    }

    /// メンバー削除を実行
    pub async fn execute(
        &self,
        group_id: GroupId,
        requester: Handle,
        target: Handle,
    ) -> Result<GroupMembershipChange, GroupError> {
        // 1. Directory を更新（管理者チェック・引き継ぎ・削除はロック内で完結）
        let change = self
            .group_repository
            .remove_member(&group_id, &requester, &target)
            .await?;
        tracing::info!("'{}' removed '{}' from group '{}'", requester, target, group_id);

        // 2. 削除された本人への通知
        self.notifier
            .notify(
                &target,
                format!("You were removed from group '{}' by {}", group_id, requester),
            )
            .await;

        // 3. 残ったメンバーへの通知と後処理
        self.departure
            .settle(
                &change,
                format!("{} was removed from group '{}'", target, group_id),
            )
            .await;

        Ok(change)
    }
}
