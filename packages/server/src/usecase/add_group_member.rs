//! UseCase: グループへのメンバー追加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AddGroupMemberUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 管理者以外の追加が拒否され、Directory が変化しないことを保証
//! - 追加されたメンバー本人とグループへの通知を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：管理者によるメンバー追加
//! - 異常系：管理者以外による追加、存在しないグループ

use std::sync::Arc;

use crate::domain::{GroupError, GroupId, GroupRepository, Handle};

use super::notifier::Notifier;

/// メンバー追加のユースケース
pub struct AddGroupMemberUseCase {
    group_repository: Arc<dyn GroupRepository>,
    notifier: Arc<Notifier>,
}

impl AddGroupMemberUseCase {
    /// 新しい AddGroupMemberUseCase を作成
    pub fn new(group_repository: Arc<dyn GroupRepository>, notifier: Arc<Notifier>) -> Self {
        Self {
            group_repository,
            notifier,
        }
    }

    /// メンバー追加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Handle>)` - 新たに加わったメンバー（既にメンバーだったハンドルは含まない）
    /// * `Err(GroupError)` - グループが存在しない、または要求者が管理者ではない
    pub async fn execute(
        &self,
        group_id: GroupId,
        requester: Handle,
        new_members: Vec<Handle>,
    ) -> Result<Vec<Handle>, GroupError> {
        // 1. Directory を更新（管理者チェックはロック内で行われる）
        let (group, added) = self
            .group_repository
            .add_members(&group_id, &requester, new_members)
            .await?;

        if added.is_empty() {
            tracing::debug!("No new members added to group '{}'", group_id);
            return Ok(added);
        }
        tracing::info!(
            "'{}' added {} member(s) to group '{}'",
            requester,
            added.len(),
            group_id
        );

        // 2. 追加されたメンバー本人への通知
        for member in &added {
            self.notifier
                .notify(
                    member,
                    format!(
                        "You were added to group '{}' by {}",
                        group.name().as_str(),
                        requester
                    ),
                )
                .await;
        }

        // 3. 既存メンバーへの通知
        let names: Vec<&str> = added.iter().map(|member| member.as_str()).collect();
        let existing = group
            .members()
            .iter()
            .filter(|member| !added.contains(member))
            .cloned();
        self.notifier
            .notify_members(
                existing,
                format!(
                    "{} joined group '{}'",
                    names.join(", "),
                    group.name().as_str()
                ),
            )
            .await;

        // 4. group_list の配り直し
        self.notifier.push_group_lists().await;

        Ok(added)
    }
}
