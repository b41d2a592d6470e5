//! UseCase: グループ作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateGroupUseCase::execute() メソッド
//! - Directory への登録と、メンバーへの通知・group_list の配り直し
//!
//! ### なぜこのテストが必要か
//! - 作成者が管理者兼メンバーになることを保証
//! - group_list が受信者ごとにフィルタされ、非メンバーにグループが漏れないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーを指定したグループ作成
//! - 異常系：メンバーが空、生存中のグループと名前が重複

use std::sync::Arc;

use crate::domain::{Group, GroupError, GroupName, GroupRepository, Handle};

use super::notifier::Notifier;

/// グループ作成のユースケース
pub struct CreateGroupUseCase {
    group_repository: Arc<dyn GroupRepository>,
    notifier: Arc<Notifier>,
}

impl CreateGroupUseCase {
    /// 新しい CreateGroupUseCase を作成
    pub fn new(group_repository: Arc<dyn GroupRepository>, notifier: Arc<Notifier>) -> Self {
        Self {
            group_repository,
            notifier,
        }
    }

    /// グループ作成を実行
    ///
    /// # Arguments
    ///
    /// * `creator` - 作成者（管理者になる）
    /// * `name` - グループ名（そのままグループ ID になる）
    /// * `members` - 作成者以外に加えるメンバー（空ならエラー）
    pub async fn execute(
        &self,
        creator: Handle,
        name: GroupName,
        members: Vec<Handle>,
    ) -> Result<Group, GroupError> {
        // 1. Domain Model の生成（members = {creator} ∪ members）
        let group = Group::create(name, creator.clone(), members)?;

        // 2. Directory に登録（同名の生存中グループは上書きしない）
        let group = self.group_repository.create_group(group).await?;
        tracing::info!(
            "Group '{}' created by '{}' with {} members",
            group.id(),
            creator,
            group.members().len()
        );

        // 3. メンバーへの通知と group_list の配り直し
        self.notifier
            .notify_members(
                group.members().iter().cloned(),
                format!("Group '{}' was created by {}", group.name().as_str(), creator),
            )
            .await;
        self.notifier.push_group_lists().await;

        Ok(group)
    }
}
