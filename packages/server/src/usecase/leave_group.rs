//! UseCase: グループからの離脱処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveGroupUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 管理者が抜けたときの引き継ぎ（辞書順で最小のハンドル名）を保証
//! - 最後のメンバーが抜けたグループが削除され、ログと既読位置も消えることを確認
//! - 既に抜けたグループからの離脱が何も変えないことを確認
//! - 削除後の後処理や古いグループ宛ての追記が、同名で作り直されたグループに影響しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：管理者の離脱
//! - エッジケース：最後のメンバーの離脱
//! - エッジケース：メンバーではないハンドルの離脱
//! - エッジケース：削除の後処理より先に同名のグループが作り直される

use std::sync::Arc;

use crate::domain::{
    GroupError, GroupId, GroupMembershipChange, GroupRepository, Handle, LastSeenRepository,
    MessageRepository,
};

use super::{group_departure::GroupDeparture, notifier::Notifier};

/// グループ離脱のユースケース
pub struct LeaveGroupUseCase {
    group_repository: Arc<dyn GroupRepository>,
    departure: GroupDeparture,
}

impl LeaveGroupUseCase {
    /// 新しい LeaveGroupUseCase を作成
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        last_seen_repository: Arc<dyn LastSeenRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            group_repository,
            departure: GroupDeparture::new(message_repository, last_seen_repository, notifier),
        }
    }

    /// グループ離脱を実行（管理者権限は不要）
    pub async fn execute(
        &self,
        group_id: GroupId,
        member: Handle,
    ) -> Result<GroupMembershipChange, GroupError> {
        let change = self.group_repository.leave_group(&group_id, &member).await?;
        tracing::info!("'{}' left group '{}'", member, group_id);

        self.departure
            .settle(&change, format!("{} left group '{}'", member, group_id))
            .await;

        Ok(change)
    }
}
