//! InMemory Group Directory 実装
//!
//! ドメイン層が定義する GroupRepository trait の具体的な実装。
//! Directory 全体を 1 つのロックで保護し、メンバー変更・管理者の引き継ぎ・
//! 空になったグループの削除を 1 回のロック区間で完結させます。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Group, GroupError, GroupId, GroupMembershipChange, GroupRepository, Handle};

/// インメモリ Group Directory
#[derive(Default)]
pub struct InMemoryGroupRepository {
    /// Key: グループ ID, Value: グループ
    groups: RwLock<BTreeMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 離脱系の操作を共通化する。空になったグループはここで削除する
    async fn detach_with<F>(
        &self,
        group_id: &GroupId,
        detach: F,
    ) -> Result<GroupMembershipChange, GroupError>
    where
        F: FnOnce(&mut Group) -> Result<crate::domain::MemberRemoval, GroupError> + Send,
    {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.clone()))?;

        let removal = detach(group)?;
        let conversation_key = group.conversation_key();
        let group = if removal.emptied {
            groups.remove(group_id);
            tracing::info!("Group '{}' deleted as it has no members left", group_id);
            None
        } else {
            Some(group.clone())
        };

        Ok(GroupMembershipChange {
            group_id: group_id.clone(),
            conversation_key,
            removal,
            group,
        })
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create_group(&self, group: Group) -> Result<Group, GroupError> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(group.id()) {
            return Err(GroupError::GroupAlreadyExists(group.id().clone()));
        }
        groups.insert(group.id().clone(), group.clone());
        Ok(group)
    }

    async fn get_group(&self, group_id: &GroupId) -> Option<Group> {
        let groups = self.groups.read().await;
        groups.get(group_id).cloned()
    }

    async fn add_members(
        &self,
        group_id: &GroupId,
        requester: &Handle,
        new_members: Vec<Handle>,
    ) -> Result<(Group, Vec<Handle>), GroupError> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.clone()))?;

        let added = group.add_members(requester, new_members)?;
        Ok((group.clone(), added))
    }

    async fn remove_member(
        &self,
        group_id: &GroupId,
        requester: &Handle,
        target: &Handle,
    ) -> Result<GroupMembershipChange, GroupError> {
        self.detach_with(group_id, |group| group.remove_member(requester, target))
            .await
    }

    async fn leave_group(
        &self,
        group_id: &GroupId,
        member: &Handle,
    ) -> Result<GroupMembershipChange, GroupError> {
        self.detach_with(group_id, |group| group.leave(member)).await
    }

    async fn list_groups_for(&self, member: &Handle) -> Vec<Group> {
        let groups = self.groups.read().await;
        groups
            .values()
            .filter(|group| group.is_member(member))
            .cloned()
            .collect()
    }

    async fn list_groups(&self) -> Vec<Group> {
        let groups = self.groups.read().await;
        groups.values().cloned().collect()
    }
}
