//! Domain entities: chat messages and groups.

use std::collections::BTreeSet;

use super::{
    ChatTarget, ChatType, ConversationKey, GroupError, GroupId, GroupIncarnation, GroupName,
    Handle, MessageContent, Timestamp,
};

/// 保存済みのチャットメッセージ（追記後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// 送信者（セッションのハンドル名。クライアント申告の値は使わない）
    pub from: Handle,
    /// 宛先（個別チャットの相手 or グループ）
    pub to: ChatTarget,
    /// 本文
    pub content: MessageContent,
    /// サーバー受信時刻
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(from: Handle, to: ChatTarget, content: MessageContent, timestamp: Timestamp) -> Self {
        Self {
            from,
            to,
            content,
            timestamp,
        }
    }

    pub fn chat_type(&self) -> ChatType {
        self.to.chat_type()
    }
}

/// メンバー離脱（remove / leave）の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRemoval {
    /// 離脱したメンバー
    pub removed: Handle,
    /// 管理者が離脱した場合に新たに選ばれた管理者
    pub new_admin: Option<Handle>,
    /// メンバーが 0 人になった（グループは削除される）
    pub emptied: bool,
}

/// グループ
///
/// ## 不変条件
///
/// - 管理者は常にメンバーの 1 人
/// - メンバーが 0 人になったグループは Directory に残らない
/// - 管理者が抜けた場合、残りのメンバーのうち辞書順で最小のハンドル名が管理者になる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    incarnation: GroupIncarnation,
    name: GroupName,
    admin: Handle,
    members: BTreeSet<Handle>,
}

impl Group {
    /// グループを作成する
    ///
    /// `members` が空の場合は作成しない。作成者は常にメンバー兼管理者になる。
    pub fn create(
        name: GroupName,
        creator: Handle,
        members: impl IntoIterator<Item = Handle>,
    ) -> Result<Self, GroupError> {
        let mut member_set: BTreeSet<Handle> = members.into_iter().collect();
        if member_set.is_empty() {
            return Err(GroupError::NoMembers);
        }
        member_set.insert(creator.clone());

        Ok(Self {
            id: GroupId::from(name.clone()),
            incarnation: GroupIncarnation::generate(),
            name,
            admin: creator,
            members: member_set,
        })
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// このグループの履歴と既読位置のキー
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::Group(self.id.clone(), self.incarnation)
    }

    pub fn name(&self) -> &GroupName {
        &self.name
    }

    pub fn admin(&self) -> &Handle {
        &self.admin
    }

    pub fn members(&self) -> &BTreeSet<Handle> {
        &self.members
    }

    pub fn is_member(&self, handle: &Handle) -> bool {
        self.members.contains(handle)
    }

    /// 管理者がメンバーを追加する。新たに加わったメンバーだけを返す
    pub fn add_members(
        &mut self,
        requester: &Handle,
        new_members: impl IntoIterator<Item = Handle>,
    ) -> Result<Vec<Handle>, GroupError> {
        self.ensure_admin(requester)?;

        Ok(new_members
            .into_iter()
            .filter(|member| self.members.insert(member.clone()))
            .collect())
    }

    /// 管理者がメンバーを削除する
    pub fn remove_member(
        &mut self,
        requester: &Handle,
        target: &Handle,
    ) -> Result<MemberRemoval, GroupError> {
        self.ensure_admin(requester)?;
        self.detach(target)
    }

    /// メンバー自身がグループから抜ける（管理者権限は不要）
    pub fn leave(&mut self, member: &Handle) -> Result<MemberRemoval, GroupError> {
        self.detach(member)
    }

    fn ensure_admin(&self, requester: &Handle) -> Result<(), GroupError> {
        if &self.admin != requester {
            return Err(GroupError::NotAdmin {
                group_id: self.id.clone(),
                requester: requester.clone(),
            });
        }
        Ok(())
    }

    fn detach(&mut self, member: &Handle) -> Result<MemberRemoval, GroupError> {
        if !self.members.remove(member) {
            return Err(GroupError::NotMember {
                group_id: self.id.clone(),
                member: member.clone(),
            });
        }

        let mut new_admin = None;
        if &self.admin == member {
            if let Some(successor) = self.members.first() {
                self.admin = successor.clone();
                new_admin = Some(successor.clone());
            }
        }

        Ok(MemberRemoval {
            removed: member.clone(),
            new_admin,
            emptied: self.members.is_empty(),
        })
    }
}
