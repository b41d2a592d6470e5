//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各 Repository は自分のデータ構造の唯一の変更者であり、
//! ロックの内側で完結するアトミックな操作だけを公開します。
//! 内部のマップへの参照を外に渡すことはありません。

use async_trait::async_trait;

use super::{
    ChatMessage, ConversationKey, Group, GroupError, GroupId, Handle, MemberRemoval, Timestamp,
};

/// メンバー離脱後のグループの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembershipChange {
    pub group_id: GroupId,
    /// 離脱が起きた世代のグループの会話キー
    pub conversation_key: ConversationKey,
    pub removal: MemberRemoval,
    /// 離脱後のグループ（メンバーが 0 人になり削除された場合は `None`）
    pub group: Option<Group>,
}

/// Group Directory
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// グループを登録する（同じ ID の生存中グループがあれば上書きせずにエラー）
    async fn create_group(&self, group: Group) -> Result<Group, GroupError>;

    /// グループを取得
    async fn get_group(&self, group_id: &GroupId) -> Option<Group>;

    /// 管理者によるメンバー追加。更新後のグループと新規メンバーを返す
    async fn add_members(
        &self,
        group_id: &GroupId,
        requester: &Handle,
        new_members: Vec<Handle>,
    ) -> Result<(Group, Vec<Handle>), GroupError>;

    /// 管理者によるメンバー削除
    async fn remove_member(
        &self,
        group_id: &GroupId,
        requester: &Handle,
        target: &Handle,
    ) -> Result<GroupMembershipChange, GroupError>;

    /// メンバー自身の離脱
    async fn leave_group(
        &self,
        group_id: &GroupId,
        member: &Handle,
    ) -> Result<GroupMembershipChange, GroupError>;

    /// `member` が所属するグループの一覧（ID 順）
    async fn list_groups_for(&self, member: &Handle) -> Vec<Group>;

    /// 全グループの一覧（ID 順）
    async fn list_groups(&self) -> Vec<Group>;
}

/// Message Store（会話ごとの追記専用ログ）
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを追記し、保存されたメッセージを返す
    ///
    /// タイムスタンプはログの直前のメッセージより前にならないよう丸められる。
    async fn append(&self, key: ConversationKey, message: ChatMessage) -> ChatMessage;

    /// 会話のスナップショットを到着順で返す
    async fn history(&self, key: &ConversationKey) -> Vec<ChatMessage>;

    /// 会話の未読数を数える
    async fn count_unread(
        &self,
        key: &ConversationKey,
        reader: &Handle,
        last_seen: Option<Timestamp>,
    ) -> usize;

    /// 会話のメッセージ数
    async fn count_messages(&self, key: &ConversationKey) -> usize;

    /// `handle` と個別チャットのログを持つ相手の一覧
    async fn direct_partners(&self, handle: &Handle) -> Vec<Handle>;

    /// 会話のログを破棄する
    async fn purge(&self, key: &ConversationKey);
}

/// LastSeen Tracker
#[async_trait]
pub trait LastSeenRepository: Send + Sync {
    /// 既読位置を記録する
    async fn mark_seen(&self, handle: Handle, key: ConversationKey, at: Timestamp);

    /// 既読位置を取得
    async fn last_seen(&self, handle: &Handle, key: &ConversationKey) -> Option<Timestamp>;

    /// 指定した会話を指す既読位置を全ユーザー分削除する
    async fn forget_conversation(&self, key: &ConversationKey);
}
