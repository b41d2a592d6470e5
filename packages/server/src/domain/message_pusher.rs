//! MessagePusher trait 定義
//!
//! 接続中セッションの登録簿（Connection Registry）と、
//! そこを経由したクライアントへのメッセージ送信を抽象化します。
//!
//! ## ロック規律
//!
//! 実装はロックを保持したまま送信しないこと。
//! 宛先セッションをロック内でスナップショットし、解放してからキューに積みます。

use async_trait::async_trait;

use super::{ConnectionSession, Handle, MessagePushError, OutboundMessage, SessionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// セッションを登録する
    ///
    /// 同じハンドル名の既存セッションがあれば close してから置き換え、置き換えたセッションを返す。
    async fn register_client(&self, session: ConnectionSession) -> Option<ConnectionSession>;

    /// セッションを登録解除する（冪等）
    ///
    /// `session_id` が現在登録されているセッションと一致する場合だけ削除し、削除したかを返す。
    /// 再接続で置き換えられた古いセッションが新しいセッションを消さないようにするため。
    async fn unregister_client(&self, handle: &Handle, session_id: SessionId) -> bool;

    /// ハンドル名からセッションを引く
    async fn lookup(&self, handle: &Handle) -> Option<ConnectionSession>;

    /// 接続中の全ハンドル名（ソート済みのコピー）
    async fn connected_handles(&self) -> Vec<Handle>;

    /// 特定のクライアントに送信
    async fn push_to(
        &self,
        handle: &Handle,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信（一部の送信失敗は許容する）
    async fn broadcast(
        &self,
        targets: Vec<Handle>,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;
}
