//! セッション登録簿を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ハンドル名 → `ConnectionSession` の管理（1 ハンドルにつき生存セッションは高々 1 つ）
//! - クライアントへのメッセージ送信（push_to, broadcast）
//! - 応答しないクライアントの追い出し
//!
//! ## 設計ノート
//!
//! 送信はセッションの有界キューに `try_send` で積むだけで、ブロックしません。
//! キューが満杯、または閉じている場合、そのセッションは登録簿から外して close します。
//! 送信前に必ず宛先をスナップショットし、ロックを解放してからキューに積みます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{
        ConnectionSession, Handle, MessagePushError, MessagePusher, OutboundMessage, SessionId,
    },
    infrastructure::dto::conversion::encode_outbound,
};

/// 接続中セッションの登録簿
#[derive(Default)]
pub struct SessionRegistry {
    /// Key: ハンドル名, Value: 生存中のセッション
    sessions: RwLock<HashMap<Handle, ConnectionSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 応答しないセッションを追い出す
    ///
    /// 既に別のセッションに置き換わっている場合は何もしない。
    async fn evict(&self, session: &ConnectionSession, reason: &MessagePushError) {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let is_current = sessions
                .get(session.handle())
                .is_some_and(|current| current.id() == session.id());
            if is_current {
                sessions.remove(session.handle())
            } else {
                None
            }
        };

        if removed.is_some() {
            tracing::warn!(
                "Evicting client '{}' (session {}): {}",
                session.handle(),
                session.id(),
                reason
            );
        }
        session.close();
    }

    fn encode(message: &OutboundMessage) -> Result<String, MessagePushError> {
        encode_outbound(message).map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for SessionRegistry {
    async fn register_client(&self, session: ConnectionSession) -> Option<ConnectionSession> {
        let handle = session.handle().clone();
        let replaced = {
            let mut sessions = self.sessions.write().await;
            let replaced = sessions.insert(handle.clone(), session);
            if let Some(old) = &replaced {
                old.close();
            }
            replaced
        };

        match &replaced {
            Some(old) => tracing::info!(
                "Client '{}' reconnected; closed previous session {}",
                handle,
                old.id()
            ),
            None => tracing::debug!("Client '{}' registered to SessionRegistry", handle),
        }
        replaced
    }

    async fn unregister_client(&self, handle: &Handle, session_id: SessionId) -> bool {
        let mut sessions = self.sessions.write().await;
        let is_current = sessions
            .get(handle)
            .is_some_and(|current| current.id() == session_id);
        if is_current {
            sessions.remove(handle);
            tracing::debug!("Client '{}' unregistered from SessionRegistry", handle);
        }
        is_current
    }

    async fn lookup(&self, handle: &Handle) -> Option<ConnectionSession> {
        let sessions = self.sessions.read().await;
        sessions.get(handle).cloned()
    }

    async fn connected_handles(&self) -> Vec<Handle> {
        let sessions = self.sessions.read().await;
        let mut handles: Vec<Handle> = sessions.keys().cloned().collect();
        handles.sort();
        handles
    }

    async fn push_to(
        &self,
        handle: &Handle,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let session = self
            .lookup(handle)
            .await
            .ok_or_else(|| MessagePushError::ClientNotFound(handle.to_string()))?;
        let frame = Self::encode(message)?;

        if let Err(e) = session.try_push(frame) {
            self.evict(&session, &e).await;
            return Err(e);
        }
        tracing::debug!("Pushed message to client '{}'", handle);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<Handle>,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(message)?;

        let recipients: Vec<ConnectionSession> = {
            let sessions = self.sessions.read().await;
            targets
                .iter()
                .filter_map(|target| {
                    let session = sessions.get(target).cloned();
                    if session.is_none() {
                        tracing::debug!("Client '{}' not online during broadcast, skipping", target);
                    }
                    session
                })
                .collect()
        };

        // ブロードキャストでは一部の送信失敗を許容
        for session in recipients {
            if let Err(e) = session.try_push(frame.clone()) {
                self.evict(&session, &e).await;
            }
        }
        Ok(())
    }
}
