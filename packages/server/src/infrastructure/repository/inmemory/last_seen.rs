//! InMemory LastSeen Tracker 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConversationKey, Handle, LastSeenRepository, Timestamp};

/// インメモリ LastSeen Tracker
///
/// Key: (ユーザー, 会話), Value: 既読位置
#[derive(Default)]
pub struct InMemoryLastSeenRepository {
    entries: RwLock<HashMap<(Handle, ConversationKey), Timestamp>>,
}

impl InMemoryLastSeenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LastSeenRepository for InMemoryLastSeenRepository {
    async fn mark_seen(&self, handle: Handle, key: ConversationKey, at: Timestamp) {
        tracing::debug!(
            "Updated last seen for '{}' in conversation {} to {}",
            handle,
            key,
            at.to_rfc3339()
        );
        let mut entries = self.entries.write().await;
        entries.insert((handle, key), at);
    }

    async fn last_seen(&self, handle: &Handle, key: &ConversationKey) -> Option<Timestamp> {
        let entries = self.entries.read().await;
        entries.get(&(handle.clone(), key.clone())).copied()
    }

    async fn forget_conversation(&self, key: &ConversationKey) {
        let mut entries = self.entries.write().await;
        entries.retain(|(_, seen), _| seen != key);
    }
}
