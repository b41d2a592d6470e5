//! InMemory Repository 実装
//!
//! 状態はプロセス内メモリにのみ保持し、起動時は常に空から始まります。

pub mod group;
pub mod last_seen;
pub mod message;

pub use group::InMemoryGroupRepository;
pub use last_seen::InMemoryLastSeenRepository;
pub use message::InMemoryMessageRepository;
