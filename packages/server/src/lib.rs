//! Real-time message relay hub.
//!
//! Clients connect over WebSocket under a unique handle and exchange direct and
//! group messages. The hub tracks presence, group membership, per-conversation
//! history and unread counts, all in memory.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
