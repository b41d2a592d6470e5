//! Repository implementations.

pub mod inmemory;

pub use inmemory::{InMemoryGroupRepository, InMemoryLastSeenRepository, InMemoryMessageRepository};
