//! Infrastructure layer: in-memory stores, the session registry and wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
