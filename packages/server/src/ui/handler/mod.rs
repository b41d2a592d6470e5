//! Request handlers.

mod dispatcher;
mod http;
mod websocket;

pub use http::{get_groups, get_users, health_check};
pub use websocket::websocket_handler;
