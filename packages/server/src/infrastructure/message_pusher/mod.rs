//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `registry`: 接続中セッションの登録簿と、有界キューを使った送信

pub mod registry;

pub use registry::SessionRegistry;
