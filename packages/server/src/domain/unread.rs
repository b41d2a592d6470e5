//! Unread-count computation.
//!
//! Pure functions over a conversation log, recomputed on demand.

use super::{ChatMessage, Handle, Timestamp};

/// Count the messages in `messages` that `reader` has not seen yet.
///
/// Messages sent by `reader` never count. Without a watermark every other
/// message is unread; with one, only messages strictly newer than it are.
pub fn count_unread(messages: &[ChatMessage], reader: &Handle, last_seen: Option<Timestamp>) -> usize {
    messages
        .iter()
        .filter(|message| &message.from != reader)
        .filter(|message| match last_seen {
            Some(watermark) => message.timestamp > watermark,
            None => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatTarget, MessageContent};

    fn handle(name: &str) -> Handle {
        Handle::new(name.to_string()).unwrap()
    }

    fn message(from: &str, to: &str, at: i64) -> ChatMessage {
        ChatMessage::new(
            handle(from),
            ChatTarget::Direct(handle(to)),
            MessageContent::new(format!("at {at}")).unwrap(),
            Timestamp::new(at),
        )
    }

    fn log() -> Vec<ChatMessage> {
        vec![
            message("alice", "bob", 100),
            message("bob", "alice", 200),
            message("alice", "bob", 300),
            message("alice", "bob", 400),
        ]
    }

    #[test]
    fn test_without_watermark_counts_everything_not_sent_by_reader() {
        // テスト項目: 既読位置がない場合、自分以外が送った全メッセージが未読になる
        // given (前提条件):
        let messages = log();

        // when (操作):
        let count = count_unread(&messages, &handle("bob"), None);

        // then (期待する結果):
        assert_eq!(count, 3);
    }

    #[test]
    fn test_with_watermark_counts_strictly_newer_messages() {
        // テスト項目: 既読位置と同時刻のメッセージは未読に含まれない
        // given (前提条件):
        let messages = log();

        // when (操作):
        let count = count_unread(&messages, &handle("bob"), Some(Timestamp::new(300)));

        // then (期待する結果):
        assert_eq!(count, 1);
    }

    #[test]
    fn test_watermark_after_last_message_resets_to_zero() {
        // テスト項目: 最新メッセージ以降の既読位置では未読数が 0 になる
        // given (前提条件):
        let messages = log();

        // when (操作):
        let count = count_unread(&messages, &handle("bob"), Some(Timestamp::new(400)));

        // then (期待する結果):
        assert_eq!(count, 0);
    }

    #[test]
    fn test_empty_log_has_no_unread() {
        // テスト項目: メッセージがない会話の未読数は 0
        // given (前提条件):
        let messages: Vec<ChatMessage> = Vec::new();

        // when (操作):
        let count = count_unread(&messages, &handle("bob"), None);

        // then (期待する結果):
        assert_eq!(count, 0);
    }
}
