//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! Also translates room message events into the router's `InboundMessage`, carrying the thread
//! root event ID as the correlation token.

use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::{EventId, RoomId, UserId};
use matrix_sdk::ruma::events::relation::Thread;
use matrix_sdk::ruma::events::room::message::{
    MessageType, OriginalSyncRoomMessageEvent, Relation, RoomMessageEventContent,
};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::router::InboundMessage;
use crate::domain::traits::ChatProvider;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn post(&self, message: &str, thread_id: &str) -> Result<(), String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), message);
        let mut content = RoomMessageEventContent::text_markdown(message);

        if !thread_id.is_empty() {
            match EventId::parse(thread_id) {
                Ok(root) => {
                    content.relates_to = Some(Relation::Thread(Thread::plain(root.clone(), root)));
                }
                Err(e) => {
                    tracing::warn!("Invalid thread id '{}', posting to the room: {}", thread_id, e);
                }
            }
        }

        self.room
            .send(content)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Whether an event seen in `room_id` is worth routing.
///
/// Rejects other rooms, backlog from before `start_time` and the bot's own messages.
pub fn should_route(
    event: &OriginalSyncRoomMessageEvent,
    room_id: &RoomId,
    listen_room: &RoomId,
    own_user: &UserId,
    start_time: SystemTime,
) -> bool {
    if room_id != listen_room {
        return false;
    }
    let sent_at = UNIX_EPOCH + Duration::from_millis(u64::from(event.origin_server_ts.get()));
    if sent_at < start_time {
        return false;
    }
    event.sender != own_user
}

/// Text messages only. Edits, notices and media are not commands.
pub fn inbound_message(event: &OriginalSyncRoomMessageEvent) -> Option<InboundMessage> {
    let MessageType::Text(text) = &event.content.msgtype else {
        return None;
    };
    if matches!(event.content.relates_to, Some(Relation::Replacement(_))) {
        return None;
    }
    let thread_id = match &event.content.relates_to {
        Some(Relation::Thread(thread)) => thread.event_id.to_string(),
        _ => String::new(),
    };
    Some(InboundMessage::new(text.body.clone(), thread_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(content: serde_json::Value) -> OriginalSyncRoomMessageEvent {
        serde_json::from_value(json!({
            "type": "m.room.message",
            "event_id": "$msg:example.org",
            "sender": "@alice:example.org",
            "origin_server_ts": 1_700_000_000_000u64,
            "content": content,
        }))
        .unwrap()
    }

    fn text_event() -> OriginalSyncRoomMessageEvent {
        event(json!({ "msgtype": "m.text", "body": "@mtflow start pr" }))
    }

    fn sent_at() -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(1_700_000_000_000)
    }

    #[test]
    fn test_routes_fresh_messages_from_others() {
        let room = RoomId::parse("!flow:example.org").unwrap();
        let bot = UserId::parse("@mtflow:example.org").unwrap();
        let before = sent_at() - Duration::from_secs(60);
        assert!(should_route(&text_event(), &room, &room, &bot, before));
        assert!(should_route(&text_event(), &room, &room, &bot, sent_at()));
    }

    #[test]
    fn test_other_rooms_are_not_routed() {
        let room = RoomId::parse("!flow:example.org").unwrap();
        let other = RoomId::parse("!lobby:example.org").unwrap();
        let bot = UserId::parse("@mtflow:example.org").unwrap();
        let before = sent_at() - Duration::from_secs(60);
        assert!(!should_route(&text_event(), &other, &room, &bot, before));
    }

    #[test]
    fn test_backlog_is_not_routed() {
        let room = RoomId::parse("!flow:example.org").unwrap();
        let bot = UserId::parse("@mtflow:example.org").unwrap();
        let after = sent_at() + Duration::from_millis(1);
        assert!(!should_route(&text_event(), &room, &room, &bot, after));
    }

    #[test]
    fn test_own_messages_are_not_routed() {
        let room = RoomId::parse("!flow:example.org").unwrap();
        let alice = UserId::parse("@alice:example.org").unwrap();
        let before = sent_at() - Duration::from_secs(60);
        assert!(!should_route(&text_event(), &room, &room, &alice, before));
    }

    #[test]
    fn test_plain_text_has_no_thread() {
        let msg = inbound_message(&event(json!({
            "msgtype": "m.text",
            "body": "@mtflow start pr",
        })))
        .unwrap();
        assert_eq!(msg, InboundMessage::new("@mtflow start pr", ""));
    }

    #[test]
    fn test_thread_root_is_the_correlation_token() {
        let msg = inbound_message(&event(json!({
            "msgtype": "m.text",
            "body": "@mtflow fortune",
            "m.relates_to": {
                "rel_type": "m.thread",
                "event_id": "$root:example.org",
                "is_falling_back": true,
                "m.in_reply_to": { "event_id": "$root:example.org" },
            },
        })))
        .unwrap();
        assert_eq!(msg.thread_id, "$root:example.org");
    }

    #[test]
    fn test_non_text_messages_are_skipped() {
        let notice = event(json!({
            "msgtype": "m.notice",
            "body": "@mtflow start pr",
        }));
        assert!(inbound_message(&notice).is_none());
    }
}
