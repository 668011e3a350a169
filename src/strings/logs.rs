use crate::domain::command::{CommandTarget, CommandType};

pub fn config_loaded(user: &str, room: &str) -> String {
    format!("Loaded configuration for user: {user} (room {room})")
}

pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";
pub const STARTING: &str = "Starting mtflow...";
pub const LOGIN_SUCCESS: &str = "Logged in successfully!";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub fn room_not_joined(room: &str) -> String {
    format!("The bot has not joined room {room}; invite it first")
}

pub fn listening(room: &str, mention: &str) -> String {
    format!("Listening on {room} for messages mentioning @{mention}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}

pub fn greeting_fail(err: &str) -> String {
    format!("Failed to greet the room: {err}")
}

pub fn route_fail(err: &str) -> String {
    format!("Failed to route message: {err}")
}

pub fn message_received(sender: &str, body: &str) -> String {
    format!("Received message from {sender}: \n{body}")
}

pub fn message_dropped(reason: &str) -> String {
    format!("Dropping message: {reason}")
}

pub fn unrecognized_command(body: &str) -> String {
    format!("Unrecognized command: {body}")
}

pub const COMMAND_QUEUE_CLOSED: &str = "Command queue is closed";
pub const RESULT_QUEUE_CLOSED: &str = "Result queue is closed";

pub fn dispatcher_started(timeout_secs: u64) -> String {
    format!("Dispatcher running with a {timeout_secs}s ceiling per command")
}

pub const DISPATCHER_STOPPED: &str = "Command queue closed, dispatcher stopped";

pub fn command_received(kind: &CommandType, target: &CommandTarget, thread_id: &str) -> String {
    format!("Dispatching '{kind} {target}' (thread '{thread_id}')")
}

pub fn command_timed_out(thread_id: &str, timeout_secs: u64) -> String {
    format!("Command in thread '{thread_id}' exceeded {timeout_secs}s, abandoning it")
}

pub fn execution_panicked(thread_id: &str, reason: &str) -> String {
    format!("Command in thread '{thread_id}' panicked: {reason}")
}

pub fn late_result_discarded(thread_id: &str, outcome: &str) -> String {
    format!("Discarding late result for thread '{thread_id}': {outcome}")
}

pub fn result_queue_closed(thread_id: &str) -> String {
    format!("{RESULT_QUEUE_CLOSED}, dropping result for thread '{thread_id}'")
}

pub fn post_failed(room: &str, thread_id: &str, err: &str) -> String {
    format!("Failed to post result to {room} (thread '{thread_id}'): {err}")
}

pub const OUTBOX_CLOSED: &str = "Result queue closed, outbox stopped";

pub const STARTING_PR_SERVICE: &str = "I will start processing of pull requests";
pub const STOPPING_PR_SERVICE: &str = "I will handle 'stop pr' command";
pub const REPORTING_SELF_STATUS: &str = "I will handle 'status mtflow' command";

pub fn index_unavailable(err: &str) -> String {
    format!("Search index unavailable: {err}")
}
