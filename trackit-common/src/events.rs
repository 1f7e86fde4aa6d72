//! Relay wire contract
//!
//! Every WebSocket text frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Event names and payload field names are part of the contract with the
//! dashboard and must not change.
//!
//! Payload fields the relay does not route on are carried through as opaque
//! JSON values. Only the room-targeting keys (`classId`, `sessionId`) are
//! interpreted, and they may arrive as strings or numbers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Event names, client→server and server→room
pub mod names {
    pub const CONNECTED: &str = "connected";
    pub const JOIN_CLASS: &str = "join-class";
    pub const LEAVE_CLASS: &str = "leave-class";
    pub const JOIN_SESSION: &str = "join-session";
    pub const LEAVE_SESSION: &str = "leave-session";
    pub const ATTENDANCE_UPDATE: &str = "attendance-update";
    pub const ATTENDANCE_UPDATED: &str = "attendance-updated";
    pub const CLASS_ATTENDANCE_UPDATED: &str = "class-attendance-updated";
    pub const SESSION_UPDATE: &str = "session-update";
    pub const SESSION_UPDATED: &str = "session-updated";
    pub const CLASS_SESSION_UPDATED: &str = "class-session-updated";
    pub const AI_RECOGNITION_START: &str = "ai-recognition-start";
    pub const AI_RECOGNITION_STARTED: &str = "ai-recognition-started";
    pub const AI_RECOGNITION_COMPLETE: &str = "ai-recognition-complete";
    pub const AI_RECOGNITION_COMPLETED: &str = "ai-recognition-completed";
    pub const ANALYTICS_UPDATE: &str = "analytics-update";
    pub const ANALYTICS_UPDATED: &str = "analytics-updated";
    pub const MESSAGE: &str = "message";
}

/// One relay frame as it travels over the socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Build a frame from any serializable payload
    pub fn new(event: impl Into<String>, data: &impl Serialize) -> serde_json::Result<Self> {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Encode for a text frame
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a text frame
    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Room name for a class
pub fn class_room(class_id: &str) -> String {
    format!("class-{class_id}")
}

/// Room name for an attendance session
pub fn session_room(session_id: &str) -> String {
    format!("session-{session_id}")
}

/// Class id derived from a session id by taking the segment before the first `-`
///
/// This is a naming convention, not a lookup: a session id that does not
/// start with its class id routes to an unrelated class room.
pub fn derived_class_id(session_id: &str) -> &str {
    session_id
        .split_once('-')
        .map_or(session_id, |(head, _)| head)
}

/// Normalize a room-targeting key: non-empty strings and numbers are accepted
pub fn room_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Why an inbound frame was not turned into a [`ClientEvent`]
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("unknown event: {0}")]
    Unknown(String),

    #[error("{event}: missing room key {field}")]
    MissingRoomKey {
        event: &'static str,
        field: &'static str,
    },

    #[error("{0}: payload must be a JSON object")]
    NotAnObject(&'static str),
}

/// attendance-update as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceUpdate {
    pub class_id: Option<String>,
    pub session_id: Option<String>,
    pub student_id: Value,
    pub status: Value,
    /// Full payload as received
    pub raw: Map<String, Value>,
}

/// session-update as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub session_id: String,
    pub raw_session_id: Value,
    pub present_count: Value,
    pub total_count: Value,
    pub is_active: Value,
}

/// ai-recognition-start as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct AiRecognitionStart {
    pub session_id: String,
    pub raw_session_id: Value,
    pub student_id: Option<Value>,
}

/// ai-recognition-complete as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct AiRecognitionComplete {
    pub session_id: String,
    pub raw_session_id: Value,
    pub student_id: Value,
    pub success: Value,
    pub confidence: Option<Value>,
}

/// analytics-update as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsUpdate {
    pub class_id: String,
    pub stats: Value,
}

/// message as sent by a client
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub sender_id: Value,
}

/// Typed client→server event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinClass(String),
    LeaveClass(String),
    JoinSession(String),
    LeaveSession(String),
    AttendanceUpdate(AttendanceUpdate),
    SessionUpdate(SessionUpdate),
    AiRecognitionStart(AiRecognitionStart),
    AiRecognitionComplete(AiRecognitionComplete),
    AnalyticsUpdate(AnalyticsUpdate),
    Message(ChatMessage),
}

impl ClientEvent {
    /// Interpret an inbound frame
    ///
    /// Only the presence of the room-targeting key is checked; every other
    /// field is carried through as-is (missing fields become `null`).
    pub fn parse(event: &str, data: Value) -> Result<Self, EventError> {
        use names::*;

        match event {
            JOIN_CLASS => join_key(JOIN_CLASS, "classId", &data).map(Self::JoinClass),
            LEAVE_CLASS => join_key(LEAVE_CLASS, "classId", &data).map(Self::LeaveClass),
            JOIN_SESSION => join_key(JOIN_SESSION, "sessionId", &data).map(Self::JoinSession),
            LEAVE_SESSION => {
                join_key(LEAVE_SESSION, "sessionId", &data).map(Self::LeaveSession)
            }
            ATTENDANCE_UPDATE => {
                let map = into_object(ATTENDANCE_UPDATE, data)?;
                let class_id = map.get("classId").and_then(room_key);
                let session_id = map.get("sessionId").and_then(room_key);
                if class_id.is_none() && session_id.is_none() {
                    return Err(EventError::MissingRoomKey {
                        event: ATTENDANCE_UPDATE,
                        field: "classId or sessionId",
                    });
                }
                Ok(Self::AttendanceUpdate(AttendanceUpdate {
                    class_id,
                    session_id,
                    student_id: field(&map, "studentId"),
                    status: field(&map, "status"),
                    raw: map,
                }))
            }
            SESSION_UPDATE => {
                let map = into_object(SESSION_UPDATE, data)?;
                let session_id = required_key(SESSION_UPDATE, "sessionId", &map)?;
                Ok(Self::SessionUpdate(SessionUpdate {
                    session_id,
                    raw_session_id: field(&map, "sessionId"),
                    present_count: field(&map, "presentCount"),
                    total_count: field(&map, "totalCount"),
                    is_active: field(&map, "isActive"),
                }))
            }
            AI_RECOGNITION_START => {
                let map = into_object(AI_RECOGNITION_START, data)?;
                let session_id = required_key(AI_RECOGNITION_START, "sessionId", &map)?;
                Ok(Self::AiRecognitionStart(AiRecognitionStart {
                    session_id,
                    raw_session_id: field(&map, "sessionId"),
                    student_id: map.get("studentId").cloned(),
                }))
            }
            AI_RECOGNITION_COMPLETE => {
                let map = into_object(AI_RECOGNITION_COMPLETE, data)?;
                let session_id = required_key(AI_RECOGNITION_COMPLETE, "sessionId", &map)?;
                Ok(Self::AiRecognitionComplete(AiRecognitionComplete {
                    session_id,
                    raw_session_id: field(&map, "sessionId"),
                    student_id: field(&map, "studentId"),
                    success: field(&map, "success"),
                    confidence: map.get("confidence").filter(|v| !v.is_null()).cloned(),
                }))
            }
            ANALYTICS_UPDATE => {
                let map = into_object(ANALYTICS_UPDATE, data)?;
                let class_id = required_key(ANALYTICS_UPDATE, "classId", &map)?;
                Ok(Self::AnalyticsUpdate(AnalyticsUpdate {
                    class_id,
                    stats: field(&map, "stats"),
                }))
            }
            MESSAGE => {
                let map = into_object(MESSAGE, data)?;
                let text = match map.get("text") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) if !other.is_null() => other.to_string(),
                    _ => String::new(),
                };
                Ok(Self::Message(ChatMessage {
                    text,
                    sender_id: field(&map, "senderId"),
                }))
            }
            other => Err(EventError::Unknown(other.to_string())),
        }
    }

    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        use names::*;

        match self {
            Self::JoinClass(_) => JOIN_CLASS,
            Self::LeaveClass(_) => LEAVE_CLASS,
            Self::JoinSession(_) => JOIN_SESSION,
            Self::LeaveSession(_) => LEAVE_SESSION,
            Self::AttendanceUpdate(_) => ATTENDANCE_UPDATE,
            Self::SessionUpdate(_) => SESSION_UPDATE,
            Self::AiRecognitionStart(_) => AI_RECOGNITION_START,
            Self::AiRecognitionComplete(_) => AI_RECOGNITION_COMPLETE,
            Self::AnalyticsUpdate(_) => ANALYTICS_UPDATE,
            Self::Message(_) => MESSAGE,
        }
    }
}

fn field(map: &Map<String, Value>, name: &str) -> Value {
    map.get(name).cloned().unwrap_or(Value::Null)
}

fn into_object(event: &'static str, data: Value) -> Result<Map<String, Value>, EventError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(EventError::NotAnObject(event)),
    }
}

fn required_key(
    event: &'static str,
    field: &'static str,
    map: &Map<String, Value>,
) -> Result<String, EventError> {
    map.get(field)
        .and_then(room_key)
        .ok_or(EventError::MissingRoomKey { event, field })
}

/// Join/leave payloads are either the bare id or an object carrying it
fn join_key(event: &'static str, field: &'static str, data: &Value) -> Result<String, EventError> {
    let key = match data {
        Value::Object(map) => map.get(field).and_then(room_key),
        other => room_key(other),
    };
    key.ok_or(EventError::MissingRoomKey { event, field })
}

// ========================================
// Server→room payloads
// ========================================

/// Sent to a client right after it connects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connected {
    pub message: String,
    pub socket_id: String,
    pub timestamp: String,
}

/// attendance-updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdated {
    pub student_id: Value,
    pub status: Value,
    pub timestamp: String,
}

/// session-updated (also class-session-updated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdated {
    pub session_id: Value,
    pub present_count: Value,
    pub total_count: Value,
    pub is_active: Value,
    pub timestamp: String,
}

/// ai-recognition-started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecognitionStarted {
    pub session_id: Value,
    pub timestamp: String,
}

/// ai-recognition-completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecognitionCompleted {
    pub session_id: Value,
    pub student_id: Value,
    pub success: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    pub timestamp: String,
}

/// Reply to a `message` frame, sent only to its sender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoMessage {
    pub text: String,
    pub sender_id: String,
    pub timestamp: String,
}
