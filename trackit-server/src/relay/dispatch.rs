//! Event routing
//!
//! Sender policy per event kind:
//!
//! | inbound                   | outbound                                   | sender   |
//! |---------------------------|--------------------------------------------|----------|
//! | `attendance-update`       | `attendance-updated`, `class-attendance-updated` | included |
//! | `session-update`          | `session-updated`, `class-session-updated` | included |
//! | `analytics-update`        | `analytics-updated`                        | included |
//! | `ai-recognition-start`    | `ai-recognition-started`                   | excluded |
//! | `ai-recognition-complete` | `ai-recognition-completed`                 | excluded |
//! | `message`                 | `message` echo                             | only the sender |
//!
//! The class room reached from a session id is derived by string
//! convention (see [`derived_class_id`]), not by looking the session up.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use trackit_common::events::{
    class_room, derived_class_id, names, session_room, AiRecognitionCompleted,
    AiRecognitionStarted, AttendanceUpdated, ClientEvent, EchoMessage, Frame, SessionUpdated,
};
use trackit_common::time::now_iso;

use super::hub::RelayHub;

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin<'a> {
    /// A connected client
    Connection(&'a str),
    /// The server itself (HTTP handlers, injected events)
    Server,
}

impl<'a> Origin<'a> {
    fn conn_id(&self) -> Option<&'a str> {
        match self {
            Origin::Connection(id) => Some(id),
            Origin::Server => None,
        }
    }
}

/// Routes typed client events to rooms through the hub
#[derive(Debug, Clone)]
pub struct EventRelay {
    hub: Arc<RelayHub>,
}

impl EventRelay {
    pub fn new(hub: Arc<RelayHub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<RelayHub> {
        &self.hub
    }

    /// Decode and route one text frame from a connection
    ///
    /// Malformed frames and unknown events are dropped; the relay has no
    /// error channel back to the client.
    pub async fn handle_text(&self, conn_id: &str, text: &str) -> usize {
        match Frame::from_text(text) {
            Ok(frame) => {
                self.handle_raw(Origin::Connection(conn_id), &frame.event, frame.data)
                    .await
            }
            Err(e) => {
                debug!(conn_id, error = %e, "Ignoring malformed frame");
                0
            }
        }
    }

    /// Route an event given by name and payload
    pub async fn handle_raw(&self, origin: Origin<'_>, event: &str, data: Value) -> usize {
        match ClientEvent::parse(event, data) {
            Ok(parsed) => self.dispatch(origin, parsed).await,
            Err(e) => {
                debug!(conn_id = ?origin.conn_id(), event, error = %e, "Ignoring event");
                0
            }
        }
    }

    /// Route a parsed event; returns the number of frames queued
    pub async fn dispatch(&self, origin: Origin<'_>, event: ClientEvent) -> usize {
        let sender = origin.conn_id();
        let name = event.name();

        match event {
            ClientEvent::JoinClass(id) => self.join(sender, &class_room(&id)).await,
            ClientEvent::LeaveClass(id) => self.leave(sender, &class_room(&id)).await,
            ClientEvent::JoinSession(id) => self.join(sender, &session_room(&id)).await,
            ClientEvent::LeaveSession(id) => self.leave(sender, &session_room(&id)).await,

            ClientEvent::AttendanceUpdate(update) => {
                let timestamp = now_iso();
                let payload = AttendanceUpdated {
                    student_id: update.student_id.clone(),
                    status: update.status.clone(),
                    timestamp: timestamp.clone(),
                };
                let mut delivered = 0;

                if let Some(class_id) = &update.class_id {
                    delivered += self
                        .hub
                        .broadcast(&class_room(class_id), names::ATTENDANCE_UPDATED, &payload, None)
                        .await;
                }

                if let Some(session_id) = &update.session_id {
                    delivered += self
                        .hub
                        .broadcast(
                            &session_room(session_id),
                            names::ATTENDANCE_UPDATED,
                            &payload,
                            None,
                        )
                        .await;

                    let mut raw = update.raw;
                    raw.insert("timestamp".to_string(), Value::String(timestamp));
                    delivered += self
                        .hub
                        .broadcast(
                            &class_room(derived_class_id(session_id)),
                            names::CLASS_ATTENDANCE_UPDATED,
                            &raw,
                            None,
                        )
                        .await;
                }
                delivered
            }

            ClientEvent::SessionUpdate(update) => {
                let payload = SessionUpdated {
                    session_id: update.raw_session_id,
                    present_count: update.present_count,
                    total_count: update.total_count,
                    is_active: update.is_active,
                    timestamp: now_iso(),
                };
                let primary = self
                    .hub
                    .broadcast(
                        &session_room(&update.session_id),
                        names::SESSION_UPDATED,
                        &payload,
                        None,
                    )
                    .await;
                let secondary = self
                    .hub
                    .broadcast(
                        &class_room(derived_class_id(&update.session_id)),
                        names::CLASS_SESSION_UPDATED,
                        &payload,
                        None,
                    )
                    .await;
                primary + secondary
            }

            ClientEvent::AiRecognitionStart(start) => {
                let payload = AiRecognitionStarted {
                    session_id: start.raw_session_id,
                    timestamp: now_iso(),
                };
                self.hub
                    .broadcast(
                        &session_room(&start.session_id),
                        names::AI_RECOGNITION_STARTED,
                        &payload,
                        sender,
                    )
                    .await
            }

            ClientEvent::AiRecognitionComplete(done) => {
                let payload = AiRecognitionCompleted {
                    session_id: done.raw_session_id,
                    student_id: done.student_id,
                    success: done.success,
                    confidence: done.confidence,
                    timestamp: now_iso(),
                };
                self.hub
                    .broadcast(
                        &session_room(&done.session_id),
                        names::AI_RECOGNITION_COMPLETED,
                        &payload,
                        sender,
                    )
                    .await
            }

            ClientEvent::AnalyticsUpdate(update) => {
                self.hub
                    .broadcast(
                        &class_room(&update.class_id),
                        names::ANALYTICS_UPDATED,
                        &update.stats,
                        None,
                    )
                    .await
            }

            ClientEvent::Message(msg) => {
                let Some(conn_id) = sender else {
                    debug!(event = name, "Message without a connection to echo to");
                    return 0;
                };
                let echo = EchoMessage {
                    text: format!("Echo: {}", msg.text),
                    sender_id: "system".to_string(),
                    timestamp: now_iso(),
                };
                usize::from(self.hub.send_to(conn_id, names::MESSAGE, &echo).await)
            }
        }
    }

    async fn join(&self, sender: Option<&str>, room: &str) -> usize {
        if let Some(conn_id) = sender {
            self.hub.join(conn_id, room).await;
        } else {
            debug!(room, "Join has no connection to attach");
        }
        0
    }

    async fn leave(&self, sender: Option<&str>, room: &str) -> usize {
        if let Some(conn_id) = sender {
            self.hub.leave(conn_id, room).await;
        }
        0
    }
}
