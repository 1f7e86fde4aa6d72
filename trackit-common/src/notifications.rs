//! Client-side notification cache
//!
//! A bounded, per-session list of recent notifications surfaced to one user.
//! Nothing here is persisted or shared between connections. The newest
//! notification is always first; when the cache is full the oldest one is
//! evicted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::events::names;

/// Visual severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Optional call-to-action attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    /// Dashboard tab the action navigates to
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

impl Notification {
    /// New unread notification stamped now
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            action: None,
        }
    }

    pub fn with_action(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.action = Some(NotificationAction {
            label: label.into(),
            target: target.into(),
        });
        self
    }

    /// Turn a relayed event into a notification
    ///
    /// Returns `None` for events that have no user-facing notification.
    pub fn from_event(event: &str, data: &Value) -> Option<Self> {
        match event {
            names::ATTENDANCE_UPDATED | names::CLASS_ATTENDANCE_UPDATED => {
                let who = text(data, "studentName").or_else(|| text(data, "studentId"))?;
                let status = text(data, "status").unwrap_or_else(|| "updated".to_string());
                Some(Self::new(
                    NotificationKind::Success,
                    "Real-time Attendance Update",
                    format!("{who} marked as {status}"),
                ))
            }
            names::SESSION_UPDATED | names::CLASS_SESSION_UPDATED => {
                let present = text(data, "presentCount").unwrap_or_else(|| "?".to_string());
                let total = text(data, "totalCount").unwrap_or_else(|| "?".to_string());
                let state = match data.get("isActive").and_then(Value::as_bool) {
                    Some(true) => "active",
                    Some(false) => "closed",
                    None => "updated",
                };
                Some(Self::new(
                    NotificationKind::Info,
                    "Session Updated",
                    format!("Session {state}: {present}/{total} present"),
                ))
            }
            names::AI_RECOGNITION_STARTED => Some(Self::new(
                NotificationKind::Info,
                "Face Recognition Started",
                "Scanning for students in this session",
            )),
            names::AI_RECOGNITION_COMPLETED => {
                let success = data.get("success").and_then(Value::as_bool).unwrap_or(false);
                let student = text(data, "studentId").unwrap_or_else(|| "student".to_string());
                if success {
                    let message = match data.get("confidence").and_then(Value::as_f64) {
                        Some(c) => format!("Recognized {student} ({c:.1}% confidence)"),
                        None => format!("Recognized {student}"),
                    };
                    Some(Self::new(NotificationKind::Success, "Face Recognition Success", message))
                } else {
                    Some(Self::new(
                        NotificationKind::Error,
                        "Face Recognition Failed",
                        format!("Could not recognize {student}"),
                    ))
                }
            }
            names::ANALYTICS_UPDATED => Some(
                Self::new(
                    NotificationKind::Info,
                    "Analytics Updated",
                    "Class attendance analytics have been refreshed",
                )
                .with_action("View Analytics", "analytics"),
            ),
            _ => None,
        }
    }
}

/// Render a payload field as display text; strings lose their quotes
fn text(data: &Value, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Bounded most-recent-first notification list
#[derive(Debug, Clone)]
pub struct NotificationCache {
    capacity: usize,
    items: VecDeque<Notification>,
}

impl NotificationCache {
    /// Create an empty cache; a capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Cache pre-filled with the static seed notifications
    pub fn seeded(capacity: usize, now: DateTime<Utc>) -> Self {
        let mut cache = Self::new(capacity);
        let mut seeds = seed_notifications(now);
        // Oldest first so the newest ends up at the front
        seeds.sort_by_key(|n| n.timestamp);
        for n in seeds {
            cache.push(n);
        }
        cache
    }

    /// Insert at the front, evicting the oldest entry when full
    ///
    /// Returns the evicted notification, if any.
    pub fn push(&mut self, notification: Notification) -> Option<Notification> {
        self.items.push_front(notification);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Mark one notification read; false if the id is unknown
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    /// Remove one notification; returns it if it was present
    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        let pos = self.items.iter().position(|n| n.id == id)?;
        self.items.remove(pos)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }
}

/// Static notifications shown before any live event arrives
pub fn seed_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    let seed = |id: &str, kind, title: &str, message: &str, minutes_ago: i64, read: bool| Notification {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        message: message.to_string(),
        timestamp: now - Duration::minutes(minutes_ago),
        read,
        action: None,
    };

    vec![
        seed(
            "1",
            NotificationKind::Success,
            "Attendance Recorded",
            "Your attendance has been successfully recorded for Computer Science 101",
            5,
            false,
        ),
        seed(
            "2",
            NotificationKind::Warning,
            "Low Attendance Alert",
            "Your attendance rate is below 75% for Mathematics 201",
            30,
            false,
        ),
        seed(
            "3",
            NotificationKind::Info,
            "New Assignment Posted",
            "A new assignment has been posted for Physics 301",
            120,
            true,
        ),
        seed(
            "4",
            NotificationKind::Success,
            "Skill Progress Updated",
            "JavaScript progress increased to 75%",
            45,
            false,
        )
        .with_action("View Skill", "skills"),
        seed(
            "5",
            NotificationKind::Info,
            "Schedule Reminder",
            "Upcoming class: Computer Science 101 at 09:00 AM",
            15,
            false,
        )
        .with_action("View Schedule", "scheduler"),
        seed(
            "6",
            NotificationKind::Success,
            "Career Goal Progress",
            "Senior Software Developer progress: 65%",
            180,
            true,
        )
        .with_action("View Goal", "career"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note(title: &str) -> Notification {
        Notification::new(NotificationKind::Info, title, "body")
    }

    #[test]
    fn test_push_is_most_recent_first() {
        let mut cache = NotificationCache::new(10);
        cache.push(note("first"));
        cache.push(note("second"));
        let titles: Vec<_> = cache.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = NotificationCache::new(2);
        assert!(cache.push(note("a")).is_none());
        assert!(cache.push(note("b")).is_none());
        let evicted = cache.push(note("c")).expect("oldest should be evicted");
        assert_eq!(evicted.title, "a");
        assert_eq!(cache.len(), 2);
        let titles: Vec<_> = cache.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut cache = NotificationCache::new(0);
        cache.push(note("a"));
        cache.push(note("b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_mark_read_and_remove() {
        let mut cache = NotificationCache::new(10);
        let a = note("a");
        let a_id = a.id.clone();
        cache.push(a);
        cache.push(note("b"));
        assert_eq!(cache.unread_count(), 2);

        assert!(cache.mark_read(&a_id));
        assert!(!cache.mark_read("missing"));
        assert_eq!(cache.unread_count(), 1);
        assert!(cache.get(&a_id).unwrap().read);

        let removed = cache.remove(&a_id).unwrap();
        assert_eq!(removed.title, "a");
        assert!(cache.remove(&a_id).is_none());
        assert_eq!(cache.len(), 1);

        cache.mark_all_read();
        assert_eq!(cache.unread_count(), 0);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_seeded_cache_is_newest_first() {
        let now = Utc::now();
        let cache = NotificationCache::seeded(50, now);
        assert_eq!(cache.len(), 6);
        let ids: Vec<_> = cache.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5", "2", "4", "3", "6"]);
        assert_eq!(cache.unread_count(), 4);
        assert_eq!(
            cache.get("4").unwrap().action.as_ref().map(|a| a.target.as_str()),
            Some("skills")
        );
    }

    #[test]
    fn test_attendance_event_notification() {
        let n = Notification::from_event(
            "attendance-updated",
            &json!({"studentId": "s1", "status": "PRESENT", "timestamp": "x"}),
        )
        .unwrap();
        assert_eq!(n.kind, NotificationKind::Success);
        assert_eq!(n.message, "s1 marked as PRESENT");
        assert!(!n.read);
    }

    #[test]
    fn test_recognition_failure_is_error() {
        let n = Notification::from_event(
            "ai-recognition-completed",
            &json!({"sessionId": "9", "studentId": "s1", "success": false}),
        )
        .unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.title, "Face Recognition Failed");
    }

    #[test]
    fn test_session_event_notification() {
        let n = Notification::from_event(
            "session-updated",
            &json!({"sessionId": "9", "presentCount": 5, "totalCount": 20, "isActive": true}),
        )
        .unwrap();
        assert_eq!(n.message, "Session active: 5/20 present");
    }

    #[test]
    fn test_events_without_notification() {
        assert!(Notification::from_event("message", &json!({"text": "hi"})).is_none());
        assert!(Notification::from_event("attendance-updated", &json!({})).is_none());
    }

    #[test]
    fn test_serialized_kind_field_is_type() {
        let value = serde_json::to_value(note("x")).unwrap();
        assert_eq!(value["type"], "info");
        assert!(value.get("action").is_none());
    }
}
