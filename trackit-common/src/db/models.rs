//! Database models
//!
//! Row structs serialize with camelCase field names, which is the shape the
//! HTTP API returns. JSON columns (`days_of_week`, `salary_range`,
//! `reminders`, `ai_analysis`) are stored as text and surfaced as JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "invalid {}: {} (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Attendance outcome for one student in one session
    AttendanceStatus {
        Present => "PRESENT",
        Absent => "ABSENT",
        Late => "LATE",
        Excused => "EXCUSED",
    }
);

text_enum!(
    /// How an attendance record was captured
    AttendanceMethod {
        Manual => "MANUAL",
        FacialRecognition => "FACIAL_RECOGNITION",
        QrCode => "QR_CODE",
    }
);

text_enum!(
    UserRole {
        Student => "STUDENT",
        Teacher => "TEACHER",
        Admin => "ADMIN",
    }
);

text_enum!(
    Priority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: String,
}

/// Short user view embedded in other responses
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub days_of_week: Json<Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub id: String,
    pub class_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
    pub ai_analysis: Option<Json<Value>>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: AttendanceSession,
    /// Attendance records taken in this session
    pub present_count: i64,
    /// Students enrolled in the class
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub status: String,
    pub method: String,
    pub confidence: Option<f64>,
    pub check_in_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSkill {
    pub id: String,
    pub user_id: String,
    pub skill_id: String,
    pub level: i64,
    pub target_level: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CareerGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_date: String,
    pub priority: String,
    pub salary_range: Option<Json<Value>>,
    pub market_demand: String,
    pub progress: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `YYYY-MM-DDTHH:MM`
    pub start_time: String,
    /// `YYYY-MM-DDTHH:MM`
    pub end_time: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: String,
    pub priority: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub reminders: Option<Json<Value>>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("PRESENT".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::Excused.to_string(), "EXCUSED");
        let err = "HERE".parse::<AttendanceStatus>().unwrap_err();
        assert!(err.contains("PRESENT, ABSENT, LATE, EXCUSED"));
    }

    #[test]
    fn test_method_serde_names() {
        let json = serde_json::to_string(&AttendanceMethod::FacialRecognition).unwrap();
        assert_eq!(json, "\"FACIAL_RECOGNITION\"");
        let back: AttendanceMethod = serde_json::from_str("\"QR_CODE\"").unwrap();
        assert_eq!(back, AttendanceMethod::QrCode);
    }

    #[test]
    fn test_schedule_item_type_field_name() {
        let item = ScheduleItem {
            id: "1".into(),
            user_id: "u".into(),
            title: "Lecture".into(),
            description: None,
            date: "2025-03-01".into(),
            start_time: "2025-03-01T09:00".into(),
            end_time: "2025-03-01T10:00".into(),
            item_type: "CLASS".into(),
            priority: "MEDIUM".into(),
            location: None,
            notes: None,
            reminders: Some(Json(serde_json::json!([15, 60]))),
            created_at: "2025-03-01T00:00:00.000Z".into(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "CLASS");
        assert_eq!(value["reminders"], serde_json::json!([15, 60]));
        assert_eq!(value["startTime"], "2025-03-01T09:00");
    }
}
