//! HTTP API handlers

pub mod ai;
pub mod attendance;
pub mod career_goals;
pub mod classes;
pub mod health;
pub mod schedule;
pub mod sessions;
pub mod skills;
pub mod socket;
pub mod users;
pub mod validation;

pub use ai::{attendance_analytics, face_recognition};
pub use attendance::{list_attendance, record_attendance};
pub use career_goals::{create_goal, list_goals};
pub use classes::{create_class, enroll_student, list_classes, list_students};
pub use health::health_routes;
pub use schedule::{create_item, list_items};
pub use sessions::{create_session, list_sessions};
pub use skills::{add_skill, list_skills};
pub use socket::{inject_event, relay_info, ws_upgrade};
pub use users::register_user;
