//! Database queries for the HTTP handlers
//!
//! Schema creation lives in `trackit_common::db`; these modules only read
//! and write rows. Every function takes the pool and returns
//! `trackit_common::Result`.

pub mod attendance;
pub mod career_goals;
pub mod classes;
pub mod schedule;
pub mod sessions;
pub mod skills;
pub mod users;

/// New primary key
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
