//! Attendance sessions

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use trackit_common::db::models::{AttendanceSession, SessionWithCounts};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

const SESSION_COLUMNS: &str =
    "s.id, s.class_id, s.date, s.start_time, s.end_time, s.is_active, s.ai_analysis, s.created_at";

/// Sessions of a class, newest first
///
/// `present_count` counts attendance records of the session, `total_count`
/// the students enrolled in the class.
pub async fn list_by_class(pool: &SqlitePool, class_id: &str) -> Result<Vec<SessionWithCounts>> {
    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS},
               (SELECT COUNT(*) FROM attendance a WHERE a.session_id = s.id) AS present_count,
               (SELECT COUNT(*) FROM class_students cs WHERE cs.class_id = s.class_id) AS total_count
        FROM attendance_sessions s
        WHERE s.class_id = ?
        ORDER BY s.date DESC, s.rowid DESC
        "#
    );
    let sessions = sqlx::query_as::<_, SessionWithCounts>(&sql)
        .bind(class_id)
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<AttendanceSession>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM attendance_sessions s WHERE s.id = ?");
    let session = sqlx::query_as::<_, AttendanceSession>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Open a new active session dated now
pub async fn create(
    pool: &SqlitePool,
    class_id: &str,
    start_time: &str,
    end_time: &str,
) -> Result<AttendanceSession> {
    let now = now_iso();
    let session = AttendanceSession {
        id: new_id(),
        class_id: class_id.to_string(),
        date: now.clone(),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        is_active: true,
        ai_analysis: None,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO attendance_sessions (id, class_id, date, start_time, end_time, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.class_id)
    .bind(&session.date)
    .bind(&session.start_time)
    .bind(&session.end_time)
    .bind(session.is_active)
    .bind(&session.created_at)
    .execute(pool)
    .await?;

    Ok(session)
}

/// Store the latest AI analysis on a session
pub async fn set_ai_analysis(pool: &SqlitePool, id: &str, analysis: Value) -> Result<()> {
    sqlx::query("UPDATE attendance_sessions SET ai_analysis = ? WHERE id = ?")
        .bind(Json(analysis))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
