//! Attendance records
//!
//! One record per (session, student). Recording attendance for a pair that
//! already has a record updates it in place and keeps its id.

use serde::Serialize;
use sqlx::SqlitePool;
use trackit_common::db::models::{Attendance, AttendanceMethod, AttendanceStatus, StudentSummary};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

const ATTENDANCE_COLUMNS: &str = "a.id, a.session_id, a.student_id, a.status, a.method, \
     a.confidence, a.check_in_time, a.created_at, a.updated_at";

/// Attendance to record for one student in one session
#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub session_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub method: AttendanceMethod,
    pub confidence: Option<f64>,
}

/// Session reference embedded in a student's history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    pub id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub class: ClassRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassRef {
    pub id: String,
    pub name: String,
}

/// Attendance record with its session and class
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceWithSession {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub session: SessionRef,
}

/// Attendance record with the student it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceWithStudent {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub student: StudentSummary,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    #[sqlx(flatten)]
    attendance: Attendance,
    session_date: String,
    session_start_time: String,
    session_end_time: String,
    class_id: String,
    class_name: String,
}

#[derive(sqlx::FromRow)]
struct RosterRow {
    #[sqlx(flatten)]
    attendance: Attendance,
    student_name: Option<String>,
    student_email: String,
}

/// A student's attendance history, newest first
pub async fn list_by_student(
    pool: &SqlitePool,
    student_id: &str,
) -> Result<Vec<AttendanceWithSession>> {
    let sql = format!(
        r#"
        SELECT {ATTENDANCE_COLUMNS},
               s.date AS session_date, s.start_time AS session_start_time,
               s.end_time AS session_end_time, c.id AS class_id, c.name AS class_name
        FROM attendance a
        JOIN attendance_sessions s ON s.id = a.session_id
        JOIN classes c ON c.id = s.class_id
        WHERE a.student_id = ?
        ORDER BY a.created_at DESC, a.rowid DESC
        "#
    );
    let rows = sqlx::query_as::<_, HistoryRow>(&sql)
        .bind(student_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| AttendanceWithSession {
            session: SessionRef {
                id: row.attendance.session_id.clone(),
                date: row.session_date,
                start_time: row.session_start_time,
                end_time: row.session_end_time,
                class: ClassRef {
                    id: row.class_id,
                    name: row.class_name,
                },
            },
            attendance: row.attendance,
        })
        .collect())
}

/// Attendance taken in one session
pub async fn list_by_session(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Vec<AttendanceWithStudent>> {
    let sql = format!(
        r#"
        SELECT {ATTENDANCE_COLUMNS}, u.name AS student_name, u.email AS student_email
        FROM attendance a
        JOIN users u ON u.id = a.student_id
        WHERE a.session_id = ?
        ORDER BY a.created_at, a.rowid
        "#
    );
    let rows = sqlx::query_as::<_, RosterRow>(&sql)
        .bind(session_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| AttendanceWithStudent {
            student: StudentSummary {
                id: row.attendance.student_id.clone(),
                name: row.student_name,
                email: row.student_email,
            },
            attendance: row.attendance,
        })
        .collect())
}

/// Records of a class, optionally narrowed to one student, newest first
pub async fn list_for_class(
    pool: &SqlitePool,
    class_id: &str,
    student_id: Option<&str>,
) -> Result<Vec<Attendance>> {
    let sql = format!(
        r#"
        SELECT {ATTENDANCE_COLUMNS}
        FROM attendance a
        JOIN attendance_sessions s ON s.id = a.session_id
        WHERE s.class_id = ?1 AND (?2 IS NULL OR a.student_id = ?2)
        ORDER BY a.created_at DESC, a.rowid DESC
        "#
    );
    let records = sqlx::query_as::<_, Attendance>(&sql)
        .bind(class_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;
    Ok(records)
}

pub async fn find_by_pair(
    pool: &SqlitePool,
    session_id: &str,
    student_id: &str,
) -> Result<Option<Attendance>> {
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.session_id = ? AND a.student_id = ?"
    );
    let record = sqlx::query_as::<_, Attendance>(&sql)
        .bind(session_id)
        .bind(student_id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Create or update the record for the mark's (session, student) pair
///
/// `check_in_time` is set to now unless the status is ABSENT, in which case
/// it is cleared. A mark without a confidence keeps the stored one.
pub async fn upsert(pool: &SqlitePool, mark: &AttendanceMark) -> Result<Attendance> {
    let now = now_iso();
    let check_in_time = (mark.status != AttendanceStatus::Absent).then(|| now.clone());

    sqlx::query(
        r#"
        INSERT INTO attendance (id, session_id, student_id, status, method, confidence,
                                check_in_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(session_id, student_id) DO UPDATE SET
            status = excluded.status,
            method = excluded.method,
            confidence = COALESCE(excluded.confidence, attendance.confidence),
            check_in_time = excluded.check_in_time,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(new_id())
    .bind(&mark.session_id)
    .bind(&mark.student_id)
    .bind(mark.status.as_str())
    .bind(mark.method.as_str())
    .bind(mark.confidence)
    .bind(&check_in_time)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_by_pair(pool, &mark.session_id, &mark.student_id)
        .await?
        .ok_or_else(|| {
            trackit_common::Error::Inconsistent(format!(
                "attendance for session {} student {} vanished after upsert",
                mark.session_id, mark.student_id
            ))
        })
}
