//! Classes and class rosters

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use trackit_common::db::models::{Class, ClassWithCount, StudentSummary};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

/// Fields for a new class, already validated
#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub start_time: String,
    pub end_time: String,
    pub days_of_week: Value,
}

/// Classes taught by a teacher, newest first, with roster size
pub async fn list_by_teacher(pool: &SqlitePool, teacher_id: &str) -> Result<Vec<ClassWithCount>> {
    let classes = sqlx::query_as::<_, ClassWithCount>(
        r#"
        SELECT c.id, c.name, c.description, c.teacher_id, c.start_time, c.end_time,
               c.days_of_week, c.created_at,
               (SELECT COUNT(*) FROM class_students cs WHERE cs.class_id = c.id) AS student_count
        FROM classes c
        WHERE c.teacher_id = ?
        ORDER BY c.created_at DESC, c.rowid DESC
        "#,
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;
    Ok(classes)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Class>> {
    let class = sqlx::query_as::<_, Class>(
        r#"
        SELECT id, name, description, teacher_id, start_time, end_time, days_of_week, created_at
        FROM classes WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(class)
}

pub async fn create(pool: &SqlitePool, new: NewClass) -> Result<Class> {
    let class = Class {
        id: new_id(),
        name: new.name,
        description: new.description,
        teacher_id: new.teacher_id,
        start_time: new.start_time,
        end_time: new.end_time,
        days_of_week: Json(new.days_of_week),
        created_at: now_iso(),
    };

    sqlx::query(
        r#"
        INSERT INTO classes (id, name, description, teacher_id, start_time, end_time, days_of_week, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&class.id)
    .bind(&class.name)
    .bind(&class.description)
    .bind(&class.teacher_id)
    .bind(&class.start_time)
    .bind(&class.end_time)
    .bind(&class.days_of_week)
    .bind(&class.created_at)
    .execute(pool)
    .await?;

    Ok(class)
}

/// Students enrolled in a class, by name
pub async fn list_students(pool: &SqlitePool, class_id: &str) -> Result<Vec<StudentSummary>> {
    let students = sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT u.id, u.name, u.email
        FROM class_students cs
        JOIN users u ON u.id = cs.student_id
        WHERE cs.class_id = ?
        ORDER BY u.name, u.email
        "#,
    )
    .bind(class_id)
    .fetch_all(pool)
    .await?;
    Ok(students)
}

/// Enroll a student; returns `false` if already enrolled
pub async fn enroll(pool: &SqlitePool, class_id: &str, student_id: &str) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO class_students (class_id, student_id, enrolled_at) VALUES (?, ?, ?)",
    )
    .bind(class_id)
    .bind(student_id)
    .bind(now_iso())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
