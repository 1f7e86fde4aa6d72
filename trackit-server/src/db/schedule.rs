//! Schedule items

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use trackit_common::db::models::{Priority, ScheduleItem};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

#[derive(Debug, Clone)]
pub struct NewScheduleItem {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, stored as `<date>T<time>`
    pub start_time: String,
    /// `HH:MM`, stored as `<date>T<time>`
    pub end_time: String,
    pub item_type: String,
    pub priority: Priority,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub reminders: Option<Value>,
}

/// Inclusive date range, `YYYY-MM-DD` both ends
#[derive(Debug, Clone)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Items of a user in chronological order
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: &str,
    range: Option<&DateRange>,
) -> Result<Vec<ScheduleItem>> {
    let items = sqlx::query_as::<_, ScheduleItem>(
        r#"
        SELECT id, user_id, title, description, date, start_time, end_time, type, priority,
               location, notes, reminders, created_at
        FROM schedule_items
        WHERE user_id = ?1 AND (?2 IS NULL OR (date >= ?2 AND date <= ?3))
        ORDER BY date ASC, start_time ASC
        "#,
    )
    .bind(user_id)
    .bind(range.map(|r| r.start.as_str()))
    .bind(range.map(|r| r.end.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn create(pool: &SqlitePool, new: NewScheduleItem) -> Result<ScheduleItem> {
    let item = ScheduleItem {
        id: new_id(),
        user_id: new.user_id,
        title: new.title,
        description: new.description,
        start_time: format!("{}T{}", new.date, new.start_time),
        end_time: format!("{}T{}", new.date, new.end_time),
        date: new.date,
        item_type: new.item_type,
        priority: new.priority.as_str().to_string(),
        location: new.location,
        notes: new.notes,
        reminders: new.reminders.map(Json),
        created_at: now_iso(),
    };

    sqlx::query(
        r#"
        INSERT INTO schedule_items (id, user_id, title, description, date, start_time, end_time,
                                    type, priority, location, notes, reminders, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.user_id)
    .bind(&item.title)
    .bind(&item.description)
    .bind(&item.date)
    .bind(&item.start_time)
    .bind(&item.end_time)
    .bind(&item.item_type)
    .bind(&item.priority)
    .bind(&item.location)
    .bind(&item.notes)
    .bind(&item.reminders)
    .bind(&item.created_at)
    .execute(pool)
    .await?;

    Ok(item)
}
