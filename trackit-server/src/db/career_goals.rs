//! Career goals

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use trackit_common::db::models::{CareerGoal, Priority};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

#[derive(Debug, Clone)]
pub struct NewCareerGoal {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_date: String,
    pub priority: Priority,
    pub salary_range: Option<Value>,
    pub market_demand: Priority,
}

/// Goals of a user, highest priority first, then by nearest target date
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: &str,
    category: Option<&str>,
) -> Result<Vec<CareerGoal>> {
    let goals = sqlx::query_as::<_, CareerGoal>(
        r#"
        SELECT id, user_id, title, description, category, target_date, priority,
               salary_range, market_demand, progress, created_at
        FROM career_goals
        WHERE user_id = ?1 AND (?2 IS NULL OR category = ?2)
        ORDER BY CASE priority WHEN 'HIGH' THEN 3 WHEN 'MEDIUM' THEN 2 WHEN 'LOW' THEN 1 ELSE 0 END DESC,
                 target_date ASC
        "#,
    )
    .bind(user_id)
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

pub async fn create(pool: &SqlitePool, new: NewCareerGoal) -> Result<CareerGoal> {
    let goal = CareerGoal {
        id: new_id(),
        user_id: new.user_id,
        title: new.title,
        description: new.description,
        category: new.category,
        target_date: new.target_date,
        priority: new.priority.as_str().to_string(),
        salary_range: new.salary_range.map(Json),
        market_demand: new.market_demand.as_str().to_string(),
        progress: 0,
        created_at: now_iso(),
    };

    sqlx::query(
        r#"
        INSERT INTO career_goals (id, user_id, title, description, category, target_date,
                                  priority, salary_range, market_demand, progress, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&goal.id)
    .bind(&goal.user_id)
    .bind(&goal.title)
    .bind(&goal.description)
    .bind(&goal.category)
    .bind(&goal.target_date)
    .bind(&goal.priority)
    .bind(&goal.salary_range)
    .bind(&goal.market_demand)
    .bind(goal.progress)
    .bind(&goal.created_at)
    .execute(pool)
    .await?;

    Ok(goal)
}
