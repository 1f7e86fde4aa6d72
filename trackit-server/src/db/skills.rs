//! Skills and per-user skill tracking

use serde::Serialize;
use sqlx::SqlitePool;
use trackit_common::db::models::{Skill, UserSkill};
use trackit_common::time::now_iso;
use trackit_common::Result;

use super::new_id;

/// Category given to skills created implicitly by id
pub const DEFAULT_SKILL_CATEGORY: &str = "TECHNICAL";

/// User skill with its skill embedded
#[derive(Debug, Clone, Serialize)]
pub struct UserSkillWithSkill {
    #[serde(flatten)]
    pub user_skill: UserSkill,
    pub skill: Skill,
}

#[derive(sqlx::FromRow)]
struct UserSkillRow {
    #[sqlx(flatten)]
    user_skill: UserSkill,
    skill_name: String,
    skill_category: String,
}

impl From<UserSkillRow> for UserSkillWithSkill {
    fn from(row: UserSkillRow) -> Self {
        Self {
            skill: Skill {
                id: row.user_skill.skill_id.clone(),
                name: row.skill_name,
                category: row.skill_category,
            },
            user_skill: row.user_skill,
        }
    }
}

/// Skills of a user, highest level first, optionally of one category
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: &str,
    category: Option<&str>,
) -> Result<Vec<UserSkillWithSkill>> {
    let rows = sqlx::query_as::<_, UserSkillRow>(
        r#"
        SELECT us.id, us.user_id, us.skill_id, us.level, us.target_level, us.created_at,
               sk.name AS skill_name, sk.category AS skill_category
        FROM user_skills us
        JOIN skills sk ON sk.id = us.skill_id
        WHERE us.user_id = ?1 AND (?2 IS NULL OR sk.category = ?2)
        ORDER BY us.level DESC, us.rowid
        "#,
    )
    .bind(user_id)
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserSkillWithSkill::from).collect())
}

/// Look up a skill, creating a placeholder named after its id if unknown
pub async fn ensure_skill(pool: &SqlitePool, skill_id: &str) -> Result<Skill> {
    sqlx::query("INSERT OR IGNORE INTO skills (id, name, category) VALUES (?, ?, ?)")
        .bind(skill_id)
        .bind(skill_id)
        .bind(DEFAULT_SKILL_CATEGORY)
        .execute(pool)
        .await?;

    let skill = sqlx::query_as::<_, Skill>("SELECT id, name, category FROM skills WHERE id = ?")
        .bind(skill_id)
        .fetch_one(pool)
        .await?;
    Ok(skill)
}

async fn find_user_skill(
    pool: &SqlitePool,
    user_id: &str,
    skill_id: &str,
) -> Result<Option<UserSkill>> {
    let found = sqlx::query_as::<_, UserSkill>(
        r#"
        SELECT id, user_id, skill_id, level, target_level, created_at
        FROM user_skills WHERE user_id = ? AND skill_id = ?
        "#,
    )
    .bind(user_id)
    .bind(skill_id)
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

/// Start tracking a skill for a user
///
/// An existing user skill is returned unchanged with `false`; a new one is
/// created at level 0 and returned with `true`.
pub async fn add_user_skill(
    pool: &SqlitePool,
    user_id: &str,
    skill_id: &str,
    target_level: i64,
) -> Result<(UserSkillWithSkill, bool)> {
    let skill = ensure_skill(pool, skill_id).await?;

    if let Some(existing) = find_user_skill(pool, user_id, skill_id).await? {
        return Ok((
            UserSkillWithSkill {
                user_skill: existing,
                skill,
            },
            false,
        ));
    }

    let user_skill = UserSkill {
        id: new_id(),
        user_id: user_id.to_string(),
        skill_id: skill_id.to_string(),
        level: 0,
        target_level,
        created_at: now_iso(),
    };

    sqlx::query(
        r#"
        INSERT INTO user_skills (id, user_id, skill_id, level, target_level, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user_skill.id)
    .bind(&user_skill.user_id)
    .bind(&user_skill.skill_id)
    .bind(user_skill.level)
    .bind(user_skill.target_level)
    .bind(&user_skill.created_at)
    .execute(pool)
    .await?;

    Ok((UserSkillWithSkill { user_skill, skill }, true))
}
