//! Query-layer tests against a file-backed pool with several connections

use tempfile::TempDir;
use trackit_common::db::init_database;
use trackit_common::db::models::UserRole;
use trackit_server::db::users;

async fn file_pool() -> (TempDir, sqlx::SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("trackit.db")).await.unwrap();
    (dir, pool)
}

#[tokio::test]
async fn test_concurrent_registration_yields_one_user() {
    let (_dir, pool) = file_pool().await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                users::find_or_create(&pool, "ada@school.test", Some("Ada"), UserRole::Student)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let first_id = results[0].0.id.clone();
    assert!(results.iter().all(|(user, _)| user.id == first_id));
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("ada@school.test")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_existing_user_keeps_name_and_role() {
    let (_dir, pool) = file_pool().await;

    let (first, created) =
        users::find_or_create(&pool, "grace@school.test", Some("Grace"), UserRole::Teacher)
            .await
            .unwrap();
    assert!(created);

    let (again, created) =
        users::find_or_create(&pool, "grace@school.test", None, UserRole::Student)
            .await
            .unwrap();
    assert!(!created);
    assert_eq!(again.id, first.id);
    assert_eq!(again.name.as_deref(), Some("Grace"));
    assert_eq!(again.role, "TEACHER");
}
