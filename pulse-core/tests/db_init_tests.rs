//! Integration tests for database initialization
//!
//! Covers automatic creation on first run, idempotent re-initialization,
//! seeded reference data, and the schema-level constraints the rest of
//! the crate leans on.

use pulse_core::db::init::{init_database, GUEST_EMAIL, GUEST_PANELIST_ID};
use std::path::PathBuf;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let test_db = format!("/tmp/pulse-test-db-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    // Ensure database doesn't exist
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());

    // Verify database file was created
    assert!(db_path.exists(), "Database file was not created");

    // Cleanup
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let test_db = format!("/tmp/pulse-test-db-existing-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Open database second time (should succeed)
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    // Cleanup
    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_taxonomies_seeded() {
    let test_db = format!("/tmp/pulse-test-db-taxonomy-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    let race_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM races")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(race_count, 6, "Expected 6 seeded races, got {}", race_count);

    let gender_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(gender_count, 3, "Expected 3 seeded genders, got {}", gender_count);

    let region_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM regions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(region_count, 4, "Expected 4 seeded regions, got {}", region_count);

    // Spot-check ids are stable
    let asian: Option<String> = sqlx::query_scalar("SELECT label FROM races WHERE race_id = 3")
        .fetch_optional(&pool)
        .await
        .unwrap();
    assert_eq!(asian.as_deref(), Some("Asian"));

    let west: Option<String> = sqlx::query_scalar("SELECT label FROM regions WHERE region_id = 3")
        .fetch_optional(&pool)
        .await
        .unwrap();
    assert_eq!(west.as_deref(), Some("West"));

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_guest_panelist_seeded() {
    let test_db = format!("/tmp/pulse-test-db-guest-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    let guest: (String, String, String, i64) = sqlx::query_as(
        "SELECT email, password_hash, password_salt, point_balance FROM panelists WHERE panelist_id = ?",
    )
    .bind(GUEST_PANELIST_ID)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(guest.0, GUEST_EMAIL);
    assert_eq!(guest.1, "", "Guest should have empty password_hash");
    assert_eq!(guest.2, "", "Guest should have empty password_salt");
    assert_eq!(guest.3, 0, "Guest should start with zero points");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_idempotent_initialization() {
    let test_db = format!("/tmp/pulse-test-db-idempotent-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await.unwrap();
    let races1: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM races")
        .fetch_one(&pool1)
        .await
        .unwrap();
    drop(pool1);

    // Initialize database second time (should not error or re-seed)
    let pool2 = init_database(&db_path).await.unwrap();
    let races2: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM races")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(races1, races2, "Race count changed on second initialization");

    let guests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM panelists WHERE panelist_id = ?")
        .bind(GUEST_PANELIST_ID)
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(guests, 1, "Guest panelist duplicated on second initialization");

    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    let test_db = format!("/tmp/pulse-test-db-fk-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    let fk_enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fk_enabled, 1, "Foreign keys should be enabled");

    // A survey pointing at a nonexistent publisher must be rejected
    let result = sqlx::query(
        r#"
        INSERT INTO surveys (publisher, category, title, description, sample_size, min_age, max_age)
        VALUES (9999, 'Finance', 'Budget habits', 'Monthly budgeting', 10, 20, 30)
        "#,
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "Foreign key violation was not rejected");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_busy_timeout_set() {
    let test_db = format!("/tmp/pulse-test-db-timeout-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(timeout, 5000, "Busy timeout should be 5000ms");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_survey_check_constraints() {
    let test_db = format!("/tmp/pulse-test-db-checks-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    // Zero sample size violates CHECK (sample_size > 0)
    let result = sqlx::query(
        r#"
        INSERT INTO surveys (publisher, category, title, description, sample_size, min_age, max_age)
        VALUES (?, 'Finance', 'Budget habits', 'Monthly budgeting', 0, 20, 30)
        "#,
    )
    .bind(GUEST_PANELIST_ID)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "sample_size = 0 was not rejected");

    // Inverted age range violates CHECK (min_age <= max_age)
    let result = sqlx::query(
        r#"
        INSERT INTO surveys (publisher, category, title, description, sample_size, min_age, max_age)
        VALUES (?, 'Finance', 'Budget habits', 'Monthly budgeting', 10, 40, 30)
        "#,
    )
    .bind(GUEST_PANELIST_ID)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "min_age > max_age was not rejected");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_cascade_delete_removes_children() {
    let test_db = format!("/tmp/pulse-test-db-cascade-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();

    let survey_id = sqlx::query(
        r#"
        INSERT INTO surveys (publisher, category, title, description, sample_size, min_age, max_age)
        VALUES (?, 'Finance', 'Budget habits', 'Monthly budgeting', 10, 20, 30)
        "#,
    )
    .bind(GUEST_PANELIST_ID)
    .execute(&pool)
    .await
    .unwrap()
    .last_insert_rowid();

    sqlx::query("INSERT INTO survey_races (survey_id, race_id) VALUES (?, 1)")
        .bind(survey_id)
        .execute(&pool)
        .await
        .unwrap();

    let question_id = sqlx::query("INSERT INTO questions (parent_survey, question) VALUES (?, 'How often?')")
        .bind(survey_id)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

    sqlx::query("INSERT INTO answers (parent_question, answer) VALUES (?, 'Weekly')")
        .bind(question_id)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM surveys WHERE survey_id = ?")
        .bind(survey_id)
        .execute(&pool)
        .await
        .unwrap();

    let junction_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_races WHERE survey_id = ?")
        .bind(survey_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(junction_rows, 0, "Junction rows survived survey deletion");

    let question_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE parent_survey = ?")
        .bind(survey_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(question_rows, 0, "Questions survived survey deletion");

    let answer_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE parent_question = ?")
        .bind(question_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answer_rows, 0, "Answers survived question deletion");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_concurrent_initialization() {
    let test_db = format!("/tmp/pulse-test-db-concurrent-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);

    // Spawn multiple concurrent initialization tasks
    let mut handles = vec![];
    for _ in 0..5 {
        let db_path_clone = db_path.clone();
        let handle = tokio::spawn(async move { init_database(&db_path_clone).await });
        handles.push(handle);
    }

    let mut results = vec![];
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    for result in &results {
        assert!(result.is_ok(), "Concurrent initialization failed: {:?}", result);
    }

    // Verify database is in consistent state
    let pool = results[0].as_ref().unwrap();
    let race_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM races")
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(race_count, 6, "Races not properly seeded after concurrent access");

    for result in results {
        drop(result);
    }
    let _ = std::fs::remove_file(&db_path);
}
