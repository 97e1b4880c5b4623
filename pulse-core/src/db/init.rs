//! Database initialization
//!
//! Creates the Pulse schema on first run and seeds the closed reference
//! data: the race/gender/region lookup tables and the shared guest
//! panelist. Every statement is idempotent, so startup can run the full
//! sequence unconditionally.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Well-known id of the seeded guest panelist
pub const GUEST_PANELIST_ID: i64 = 1;

/// Email of the seeded guest panelist
pub const GUEST_EMAIL: &str = "guest@pulse.local";

/// Race labels seeded into the races table, in id order starting at 1
pub const RACE_LABELS: &[&str] = &[
    "Black or African American",
    "White",
    "Asian",
    "Hispanic or Latino",
    "American Indian or Alaska Native",
    "Native Hawaiian or Other Pacific Islander",
];

/// Gender labels seeded into the genders table, in id order starting at 1
pub const GENDER_LABELS: &[&str] = &["Male", "Female", "Non-binary"];

/// Region labels seeded into the regions table, in id order starting at 1
pub const REGION_LABELS: &[&str] = &["Northeast", "Midwest", "West", "South"];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection setting, so they go in the
    // connect options rather than a one-off PRAGMA on the pool
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all Pulse tables and seed reference data
///
/// Safe to call repeatedly; every statement is CREATE TABLE IF NOT
/// EXISTS or INSERT OR IGNORE.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    // Lookup tables first, panelists and surveys reference them
    create_races_table(pool).await?;
    create_genders_table(pool).await?;
    create_regions_table(pool).await?;

    create_panelists_table(pool).await?;
    create_surveys_table(pool).await?;

    // Targeting junction tables
    create_survey_races_table(pool).await?;
    create_survey_genders_table(pool).await?;
    create_survey_regions_table(pool).await?;

    create_questions_table(pool).await?;
    create_answers_table(pool).await?;

    seed_reference_data(pool).await?;

    Ok(())
}

async fn create_races_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS races (
            race_id INTEGER PRIMARY KEY,
            label TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_genders_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genders (
            gender_id INTEGER PRIMARY KEY,
            label TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_regions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS regions (
            region_id INTEGER PRIMARY KEY,
            label TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_panelists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS panelists (
            panelist_id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            firstname TEXT,
            lastname TEXT,
            dob TEXT,
            race_id INTEGER REFERENCES races(race_id),
            gender_id INTEGER REFERENCES genders(gender_id),
            region_id INTEGER REFERENCES regions(region_id),
            point_balance INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_surveys_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS surveys (
            survey_id INTEGER PRIMARY KEY,
            publisher INTEGER NOT NULL REFERENCES panelists(panelist_id),
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            sample_size INTEGER NOT NULL,
            min_age INTEGER NOT NULL,
            max_age INTEGER NOT NULL,
            create_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (sample_size > 0),
            CHECK (min_age <= max_age)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_surveys_publisher ON surveys(publisher)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_survey_races_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_races (
            survey_id INTEGER NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
            race_id INTEGER NOT NULL REFERENCES races(race_id),
            PRIMARY KEY (survey_id, race_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_survey_races_race ON survey_races(race_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_survey_genders_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_genders (
            survey_id INTEGER NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
            gender_id INTEGER NOT NULL REFERENCES genders(gender_id),
            PRIMARY KEY (survey_id, gender_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_survey_genders_gender ON survey_genders(gender_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_survey_regions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_regions (
            survey_id INTEGER NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
            region_id INTEGER NOT NULL REFERENCES regions(region_id),
            PRIMARY KEY (survey_id, region_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_survey_regions_region ON survey_regions(region_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            question_id INTEGER PRIMARY KEY,
            parent_survey INTEGER NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
            question TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_survey ON questions(parent_survey)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_answers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            answer_id INTEGER PRIMARY KEY,
            parent_question INTEGER NOT NULL REFERENCES questions(question_id) ON DELETE CASCADE,
            answer TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(parent_question)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Seed the taxonomy tables and the guest panelist
///
/// Label ids are assigned in declaration order starting at 1 and never
/// change once seeded; re-running is a no-op.
async fn seed_reference_data(pool: &SqlitePool) -> Result<()> {
    for (i, label) in RACE_LABELS.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO races (race_id, label) VALUES (?, ?)")
            .bind((i + 1) as i64)
            .bind(label)
            .execute(pool)
            .await?;
    }

    for (i, label) in GENDER_LABELS.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO genders (gender_id, label) VALUES (?, ?)")
            .bind((i + 1) as i64)
            .bind(label)
            .execute(pool)
            .await?;
    }

    for (i, label) in REGION_LABELS.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO regions (region_id, label) VALUES (?, ?)")
            .bind((i + 1) as i64)
            .bind(label)
            .execute(pool)
            .await?;
    }

    // Shared guest account; empty credentials can never pass verification
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO panelists (panelist_id, email, password_hash, password_salt)
        VALUES (?, ?, '', '')
        "#,
    )
    .bind(GUEST_PANELIST_ID)
    .bind(GUEST_EMAIL)
    .execute(pool)
    .await?;

    Ok(())
}
