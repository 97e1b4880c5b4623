//! Survey authoring and reading
//!
//! Authoring is a two-step flow. Publishing writes the survey header and
//! its targeting junctions in one transaction and returns the new id;
//! question sets are appended afterwards, one question plus up to four
//! answers per call. The read side rebuilds the nested structure the
//! display layer renders.

use crate::db::models::{Question, Survey};
use crate::db::taxonomy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

/// Categories a survey may be filed under
pub const SURVEY_CATEGORIES: &[&str] = &[
    "General Survey",
    "Health and Wellness",
    "Finance",
    "Travel and Lodging",
    "Utilities",
    "Real Estate",
    "Technology",
    "TV and Media",
    "Food and Beverage",
    "Sports and Entertainment",
    "Education",
];

/// Fixed number of answer slots on the question form
pub const ANSWER_SLOTS: usize = 4;

const TITLE_MIN: usize = 6;
const TITLE_MAX: usize = 35;
const DESCRIPTION_MIN: usize = 6;
const DESCRIPTION_MAX: usize = 35;
const SAMPLE_SIZE_MIN: i64 = 1;
const SAMPLE_SIZE_MAX: i64 = 500;
const TARGET_AGE_MIN: i64 = 18;
const TARGET_AGE_MAX: i64 = 65;

/// Survey header fields captured by the publishing form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyHeader {
    pub category: String,
    pub title: String,
    pub description: String,
    pub sample_size: i64,
    pub min_age: i64,
    pub max_age: i64,
}

/// Targeting selections, at least one id per facet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyTargeting {
    pub races: Vec<i64>,
    pub genders: Vec<i64>,
    pub regions: Vec<i64>,
}

/// Publish a survey header with its targeting
///
/// Validates everything before writing, then inserts the header row and
/// all junction rows in one transaction. Returns the new survey id.
pub async fn create_survey(
    pool: &SqlitePool,
    publisher: i64,
    header: &SurveyHeader,
    targeting: &SurveyTargeting,
) -> Result<i64> {
    validate_header(header)?;
    validate_targeting(pool, targeting).await?;

    let publisher_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM panelists WHERE panelist_id = ?)")
            .bind(publisher)
            .fetch_one(pool)
            .await?;
    if !publisher_exists {
        return Err(Error::NotFound(format!("panelist {}", publisher)));
    }

    let mut tx = pool.begin().await?;

    let survey_id = sqlx::query(
        r#"
        INSERT INTO surveys (publisher, category, title, description, sample_size, min_age, max_age)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(publisher)
    .bind(&header.category)
    .bind(&header.title)
    .bind(&header.description)
    .bind(header.sample_size)
    .bind(header.min_age)
    .bind(header.max_age)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    // OR IGNORE collapses repeated selections of the same id
    for &race_id in &targeting.races {
        sqlx::query("INSERT OR IGNORE INTO survey_races (survey_id, race_id) VALUES (?, ?)")
            .bind(survey_id)
            .bind(race_id)
            .execute(&mut *tx)
            .await?;
    }
    for &gender_id in &targeting.genders {
        sqlx::query("INSERT OR IGNORE INTO survey_genders (survey_id, gender_id) VALUES (?, ?)")
            .bind(survey_id)
            .bind(gender_id)
            .execute(&mut *tx)
            .await?;
    }
    for &region_id in &targeting.regions {
        sqlx::query("INSERT OR IGNORE INTO survey_regions (survey_id, region_id) VALUES (?, ?)")
            .bind(survey_id)
            .bind(region_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Published survey {} by panelist {}", survey_id, publisher);
    Ok(survey_id)
}

/// Append one question with its answer options to a survey
///
/// Blank answer slots are skipped; the remaining options keep their slot
/// order. Returns the new question id. The same question text may be
/// added more than once.
pub async fn add_question(
    pool: &SqlitePool,
    survey_id: i64,
    question: &str,
    answers: &[String; ANSWER_SLOTS],
) -> Result<i64> {
    if question.trim().is_empty() {
        return Err(Error::Validation("question text must not be blank".to_string()));
    }

    let mut tx = pool.begin().await?;

    let survey_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM surveys WHERE survey_id = ?)")
            .bind(survey_id)
            .fetch_one(&mut *tx)
            .await?;
    if !survey_exists {
        return Err(Error::NotFound(format!("survey {}", survey_id)));
    }

    let question_id = sqlx::query("INSERT INTO questions (parent_survey, question) VALUES (?, ?)")
        .bind(survey_id)
        .bind(question)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for answer in answers.iter().filter(|answer| !answer.trim().is_empty()) {
        sqlx::query("INSERT INTO answers (parent_question, answer) VALUES (?, ?)")
            .bind(question_id)
            .bind(answer)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    debug!("Appended question {} to survey {}", question_id, survey_id);
    Ok(question_id)
}

/// Fetch a survey header, None when the id is unknown
pub async fn get_survey_details(pool: &SqlitePool, survey_id: i64) -> Result<Option<Survey>> {
    let row = sqlx::query(
        r#"
        SELECT survey_id, publisher, category, title, description,
               sample_size, min_age, max_age, create_date
        FROM surveys WHERE survey_id = ?
        "#,
    )
    .bind(survey_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| survey_from_row(&row)))
}

/// Questions of a survey in insertion order
pub async fn get_survey_questions(pool: &SqlitePool, survey_id: i64) -> Result<Vec<Question>> {
    let rows = sqlx::query(
        r#"
        SELECT question_id, parent_survey, question
        FROM questions
        WHERE parent_survey = ?
        ORDER BY question_id
        "#,
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Question {
            question_id: row.get("question_id"),
            parent_survey: row.get("parent_survey"),
            question: row.get("question"),
        })
        .collect())
}

/// Answer options for each of the given questions, keyed by question id
///
/// Options keep their stored order. A question with no stored answers
/// maps to an empty list.
pub async fn build_answer_index(
    pool: &SqlitePool,
    questions: &[Question],
) -> Result<HashMap<i64, Vec<String>>> {
    let mut index = HashMap::with_capacity(questions.len());

    for question in questions {
        let answers: Vec<String> = sqlx::query_scalar(
            "SELECT answer FROM answers WHERE parent_question = ? ORDER BY answer_id",
        )
        .bind(question.question_id)
        .fetch_all(pool)
        .await?;
        index.insert(question.question_id, answers);
    }

    Ok(index)
}

/// Targeting ids of a survey, each facet in id order
pub async fn get_survey_targeting(pool: &SqlitePool, survey_id: i64) -> Result<SurveyTargeting> {
    let survey_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM surveys WHERE survey_id = ?)")
            .bind(survey_id)
            .fetch_one(pool)
            .await?;
    if !survey_exists {
        return Err(Error::NotFound(format!("survey {}", survey_id)));
    }

    let races: Vec<i64> =
        sqlx::query_scalar("SELECT race_id FROM survey_races WHERE survey_id = ? ORDER BY race_id")
            .bind(survey_id)
            .fetch_all(pool)
            .await?;
    let genders: Vec<i64> = sqlx::query_scalar(
        "SELECT gender_id FROM survey_genders WHERE survey_id = ? ORDER BY gender_id",
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await?;
    let regions: Vec<i64> = sqlx::query_scalar(
        "SELECT region_id FROM survey_regions WHERE survey_id = ? ORDER BY region_id",
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await?;

    Ok(SurveyTargeting {
        races,
        genders,
        regions,
    })
}

/// Sort orders for the survey browse page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveySort {
    Newest,
    Oldest,
    Unsorted,
}

/// All published surveys
///
/// Newest and Oldest order by publish time with the survey id breaking
/// ties from the same second.
pub async fn list_surveys(pool: &SqlitePool, sort: SurveySort) -> Result<Vec<Survey>> {
    let sql = match sort {
        SurveySort::Newest => {
            "SELECT survey_id, publisher, category, title, description, \
             sample_size, min_age, max_age, create_date \
             FROM surveys ORDER BY create_date DESC, survey_id DESC"
        }
        SurveySort::Oldest => {
            "SELECT survey_id, publisher, category, title, description, \
             sample_size, min_age, max_age, create_date \
             FROM surveys ORDER BY create_date ASC, survey_id ASC"
        }
        SurveySort::Unsorted => {
            "SELECT survey_id, publisher, category, title, description, \
             sample_size, min_age, max_age, create_date \
             FROM surveys"
        }
    };

    let rows = sqlx::query(sql).fetch_all(pool).await?;
    Ok(rows.iter().map(survey_from_row).collect())
}

/// Surveys published by one panelist, newest first
pub async fn surveys_by_publisher(pool: &SqlitePool, publisher: i64) -> Result<Vec<Survey>> {
    let rows = sqlx::query(
        r#"
        SELECT survey_id, publisher, category, title, description,
               sample_size, min_age, max_age, create_date
        FROM surveys
        WHERE publisher = ?
        ORDER BY create_date DESC, survey_id DESC
        "#,
    )
    .bind(publisher)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(survey_from_row).collect())
}

pub(crate) fn survey_from_row(row: &SqliteRow) -> Survey {
    Survey {
        survey_id: row.get("survey_id"),
        publisher: row.get("publisher"),
        category: row.get("category"),
        title: row.get("title"),
        description: row.get("description"),
        sample_size: row.get("sample_size"),
        min_age: row.get("min_age"),
        max_age: row.get("max_age"),
        create_date: row.get("create_date"),
    }
}

fn validate_header(header: &SurveyHeader) -> Result<()> {
    if !SURVEY_CATEGORIES.contains(&header.category.as_str()) {
        return Err(Error::Validation(format!(
            "unknown category '{}'",
            header.category
        )));
    }

    let title_len = header.title.chars().count();
    if title_len < TITLE_MIN || title_len > TITLE_MAX {
        return Err(Error::Validation(format!(
            "title must be {} to {} characters",
            TITLE_MIN, TITLE_MAX
        )));
    }

    let description_len = header.description.chars().count();
    if description_len < DESCRIPTION_MIN || description_len > DESCRIPTION_MAX {
        return Err(Error::Validation(format!(
            "description must be {} to {} characters",
            DESCRIPTION_MIN, DESCRIPTION_MAX
        )));
    }

    if header.sample_size < SAMPLE_SIZE_MIN || header.sample_size > SAMPLE_SIZE_MAX {
        return Err(Error::Validation(format!(
            "sample size must be {} to {}",
            SAMPLE_SIZE_MIN, SAMPLE_SIZE_MAX
        )));
    }

    if header.min_age < TARGET_AGE_MIN || header.max_age > TARGET_AGE_MAX {
        return Err(Error::Validation(format!(
            "target ages must be within {} to {}",
            TARGET_AGE_MIN, TARGET_AGE_MAX
        )));
    }
    if header.min_age > header.max_age {
        return Err(Error::Validation(
            "minimum age must not exceed maximum age".to_string(),
        ));
    }

    Ok(())
}

async fn validate_targeting(pool: &SqlitePool, targeting: &SurveyTargeting) -> Result<()> {
    if targeting.races.is_empty() || targeting.genders.is_empty() || targeting.regions.is_empty() {
        return Err(Error::Validation(
            "each targeting facet needs at least one selection".to_string(),
        ));
    }

    for &race_id in &targeting.races {
        if !taxonomy::race_exists(pool, race_id).await? {
            return Err(Error::Validation(format!("unknown race id {}", race_id)));
        }
    }
    for &gender_id in &targeting.genders {
        if !taxonomy::gender_exists(pool, gender_id).await? {
            return Err(Error::Validation(format!("unknown gender id {}", gender_id)));
        }
    }
    for &region_id in &targeting.regions {
        if !taxonomy::region_exists(pool, region_id).await? {
            return Err(Error::Validation(format!("unknown region id {}", region_id)));
        }
    }

    Ok(())
}
