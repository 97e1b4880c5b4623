//! Survey eligibility matching
//!
//! A panelist is eligible for a survey when their race, gender, and
//! region each appear in the survey's targeting junctions and their age
//! falls inside the survey's inclusive age range. All four conditions
//! must hold at once.

use crate::db::models::Survey;
use crate::db::surveys::survey_from_row;
use crate::identity::Identity;
use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

// For a fixed demographic id each junction matches at most one row per
// survey, so the join never duplicates a survey
const ELIGIBLE_SQL: &str = r#"
SELECT s.survey_id, s.publisher, s.category, s.title, s.description,
       s.sample_size, s.min_age, s.max_age, s.create_date
FROM surveys s
INNER JOIN survey_races r ON r.survey_id = s.survey_id
INNER JOIN survey_genders g ON g.survey_id = s.survey_id
INNER JOIN survey_regions n ON n.survey_id = s.survey_id
WHERE r.race_id = ?
  AND g.gender_id = ?
  AND n.region_id = ?
  AND s.min_age <= ?
  AND s.max_age >= ?
"#;

/// All surveys the identity is eligible for
///
/// An identity with any demographic field missing is eligible for
/// nothing and gets an empty list, never an error.
pub async fn eligible_surveys(pool: &SqlitePool, identity: &Identity) -> Result<Vec<Survey>> {
    let (race_id, gender_id, region_id, age) = match demographic_key(identity) {
        Some(key) => key,
        None => {
            debug!(
                "Panelist {} has an incomplete profile, no eligible surveys",
                identity.panelist_id
            );
            return Ok(Vec::new());
        }
    };

    let rows = sqlx::query(ELIGIBLE_SQL)
        .bind(race_id)
        .bind(gender_id)
        .bind(region_id)
        .bind(age)
        .bind(age)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(survey_from_row).collect())
}

/// The newest eligible surveys, at most `limit` of them
pub async fn eligible_surveys_limit(
    pool: &SqlitePool,
    identity: &Identity,
    limit: i64,
) -> Result<Vec<Survey>> {
    let (race_id, gender_id, region_id, age) = match demographic_key(identity) {
        Some(key) => key,
        None => return Ok(Vec::new()),
    };

    let sql = format!(
        "{} ORDER BY s.create_date DESC, s.survey_id DESC LIMIT ?",
        ELIGIBLE_SQL
    );
    let rows = sqlx::query(&sql)
        .bind(race_id)
        .bind(gender_id)
        .bind(region_id)
        .bind(age)
        .bind(age)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(survey_from_row).collect())
}

fn demographic_key(identity: &Identity) -> Option<(i64, i64, i64, i64)> {
    Some((
        identity.race_id?,
        identity.gender_id?,
        identity.region_id?,
        identity.age?,
    ))
}
