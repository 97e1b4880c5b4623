//! Taxonomy lookup queries
//!
//! The races, genders, and regions tables are closed vocabularies seeded
//! at init time. Surveys and panelists both reference them by id.

use crate::db::models::TaxonomyEntry;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// All race choices in id order
pub async fn all_races(pool: &SqlitePool) -> Result<Vec<TaxonomyEntry>> {
    let rows = sqlx::query("SELECT race_id, label FROM races ORDER BY race_id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| TaxonomyEntry {
            id: row.get("race_id"),
            label: row.get("label"),
        })
        .collect())
}

/// All gender choices in id order
pub async fn all_genders(pool: &SqlitePool) -> Result<Vec<TaxonomyEntry>> {
    let rows = sqlx::query("SELECT gender_id, label FROM genders ORDER BY gender_id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| TaxonomyEntry {
            id: row.get("gender_id"),
            label: row.get("label"),
        })
        .collect())
}

/// All region choices in id order
pub async fn all_regions(pool: &SqlitePool) -> Result<Vec<TaxonomyEntry>> {
    let rows = sqlx::query("SELECT region_id, label FROM regions ORDER BY region_id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| TaxonomyEntry {
            id: row.get("region_id"),
            label: row.get("label"),
        })
        .collect())
}

pub async fn race_exists(pool: &SqlitePool, race_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM races WHERE race_id = ?)")
        .bind(race_id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn gender_exists(pool: &SqlitePool, gender_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genders WHERE gender_id = ?)")
            .bind(gender_id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn region_exists(pool: &SqlitePool, region_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM regions WHERE region_id = ?)")
            .bind(region_id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Label for a race id, None when the id is not seeded
pub async fn race_label(pool: &SqlitePool, race_id: i64) -> Result<Option<String>> {
    let label = sqlx::query_scalar("SELECT label FROM races WHERE race_id = ?")
        .bind(race_id)
        .fetch_optional(pool)
        .await?;
    Ok(label)
}

/// Label for a gender id, None when the id is not seeded
pub async fn gender_label(pool: &SqlitePool, gender_id: i64) -> Result<Option<String>> {
    let label = sqlx::query_scalar("SELECT label FROM genders WHERE gender_id = ?")
        .bind(gender_id)
        .fetch_optional(pool)
        .await?;
    Ok(label)
}

/// Label for a region id, None when the id is not seeded
pub async fn region_label(pool: &SqlitePool, region_id: i64) -> Result<Option<String>> {
    let label = sqlx::query_scalar("SELECT label FROM regions WHERE region_id = ?")
        .bind(region_id)
        .fetch_optional(pool)
        .await?;
    Ok(label)
}
