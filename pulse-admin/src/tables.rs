//! Table listing and row counts

use anyhow::Result;
use sqlx::SqlitePool;

/// Name and row count of one table
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub name: String,
    pub row_count: i64,
}

/// List all tables with row counts
///
/// Returns tables in alphabetical order, excluding SQLite internal
/// tables.
pub async fn table_summaries(pool: &SqlitePool) -> Result<Vec<TableSummary>> {
    let tables = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::new();

    for (table_name,) in tables {
        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table_name))
            .fetch_one(pool)
            .await?;

        summaries.push(TableSummary {
            name: table_name,
            row_count,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_summaries_cover_pulse_schema() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        pulse_core::db::init::init_schema(&pool).await.unwrap();

        let summaries = table_summaries(&pool).await.unwrap();

        let expected_tables = [
            "answers",
            "genders",
            "panelists",
            "questions",
            "races",
            "regions",
            "survey_genders",
            "survey_races",
            "survey_regions",
            "surveys",
        ];
        for expected in &expected_tables {
            assert!(
                summaries.iter().any(|t| &t.name == expected),
                "Should have table: {}",
                expected
            );
        }

        // Alphabetical order
        for i in 1..summaries.len() {
            assert!(summaries[i - 1].name <= summaries[i].name);
        }

        // Seeded reference data is visible in the counts
        let races = summaries.iter().find(|t| t.name == "races").unwrap();
        assert_eq!(races.row_count, 6);
        let panelists = summaries.iter().find(|t| t.name == "panelists").unwrap();
        assert_eq!(panelists.row_count, 1);
    }
}
