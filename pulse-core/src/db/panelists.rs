//! Panelist account operations
//!
//! Accounts are created in two steps: registration stores the email and
//! salted password hash, then a separate details submission fills in the
//! demographic columns that eligibility matching needs.

use crate::credentials;
use crate::db::models::Panelist;
use crate::db::taxonomy;
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const EMAIL_MIN: usize = 6;
const EMAIL_MAX: usize = 35;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 35;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 35;

/// Demographic details submitted after registration
#[derive(Debug, Clone)]
pub struct PanelistDetails {
    pub firstname: String,
    pub lastname: String,
    /// Date of birth, YYYY-MM-DD
    pub dob: String,
    pub race_id: i64,
    pub gender_id: i64,
    pub region_id: i64,
}

/// Register a new panelist account
///
/// Returns the id of the inserted row. The email must not belong to an
/// existing account.
pub async fn register_panelist(pool: &SqlitePool, email: &str, password: &str) -> Result<i64> {
    validate_registration(email, password)?;

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM panelists WHERE email = ?)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(Error::DuplicateRegistration(email.to_string()));
    }

    let salt = credentials::generate_salt();
    let hash = credentials::hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO panelists (email, password_hash, password_salt) VALUES (?, ?, ?)",
    )
    .bind(email)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await;

    // A concurrent registration can slip past the check above; the UNIQUE
    // constraint reports it the same way
    let query_result = match result {
        Ok(r) => r,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(Error::DuplicateRegistration(email.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let panelist_id = query_result.last_insert_rowid();
    info!("Registered panelist {}", panelist_id);

    Ok(panelist_id)
}

/// Fill in or replace the demographic details of a registered account
///
/// Submitting again overwrites the previous details.
pub async fn complete_details(
    pool: &SqlitePool,
    email: &str,
    details: &PanelistDetails,
) -> Result<()> {
    validate_details(pool, details).await?;

    let result = sqlx::query(
        r#"
        UPDATE panelists
        SET firstname = ?, lastname = ?, dob = ?, race_id = ?, gender_id = ?, region_id = ?
        WHERE email = ?
        "#,
    )
    .bind(&details.firstname)
    .bind(&details.lastname)
    .bind(&details.dob)
    .bind(details.race_id)
    .bind(details.gender_id)
    .bind(details.region_id)
    .bind(email)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("panelist with email {}", email)));
    }

    debug!("Stored demographic details for {}", email);
    Ok(())
}

/// Check login credentials and return the matching account
///
/// Unknown email and wrong password both map to InvalidCredentials.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Panelist> {
    let row = sqlx::query(
        r#"
        SELECT panelist_id, email, password_hash, password_salt, firstname, lastname,
               dob, race_id, gender_id, region_id, point_balance, created_at
        FROM panelists WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let panelist = match row {
        Some(row) => panelist_from_row(&row),
        None => return Err(Error::InvalidCredentials),
    };

    if !credentials::verify_password(password, &panelist.password_salt, &panelist.password_hash) {
        return Err(Error::InvalidCredentials);
    }

    debug!("Verified credentials for panelist {}", panelist.panelist_id);
    Ok(panelist)
}

/// Fetch a panelist by id
pub async fn get_panelist(pool: &SqlitePool, panelist_id: i64) -> Result<Option<Panelist>> {
    let row = sqlx::query(
        r#"
        SELECT panelist_id, email, password_hash, password_salt, firstname, lastname,
               dob, race_id, gender_id, region_id, point_balance, created_at
        FROM panelists WHERE panelist_id = ?
        "#,
    )
    .bind(panelist_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| panelist_from_row(&row)))
}

/// Fetch a panelist by email
pub async fn get_panelist_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Panelist>> {
    let row = sqlx::query(
        r#"
        SELECT panelist_id, email, password_hash, password_salt, firstname, lastname,
               dob, race_id, gender_id, region_id, point_balance, created_at
        FROM panelists WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| panelist_from_row(&row)))
}

/// Add a signed delta to a panelist's point balance, returning the new balance
pub async fn adjust_point_balance(
    pool: &SqlitePool,
    panelist_id: i64,
    delta: i64,
) -> Result<i64> {
    let balance: Option<i64> = sqlx::query_scalar(
        "UPDATE panelists SET point_balance = point_balance + ? WHERE panelist_id = ? RETURNING point_balance",
    )
    .bind(delta)
    .bind(panelist_id)
    .fetch_optional(pool)
    .await?;

    balance.ok_or_else(|| Error::NotFound(format!("panelist {}", panelist_id)))
}

fn validate_registration(email: &str, password: &str) -> Result<()> {
    let email_len = email.chars().count();
    if email_len < EMAIL_MIN || email_len > EMAIL_MAX {
        return Err(Error::Validation(format!(
            "email must be {} to {} characters",
            EMAIL_MIN, EMAIL_MAX
        )));
    }
    if !email.contains('@') {
        return Err(Error::Validation("email must contain '@'".to_string()));
    }

    let password_len = password.chars().count();
    if password_len < PASSWORD_MIN || password_len > PASSWORD_MAX {
        return Err(Error::Validation(format!(
            "password must be {} to {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }

    Ok(())
}

async fn validate_details(pool: &SqlitePool, details: &PanelistDetails) -> Result<()> {
    let firstname_len = details.firstname.chars().count();
    if firstname_len < NAME_MIN || firstname_len > NAME_MAX {
        return Err(Error::Validation(format!(
            "first name must be {} to {} characters",
            NAME_MIN, NAME_MAX
        )));
    }

    let lastname_len = details.lastname.chars().count();
    if lastname_len < NAME_MIN || lastname_len > NAME_MAX {
        return Err(Error::Validation(format!(
            "last name must be {} to {} characters",
            NAME_MIN, NAME_MAX
        )));
    }

    if NaiveDate::parse_from_str(&details.dob, "%Y-%m-%d").is_err() {
        return Err(Error::Validation(
            "date of birth must be a valid YYYY-MM-DD date".to_string(),
        ));
    }

    if !taxonomy::race_exists(pool, details.race_id).await? {
        return Err(Error::Validation(format!(
            "unknown race id {}",
            details.race_id
        )));
    }
    if !taxonomy::gender_exists(pool, details.gender_id).await? {
        return Err(Error::Validation(format!(
            "unknown gender id {}",
            details.gender_id
        )));
    }
    if !taxonomy::region_exists(pool, details.region_id).await? {
        return Err(Error::Validation(format!(
            "unknown region id {}",
            details.region_id
        )));
    }

    Ok(())
}

fn panelist_from_row(row: &SqliteRow) -> Panelist {
    Panelist {
        panelist_id: row.get("panelist_id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        dob: row.get("dob"),
        race_id: row.get("race_id"),
        gender_id: row.get("gender_id"),
        region_id: row.get("region_id"),
        point_balance: row.get("point_balance"),
        created_at: row.get("created_at"),
    }
}
