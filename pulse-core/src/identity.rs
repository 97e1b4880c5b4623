//! Session identity values
//!
//! The web front end stores one token per logged-in browser session and
//! hands it back on every request. An [`Identity`] is the resolved form
//! of that token: a plain value carrying the demographics that matching
//! needs and the capability answers the session layer asks for.
//!
//! Tokens are the panelist id printed in decimal. Resolving a stale or
//! mangled token yields None rather than an error.

use crate::db::init::GUEST_PANELIST_ID;
use crate::db::models::Panelist;
use crate::db::panelists;
use crate::{Error, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Resolved session identity of a panelist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub panelist_id: i64,
    pub email: String,
    /// First name once details are in, email local part before that
    pub display_name: String,
    /// Whole years, None until a date of birth is stored
    pub age: Option<i64>,
    pub race_id: Option<i64>,
    pub gender_id: Option<i64>,
    pub region_id: Option<i64>,
    pub point_balance: i64,
    guest: bool,
}

impl Identity {
    /// Build an identity from a stored panelist row
    pub fn from_panelist(panelist: &Panelist) -> Self {
        let display_name = match &panelist.firstname {
            Some(name) => name.clone(),
            None => panelist
                .email
                .split('@')
                .next()
                .unwrap_or(&panelist.email)
                .to_string(),
        };

        Identity {
            panelist_id: panelist.panelist_id,
            email: panelist.email.clone(),
            display_name,
            age: panelist.dob.as_deref().and_then(calculate_age),
            race_id: panelist.race_id,
            gender_id: panelist.gender_id,
            region_id: panelist.region_id,
            point_balance: panelist.point_balance,
            guest: panelist.panelist_id == GUEST_PANELIST_ID,
        }
    }

    /// Every resolved identity is a live, signed-in account
    pub fn is_authenticated(&self) -> bool {
        true
    }

    pub fn is_active(&self) -> bool {
        true
    }

    pub fn is_anonymous(&self) -> bool {
        false
    }

    /// True only for the shared guest account
    pub fn is_guest(&self) -> bool {
        self.guest
    }

    /// Token stored by the session layer, the panelist id in decimal
    pub fn session_token(&self) -> String {
        self.panelist_id.to_string()
    }

    /// True when every field eligibility matching needs is present
    pub fn has_complete_demographics(&self) -> bool {
        self.age.is_some()
            && self.race_id.is_some()
            && self.gender_id.is_some()
            && self.region_id.is_some()
    }
}

/// Age reached during the given calendar year, from a YYYY-MM-DD date
/// of birth
///
/// Year precision only: birthdays within the year are ignored.
pub fn age_in_year(dob: &str, year: i32) -> Option<i64> {
    let birth_year: i32 = dob.get(0..4)?.parse().ok()?;
    Some(i64::from(year - birth_year))
}

/// Age reached during the current calendar year
pub fn calculate_age(dob: &str) -> Option<i64> {
    age_in_year(dob, Utc::now().year())
}

/// Resolve a session token back to an identity
///
/// Returns None for tokens that do not parse or no longer name a
/// stored panelist.
pub async fn identity_from_token(pool: &SqlitePool, token: &str) -> Result<Option<Identity>> {
    let panelist_id: i64 = match token.parse() {
        Ok(id) => id,
        Err(_) => return Ok(None),
    };

    Ok(panelists::get_panelist(pool, panelist_id)
        .await?
        .map(|panelist| Identity::from_panelist(&panelist)))
}

/// Identity of the seeded guest account
pub async fn guest_identity(pool: &SqlitePool) -> Result<Identity> {
    panelists::get_panelist(pool, GUEST_PANELIST_ID)
        .await?
        .map(|panelist| Identity::from_panelist(&panelist))
        .ok_or_else(|| Error::NotFound("guest panelist".to_string()))
}
