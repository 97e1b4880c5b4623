//! Database models

use serde::{Deserialize, Serialize};

/// Stored panelist account
///
/// `firstname` through `region_id` stay NULL until the panelist submits
/// their demographic details; eligibility matching needs all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panelist {
    pub panelist_id: i64,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub dob: Option<String>,
    pub race_id: Option<i64>,
    pub gender_id: Option<i64>,
    pub region_id: Option<i64>,
    pub point_balance: i64,
    pub created_at: String,
}

/// Survey header as published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub survey_id: i64,
    pub publisher: i64,
    pub category: String,
    pub title: String,
    pub description: String,
    pub sample_size: i64,
    pub min_age: i64,
    pub max_age: i64,
    pub create_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub parent_survey: i64,
    pub question: String,
}

/// One row of a races/genders/regions lookup table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: i64,
    pub label: String,
}
