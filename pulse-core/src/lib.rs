//! # Pulse Core Library
//!
//! Shared code for the Pulse survey panel platform including:
//! - Database schema, seeding, and queries
//! - Panelist registration and credential checks
//! - Survey authoring (header, targeting, question sets)
//! - Eligibility matching between panelists and surveys
//! - Session identity values consumed by the web front end

pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod identity;

pub use error::{Error, Result};
pub use identity::Identity;
