//! Database models and queries

pub mod eligibility;
pub mod init;
pub mod models;
pub mod panelists;
pub mod surveys;
pub mod taxonomy;

pub use eligibility::*;
pub use init::*;
pub use models::*;
pub use panelists::*;
pub use surveys::*;
pub use taxonomy::*;
