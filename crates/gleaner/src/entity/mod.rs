//! SeaORM entity definitions for the gleaner database schema.

pub mod issue;
pub mod issue_label;
pub mod issue_state;
pub mod label;
pub mod metadata;
pub mod prelude;
pub mod refresh_status;
pub mod repository;
