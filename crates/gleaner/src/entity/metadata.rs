//! Metadata entity - singleton row tracking the last refresh operation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::refresh_status::RefreshStatus;

/// Metadata model. The table holds exactly one row, seeded by migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metadata")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// When a refresh operation last wrote this row.
    pub last_refresh: DateTimeWithTimeZone,
    /// Status of the most recent operation.
    pub status: RefreshStatus,
    /// Error detail from the most recent operation: a JSON array of per-item
    /// errors for partial failures, or a bare message for operation-level
    /// failures. Null after a clean run.
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
