//! Label entity - labels are shared across issues and keyed by name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Label model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "labels")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Label name (unique natural key).
    pub name: String,
    /// Display color as a hex string without the leading `#`.
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue_label::Entity")]
    IssueLabel,
}

impl Related<super::issue_label::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssueLabel.def()
    }
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        super::issue_label::Relation::Issue.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::issue_label::Relation::Label.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
