//! Repository entity - a GitHub repository that owns harvested issues.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Repository model - one row per GitHub repository seen by ingestion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    /// Internal UUID primary key; the join key used by issues.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// GitHub's numeric repository ID (unique natural key).
    pub github_id: i64,
    /// Repository name (URL-safe slug).
    pub name: String,
    /// Owner-qualified name, e.g. `rust-lang/rust`.
    pub full_name: String,
    /// Web URL of the repository.
    #[sea_orm(column_type = "Text")]
    pub html_url: String,

    // ─── Statistics ──────────────────────────────────────────────────────────
    /// Star count at last refresh.
    pub stargazers_count: i32,
    /// Fork count at last refresh.
    pub forks_count: i32,
    /// Watcher count at last refresh.
    pub watchers_count: i32,

    // ─── Languages ───────────────────────────────────────────────────────────
    /// Primary programming language.
    pub language: Option<String>,
    /// All languages in the repository (deduplicated, stored as a JSON array
    /// for cross-database compatibility).
    #[sea_orm(column_type = "Json")]
    pub languages: Json,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    /// When the repository was created on GitHub.
    pub created_at: Option<DateTimeWithTimeZone>,
    /// When the repository was last updated on GitHub.
    pub updated_at: Option<DateTimeWithTimeZone>,
    /// When this record was last written by ingestion.
    pub last_refreshed: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A repository owns many issues.
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The language list as plain strings.
    ///
    /// Non-string array members (which ingestion never writes) are skipped.
    pub fn language_list(&self) -> Vec<String> {
        self.languages
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_language_list() {
        let model = Model {
            id: Uuid::new_v4(),
            github_id: 42,
            name: "hello-world".to_string(),
            full_name: "octocat/hello-world".to_string(),
            html_url: "https://github.com/octocat/hello-world".to_string(),
            stargazers_count: 1200,
            forks_count: 80,
            watchers_count: 1200,
            language: Some("Rust".to_string()),
            languages: serde_json::json!(["Rust", "Shell"]),
            created_at: None,
            updated_at: None,
            last_refreshed: Utc::now().fixed_offset(),
        };
        assert_eq!(model.language_list(), vec!["Rust", "Shell"]);
    }

    #[test]
    fn test_language_list_empty_for_non_array() {
        let model = Model {
            id: Uuid::new_v4(),
            github_id: 42,
            name: "n".to_string(),
            full_name: "o/n".to_string(),
            html_url: String::new(),
            stargazers_count: 0,
            forks_count: 0,
            watchers_count: 0,
            language: None,
            languages: serde_json::json!({}),
            created_at: None,
            updated_at: None,
            last_refreshed: Utc::now().fixed_offset(),
        };
        assert!(model.language_list().is_empty());
    }
}
