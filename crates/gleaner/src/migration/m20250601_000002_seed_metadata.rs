//! Seed migration to insert the metadata singleton.
//!
//! The row starts in the `initialized` status so a freshly migrated database
//! reports a meaningful state before any refresh has run.
//!
//! Uses a fixed UUID for idempotency across installations.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Fixed UUID for the metadata singleton.
const METADATA_ROW_ID: &str = "5d1f7a2b-9c4e-4b3a-8f6d-0e2c1a3b4d5e";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let sql = format!(
            r#"INSERT INTO metadata (id, last_refresh, status, error)
               VALUES ('{}', CURRENT_TIMESTAMP, 'initialized', NULL)
               ON CONFLICT (id) DO NOTHING"#,
            METADATA_ROW_ID
        );
        db.execute_unprepared(&sql).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let sql = format!("DELETE FROM metadata WHERE id = '{}'", METADATA_ROW_ID);
        db.execute_unprepared(&sql).await?;

        Ok(())
    }
}
