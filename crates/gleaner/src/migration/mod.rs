//! Database migrations for the gleaner schema.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_schema;
mod m20250601_000002_seed_metadata;

/// The migrator that runs all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_schema::Migration),
            Box::new(m20250601_000002_seed_metadata::Migration),
        ]
    }

    fn migration_table_name() -> SeaRc<dyn Iden> {
        SeaRc::new(Alias::new("gleaner_migrations"))
    }
}
