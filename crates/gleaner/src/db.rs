//! Database connection utilities.
//!
//! Connections are constructed by the hosting process (CLI, scheduled job,
//! test harness) and passed down to the pipeline by reference. There is no
//! module-level pool: the host owns the handle and is responsible for calling
//! [`sea_orm::DatabaseConnection::close`] on the way out.

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Configure SQLite-specific pragmas for better concurrency.
///
/// Production deployments run against Postgres; SQLite is used for local
/// databases and the test suites. WAL mode plus a busy timeout keeps
/// concurrent upserts from failing immediately on lock contention.
async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm::{ConnectionTrait, Statement};

    for pragma in [
        "PRAGMA journal_mode=WAL",
        "PRAGMA busy_timeout=5000",
        "PRAGMA synchronous=NORMAL",
    ] {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            pragma.to_string(),
        ))
        .await?;
    }

    Ok(())
}

/// Establish a connection to the database.
///
/// # Arguments
/// * `database_url` - Connection string (`postgres://...` or `sqlite://...`)
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if database_url.starts_with("sqlite:") {
        configure_sqlite(&db).await?;
    }

    Ok(db)
}

/// Establish a connection to the database and run all pending migrations.
///
/// This is the recommended way to initialize the database before a refresh
/// run: it ensures the schema (and the metadata singleton) exist.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established or migrations fail.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_returns_error_for_invalid_database_url() {
        let err = connect("this-is-not-a-db-url")
            .await
            .expect_err("invalid URL should error");
        let msg = err.to_string().to_ascii_lowercase();
        assert!(
            msg.contains("error") || msg.contains("invalid"),
            "unexpected error message: {err}"
        );
    }

    #[tokio::test]
    async fn connect_and_migrate_creates_schema() {
        use sea_orm::EntityTrait;

        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("in-memory database should migrate");

        // The metadata singleton is seeded by migration.
        let row = crate::entity::prelude::Metadata::find()
            .one(&db)
            .await
            .expect("metadata query should succeed");
        assert!(row.is_some());
    }
}
