use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url);
    opts.sqlx_logging(false);
    if database_url.contains(":memory:") {
        // Every pooled connection would get its own empty in-memory database.
        opts.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opts).await?;

    if !database_url.contains(":memory:") {
        pragma(&db, "PRAGMA journal_mode=WAL").await?;
        pragma(&db, "PRAGMA synchronous=NORMAL").await?;
    }

    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn pragma(db: &DatabaseConnection, sql: &str) -> AppResult<()> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string())).await?;
    Ok(())
}
