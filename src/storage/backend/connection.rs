use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{LinkcoreError, Result};
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite 数据库（不存在时自动创建）
///
/// `call_timeout` doubles as the busy timeout, so a locked database waits
/// no longer than any other store call would.
pub async fn connect_sqlite(database_url: &str, call_timeout: Duration) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkcoreError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        // WAL 让清理任务的删除不阻塞解析读
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(call_timeout);

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        LinkcoreError::store_unavailable(format!("Failed to open SQLite database: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL/PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    pool_size: u32,
    call_timeout: Duration,
) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size.max(1))
        .min_connections(1)
        .connect_timeout(call_timeout)
        // 等连接的时间也算在单次调用超时里
        .acquire_timeout(call_timeout)
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkcoreError::store_unavailable(format!(
            "Failed to connect to {} store: {}",
            backend_name, e
        ))
    })
}

/// 建表和索引
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinkcoreError::store_unavailable(format!("Migration failed: {}", e)))?;

    info!("Store schema is up to date");
    Ok(())
}
