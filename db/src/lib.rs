#[macro_use]
extern crate diesel;

mod schema;

pub mod admins;
pub mod joins;
pub mod object_id;
pub mod teams;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type Pool = deadpool_diesel::sqlite::Pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, impl std::error::Error> {
    let manager = deadpool_diesel::sqlite::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::Pool::builder(manager)
        .max_size(max_connections)
        .build()
}

/// Apply pending migrations on one pooled connection, before the server
/// starts taking requests. Also switches the database file to WAL so
/// readers don't block the writer.
pub async fn run_migrations(pool: &Pool) -> Result<(), anyhow::Error> {
    let conn = pool.get().await?;
    conn.interact(|conn| -> Result<(), anyhow::Error> {
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Applying migrations: {e}"))?;
        Ok(())
    })
    .await
    .map_err(|e| anyhow::anyhow!("Migration task failed: {e}"))??;

    Ok(())
}

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}

#[async_trait]
pub trait PoolExt<F, RETVAL, ERR>
where
    F: (FnOnce(&mut SqliteConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR>;
    async fn transaction(&self, f: F) -> Result<RETVAL, ERR>;
}

#[async_trait]
impl<F, RETVAL, ERR> PoolExt<F, RETVAL, ERR> for Pool
where
    F: (FnOnce(&mut SqliteConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: From<diesel::result::Error> + From<deadpool_diesel::PoolError> + Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        let result = conn.interact(move |conn| f(conn)).await.unwrap()?;
        Ok(result)
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        let result = conn
            .interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await
            .unwrap()?;
        Ok(result)
    }
}
