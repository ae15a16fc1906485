use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::models::Company;

const CREATE_EMPRESAS: &str = r#"
    CREATE TABLE IF NOT EXISTS empresas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombre_empresa TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
"#;

/// Handle on the credential store.
///
/// The pool is capped at one connection that is never recycled, so every
/// request goes through the same SQLite handle for the lifetime of the process.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database named in the configuration
    pub async fn new(config: &Config) -> Result<Self> {
        Self::connect(config.database_url()).await
    }

    /// Open a database by URL, creating the file if it does not exist yet
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `empresas` table if it is missing
    pub async fn ensure_schema(&self) -> sqlx::Result<()> {
        sqlx::query(CREATE_EMPRESAS).execute(self.get_pool()).await?;

        Ok(())
    }

    pub async fn company_exists(&self, name: &str) -> sqlx::Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT nombre_empresa FROM empresas WHERE nombre_empresa = ?")
                .bind(name)
                .fetch_optional(self.get_pool())
                .await?;

        Ok(row.is_some())
    }

    /// Insert a company and return its row id
    pub async fn create_company(&self, name: &str, password_hash: &str) -> sqlx::Result<i64> {
        let result = sqlx::query("INSERT INTO empresas (nombre_empresa, password_hash) VALUES (?, ?)")
            .bind(name)
            .bind(password_hash)
            .execute(self.get_pool())
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_company(&self, name: &str) -> sqlx::Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, nombre_empresa, password_hash FROM empresas WHERE nombre_empresa = ?",
        )
        .bind(name)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(company)
    }

    /// Close the underlying connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Open the database and make sure the schema exists
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    info!("Connected to {}", config.database_url());

    db.ensure_schema().await?;
    info!("Table 'empresas' ready");

    Ok(db)
}

#[cfg(test)]
pub(crate) async fn memory() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.ensure_schema().await.unwrap();
    db
}
