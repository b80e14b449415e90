//! Database migrations
//!
//! Migrations are embedded in the binary as SQL strings and applied in
//! version order at start-up. Applied versions are recorded in the
//! `_migrations` table, so running them again is a no-op.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::DynDatabasePool;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements, separated by `;`
    pub up: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(100) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                bio TEXT,
                display_name VARCHAR(100),
                custom_url VARCHAR(255),
                avatar VARCHAR(255),
                include_in_team_page BOOLEAN NOT NULL DEFAULT 0,
                requires_approval BOOLEAN NOT NULL DEFAULT 1,
                is_admin BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_team ON users(include_in_team_page);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_invitation_codes",
        up: r#"
            CREATE TABLE IF NOT EXISTS invitation_codes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code VARCHAR(50) NOT NULL UNIQUE,
                used BOOLEAN NOT NULL DEFAULT 0,
                expiration_date TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 4,
        name: "create_article_types",
        up: r#"
            CREATE TABLE IF NOT EXISTS article_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(50) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 5,
        name: "seed_article_types",
        up: r#"
            INSERT OR IGNORE INTO article_types (name) VALUES ('Banker''s Box');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Corporate');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Cyberwar');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Environmental');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Fascist');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Hack');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Leak');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Leak Markets');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Limited Distribution');
            INSERT OR IGNORE INTO article_types (name) VALUES ('News');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Opinion');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Organization');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Other');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Ransomware');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Researchers');
            INSERT OR IGNORE INTO article_types (name) VALUES ('Scrape');
        "#,
    },
    Migration {
        version: 6,
        name: "create_categories",
        up: r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(50) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 7,
        name: "create_articles",
        up: r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(100) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                content TEXT NOT NULL,
                author VARCHAR(100) NOT NULL,
                publish_date TIMESTAMP NOT NULL,
                last_edited TIMESTAMP,
                country VARCHAR(255),
                source VARCHAR(255),
                download_size BIGINT,
                pending_approval BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_articles_publish_date ON articles(publish_date);
            CREATE INDEX IF NOT EXISTS idx_articles_last_edited ON articles(last_edited);
            CREATE INDEX IF NOT EXISTS idx_articles_pending ON articles(pending_approval);
            CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author);
            CREATE INDEX IF NOT EXISTS idx_articles_source ON articles(source);
        "#,
    },
    Migration {
        version: 8,
        name: "create_article_links",
        up: r#"
            CREATE TABLE IF NOT EXISTS article_links (
                article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                kind VARCHAR(32) NOT NULL,
                position INTEGER NOT NULL,
                url VARCHAR(255) NOT NULL,
                PRIMARY KEY (article_id, kind, position)
            );
            CREATE INDEX IF NOT EXISTS idx_article_links_kind ON article_links(kind);
        "#,
    },
    Migration {
        version: 9,
        name: "create_article_associations",
        up: r#"
            CREATE TABLE IF NOT EXISTS article_article_types (
                article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                article_type_id INTEGER NOT NULL REFERENCES article_types(id) ON DELETE CASCADE,
                PRIMARY KEY (article_id, article_type_id)
            );
            CREATE INDEX IF NOT EXISTS idx_article_article_types_type ON article_article_types(article_type_id);
            CREATE TABLE IF NOT EXISTS article_categories (
                article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (article_id, category_id)
            );
            CREATE INDEX IF NOT EXISTS idx_article_categories_category ON article_categories(category_id);
        "#,
    },
];

/// Run all pending migrations, returning how many were applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    let sqlite = pool.as_sqlite();
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(sqlite).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(sqlite, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;
    Ok(())
}

async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows
        .iter()
        .map(|row| MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

/// Apply one migration and its bookkeeping row in a single transaction.
async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin migration")?;

    for statement in split_sql_statements(migration.up) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await
        .context("Failed to record migration")?;

    tx.commit().await.context("Failed to commit migration")?;
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a migration script on `;`, skipping blank and comment-only chunks.
/// Semicolons inside string literals are not supported.
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}
