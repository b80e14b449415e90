//! Article repository
//!
//! Database operations for articles.
//!
//! This module provides:
//! - `ArticleRepository` trait defining the interface for article data access
//! - `SqlxArticleRepository` implementing the trait for SQLite
//! - `ArticleFilter` / `ArticleOrder` describing the public listings
//!
//! An article row is stored together with its links and its type and
//! category associations; all of them are written in one transaction.

use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleLinks, ArticleType, Category, LinkKind, NewArticle};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which articles a listing selects.
///
/// Every filter except `Pending` only matches approved articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    /// Every article, pending included
    All,
    /// All approved articles
    Approved,
    /// Articles waiting for moderation
    Pending,
    /// Approved articles that have been edited at least once
    Edited,
    /// Approved articles with an external collaboration link
    ExternalCollaboration,
    /// Exact source match
    Source(String),
    /// Country substring match
    Country(String),
    /// Exact author username
    Author(String),
    /// Articles carrying the named type
    Type(String),
}

/// Sort order of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOrder {
    /// Newest publish date first
    Newest,
    /// Most recent edit first
    RecentlyEdited,
    /// Title, case-insensitive A-Z
    Title,
    /// Insertion order, oldest id first
    Inserted,
}

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert an article with its links and associations
    async fn create(&self, record: &NewArticle) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Get article by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Replace every stored field of an article
    async fn update(&self, id: i64, record: &NewArticle) -> Result<Article>;

    /// Delete an article; links and associations cascade
    async fn delete(&self, id: i64) -> Result<()>;

    /// Set or clear the pending approval flag
    async fn set_pending(&self, id: i64, pending: bool) -> Result<()>;

    /// List articles; `page` is `(offset, limit)`, `None` returns all matches
    async fn list(
        &self,
        filter: &ArticleFilter,
        order: ArticleOrder,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<Article>>;

    /// Count articles matching a filter
    async fn count(&self, filter: &ArticleFilter) -> Result<i64>;

    /// Every slug in use, pending articles included
    async fn all_slugs(&self) -> Result<HashSet<String>>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, record: &NewArticle) -> Result<Article> {
        create_article_sqlite(self.pool.as_sqlite(), record).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        get_article_sqlite(self.pool.as_sqlite(), "a.id = ?", id.to_string()).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        get_article_sqlite(self.pool.as_sqlite(), "a.slug = ?", slug.to_string()).await
    }

    async fn update(&self, id: i64, record: &NewArticle) -> Result<Article> {
        update_article_sqlite(self.pool.as_sqlite(), id, record).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        delete_article_sqlite(self.pool.as_sqlite(), id).await
    }

    async fn set_pending(&self, id: i64, pending: bool) -> Result<()> {
        set_pending_sqlite(self.pool.as_sqlite(), id, pending).await
    }

    async fn list(
        &self,
        filter: &ArticleFilter,
        order: ArticleOrder,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<Article>> {
        list_articles_sqlite(self.pool.as_sqlite(), filter, order, page).await
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<i64> {
        count_articles_sqlite(self.pool.as_sqlite(), filter).await
    }

    async fn all_slugs(&self) -> Result<HashSet<String>> {
        all_slugs_sqlite(self.pool.as_sqlite()).await
    }
}

// ============================================================================
// Query building
// ============================================================================

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.slug, a.content, a.author, a.publish_date, \
                               a.last_edited, a.country, a.source, a.download_size, a.pending_approval";

/// Largest number of ids placed in one `IN (...)` list.
const ID_CHUNK: usize = 500;

/// WHERE clause for a filter plus its single optional bind value.
fn filter_clause(filter: &ArticleFilter) -> (&'static str, Option<String>) {
    match filter {
        ArticleFilter::All => ("1 = 1", None),
        ArticleFilter::Approved => ("a.pending_approval = 0", None),
        ArticleFilter::Pending => ("a.pending_approval = 1", None),
        ArticleFilter::Edited => ("a.pending_approval = 0 AND a.last_edited IS NOT NULL", None),
        ArticleFilter::ExternalCollaboration => (
            "a.pending_approval = 0 AND EXISTS (SELECT 1 FROM article_links l \
             WHERE l.article_id = a.id AND l.kind = 'external_collaboration')",
            None,
        ),
        ArticleFilter::Source(source) => {
            ("a.pending_approval = 0 AND a.source = ?", Some(source.clone()))
        }
        ArticleFilter::Country(country) => (
            "a.pending_approval = 0 AND a.country LIKE '%' || ? || '%' ESCAPE '\\'",
            Some(escape_like(country)),
        ),
        ArticleFilter::Author(author) => {
            ("a.pending_approval = 0 AND a.author = ?", Some(author.clone()))
        }
        ArticleFilter::Type(name) => (
            "a.pending_approval = 0 AND EXISTS (SELECT 1 FROM article_article_types aat \
             JOIN article_types t ON t.id = aat.article_type_id \
             WHERE aat.article_id = a.id AND t.name = ?)",
            Some(name.clone()),
        ),
    }
}

/// Escape LIKE wildcards so `value` matches literally under `ESCAPE '\'`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn order_clause(order: ArticleOrder) -> &'static str {
    match order {
        ArticleOrder::Newest => "a.publish_date DESC, a.id DESC",
        ArticleOrder::RecentlyEdited => "a.last_edited DESC, a.id DESC",
        ArticleOrder::Title => "a.title COLLATE NOCASE ASC, a.id ASC",
        ArticleOrder::Inserted => "a.id ASC",
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, record: &NewArticle) -> Result<Article> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, slug, content, author, publish_date, last_edited,
                              country, source, download_size, pending_approval)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.title)
    .bind(&record.slug)
    .bind(&record.content)
    .bind(&record.author)
    .bind(record.publish_date)
    .bind(record.last_edited)
    .bind(&record.country)
    .bind(&record.source)
    .bind(record.download_size)
    .bind(record.pending_approval)
    .execute(&mut *tx)
    .await
    .context("Failed to create article")?;

    let id = result.last_insert_rowid();
    write_associations(&mut tx, id, record).await?;
    tx.commit().await.context("Failed to commit article")?;

    get_article_sqlite(pool, "a.id = ?", id.to_string())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Article not found after insert"))
}

async fn update_article_sqlite(pool: &SqlitePool, id: i64, record: &NewArticle) -> Result<Article> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        UPDATE articles
        SET title = ?, slug = ?, content = ?, author = ?, publish_date = ?, last_edited = ?,
            country = ?, source = ?, download_size = ?, pending_approval = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.title)
    .bind(&record.slug)
    .bind(&record.content)
    .bind(&record.author)
    .bind(record.publish_date)
    .bind(record.last_edited)
    .bind(&record.country)
    .bind(&record.source)
    .bind(record.download_size)
    .bind(record.pending_approval)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update article")?;

    for table in ["article_links", "article_article_types", "article_categories"] {
        sqlx::query(&format!("DELETE FROM {} WHERE article_id = ?", table))
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to clear {}", table))?;
    }

    write_associations(&mut tx, id, record).await?;
    tx.commit().await.context("Failed to commit article update")?;

    get_article_sqlite(pool, "a.id = ?", id.to_string())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Article not found after update"))
}

async fn write_associations(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: i64,
    record: &NewArticle,
) -> Result<()> {
    for (kind, position, url) in record.links.iter() {
        sqlx::query("INSERT INTO article_links (article_id, kind, position, url) VALUES (?, ?, ?, ?)")
            .bind(article_id)
            .bind(kind.as_str())
            .bind(position as i64)
            .bind(url)
            .execute(&mut **tx)
            .await
            .context("Failed to store article link")?;
    }

    for type_id in &record.article_type_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO article_article_types (article_id, article_type_id) VALUES (?, ?)",
        )
        .bind(article_id)
        .bind(type_id)
        .execute(&mut **tx)
        .await
        .context("Failed to attach article type")?;
    }

    for category_id in &record.category_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO article_categories (article_id, category_id) VALUES (?, ?)",
        )
        .bind(article_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await
        .context("Failed to attach category")?;
    }

    Ok(())
}

async fn get_article_sqlite(
    pool: &SqlitePool,
    clause: &str,
    value: String,
) -> Result<Option<Article>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM articles a WHERE {}",
        ARTICLE_COLUMNS, clause
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .context("Failed to get article")?;

    match row {
        Some(row) => {
            let article = row_to_article_sqlite(&row)?;
            Ok(hydrate(pool, vec![article]).await?.pop())
        }
        None => Ok(None),
    }
}

async fn delete_article_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;

    Ok(())
}

async fn set_pending_sqlite(pool: &SqlitePool, id: i64, pending: bool) -> Result<()> {
    sqlx::query("UPDATE articles SET pending_approval = ? WHERE id = ?")
        .bind(pending)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update approval state")?;

    Ok(())
}

async fn list_articles_sqlite(
    pool: &SqlitePool,
    filter: &ArticleFilter,
    order: ArticleOrder,
    page: Option<(i64, i64)>,
) -> Result<Vec<Article>> {
    let (clause, value) = filter_clause(filter);
    let mut sql = format!(
        "SELECT {} FROM articles a WHERE {} ORDER BY {}",
        ARTICLE_COLUMNS,
        clause,
        order_clause(order)
    );
    if page.is_some() {
        sql.push_str(" LIMIT ? OFFSET ?");
    }

    let mut query = sqlx::query(&sql);
    if let Some(value) = value {
        query = query.bind(value);
    }
    if let Some((offset, limit)) = page {
        query = query.bind(limit).bind(offset);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    let articles = rows
        .iter()
        .map(row_to_article_sqlite)
        .collect::<Result<Vec<_>>>()?;
    hydrate(pool, articles).await
}

async fn count_articles_sqlite(pool: &SqlitePool, filter: &ArticleFilter) -> Result<i64> {
    let (clause, value) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) as count FROM articles a WHERE {}", clause);

    let mut query = sqlx::query(&sql);
    if let Some(value) = value {
        query = query.bind(value);
    }

    let row = query
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    Ok(row.get("count"))
}

async fn all_slugs_sqlite(pool: &SqlitePool) -> Result<HashSet<String>> {
    let slugs: Vec<String> = sqlx::query_scalar("SELECT slug FROM articles")
        .fetch_all(pool)
        .await
        .context("Failed to list slugs")?;

    Ok(slugs.into_iter().collect())
}

/// Attach links, types and categories to freshly loaded rows.
async fn hydrate(pool: &SqlitePool, mut articles: Vec<Article>) -> Result<Vec<Article>> {
    if articles.is_empty() {
        return Ok(articles);
    }

    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let mut links: HashMap<i64, ArticleLinks> = HashMap::new();
    let mut types: HashMap<i64, Vec<ArticleType>> = HashMap::new();
    let mut categories: HashMap<i64, Vec<Category>> = HashMap::new();

    for chunk in ids.chunks(ID_CHUNK) {
        let marks = placeholders(chunk.len());

        let sql = format!(
            "SELECT article_id, kind, url FROM article_links \
             WHERE article_id IN ({}) ORDER BY article_id, kind, position",
            marks
        );
        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(id);
        }
        for row in query.fetch_all(pool).await.context("Failed to load article links")? {
            let kind_str: String = row.try_get("kind")?;
            let kind = LinkKind::from_str(&kind_str)
                .with_context(|| format!("Invalid link kind in database: {}", kind_str))?;
            links
                .entry(row.try_get("article_id")?)
                .or_default()
                .get_mut(kind)
                .push(row.try_get("url")?);
        }

        let sql = format!(
            "SELECT aat.article_id, t.id, t.name, t.created_at FROM article_article_types aat \
             JOIN article_types t ON t.id = aat.article_type_id \
             WHERE aat.article_id IN ({}) ORDER BY t.name",
            marks
        );
        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(id);
        }
        for row in query.fetch_all(pool).await.context("Failed to load article types")? {
            types
                .entry(row.try_get("article_id")?)
                .or_default()
                .push(ArticleType {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    created_at: row.try_get("created_at")?,
                });
        }

        let sql = format!(
            "SELECT ac.article_id, c.id, c.name, c.created_at FROM article_categories ac \
             JOIN categories c ON c.id = ac.category_id \
             WHERE ac.article_id IN ({}) ORDER BY c.name",
            marks
        );
        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(id);
        }
        for row in query.fetch_all(pool).await.context("Failed to load article categories")? {
            categories
                .entry(row.try_get("article_id")?)
                .or_default()
                .push(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    created_at: row.try_get("created_at")?,
                });
        }
    }

    for article in &mut articles {
        article.links = links.remove(&article.id).unwrap_or_default();
        article.article_types = types.remove(&article.id).unwrap_or_default();
        article.categories = categories.remove(&article.id).unwrap_or_default();
    }

    Ok(articles)
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        publish_date: row.try_get("publish_date")?,
        last_edited: row.try_get("last_edited")?,
        country: row.try_get("country")?,
        source: row.try_get("source")?,
        download_size: row.try_get("download_size")?,
        pending_approval: row.try_get("pending_approval")?,
        links: ArticleLinks::default(),
        article_types: Vec::new(),
        categories: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, TimeZone, Utc};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxArticleRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxArticleRepository::new(pool.clone());
        (pool, repo)
    }

    async fn type_id(pool: &DynDatabasePool, name: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM article_types WHERE name = ?")
            .bind(name)
            .fetch_one(pool.as_sqlite())
            .await
            .expect("Seeded type missing")
    }

    fn record(title: &str, slug: &str, days_ago: i64) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            slug: slug.to_string(),
            content: format!("Content of {}", title),
            author: "alice".to_string(),
            publish_date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() - Duration::days(days_ago),
            last_edited: None,
            country: None,
            source: None,
            download_size: None,
            links: ArticleLinks::default(),
            pending_approval: false,
            article_type_ids: Vec::new(),
            category_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_article_with_associations() {
        let (pool, repo) = setup_test_repo().await;
        let leak = type_id(&pool, "Leak").await;
        let hack = type_id(&pool, "Hack").await;

        let mut new = record("Big Leak", "big-leak", 0);
        new.country = Some("Chile, Peru".into());
        new.source = Some("Anonymous".into());
        new.download_size = Some(2_400_000_000);
        new.article_type_ids = vec![leak, hack];
        new.links.download = vec!["https://a.example/1".into(), "https://a.example/2".into()];
        new.links.magnet = vec!["magnet:?xt=1".into()];

        let created = repo.create(&new).await.expect("Failed to create article");

        assert!(created.id > 0);
        assert_eq!(created.slug, "big-leak");
        assert_eq!(created.download_size, Some(2_400_000_000));
        assert_eq!(created.countries(), vec!["Chile", "Peru"]);
        let names: Vec<&str> = created.article_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Hack", "Leak"]);
        assert_eq!(created.links.download, new.links.download);
        assert_eq!(created.links.magnet, new.links.magnet);
        assert!(created.links.torrent.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_slug_and_id() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(&record("One", "one", 0)).await.unwrap();

        assert_eq!(repo.get_by_slug("one").await.unwrap().unwrap().id, created.id);
        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().slug, "one");
        assert!(repo.get_by_slug("two").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&record("One", "one", 0)).await.unwrap();
        let err = repo.create(&record("One again", "one", 0)).await.unwrap_err();
        assert!(super::super::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_update_replaces_associations() {
        let (pool, repo) = setup_test_repo().await;
        let leak = type_id(&pool, "Leak").await;
        let news = type_id(&pool, "News").await;

        let mut new = record("Title", "title", 0);
        new.article_type_ids = vec![leak];
        new.links.torrent = vec!["https://t.example".into()];
        let created = repo.create(&new).await.unwrap();

        let mut changed = new.clone();
        changed.title = "New Title".into();
        changed.slug = "new-title".into();
        changed.article_type_ids = vec![news];
        changed.links = ArticleLinks::default();
        changed.last_edited = Some(Utc::now());

        let updated = repo.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.slug, "new-title");
        assert_eq!(updated.article_types.len(), 1);
        assert_eq!(updated.article_types[0].name, "News");
        assert!(updated.links.is_empty());
        assert!(updated.last_edited.is_some());
    }

    #[tokio::test]
    async fn test_delete_article() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(&record("Gone", "gone", 0)).await.unwrap();
        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_filter_and_approval() {
        let (_pool, repo) = setup_test_repo().await;
        let mut pending = record("Waiting", "waiting", 0);
        pending.pending_approval = true;
        let created = repo.create(&pending).await.unwrap();
        repo.create(&record("Live", "live", 1)).await.unwrap();

        assert_eq!(repo.count(&ArticleFilter::Approved).await.unwrap(), 1);
        assert_eq!(repo.count(&ArticleFilter::Pending).await.unwrap(), 1);

        repo.set_pending(created.id, false).await.unwrap();
        assert_eq!(repo.count(&ArticleFilter::Approved).await.unwrap(), 2);
        assert_eq!(repo.count(&ArticleFilter::Pending).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders() {
        let (_pool, repo) = setup_test_repo().await;
        let mut older = record("banana", "banana", 5);
        older.last_edited = Some(Utc::now());
        repo.create(&older).await.unwrap();
        repo.create(&record("Apple", "apple", 1)).await.unwrap();
        repo.create(&record("cherry", "cherry", 3)).await.unwrap();

        let slugs = |articles: Vec<Article>| -> Vec<String> {
            articles.into_iter().map(|a| a.slug).collect()
        };

        let newest = repo.list(&ArticleFilter::Approved, ArticleOrder::Newest, None).await.unwrap();
        assert_eq!(slugs(newest), vec!["apple", "cherry", "banana"]);

        let titles = repo.list(&ArticleFilter::Approved, ArticleOrder::Title, None).await.unwrap();
        assert_eq!(slugs(titles), vec!["apple", "banana", "cherry"]);

        let edited = repo
            .list(&ArticleFilter::Edited, ArticleOrder::RecentlyEdited, None)
            .await
            .unwrap();
        assert_eq!(slugs(edited), vec!["banana"]);

        let page = repo
            .list(&ArticleFilter::Approved, ArticleOrder::Newest, Some((1, 1)))
            .await
            .unwrap();
        assert_eq!(slugs(page), vec!["cherry"]);
    }

    #[tokio::test]
    async fn test_facet_filters() {
        let (pool, repo) = setup_test_repo().await;
        let leak = type_id(&pool, "Leak").await;

        let mut a = record("A", "a", 0);
        a.country = Some("Russia, Ukraine".into());
        a.source = Some("Alpha".into());
        a.article_type_ids = vec![leak];
        a.links.external_collaboration = vec!["https://collab.example".into()];
        repo.create(&a).await.unwrap();

        let mut b = record("B", "b", 1);
        b.country = Some("Chile".into());
        b.source = Some("Beta".into());
        b.author = "bob".into();
        repo.create(&b).await.unwrap();

        let count = |f: ArticleFilter| {
            let repo = &repo;
            async move { repo.count(&f).await.unwrap() }
        };

        assert_eq!(count(ArticleFilter::Country("Ukraine".into())).await, 1);
        assert_eq!(count(ArticleFilter::Country("i".into())).await, 2);
        assert_eq!(count(ArticleFilter::Source("Beta".into())).await, 1);
        assert_eq!(count(ArticleFilter::Source("Bet".into())).await, 0);
        assert_eq!(count(ArticleFilter::Author("bob".into())).await, 1);
        assert_eq!(count(ArticleFilter::Type("Leak".into())).await, 1);
        assert_eq!(count(ArticleFilter::Type("News".into())).await, 0);
        assert_eq!(count(ArticleFilter::ExternalCollaboration).await, 1);
    }

    #[tokio::test]
    async fn test_country_filter_treats_wildcards_literally() {
        let (_pool, repo) = setup_test_repo().await;
        let mut a = record("A", "a", 0);
        a.country = Some("Peru".into());
        repo.create(&a).await.unwrap();
        let mut b = record("B", "b", 1);
        b.country = Some("Zone_51, 100%".into());
        repo.create(&b).await.unwrap();

        let count = |c: &str| {
            let repo = &repo;
            let f = ArticleFilter::Country(c.to_string());
            async move { repo.count(&f).await.unwrap() }
        };

        assert_eq!(count("_").await, 1);
        assert_eq!(count("%").await, 1);
        assert_eq!(count("e_u").await, 0);
        assert_eq!(count("Zone_51").await, 1);
        assert_eq!(count("\\").await, 0);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[tokio::test]
    async fn test_all_filter_in_insertion_order() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&record("First", "first", 0)).await.unwrap();
        let mut pending = record("Second", "second", 9);
        pending.pending_approval = true;
        repo.create(&pending).await.unwrap();

        let slugs: Vec<String> = repo
            .list(&ArticleFilter::All, ArticleOrder::Inserted, None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.slug)
            .collect();
        assert_eq!(slugs, vec!["first", "second"]);
        assert_eq!(repo.count(&ArticleFilter::All).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_all_slugs_includes_pending() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&record("A", "a", 0)).await.unwrap();
        let mut pending = record("B", "b", 0);
        pending.pending_approval = true;
        repo.create(&pending).await.unwrap();

        let slugs = repo.all_slugs().await.unwrap();
        assert!(slugs.contains("a"));
        assert!(slugs.contains("b"));
        assert_eq!(slugs.len(), 2);
    }
}
