//! Article service
//!
//! Implements business logic for articles:
//! - Publishing with validation, size parsing and unique slugs
//! - Editing by the author or an administrator
//! - Moderation (pending queue and approval)
//! - Public listings, facet browsing and the impact figures
//!
//! Pending articles are invisible to everyone except administrators.

use crate::db::repositories::{is_unique_violation, ArticleFilter, ArticleOrder, ArticleRepository};
use crate::models::{
    join_countries, Article, ArticleTypeWithCount, CreateArticleInput, NewArticle,
    UpdateArticleInput, User, LIMITED_DISTRIBUTION,
};
use crate::services::article_type::{ArticleTypeService, ArticleTypeServiceError};
use crate::services::category::{CategoryService, CategoryServiceError};
use crate::services::facets::{self, ArticleView, FacetCount, FacetDimension, DEFAULT_FACET_LIMIT};
use crate::services::markdown::MarkdownRenderer;
use crate::services::size::{format_size, parse_size, SizeError};
use crate::services::slug::generate_slug;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Longest accepted title in characters
pub const MAX_TITLE_LENGTH: usize = 100;

/// Articles per home page section
pub const DEFAULT_HOME_SECTION_SIZE: usize = 10;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Article slug already exists: {0}")]
    DuplicateSlug(String),

    /// Caller may not modify this article
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<SizeError> for ArticleServiceError {
    fn from(err: SizeError) -> Self {
        ArticleServiceError::ValidationError(err.to_string())
    }
}

impl From<ArticleTypeServiceError> for ArticleServiceError {
    fn from(err: ArticleTypeServiceError) -> Self {
        match err {
            ArticleTypeServiceError::InternalError(e) => ArticleServiceError::InternalError(e),
            other => ArticleServiceError::ValidationError(other.to_string()),
        }
    }
}

impl From<CategoryServiceError> for ArticleServiceError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::InternalError(e) => ArticleServiceError::InternalError(e),
            other => ArticleServiceError::ValidationError(other.to_string()),
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// Compact form of an article used in listings
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub publish_date: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub download_size: Option<String>,
    pub article_types: Vec<String>,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            author: article.author.clone(),
            publish_date: article.publish_date,
            last_edited: article.last_edited,
            country: article.country.clone(),
            source: article.source.clone(),
            download_size: formatted_size(article.download_size),
            article_types: article.article_types.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

/// Articles sharing one facet value with the article being viewed
#[derive(Debug, Clone, Serialize)]
pub struct RelatedGroup {
    pub dimension: FacetDimension,
    pub value: String,
    pub articles: Vec<ArticleSummary>,
}

/// Everything shown on an article page
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub article: Article,
    pub content_html: String,
    pub download_size_formatted: Option<String>,
    pub related: Vec<RelatedGroup>,
    pub top_facets: Vec<FacetCount>,
}

/// One section of the home page
#[derive(Debug, Clone, Serialize)]
pub struct HomeSection {
    pub articles: Vec<ArticleSummary>,
    pub total: i64,
    /// More articles exist than are shown
    pub more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub recent: HomeSection,
    pub edited: HomeSection,
    pub external: HomeSection,
}

/// Values available for facet browsing
#[derive(Debug, Clone, Serialize)]
pub struct FacetIndex {
    pub types: Vec<ArticleTypeWithCount>,
    pub countries: Vec<String>,
    pub sources: Vec<String>,
}

/// Headline figures for the impact page
#[derive(Debug, Clone, Serialize)]
pub struct ImpactMetrics {
    pub total_articles: usize,
    pub limited_distribution_percent: f64,
    pub top_source: Option<FacetCount>,
    pub top_country: Option<FacetCount>,
    pub top_type: Option<FacetCount>,
}

/// Full public listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Recent,
    Edited,
    External,
    Alphabetical,
}

impl Listing {
    /// Parse the path segment used by the API (`recent`, `edited`,
    /// `external`, `a-z`).
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "recent" => Some(Listing::Recent),
            "edited" => Some(Listing::Edited),
            "external" => Some(Listing::External),
            "a-z" => Some(Listing::Alphabetical),
            _ => None,
        }
    }

    fn query(&self) -> (ArticleFilter, ArticleOrder) {
        match self {
            Listing::Recent => (ArticleFilter::Approved, ArticleOrder::Newest),
            Listing::Edited => (ArticleFilter::Edited, ArticleOrder::RecentlyEdited),
            Listing::External => (ArticleFilter::ExternalCollaboration, ArticleOrder::Newest),
            Listing::Alphabetical => (ArticleFilter::Approved, ArticleOrder::Title),
        }
    }
}

fn formatted_size(size: Option<i64>) -> Option<String> {
    size.and_then(|s| u64::try_from(s).ok()).map(format_size)
}

fn summaries(articles: &[Article]) -> Vec<ArticleSummary> {
    articles.iter().map(ArticleSummary::from).collect()
}

// ============================================================================
// Service
// ============================================================================

/// Article service
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    article_types: Arc<ArticleTypeService>,
    categories: Arc<CategoryService>,
    markdown_renderer: MarkdownRenderer,
    home_section_size: usize,
    facet_limit: usize,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        article_types: Arc<ArticleTypeService>,
        categories: Arc<CategoryService>,
    ) -> Self {
        Self {
            repo,
            article_types,
            categories,
            markdown_renderer: MarkdownRenderer::new(),
            home_section_size: DEFAULT_HOME_SECTION_SIZE,
            facet_limit: DEFAULT_FACET_LIMIT,
        }
    }

    pub fn with_home_section_size(mut self, size: usize) -> Self {
        self.home_section_size = size;
        self
    }

    pub fn with_facet_limit(mut self, limit: usize) -> Self {
        self.facet_limit = limit;
        self
    }

    /// Publish a new article for `author`.
    ///
    /// Articles by users who require approval go to the pending queue.
    pub async fn publish(
        &self,
        author: &User,
        input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let title = validate_title(&input.title)?;
        let content = validate_content(&input.content)?;

        let links = input.links.normalized();
        if let Some(kind) = links.over_limit() {
            return Err(ArticleServiceError::ValidationError(format!(
                "At most {} {} links are allowed",
                crate::models::MAX_LINKS_PER_KIND,
                kind
            )));
        }

        let download_size = parse_download_size(input.download_size.as_deref())?;
        let article_type_ids = self.article_types.resolve_ids(&input.article_type_ids).await?;
        let category_ids = self.categories.resolve_ids(&input.category_ids).await?;

        let existing = self
            .repo
            .all_slugs()
            .await
            .context("Failed to load existing slugs")?;
        let slug = generate_slug(&title, &existing, None);

        let record = NewArticle {
            title,
            slug,
            content,
            author: author.username.clone(),
            publish_date: input.publish_date.unwrap_or_else(Utc::now),
            last_edited: input.last_edited,
            country: join_countries(&input.countries),
            source: input.source.and_then(non_blank),
            download_size,
            links,
            pending_approval: author.requires_approval,
            article_type_ids,
            category_ids,
        };

        let article = self.store_new(&record).await?;
        tracing::info!(
            "Article {} published by {} (pending: {})",
            article.slug,
            article.author,
            article.pending_approval
        );
        Ok(article)
    }

    async fn store_new(&self, record: &NewArticle) -> Result<Article, ArticleServiceError> {
        match self.repo.create(record).await {
            Ok(article) => Ok(article),
            Err(e) if is_unique_violation(&e) => {
                Err(ArticleServiceError::DuplicateSlug(record.slug.clone()))
            }
            Err(e) => Err(e.context("Failed to create article").into()),
        }
    }

    /// Look an article up by slug, hiding pending articles from non-admins.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        viewer: Option<&User>,
    ) -> Result<Article, ArticleServiceError> {
        let article = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(slug.to_string()))?;

        if article.pending_approval && !viewer.is_some_and(User::is_admin) {
            return Err(ArticleServiceError::NotFound(slug.to_string()));
        }
        Ok(article)
    }

    /// Article with rendered body, related articles and the facet sidebar
    pub async fn article_page(
        &self,
        slug: &str,
        viewer: Option<&User>,
    ) -> Result<ArticlePage, ArticleServiceError> {
        let article = self.get_by_slug(slug, viewer).await?;

        let mut related = Vec::new();
        let mut groups: Vec<(FacetDimension, String, ArticleFilter)> = Vec::new();
        for t in &article.article_types {
            groups.push((FacetDimension::Type, t.name.clone(), ArticleFilter::Type(t.name.clone())));
        }
        if let Some(source) = &article.source {
            groups.push((FacetDimension::Source, source.clone(), ArticleFilter::Source(source.clone())));
        }
        for country in article.countries() {
            groups.push((
                FacetDimension::Country,
                country.to_string(),
                ArticleFilter::Country(country.to_string()),
            ));
        }

        for (dimension, value, filter) in groups {
            let articles = self
                .repo
                .list(&filter, ArticleOrder::Newest, None)
                .await
                .context("Failed to load related articles")?;
            related.push(RelatedGroup {
                dimension,
                value,
                articles: articles
                    .iter()
                    .filter(|a| a.id != article.id)
                    .map(ArticleSummary::from)
                    .collect(),
            });
        }

        Ok(ArticlePage {
            content_html: self.markdown_renderer.render(&article.content),
            download_size_formatted: formatted_size(article.download_size),
            related,
            top_facets: self.top_facets(self.facet_limit).await?,
            article,
        })
    }

    /// Edit an article.
    ///
    /// Only the author or an administrator may edit, and only an
    /// administrator may touch a pending article. The slug changes only
    /// when the title does.
    pub async fn edit(
        &self,
        slug: &str,
        editor: &User,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let article = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(slug.to_string()))?;

        if article.pending_approval && !editor.is_admin() {
            tracing::warn!("{} tried to edit pending article {}", editor.username, slug);
            return Err(ArticleServiceError::Forbidden(
                "Pending articles can only be edited by an administrator".into(),
            ));
        }
        if !editor.can_edit(&article.author) {
            tracing::warn!("{} tried to edit {} by {}", editor.username, slug, article.author);
            return Err(ArticleServiceError::Forbidden(
                "You can only edit your own articles".into(),
            ));
        }
        if !input.has_changes() {
            return Ok(article);
        }

        let mut record = NewArticle {
            title: article.title.clone(),
            slug: article.slug.clone(),
            content: article.content.clone(),
            author: article.author.clone(),
            publish_date: input.publish_date.unwrap_or(article.publish_date),
            last_edited: Some(input.last_edited.unwrap_or_else(Utc::now)),
            country: article.country.clone(),
            source: article.source.clone(),
            download_size: article.download_size,
            links: article.links.clone(),
            pending_approval: article.pending_approval,
            article_type_ids: article.article_types.iter().map(|t| t.id).collect(),
            category_ids: article.categories.iter().map(|c| c.id).collect(),
        };

        if let Some(title) = &input.title {
            let title = validate_title(title)?;
            if title != article.title {
                let existing = self
                    .repo
                    .all_slugs()
                    .await
                    .context("Failed to load existing slugs")?;
                record.slug = generate_slug(&title, &existing, Some(&article.slug));
            }
            record.title = title;
        }
        if let Some(content) = &input.content {
            record.content = validate_content(content)?;
        }
        if let Some(countries) = &input.countries {
            record.country = join_countries(countries);
        }
        if let Some(source) = input.source {
            record.source = non_blank(source);
        }
        if let Some(size) = &input.download_size {
            record.download_size = parse_download_size(Some(size))?;
        }
        if let Some(links) = input.links {
            let links = links.normalized();
            if let Some(kind) = links.over_limit() {
                return Err(ArticleServiceError::ValidationError(format!(
                    "At most {} {} links are allowed",
                    crate::models::MAX_LINKS_PER_KIND,
                    kind
                )));
            }
            record.links = links;
        }
        if let Some(ids) = &input.article_type_ids {
            record.article_type_ids = self.article_types.resolve_ids(ids).await?;
        }
        if let Some(ids) = &input.category_ids {
            record.category_ids = self.categories.resolve_ids(ids).await?;
        }

        let updated = match self.repo.update(article.id, &record).await {
            Ok(updated) => updated,
            Err(e) if is_unique_violation(&e) => {
                return Err(ArticleServiceError::DuplicateSlug(record.slug))
            }
            Err(e) => return Err(e.context("Failed to update article").into()),
        };

        tracing::info!("Article {} edited by {}", updated.slug, editor.username);
        Ok(updated)
    }

    /// Delete an article; only its author or an administrator may.
    pub async fn delete(&self, id: i64, actor: &User) -> Result<(), ArticleServiceError> {
        let article = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(format!("id={}", id)))?;

        if !actor.can_edit(&article.author) {
            tracing::warn!("{} tried to delete {} by {}", actor.username, article.slug, article.author);
            return Err(ArticleServiceError::Forbidden(
                "You can only delete your own articles".into(),
            ));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete article")?;

        tracing::info!("Article {} deleted by {}", article.slug, actor.username);
        Ok(())
    }

    /// Release a pending article (admin)
    pub async fn approve(&self, slug: &str) -> Result<Article, ArticleServiceError> {
        let article = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(slug.to_string()))?;

        self.repo
            .set_pending(article.id, false)
            .await
            .context("Failed to approve article")?;

        tracing::info!("Article {} approved", article.slug);
        Ok(Article {
            pending_approval: false,
            ..article
        })
    }

    /// The moderation queue, newest first (admin)
    pub async fn pending(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self
            .repo
            .list(&ArticleFilter::Pending, ArticleOrder::Newest, None)
            .await
            .context("Failed to list pending articles")?)
    }

    /// Recent, recently edited and external collaboration sections
    pub async fn home(&self) -> Result<HomePage, ArticleServiceError> {
        Ok(HomePage {
            recent: self.home_section(Listing::Recent).await?,
            edited: self.home_section(Listing::Edited).await?,
            external: self.home_section(Listing::External).await?,
        })
    }

    async fn home_section(&self, listing: Listing) -> Result<HomeSection, ArticleServiceError> {
        let (filter, order) = listing.query();
        let limit = self.home_section_size as i64;

        let articles = self
            .repo
            .list(&filter, order, Some((0, limit)))
            .await
            .context("Failed to list home section")?;
        let total = self
            .repo
            .count(&filter)
            .await
            .context("Failed to count home section")?;

        Ok(HomeSection {
            articles: summaries(&articles),
            more: total > limit,
            total,
        })
    }

    /// One of the full public listings
    pub async fn listing(&self, listing: Listing) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        let (filter, order) = listing.query();
        self.summaries_for(filter, order).await
    }

    pub async fn by_source(&self, source: &str) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        self.summaries_for(ArticleFilter::Source(source.to_string()), ArticleOrder::Newest)
            .await
    }

    /// Articles whose country field contains `country`
    pub async fn by_country(&self, country: &str) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        self.summaries_for(ArticleFilter::Country(country.to_string()), ArticleOrder::Newest)
            .await
    }

    pub async fn by_author(&self, author: &str) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        self.summaries_for(ArticleFilter::Author(author.to_string()), ArticleOrder::Newest)
            .await
    }

    /// Articles of one type; `all` lists every approved article
    pub async fn by_type(&self, name: &str) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        let filter = if name.eq_ignore_ascii_case("all") {
            ArticleFilter::Approved
        } else {
            ArticleFilter::Type(name.to_string())
        };
        self.summaries_for(filter, ArticleOrder::Newest).await
    }

    async fn summaries_for(
        &self,
        filter: ArticleFilter,
        order: ArticleOrder,
    ) -> Result<Vec<ArticleSummary>, ArticleServiceError> {
        let articles = self
            .repo
            .list(&filter, order, None)
            .await
            .context("Failed to list articles")?;
        Ok(summaries(&articles))
    }

    /// Every article, pending included, oldest first. Aggregates tally in
    /// this order so ties keep first-published-wins.
    async fn all_articles(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self
            .repo
            .list(&ArticleFilter::All, ArticleOrder::Inserted, None)
            .await
            .context("Failed to list articles")?)
    }

    /// Types in use plus the sorted distinct countries and sources
    pub async fn facet_index(&self) -> Result<FacetIndex, ArticleServiceError> {
        let articles = self.all_articles().await?;

        let countries: BTreeSet<String> = articles
            .iter()
            .flat_map(|a| a.countries())
            .map(str::to_string)
            .collect();
        let sources: BTreeSet<String> = articles
            .iter()
            .filter_map(|a| a.source.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(FacetIndex {
            types: self.article_types.list_in_use().await?,
            countries: countries.into_iter().collect(),
            sources: sources.into_iter().collect(),
        })
    }

    /// Most frequent facets over every article
    pub async fn top_facets(&self, limit: usize) -> Result<Vec<FacetCount>, ArticleServiceError> {
        let articles = self.all_articles().await?;
        Ok(facets::top_facets(articles.iter().map(ArticleView::from), limit))
    }

    /// Totals and leaders shown on the impact page
    pub async fn impact(&self) -> Result<ImpactMetrics, ArticleServiceError> {
        let articles = self.all_articles().await?;
        let total = articles.len();
        let limited = articles
            .iter()
            .filter(|a| a.has_type(LIMITED_DISTRIBUTION))
            .count();

        let counts = facets::tally(articles.iter().map(ArticleView::from));

        Ok(ImpactMetrics {
            total_articles: total,
            limited_distribution_percent: if total == 0 {
                0.0
            } else {
                limited as f64 / total as f64 * 100.0
            },
            top_source: facets::top_in_dimension(&counts, FacetDimension::Source),
            top_country: facets::top_in_dimension(&counts, FacetDimension::Country),
            top_type: facets::top_in_dimension(&counts, FacetDimension::Type),
        })
    }

    /// Number of articles, pending included
    pub async fn count(&self) -> Result<i64, ArticleServiceError> {
        Ok(self
            .repo
            .count(&ArticleFilter::All)
            .await
            .context("Failed to count articles")?)
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn validate_title(title: &str) -> Result<String, ArticleServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ArticleServiceError::ValidationError("Title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ArticleServiceError::ValidationError(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<String, ArticleServiceError> {
    if content.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError("Content cannot be empty".into()));
    }
    Ok(content.to_string())
}

/// Blank input means "no size"; anything else must parse and fit in i64.
fn parse_download_size(input: Option<&str>) -> Result<Option<i64>, ArticleServiceError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            let bytes = parse_size(text)?;
            let bytes = i64::try_from(bytes).map_err(|_| {
                ArticleServiceError::ValidationError(format!("Download size too large: {}", text))
            })?;
            Ok(Some(bytes))
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
