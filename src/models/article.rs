//! Article model
//!
//! This module provides:
//! - `Article` entity with its taxonomy and link lists
//! - `LinkKind` / `ArticleLinks` replacing numbered link columns
//! - `NewArticle`, the validated record handed to the repository
//! - Input types for publishing and editing articles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ArticleType, Category};

/// Maximum number of links stored per link kind.
pub const MAX_LINKS_PER_KIND: usize = 3;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// URL-friendly slug, unique across all articles
    pub slug: String,
    /// Markdown content
    pub content: String,
    /// Username of the author
    pub author: String,
    /// Publication timestamp
    pub publish_date: DateTime<Utc>,
    /// Last edit timestamp, if the article has been edited
    pub last_edited: Option<DateTime<Utc>>,
    /// Comma separated country names ("Chile, Peru")
    pub country: Option<String>,
    /// Origin of the material
    pub source: Option<String>,
    /// Size of the downloadable dataset in bytes
    pub download_size: Option<i64>,
    /// Download, mirror and collaboration links
    #[serde(default)]
    pub links: ArticleLinks,
    /// Hidden from public listings until approved by an admin
    pub pending_approval: bool,
    #[serde(default)]
    pub article_types: Vec<ArticleType>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Article {
    /// Country names carried by this article.
    pub fn countries(&self) -> Vec<&str> {
        self.country
            .as_deref()
            .map(|c| crate::services::facets::split_countries(c).collect())
            .unwrap_or_default()
    }

    /// Whether the article carries the named type.
    pub fn has_type(&self, name: &str) -> bool {
        self.article_types.iter().any(|t| t.name == name)
    }
}

/// Kind of link attached to an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Download,
    Magnet,
    Torrent,
    Ipfs,
    ExternalCollaboration,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        LinkKind::Download,
        LinkKind::Magnet,
        LinkKind::Torrent,
        LinkKind::Ipfs,
        LinkKind::ExternalCollaboration,
    ];

    /// Convert kind to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Download => "download",
            LinkKind::Magnet => "magnet",
            LinkKind::Torrent => "torrent",
            LinkKind::Ipfs => "ipfs",
            LinkKind::ExternalCollaboration => "external_collaboration",
        }
    }

    /// Parse kind from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "download" => Some(LinkKind::Download),
            "magnet" => Some(LinkKind::Magnet),
            "torrent" => Some(LinkKind::Torrent),
            "ipfs" => Some(LinkKind::Ipfs),
            "external_collaboration" => Some(LinkKind::ExternalCollaboration),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Links of an article grouped by kind, at most `MAX_LINKS_PER_KIND` each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleLinks {
    pub download: Vec<String>,
    pub magnet: Vec<String>,
    pub torrent: Vec<String>,
    pub ipfs: Vec<String>,
    pub external_collaboration: Vec<String>,
}

impl ArticleLinks {
    pub fn get(&self, kind: LinkKind) -> &[String] {
        match kind {
            LinkKind::Download => &self.download,
            LinkKind::Magnet => &self.magnet,
            LinkKind::Torrent => &self.torrent,
            LinkKind::Ipfs => &self.ipfs,
            LinkKind::ExternalCollaboration => &self.external_collaboration,
        }
    }

    pub fn get_mut(&mut self, kind: LinkKind) -> &mut Vec<String> {
        match kind {
            LinkKind::Download => &mut self.download,
            LinkKind::Magnet => &mut self.magnet,
            LinkKind::Torrent => &mut self.torrent,
            LinkKind::Ipfs => &mut self.ipfs,
            LinkKind::ExternalCollaboration => &mut self.external_collaboration,
        }
    }

    /// Iterate over `(kind, position, url)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (LinkKind, usize, &str)> + '_ {
        LinkKind::ALL.into_iter().flat_map(move |kind| {
            self.get(kind)
                .iter()
                .enumerate()
                .map(move |(pos, url)| (kind, pos, url.as_str()))
        })
    }

    /// Trim every link and drop blank entries.
    pub fn normalized(mut self) -> Self {
        for kind in LinkKind::ALL {
            let links = self.get_mut(kind);
            links.iter_mut().for_each(|l| *l = l.trim().to_string());
            links.retain(|l| !l.is_empty());
        }
        self
    }

    /// The first kind that holds more than `MAX_LINKS_PER_KIND` links.
    pub fn over_limit(&self) -> Option<LinkKind> {
        LinkKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind).len() > MAX_LINKS_PER_KIND)
    }

    pub fn is_empty(&self) -> bool {
        LinkKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }
}

/// Validated article record ready to be inserted
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: String,
    pub publish_date: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub download_size: Option<i64>,
    pub links: ArticleLinks,
    pub pending_approval: bool,
    pub article_type_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
}

/// Input for publishing a new article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateArticleInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Human readable size such as "2.4 GB"; blank means none
    #[serde(default)]
    pub download_size: Option<String>,
    #[serde(default)]
    pub links: ArticleLinks,
    #[serde(default)]
    pub article_type_ids: Vec<i64>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    /// Explicit publication date, defaults to now
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited: Option<DateTime<Utc>>,
}

impl CreateArticleInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_download_size(mut self, size: impl Into<String>) -> Self {
        self.download_size = Some(size.into());
        self
    }

    pub fn with_link(mut self, kind: LinkKind, url: impl Into<String>) -> Self {
        self.links.get_mut(kind).push(url.into());
        self
    }

    pub fn with_article_types(mut self, ids: Vec<i64>) -> Self {
        self.article_type_ids = ids;
        self
    }

    pub fn with_categories(mut self, ids: Vec<i64>) -> Self {
        self.category_ids = ids;
        self
    }

    pub fn with_publish_date(mut self, date: DateTime<Utc>) -> Self {
        self.publish_date = Some(date);
        self
    }
}

/// Input for editing an article; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub countries: Option<Vec<String>>,
    pub source: Option<String>,
    /// Blank string clears the size
    pub download_size: Option<String>,
    pub links: Option<ArticleLinks>,
    pub article_type_ids: Option<Vec<i64>>,
    pub category_ids: Option<Vec<i64>>,
    pub publish_date: Option<DateTime<Utc>>,
    pub last_edited: Option<DateTime<Utc>>,
}

impl UpdateArticleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = Some(countries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_download_size(mut self, size: impl Into<String>) -> Self {
        self.download_size = Some(size.into());
        self
    }

    pub fn with_article_types(mut self, ids: Vec<i64>) -> Self {
        self.article_type_ids = Some(ids);
        self
    }

    pub fn with_categories(mut self, ids: Vec<i64>) -> Self {
        self.category_ids = Some(ids);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.countries.is_some()
            || self.source.is_some()
            || self.download_size.is_some()
            || self.links.is_some()
            || self.article_type_ids.is_some()
            || self.category_ids.is_some()
            || self.publish_date.is_some()
            || self.last_edited.is_some()
    }
}

/// Join country names into the stored form, `None` when there are none.
pub fn join_countries<S: AsRef<str>>(countries: &[S]) -> Option<String> {
    let names: Vec<&str> = countries
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
