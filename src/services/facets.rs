//! Facet tallies
//!
//! Counts how often each article type, country and source occurs across a
//! set of articles. Used for the "top scopes" sidebar, the facet index and
//! the impact page.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::Article;

/// Number of facets shown in the sidebar.
pub const DEFAULT_FACET_LIMIT: usize = 5;

/// Classification dimension of a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetDimension {
    Type,
    Country,
    Source,
}

impl FacetDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetDimension::Type => "type",
            FacetDimension::Country => "country",
            FacetDimension::Source => "source",
        }
    }
}

impl fmt::Display for FacetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (dimension, value) pair with its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub dimension: FacetDimension,
    pub value: String,
    pub count: usize,
}

/// Borrowed view of the facet-bearing fields of an article.
#[derive(Debug, Clone, Default)]
pub struct ArticleView<'a> {
    pub types: Vec<&'a str>,
    /// Comma separated country names, e.g. `"Russia, Ukraine"`.
    pub country: Option<&'a str>,
    pub source: Option<&'a str>,
}

impl<'a> From<&'a Article> for ArticleView<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            types: article.article_types.iter().map(|t| t.name.as_str()).collect(),
            country: article.country.as_deref(),
            source: article.source.as_deref(),
        }
    }
}

/// Split a stored country field into trimmed, non-empty names.
pub fn split_countries(country: &str) -> impl Iterator<Item = &str> {
    country.split(',').map(str::trim).filter(|c| !c.is_empty())
}

/// Count every facet, in the order each one is first encountered.
///
/// Within an article, types are visited first, then countries, then the
/// source. Blank values are ignored.
pub fn tally<'a, I>(articles: I) -> Vec<FacetCount>
where
    I: IntoIterator<Item = ArticleView<'a>>,
{
    let mut counts: Vec<FacetCount> = Vec::new();
    let mut index: HashMap<(FacetDimension, &'a str), usize> = HashMap::new();

    let mut bump = |dimension: FacetDimension, value: &'a str| {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match index.get(&(dimension, value)) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert((dimension, value), counts.len());
                counts.push(FacetCount {
                    dimension,
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    };

    for article in articles {
        for name in article.types {
            bump(FacetDimension::Type, name);
        }
        if let Some(country) = article.country {
            for name in split_countries(country) {
                bump(FacetDimension::Country, name);
            }
        }
        if let Some(source) = article.source {
            bump(FacetDimension::Source, source);
        }
    }

    counts
}

/// The `limit` most frequent facets, highest count first.
///
/// Ties keep first-encountered order so the output is deterministic.
pub fn top_facets<'a, I>(articles: I, limit: usize) -> Vec<FacetCount>
where
    I: IntoIterator<Item = ArticleView<'a>>,
{
    let mut counts = tally(articles);
    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Most frequent value within one dimension of an existing tally.
pub fn top_in_dimension(counts: &[FacetCount], dimension: FacetDimension) -> Option<FacetCount> {
    counts
        .iter()
        .filter(|c| c.dimension == dimension)
        .fold(None::<&FacetCount>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        })
        .cloned()
}
