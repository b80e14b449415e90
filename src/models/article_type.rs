//! Article type model
//!
//! Article types classify articles ("Leak", "Hack", ...). The seed list is
//! inserted by the migrations; administrators may add more.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types created on first start-up.
pub const SEED_ARTICLE_TYPES: [&str; 16] = [
    "Banker's Box",
    "Corporate",
    "Cyberwar",
    "Environmental",
    "Fascist",
    "Hack",
    "Leak",
    "Leak Markets",
    "Limited Distribution",
    "News",
    "Opinion",
    "Organization",
    "Other",
    "Ransomware",
    "Researchers",
    "Scrape",
];

/// Type used by the impact metrics for restricted releases.
pub const LIMITED_DISTRIBUTION: &str = "Limited Distribution";

/// Article type entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleType {
    /// Unique identifier
    pub id: i64,
    /// Type name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Article type with the number of articles carrying it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleTypeWithCount {
    #[serde(flatten)]
    pub article_type: ArticleType,
    pub article_count: i64,
}
