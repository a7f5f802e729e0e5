use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label applied when a caller leaves it blank.
pub const DEFAULT_SOURCE: &str = "manual";
/// Source label for news committed from a generated draft.
pub const GENERATED_SOURCE: &str = "generated";

/// A named grouping of related news items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    pub title: String,
    /// Number of news items currently assigned to this cluster
    pub size: usize,
    /// When news was last created in this cluster
    pub last_activity: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A stored news record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub hash_tags: Vec<String>,
    /// Reserved for deduplication; never populated
    pub fingerprint: Option<String>,
    pub cluster_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Input record for creating a news item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCreate {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub hash_tags: Vec<String>,
    #[serde(default)]
    pub cluster_id: Option<u64>,
}

impl NewsCreate {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn in_cluster(mut self, cluster_id: u64) -> Self {
        self.cluster_id = Some(cluster_id);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A generated (title, body) pair that has not been saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub body: String,
}
