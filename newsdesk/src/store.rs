//! In-memory store for clusters and news items.
//!
//! A single `RwLock` guards id allocation, both collections and the cluster
//! aggregates, so every mutation is applied as one unit and readers always
//! see a consistent snapshot.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};

use common::{ClusterPolicy, SeedConfig};

use crate::error::{StoreError, StoreResult};
use crate::models::{Cluster, NewsCreate, NewsItem, DEFAULT_SOURCE};

#[derive(Debug)]
struct Inner {
    clusters: BTreeMap<u64, Cluster>,
    news: BTreeMap<u64, NewsItem>,
    next_cluster_id: u64,
    next_news_id: u64,
}

impl Inner {
    /// Check an input record against the current state without mutating anything.
    fn validate(&self, input: &NewsCreate, policy: ClusterPolicy) -> StoreResult<()> {
        if input.title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        match input.cluster_id {
            Some(id) if !self.clusters.contains_key(&id) => Err(StoreError::cluster_not_found(id)),
            None if policy == ClusterPolicy::Required => {
                Err(StoreError::Validation("cluster_id is required".into()))
            }
            _ => Ok(()),
        }
    }

    /// Insert an already validated record.
    fn insert(&mut self, input: NewsCreate) -> NewsItem {
        let now = Utc::now();
        let id = self.next_news_id;
        self.next_news_id += 1;

        let source = input
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let item = NewsItem {
            id,
            title: input.title,
            body: input.body,
            published_at: input.published_at,
            source,
            hash_tags: input.hash_tags,
            fingerprint: None,
            cluster_id: input.cluster_id,
            created_at: now,
        };

        if let Some(cluster) = item.cluster_id.and_then(|cid| self.clusters.get_mut(&cid)) {
            cluster.size += 1;
            cluster.last_activity = Some(now);
        }

        debug!(news_id = id, cluster_id = ?item.cluster_id, "news created");
        self.news.insert(id, item.clone());
        item
    }

    fn newest_first<'a>(
        &'a self,
        cluster_id: Option<u64>,
    ) -> impl Iterator<Item = &'a NewsItem> + 'a {
        self.news
            .values()
            .rev()
            .filter(move |n| cluster_id.map_or(true, |cid| n.cluster_id == Some(cid)))
    }
}

/// Lowercased search needle, or `None` when the query is blank.
fn needle(query: &str) -> Option<String> {
    let q = query.trim();
    if q.is_empty() {
        None
    } else {
        Some(q.to_lowercase())
    }
}

fn matches_any(item: &NewsItem, needle: &str) -> bool {
    item.title.to_lowercase().contains(needle)
        || item.body.to_lowercase().contains(needle)
        || item.source.to_lowercase().contains(needle)
}

#[derive(Debug)]
pub struct Store {
    inner: RwLock<Inner>,
    policy: ClusterPolicy,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ClusterPolicy::default())
    }
}

impl Store {
    pub fn new(policy: ClusterPolicy) -> Self {
        Self {
            inner: RwLock::new(Inner {
                clusters: BTreeMap::new(),
                news: BTreeMap::new(),
                next_cluster_id: 1,
                next_news_id: 1,
            }),
            policy,
        }
    }

    pub fn policy(&self) -> ClusterPolicy {
        self.policy
    }

    // A panic while holding the lock cannot leave a half-applied mutation:
    // every write path validates before touching state.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the configured clusters and their initial news.
    pub fn seed(&self, seed: &SeedConfig) -> StoreResult<()> {
        for sc in &seed.clusters {
            let cluster = self.create_cluster(&sc.title)?;
            let inputs = sc
                .news
                .iter()
                .map(|n| NewsCreate {
                    title: n.title.clone(),
                    body: n.body.clone(),
                    published_at: None,
                    source: n.source.clone(),
                    hash_tags: n.hash_tags.clone(),
                    cluster_id: Some(cluster.id),
                })
                .collect();
            self.create_news_batch(inputs)?;
        }
        info!(clusters = seed.clusters.len(), "store seeded");
        Ok(())
    }

    /// Seeding helper; clusters are not created through the desk.
    pub fn create_cluster(&self, title: &str) -> StoreResult<Cluster> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("cluster title must not be empty".into()));
        }

        let mut inner = self.write();
        let id = inner.next_cluster_id;
        inner.next_cluster_id += 1;
        let cluster = Cluster {
            id,
            title: title.to_string(),
            size: 0,
            last_activity: None,
            created_at: Utc::now(),
        };
        inner.clusters.insert(id, cluster.clone());
        debug!(cluster_id = id, title, "cluster created");
        Ok(cluster)
    }

    /// All clusters, ascending by id.
    pub fn list_clusters(&self) -> Vec<Cluster> {
        self.read().clusters.values().cloned().collect()
    }

    pub fn get_cluster(&self, id: u64) -> Option<Cluster> {
        self.read().clusters.get(&id).cloned()
    }

    /// News newest first, optionally restricted to one cluster.
    pub fn list_news(&self, cluster_id: Option<u64>) -> Vec<NewsItem> {
        self.read().newest_first(cluster_id).cloned().collect()
    }

    /// Case-insensitive match on title, body or source within one cluster.
    /// A blank query returns the whole cluster listing.
    pub fn search_news(&self, cluster_id: u64, query: &str) -> Vec<NewsItem> {
        self.search_scoped(Some(cluster_id), query)
    }

    /// Same as [`Store::search_news`] across every cluster.
    pub fn search_all(&self, query: &str) -> Vec<NewsItem> {
        self.search_scoped(None, query)
    }

    fn search_scoped(&self, cluster_id: Option<u64>, query: &str) -> Vec<NewsItem> {
        let inner = self.read();
        let items = inner.newest_first(cluster_id);
        match needle(query) {
            None => items.cloned().collect(),
            Some(q) => items.filter(|n| matches_any(n, &q)).cloned().collect(),
        }
    }

    /// Body-only match, optionally restricted to one cluster.
    pub fn search_content(&self, cluster_id: Option<u64>, query: &str) -> Vec<NewsItem> {
        let inner = self.read();
        let items = inner.newest_first(cluster_id);
        match needle(query) {
            None => items.cloned().collect(),
            Some(q) => items
                .filter(|n| n.body.to_lowercase().contains(&q))
                .cloned()
                .collect(),
        }
    }

    pub fn get_news(&self, id: u64) -> Option<NewsItem> {
        self.read().news.get(&id).cloned()
    }

    pub fn create_news(&self, input: NewsCreate) -> StoreResult<NewsItem> {
        let mut inner = self.write();
        inner.validate(&input, self.policy)?;
        Ok(inner.insert(input))
    }

    /// Create several items at once. Every record is validated before any is
    /// stored, so either all of them are saved or none is.
    pub fn create_news_batch(&self, inputs: Vec<NewsCreate>) -> StoreResult<Vec<NewsItem>> {
        let mut inner = self.write();
        for input in &inputs {
            inner.validate(input, self.policy)?;
        }
        Ok(inputs.into_iter().map(|input| inner.insert(input)).collect())
    }

    /// Remove an item. Unknown ids are a no-op and return `None`.
    pub fn delete_news(&self, id: u64) -> Option<NewsItem> {
        let mut inner = self.write();
        let item = inner.news.remove(&id)?;
        if let Some(cluster) = item.cluster_id.and_then(|cid| inner.clusters.get_mut(&cid)) {
            cluster.size = cluster.size.saturating_sub(1);
        }
        debug!(news_id = id, cluster_id = ?item.cluster_id, "news deleted");
        Some(item)
    }

    /// (cluster count, news count)
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.read();
        (inner.clusters.len(), inner.news.len())
    }
}
