//! The operations presentation adapters call.
//!
//! `NewsDesk` is cheap to clone and holds no per-request state: the
//! selected cluster, mode and query string are threaded through by callers.

use std::sync::Arc;

use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::generator::DraftGenerator;
use crate::models::{Cluster, Draft, NewsCreate, NewsItem, DEFAULT_SOURCE, GENERATED_SOURCE};
use crate::store::Store;

#[derive(Clone)]
pub struct NewsDesk {
    store: Arc<Store>,
    generator: Arc<dyn DraftGenerator>,
}

impl NewsDesk {
    pub fn new(store: Arc<Store>, generator: Arc<dyn DraftGenerator>) -> Self {
        Self { store, generator }
    }

    /// Number of clusters and news items currently stored.
    pub fn counts(&self) -> (usize, usize) {
        self.store.counts()
    }

    pub fn list_clusters(&self) -> Vec<Cluster> {
        self.store.list_clusters()
    }

    pub fn get_cluster(&self, id: u64) -> Option<Cluster> {
        self.store.get_cluster(id)
    }

    pub fn list_news(&self, cluster_id: Option<u64>) -> Vec<NewsItem> {
        self.store.list_news(cluster_id)
    }

    /// Search one cluster, or every cluster when none is given.
    pub fn search_news(&self, cluster_id: Option<u64>, query: &str) -> Vec<NewsItem> {
        match cluster_id {
            Some(id) => self.store.search_news(id, query),
            None => self.store.search_all(query),
        }
    }

    pub fn search_content(&self, cluster_id: Option<u64>, query: &str) -> Vec<NewsItem> {
        self.store.search_content(cluster_id, query)
    }

    pub fn get_news(&self, id: u64) -> Option<NewsItem> {
        self.store.get_news(id)
    }

    pub fn create_news(&self, input: NewsCreate) -> StoreResult<NewsItem> {
        self.store.create_news(input)
    }

    /// Save a batch of records atomically and report how many were stored.
    pub fn save_news(&self, inputs: Vec<NewsCreate>) -> StoreResult<usize> {
        let saved = self.store.create_news_batch(inputs)?.len();
        info!(saved, "news batch saved");
        Ok(saved)
    }

    /// Manual entry from a form: fields are trimmed, a blank source becomes "manual".
    pub fn add_manual(
        &self,
        cluster_id: u64,
        title: &str,
        body: &str,
        source: &str,
    ) -> StoreResult<NewsItem> {
        let source = match source.trim() {
            "" => DEFAULT_SOURCE,
            s => s,
        };
        self.store.create_news(
            NewsCreate::new(title.trim(), body.trim())
                .in_cluster(cluster_id)
                .with_source(source),
        )
    }

    /// Remove an item; unknown ids are a no-op. Returns whether something was removed.
    pub fn delete_news(&self, id: u64) -> bool {
        self.store.delete_news(id).is_some()
    }

    /// Produce a draft for a known cluster. Nothing is stored.
    pub async fn generate_draft(&self, cluster_id: u64, prompt: &str) -> StoreResult<Draft> {
        let cluster = self
            .store
            .get_cluster(cluster_id)
            .ok_or_else(|| StoreError::cluster_not_found(cluster_id))?;
        Ok(self.generator.generate(&cluster.title, prompt).await)
    }

    /// Save a reviewed draft as a news item with source "generated".
    pub fn commit_draft(&self, cluster_id: u64, draft: Draft) -> StoreResult<NewsItem> {
        self.store.create_news(
            NewsCreate::new(draft.title.trim(), draft.body.trim())
                .in_cluster(cluster_id)
                .with_source(GENERATED_SOURCE),
        )
    }
}
