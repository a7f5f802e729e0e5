/*!
common/src/lib.rs

Shared configuration types for Newsdesk.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default config file with an optional override
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address Rocket binds to (e.g. "127.0.0.1" or "0.0.0.0")
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Draft generator section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Artificial latency applied to every draft, in milliseconds (0 disables it)
    #[serde(default)]
    pub delay_ms: u64,
    /// Prompt used when the caller submits a blank one
    #[serde(default = "default_placeholder_prompt")]
    pub placeholder_prompt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            placeholder_prompt: default_placeholder_prompt(),
        }
    }
}

pub fn default_placeholder_prompt() -> String {
    "Standard prompt.".to_string()
}

/// Whether a news item may be stored without a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterPolicy {
    /// Every news item must name an existing cluster.
    #[default]
    Required,
    /// Unassigned news items are accepted.
    Optional,
}

/// Store behaviour section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub cluster_policy: ClusterPolicy,
}

/// A news item created at start-up inside its parent seed cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNews {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub source: Option<String>,
    #[serde(default)]
    pub hash_tags: Vec<String>,
}

/// A cluster created at start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCluster {
    pub title: String,
    #[serde(default)]
    pub news: Vec<SeedNews>,
}

/// Initial store contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub clusters: Vec<SeedCluster>,
}

impl Default for SeedConfig {
    /// Demo data used when the configuration carries no `[seed]` section.
    fn default() -> Self {
        let news = |title: &str, body: &str, source: &str| SeedNews {
            title: title.to_string(),
            body: body.to_string(),
            source: Some(source.to_string()),
            hash_tags: Vec::new(),
        };
        Self {
            clusters: vec![
                SeedCluster {
                    title: "Trump and crypto".to_string(),
                    news: vec![
                        news(
                            "Trump calls himself the king of bitcoin",
                            "News text...",
                            "twitter",
                        ),
                        news(
                            "Bitcoin falls after the statement",
                            "Detailed text...",
                            "reuters",
                        ),
                    ],
                },
                SeedCluster {
                    title: "Markets".to_string(),
                    news: vec![news(
                        "Volatility has increased",
                        "News details...",
                        "bloomberg",
                    )],
                },
            ],
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl Config {
    /// Load configuration from a single TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence key by key).
    /// Missing files are skipped; with neither, the built-in defaults apply.
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse config");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.generator.delay_ms, 0);
        assert_eq!(cfg.generator.placeholder_prompt, "Standard prompt.");
        assert_eq!(cfg.store.cluster_policy, ClusterPolicy::Required);
        assert_eq!(cfg.seed.clusters.len(), 2);
    }

    #[test]
    fn seed_section_replaces_demo_data() {
        let toml = r#"
            [store]
            cluster_policy = "optional"

            [[seed.clusters]]
            title = "Markets"

            [[seed.clusters.news]]
            title = "Price moves"
            body = "bitcoin fell"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.store.cluster_policy, ClusterPolicy::Optional);
        assert_eq!(cfg.seed.clusters.len(), 1);
        assert_eq!(cfg.seed.clusters[0].title, "Markets");
        assert_eq!(cfg.seed.clusters[0].news[0].source, None);
    }

    #[test]
    fn shipped_default_file_relies_on_builtin_seed() {
        let cfg: Config =
            toml::from_str(include_str!("../../config.default.toml")).expect("parse config");
        assert_eq!(cfg.generator.delay_ms, 250);
        let titles: Vec<_> = cfg.seed.clusters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Trump and crypto", "Markets"]);
        assert_eq!(cfg.seed.clusters[0].news.len(), 2);
    }

    #[tokio::test]
    async fn override_file_wins_per_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        fs::write(
            &default_path,
            "[server]\nbind = \"0.0.0.0\"\nport = 8000\n\n[generator]\ndelay_ms = 250\n",
        )
        .expect("write default");
        fs::write(&override_path, "[server]\nport = 9090\n").expect("write override");

        let cfg = Config::load_with_defaults(Some(default_path.as_path()), Some(override_path.as_path()))
            .await
            .expect("load config");

        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.generator.delay_ms, 250);
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let absent = dir.path().join("nope.toml");

        let cfg = Config::load_with_defaults(Some(absent.as_path()), None)
            .await
            .expect("load config");
        assert_eq!(cfg.server.port, 8000);
    }

    #[tokio::test]
    async fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[server\nport = ").expect("write");

        assert!(Config::from_file(&path).await.is_err());
    }
}
