//! Draft generation.
//!
//! Drafts are produced for human review and are never stored by the
//! generator; committing one is a separate create call.

use std::time::Duration;

use tracing::debug;

use common::{default_placeholder_prompt, GeneratorConfig};

use crate::models::Draft;

const CANNED_PARAGRAPH: &str = "Following the public statement the market reacted with volatility. \
Analysts link the move to revised expectations among participants and growing uncertainty.";

/// Core trait for draft generators
#[async_trait::async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Produce a draft for the given cluster label and free-text prompt.
    /// Never fails.
    async fn generate(&self, cluster_label: &str, prompt: &str) -> Draft;
}

/// Fixed-template generator with optional artificial latency.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    delay: Duration,
    placeholder_prompt: String,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            placeholder_prompt: default_placeholder_prompt(),
        }
    }
}

impl TemplateGenerator {
    pub fn from_config(cfg: &GeneratorConfig) -> Self {
        Self::default()
            .with_delay(Duration::from_millis(cfg.delay_ms))
            .with_placeholder(&cfg.placeholder_prompt)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Blank placeholders are ignored.
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        let placeholder = placeholder.trim();
        if !placeholder.is_empty() {
            self.placeholder_prompt = placeholder.to_string();
        }
        self
    }

    pub fn render(&self, cluster_label: &str, prompt: &str) -> Draft {
        render_draft(cluster_label, prompt, &self.placeholder_prompt)
    }
}

#[async_trait::async_trait]
impl DraftGenerator for TemplateGenerator {
    async fn generate(&self, cluster_label: &str, prompt: &str) -> Draft {
        if !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "simulating generation latency");
            tokio::time::sleep(self.delay).await;
        }
        self.render(cluster_label, prompt)
    }
}

/// Interpolate the label and the effective prompt into the fixed templates.
pub fn render_draft(cluster_label: &str, prompt: &str, placeholder: &str) -> Draft {
    let prompt = match prompt.trim() {
        "" => placeholder,
        p => p,
    };
    Draft {
        title: format!("Generated for cluster: {cluster_label}"),
        body: format!("Prompt: {prompt}\n\n{CANNED_PARAGRAPH}"),
    }
}
