//! Askama templates for the desk UI.
//!
//! Templates live under `newsdesk/templates/` and escape every value they
//! print. Links are built here so the templates only read plain fields.

use askama::Template;
use rocket::http::RawStr;

use crate::models::{Cluster, Draft, NewsItem};

use super::Mode;

fn query_arg(s: &str) -> String {
    RawStr::new(s).percent_encode().as_str().to_string()
}

/// Link back to the full page with the request state threaded through.
pub fn page_href(cluster_id: u64, mode: Mode, q: &str, selected_news_id: Option<u64>) -> String {
    let mut href = format!("/?cluster_id={cluster_id}&mode={}", mode.as_str());
    if !q.is_empty() {
        href.push_str("&q=");
        href.push_str(&query_arg(q));
    }
    if let Some(id) = selected_news_id {
        href.push_str(&format!("&selected_news_id={id}"));
    }
    href
}

/// Everything the page body needs.
#[derive(Clone, Copy)]
pub struct PageView<'a> {
    pub clusters: &'a [Cluster],
    pub cluster: Option<&'a Cluster>,
    pub news: &'a [NewsItem],
    pub mode: Mode,
    pub q: &'a str,
    pub selected: Option<&'a NewsItem>,
    pub error: Option<&'a str>,
}

pub struct ClusterLink<'a> {
    pub title: &'a str,
    pub size: usize,
    pub href: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct DocumentTemplate<'a> {
    pub clusters: Vec<ClusterLink<'a>>,
    pub page: String,
}

#[derive(Template)]
#[template(path = "no_clusters.html")]
pub struct NoClustersTemplate;

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub cluster_id: u64,
    pub title: &'a str,
    pub size: usize,
    pub mode: &'static str,
    pub q: &'a str,
    pub generating: bool,
    pub list_href: String,
    pub generate_href: String,
    pub error: Option<&'a str>,
    pub news_list: String,
    pub viewer: String,
    pub panel: String,
}

pub struct NewsRow<'a> {
    pub id: u64,
    pub title: &'a str,
    pub source: &'a str,
    pub href: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "news_list.html")]
pub struct NewsListTemplate<'a> {
    pub cluster_id: u64,
    pub mode: &'static str,
    pub q: &'a str,
    pub rows: Vec<NewsRow<'a>>,
}

impl<'a> NewsListTemplate<'a> {
    pub fn new(
        cluster_id: u64,
        news: &'a [NewsItem],
        mode: Mode,
        q: &'a str,
        selected_id: Option<u64>,
    ) -> Self {
        let rows = news
            .iter()
            .map(|item| NewsRow {
                id: item.id,
                title: &item.title,
                source: &item.source,
                href: page_href(cluster_id, mode, q, Some(item.id)),
                selected: Some(item.id) == selected_id,
            })
            .collect();
        Self {
            cluster_id,
            mode: mode.as_str(),
            q,
            rows,
        }
    }
}

#[derive(Template)]
#[template(path = "news_viewer.html")]
pub struct NewsViewerTemplate<'a> {
    pub item: Option<&'a NewsItem>,
    pub created: String,
    pub lines: Vec<&'a str>,
    pub close_href: String,
}

impl<'a> NewsViewerTemplate<'a> {
    pub fn new(item: Option<&'a NewsItem>, cluster_id: u64, mode: Mode, q: &str) -> Self {
        Self {
            item,
            created: item
                .map(|n| n.created_at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            lines: item.map(|n| n.body.lines().collect()).unwrap_or_default(),
            close_href: page_href(cluster_id, mode, q, None),
        }
    }
}

#[derive(Template)]
#[template(path = "generator_panel.html")]
pub struct GeneratorPanelTemplate<'a> {
    pub cluster_id: u64,
    pub mode: &'static str,
    pub q: &'a str,
    pub prompt: &'a str,
    pub draft: Option<&'a Draft>,
}

impl<'a> GeneratorPanelTemplate<'a> {
    pub fn new(
        cluster_id: u64,
        mode: Mode,
        q: &'a str,
        prompt: &'a str,
        draft: Option<&'a Draft>,
    ) -> Self {
        Self {
            cluster_id,
            mode: mode.as_str(),
            q,
            prompt,
            draft,
        }
    }
}

/// Page body: header, news list, viewer and the panel for the current mode.
pub fn page(view: &PageView<'_>) -> askama::Result<String> {
    let Some(cluster) = view.cluster else {
        return NoClustersTemplate.render();
    };
    let selected_id = view.selected.map(|n| n.id);

    let news_list =
        NewsListTemplate::new(cluster.id, view.news, view.mode, view.q, selected_id).render()?;
    let viewer = NewsViewerTemplate::new(view.selected, cluster.id, view.mode, view.q).render()?;
    let generating = view.mode == Mode::Generate;
    let panel = if generating {
        GeneratorPanelTemplate::new(cluster.id, view.mode, view.q, "", None).render()?
    } else {
        String::new()
    };

    PageTemplate {
        cluster_id: cluster.id,
        title: &cluster.title,
        size: cluster.size,
        mode: view.mode.as_str(),
        q: view.q,
        generating,
        list_href: page_href(cluster.id, Mode::List, view.q, None),
        generate_href: page_href(cluster.id, Mode::Generate, view.q, None),
        error: view.error,
        news_list,
        viewer,
        panel,
    }
    .render()
}

/// Full document: cluster sidebar around the page body.
pub fn document(view: &PageView<'_>) -> askama::Result<String> {
    let selected_id = view.cluster.map(|c| c.id);
    let clusters = view
        .clusters
        .iter()
        .map(|c| ClusterLink {
            title: &c.title,
            size: c.size,
            href: page_href(c.id, view.mode, "", None),
            selected: Some(c.id) == selected_id,
        })
        .collect();

    DocumentTemplate {
        clusters,
        page: page(view)?,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(title: &str, body: &str) -> NewsItem {
        NewsItem {
            id: 7,
            title: title.into(),
            body: body.into(),
            published_at: None,
            source: "manual".into(),
            hash_tags: vec!["btc".into()],
            fingerprint: None,
            cluster_id: Some(1),
            created_at: Utc::now(),
        }
    }

    fn cluster(id: u64, title: &str) -> Cluster {
        Cluster {
            id,
            title: title.into(),
            size: 1,
            last_activity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn page_href_threads_state() {
        assert_eq!(
            page_href(3, Mode::Generate, "", Some(9)),
            "/?cluster_id=3&mode=generate&selected_news_id=9"
        );
        let href = page_href(1, Mode::List, "a&b", None);
        assert!(href.starts_with("/?cluster_id=1&mode=list&q="));
        assert!(!href.ends_with("a&b"));
    }

    #[test]
    fn viewer_escapes_markup_and_keeps_line_breaks() {
        let news = item("<script>x</script>", "a\nb");
        let html = NewsViewerTemplate::new(Some(&news), 1, Mode::List, "")
            .render()
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"<div class="body">a<br>b</div>"#));
        assert!(html.contains("#btc"));
    }

    #[test]
    fn empty_viewer_asks_for_a_selection() {
        let html = NewsViewerTemplate::new(None, 1, Mode::List, "").render().unwrap();
        assert!(html.contains("Select a news item."));
    }

    #[test]
    fn generator_panel_shows_draft_form() {
        let draft = Draft {
            title: "Generated for cluster: <Markets>".into(),
            body: "Prompt: p".into(),
        };
        let html = GeneratorPanelTemplate::new(1, Mode::Generate, "", "p", Some(&draft))
            .render()
            .unwrap();
        assert!(html.contains("/clusters/1/news/add_generated"));
        assert!(html.contains("&lt;Markets&gt;"));
        assert!(html.contains(r#"name="mode" value="generate""#));

        let empty = GeneratorPanelTemplate::new(1, Mode::Generate, "", "", None)
            .render()
            .unwrap();
        assert!(!empty.contains("add_generated"));
    }

    #[test]
    fn document_marks_the_current_cluster() {
        let clusters = [cluster(1, "Markets"), cluster(2, "Crypto")];
        let view = PageView {
            clusters: &clusters,
            cluster: Some(&clusters[1]),
            news: &[],
            mode: Mode::List,
            q: "",
            selected: None,
            error: Some("title must not be empty"),
        };
        let html = document(&view).unwrap();
        assert!(html.contains("<h1>Crypto</h1>"));
        assert!(html.contains(r#"<li class="selected"><a href="/?cluster_id=2&amp;mode=list">Crypto</a>"#));
        assert!(html.contains(r#"<div class="error">title must not be empty</div>"#));
        assert!(html.contains("No news."));
        assert!(html.contains("/clusters/2/news/add"));
    }

    #[test]
    fn page_without_clusters() {
        let view = PageView {
            clusters: &[],
            cluster: None,
            news: &[],
            mode: Mode::Generate,
            q: "",
            selected: None,
            error: None,
        };
        assert!(page(&view).unwrap().contains("No clusters yet."));
    }
}
