//! Server-rendered HTML front end.
//!
//! Handlers only talk to the desk. The selected cluster, `mode` and the `q`
//! filter travel with every request as query parameters or hidden form
//! fields.

use askama::Template;
use rocket::form::{Form, FromForm, FromFormField};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::{get, post, routes, Route, State};

use crate::desk::NewsDesk;
use crate::error::StoreError;
use crate::models::{Cluster, Draft, NewsItem};
use crate::server::AppState;

pub mod render;

use render::{GeneratorPanelTemplate, NewsListTemplate, NewsViewerTemplate, PageView};

/// Which panel the page shows under the news list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromFormField)]
pub enum Mode {
    #[default]
    #[field(value = "list")]
    List,
    #[field(value = "generate")]
    Generate,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::List => "list",
            Mode::Generate => "generate",
        }
    }
}

type Html = Result<RawHtml<String>, Status>;
type Page = Result<(Status, RawHtml<String>), Status>;

fn rendered(result: askama::Result<String>) -> Html {
    result.map(RawHtml).map_err(|err| {
        tracing::error!(%err, "template rendering failed");
        Status::InternalServerError
    })
}

fn html<T: Template>(template: &T) -> Html {
    rendered(template.render())
}

/// Snapshot of everything a page render reads from the desk.
struct PageData {
    clusters: Vec<Cluster>,
    current: Option<usize>,
    news: Vec<NewsItem>,
    selected: Option<NewsItem>,
}

impl PageData {
    /// Unknown clusters fall back to the first one; a selected item from
    /// another cluster is dropped.
    fn load(desk: &NewsDesk, cluster_id: Option<u64>, q: &str, selected_news_id: Option<u64>) -> Self {
        let clusters = desk.list_clusters();
        let current = cluster_id
            .and_then(|id| clusters.iter().position(|c| c.id == id))
            .or_else(|| (!clusters.is_empty()).then_some(0));
        let current_id = current.map(|i| clusters[i].id);

        let news = current_id
            .map(|id| desk.search_news(Some(id), q))
            .unwrap_or_default();
        let selected = selected_news_id
            .and_then(|id| desk.get_news(id))
            .filter(|n| current_id.is_some() && n.cluster_id == current_id);

        Self {
            clusters,
            current,
            news,
            selected,
        }
    }

    fn view<'a>(&'a self, mode: Mode, q: &'a str, error: Option<&'a str>) -> PageView<'a> {
        PageView {
            clusters: &self.clusters,
            cluster: self.current.map(|i| &self.clusters[i]),
            news: &self.news,
            mode,
            q,
            selected: self.selected.as_ref(),
            error,
        }
    }
}

fn render_document(desk: &NewsDesk, cluster_id: Option<u64>, mode: Mode, q: &str, error: Option<&str>) -> Html {
    let data = PageData::load(desk, cluster_id, q, None);
    rendered(render::document(&data.view(mode, q, error)))
}

/// Re-render after a form post; store errors become a banner and a 4xx status.
fn after_mutation<T>(
    desk: &NewsDesk,
    result: Result<T, StoreError>,
    cluster_id: u64,
    mode: Mode,
    q: &str,
) -> Page {
    match result {
        Ok(_) => Ok((Status::Ok, render_document(desk, Some(cluster_id), mode, q, None)?)),
        Err(err) => {
            tracing::warn!(%err, cluster_id, "form rejected");
            let msg = err.to_string();
            let body = render_document(desk, Some(cluster_id), mode, q, Some(&msg))?;
            Ok((err.status(), body))
        }
    }
}

#[get("/?<cluster_id>&<mode>&<q>&<selected_news_id>")]
fn index(
    state: &State<AppState>,
    cluster_id: Option<u64>,
    mode: Option<Mode>,
    q: Option<&str>,
    selected_news_id: Option<u64>,
) -> Html {
    let q = q.unwrap_or_default();
    let data = PageData::load(&state.desk, cluster_id, q, selected_news_id);
    rendered(render::document(&data.view(mode.unwrap_or_default(), q, None)))
}

/// Page body only, for partial refreshes.
#[get("/page?<cluster_id>&<mode>&<q>&<selected_news_id>")]
fn page(
    state: &State<AppState>,
    cluster_id: u64,
    mode: Option<Mode>,
    q: Option<&str>,
    selected_news_id: Option<u64>,
) -> Html {
    let q = q.unwrap_or_default();
    let data = PageData::load(&state.desk, Some(cluster_id), q, selected_news_id);
    rendered(render::page(&data.view(mode.unwrap_or_default(), q, None)))
}

#[get("/clusters/<cluster_id>/news?<mode>&<q>")]
fn news_list(
    state: &State<AppState>,
    cluster_id: u64,
    mode: Option<Mode>,
    q: Option<&str>,
) -> Html {
    let cluster = state.desk.get_cluster(cluster_id).ok_or(Status::NotFound)?;
    let q = q.unwrap_or_default();
    let news = state.desk.search_news(Some(cluster.id), q);
    html(&NewsListTemplate::new(
        cluster.id,
        &news,
        mode.unwrap_or_default(),
        q,
        None,
    ))
}

#[get("/news/<news_id>/view?<cluster_id>&<mode>&<q>")]
fn news_view(
    state: &State<AppState>,
    news_id: u64,
    cluster_id: u64,
    mode: Option<Mode>,
    q: Option<&str>,
) -> Html {
    let item = state
        .desk
        .get_news(news_id)
        .filter(|n| n.cluster_id == Some(cluster_id));
    html(&NewsViewerTemplate::new(
        item.as_ref(),
        cluster_id,
        mode.unwrap_or_default(),
        q.unwrap_or_default(),
    ))
}

#[derive(FromForm)]
struct AddNewsForm {
    #[field(default = Mode::List)]
    mode: Mode,
    #[field(default = String::new())]
    q: String,
    #[field(default = String::new())]
    title: String,
    #[field(default = String::new())]
    body: String,
    #[field(default = String::from("manual"))]
    source: String,
}

#[post("/clusters/<cluster_id>/news/add", data = "<form>")]
fn add_news(state: &State<AppState>, cluster_id: u64, form: Form<AddNewsForm>) -> Page {
    let result = state
        .desk
        .add_manual(cluster_id, &form.title, &form.body, &form.source);
    after_mutation(&state.desk, result, cluster_id, form.mode, &form.q)
}

#[derive(FromForm)]
struct DeleteForm {
    cluster_id: u64,
    #[field(default = Mode::List)]
    mode: Mode,
    #[field(default = String::new())]
    q: String,
}

#[post("/news/<news_id>/delete", data = "<form>")]
fn delete_news(state: &State<AppState>, news_id: u64, form: Form<DeleteForm>) -> Page {
    state.desk.delete_news(news_id);
    let body = render_document(&state.desk, Some(form.cluster_id), form.mode, &form.q, None)?;
    Ok((Status::Ok, body))
}

#[get("/clusters/<cluster_id>/generator_panel?<mode>&<q>")]
fn generator_panel(
    cluster_id: u64,
    mode: Option<Mode>,
    q: Option<&str>,
) -> Html {
    html(&GeneratorPanelTemplate::new(
        cluster_id,
        mode.unwrap_or(Mode::Generate),
        q.unwrap_or_default(),
        "",
        None,
    ))
}

#[derive(FromForm)]
struct GenerateForm {
    #[field(default = Mode::Generate)]
    mode: Mode,
    #[field(default = String::new())]
    q: String,
    #[field(default = String::new())]
    prompt: String,
}

/// Show a draft for review. Nothing is saved here.
#[post("/clusters/<cluster_id>/generate_draft", data = "<form>")]
async fn generate_draft(
    state: &State<AppState>,
    cluster_id: u64,
    form: Form<GenerateForm>,
) -> Html {
    let draft = state
        .desk
        .generate_draft(cluster_id, &form.prompt)
        .await
        .map_err(|err| {
            tracing::warn!(%err, "draft generation rejected");
            err.status()
        })?;
    html(&GeneratorPanelTemplate::new(
        cluster_id,
        form.mode,
        &form.q,
        &form.prompt,
        Some(&draft),
    ))
}

#[derive(FromForm)]
struct AddGeneratedForm {
    #[field(default = Mode::Generate)]
    mode: Mode,
    #[field(default = String::new())]
    q: String,
    #[field(default = String::new())]
    title: String,
    #[field(default = String::new())]
    body: String,
}

#[post("/clusters/<cluster_id>/news/add_generated", data = "<form>")]
fn add_generated(
    state: &State<AppState>,
    cluster_id: u64,
    form: Form<AddGeneratedForm>,
) -> Page {
    let form = form.into_inner();
    let draft = Draft {
        title: form.title,
        body: form.body,
    };
    let result = state.desk.commit_draft(cluster_id, draft);
    after_mutation(&state.desk, result, cluster_id, form.mode, &form.q)
}

pub fn routes() -> Vec<Route> {
    routes![
        index,
        page,
        news_list,
        news_view,
        add_news,
        delete_news,
        generator_panel,
        generate_draft,
        add_generated,
    ]
}
