use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use std::{fs, io};

use ntex::web;
use ntex_files::NamedFile;
use serde::{Deserialize, Serialize};
use spdlog::{error, info};

use crate::config::{Config, GrammarSettings};
use crate::grammar::client::{CheckResult, GrammarClient};
use crate::grammar::debounce::{CheckOutcome, DebouncedChecker};
use crate::post::{Post, SaveRequest};
use crate::post_store::PostStore;
use crate::view::editor_renderer::{EditorForm, EditorRenderer};
use crate::view::writer_list_renderer::WriterListRenderer;

struct AppState {
    store: PostStore,
    checker: DebouncedChecker,
    grammar: GrammarSettings,
    config: Config,
}

/// What the editor form posts back. The draft checkbox is simply absent when
/// unchecked.
#[derive(Deserialize)]
struct SaveForm {
    slug: Option<String>,
    title: String,
    content: String,
    draft: Option<String>,
}

#[derive(Deserialize)]
struct DeleteForm {
    slug: String,
}

#[derive(Deserialize)]
struct GrammarRequest {
    text: String,
    language: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum GrammarResponse {
    Checked { result: CheckResult },
    Cleared,
    Superseded,
    Error { message: String },
}

fn render_writer_list(config: &Config, posts: &[Post]) -> io::Result<String> {
    let template_src = fs::read_to_string(config.paths.template_dir.join("writerlist.tpl"))?;
    let renderer = WriterListRenderer::new(&template_src)?;

    Ok(renderer.render(config.site.title.as_str(), posts))
}

fn render_editor(config: &Config, form: &EditorForm) -> io::Result<String> {
    let template_src = fs::read_to_string(config.paths.template_dir.join("editor.tpl"))?;
    let renderer = EditorRenderer::new(&template_src)?;

    Ok(renderer.render(config.site.title.as_str(), form))
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    // The writer sees everything, drafts included
    let posts = match state.store.list_posts() {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error listing posts: {}", e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error listing posts: {}", e));
        }
    };

    let rendered = match render_writer_list(&state.config, &posts) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Error rendering writer list: {}", e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error rendering writer list: {}", e));
        }
    };

    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

#[web::get("/new")]
async fn new_post(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let form = EditorForm {
        slug: "",
        title: "",
        content: "",
        // New work starts private until the writer says otherwise
        draft: true,
        is_new: true,
        error: None,
        grammar_language: state.grammar.language.as_str(),
        grammar_debounce_ms: state.grammar.debounce_ms,
    };

    match render_editor(&state.config, &form) {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            error!("Error rendering editor: {}", e);
            web::HttpResponse::InternalServerError().body(format!("Error rendering editor: {}", e))
        }
    }
}

#[web::get("/edit/{slug}")]
async fn edit_post(
    path: web::types::Path<String>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let slug = path.into_inner();

    let post = match state.store.get_post(&slug) {
        Ok(Some(post)) => post,
        Ok(None) => return web::HttpResponse::NotFound().body("Post not found"),
        Err(e) => {
            error!("Error opening post {}: {}", slug, e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error loading post {}", slug));
        }
    };

    let form = EditorForm {
        slug: post.slug.as_str(),
        title: post.title.as_str(),
        content: post.content.as_str(),
        draft: post.draft,
        is_new: false,
        error: None,
        grammar_language: state.grammar.language.as_str(),
        grammar_debounce_ms: state.grammar.debounce_ms,
    };

    match render_editor(&state.config, &form) {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            error!("Error rendering editor for {}: {}", slug, e);
            web::HttpResponse::InternalServerError().body(format!("Error rendering editor: {}", e))
        }
    }
}

#[web::post("/save")]
async fn save_post(
    form: web::types::Form<SaveForm>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let form = form.into_inner();
    let draft = form.draft.is_some();

    let request = SaveRequest {
        title: form.title.clone(),
        content: form.content.clone(),
        draft,
        existing_slug: form.slug.clone().filter(|slug| !slug.is_empty()),
    };

    let err = match state.store.save(&request) {
        Ok(saved) => {
            info!("Saved post {} (draft={})", saved.slug, saved.draft);
            return web::HttpResponse::SeeOther()
                .header("Location", format!("/edit/{}", saved.slug))
                .finish();
        }
        Err(e) => e,
    };

    // Show the editor again with the writer's input intact
    let message = err.to_string();
    let editor_form = EditorForm {
        slug: form.slug.as_deref().unwrap_or(""),
        title: form.title.as_str(),
        content: form.content.as_str(),
        draft,
        is_new: request.existing_slug.is_none(),
        error: Some(message.as_str()),
        grammar_language: state.grammar.language.as_str(),
        grammar_debounce_ms: state.grammar.debounce_ms,
    };

    let rendered = match render_editor(&state.config, &editor_form) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Error rendering editor after failed save: {}", e);
            return web::HttpResponse::InternalServerError().body(message);
        }
    };

    let mut response = if err.kind() == ErrorKind::InvalidInput {
        web::HttpResponse::BadRequest()
    } else {
        error!("Error saving post: {}", err);
        web::HttpResponse::InternalServerError()
    };

    response
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

#[web::post("/delete")]
async fn delete_post(
    form: web::types::Form<DeleteForm>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    match state.store.delete(&form.slug) {
        Ok(()) => {
            info!("Deleted post {}", form.slug);
            web::HttpResponse::SeeOther()
                .header("Location", "/")
                .finish()
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            web::HttpResponse::NotFound().body("Post not found")
        }
        Err(e) => {
            error!("Error deleting post {}: {}", form.slug, e);
            web::HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[web::post("/api/grammar")]
async fn grammar_check(
    payload: web::types::Json<GrammarRequest>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let payload = payload.into_inner();
    let language = payload
        .language
        .filter(|language| !language.is_empty())
        .unwrap_or_else(|| state.grammar.language.clone());

    let rx = state.checker.submit(payload.text, language);

    // A dropped sender means a newer submission replaced this one. The
    // editor treats that as a non-event, so the status always rides on 200.
    let response = match rx.await {
        Ok(CheckOutcome::Checked(result)) => GrammarResponse::Checked { result },
        Ok(CheckOutcome::Cleared) => GrammarResponse::Cleared,
        Ok(CheckOutcome::Failed(message)) => GrammarResponse::Error { message },
        Err(_) => GrammarResponse::Superseded,
    };

    web::HttpResponse::Ok().json(&response)
}

#[web::get("/public/{file_name}")]
async fn public_files(
    path: web::types::Path<String>,
    state: web::types::State<Arc<AppState>>,
) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let store = PostStore::new(config.paths.posts_dir.clone());
    let grammar = config.grammar_settings();
    info!(
        "Grammar checks via {} (language {}, {}ms debounce)",
        grammar.endpoint, grammar.language, grammar.debounce_ms
    );

    let checker = DebouncedChecker::new(
        GrammarClient::new(grammar.endpoint.clone()),
        Duration::from_millis(grammar.debounce_ms),
    );

    let bind_addr = config.writer.address.clone();
    let bind_port = config.writer.port;
    let app_state = Arc::new(AppState {
        store,
        checker,
        grammar,
        config,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(new_post)
            .service(edit_post)
            .service(save_post)
            .service(delete_post)
            .service(grammar_check)
            .service(public_files)
    })
    .bind((bind_addr, bind_port))?
    .run()
    .await
}
