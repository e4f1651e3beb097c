use std::sync::Arc;
use std::{fs, io};

use ntex::web;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::config::Config;
use crate::post::Post;
use crate::post_render::render_markdown;
use crate::post_store::PostStore;
use crate::text_utils::strip_title_markup;
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::{FeedItem, RssChannel};

struct AppState {
    store: PostStore,
    config: Config,
}

fn render_front_page(config: &Config, posts: &[Post]) -> io::Result<String> {
    let template_src = fs::read_to_string(config.paths.template_dir.join("postlist.tpl"))?;
    let renderer = ListRenderer::new(&template_src)?;
    let author = config.site.author();

    Ok(renderer.render(
        config.site.title.as_str(),
        config.site.description.as_deref().unwrap_or(""),
        author.as_str(),
        posts,
        config.feed.is_some(),
    ))
}

fn render_post_page(config: &Config, post: &Post) -> io::Result<String> {
    let content_html = render_markdown(&post.content)?;
    let template_src = fs::read_to_string(config.paths.template_dir.join("view.tpl"))?;
    let renderer = PostRenderer::new(&template_src)?;

    Ok(renderer.render(config.site.title.as_str(), post, &content_html))
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let posts = match state.store.list_public() {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error listing posts: {}", e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error listing posts: {}", e));
        }
    };

    let rendered = match render_front_page(&state.config, &posts) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Error rendering post list: {}", e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error rendering post list: {}", e));
        }
    };

    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

#[web::get("/feed.xml")]
async fn feed(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let Some(ref feed_cfg) = state.config.feed else {
        return web::HttpResponse::NotFound().body("Feed not configured");
    };

    let posts = match state.store.list_public() {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error listing posts for feed: {}", e);
            return web::HttpResponse::InternalServerError().body("Error rendering feed");
        }
    };

    let items: Vec<FeedItem> = posts
        .iter()
        .map(|post| FeedItem {
            title: strip_title_markup(&post.title),
            slug: post.slug.clone(),
            date: post.date.clone(),
            description: render_markdown(&post.content).unwrap_or_default(),
        })
        .collect();

    let channel = RssChannel {
        ch_title: feed_cfg.title.as_str(),
        ch_link: feed_cfg.site_url.as_str(),
        ch_desc: feed_cfg.description.as_str(),
    };

    match channel.render(&items) {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Err(e) => {
            error!("Error rendering feed: {}", e);
            web::HttpResponse::InternalServerError().body("Error rendering feed")
        }
    }
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

#[web::get("/{slug}")]
async fn view(
    path: web::types::Path<String>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let slug = path.into_inner();

    // Drafts read as missing on the public side
    let post = match state.store.get_public(&slug) {
        Ok(Some(post)) => post,
        Ok(None) => return web::HttpResponse::NotFound().body("Post not found"),
        Err(e) => {
            error!("Error opening post {}: {}", slug, e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error loading post {}", slug));
        }
    };

    let rendered = match render_post_page(&state.config, &post) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Error rendering post {}: {}", slug, e);
            return web::HttpResponse::InternalServerError()
                .body(format!("Error rendering post {}", slug));
        }
    };

    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let store = PostStore::new(config.paths.posts_dir.clone());
    info!(
        "Serving posts from {:?} ({} published)",
        store.posts_dir(),
        store.list_public()?.len()
    );

    let bind_addr = config.blog.address.clone();
    let bind_port = config.blog.port;
    let app_state = Arc::new(AppState { store, config });

    // The post view is a catch-all, so every fixed route comes first
    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(feed)
            .service(public_files)
            .service(view)
    })
    .bind((bind_addr, bind_port))?
    .run()
    .await
}
