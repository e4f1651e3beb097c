pub mod blog_server;
pub mod config;
pub mod logger;
pub mod writer_server;
mod content;
mod grammar;
mod post;
mod post_render;
mod post_store;
mod text_utils;
mod view;
