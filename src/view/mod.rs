pub mod editor_renderer;
pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;
pub mod writer_list_renderer;
