use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::post_render::render_inline_markdown;
use crate::text_utils::{excerpt, format_display_date, strip_title_markup};

const META_DESCRIPTION_CHARS: usize = 160;

#[derive(ramhorns::Content)]
struct ViewPage<'a> {
    site_title: &'a str,
    page_title: String,
    meta_description: String,
    title_html: String,
    date_display: String,
    content_html: &'a str,
}

/// A single public post page. The `<title>` and meta description use the
/// plain title and a short excerpt of the raw content; the visible heading
/// keeps its inline formatting.
pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing post view template: {}", e),
                ));
            }
        };

        Ok(PostRenderer { template })
    }

    pub fn render(&self, site_title: &str, post: &Post, content_html: &str) -> String {
        self.template.render(&ViewPage {
            site_title,
            page_title: strip_title_markup(&post.title),
            meta_description: excerpt(&post.content, META_DESCRIPTION_CHARS),
            title_html: render_inline_markdown(&post.title)
                .unwrap_or_else(|_| post.title.clone()),
            date_display: format_display_date(&post.date),
            content_html,
        })
    }
}
