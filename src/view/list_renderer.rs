use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::post_render::render_inline_markdown;
use crate::text_utils::format_display_date;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site_title: &'a str,
    site_description: &'a str,
    site_author: &'a str,
    has_posts: bool,
    posts: Vec<ListItem>,
    has_feed: bool,
}

#[derive(ramhorns::Content)]
struct ListItem {
    link: String,
    title: String,
    date: String,
}

/// The public front page: every published post, newest first.
pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing list template: {}", e),
                ));
            }
        };

        Ok(ListRenderer { template })
    }

    pub fn render(
        &self,
        site_title: &str,
        site_description: &str,
        site_author: &str,
        posts: &[Post],
        has_feed: bool,
    ) -> String {
        let items: Vec<ListItem> = posts
            .iter()
            .map(|post| ListItem {
                link: format!("/{}", post.slug),
                // Titles may carry inline emphasis; template uses {{{title}}}
                title: render_inline_markdown(&post.title)
                    .unwrap_or_else(|_| post.title.clone()),
                date: format_display_date(&post.date),
            })
            .collect();

        self.template.render(&ListPage {
            site_title,
            site_description,
            site_author,
            has_posts: !items.is_empty(),
            posts: items,
            has_feed,
        })
    }
}
