use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::text_utils::{format_display_date, strip_title_markup};

#[derive(ramhorns::Content)]
struct WriterPage<'a> {
    site_title: &'a str,
    has_posts: bool,
    posts: Vec<WriterItem>,
}

#[derive(ramhorns::Content)]
struct WriterItem {
    slug: String,
    edit_link: String,
    title: String,
    date: String,
    draft: bool,
}

/// The writer's workspace listing: every post, drafts included, with edit
/// links and a delete control per row.
pub struct WriterListRenderer<'a> {
    pub template: Template<'a>,
}

impl WriterListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<WriterListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing writer list template: {}", e),
                ));
            }
        };

        Ok(WriterListRenderer { template })
    }

    pub fn render(&self, site_title: &str, posts: &[Post]) -> String {
        let items: Vec<WriterItem> = posts
            .iter()
            .map(|post| WriterItem {
                slug: post.slug.clone(),
                edit_link: format!("/edit/{}", post.slug),
                title: strip_title_markup(&post.title),
                date: format_display_date(&post.date),
                draft: post.draft,
            })
            .collect();

        self.template.render(&WriterPage {
            site_title,
            has_posts: !items.is_empty(),
            posts: items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, title: &str, date: &str, draft: bool) -> Post {
        Post {
            slug: slug.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            content: String::new(),
            draft,
        }
    }

    #[test]
    fn render_writer_list() {
        let template_src =
            "{{#posts}}[{{edit_link}} {{title}}{{#draft}} (draft){{/draft}}]{{/posts}}";
        let renderer = WriterListRenderer::new(template_src).unwrap();

        let posts = vec![
            post("wip", "**Work** in progress", "2024-06-15", true),
            post("done", "Done", "2024-01-01", false),
        ];
        let res = renderer.render("My Writing", &posts);
        assert_eq!(res, "[/edit/wip Work in progress (draft)][/edit/done Done]");
    }

    #[test]
    fn render_writer_list_empty() {
        let template_src = "{{^has_posts}}Nothing here yet.{{/has_posts}}";
        let renderer = WriterListRenderer::new(template_src).unwrap();
        assert_eq!(renderer.render("My Writing", &[]), "Nothing here yet.");
    }
}
