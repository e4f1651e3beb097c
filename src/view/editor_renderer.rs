use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

/// Everything the editor form needs to draw itself, whether it is a blank
/// new-post page, an existing post, or a failed save being shown again with
/// the writer's input intact.
pub struct EditorForm<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub draft: bool,
    pub is_new: bool,
    pub error: Option<&'a str>,
    pub grammar_language: &'a str,
    pub grammar_debounce_ms: u64,
}

#[derive(ramhorns::Content)]
struct EditorPage<'a> {
    site_title: &'a str,
    heading: &'a str,
    slug: &'a str,
    title: &'a str,
    content: &'a str,
    draft: bool,
    is_new: bool,
    has_error: bool,
    error: &'a str,
    grammar_language: &'a str,
    debounce_ms: u64,
}

pub struct EditorRenderer<'a> {
    pub template: Template<'a>,
}

impl EditorRenderer<'_> {
    pub fn new(editor_tpl_src: &str) -> io::Result<EditorRenderer> {
        let template = match Template::new(editor_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing editor template: {}", e),
                ));
            }
        };

        Ok(EditorRenderer { template })
    }

    pub fn render(&self, site_title: &str, form: &EditorForm) -> String {
        self.template.render(&EditorPage {
            site_title,
            heading: if form.is_new { "New post" } else { "Edit post" },
            slug: form.slug,
            title: form.title,
            content: form.content,
            draft: form.draft,
            is_new: form.is_new,
            has_error: form.error.is_some(),
            error: form.error.unwrap_or(""),
            grammar_language: form.grammar_language,
            debounce_ms: form.grammar_debounce_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form<'a>(error: Option<&'a str>, is_new: bool) -> EditorForm<'a> {
        EditorForm {
            slug: "a-post",
            title: "A post",
            content: "Body <text>",
            draft: true,
            is_new,
            error,
            grammar_language: "auto",
            grammar_debounce_ms: 1500,
        }
    }

    #[test]
    fn render_edit_form() {
        let template_src =
            "{{heading}}|{{slug}}|{{title}}|{{content}}|{{#draft}}checked{{/draft}}|{{debounce_ms}}";
        let renderer = EditorRenderer::new(template_src).unwrap();
        let res = renderer.render("My Writing", &form(None, false));
        assert_eq!(res, "Edit post|a-post|A post|Body &lt;text&gt;|checked|1500");
    }

    #[test]
    fn render_new_form_with_error() {
        let template_src = "{{heading}}{{#has_error}}!{{error}}{{/has_error}}";
        let renderer = EditorRenderer::new(template_src).unwrap();

        let res = renderer.render("My Writing", &form(Some("Invalid title"), true));
        assert_eq!(res, "New post!Invalid title");

        let res = renderer.render("My Writing", &form(None, true));
        assert_eq!(res, "New post");
    }
}
