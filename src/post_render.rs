use std::io;
use std::io::ErrorKind;

use markdown::Options;

/// Post bodies are GFM: tables, strikethrough and autolinks all render.
pub fn render_markdown(md_text: &str) -> io::Result<String> {
    match markdown::to_html_with_options(md_text, &Options::gfm()) {
        Ok(html) => Ok(html),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
    }
}

/// Inline rendering for titles: same pipeline, minus the paragraph wrapper
/// the block renderer puts around a single line.
pub fn render_inline_markdown(md_text: &str) -> io::Result<String> {
    let html = render_markdown(md_text)?;
    let html = html.trim();
    let inner = html
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
        .unwrap_or(html);
    Ok(inner.to_string())
}
