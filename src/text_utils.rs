use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Removes inline emphasis markers from a title, for contexts that want plain
/// text: page `<title>`, meta description, feed item titles.
pub fn strip_title_markup(title: &str) -> String {
    lazy_static! {
        static ref BOLD_REGEX: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
        static ref ITALIC_REGEX: Regex = Regex::new(r"\*(.+?)\*").unwrap();
        static ref STRIKE_REGEX: Regex = Regex::new(r"~~(.+?)~~").unwrap();
        static ref CODE_REGEX: Regex = Regex::new(r"`(.+?)`").unwrap();
    }

    let title = BOLD_REGEX.replace_all(title, "$1");
    let title = ITALIC_REGEX.replace_all(&title, "$1");
    let title = STRIKE_REGEX.replace_all(&title, "$1");
    let title = CODE_REGEX.replace_all(&title, "$1");
    title.into_owned()
}

/// First `max_chars` characters of the content with newlines flattened to
/// spaces. Feeds the meta description of a post page.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let head: String = content.chars().take(max_chars).collect();
    head.replace('\n', " ").trim().to_string()
}

/// `2024-06-15` reads as `Jun 15, 2024` on the page. Anything that is not an
/// ISO date is shown as stored.
pub fn format_display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
