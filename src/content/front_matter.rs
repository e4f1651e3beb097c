use std::fmt::Write;

use serde::Deserialize;

/// A frontmatter block opens and closes with a line of exactly three hyphens.
pub const DELIMITER: &str = "---";

/// Example of a content file
/// ---
/// title: "What I learned after 20+ years of software development"
/// date: "2024-02-12"
/// draft: false
/// ---
///
/// How to be a great software engineer?
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub draft: Option<bool>,
}

#[derive(Debug, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Splits a raw content file into frontmatter fields and body text.
///
/// Parsing is total: a file without an opening delimiter, or with a block
/// that is unterminated or not valid YAML, comes back with default fields
/// and the whole text as body. The body is always trimmed.
pub fn parse_document(raw: &str) -> Document {
    let mut lines = raw.lines();

    let opens_block = match lines.next() {
        Some(first) => first.trim_end_matches('\r') == DELIMITER,
        None => false,
    };
    if !opens_block {
        return plain_document(raw);
    }

    let mut block = String::new();
    let mut terminated = false;
    for line in lines.by_ref() {
        if line.trim_end_matches('\r') == DELIMITER {
            terminated = true;
            break;
        }
        block.push_str(line);
        block.push('\n');
    }
    if !terminated {
        return plain_document(raw);
    }

    let front_matter = if block.trim().is_empty() {
        FrontMatter::default()
    } else {
        match serde_yaml::from_str::<FrontMatter>(&block) {
            Ok(fields) => fields,
            // A broken block reads the same as a missing one
            Err(_) => return plain_document(raw),
        }
    };

    let body: Vec<&str> = lines.collect();
    Document {
        front_matter,
        body: body.join("\n").trim().to_string(),
    }
}

/// Serializes a post back into the on-disk form:
/// delimiter, quoted title and date, bare draft boolean, blank line, body.
pub fn render_document(title: &str, date: &str, draft: bool, body: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "{}", DELIMITER);
    let _ = writeln!(&mut buf, "title: {}", quote(title));
    let _ = writeln!(&mut buf, "date: {}", quote(date));
    let _ = writeln!(&mut buf, "draft: {}", draft);
    let _ = writeln!(&mut buf, "{}", DELIMITER);
    let _ = writeln!(&mut buf);
    buf.push_str(body);

    buf
}

// Double-quoted YAML scalar. Titles may carry quotes and backslashes and
// still have to survive a save/read cycle.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn plain_document(raw: &str) -> Document {
    Document {
        front_matter: FrontMatter::default(),
        body: raw.trim().to_string(),
    }
}
