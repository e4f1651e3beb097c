/// Derives the URL-safe identifier (and filename stem) for a post title.
///
/// "Hello, World!" and "hello world" both become "hello-world". Titles
/// without any usable character produce an empty string, which callers
/// must reject.
pub fn slug_from_title(title: &str) -> String {
    let ascii = unidecode::unidecode(title);

    let mut slug = String::with_capacity(ascii.len());
    let mut prev_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            // Any run of separators or punctuation collapses to one hyphen
            slug.push('-');
            prev_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}
