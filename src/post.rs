/// A post as it exists in the content directory. The slug doubles as the
/// filename stem; the date stays the ISO string written in the file, so
/// whatever was stored is what comes back.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub content: String,
    pub draft: bool,
}

/// Everything the editor hands over on save. With `existing_slug` set the
/// post keeps its identity (and URL) even when the title changes.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub title: String,
    pub content: String,
    pub draft: bool,
    pub existing_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPost {
    pub slug: String,
    pub draft: bool,
}
