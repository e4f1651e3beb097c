use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::Utc;
use spdlog::error;

use crate::content::front_matter;
use crate::content::slug::slug_from_title;
use crate::post::{Post, SaveRequest, SavedPost};

pub const CONTENT_EXTENSION: &str = "mdx";

/// The content directory accessor both applications go through. One file per
/// slug, no index on the side: the directory listing is read fresh on every
/// call, and a save replaces the whole file (last write wins).
pub struct PostStore {
    posts_dir: PathBuf,
}

impl PostStore {
    pub fn new(posts_dir: PathBuf) -> Self {
        PostStore { posts_dir }
    }

    pub fn posts_dir(&self) -> &Path {
        self.posts_dir.as_path()
    }

    /// All posts, drafts included, newest first. A content directory that
    /// does not exist yet reads as an empty store.
    pub fn list_posts(&self) -> io::Result<Vec<Post>> {
        let entries = match fs::read_dir(&self.posts_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut posts = vec![];
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = file_name.strip_suffix(&format!(".{}", CONTENT_EXTENSION)) else {
                continue;
            };
            let raw = fs::read_to_string(entry.path())?;
            posts.push(post_from_raw(stem, &raw));
        }

        // ISO dates sort correctly as strings. The sort is stable, so posts
        // sharing a date keep whatever order the directory produced, which
        // callers must not rely on.
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(posts)
    }

    /// The public listing: like `list_posts`, minus drafts.
    pub fn list_public(&self) -> io::Result<Vec<Post>> {
        let posts = self.list_posts()?;
        Ok(posts.into_iter().filter(|post| !post.draft).collect())
    }

    /// A missing file is a normal miss, not an error.
    pub fn get_post(&self, slug: &str) -> io::Result<Option<Post>> {
        if !is_safe_slug(slug) {
            return Ok(None);
        }
        let raw = match fs::read_to_string(self.post_path(slug)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(Some(post_from_raw(slug, &raw)))
    }

    /// Public lookup: a draft behind a guessed slug reads as missing.
    pub fn get_public(&self, slug: &str) -> io::Result<Option<Post>> {
        Ok(self.get_post(slug)?.filter(|post| !post.draft))
    }

    /// Writes the post as frontmatter plus body, creating the content
    /// directory on first use. The slug of an existing post survives title
    /// changes, and so does its stored date.
    pub fn save(&self, request: &SaveRequest) -> io::Result<SavedPost> {
        if request.title.trim().is_empty() {
            return Err(io::Error::new(ErrorKind::InvalidInput, "Invalid title"));
        }

        let slug = match request.existing_slug {
            Some(ref existing) if !existing.is_empty() => existing.clone(),
            _ => slug_from_title(&request.title),
        };
        // Covers titles that derive nothing and forged slugs alike
        if !is_safe_slug(&slug) {
            return Err(io::Error::new(ErrorKind::InvalidInput, "Invalid title"));
        }

        let existing = match self.get_post(&slug) {
            Ok(existing) => existing,
            Err(e) => {
                error!("Error reading existing post {}: {}", slug, e);
                return Err(io::Error::new(e.kind(), "Failed to save post"));
            }
        };
        // Editing never moves the publish date; only a brand-new slug gets today
        let date = match existing {
            Some(post) if !post.date.is_empty() => post.date,
            _ => today(),
        };

        let document =
            front_matter::render_document(&request.title, &date, request.draft, &request.content);

        if let Err(e) = fs::create_dir_all(&self.posts_dir) {
            error!("Error creating content dir {:?}: {}", self.posts_dir, e);
            return Err(io::Error::new(e.kind(), "Failed to save post"));
        }
        if let Err(e) = fs::write(self.post_path(&slug), document) {
            error!("Error writing post {}: {}", slug, e);
            return Err(io::Error::new(e.kind(), "Failed to save post"));
        }

        Ok(SavedPost {
            slug,
            draft: request.draft,
        })
    }

    pub fn delete(&self, slug: &str) -> io::Result<()> {
        if !is_safe_slug(slug) || !self.post_path(slug).exists() {
            return Err(io::Error::new(ErrorKind::NotFound, "Post not found"));
        }
        if let Err(e) = fs::remove_file(self.post_path(slug)) {
            error!("Error deleting post {}: {}", slug, e);
            return Err(io::Error::new(e.kind(), "Failed to delete post"));
        }
        Ok(())
    }

    fn post_path(&self, slug: &str) -> PathBuf {
        self.posts_dir
            .join(format!("{}.{}", slug, CONTENT_EXTENSION))
    }
}

fn post_from_raw(slug: &str, raw: &str) -> Post {
    let document = front_matter::parse_document(raw);
    Post {
        slug: slug.to_string(),
        title: document
            .front_matter
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| slug.to_string()),
        date: document.front_matter.date.unwrap_or_default(),
        content: document.body,
        draft: document.front_matter.draft.unwrap_or(false),
    }
}

// Slugs never carry path fragments; anything that does is a plain miss.
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains("..") && !slug.contains('/') && !slug.contains('\\')
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn temp_store() -> (TempDir, PostStore) {
        let dir = TempDir::new().unwrap();
        let store = PostStore::new(dir.path().join("posts"));
        (dir, store)
    }

    fn request(title: &str, content: &str, draft: bool) -> SaveRequest {
        SaveRequest {
            title: title.to_string(),
            content: content.to_string(),
            draft,
            existing_slug: None,
        }
    }

    fn write_raw(store: &PostStore, slug: &str, title: &str, date: &str, draft: bool) {
        fs::create_dir_all(store.posts_dir()).unwrap();
        let document = front_matter::render_document(title, date, draft, "body");
        fs::write(store.posts_dir().join(format!("{}.mdx", slug)), document).unwrap();
    }

    #[test]
    fn test_save_and_read_back() {
        let (_dir, store) = temp_store();
        let saved = store
            .save(&request("Hello, World!", "Some **body** text.", false))
            .unwrap();
        assert_eq!(saved.slug, "hello-world");
        assert!(!saved.draft);

        let post = store.get_post(&saved.slug).unwrap().unwrap();
        assert_eq!(post.title, "Hello, World!");
        assert_eq!(post.content, "Some **body** text.");
        assert!(!post.draft);
        assert_eq!(post.date, today());
    }

    #[test]
    fn test_missing_dir_lists_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list_posts().unwrap().is_empty());
        assert!(store.list_public().unwrap().is_empty());
        assert!(store.get_post("anything").unwrap().is_none());
    }

    #[test]
    fn test_draft_isolation() {
        let (_dir, store) = temp_store();
        store.save(&request("Secret Draft", "wip", true)).unwrap();
        store.save(&request("Published", "done", false)).unwrap();

        let public: Vec<String> = store
            .list_public()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(public, ["published"]);
        assert!(store.get_public("secret-draft").unwrap().is_none());

        let all: Vec<String> = store
            .list_posts()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert!(all.contains(&"secret-draft".to_string()));
        assert!(store.get_post("secret-draft").unwrap().is_some());
    }

    #[test]
    fn test_listing_order_by_date_desc() {
        let (_dir, store) = temp_store();
        write_raw(&store, "jan", "January", "2024-01-01", false);
        write_raw(&store, "jun", "June", "2024-06-15", false);
        write_raw(&store, "dec", "December", "2023-12-31", false);

        let dates: Vec<String> = store
            .list_public()
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, ["2024-06-15", "2024-01-01", "2023-12-31"]);
    }

    #[test]
    fn test_date_survives_edits() {
        let (_dir, store) = temp_store();
        write_raw(&store, "old-post", "Old Post", "2020-05-05", false);

        let saved = store
            .save(&SaveRequest {
                title: "A Better Title".to_string(),
                content: "rewritten".to_string(),
                draft: true,
                existing_slug: Some("old-post".to_string()),
            })
            .unwrap();
        assert_eq!(saved.slug, "old-post");

        let post = store.get_post("old-post").unwrap().unwrap();
        assert_eq!(post.date, "2020-05-05");
        assert_eq!(post.title, "A Better Title");
        assert_eq!(post.content, "rewritten");
        assert!(post.draft);
    }

    #[test]
    fn test_new_slug_gets_today() {
        let (_dir, store) = temp_store();
        let saved = store.save(&request("Fresh Post", "", true)).unwrap();
        let post = store.get_post(&saved.slug).unwrap().unwrap();
        assert_eq!(post.date, today());
    }

    #[test]
    fn test_resaving_same_title_keeps_date() {
        let (_dir, store) = temp_store();
        write_raw(&store, "same-title", "Same Title", "2019-01-01", false);

        store.save(&request("Same Title", "second take", false)).unwrap();
        let post = store.get_post("same-title").unwrap().unwrap();
        assert_eq!(post.date, "2019-01-01");
    }

    #[test]
    fn test_existing_slug_survives_title_change() {
        let (_dir, store) = temp_store();
        let first = store.save(&request("First Title", "v1", true)).unwrap();

        let second = store
            .save(&SaveRequest {
                title: "Completely Different".to_string(),
                content: "v2".to_string(),
                draft: true,
                existing_slug: Some(first.slug.clone()),
            })
            .unwrap();
        assert_eq!(second.slug, "first-title");
        assert!(store.get_post("completely-different").unwrap().is_none());
    }

    #[test]
    fn test_delete_then_get() {
        let (_dir, store) = temp_store();
        let saved = store.save(&request("Short Lived", "", false)).unwrap();

        store.delete(&saved.slug).unwrap();
        assert!(store.get_post(&saved.slug).unwrap().is_none());

        let err = store.delete(&saved.slug).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Post not found");
    }

    #[test]
    fn test_delete_missing_post() {
        let (_dir, store) = temp_store();
        let err = store.delete("never-existed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_title_rejected_before_any_write() {
        let (_dir, store) = temp_store();
        for title in ["", "   ", "\t\n"] {
            let err = store.save(&request(title, "content", true)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert_eq!(err.to_string(), "Invalid title");
        }
        // Titles with no usable character derive an empty slug
        let err = store.save(&request("!!!", "content", true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(!store.posts_dir().exists());
    }

    #[test]
    fn test_path_fragments_read_as_misses() {
        let (_dir, store) = temp_store();
        store.save(&request("Innocent", "", false)).unwrap();

        assert!(store.get_post("../innocent").unwrap().is_none());
        assert!(store.get_post("a/b").unwrap().is_none());
        assert!(store.get_public("..\\innocent").unwrap().is_none());
        let err = store.delete("../innocent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_forged_slug_rejected_on_save() {
        let (_dir, store) = temp_store();
        let mut forged = request("Fine title", "content", false);
        forged.existing_slug = Some("../outside".to_string());

        let err = store.save(&forged).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!store.posts_dir().exists());
    }

    #[test]
    fn test_file_without_front_matter() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.posts_dir()).unwrap();
        fs::write(
            store.posts_dir().join("bare-notes.mdx"),
            "Just text, no header.\n",
        )
        .unwrap();

        let post = store.get_post("bare-notes").unwrap().unwrap();
        assert_eq!(post.title, "bare-notes");
        assert_eq!(post.date, "");
        assert_eq!(post.content, "Just text, no header.");
        assert!(!post.draft);
    }

    #[test]
    fn test_only_content_extension_is_listed() {
        let (_dir, store) = temp_store();
        store.save(&request("Real Post", "", false)).unwrap();
        fs::write(store.posts_dir().join("notes.md"), "ignored").unwrap();
        fs::write(store.posts_dir().join("draft.txt"), "ignored").unwrap();

        let slugs: Vec<String> = store
            .list_posts()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, ["real-post"]);
    }
}
