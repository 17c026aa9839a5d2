//! Bookmark operations built on top of the raw API calls: title and tag
//! auto-fill on create, read-modify-write updates, and the reading list.

use anyhow::Result;
use tracing::{debug, warn};

use crate::client::{LinkhutClient, NewPost, Post, PostQuery, PreviewClient};
use crate::utils::verify_url;

/// Tag LinkHut attaches to bookmarks marked to-read.
pub const READING_LIST_TAG: &str = "unread";
pub const DEFAULT_READING_LIST_COUNT: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Fetched from LinkPreview when absent.
    pub title: Option<String>,
    pub note: Option<String>,
    /// Suggested by LinkHut when absent and `fetch_tags` is set.
    pub tags: Option<Vec<String>>,
    pub fetch_tags: bool,
    pub private: bool,
    pub to_read: bool,
    pub replace: bool,
}

/// Edits applied by `update`. Tags replace, notes append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkChanges {
    pub tags: Option<Vec<String>>,
    pub note: Option<String>,
    pub private: Option<bool>,
}

impl BookmarkChanges {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.note.is_none() && self.private.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(NewPost),
    Updated(NewPost),
    Unchanged,
}

pub fn append_note(existing: &str, addition: Option<&str>) -> String {
    match addition.map(str::trim).filter(|a| !a.is_empty()) {
        None => existing.to_string(),
        Some(addition) if existing.trim().is_empty() => addition.to_string(),
        Some(addition) => format!("{}\n{}", existing.trim_end(), addition),
    }
}

fn title_or_url(post: &Post) -> String {
    if post.description.trim().is_empty() {
        post.href.clone()
    } else {
        post.description.clone()
    }
}

/// Work out the re-post that flips a bookmark's to-read flag, or `None` when
/// it is already in the requested state and there is no note to add.
pub fn plan_toggle(existing: &Post, to_read: bool, note: Option<&str>) -> Option<NewPost> {
    if existing.toread == to_read && note.is_none() {
        return None;
    }

    // A replace keeps whatever tags are sent, so a read bookmark must drop the
    // reading-list tag itself
    let tags = existing
        .tags
        .iter()
        .filter(|t| to_read || t.as_str() != READING_LIST_TAG)
        .cloned()
        .collect();

    Some(NewPost {
        url: existing.href.clone(),
        title: title_or_url(existing),
        note: Some(append_note(&existing.extended, note)),
        tags,
        private: existing.is_private(),
        to_read,
        replace: true,
    })
}

pub fn plan_update(existing: &Post, changes: &BookmarkChanges) -> NewPost {
    NewPost {
        url: existing.href.clone(),
        title: title_or_url(existing),
        note: Some(append_note(&existing.extended, changes.note.as_deref())),
        tags: changes
            .tags
            .clone()
            .unwrap_or_else(|| existing.tags.clone()),
        private: changes.private.unwrap_or_else(|| existing.is_private()),
        to_read: existing.toread,
        replace: true,
    }
}

pub struct Bookmarks {
    api: LinkhutClient,
    preview: Option<PreviewClient>,
}

impl Bookmarks {
    pub fn new(api: LinkhutClient, preview: Option<PreviewClient>) -> Self {
        Self { api, preview }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<Vec<Post>> {
        self.api.posts(query).await
    }

    pub async fn reading_list(&self, count: u32) -> Result<Vec<Post>> {
        let query = PostQuery::Recent {
            count,
            tag: Some(READING_LIST_TAG.to_string()),
        };
        self.api.posts(&query).await
    }

    pub async fn create(&self, url: &str, options: CreateOptions) -> Result<NewPost> {
        verify_url(url)?;

        let title = match options.title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title,
            None => self.fetch_title(url).await,
        };

        let tags = match options.tags {
            Some(tags) => tags,
            None if options.fetch_tags => match self.api.suggest_tags(url).await {
                Ok(tags) => {
                    debug!(?tags, "suggested tags");
                    tags
                }
                Err(e) => {
                    warn!("Failed to auto-suggest tags: {:#}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let post = NewPost {
            url: url.to_string(),
            title,
            note: options.note,
            tags,
            private: options.private,
            to_read: options.to_read,
            replace: options.replace,
        };
        self.api.add_post(&post).await?;
        Ok(post)
    }

    async fn fetch_title(&self, url: &str) -> String {
        let Some(preview) = &self.preview else {
            warn!("LINK_PREVIEW_API_KEY is not set, using the URL as title");
            return url.to_string();
        };

        match preview.title(url).await {
            Ok(title) => {
                debug!(%title, "auto-fetched title");
                title
            }
            Err(e) => {
                warn!("Failed to auto-fetch title: {:#}", e);
                url.to_string()
            }
        }
    }

    /// Mark a bookmark read or to-read, creating it if needed.
    pub async fn toggle_read(
        &self,
        url: &str,
        to_read: bool,
        note: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<Outcome> {
        let Some(existing) = self.api.find_post(url).await? else {
            debug!(url, "no bookmark yet, creating one");
            let options = CreateOptions {
                note,
                tags,
                fetch_tags: true,
                to_read,
                ..Default::default()
            };
            return Ok(Outcome::Created(self.create(url, options).await?));
        };

        debug!(url, current = existing.toread, requested = to_read, "toggling to-read");
        match plan_toggle(&existing, to_read, note.as_deref()) {
            Some(post) => {
                self.api.add_post(&post).await?;
                Ok(Outcome::Updated(post))
            }
            None => Ok(Outcome::Unchanged),
        }
    }

    pub async fn update(&self, url: &str, changes: BookmarkChanges) -> Result<Outcome> {
        if changes.is_empty() {
            debug!("no updates provided");
            return Ok(Outcome::Unchanged);
        }

        let Some(existing) = self.api.find_post(url).await? else {
            debug!(url, "no bookmark yet, creating one");
            let options = CreateOptions {
                note: changes.note,
                tags: changes.tags,
                fetch_tags: true,
                private: changes.private.unwrap_or(true),
                ..Default::default()
            };
            return Ok(Outcome::Created(self.create(url, options).await?));
        };

        let post = plan_update(&existing, &changes);
        self.api.add_post(&post).await?;
        Ok(Outcome::Updated(post))
    }

    pub async fn delete(&self, url: &str) -> Result<bool> {
        self.api.delete_post(url).await
    }

    pub async fn rename_tag(&self, old_tag: &str, new_tag: &str) -> Result<bool> {
        self.api.rename_tag(old_tag, new_tag).await
    }

    pub async fn delete_tag(&self, tag: &str) -> Result<bool> {
        self.api.delete_tag(tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(toread: bool, shared: bool) -> Post {
        Post {
            href: "https://huggingface.co/blog/gradio-mcp".to_string(),
            description: "Gradio MCP".to_string(),
            extended: "first thoughts".to_string(),
            tags: vec!["mcp".to_string(), "python".to_string()],
            shared,
            toread,
            time: None,
            hash: None,
        }
    }

    #[test]
    fn append_note_variants() {
        assert_eq!(append_note("old", None), "old");
        assert_eq!(append_note("old", Some("  ")), "old");
        assert_eq!(append_note("", Some("new")), "new");
        assert_eq!(append_note("old\n", Some("new")), "old\nnew");
    }

    #[test]
    fn toggle_is_noop_when_state_matches_and_no_note() {
        assert!(plan_toggle(&post(true, true), true, None).is_none());
        assert!(plan_toggle(&post(false, true), false, None).is_none());
    }

    #[test]
    fn toggle_keeps_metadata_and_flips_flag() {
        let planned = plan_toggle(&post(false, false), true, None).unwrap();
        assert_eq!(planned.url, "https://huggingface.co/blog/gradio-mcp");
        assert_eq!(planned.title, "Gradio MCP");
        assert_eq!(planned.tags, vec!["mcp", "python"]);
        assert_eq!(planned.note.as_deref(), Some("first thoughts"));
        assert!(planned.private);
        assert!(planned.to_read);
        assert!(planned.replace);
    }

    #[test]
    fn toggle_with_note_appends_even_when_state_matches() {
        let planned = plan_toggle(&post(true, true), true, Some("second look")).unwrap();
        assert_eq!(planned.note.as_deref(), Some("first thoughts\nsecond look"));
        assert!(planned.to_read);
        assert!(!planned.private);
    }

    #[test]
    fn marking_read_drops_reading_list_tag() {
        let mut existing = post(true, true);
        existing.tags.push(READING_LIST_TAG.to_string());

        let read = plan_toggle(&existing, false, None).unwrap();
        assert_eq!(read.tags, vec!["mcp", "python"]);
        assert!(!read.to_read);

        let again = plan_toggle(&existing, true, Some("still pending")).unwrap();
        assert_eq!(again.tags, vec!["mcp", "python", "unread"]);
    }

    #[test]
    fn toggle_uses_url_when_title_missing() {
        let mut existing = post(false, true);
        existing.description = String::new();
        let planned = plan_toggle(&existing, true, None).unwrap();
        assert_eq!(planned.title, existing.href);
    }

    #[test]
    fn update_replaces_tags_and_appends_note() {
        let changes = BookmarkChanges {
            tags: Some(vec!["gradio".to_string()]),
            note: Some("revisit".to_string()),
            private: None,
        };
        let planned = plan_update(&post(true, true), &changes);
        assert_eq!(planned.tags, vec!["gradio"]);
        assert_eq!(planned.note.as_deref(), Some("first thoughts\nrevisit"));
        assert!(!planned.private);
        assert!(planned.to_read);
        assert!(planned.replace);
    }

    #[test]
    fn update_visibility_only_keeps_tags() {
        let changes = BookmarkChanges {
            private: Some(false),
            ..Default::default()
        };
        let planned = plan_update(&post(false, false), &changes);
        assert_eq!(planned.tags, vec!["mcp", "python"]);
        assert_eq!(planned.note.as_deref(), Some("first thoughts"));
        assert!(!planned.private);
        assert!(!planned.to_read);
    }

    #[test]
    fn changes_emptiness() {
        assert!(BookmarkChanges::default().is_empty());
        assert!(!BookmarkChanges {
            note: Some("x".to_string()),
            ..Default::default()
        }
        .is_empty());
    }

    #[tokio::test]
    async fn update_without_changes_makes_no_request() {
        // An unreachable server proves nothing is sent
        let api = LinkhutClient::new("http://127.0.0.1:1", "t").unwrap();
        let bookmarks = Bookmarks::new(api, None);
        let outcome = bookmarks
            .update("https://a.example", BookmarkChanges::default())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn create_rejects_invalid_url_before_any_request() {
        let api = LinkhutClient::new("http://127.0.0.1:1", "t").unwrap();
        let bookmarks = Bookmarks::new(api, None);
        let err = bookmarks
            .create("ftp://a.example", CreateOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    mod against_stub {
        use super::*;
        use crate::client::test_server::StubServer;

        const DONE: &str = r#"{"result_code":"done"}"#;
        const URL: &str = "https://a.example/page";
        const EXISTING: &str = r#"{"date": "", "user": "reader", "posts": [{
            "href": "https://a.example/page",
            "description": "A page",
            "extended": "seen once",
            "tags": "web unread",
            "shared": "no",
            "toread": "yes"
        }]}"#;

        fn bookmarks(server: &StubServer) -> Bookmarks {
            Bookmarks::new(LinkhutClient::new(&server.base_url, "t").unwrap(), None)
        }

        #[tokio::test]
        async fn create_without_preview_falls_back_to_url_and_no_tags() {
            let server = StubServer::start(&[
                ("/v1/posts/suggest", 500, "boom"),
                ("/v1/posts/add", 200, DONE),
            ])
            .await;
            let options = CreateOptions {
                fetch_tags: true,
                private: true,
                ..Default::default()
            };

            let post = bookmarks(&server).create(URL, options).await.unwrap();
            assert_eq!(post.title, URL);
            assert!(post.tags.is_empty());

            let add = server.last("/v1/posts/add");
            assert_eq!(add.param("url"), Some(URL));
            assert_eq!(add.param("description"), Some(URL));
            assert_eq!(add.param("shared"), Some("no"));
            assert_eq!(add.param("tags"), None);
            assert_eq!(server.paths(), vec!["/v1/posts/suggest", "/v1/posts/add"]);
        }

        #[tokio::test]
        async fn create_with_failing_preview_falls_back_to_url() {
            let server = StubServer::start(&[("/v1/posts/add", 200, DONE)]).await;
            let preview_server = StubServer::start(&[("/", 403, "invalid key")]).await;
            let api = LinkhutClient::new(&server.base_url, "t").unwrap();
            let preview = PreviewClient::new(&preview_server.base_url, "k").unwrap();
            let bookmarks = Bookmarks::new(api, Some(preview));

            let options = CreateOptions {
                tags: Some(vec!["given".to_string()]),
                ..Default::default()
            };
            let post = bookmarks.create(URL, options).await.unwrap();

            assert_eq!(post.title, URL);
            assert_eq!(preview_server.last("/").param("q"), Some(URL));
            assert_eq!(server.last("/v1/posts/add").param("tags"), Some("given"));
        }

        #[tokio::test]
        async fn create_uses_preview_title() {
            let server = StubServer::start(&[("/v1/posts/add", 200, DONE)]).await;
            let preview_server = StubServer::start(&[(
                "/",
                200,
                r#"{"title": "Fetched title", "description": "", "url": "https://a.example/page"}"#,
            )])
            .await;
            let api = LinkhutClient::new(&server.base_url, "t").unwrap();
            let preview = PreviewClient::new(&preview_server.base_url, "k").unwrap();

            let post = Bookmarks::new(api, Some(preview))
                .create(URL, CreateOptions::default())
                .await
                .unwrap();

            assert_eq!(post.title, "Fetched title");
            assert_eq!(
                server.last("/v1/posts/add").param("description"),
                Some("Fetched title")
            );
        }

        #[tokio::test]
        async fn toggle_on_missing_bookmark_creates_it_to_read() {
            let server = StubServer::start(&[
                (
                    "/v1/posts/suggest",
                    200,
                    r#"[{"popular": ["web"]}, {"recommended": []}]"#,
                ),
                ("/v1/posts/add", 200, DONE),
            ])
            .await;

            let outcome = bookmarks(&server)
                .toggle_read(URL, true, None, None)
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Created(ref p) if p.to_read));

            assert_eq!(
                server.paths(),
                vec!["/v1/posts/get", "/v1/posts/suggest", "/v1/posts/add"]
            );
            let add = server.last("/v1/posts/add");
            assert_eq!(add.param("toread"), Some("yes"));
            assert_eq!(add.param("tags"), Some("web"));
            assert_eq!(add.param("replace"), None);
        }

        #[tokio::test]
        async fn toggle_read_replaces_and_drops_reading_list_tag() {
            let server = StubServer::start(&[
                ("/v1/posts/get", 200, EXISTING),
                ("/v1/posts/add", 200, DONE),
            ])
            .await;

            let outcome = bookmarks(&server)
                .toggle_read(URL, false, None, None)
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Updated(_)));

            let add = server.last("/v1/posts/add");
            assert_eq!(add.param("replace"), Some("yes"));
            assert_eq!(add.param("toread"), None);
            assert_eq!(add.param("tags"), Some("web"));
            assert_eq!(add.param("shared"), Some("no"));
            assert_eq!(add.param("description"), Some("A page"));
            assert_eq!(add.param("extended"), Some("seen once"));
        }

        #[tokio::test]
        async fn toggle_already_in_state_sends_nothing_more() {
            let server = StubServer::start(&[("/v1/posts/get", 200, EXISTING)]).await;

            let outcome = bookmarks(&server)
                .toggle_read(URL, true, None, None)
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Unchanged);
            assert_eq!(server.paths(), vec!["/v1/posts/get"]);
        }

        #[tokio::test]
        async fn update_on_missing_bookmark_creates_private_one() {
            let server = StubServer::start(&[("/v1/posts/add", 200, DONE)]).await;
            let changes = BookmarkChanges {
                tags: Some(vec!["rust".to_string(), "cli".to_string()]),
                note: Some("from update".to_string()),
                private: None,
            };

            let outcome = bookmarks(&server).update(URL, changes).await.unwrap();
            assert!(matches!(outcome, Outcome::Created(ref p) if p.private));

            // Tags were given, so no suggestion lookup
            assert_eq!(server.paths(), vec!["/v1/posts/get", "/v1/posts/add"]);
            let add = server.last("/v1/posts/add");
            assert_eq!(add.param("shared"), Some("no"));
            assert_eq!(add.param("extended"), Some("from update"));
            assert_eq!(add.param("tags"), Some("rust,cli"));
        }

        #[tokio::test]
        async fn update_on_existing_bookmark_replaces_tags() {
            let server = StubServer::start(&[
                ("/v1/posts/get", 200, EXISTING),
                ("/v1/posts/add", 200, DONE),
            ])
            .await;
            let changes = BookmarkChanges {
                tags: Some(vec!["reference".to_string()]),
                note: Some("second pass".to_string()),
                private: Some(false),
            };

            let outcome = bookmarks(&server).update(URL, changes).await.unwrap();
            assert!(matches!(outcome, Outcome::Updated(_)));

            let add = server.last("/v1/posts/add");
            assert_eq!(add.param("replace"), Some("yes"));
            assert_eq!(add.param("tags"), Some("reference"));
            assert_eq!(add.param("extended"), Some("seen once\nsecond pass"));
            assert_eq!(add.param("shared"), None);
            assert_eq!(add.param("toread"), Some("yes"));
        }

        #[tokio::test]
        async fn reading_list_asks_for_unread_tag() {
            let server = StubServer::start(&[("/v1/posts/recent", 200, EXISTING)]).await;

            let posts = bookmarks(&server).reading_list(5).await.unwrap();
            assert_eq!(posts.len(), 1);

            let request = server.last("/v1/posts/recent");
            assert_eq!(request.param("tag"), Some(READING_LIST_TAG));
            assert_eq!(request.param("count"), Some("5"));
        }
    }
}
