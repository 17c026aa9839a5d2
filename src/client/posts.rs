use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::LinkhutClient;
use crate::error::LinkhutError;

/// How many posts `bookmarks list` shows with no filters.
pub const DEFAULT_RECENT_COUNT: u32 = 15;

/// Tag used when suggestion lookup comes back empty.
pub const FALLBACK_TAG: &str = "AutoTagFetchFailed";

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    // No timezone: assume UTC
    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];
    for format in &formats {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&s, format) {
            return Ok(Some(Utc.from_utc_datetime(&dt)));
        }
    }

    Err(serde::de::Error::custom(format!(
        "Failed to parse datetime: {}",
        s
    )))
}

/// LinkHut encodes booleans as "yes"/"no"; accept real booleans too.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(true),
            "no" | "false" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "Expected yes/no, got: {}",
                other
            ))),
        },
    }
}

/// Missing and `null` both read as empty text.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(crate::utils::parse_tags(&[s]))
}

fn default_shared() -> bool {
    true
}

/// A bookmark as LinkHut returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub href: String,
    /// Bookmark title
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    /// Free-form note
    #[serde(default, deserialize_with = "deserialize_text")]
    pub extended: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_shared", deserialize_with = "deserialize_flag")]
    pub shared: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub toread: bool,
    #[serde(default, deserialize_with = "deserialize_datetime")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl Post {
    pub fn is_private(&self) -> bool {
        !self.shared
    }

    pub fn title(&self) -> &str {
        if self.description.is_empty() {
            "No title"
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Post>,
}

/// Which posts endpoint to hit and with what filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    /// `/v1/posts/recent`, which accepts at most one tag.
    Recent { count: u32, tag: Option<String> },
    /// `/v1/posts/get`
    Filter {
        tags: Vec<String>,
        date: Option<String>,
        url: Option<String>,
    },
}

impl PostQuery {
    pub fn from_filters(
        tags: Vec<String>,
        date: Option<String>,
        url: Option<String>,
        count: Option<u32>,
    ) -> Self {
        if let Some(count) = count {
            if tags.len() > 1 {
                debug!("recent posts accept one tag, using '{}'", tags[0]);
            }
            return PostQuery::Recent {
                count,
                tag: tags.into_iter().next(),
            };
        }

        if !tags.is_empty() || date.is_some() || url.is_some() {
            return PostQuery::Filter { tags, date, url };
        }

        PostQuery::Recent {
            count: DEFAULT_RECENT_COUNT,
            tag: None,
        }
    }

    pub fn by_url(url: &str) -> Self {
        PostQuery::Filter {
            tags: Vec::new(),
            date: None,
            url: Some(url.to_string()),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            PostQuery::Recent { .. } => "/v1/posts/recent",
            PostQuery::Filter { .. } => "/v1/posts/get",
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        match self {
            PostQuery::Recent { count, tag } => {
                fields.push(("count", count.to_string()));
                if let Some(tag) = tag {
                    fields.push(("tag", tag.clone()));
                }
            }
            PostQuery::Filter { tags, date, url } => {
                if !tags.is_empty() {
                    fields.push(("tag", tags.join(",")));
                }
                if let Some(date) = date {
                    fields.push(("dt", date.clone()));
                }
                if let Some(url) = url {
                    fields.push(("url", url.clone()));
                }
            }
        }
        fields
    }
}

/// Payload for `/v1/posts/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub url: String,
    pub title: String,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub private: bool,
    pub to_read: bool,
    pub replace: bool,
}

impl NewPost {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("url", self.url.clone()),
            ("description", self.title.clone()),
        ];

        if let Some(note) = self.note.as_deref().filter(|n| !n.is_empty()) {
            fields.push(("extended", note.to_string()));
        }
        if !self.tags.is_empty() {
            fields.push(("tags", self.tags.join(",")));
        }
        if self.private {
            fields.push(("shared", "no".to_string()));
        }
        if self.to_read {
            fields.push(("toread", "yes".to_string()));
        }
        if self.replace {
            fields.push(("replace", "yes".to_string()));
        }

        fields
    }
}

/// `/v1/posts/suggest` answers with a list of single-key objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Suggestion {
    Popular(Vec<String>),
    Recommended(Vec<String>),
}

fn merge_suggestions(suggestions: Vec<Suggestion>) -> Vec<String> {
    let mut popular = Vec::new();
    let mut recommended = Vec::new();
    for suggestion in suggestions {
        match suggestion {
            Suggestion::Popular(tags) => popular.extend(tags),
            Suggestion::Recommended(tags) => recommended.extend(tags),
        }
    }

    let mut merged: Vec<String> = Vec::new();
    for tag in popular.into_iter().chain(recommended) {
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }

    if merged.is_empty() {
        merged.push(FALLBACK_TAG.to_string());
    }
    merged
}

impl LinkhutClient {
    pub async fn posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        let response: Option<PostsResponse> = self
            .call_optional(query.endpoint(), &query.fields())
            .await?;
        Ok(response.map(|r| r.posts).unwrap_or_default())
    }

    /// Look up the bookmark for an exact URL.
    pub async fn find_post(&self, url: &str) -> Result<Option<Post>> {
        let mut posts = self.posts(&PostQuery::by_url(url)).await?;
        if posts.is_empty() {
            return Ok(None);
        }
        Ok(Some(posts.swap_remove(0)))
    }

    pub async fn add_post(&self, post: &NewPost) -> Result<()> {
        match self.call_for_result("/v1/posts/add", &post.fields()).await? {
            Some(code) if code == "done" => {
                debug!(url = %post.url, "bookmark saved");
                Ok(())
            }
            Some(code) => Err(LinkhutError::Rejected(code).into()),
            None => Err(LinkhutError::Rejected("not found".to_string()).into()),
        }
    }

    /// Returns `false` when there was no bookmark for the URL.
    pub async fn delete_post(&self, url: &str) -> Result<bool> {
        let fields = [("url", url.to_string())];
        let result = self.call_for_result("/v1/posts/delete", &fields).await?;
        Ok(result.as_deref() == Some("done"))
    }

    pub async fn suggest_tags(&self, url: &str) -> Result<Vec<String>> {
        let fields = [("url", url.to_string())];
        let suggestions: Vec<Suggestion> = self.call("/v1/posts/suggest", &fields).await?;
        Ok(merge_suggestions(suggestions))
    }
}
