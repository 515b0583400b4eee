//! Data models for Quill
//!
//! Defines the persisted `Post` record and the raw inputs accepted by the
//! service layer. Field names serialize in camelCase so records stay
//! interchangeable with existing JSON callers.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// How a post's content is interpreted when displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum PostFormat {
    /// Restricted markdown, rendered by `render::markdown`
    #[default]
    Markdown,
    /// Raw HTML, displayed verbatim
    Html,
}

impl PostFormat {
    /// Parse a known format name
    ///
    /// Only the exact lowercase names are recognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "markdown" => Some(PostFormat::Markdown),
            "html" => Some(PostFormat::Html),
            _ => None,
        }
    }

    /// Parse a format, falling back to markdown for absent or unknown values
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostFormat::Markdown => "markdown",
            PostFormat::Html => "html",
        }
    }
}

impl From<Option<String>> for PostFormat {
    fn from(value: Option<String>) -> Self {
        Self::parse_or_default(value.as_deref())
    }
}

impl std::fmt::Display for PostFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier, also the storage key
    pub id: String,
    /// Post title (trimmed, never empty)
    pub title: String,
    /// Post body, interpreted per `format`
    pub content: String,
    /// Content format
    #[serde(default)]
    pub format: PostFormat,
    /// When this post was created
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this post was last updated
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a fresh record from a normalized draft
    pub(crate) fn from_draft(id: String, draft: PostDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content,
            format: draft.format,
            created_at: now,
            updated_at: now,
        }
    }

    /// First eight characters of the id, for compact listings
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

/// Normalized input for creating a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub format: PostFormat,
}

impl PostDraft {
    /// Create a markdown draft
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            format: PostFormat::Markdown,
        }
    }

    /// Set the content format
    pub fn with_format(mut self, format: PostFormat) -> Self {
        self.format = format;
        self
    }
}

/// Raw create payload, as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Raw update payload; absent fields keep their stored values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl PostChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.format.is_none()
    }
}

/// Check that an id only uses `[A-Za-z0-9_-]` and is not empty
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Current time at the precision records are stored with
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post() -> Post {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        Post {
            id: "abc-123".to_string(),
            title: "Hello".to_string(),
            content: "**hi**".to_string(),
            format: PostFormat::Markdown,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(PostFormat::parse("html"), Some(PostFormat::Html));
        assert_eq!(PostFormat::parse("markdown"), Some(PostFormat::Markdown));
        assert_eq!(PostFormat::parse("HTML"), None);
        assert_eq!(PostFormat::parse_or_default(Some("rtf")), PostFormat::Markdown);
        assert_eq!(PostFormat::parse_or_default(None), PostFormat::Markdown);
        assert_eq!(PostFormat::parse_or_default(Some("html")), PostFormat::Html);
    }

    #[test]
    fn test_post_json_field_names() {
        let json = serde_json::to_value(sample_post()).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["content", "createdAt", "format", "id", "title", "updatedAt"]
        );
        assert_eq!(obj["format"], "markdown");
        assert_eq!(obj["createdAt"], "2024-05-01T10:20:30.000Z");
    }

    #[test]
    fn test_post_serialization() {
        let post = sample_post();
        let json = serde_json::to_string_pretty(&post).unwrap();
        let deserialized: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(post, deserialized);
    }

    #[test]
    fn test_unknown_format_reads_as_markdown() {
        let json = r#"{
            "id": "x",
            "title": "t",
            "content": "c",
            "format": "rtf",
            "createdAt": "2024-05-01T10:20:30.123Z",
            "updatedAt": "2024-05-01T10:20:30.123Z"
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.format, PostFormat::Markdown);

        let missing = r#"{
            "id": "x",
            "title": "t",
            "content": "c",
            "createdAt": "2024-05-01T10:20:30.123Z",
            "updatedAt": "2024-05-01T10:20:30.123Z"
        }"#;
        let post: Post = serde_json::from_str(missing).unwrap();
        assert_eq!(post.format, PostFormat::Markdown);
    }

    #[test]
    fn test_short_id() {
        let mut post = sample_post();
        assert_eq!(post.short_id(), "abc-123");

        post.id = "0123456789abcdef".to_string();
        assert_eq!(post.short_id(), "01234567");
    }

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("abc"));
        assert!(is_valid_id("A_b-9"));
        assert!(is_valid_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../etc"));
        assert!(!is_valid_id("a b"));
        assert!(!is_valid_id("post.json"));
    }

    #[test]
    fn test_new_post_payload() {
        let payload: NewPost =
            serde_json::from_str(r#"{"title": "T", "content": "C"}"#).unwrap();
        assert_eq!(payload, NewPost::new("T", "C"));
        assert!(payload.format.is_none());
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(PostChanges::default().is_empty());
        assert!(!PostChanges::title("x").is_empty());
    }
}
