//! Category extraction from a parsed export document.
//!
//! Every tracked collection lives at a fixed key path inside the export.
//! [`CATEGORY_SOURCES`] declares those paths once; [`ExtractedArchive`]
//! walks them and falls back to an empty collection on any miss.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use timeline_core::formatting::format_count;
use timeline_core::models::{ActivityRecord, Category};
use tracing::debug;

// ── Key-path table ────────────────────────────────────────────────────────────

/// Location of the account's username.
pub const USERNAME_PATH: &[&str] = &["Profile", "Profile Information", "ProfileMap", "userName"];

/// Username reported when [`USERNAME_PATH`] does not resolve to a string.
pub const USERNAME_FALLBACK: &str = "Could Not Be Extracted";

/// Shape of the value found at a category's key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// A JSON array of records.
    List,
    /// A JSON object mapping conversation id → array of messages.
    Conversations,
}

/// Where a category's records live and how they are dated.
#[derive(Debug, Clone, Copy)]
pub struct CategorySource {
    pub category: Category,
    pub key_path: &'static [&'static str],
    /// Record field holding the `%Y-%m-%d %H:%M:%S` timestamp.
    pub timestamp_field: &'static str,
    pub container: Container,
}

pub static CATEGORY_SOURCES: [CategorySource; 7] = [
    CategorySource {
        category: Category::Browsed,
        key_path: &["Activity", "Video Browsing History", "VideoList"],
        timestamp_field: "Date",
        container: Container::List,
    },
    CategorySource {
        category: Category::Shared,
        key_path: &["Activity", "Share History", "ShareHistoryList"],
        timestamp_field: "Date",
        container: Container::List,
    },
    CategorySource {
        category: Category::Commented,
        key_path: &["Comment", "Comments", "CommentsList"],
        timestamp_field: "Date",
        container: Container::List,
    },
    CategorySource {
        category: Category::Liked,
        key_path: &["Activity", "Favorite Videos", "FavoriteVideoList"],
        timestamp_field: "Date",
        container: Container::List,
    },
    CategorySource {
        category: Category::Posted,
        key_path: &["Video", "Videos", "VideoList"],
        timestamp_field: "Date",
        container: Container::List,
    },
    CategorySource {
        category: Category::Dmed,
        key_path: &["Direct Messages", "Chat History", "ChatHistory"],
        timestamp_field: "Date",
        container: Container::Conversations,
    },
    CategorySource {
        category: Category::ProductBrowsed,
        key_path: &[
            "TikTok Shopping",
            "Product Browsing History",
            "ProductBrowsingHistories",
        ],
        timestamp_field: "browsing_date",
        container: Container::List,
    },
];

impl CategorySource {
    /// Table entry for `category`.
    pub fn of(category: Category) -> &'static CategorySource {
        let index = match category {
            Category::Browsed => 0,
            Category::Shared => 1,
            Category::Commented => 2,
            Category::Liked => 3,
            Category::Posted => 4,
            Category::Dmed => 5,
            Category::ProductBrowsed => 6,
        };
        &CATEGORY_SOURCES[index]
    }

    /// The empty value this source falls back to.
    pub fn default_value(&self) -> Value {
        match self.container {
            Container::List => Value::Array(Vec::new()),
            Container::Conversations => Value::Object(serde_json::Map::new()),
        }
    }
}

// ── Path traversal ────────────────────────────────────────────────────────────

/// Walk `doc` along `key_path`, borrowing the value at the end.
///
/// Returns `None` when a key is absent, an intermediate value is not an
/// object, or the final value is `null`.
pub fn lookup_path<'a>(doc: &'a Value, key_path: &[&str]) -> Option<&'a Value> {
    let mut current = doc;
    for key in key_path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Owned variant of [`lookup_path`] returning `default` on any miss.
pub fn extract_category(doc: &Value, key_path: &[&str], default: Value) -> Value {
    match lookup_path(doc, key_path) {
        Some(value) => value.clone(),
        None => {
            debug!("Key path {:?} not found, using default", key_path);
            default
        }
    }
}

/// Concatenate every conversation's messages into one sequence.
///
/// Message order within a conversation is preserved; conversation ids are
/// dropped.
pub fn flatten_conversations(chats: &Value) -> Vec<ActivityRecord> {
    let Some(conversations) = chats.as_object() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    for (conversation, history) in conversations {
        match history.as_array() {
            Some(items) => messages.extend(items.iter().cloned().map(ActivityRecord::new)),
            None => debug!("Conversation {} is not a message list, skipping", conversation),
        }
    }
    messages
}

// ── ExtractedArchive ──────────────────────────────────────────────────────────

/// Typed collections pulled out of one export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedArchive {
    pub username: String,
    pub browsing: Vec<ActivityRecord>,
    pub shares: Vec<ActivityRecord>,
    pub comments: Vec<ActivityRecord>,
    pub likes: Vec<ActivityRecord>,
    pub posts: Vec<ActivityRecord>,
    pub chats: Vec<ActivityRecord>,
    pub product_browsing: Vec<ActivityRecord>,
}

impl ExtractedArchive {
    /// Extract every collection from `doc`.
    ///
    /// `None` (nothing could be loaded) produces the fallback username and
    /// seven empty collections.
    pub fn from_document(doc: Option<&Value>) -> Self {
        let Some(doc) = doc else {
            return Self::empty();
        };

        let mut archive = Self {
            username: extract_username(doc),
            ..Self::default()
        };
        for source in &CATEGORY_SOURCES {
            *archive.records_mut(source.category) = extract_records(doc, source);
        }
        archive
    }

    /// Fallback username and no records.
    pub fn empty() -> Self {
        Self {
            username: USERNAME_FALLBACK.to_string(),
            ..Self::default()
        }
    }

    /// Records belonging to `category`.
    pub fn records(&self, category: Category) -> &[ActivityRecord] {
        match category {
            Category::Browsed => &self.browsing,
            Category::Shared => &self.shares,
            Category::Commented => &self.comments,
            Category::Liked => &self.likes,
            Category::Posted => &self.posts,
            Category::Dmed => &self.chats,
            Category::ProductBrowsed => &self.product_browsing,
        }
    }

    fn records_mut(&mut self, category: Category) -> &mut Vec<ActivityRecord> {
        match category {
            Category::Browsed => &mut self.browsing,
            Category::Shared => &mut self.shares,
            Category::Commented => &mut self.comments,
            Category::Liked => &mut self.likes,
            Category::Posted => &mut self.posts,
            Category::Dmed => &mut self.chats,
            Category::ProductBrowsed => &mut self.product_browsing,
        }
    }

    /// Number of records across all categories.
    pub fn total_records(&self) -> usize {
        Category::ALL.iter().map(|c| self.records(*c).len()).sum()
    }

    /// Per-category record counts.
    pub fn summarize(&self) -> ExtractionSummary {
        ExtractionSummary {
            username: self.username.clone(),
            counts: Category::ALL
                .iter()
                .map(|c| (*c, self.records(*c).len()))
                .collect(),
        }
    }
}

fn extract_username(doc: &Value) -> String {
    let value = extract_category(doc, USERNAME_PATH, Value::String(USERNAME_FALLBACK.into()));
    match value {
        Value::String(name) => name,
        other => {
            debug!("Username has unexpected type: {}", other);
            USERNAME_FALLBACK.to_string()
        }
    }
}

fn extract_records(doc: &Value, source: &CategorySource) -> Vec<ActivityRecord> {
    let value = extract_category(doc, source.key_path, source.default_value());
    match (source.container, value) {
        (Container::List, Value::Array(items)) => {
            items.into_iter().map(ActivityRecord::new).collect()
        }
        (Container::Conversations, chats @ Value::Object(_)) => flatten_conversations(&chats),
        (_, other) => {
            debug!(
                "Category {} has unexpected shape at {:?}: {}, using default",
                source.category,
                source.key_path,
                type_name(&other)
            );
            Vec::new()
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── ExtractionSummary ─────────────────────────────────────────────────────────

/// Username plus record counts, in [`Category::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub username: String,
    pub counts: Vec<(Category, usize)>,
}

impl ExtractionSummary {
    pub fn count(&self, category: Category) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

fn summary_label(category: Category) -> &'static str {
    match category {
        Category::Browsed => "Number of videos watched",
        Category::Shared => "Number of videos shared",
        Category::Commented => "Number of comments made",
        Category::Liked => "Number of videos liked",
        Category::Posted => "Number of videos posted",
        Category::Dmed => "Number of DMs sent and received",
        Category::ProductBrowsed => "Number of products browsed",
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Username: {}", self.username)?;
        for (category, count) in &self.counts {
            writeln!(
                f,
                "{}: {}",
                summary_label(*category),
                format_count(*count as u64)
            )?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
