//! User-saved itineraries with a per-item checklist.
//!
//! The collection is persisted as a single blob: every mutation reads the
//! whole list, changes it in memory, and writes the whole list back.
//!
//! Checklist items are not stored. They are derived from the body text on
//! demand, and only the checked state is persisted, keyed by a hash of the
//! item text so state stays attached to the same item even if lines move.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::hashing::short_hash;
use crate::itinerary::{fragments, Fragment};
use crate::storage::{self, KeyValueStore, SAVED_ITINERARIES_KEY};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for an itinerary title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for an itinerary body in characters.
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Items of this many characters or fewer are treated as fragments, not tasks.
const MIN_ITEM_CHARS: usize = 5;

/// Hex characters of the SHA-256 digest used for a checklist key.
const CHECKLIST_KEY_LEN: usize = 12;

/// Numbered list marker, e.g. `3.` or `12. `.
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// Bullet list marker, `-` or `•`, plus trailing whitespace.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s*").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItinerary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub saved_at: Timestamp,
    #[serde(default)]
    pub checklist: BTreeMap<String, bool>,
}

/// One action item derived from an itinerary body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub key: String,
    pub text: String,
    pub checked: bool,
}

impl SavedItinerary {
    /// Derived checklist items with their persisted checked state.
    pub fn checklist_items(&self) -> Vec<ChecklistItem> {
        keyed_items(&self.content)
            .into_iter()
            .map(|(key, text)| ChecklistItem {
                checked: self.checklist.get(&key).copied().unwrap_or(false),
                key,
                text,
            })
            .collect()
    }

    /// Markdown rendering for sharing or printing.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.title);
        let _ = writeln!(out);
        let _ = writeln!(out, "_Saved on {}_", self.saved_at.format("%B %-d, %Y"));

        for fragment in fragments(&self.content) {
            let _ = writeln!(out);
            match fragment {
                Fragment::Heading(text) => {
                    let _ = writeln!(out, "## {text}");
                }
                Fragment::Paragraph(text) => {
                    let _ = writeln!(out, "{text}");
                }
            }
        }

        let items = self.checklist_items();
        if !items.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Checklist");
            let _ = writeln!(out);
            for item in items {
                let mark = if item.checked { 'x' } else { ' ' };
                let _ = writeln!(out, "- [{mark}] {}", item.text);
            }
        }
        out
    }
}

/// List-like lines of `content` (leading `-`, `•`, or `N.`), stripped of
/// their marker, keeping only items longer than a trivial fragment.
pub fn extract_checklist_items(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.starts_with('-') || line.starts_with('•') || NUMBERED_RE.is_match(line)
        })
        .map(|line| {
            let line = BULLET_RE.replace(line, "");
            NUMBERED_RE.replace(&line, "").trim().to_string()
        })
        .filter(|item| item.chars().count() > MIN_ITEM_CHARS)
        .collect()
}

/// Checklist items paired with their keys. Repeated text gets a `-N` suffix
/// for the Nth repeat so every key is unique.
fn keyed_items(content: &str) -> Vec<(String, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    extract_checklist_items(content)
        .into_iter()
        .map(|text| {
            let base = short_hash(&text, CHECKLIST_KEY_LEN);
            let count = seen.entry(base.clone()).or_insert(0);
            let key = if *count == 0 {
                base
            } else {
                format!("{base}-{count}")
            };
            *count += 1;
            (key, text)
        })
        .collect()
}

fn validate_new(title: &str, content: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// CRUD over the persisted itinerary collection.
pub struct SavedItineraryStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SavedItineraryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<SavedItinerary>, CoreError> {
        storage::load_json_or_default(self.store.as_ref(), SAVED_ITINERARIES_KEY).await
    }

    async fn persist(&self, all: &[SavedItinerary]) -> Result<(), CoreError> {
        storage::save_json(self.store.as_ref(), SAVED_ITINERARIES_KEY, all).await
    }

    /// All saved itineraries in insertion order.
    pub async fn list(&self) -> Result<Vec<SavedItinerary>, CoreError> {
        self.load().await
    }

    pub async fn get(&self, id: &str) -> Result<SavedItinerary, CoreError> {
        self.load()
            .await?
            .into_iter()
            .find(|it| it.id == id)
            .ok_or_else(|| CoreError::not_found("SavedItinerary", id))
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<SavedItinerary, CoreError> {
        self.create_at(title, content, Utc::now()).await
    }

    /// Append a new itinerary with a fresh time-ordered id and an empty
    /// checklist.
    pub async fn create_at(
        &self,
        title: &str,
        content: &str,
        now: Timestamp,
    ) -> Result<SavedItinerary, CoreError> {
        validate_new(title, content)?;

        let _guard = self.write_lock.lock().await;
        let mut all = self.load().await?;

        let itinerary = SavedItinerary {
            id: Uuid::now_v7().to_string(),
            title: title.trim().to_string(),
            content: content.to_string(),
            saved_at: now,
            checklist: BTreeMap::new(),
        };
        all.push(itinerary.clone());
        self.persist(&all).await?;

        Ok(itinerary)
    }

    /// Flip one checklist item. The key must name an item derived from the
    /// itinerary's body.
    pub async fn toggle_checklist_item(
        &self,
        id: &str,
        item_key: &str,
    ) -> Result<SavedItinerary, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.load().await?;

        let itinerary = all
            .iter_mut()
            .find(|it| it.id == id)
            .ok_or_else(|| CoreError::not_found("SavedItinerary", id))?;

        if !keyed_items(&itinerary.content)
            .iter()
            .any(|(key, _)| key == item_key)
        {
            return Err(CoreError::Validation(format!(
                "Unknown checklist item '{item_key}'"
            )));
        }

        let checked = itinerary.checklist.entry(item_key.to_string()).or_insert(false);
        *checked = !*checked;
        let updated = itinerary.clone();

        self.persist(&all).await?;
        Ok(updated)
    }

    /// Remove an itinerary, returning it so callers can clear any selection
    /// that pointed at it.
    pub async fn delete(&self, id: &str) -> Result<SavedItinerary, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.load().await?;

        let index = all
            .iter()
            .position(|it| it.id == id)
            .ok_or_else(|| CoreError::not_found("SavedItinerary", id))?;
        let removed = all.remove(index);

        self.persist(&all).await?;
        Ok(removed)
    }
}
