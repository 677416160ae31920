use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::{load_document, save_document, StoreError};

/// A locally stored calendar event. Later-added fields default at
/// deserialization, same as [`crate::Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_event_category")]
    pub category: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub recurrence: Option<String>,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

fn default_event_category() -> String {
    "event".to_string()
}

fn default_created_at() -> DateTime<Utc> {
    Utc::now()
}

impl Event {
    /// New event with a generated id
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            category: default_event_category(),
            start,
            end,
            all_day: false,
            location: String::new(),
            attendees: Vec::new(),
            recurrence: None,
            created_at: Utc::now(),
            external_id: None,
            synced: false,
        }
    }

    /// Record a successful push: both fields change together so the
    /// synced-implies-external-id invariant holds.
    pub fn mark_synced(&mut self, external_id: String) {
        self.external_id = Some(external_id);
        self.synced = true;
    }

    /// Forget the remote counterpart (stale or deleted external id)
    pub fn clear_remote_link(&mut self) {
        self.external_id = None;
        self.synced = false;
    }
}

/// The events document as persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(default)]
    pub events: BTreeMap<String, Event>,
    #[serde(default = "default_event_categories")]
    pub categories: Vec<String>,
}

fn default_event_categories() -> Vec<String> {
    ["meeting", "appointment", "event", "other"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for EventDocument {
    fn default() -> Self {
        Self {
            events: BTreeMap::new(),
            categories: default_event_categories(),
        }
    }
}

/// Event collection bound to its backing file
pub struct EventStore {
    path: PathBuf,
    doc: EventDocument,
}

impl EventStore {
    /// Load the store; a missing file is an empty store
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = load_document(&path)?;
        Ok(Self { path, doc })
    }

    /// Persist the full document
    pub fn save(&self) -> Result<(), StoreError> {
        save_document(&self.path, &self.doc)
    }

    /// Add an event, teaching the category vocabulary any new category
    pub fn insert(&mut self, event: Event) {
        if !self.doc.categories.contains(&event.category) {
            self.doc.categories.push(event.category.clone());
        }
        self.doc.events.insert(event.id.clone(), event);
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.doc.events.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Event> {
        self.doc.events.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Event> {
        self.doc.events.remove(id)
    }

    /// Record ids in stable (sorted) order
    pub fn ids(&self) -> Vec<String> {
        self.doc.events.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.doc.events.values()
    }

    pub fn len(&self) -> usize {
        self.doc.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.events.is_empty()
    }

    /// Whether any event already links to this remote id
    pub fn contains_external_id(&self, external_id: &str) -> bool {
        self.doc
            .events
            .values()
            .any(|e| e.external_id.as_deref() == Some(external_id))
    }

    pub fn categories(&self) -> &[String] {
        &self.doc.categories
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
