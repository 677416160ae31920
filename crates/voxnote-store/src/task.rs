use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::{load_document, save_document, StoreError};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!(
                "unknown priority: {other} (expected low, medium, high or urgent)"
            )),
        }
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
        };
        f.write_str(label)
    }
}

/// A locally owned task. Fields that arrived in later schema revisions
/// (category, external_id, synced) default at deserialization so documents
/// written by older builds still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_task_category")]
    pub category: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

fn default_task_category() -> String {
    "other".to_string()
}

fn default_created_at() -> DateTime<Utc> {
    Utc::now()
}

impl Task {
    /// New open task with a generated id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            category: default_task_category(),
            status: TaskStatus::default(),
            due: None,
            created_at: Utc::now(),
            external_id: None,
            synced: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
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

/// The tasks document as persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    #[serde(default = "default_task_categories")]
    pub categories: Vec<String>,
}

fn default_task_categories() -> Vec<String> {
    ["work", "personal", "study", "health", "other"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TaskDocument {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            categories: default_task_categories(),
        }
    }
}

/// Task collection bound to its backing file
pub struct TaskStore {
    path: PathBuf,
    doc: TaskDocument,
}

impl TaskStore {
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

    /// Add a task, teaching the category vocabulary any new category
    pub fn insert(&mut self, task: Task) {
        if !self.doc.categories.contains(&task.category) {
            self.doc.categories.push(task.category.clone());
        }
        self.doc.tasks.insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.doc.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.doc.tasks.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        self.doc.tasks.remove(id)
    }

    /// Record ids in stable (sorted) order
    pub fn ids(&self) -> Vec<String> {
        self.doc.tasks.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.doc.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.doc.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.tasks.is_empty()
    }

    /// Whether any task already links to this remote id
    pub fn contains_external_id(&self, external_id: &str) -> bool {
        self.doc
            .tasks
            .values()
            .any(|t| t.external_id.as_deref() == Some(external_id))
    }

    pub fn categories(&self) -> &[String] {
        &self.doc.categories
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
