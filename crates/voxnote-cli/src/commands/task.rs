//! Task management commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use voxnote_store::{Priority, Task, TaskStatus, TaskStore};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Priority: low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Category label (new labels are added to the document vocabulary)
        #[arg(long)]
        category: Option<String>,
        /// Due date, RFC 3339 (e.g. 2026-09-01T09:00:00Z)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        /// Only show tasks that are not done
        #[arg(long)]
        open: bool,
    },
    /// Mark a task as done
    Done {
        /// Task ID
        id: String,
    },
    /// Remove a task (and its remote calendar event, if one exists)
    Rm {
        /// Task ID
        id: String,
    },
}

/// Run the task command.
pub async fn run(action: TaskAction) -> Result<()> {
    let (config, secrets) = super::load_environment()?;
    let mut tasks = TaskStore::load(config.tasks_path())?;

    match action {
        TaskAction::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let mut task = Task::new(title);
            task.description = description.unwrap_or_default();
            task.priority = priority;
            if let Some(category) = category {
                task.category = category;
            }
            task.due = due.map(|raw| parse_rfc3339(&raw)).transpose()?;

            let id = task.id.clone();
            tasks.insert(task);
            tasks.save()?;
            println!("Task created: {id}");
        }
        TaskAction::List { open } => {
            let mut shown = 0;
            for task in tasks.iter().filter(|t| !open || !t.is_done()) {
                let due = task
                    .due
                    .map(|d| format!("  due {}", d.format("%Y-%m-%d %H:%M")))
                    .unwrap_or_default();
                let remote = if task.synced { "  [synced]" } else { "" };
                println!(
                    "{}  [{}] {} ({}, {}){}{}",
                    task.id, task.status, task.title, task.priority, task.category, due, remote
                );
                shown += 1;
            }
            if shown == 0 {
                println!("No tasks.");
            }
        }
        TaskAction::Done { id } => {
            let task = tasks
                .get_mut(&id)
                .with_context(|| format!("no task with id {id}"))?;
            task.status = TaskStatus::Done;
            tasks.save()?;
            println!("Task done: {id}");
        }
        TaskAction::Rm { id } => {
            let task = tasks
                .get(&id)
                .with_context(|| format!("no task with id {id}"))?;
            if let Some(external_id) = task.external_id.clone() {
                super::remove_remote_event(&config, &secrets, &external_id)
                    .await
                    .context("could not delete the remote calendar event; task kept")?;
            }
            tasks.remove(&id);
            tasks.save()?;
            println!("Task removed: {id}");
        }
    }

    Ok(())
}

/// Parse an RFC 3339 timestamp into UTC.
pub(crate) fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp: {raw} (expected RFC 3339)"))
}
