//! Event management commands.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Subcommand;
use voxnote_store::{Event, EventStore};

use super::task::parse_rfc3339;

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a new event
    Add {
        /// Event title
        title: String,
        /// Start time, RFC 3339 (e.g. 2026-09-01T09:00:00Z)
        #[arg(long)]
        start: String,
        /// End time, RFC 3339 (defaults to one hour after start)
        #[arg(long)]
        end: Option<String>,
        /// All-day event (only the date part of start/end is used)
        #[arg(long)]
        all_day: bool,
        /// Event description
        #[arg(long)]
        description: Option<String>,
        /// Location
        #[arg(long)]
        location: Option<String>,
        /// Comma-separated attendee email addresses
        #[arg(long)]
        attendees: Option<String>,
        /// Category label (new labels are added to the document vocabulary)
        #[arg(long)]
        category: Option<String>,
        /// Recurrence rule (e.g. RRULE:FREQ=WEEKLY)
        #[arg(long)]
        recurrence: Option<String>,
    },
    /// List events
    List,
    /// Remove an event (and its remote calendar event, if one exists)
    Rm {
        /// Event ID
        id: String,
    },
}

/// Run the event command.
pub async fn run(action: EventAction) -> Result<()> {
    let (config, secrets) = super::load_environment()?;
    let mut events = EventStore::load(config.events_path())?;

    match action {
        EventAction::Add {
            title,
            start,
            end,
            all_day,
            description,
            location,
            attendees,
            category,
            recurrence,
        } => {
            let start = parse_rfc3339(&start)?;
            let end = match end {
                Some(raw) => parse_rfc3339(&raw)?,
                None => start + Duration::hours(1),
            };
            if end < start {
                anyhow::bail!("event ends before it starts");
            }

            let mut event = Event::new(title, start, end);
            event.all_day = all_day;
            event.description = description.unwrap_or_default();
            event.location = location.unwrap_or_default();
            event.attendees = attendees
                .map(|list| {
                    list.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            if let Some(category) = category {
                event.category = category;
            }
            event.recurrence = recurrence;

            let id = event.id.clone();
            events.insert(event);
            events.save()?;
            println!("Event created: {id}");
        }
        EventAction::List => {
            if events.is_empty() {
                println!("No events.");
            }
            for event in events.iter() {
                let when = if event.all_day {
                    event.start.format("%Y-%m-%d (all day)").to_string()
                } else {
                    format!(
                        "{} - {}",
                        event.start.format("%Y-%m-%d %H:%M"),
                        event.end.format("%H:%M")
                    )
                };
                let remote = if event.synced { "  [synced]" } else { "" };
                println!(
                    "{}  {} ({})  {}{}",
                    event.id, event.title, event.category, when, remote
                );
            }
        }
        EventAction::Rm { id } => {
            let event = events
                .get(&id)
                .with_context(|| format!("no event with id {id}"))?;
            if let Some(external_id) = event.external_id.clone() {
                super::remove_remote_event(&config, &secrets, &external_id)
                    .await
                    .context("could not delete the remote calendar event; event kept")?;
            }
            events.remove(&id);
            events.save()?;
            println!("Event removed: {id}");
        }
    }

    Ok(())
}
