//! Mapping between local records and calendar wire types.

use chrono::{Duration, Utc};
use voxnote_calendar::{Attendee, EventDateTime, EventPayload, EventResource};
use voxnote_store::{Event, Task};

/// Calendar entries need an end instant; tasks only carry a due instant,
/// so pushed tasks become blocks of this length.
const DEFAULT_DURATION_MINS: i64 = 60;

/// Category assigned to events imported from the remote calendar
pub const IMPORT_CATEGORY: &str = "imported";

/// Calendar body for a task. Due date becomes the start; tasks without one
/// land at the moment of the push.
pub fn task_payload(task: &Task) -> EventPayload {
    let start = task.due.unwrap_or_else(Utc::now);
    let end = start + Duration::minutes(DEFAULT_DURATION_MINS);

    EventPayload {
        summary: task.title.clone(),
        description: some_if_not_empty(&task.description),
        start: EventDateTime::timed(start),
        end: EventDateTime::timed(end),
        ..EventPayload::default()
    }
}

/// Calendar body for a local event
pub fn event_payload(event: &Event) -> EventPayload {
    let (start, end) = if event.all_day {
        (
            EventDateTime::all_day(event.start.date_naive()),
            EventDateTime::all_day(event.end.date_naive()),
        )
    } else {
        (
            EventDateTime::timed(event.start),
            EventDateTime::timed(event.end),
        )
    };

    EventPayload {
        summary: event.title.clone(),
        description: some_if_not_empty(&event.description),
        location: some_if_not_empty(&event.location),
        start,
        end,
        attendees: event
            .attendees
            .iter()
            .map(|email| Attendee {
                email: email.clone(),
            })
            .collect(),
        recurrence: event.recurrence.clone().into_iter().collect(),
    }
}

/// Local event built from a remote resource during a pull.
///
/// Returns `None` for entries without a usable start; the remote service
/// has no such events in practice, but the list endpoint does not promise
/// it. A missing end falls back to a one-hour block.
pub fn import_event(resource: &EventResource) -> Option<Event> {
    let (start, all_day) = resource.start.as_ref()?.resolve()?;
    let end = resource
        .end
        .as_ref()
        .and_then(EventDateTime::resolve)
        .map(|(at, _)| at)
        .unwrap_or_else(|| start + Duration::minutes(DEFAULT_DURATION_MINS));

    let title = resource
        .summary
        .clone()
        .unwrap_or_else(|| "(no title)".to_string());

    let mut event = Event::new(title, start, end);
    event.all_day = all_day;
    event.category = IMPORT_CATEGORY.to_string();
    if let Some(description) = &resource.description {
        event.description = description.clone();
    }
    if let Some(location) = &resource.location {
        event.location = location.clone();
    }
    event.attendees = resource.attendees.iter().map(|a| a.email.clone()).collect();
    event.recurrence = resource.recurrence.first().cloned();
    event.mark_synced(resource.id.clone());
    Some(event)
}

fn some_if_not_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
