//! The reconciliation engine.
//!
//! Walks local records and decides, per record, whether to create or update
//! a remote counterpart; pulls unknown remote events into local storage.
//! Every link annotation (`external_id`, `synced`) is persisted immediately
//! after the remote call that earned it, so an interrupted run leaves the
//! stores accurate for the records it got through.

use chrono::Utc;
use thiserror::Error;

use voxnote_auth::{AuthError, TokenManager};
use voxnote_calendar::{CalendarClient, CalendarError, EventPayload};
use voxnote_store::{EventStore, StoreError, TaskStore};

use crate::command::{SyncCommand, SyncScope, TimeWindow};
use crate::payload::{event_payload, import_event, task_payload};
use crate::report::{FailureKind, SyncFailure, SyncReport};

/// A run failed before or outside per-record processing
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no local record with id {0}")]
    UnknownRecord(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("calendar request failed: {0}")]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which collection a record lives in
#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordKey {
    Task(String),
    Event(String),
}

impl RecordKey {
    fn id(&self) -> &str {
        match self {
            RecordKey::Task(id) | RecordKey::Event(id) => id,
        }
    }
}

enum PushOutcome {
    Created,
    Updated,
}

/// Why one record could not be pushed
enum PushIssue {
    /// Credential is dead; the rest of the batch must not run
    Abort(AuthError),
    /// This record only; the batch continues
    Record(FailureKind, String),
    /// Local persistence failed; the whole run stops
    Store(StoreError),
}

/// Failure of a single authorized calendar call
enum CallError {
    Auth(AuthError),
    Calendar(CalendarError),
}

impl From<CallError> for PushIssue {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Auth(err) if err.needs_authorization() => PushIssue::Abort(err),
            CallError::Auth(err) => PushIssue::Record(FailureKind::Transient, err.to_string()),
            CallError::Calendar(err) if err.is_transient() => {
                PushIssue::Record(FailureKind::Transient, err.to_string())
            }
            CallError::Calendar(err) => PushIssue::Record(FailureKind::Remote, err.to_string()),
        }
    }
}

/// One reconciliation run over borrowed components.
///
/// Single-threaded by construction: one command runs to completion before
/// the caller regains control, and nothing here is shared across runs.
pub struct Reconciler<'a> {
    tokens: &'a mut TokenManager,
    client: &'a CalendarClient,
    tasks: &'a mut TaskStore,
    events: &'a mut EventStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        tokens: &'a mut TokenManager,
        client: &'a CalendarClient,
        tasks: &'a mut TaskStore,
        events: &'a mut EventStore,
    ) -> Self {
        Self {
            tokens,
            client,
            tasks,
            events,
        }
    }

    /// Run one command to completion and report what happened
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn dispatch(&mut self, command: SyncCommand) -> Result<SyncReport, SyncError> {
        match command {
            SyncCommand::Push { scope } => self.push(scope).await,
            SyncCommand::Pull { window } => self.pull(window).await,
        }
    }

    async fn push(&mut self, scope: SyncScope) -> Result<SyncReport, SyncError> {
        let work = self.select(scope)?;
        let mut report = SyncReport::default();

        for (index, key) in work.iter().enumerate() {
            report.attempted += 1;
            match self.push_record(key).await {
                Ok(PushOutcome::Created) => report.created += 1,
                Ok(PushOutcome::Updated) => report.updated += 1,
                Err(PushIssue::Record(kind, message)) => {
                    tracing::warn!(record = %key.id(), %kind, "Record failed to sync: {}", message);
                    report.failed.push(SyncFailure {
                        record_id: key.id().to_string(),
                        kind,
                        message,
                    });
                }
                Err(PushIssue::Abort(err)) => {
                    tracing::warn!(record = %key.id(), "Aborting batch after auth failure: {}", err);
                    report.failed.push(SyncFailure {
                        record_id: key.id().to_string(),
                        kind: FailureKind::AuthRequired,
                        message: err.user_message().to_string(),
                    });
                    report.skipped += work.len() - index - 1;
                    break;
                }
                Err(PushIssue::Store(err)) => return Err(err.into()),
            }
        }

        tracing::info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Push finished"
        );
        Ok(report)
    }

    async fn pull(&mut self, window: TimeWindow) -> Result<SyncReport, SyncError> {
        let (time_min, time_max) = window.bounds(Utc::now());
        let token = self.tokens.ensure_valid_token().await?;

        let remote = match self.client.list_events(&token, time_min, time_max).await {
            Err(CalendarError::Unauthorized) => {
                let token = self.tokens.refresh_now().await?;
                self.client.list_events(&token, time_min, time_max).await?
            }
            other => other?,
        };

        let mut report = SyncReport::default();
        for resource in &remote {
            report.attempted += 1;

            if resource.is_cancelled() {
                report.skipped += 1;
                continue;
            }
            // Entries already linked from either store stay untouched; pull
            // imports new items only and never overwrites local edits.
            if self.tasks.contains_external_id(&resource.id)
                || self.events.contains_external_id(&resource.id)
            {
                report.skipped += 1;
                continue;
            }

            match import_event(resource) {
                Some(event) => {
                    tracing::debug!(remote = %resource.id, "Imported remote event");
                    self.events.insert(event);
                    self.events.save()?;
                    report.created += 1;
                }
                None => {
                    tracing::debug!(remote = %resource.id, "Skipping entry without a start");
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            "Pull finished"
        );
        Ok(report)
    }

    /// Records covered by a push scope: tasks first, then events, each in
    /// stable id order
    fn select(&self, scope: SyncScope) -> Result<Vec<RecordKey>, SyncError> {
        match scope {
            SyncScope::All => {
                let mut work: Vec<RecordKey> =
                    self.tasks.ids().into_iter().map(RecordKey::Task).collect();
                work.extend(self.events.ids().into_iter().map(RecordKey::Event));
                Ok(work)
            }
            SyncScope::Single(id) => {
                if self.tasks.get(&id).is_some() {
                    Ok(vec![RecordKey::Task(id)])
                } else if self.events.get(&id).is_some() {
                    Ok(vec![RecordKey::Event(id)])
                } else {
                    Err(SyncError::UnknownRecord(id))
                }
            }
        }
    }

    async fn push_record(&mut self, key: &RecordKey) -> Result<PushOutcome, PushIssue> {
        let Some((payload, external)) = self.snapshot(key) else {
            return Err(PushIssue::Record(
                FailureKind::Remote,
                "local record no longer exists".to_string(),
            ));
        };

        if let Some(external_id) = external {
            match self.authorized_update(&external_id, &payload).await {
                Ok(()) => return Ok(PushOutcome::Updated),
                Err(CallError::Calendar(CalendarError::NotFound(_))) => {
                    // The remote entry is gone, usually deleted by hand.
                    // Drop the stale link, persist that, then create afresh.
                    tracing::info!(record = %key.id(), "Stale remote link; recreating event");
                    self.clear_link(key).map_err(PushIssue::Store)?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let external_id = self.authorized_create(&payload).await?;
        self.mark_pushed(key, external_id).map_err(PushIssue::Store)?;
        Ok(PushOutcome::Created)
    }

    /// Payload plus current remote link for one record
    fn snapshot(&self, key: &RecordKey) -> Option<(EventPayload, Option<String>)> {
        match key {
            RecordKey::Task(id) => self
                .tasks
                .get(id)
                .map(|task| (task_payload(task), task.external_id.clone())),
            RecordKey::Event(id) => self
                .events
                .get(id)
                .map(|event| (event_payload(event), event.external_id.clone())),
        }
    }

    /// Forget a stale remote link and persist immediately
    fn clear_link(&mut self, key: &RecordKey) -> Result<(), StoreError> {
        match key {
            RecordKey::Task(id) => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.clear_remote_link();
                }
                self.tasks.save()
            }
            RecordKey::Event(id) => {
                if let Some(event) = self.events.get_mut(id) {
                    event.clear_remote_link();
                }
                self.events.save()
            }
        }
    }

    /// Record a successful push and persist immediately
    fn mark_pushed(&mut self, key: &RecordKey, external_id: String) -> Result<(), StoreError> {
        match key {
            RecordKey::Task(id) => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.mark_synced(external_id);
                }
                self.tasks.save()
            }
            RecordKey::Event(id) => {
                if let Some(event) = self.events.get_mut(id) {
                    event.mark_synced(external_id);
                }
                self.events.save()
            }
        }
    }

    /// One create call, retried a single time behind a forced refresh when
    /// the service rejects the current token
    async fn authorized_create(&mut self, payload: &EventPayload) -> Result<String, CallError> {
        let token = self
            .tokens
            .ensure_valid_token()
            .await
            .map_err(CallError::Auth)?;
        match self.client.create_event(&token, payload).await {
            Err(CalendarError::Unauthorized) => {
                let token = self.tokens.refresh_now().await.map_err(CallError::Auth)?;
                self.client
                    .create_event(&token, payload)
                    .await
                    .map_err(CallError::Calendar)
            }
            other => other.map_err(CallError::Calendar),
        }
    }

    /// One update call, same single-retry policy as [`Self::authorized_create`]
    async fn authorized_update(
        &mut self,
        external_id: &str,
        payload: &EventPayload,
    ) -> Result<(), CallError> {
        let token = self
            .tokens
            .ensure_valid_token()
            .await
            .map_err(CallError::Auth)?;
        match self.client.update_event(&token, external_id, payload).await {
            Err(CalendarError::Unauthorized) => {
                let token = self.tokens.refresh_now().await.map_err(CallError::Auth)?;
                self.client
                    .update_event(&token, external_id, payload)
                    .await
                    .map_err(CallError::Calendar)
            }
            other => other.map_err(CallError::Calendar),
        }
    }
}
