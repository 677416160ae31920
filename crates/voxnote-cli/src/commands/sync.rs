//! Push and pull against the remote calendar.

use anyhow::Result;
use clap::Subcommand;
use voxnote_store::{EventStore, TaskStore};
use voxnote_sync::{Reconciler, SyncCommand, SyncError, SyncReport, SyncScope, TimeWindow};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Push local records to the calendar
    Push {
        /// Push a single record instead of everything
        #[arg(long)]
        only: Option<String>,
    },
    /// Import calendar events that have no local counterpart
    Pull {
        /// How many days back to look (defaults to the configured window)
        #[arg(long)]
        past_days: Option<u32>,
        /// How many days ahead to look (defaults to the configured window)
        #[arg(long)]
        future_days: Option<u32>,
    },
}

/// Run the sync command.
pub async fn run(action: SyncAction) -> Result<()> {
    let (config, secrets) = super::load_environment()?;
    let mut tasks = TaskStore::load(config.tasks_path())?;
    let mut events = EventStore::load(config.events_path())?;
    let (mut tokens, client) = super::calendar_session(&config, &secrets)?;

    let command = match action {
        SyncAction::Push { only } => SyncCommand::Push {
            scope: only.map_or(SyncScope::All, SyncScope::Single),
        },
        SyncAction::Pull {
            past_days,
            future_days,
        } => SyncCommand::Pull {
            window: TimeWindow::new(
                past_days.unwrap_or(config.sync.past_days),
                future_days.unwrap_or(config.sync.future_days),
            ),
        },
    };

    let mut reconciler = Reconciler::new(&mut tokens, &client, &mut tasks, &mut events);
    match reconciler.dispatch(command).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(SyncError::Auth(err)) => anyhow::bail!("{}", err.user_message()),
        Err(err) => Err(err.into()),
    }
}

fn print_report(report: &SyncReport) {
    println!("{}", report.summary());
    for failure in &report.failed {
        println!("  {} [{}] {}", failure.record_id, failure.kind, failure.message);
    }
    if report.needs_reauth() {
        println!("Authorization expired; run 'voxnote auth login' to reconnect.");
    }
}
