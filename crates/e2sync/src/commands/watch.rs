//! Long-running session: follow the store and the event log.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use e2sync_core::{LogEntry, Session, SessionConfig, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status::StatusView;
use super::util;

pub async fn handle(
    config: SessionConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = Session::new(config)?;
    let color = output::should_color(&global.color);

    // Subscribe before starting so the initial refresh is reported too.
    let mut snapshots = session.subscribe();
    let mut events = session.events();
    session.start().await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut updates = 0usize;
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),

            changed = snapshots.changed() => {
                let Some(snapshot) = changed else { break Ok(()) };
                if let Err(e) = print_snapshot(&session, &snapshot, global) {
                    break Err(e);
                }
                updates += 1;
                if args.count.is_some_and(|n| updates >= n) {
                    break Ok(());
                }
            }

            entry = events.recv(), if args.events => match entry {
                Ok(entry) => {
                    if let Err(e) = print_entry(&entry, global, color) {
                        break Err(e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log output fell behind");
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    session.shutdown().await;
    result
}

fn print_snapshot(
    session: &Session,
    snapshot: &Arc<Snapshot>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let view = StatusView::new(&session.config().url, snapshot);
    let line = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let active = view.active.as_ref().map_or("-", |a| a.id.as_str());
            format!(
                "{} seq={} safe={} presets={} active={}",
                util::clock(chrono::Utc::now()),
                view.sequence,
                util::yes_no(view.safe),
                view.presets,
                active
            )
        }
        // One document per line so the stream stays parseable.
        _ => output::render_json(&view, true)?,
    };
    output::print_output(&line, global.quiet);
    Ok(())
}

fn print_entry(entry: &LogEntry, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let line = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let data = entry
                .data
                .as_ref()
                .map(|d| format!(" {d}"))
                .unwrap_or_default();
            let kind = entry.kind.to_string();
            let kind = if entry.kind.is_failure() {
                output::program(&kind, color)
            } else {
                output::dim(&kind, color)
            };
            format!("{} {kind} {}{data}", util::clock(entry.at), entry.message)
        }
        _ => output::render_json(entry, true)?,
    };
    output::print_output(&line, global.quiet);
    Ok(())
}
