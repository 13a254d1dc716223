//! Snapshot summary.

use std::fmt::Write;

use serde::Serialize;

use e2sync_core::{Session, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
pub(super) struct StatusView {
    pub server: String,
    pub sequence: u64,
    pub safe: bool,
    pub presets: usize,
    pub active: Option<ActivePreset>,
}

#[derive(Debug, Serialize)]
pub(super) struct ActivePreset {
    pub id: String,
    pub title: String,
}

impl StatusView {
    pub(super) fn new(server: &url::Url, snapshot: &Snapshot) -> Self {
        Self {
            server: server.to_string(),
            sequence: snapshot.sequence,
            safe: snapshot.safe,
            presets: snapshot.presets.len(),
            active: snapshot.active().map(|p| ActivePreset {
                id: p.id.to_string(),
                title: p.title.clone(),
            }),
        }
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Server:    {}", view.server);
    let _ = writeln!(out, "Sequence:  {}", view.sequence);
    let safe = if view.safe {
        util::yes_no(true).to_owned()
    } else {
        output::program(util::yes_no(false), color)
    };
    let _ = writeln!(out, "Safe:      {safe}");
    let _ = writeln!(out, "Presets:   {}", view.presets);
    match &view.active {
        Some(a) => {
            let _ = write!(out, "Active:    {} ({})", output::active(&a.id, color), a.title);
        }
        None => {
            let _ = write!(out, "Active:    {}", output::dim("none", color));
        }
    }
    out
}

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = session.snapshot();
    let view = StatusView::new(&session.config().url, &snapshot);
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.sequence.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
