//! Preset listing.

use tabled::Tabled;

use e2sync_core::{Preset, Session};

use crate::cli::{GlobalOpts, PresetsArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "State")]
    state: String,
}

impl PresetRow {
    fn new(p: &Preset, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            title: p.title.clone(),
            group: p.group_title().to_owned(),
            state: state_label(p, color),
        }
    }
}

fn state_label(p: &Preset, color: bool) -> String {
    let mut parts = Vec::new();
    if p.program {
        parts.push(output::program("PGM", color));
    }
    if p.preview {
        parts.push(output::preview("PVW", color));
    }
    if p.active {
        parts.push(output::active("active", color));
    }
    parts.join(" ")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &Session, args: &PresetsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = session.snapshot();
    let color = output::should_color(&global.color);

    let presets: Vec<&Preset> = snapshot
        .groups()
        .into_iter()
        .filter(|g| {
            args.group
                .as_deref()
                .is_none_or(|want| g.display_title().eq_ignore_ascii_case(want))
        })
        .flat_map(|g| g.presets)
        .collect();

    if let Some(group) = args.group.as_ref().filter(|_| presets.is_empty()) {
        return Err(CliError::NotFound {
            resource_type: "group".into(),
            identifier: group.clone(),
            list_command: "presets".into(),
        });
    }

    let out = output::render_list(
        &global.output,
        &presets,
        |p| PresetRow::new(p, color),
        |p| p.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
