//! Preset activation and transitions.

use e2sync_core::{CommandAck, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn activate(session: &Session, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let preset = util::resolve_preset(&session.snapshot(), id)?.id.clone();
    let ack = session.activate_preset(preset).await?;
    print_ack(&ack, global)
}

pub async fn cut(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let ack = session.cut().await?;
    print_ack(&ack, global)
}

pub async fn autotrans(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let ack = session.autotrans().await?;
    print_ack(&ack, global)
}

fn print_ack(ack: &CommandAck, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        ack,
        |a| {
            format!(
                "{}: accepted (seq {} -> {})",
                a.command, a.expected_sequence, a.sequence
            )
        },
        |a| a.sequence.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
