//! Command handlers. Each one is a thin consumer of `e2sync_core::Session`.

mod config_cmd;
mod presets;
mod sources;
mod status;
mod transition;
mod util;
mod watch;

use e2sync_core::Session;

use crate::cli::{Cli, Command, CompletionsArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        // Local commands: no server involved
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }

        Command::Watch(args) => {
            let session_config = config::resolve_session_config(global)?;
            watch::handle(session_config, args, global).await
        }

        Command::Presets(args) => {
            oneshot(global, |s| async move { presets::handle(&s, &args, global) }).await
        }
        Command::Status => oneshot(global, |s| async move { status::handle(&s, global) }).await,
        Command::Sources => {
            oneshot(global, |s| async move { sources::handle(&s, global).await }).await
        }
        Command::Preset(args) => {
            oneshot(global, |s| async move {
                transition::activate(&s, &args.id, global).await
            })
            .await
        }
        Command::Cut => {
            oneshot(global, |s| async move { transition::cut(&s, global).await }).await
        }
        Command::Autotrans => {
            oneshot(global, |s| async move { transition::autotrans(&s, global).await }).await
        }
    }
}

/// Refresh once without the push channel, run `f`, shut down.
async fn oneshot<F, Fut>(global: &GlobalOpts, f: F) -> Result<(), CliError>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let session_config = config::resolve_session_config(global)?;
    tracing::debug!(server = %session_config.url, "starting one-shot session");

    // The inner CliError rides through the CoreError channel as a value.
    Session::oneshot(session_config, |session| async move { Ok(f(session).await) }).await?
}

fn completions(args: &CompletionsArgs) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "e2sync", &mut std::io::stdout());
}
