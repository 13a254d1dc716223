//! Sources listing.

use tabled::Tabled;

use e2sync_core::{Session, Source};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl From<&Source> for SourceRow {
    fn from(s: &Source) -> Self {
        Self {
            index: s.index.map(|i| i.to_string()).unwrap_or_default(),
            title: s.title.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let listing = session.sources().await?;
    if !listing.safe && !global.quiet {
        eprintln!("warning: server reports the switcher is not safe");
    }

    let out = output::render_list(
        &global.output,
        &listing.sources,
        |s| SourceRow::from(s),
        |s| {
            s.title
                .clone()
                .or_else(|| s.index.map(|i| i.to_string()))
                .unwrap_or_default()
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
