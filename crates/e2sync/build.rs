use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{CommandFactory, ValueEnum};
use clap_complete::Shell;

#[path = "src/cli.rs"]
mod cli;

/// Renders `e2sync(1)`, one page per visible subcommand (`e2sync-config-init(1)`
/// and so on), plus completion scripts for every supported shell, into
/// `$OUT_DIR/man` and `$OUT_DIR/completions`.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").ok_or("OUT_DIR not set by Cargo")?;
    let out_dir = Path::new(&out_dir);

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;
    let mut pending = vec![cli::Cli::command()];
    while let Some(cmd) = pending.pop() {
        let page = man_dir.join(format!("{}.1", cmd.get_name()));
        let mut buf = Vec::new();
        clap_mangen::Man::new(cmd.clone()).render(&mut buf)?;
        fs::write(&page, buf)?;

        let parent = cmd.get_name().to_owned();
        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| sub.clone().name(format!("{parent}-{}", sub.get_name()))),
        );
    }

    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir)?;
    let mut cmd = cli::Cli::command();
    for shell in Shell::value_variants() {
        clap_complete::generate_to(*shell, &mut cmd, "e2sync", &completions_dir)?;
    }

    Ok(())
}
