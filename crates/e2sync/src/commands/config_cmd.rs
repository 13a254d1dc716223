//! Config subcommand handlers.

use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Push")]
    push: String,
    #[tabled(rename = "Default")]
    default: String,
}

#[derive(serde::Serialize)]
struct ProfileEntry<'a> {
    name: &'a str,
    default: bool,
    #[serde(flatten)]
    profile: &'a Profile,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            url,
            name,
            set_default,
            force,
        } => {
            // Validate before touching the file.
            let server = config::parse_server_url(&url)?;
            let path = config::effective_path(global);
            let mut cfg = config::load(global)?;

            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: format!("profile '{name}' already exists (use --force to replace it)"),
                });
            }

            cfg.profiles.insert(
                name.clone(),
                Profile {
                    server: server.to_string(),
                    ..Profile::default()
                },
            );
            if set_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Profile '{name}' written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unprintable: {e}")),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let entries = profile_entries(&cfg);
            let out = output::render_list(
                &global.output,
                &entries,
                |e| ProfileRow {
                    name: e.name.to_owned(),
                    server: e.profile.server.clone(),
                    push: if e.profile.push.unwrap_or(true) { "on" } else { "off" }.into(),
                    default: if e.default { "*" } else { "" }.into(),
                },
                |e| e.name.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::effective_path(global).display().to_string(), false);
            Ok(())
        }
    }
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry<'_>> {
    cfg.profiles
        .iter()
        .map(|(name, profile)| ProfileEntry {
            name,
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
            profile,
        })
        .collect()
}
