//! Press CLI - command-line access to the team session of a press site
//!
//! Runs the console's team operations against a server using the session
//! cookie from the configuration file

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use press_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ConsoleConfig,
    ErrorContext, LoggingConfig, PressError, PressResult,
};
use press_session::{global, HeadlessNavigator, SwitchOutcome, TeamContext};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "press")]
#[command(about = "Inspect and switch the team of a press console session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print the team this session works for
    Current,

    /// Show the team document
    Team {
        /// Fetch a fresh copy instead of the cached one
        #[arg(long)]
        reload: bool,
    },

    /// Switch the session to another team
    Switch {
        /// Team name
        team: String,
    },

    /// Check whether a team is down to its last site
    LastSite {
        /// Team name
        team: String,
    },

    /// List members of the current team
    Members,

    /// Invite someone to the current team
    Invite {
        /// Email address to invite
        email: String,
    },

    /// Remove a member from the current team
    Remove {
        /// Member to remove (usually their email)
        member: String,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        load_config(cli.config.as_ref()).context("Failed to load configuration")?;

    let logging_config = if cli.verbose {
        LoggingConfig {
            format: config.logging.format,
            log_file_path: config.logging.log_file_path.clone(),
            ..LoggingConfig::verbose()
        }
    } else {
        config.logging.clone()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Press CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        handle_config(&config, show, init, validate)?;
        return Ok(());
    }

    if config.session.storage_path.is_none() {
        config.session.storage_path = default_storage_path();
    }
    config.validate()?;

    let context = Arc::new(TeamContext::from_config(
        &config,
        Arc::new(HeadlessNavigator),
    )?);
    global::install(Arc::clone(&context));

    match cli.command {
        Commands::Current => handle_current(&context),
        Commands::Team { reload } => handle_team(&context, reload).await?,
        Commands::Switch { team } => handle_switch(&team).await?,
        Commands::LastSite { team } => handle_last_site(&context, &team).await?,
        Commands::Members => handle_members(&context).await?,
        Commands::Invite { email } => handle_invite(&context, &email).await?,
        Commands::Remove { member } => handle_remove(&context, &member).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn load_config(config_path: Option<&PathBuf>) -> PressResult<ConsoleConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return ConsoleConfig::from_file(path);
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("press").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".press").join("config.toml")),
        Some(PathBuf::from("press.toml")),
    ];

    for path in default_paths.iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return ConsoleConfig::from_file(path);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(ConsoleConfig::default())
}

/// Where the local key-value store lives when the config does not say
fn default_storage_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("press").join("local_storage.json"))
}

fn default_config_path() -> PressResult<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("press").join("config.toml"))
        .ok_or_else(|| PressError::Config {
            message: "Could not determine a configuration directory".to_string(),
            source: None,
            context: ErrorContext::new("cli")
                .with_operation("config_init")
                .with_suggestion("Pass --config with an explicit path"),
        })
}

fn handle_current(context: &TeamContext) {
    match context.get_current_team() {
        Some(team) => println!("{}", team),
        None => println!("Not logged in, or no team available"),
    }
}

async fn handle_team(context: &TeamContext, reload: bool) -> PressResult<()> {
    let team = context.get_team();
    let Some(name) = team.name() else {
        println!("Not logged in, or no team available");
        return Ok(());
    };

    log_operation_start!("fetch_team", team = name);
    let doc = if reload {
        team.reload().await
    } else {
        team.fetch().await
    };
    let doc = doc.inspect_err(|e| {
        log_operation_error!("fetch_team", e);
    })?;
    log_operation_success!("fetch_team", team = name);

    println!("📋 Team: {}", name);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

async fn handle_switch(team: &str) -> PressResult<()> {
    log_operation_start!("switch_team", team);
    match global::switch_to_team(team).await {
        Ok(SwitchOutcome::Switched) => {
            log_operation_success!("switch_team", team);
            println!("✅ Switched to {}", team);
            Ok(())
        }
        Ok(SwitchOutcome::Denied) => {
            println!("❌ Not allowed to switch to {}", team);
            Ok(())
        }
        Err(e) => {
            log_operation_error!("switch_team", e, team);
            Err(e)
        }
    }
}

async fn handle_last_site(context: &TeamContext, team: &str) -> PressResult<()> {
    let last = context
        .is_last_site(team)
        .await
        .inspect_err(|e| {
            log_operation_error!("is_last_site", e, team);
        })?;
    if last {
        println!("{} has exactly one site left", team);
    } else {
        println!("{} does not have exactly one site", team);
    }
    Ok(())
}

async fn handle_members(context: &TeamContext) -> PressResult<()> {
    let members = context
        .get_team()
        .get_team_members()
        .await
        .inspect_err(|e| {
            log_operation_error!("get_team_members", e);
        })?;

    if members.is_empty() {
        println!("No members");
        return Ok(());
    }

    println!("👥 {} member(s):", members.len());
    for member in &members {
        match member.email.as_deref() {
            Some(email) if email != member.name => {
                println!("   • {} <{}>", member.full_name(), email)
            }
            _ => println!("   • {}", member.full_name()),
        }
    }
    Ok(())
}

async fn handle_invite(context: &TeamContext, email: &str) -> PressResult<()> {
    log_operation_start!("invite_team_member", email);
    context
        .get_team()
        .invite_team_member(email)
        .await
        .inspect_err(|e| {
            log_operation_error!("invite_team_member", e, email);
        })?;
    log_operation_success!("invite_team_member", email);
    println!("✉️  Invited {}", email);
    Ok(())
}

async fn handle_remove(context: &TeamContext, member: &str) -> PressResult<()> {
    log_operation_start!("remove_team_member", member);
    context
        .get_team()
        .remove_team_member(member)
        .await
        .inspect_err(|e| {
            log_operation_error!("remove_team_member", e, member);
        })?;
    log_operation_success!("remove_team_member", member);
    println!("🗑️  Removed {}", member);
    Ok(())
}

fn handle_config(config: &ConsoleConfig, show: bool, init: bool, validate: bool) -> PressResult<()> {
    if init {
        let config_path = default_config_path()?;
        ConsoleConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {:?}", config_path);
        println!("📝 Edit the file to set the server URL, session cookie and teams.");
    }

    if show {
        let rendered = toml::to_string_pretty(config).map_err(|e| PressError::Config {
            message: format!("Failed to render configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli").with_operation("config_show"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        let cli = Cli::try_parse_from(["press", "-v", "switch", "globex"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Switch {
                team: "globex".to_string()
            }
        );
    }

    #[test]
    fn test_parse_last_site_and_config() {
        let cli = Cli::try_parse_from(["press", "last-site", "acme"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::LastSite {
                team: "acme".to_string()
            }
        );

        let cli = Cli::try_parse_from([
            "press",
            "--config",
            "/tmp/press.toml",
            "config",
            "--show",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/press.toml")));
        assert_eq!(
            cli.command,
            Commands::Config {
                show: true,
                init: false,
                validate: true
            }
        );
    }

    #[test]
    fn test_switch_requires_team() {
        assert!(Cli::try_parse_from(["press", "switch"]).is_err());
        assert!(Cli::try_parse_from(["press", "invite"]).is_err());
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ConsoleConfig::default();
        config.server.base_url = "https://cloud.example.com".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.server.base_url, "https://cloud.example.com");
    }
}
