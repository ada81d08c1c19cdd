//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use ledgerlens_store::{
    SettingsStore, default_config_dir, default_credentials_path, default_settings_path,
};
use tracing::info;

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets redacted).
    Show,

    /// Show configuration paths.
    Path,

    /// Write a settings file with defaults.
    Init {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, app: &App) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, app),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, app).await,
    }
}

fn show_config(cli: &Cli, app: &App) -> Result<()> {
    let mut settings = app.settings.clone();
    for secret in [&mut settings.client_secret, &mut settings.weather_api_key] {
        if secret.is_some() {
            *secret = Some("[REDACTED]".to_string());
        }
    }

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_settings(&settings),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&settings)?,
    };
    println!("{output}");
    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let credentials_path = default_credentials_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:       {}", config_dir.display());
            println!("Settings file:    {}", settings_path.display());
            println!("Credentials file: {}", credentials_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "credentials_file": credentials_path.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }
    Ok(())
}

async fn init_config(force: bool, app: &App) -> Result<()> {
    let path = app.store.path().to_path_buf();
    if path.exists() && !force {
        println!("Settings already exist at {} (use --force to overwrite)", path.display());
        return Ok(());
    }

    SettingsStore::new(path.clone()).save().await?;
    info!(path = %path.display(), "Settings initialized");
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
