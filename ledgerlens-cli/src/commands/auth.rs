//! Auth command - bootstrap and maintain QuickBooks authorization.

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use ledgerlens_core::{CredentialState, validate_realm_id};
use ledgerlens_fetch::CredentialStore;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;

use crate::app::App;
use crate::output::{AuthStatusOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Auth subcommands.
#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the consent page URL to open in a browser.
    Url {
        /// Anti-forgery state echoed back on the redirect. Random if omitted.
        #[arg(long)]
        state: Option<String>,
    },

    /// Trade the authorization code from the redirect for tokens.
    Exchange {
        /// `code` query parameter from the redirect.
        #[arg(long)]
        code: String,

        /// `realmId` query parameter from the redirect.
        #[arg(long)]
        realm_id: String,
    },

    /// Show the stored credential's state.
    Status,

    /// Refresh the access token now.
    Refresh,

    /// Forget the stored credential.
    Logout,
}

/// Runs the auth command.
pub async fn run(args: &AuthArgs, cli: &Cli, app: &App) -> Result<()> {
    match &args.action {
        AuthAction::Url { state } => show_url(state.as_deref(), cli, app),
        AuthAction::Exchange { code, realm_id } => exchange(code, realm_id, cli, app).await,
        AuthAction::Status => status(cli, app).await,
        AuthAction::Refresh => refresh(cli, app).await,
        AuthAction::Logout => logout(app).await,
    }
}

fn show_url(state: Option<&str>, cli: &Cli, app: &App) -> Result<()> {
    let state = state.map_or_else(random_state, str::to_string);
    let url = app.oauth_config()?.authorization_url(&state)?;

    match cli.format {
        OutputFormat::Text => {
            println!("Open this URL, approve access, then run `ledgerlens auth exchange`");
            println!("with the `code` and `realmId` from the redirect:");
            println!();
            println!("{url}");
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "url": url, "state": state });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

async fn exchange(code: &str, realm_id: &str, cli: &Cli, app: &App) -> Result<()> {
    validate_realm_id(realm_id)?;

    let bundle = app.token_client()?.exchange_code(code.trim()).await?;
    let credential = app
        .token_manager()?
        .store_bundle(&app.context, realm_id, &bundle)
        .await?;
    info!(context = %app.context, realm_id = %realm_id, "Authorization stored");

    print_status(
        &AuthStatusOutput::new(&app.context, Some(&credential), Utc::now().timestamp()),
        cli,
    )
}

async fn status(cli: &Cli, app: &App) -> Result<()> {
    let credential = app.credential_store().get(&app.context).await?;
    print_status(
        &AuthStatusOutput::new(&app.context, credential.as_ref(), Utc::now().timestamp()),
        cli,
    )
}

async fn refresh(cli: &Cli, app: &App) -> Result<()> {
    let credential = app.token_manager()?.refresh(&app.context).await?;
    print_status(
        &AuthStatusOutput::new(&app.context, Some(&credential), Utc::now().timestamp()),
        cli,
    )
}

async fn logout(app: &App) -> Result<()> {
    let store = app.credential_store();
    if !store.exists(&app.context).await {
        println!("No credential stored for '{}'", app.context);
        return Ok(());
    }

    store.delete(&app.context).await?;
    info!(context = %app.context, "Credential removed");
    println!("Removed credential for '{}'", app.context);
    Ok(())
}

fn print_status(status: &AuthStatusOutput, cli: &Cli) -> Result<()> {
    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_auth_status(status),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(status)?,
    };
    println!("{output}");

    if status.state == CredentialState::Missing {
        info!("Nothing stored; run `ledgerlens auth url` to authorize");
    }
    Ok(())
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_state() {
        let a = random_state();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, random_state());
    }
}
