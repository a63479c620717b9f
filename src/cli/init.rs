//! Init command implementation

use colored::Colorize;
use dialoguer::{Password, theme::ColorfulTheme};

use crate::client::{AuthApi, LabelCheckClient};
use crate::config::{Config, StoredToken};
use crate::error::Result;

/// Run the init command
///
/// Prompts for an API key, verifies it with an anonymous sign-in, and writes
/// the config (including the fresh token) to disk. A custom API host given on
/// the command line is persisted so later commands target the same backend.
pub async fn run(config_path: Option<&str>, api_host: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to LabelCheck!".bold().green());
    println!("Let's set up your scanner configuration.\n");

    // Prompt for API key
    let api_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your LabelCheck API key")
        .interact()?;

    // Verify the key with a sign-in
    println!("\n{}", "Authenticating...".cyan());
    let client = LabelCheckClient::with_host(
        Some(api_key.clone()),
        api_host.map(|h| h.to_string()),
    )?;
    let token = client.sign_in_anonymous(&api_key).await?;

    println!("{}", "✓ Authentication successful!".green());

    // Keep whatever else was already configured
    let mut config = Config::load_at(config_path).unwrap_or_default();
    config.api_key = Some(api_key);
    config.api_host = api_host.map(|h| h.to_string()).or(config.api_host);
    config.session = Some(StoredToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_at,
    });
    config.save_at(config_path)?;

    let saved_path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        saved_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!(
        "  {} - Upload a label photo",
        "labelcheck scan submit photo.jpg".cyan()
    );
    println!(
        "  {} - Browse your past scans",
        "labelcheck scan history".cyan()
    );

    Ok(())
}
