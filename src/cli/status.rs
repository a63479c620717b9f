//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "LabelCheck Configuration Status".bold());

    let config_result = Config::load_at(config_path);

    match config_result {
        Ok(config) => {
            let resolved = Config::resolve_path(config_path)?;
            println!("Config file: {}", resolved.display().to_string().cyan());

            if let Some(ref host) = config.api_host {
                println!("API host: {}", host.cyan());
            }

            println!();

            // API key status
            if config.api_key.is_some() {
                println!("{} API key configured", "✓".green());
            } else {
                println!("{} API key not configured", "✗".red());
                println!("  → Run 'labelcheck init' to configure");
            }

            // Access token status
            if let Some(ref token) = config.session {
                if config.is_token_expired() {
                    println!(
                        "{} Access token expired (will refresh on next command)",
                        "⚠".yellow()
                    );
                } else {
                    let remaining = token.expires_at.signed_duration_since(chrono::Utc::now());
                    let hours = remaining.num_hours();
                    let mins = remaining.num_minutes() % 60;
                    println!(
                        "{} Access token valid ({}h {}m remaining)",
                        "✓".green(),
                        hours,
                        mins
                    );
                }
            } else {
                println!("{} No cached access token", "⚠".yellow());
            }

            println!(
                "\nHistory page size: {}",
                config.preferences.history_page_size
            );
        }
        Err(_) => {
            println!("{} No configuration found", "✗".red());
            println!("  → Run 'labelcheck init' to set up");
        }
    }

    Ok(())
}
