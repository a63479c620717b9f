//! LabelCheck CLI - Companion for the LabelCheck ingredient-analysis platform

use clap::{CommandFactory, Parser};

mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod session;

use cli::{Cli, Commands, ScanCommands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Wire up env_logger; --debug raises the default filter, RUST_LOG still wins
fn init_logging(debug: bool) {
    let default_filter = if debug {
        "labelcheck=debug"
    } else {
        "labelcheck=warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref(), cli.api_host.as_deref()).await,
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Version => {
            println!("labelcheck version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Scan(scan_cmd) => match scan_cmd {
            ScanCommands::Submit {
                image,
                no_watch,
                timeout,
            } => {
                cli::scan::submit(
                    cli.format,
                    cli.config.as_deref(),
                    cli.api_host.as_deref(),
                    &image,
                    no_watch,
                    timeout,
                )
                .await
            }
            ScanCommands::Watch { scan_id, timeout } => {
                cli::scan::watch(
                    cli.format,
                    cli.config.as_deref(),
                    cli.api_host.as_deref(),
                    &scan_id,
                    timeout,
                )
                .await
            }
            ScanCommands::Get { scan_id } => {
                cli::scan::get(
                    cli.format,
                    cli.config.as_deref(),
                    cli.api_host.as_deref(),
                    &scan_id,
                )
                .await
            }
            ScanCommands::History { pagination } => {
                cli::scan::history(
                    cli.format,
                    cli.config.as_deref(),
                    cli.api_host.as_deref(),
                    &pagination,
                )
                .await
            }
            ScanCommands::Reanalyze {
                scan_id,
                watch,
                timeout,
            } => {
                cli::scan::reanalyze(
                    cli.format,
                    cli.config.as_deref(),
                    cli.api_host.as_deref(),
                    &scan_id,
                    watch,
                    timeout,
                )
                .await
            }
        },
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "labelcheck",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
