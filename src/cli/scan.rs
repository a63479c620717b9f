//! Scan command handlers

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::{CommandContext, HistoryArgs, OutputFormat};
use crate::client::models::{AnalysisOutcome, ScanRecord};
use crate::client::{
    HistoryApi, HistoryParams, ScanApi, fetch_remaining_pages, remaining_offsets,
};
use crate::error::{Error, Result};
use crate::models::{IngredientRow, ScanRow};
use crate::output::Formattable;
use crate::session::{PollPolicy, PollState, ScanSession};

/// Max concurrent requests when fetching all history pages
const PARALLEL_FETCH_LIMIT: usize = 8;

/// How often the spinner re-reads the session snapshot
const SPINNER_REFRESH: Duration = Duration::from_millis(250);

/// Build a polling policy from the optional --timeout flag
fn poll_policy(timeout_secs: Option<u64>) -> PollPolicy {
    PollPolicy {
        deadline: timeout_secs.map(Duration::from_secs),
        ..PollPolicy::default()
    }
}

/// Run the scan submit command: upload an image, then watch the analysis
pub async fn submit(
    format: OutputFormat,
    config_path: Option<&str>,
    api_host: Option<&str>,
    image_path: &str,
    no_watch: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let image = std::fs::read(image_path)?;
    debug!("Read {} bytes from {}", image.len(), image_path);

    let ctx = CommandContext::new(format, config_path, api_host).await?;
    let client: Arc<dyn ScanApi> = ctx.client.clone();
    let session = ScanSession::with_policy(client, poll_policy(timeout_secs));

    let scan_id = session.start_new_scan().await;
    println!("Scan ID: {}", scan_id.bold());

    let ack = session.upload_image(&image).await?;
    if ack.queued {
        println!(
            "{} Image queued for analysis (position {})",
            "✓".green(),
            ack.queue_position
        );
    } else {
        println!("{} Image accepted", "✓".green());
    }

    if no_watch {
        // Upload auto-starts polling; without a watcher, shut it down cleanly
        session.stop_polling().await;
        session.join_polling().await;
        eprintln!("\nContinue: labelcheck scan watch {}", scan_id);
        return Ok(());
    }

    watch_session(&session, ctx.format).await
}

/// Run the scan watch command against an existing scan
pub async fn watch(
    format: OutputFormat,
    config_path: Option<&str>,
    api_host: Option<&str>,
    scan_id: &str,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, api_host).await?;
    let client: Arc<dyn ScanApi> = ctx.client.clone();
    let session = ScanSession::with_policy(client, poll_policy(timeout_secs));

    session.resume_scan(scan_id).await;
    session.start_polling().await?;

    watch_session(&session, ctx.format).await
}

/// Run the scan get command: one-shot status fetch
pub async fn get(
    format: OutputFormat,
    config_path: Option<&str>,
    api_host: Option<&str>,
    scan_id: &str,
) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, api_host).await?;
    let record = ctx.client.get_scan(scan_id).await?;
    print_scan_detail(&record, ctx.format)
}

/// Run the scan history command
pub async fn history(
    format: OutputFormat,
    config_path: Option<&str>,
    api_host: Option<&str>,
    pagination: &HistoryArgs,
) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, api_host).await?;

    let params = pagination.to_params(ctx.config.preferences.history_page_size);
    let page_size = params.effective_limit();
    let first_offset = params.offset.unwrap_or(0);

    debug!(
        "Fetching history (limit={}, offset={})",
        page_size, first_offset
    );
    let first = ctx.client.scan_history(Some(&params)).await?;
    let total = first.total;
    let has_more = first.has_more;
    let mut scans = first.scans;

    if pagination.all && has_more {
        let offsets = remaining_offsets(total, page_size, first_offset);
        debug!("Fetching {} remaining pages in parallel", offsets.len());

        let client = ctx.client.clone();
        let remaining = fetch_remaining_pages(
            offsets,
            move |offset| {
                let c = client.clone();
                async move {
                    let params = HistoryParams::new().limit(page_size).offset(offset);
                    c.scan_history(Some(&params)).await.map(|p| p.scans)
                }
            },
            PARALLEL_FETCH_LIMIT,
        )
        .await?;
        scans.extend(remaining);

        // Arrival order is not history order
        scans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    let shown = scans.len();
    let rows: Vec<ScanRow> = scans.iter().map(ScanRow::from).collect();
    rows.print(ctx.format)?;

    if ctx.format == OutputFormat::Pretty {
        eprintln!("\nShowing {} of {} scans", shown, total);
        if has_more && !pagination.all {
            eprintln!("Continue: labelcheck scan history --offset {} (or --all)", first_offset + shown);
        }
    }

    Ok(())
}

/// Run the scan reanalyze command
pub async fn reanalyze(
    format: OutputFormat,
    config_path: Option<&str>,
    api_host: Option<&str>,
    scan_id: &str,
    watch_after: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, api_host).await?;

    let record = ctx.client.reanalyze_scan(scan_id).await?;
    println!("{} Reanalysis requested", "✓".green());

    if !watch_after {
        return print_scan_detail(&record, ctx.format);
    }

    let client: Arc<dyn ScanApi> = ctx.client.clone();
    let session = ScanSession::with_policy(client, poll_policy(timeout_secs));
    session.resume_scan(scan_id).await;
    session.start_polling().await?;

    watch_session(&session, ctx.format).await
}

/// Drive a spinner off session snapshots until the polling loop finishes,
/// then render the final record.
async fn watch_session(session: &ScanSession, format: OutputFormat) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .expect("static spinner template is valid"),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Waiting for scan status...");

    loop {
        let snapshot = session.snapshot().await;

        if let Some(record) = &snapshot.latest_record {
            // Guidance from the backend beats a generic progress message
            let message = record
                .latest_guidance
                .clone()
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| match record.analysis_status.as_deref() {
                    Some(status) => format!("Analysis: {}", status),
                    None => format!("Scan status: {}", record.status),
                });
            spinner.set_message(message);
        } else if let Some(err) = &snapshot.last_error {
            spinner.set_message(format!("Retrying: {}", err));
        }

        if snapshot.poll_state != PollState::Polling {
            break;
        }
        tokio::time::sleep(SPINNER_REFRESH).await;
    }

    session.join_polling().await;
    spinner.finish_and_clear();

    let snapshot = session.snapshot().await;
    match snapshot.latest_record {
        Some(record) if record.analysis_complete() => print_scan_detail(&record, format),
        _ => {
            let reason = snapshot
                .last_error
                .unwrap_or_else(|| "Polling stopped before the analysis completed".to_string());
            Err(Error::Other(reason))
        }
    }
}

/// Render a full scan record (the `scan get` / end-of-watch view)
fn print_scan_detail(record: &ScanRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
            Ok(())
        }
        OutputFormat::Table => {
            let rows = vec![ScanRow::from(record)];
            rows.print(OutputFormat::Table)
        }
        OutputFormat::Pretty => {
            // Line 1: product
            match &record.product_info {
                Some(product) => {
                    let name = product.name.as_deref().unwrap_or("(unnamed product)");
                    match product.brand.as_deref() {
                        Some(brand) if !brand.is_empty() => {
                            println!("Product: {} ({})", name.bold(), brand)
                        }
                        _ => println!("Product: {}", name.bold()),
                    }
                }
                None => println!("Product: {}", "(not extracted yet)".dimmed()),
            }

            // Extracted ingredient list, when OCR has produced one
            if let Some(product) = &record.product_info
                && !product.ingredients.is_empty()
            {
                let names: Vec<&str> =
                    product.ingredients.iter().map(|i| i.name()).collect();
                println!("Ingredients: {}", names.join(", "));
            }

            // Line 2: identity and lifecycle
            let kind = record.scan_type.as_deref().unwrap_or("--");
            println!(
                "Scan ID: {} | Type: {} | Status: {}",
                record.id, kind, record.status
            );
            println!(
                "Scanned: {} | Analysis: {}",
                crate::models::display::common::format_relative_time(&record.created_at),
                record.analysis_status.as_deref().unwrap_or("--")
            );

            // Verdict section
            println!();
            match record.outcome() {
                AnalysisOutcome::NotYetAnalyzed => {
                    println!("{}", "Analysis pending".yellow());
                }
                AnalysisOutcome::NoPreferencesConfigured => {
                    println!(
                        "{}",
                        "No dietary preferences configured (analysis skipped)".dimmed()
                    );
                }
                AnalysisOutcome::Verdict { verdict, result } => {
                    println!("Verdict: {}", format_verdict(verdict));

                    if let Some(ref overall) = result.overall_analysis {
                        println!("{}", overall);
                    }

                    if !result.ingredient_analysis.is_empty() {
                        println!();
                        let rows: Vec<IngredientRow> = result
                            .ingredient_analysis
                            .iter()
                            .map(IngredientRow::from)
                            .collect();
                        rows.print(OutputFormat::Table)?;
                    }

                    if result.is_stale {
                        eprintln!();
                        eprintln!(
                            "{} Preferences changed since this analysis. Continue: labelcheck scan reanalyze {}",
                            "⚠".yellow(),
                            record.id
                        );
                    }
                }
            }

            if let Some(ref guidance) = record.latest_guidance
                && !guidance.is_empty()
            {
                println!("\nHint: {}", guidance);
            }

            Ok(())
        }
    }
}

/// Colorize a verdict tag: match is green, uncertain amber, anything else red
fn format_verdict(verdict: &str) -> String {
    match verdict.to_lowercase().as_str() {
        "match" | "matched" => format!("✓ {}", verdict).green().to_string(),
        "uncertain" | "unknown" => format!("? {}", verdict).yellow().to_string(),
        _ => format!("✗ {}", verdict).red().to_string(),
    }
}
