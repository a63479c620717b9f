//! Pagination argument types for CLI commands

use clap::Args;

use crate::client::HistoryParams;

/// Shared pagination arguments for the history command.
///
/// Flatten this into any command that reads paged history:
/// ```ignore
/// History {
///     #[command(flatten)]
///     pagination: HistoryArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct HistoryArgs {
    /// Maximum results per page
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Number of scans to skip from the newest
    #[arg(long, conflicts_with = "all")]
    pub offset: Option<usize>,

    /// Fetch every page, not just the first
    #[arg(long)]
    pub all: bool,
}

impl HistoryArgs {
    /// Convert CLI args to API history params.
    ///
    /// `default_limit` comes from the config's preferences when the flag is
    /// not given.
    pub fn to_params(&self, default_limit: usize) -> HistoryParams {
        let mut params = HistoryParams::new().limit(self.limit.unwrap_or(default_limit));

        if let Some(offset) = self.offset {
            params = params.offset(offset);
        }

        params
    }
}
