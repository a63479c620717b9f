//! Common CLI argument types

use clap::ValueEnum;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-oriented view with context lines and tables
    Pretty,
    /// Bare table
    Table,
    /// JSON envelope for scripting
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parses_from_str() {
        assert_eq!(
            OutputFormat::from_str("pretty", true).unwrap(),
            OutputFormat::Pretty
        );
        assert_eq!(
            OutputFormat::from_str("json", true).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }
}
