//! Shared display formatting helpers

use chrono::{DateTime, Utc};

/// Format an RFC 3339 timestamp as a relative time ("2h ago").
///
/// The backend treats timestamps as opaque pass-through strings, so anything
/// unparsable renders as "--" instead of failing the whole table.
pub fn format_relative_time(timestamp: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return "--".to_string();
    };

    let elapsed = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
    if elapsed.num_seconds() < 0 {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }

    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 30 {
        format!("{}d ago", days)
    } else {
        parsed.format("%Y-%m-%d").to_string()
    }
}

/// Truncate a string for narrow table columns, marking the cut with an
/// ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Shorten a UUID-style id to its first segment for display
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
