use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Summary shown for a session until a better one is derived from its log.
pub const SUMMARY_PLACEHOLDER: &str = "New Session";

/// Longest summary derived from a user message, in characters.
pub const SUMMARY_MAX_CHARS: usize = 50;

/// User messages carrying this prefix are slash-command transcripts, not prose.
const COMMAND_PREFIX: &str = "<command-name>";

/// One parsed line of a project log file. Every field is optional; lines come
/// in several shapes (messages, summary markers, snapshots) and unknown shapes
/// must still decode.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,

    #[serde(rename = "type")]
    pub entry_type: Option<String>,

    pub summary: Option<String>,

    pub timestamp: Option<String>,

    pub cwd: Option<String>,

    pub message: Option<LogMessage>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogMessage {
    pub role: Option<String>,

    pub content: Value,
}

impl LogEntry {
    /// True for authoritative summary markers: `type == "summary"` with
    /// non-empty summary text.
    pub fn summary_text(&self) -> Option<&str> {
        if self.entry_type.as_deref() != Some("summary") {
            return None;
        }
        self.summary
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Parse one raw log line. Malformed or empty lines yield `None` and are the
/// caller's cue to skip silently.
pub fn parse_log_entry(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

pub fn parse_rfc3339_to_unix_ms(value: &str) -> Option<i64> {
    let timestamp = OffsetDateTime::parse(value, &Rfc3339).ok()?;
    let ms: i128 = timestamp.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok()
}

/// Derive a session summary from a user message entry.
///
/// Only plain-string content qualifies; structured content blocks and
/// command transcripts never become summaries. Long messages are cut to
/// [`SUMMARY_MAX_CHARS`] characters with an ellipsis suffix.
pub fn derive_summary_from_message(entry: &LogEntry) -> Option<String> {
    let message = entry.message.as_ref()?;
    if message.role.as_deref() != Some("user") {
        return None;
    }
    let text = message.content.as_str()?;
    let text = text.trim();
    if text.is_empty() || text.starts_with(COMMAND_PREFIX) {
        return None;
    }
    Some(truncate_summary(text))
}

fn truncate_summary(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(SUMMARY_MAX_CHARS) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
