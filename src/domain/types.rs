use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One logical conversation, merged from every log line bearing its id.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,

    pub summary: String,

    pub message_count: u64,

    /// RFC-3339 timestamp of the latest contributing entry.
    pub last_activity: Option<String>,

    /// Parsed form of `last_activity`, kept for ordering.
    #[serde(skip)]
    pub last_activity_unix_ms: Option<i64>,

    /// Last-seen working-directory hint. Informational only; the
    /// authoritative path comes from directory resolution.
    pub cwd: Option<String>,
}

/// One page of a paginated session listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub total: usize,
    pub has_more: bool,
}

/// Totals behind a bounded session preview.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub total: usize,
    pub has_more: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier derived from the log-directory name (or an encoded path for
    /// manually-added projects).
    pub name: String,

    pub display_name: String,

    pub full_path: PathBuf,

    pub session_meta: SessionWindow,

    /// Most-recent-first preview, bounded to a small fixed count in catalog
    /// listings.
    pub sessions: Vec<Session>,
}

/// Per-project overrides persisted in the config document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfigEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manually_added: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
}

impl ProjectConfigEntry {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.manually_added.is_none() && self.original_path.is_none()
    }

    pub fn is_manually_added(&self) -> bool {
        self.manually_added == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let page = SessionPage {
            sessions: vec![Session {
                id: "s1".to_string(),
                summary: "hello".to_string(),
                message_count: 2,
                last_activity: Some("2026-02-19T00:00:00Z".to_string()),
                last_activity_unix_ms: Some(1_771_459_200_000),
                cwd: Some("/tmp/p".to_string()),
            }],
            total: 1,
            has_more: false,
        };
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["hasMore"], serde_json::json!(false));
        assert_eq!(json["sessions"][0]["messageCount"], serde_json::json!(2));
        assert_eq!(
            json["sessions"][0]["lastActivity"],
            serde_json::json!("2026-02-19T00:00:00Z")
        );
        assert!(json["sessions"][0].get("lastActivityUnixMs").is_none());
    }

    #[test]
    fn config_entry_round_trips() {
        let entry = ProjectConfigEntry {
            display_name: Some("My App".to_string()),
            manually_added: Some(true),
            original_path: Some("/tmp/app".to_string()),
        };
        let json = serde_json::to_string(&entry).expect("serialize");
        assert!(json.contains("manuallyAdded"));
        let back: ProjectConfigEntry = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, entry);
        assert!(!back.is_empty());
        assert!(back.is_manually_added());
    }
}
