use crate::domain::{
    LogEntry, SUMMARY_PLACEHOLDER, Session, SessionPage, derive_summary_from_message,
    parse_log_entry, parse_rfc3339_to_unix_ms,
};
use crate::infra::{list_log_files, read_log_lines, sort_newest_first};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Stop scanning older files once this many distinct sessions are in hand,
/// relative to the requested window...
const EARLY_EXIT_WINDOW_FACTOR: usize = 2;
/// ...but never before this many files (or all of them, when fewer exist)
/// have been seen, so small requests still sample some history.
const EARLY_EXIT_MIN_FILES: usize = 3;

struct OwnedSession {
    /// Index of the file that first materialized this session. Later (older)
    /// files never contribute: first-seen-wins across the newest-first order.
    owner: usize,
    session: Session,
}

/// Merge a project's log files into one deduplicated, most-recent-first page
/// of sessions.
///
/// An unreadable project directory degrades to an empty page; aggregation
/// never fails.
pub fn sessions_for(
    projects_root: &Path,
    project_name: &str,
    limit: usize,
    offset: usize,
) -> SessionPage {
    let project_dir = projects_root.join(project_name);
    let mut files = list_log_files(&project_dir);
    if files.is_empty() {
        return SessionPage::default();
    }
    sort_newest_first(&mut files);

    let min_files = files.len().min(EARLY_EXIT_MIN_FILES);
    let mut sessions: HashMap<String, OwnedSession> = HashMap::new();

    for (file_index, file) in files.iter().enumerate() {
        let Ok(lines) = read_log_lines(&file.path) else {
            continue;
        };
        for line in lines.map_while(Result::ok) {
            let Some(entry) = parse_log_entry(&line) else {
                continue;
            };
            let Some(session_id) = entry.session_id.clone() else {
                continue;
            };

            let record = sessions
                .entry(session_id.clone())
                .or_insert_with(|| OwnedSession {
                    owner: file_index,
                    session: new_session(session_id),
                });
            if record.owner == file_index {
                apply_entry(&mut record.session, &entry);
            }
        }

        let files_processed = file_index + 1;
        if sessions.len() >= EARLY_EXIT_WINDOW_FACTOR * (limit + offset)
            && files_processed >= min_files
        {
            debug!(
                project = project_name,
                files_processed,
                distinct = sessions.len(),
                "early exit from session scan"
            );
            break;
        }
    }

    let mut all: Vec<Session> = sessions.into_values().map(|owned| owned.session).collect();
    all.sort_by(|a, b| {
        let a_ms = a.last_activity_unix_ms.unwrap_or(i64::MIN);
        let b_ms = b.last_activity_unix_ms.unwrap_or(i64::MIN);
        b_ms.cmp(&a_ms).then_with(|| a.id.cmp(&b.id))
    });

    let total = all.len();
    let has_more = offset + limit < total;
    let sessions = all.into_iter().skip(offset).take(limit).collect();

    SessionPage {
        sessions,
        total,
        has_more,
    }
}

fn new_session(id: String) -> Session {
    Session {
        id,
        summary: SUMMARY_PLACEHOLDER.to_string(),
        message_count: 0,
        last_activity: None,
        last_activity_unix_ms: None,
        cwd: None,
    }
}

fn apply_entry(session: &mut Session, entry: &LogEntry) {
    if let Some(summary) = entry.summary_text() {
        // Summary markers are authoritative and always overwrite.
        session.summary = summary.to_string();
    } else if session.summary == SUMMARY_PLACEHOLDER {
        if let Some(summary) = derive_summary_from_message(entry) {
            session.summary = summary;
        }
    }

    session.message_count += 1;

    if let Some(timestamp) = entry.timestamp.as_deref() {
        if let Some(ms) = parse_rfc3339_to_unix_ms(timestamp) {
            if session.last_activity_unix_ms.is_none_or(|best| ms > best) {
                session.last_activity = Some(timestamp.to_string());
                session.last_activity_unix_ms = Some(ms);
            }
        }
    }

    if let Some(cwd) = entry.cwd.as_deref() {
        session.cwd = Some(cwd.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fmt::Write as _;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_log(project_dir: &Path, name: &str, mtime_unix: i64, lines: &[String]) -> PathBuf {
        fs::create_dir_all(project_dir).expect("create");
        let path = project_dir.join(name);
        let mut body = String::new();
        for line in lines {
            writeln!(body, "{line}").expect("format");
        }
        fs::write(&path, body).expect("write");
        filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime_unix, 0)).expect("mtime");
        path
    }

    fn message_line(session_id: &str, minute: u32, text: &str) -> String {
        format!(
            r#"{{"sessionId":"{session_id}","timestamp":"2026-02-19T00:{minute:02}:00Z","message":{{"role":"user","content":"{text}"}}}}"#
        )
    }

    #[test]
    fn missing_directory_yields_empty_page() {
        let root = tempdir().expect("tempdir");
        let page = sessions_for(root.path(), "absent", 10, 0);
        assert_eq!(page, SessionPage::default());
    }

    #[test]
    fn merges_entries_into_one_session() {
        let root = tempdir().expect("tempdir");
        write_log(
            &root.path().join("p"),
            "a.jsonl",
            100,
            &[
                message_line("s1", 1, "Fix the login flow"),
                message_line("s1", 5, "And add a test"),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
        let session = &page.sessions[0];
        assert_eq!(session.id, "s1");
        assert_eq!(session.summary, "Fix the login flow");
        assert_eq!(session.message_count, 2);
        assert_eq!(
            session.last_activity.as_deref(),
            Some("2026-02-19T00:05:00Z")
        );
    }

    #[test]
    fn summary_marker_overwrites_derived_summary() {
        let root = tempdir().expect("tempdir");
        write_log(
            &root.path().join("p"),
            "a.jsonl",
            100,
            &[
                message_line("s1", 1, "Fix the login flow"),
                r#"{"sessionId":"s1","type":"summary","summary":"Login flow rework"}"#.to_string(),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.sessions[0].summary, "Login flow rework");
    }

    #[test]
    fn command_messages_never_become_summaries() {
        let root = tempdir().expect("tempdir");
        write_log(
            &root.path().join("p"),
            "a.jsonl",
            100,
            &[
                message_line("s1", 1, "<command-name>clear</command-name>"),
                message_line("s1", 2, "Real request"),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.sessions[0].summary, "Real request");
    }

    #[test]
    fn newer_file_wins_session_dedup() {
        let root = tempdir().expect("tempdir");
        let project = root.path().join("p");
        write_log(
            &project,
            "new.jsonl",
            200,
            &[message_line("s1", 10, "From the newer file")],
        );
        write_log(
            &project,
            "old.jsonl",
            100,
            &[
                message_line("s1", 1, "From the older file"),
                message_line("s1", 2, "More old lines"),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.total, 1);
        let session = &page.sessions[0];
        assert_eq!(session.summary, "From the newer file");
        // Old-file lines for an already-materialized session are ignored.
        assert_eq!(session.message_count, 1);
    }

    #[test]
    fn malformed_lines_are_skipped_silently() {
        let root = tempdir().expect("tempdir");
        write_log(
            &root.path().join("p"),
            "a.jsonl",
            100,
            &[
                "not json at all".to_string(),
                message_line("s1", 1, "hello"),
                r#"{"broken": }"#.to_string(),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.total, 1);
        assert_eq!(page.sessions[0].message_count, 1);
    }

    #[test]
    fn sorts_by_last_activity_descending() {
        let root = tempdir().expect("tempdir");
        write_log(
            &root.path().join("p"),
            "a.jsonl",
            100,
            &[
                message_line("older", 1, "first"),
                message_line("newer", 30, "second"),
            ],
        );

        let page = sessions_for(root.path(), "p", 10, 0);
        let ids: Vec<_> = page.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }

    #[test]
    fn pagination_invariant_holds_for_all_windows() {
        let root = tempdir().expect("tempdir");
        let lines: Vec<String> = (0..7)
            .map(|i| message_line(&format!("s{i}"), i, "hello"))
            .collect();
        write_log(&root.path().join("p"), "a.jsonl", 100, &lines);

        for offset in 0..9 {
            for limit in 0..9 {
                let page = sessions_for(root.path(), "p", limit, offset);
                assert_eq!(page.total, 7);
                let expected = limit.min(page.total.saturating_sub(offset));
                assert_eq!(page.sessions.len(), expected, "limit={limit} offset={offset}");
                assert_eq!(page.has_more, offset + limit < page.total);
            }
        }
    }

    #[test]
    fn early_exit_stops_after_minimum_file_breadth() {
        let root = tempdir().expect("tempdir");
        let project = root.path().join("p");
        // Five files, ten sessions each; limit 1 satisfies the window after
        // the first file but the scan must still cover three files.
        for file_index in 0..5 {
            let lines: Vec<String> = (0..10)
                .map(|i| message_line(&format!("f{file_index}-s{i}"), i, "hello"))
                .collect();
            write_log(
                &project,
                &format!("{file_index}.jsonl"),
                500 - file_index as i64,
                &lines,
            );
        }

        let page = sessions_for(root.path(), "p", 1, 0);
        assert_eq!(page.total, 30);
        assert_eq!(page.sessions.len(), 1);
        assert!(page.has_more);
    }

    #[test]
    fn scans_all_files_when_window_needs_them() {
        let root = tempdir().expect("tempdir");
        let project = root.path().join("p");
        for file_index in 0..5 {
            write_log(
                &project,
                &format!("{file_index}.jsonl"),
                500 - file_index as i64,
                &[message_line(&format!("s{file_index}"), file_index as u32, "hi")],
            );
        }

        let page = sessions_for(root.path(), "p", 10, 0);
        assert_eq!(page.total, 5);
    }
}
