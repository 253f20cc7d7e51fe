use crate::domain::{decode_project_path, parse_log_entry, parse_rfc3339_to_unix_ms};
use crate::infra::{list_log_files, read_log_lines, sort_newest_first};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// A recently-used path wins over the historical majority when it holds at
/// least this share of the majority's vote count.
const RECENCY_VOTE_RATIO: f64 = 0.25;

/// Resolves the authoritative working directory of a project by voting over
/// the `cwd` fields of its historical log entries, memoizing the result.
///
/// The cache is owned state, not a process global; each catalog carries its
/// own resolver. Entries never expire on their own — the external file-watch
/// collaborator calls [`DirectoryResolver::invalidate`] when logs change.
#[derive(Debug, Default)]
pub struct DirectoryResolver {
    cache: Mutex<HashMap<String, PathBuf>>,
}

impl DirectoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, projects_root: &Path, project_name: &str) -> PathBuf {
        if let Some(hit) = self.lock_cache().get(project_name) {
            return hit.clone();
        }

        let resolved = vote_project_directory(projects_root, project_name);
        debug!(project = project_name, path = %resolved.display(), "resolved project directory");
        self.lock_cache()
            .insert(project_name.to_string(), resolved.clone());
        resolved
    }

    /// Drop every memoized path. Called externally when log files change.
    pub fn invalidate(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, PathBuf>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scan every log entry of the project and pick its working directory.
///
/// A project's directory legitimately shifts over its lifetime (repository
/// moved). Pure majority vote lags behind a deliberate move; pure
/// most-recent is noisy against one-off invocations from unrelated
/// directories. The latest-seen path wins when it carries at least 25% of
/// the majority count; otherwise the majority stands.
fn vote_project_directory(projects_root: &Path, project_name: &str) -> PathBuf {
    let project_dir = projects_root.join(project_name);
    let mut files = list_log_files(&project_dir);
    if files.is_empty() {
        return decode_project_path(project_name);
    }
    sort_newest_first(&mut files);

    // Insertion order doubles as the tie-break order.
    let mut votes: Vec<(String, usize)> = Vec::new();
    let mut latest: Option<(String, i64)> = None;

    for file in &files {
        let Ok(lines) = read_log_lines(&file.path) else {
            continue;
        };
        for line in lines.map_while(Result::ok) {
            let Some(entry) = parse_log_entry(&line) else {
                continue;
            };
            let Some(cwd) = entry.cwd else { continue };

            match votes.iter_mut().find(|(path, _)| *path == cwd) {
                Some((_, count)) => *count += 1,
                None => votes.push((cwd.clone(), 1)),
            }

            if let Some(ms) = entry
                .timestamp
                .as_deref()
                .and_then(parse_rfc3339_to_unix_ms)
            {
                let newer = latest.as_ref().is_none_or(|(_, best)| ms > *best);
                if newer {
                    latest = Some((cwd, ms));
                }
            }
        }
    }

    match votes.len() {
        0 => decode_project_path(project_name),
        1 => PathBuf::from(&votes[0].0),
        _ => PathBuf::from(pick_voted_path(&votes, latest.as_ref().map(|(p, _)| p.as_str()))),
    }
}

fn pick_voted_path<'a>(votes: &'a [(String, usize)], latest_cwd: Option<&'a str>) -> &'a str {
    let max_count = votes.iter().map(|(_, count)| *count).max().unwrap_or(0);

    if let Some(latest) = latest_cwd {
        let recent_count = votes
            .iter()
            .find(|(path, _)| path == latest)
            .map(|(_, count)| *count)
            .unwrap_or(0);
        if recent_count as f64 >= RECENCY_VOTE_RATIO * max_count as f64 {
            return latest;
        }
    }

    votes
        .iter()
        .find(|(_, count)| *count == max_count)
        .map(|(path, _)| path.as_str())
        .unwrap_or("")
}
