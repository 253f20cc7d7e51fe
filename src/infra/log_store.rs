use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct LogFileInfo {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

/// Lazy line stream over one log file. The file is never read wholly into
/// memory; restart by calling again.
pub fn read_log_lines(path: &Path) -> io::Result<Lines<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(BufReader::new(file).lines())
}

/// All `.jsonl` log files directly inside a project's log directory, with
/// modification times. An unreadable or missing directory yields an empty
/// list; unreadable entries are skipped.
pub fn list_log_files(project_dir: &Path) -> Vec<LogFileInfo> {
    let entries = match fs::read_dir(project_dir) {
        Ok(entries) => entries,
        Err(error) => {
            debug!(dir = %project_dir.display(), %error, "log directory not readable");
            return Vec::new();
        }
    };

    let mut files: Vec<LogFileInfo> = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        files.push(LogFileInfo {
            path,
            modified: metadata.modified().ok(),
        });
    }

    files
}

/// Order log files by modification time, newest first. Recent sessions live
/// in recent files, so scans that stop early see the right data first.
pub fn sort_newest_first(files: &mut [LogFileInfo]) {
    files.sort_by_key(|file| file.modified.unwrap_or(SystemTime::UNIX_EPOCH));
    files.reverse();
}
