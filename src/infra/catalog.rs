use crate::domain::{
    Project, ProjectConfigEntry, SessionPage, SessionWindow, decode_project_path,
    encode_project_name, parse_log_entry,
};
use crate::infra::{
    DirectoryResolver, LoadProjectConfigError, SaveProjectConfigError, list_log_files,
    load_project_config, read_log_lines, save_project_config, sessions_for,
};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// How many sessions each project carries in a catalog listing.
pub const SESSION_PREVIEW_LIMIT: usize = 5;

/// Absolute paths deeper than this render as `.../parent/name`.
const DISPLAY_PATH_MAX_SEGMENTS: usize = 3;

#[derive(Debug, Error)]
pub enum RenameProjectError {
    #[error(transparent)]
    Load(#[from] LoadProjectConfigError),

    #[error(transparent)]
    Save(#[from] SaveProjectConfigError),
}

#[derive(Debug, Error)]
pub enum AddProjectError {
    #[error("project already exists for path: {0}")]
    AlreadyOnDisk(String),

    #[error("project is already configured: {0}")]
    AlreadyConfigured(String),

    #[error(transparent)]
    Load(#[from] LoadProjectConfigError),

    #[error(transparent)]
    Save(#[from] SaveProjectConfigError),
}

#[derive(Debug, Error)]
pub enum DeleteProjectError {
    #[error("project not found: {0}")]
    NotFound(String),

    #[error("project has {total} session(s); only empty projects can be deleted")]
    NotEmpty { total: usize },

    #[error("failed to remove project directory: {0}")]
    RemoveDir(io::Error),

    #[error(transparent)]
    Load(#[from] LoadProjectConfigError),

    #[error(transparent)]
    Save(#[from] SaveProjectConfigError),
}

#[derive(Debug, Error)]
pub enum DeleteSessionError {
    #[error("session not found in any log file: {0}")]
    NotFound(String),

    #[error("failed to rewrite session log: {0}")]
    Rewrite(#[from] io::Error),
}

/// Top-level orchestrator over the log root: merges filesystem-discovered
/// projects with manually-registered ones and serves paginated session
/// listings.
#[derive(Debug)]
pub struct ProjectCatalog {
    projects_root: PathBuf,
    config_path: PathBuf,
    resolver: DirectoryResolver,
}

impl ProjectCatalog {
    pub fn new(projects_root: PathBuf, config_path: PathBuf) -> Self {
        Self {
            projects_root,
            config_path,
            resolver: DirectoryResolver::new(),
        }
    }

    pub fn projects_root(&self) -> &Path {
        &self.projects_root
    }

    /// Drop memoized directory resolutions. Wired to the external file
    /// watcher; the catalog never watches the filesystem itself.
    pub fn invalidate(&self) {
        self.resolver.invalidate();
    }

    /// One project per on-disk log directory, then one per manually-added
    /// config entry without a directory. Groups keep enumeration order.
    pub fn list(&self) -> Vec<Project> {
        let config = match load_project_config(&self.config_path) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "project config unreadable, listing without overrides");
                Default::default()
            }
        };

        let mut projects: Vec<Project> = Vec::new();
        let mut on_disk: HashSet<String> = HashSet::new();

        match fs::read_dir(&self.projects_root) {
            Ok(entries) => {
                for entry in entries {
                    let Ok(entry) = entry else { continue };
                    let Ok(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_dir() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy().to_string();
                    let full_path = self.resolver.resolve(&self.projects_root, &name);
                    let page =
                        sessions_for(&self.projects_root, &name, SESSION_PREVIEW_LIMIT, 0);
                    let display_name = config
                        .display_name_for(&name)
                        .map(str::to_string)
                        .unwrap_or_else(|| derive_display_name(&full_path));

                    on_disk.insert(name.clone());
                    projects.push(Project {
                        name,
                        display_name,
                        full_path,
                        session_meta: SessionWindow {
                            total: page.total,
                            has_more: page.has_more,
                        },
                        sessions: page.sessions,
                    });
                }
            }
            Err(error) => {
                warn!(root = %self.projects_root.display(), %error, "projects root unreadable");
            }
        }

        for (name, entry) in config.entries() {
            if !entry.is_manually_added() || on_disk.contains(name) {
                continue;
            }
            let full_path = entry
                .original_path
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| decode_project_path(name));
            let display_name = entry
                .display_name
                .clone()
                .filter(|display| !display.trim().is_empty())
                .unwrap_or_else(|| derive_display_name(&full_path));

            projects.push(Project {
                name: name.clone(),
                display_name,
                full_path,
                session_meta: SessionWindow::default(),
                sessions: Vec::new(),
            });
        }

        projects
    }

    pub fn sessions(&self, name: &str, limit: usize, offset: usize) -> SessionPage {
        sessions_for(&self.projects_root, name, limit, offset)
    }

    /// Set the display-name override; an empty name reverts to the derived
    /// one.
    pub fn rename(&self, name: &str, new_display_name: &str) -> Result<(), RenameProjectError> {
        let mut config = load_project_config(&self.config_path)?;
        config.set_display_name(name, new_display_name);
        save_project_config(&self.config_path, &config)?;
        Ok(())
    }

    /// Register a project that has no log directory yet.
    pub fn add_manually(
        &self,
        path: &Path,
        display_name: Option<&str>,
    ) -> Result<Project, AddProjectError> {
        let name = encode_project_name(path);
        if self.projects_root.join(&name).exists() {
            return Err(AddProjectError::AlreadyOnDisk(path.display().to_string()));
        }

        let mut config = load_project_config(&self.config_path)?;
        if config.contains(&name) {
            return Err(AddProjectError::AlreadyConfigured(name));
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|display| !display.is_empty())
            .map(str::to_string);
        config.insert(
            &name,
            ProjectConfigEntry {
                display_name: display_name.clone(),
                manually_added: Some(true),
                original_path: Some(path.to_string_lossy().to_string()),
            },
        );
        save_project_config(&self.config_path, &config)?;

        Ok(Project {
            display_name: display_name.unwrap_or_else(|| derive_display_name(path)),
            name,
            full_path: path.to_path_buf(),
            session_meta: SessionWindow::default(),
            sessions: Vec::new(),
        })
    }

    /// Remove a project's log directory and config entry. Refused while any
    /// session remains.
    pub fn delete_empty(&self, name: &str) -> Result<(), DeleteProjectError> {
        let page = sessions_for(&self.projects_root, name, 1, 0);
        if page.total > 0 {
            return Err(DeleteProjectError::NotEmpty { total: page.total });
        }

        let project_dir = self.projects_root.join(name);
        let had_dir = project_dir.is_dir();
        if had_dir {
            fs::remove_dir_all(&project_dir).map_err(DeleteProjectError::RemoveDir)?;
        }

        let mut config = load_project_config(&self.config_path)?;
        let had_config = config.remove(name);
        if had_config {
            save_project_config(&self.config_path, &config)?;
        }

        if !had_dir && !had_config {
            return Err(DeleteProjectError::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// Remove every log line belonging to one session, preserving all other
    /// lines byte-for-byte. Malformed lines never match.
    pub fn delete_session(&self, name: &str, session_id: &str) -> Result<(), DeleteSessionError> {
        let project_dir = self.projects_root.join(name);
        let files = list_log_files(&project_dir);

        let mut removed_any = false;
        for file in &files {
            if rewrite_without_session(&file.path, session_id)? {
                removed_any = true;
            }
        }

        if !removed_any {
            return Err(DeleteSessionError::NotFound(session_id.to_string()));
        }
        Ok(())
    }
}

/// Strip one session's lines from a log file. Returns whether any line
/// matched; files without matches are left untouched.
fn rewrite_without_session(path: &Path, session_id: &str) -> io::Result<bool> {
    let mut matched = false;
    {
        let lines = read_log_lines(path)?;
        for line in lines {
            let line = line?;
            if line_belongs_to_session(&line, session_id) {
                matched = true;
                break;
            }
        }
    }
    if !matched {
        return Ok(false);
    }

    // Re-stream with terminators intact so kept lines stay byte-identical.
    let tmp_path = path.with_extension("jsonl.tmp");
    let mut reader = BufReader::new(File::open(path)?);
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    let mut raw = String::new();
    loop {
        raw.clear();
        if reader.read_line(&mut raw)? == 0 {
            break;
        }
        if !line_belongs_to_session(raw.trim_end_matches(['\n', '\r']), session_id) {
            writer.write_all(raw.as_bytes())?;
        }
    }
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp_path, path)?;
    Ok(true)
}

fn line_belongs_to_session(line: &str, session_id: &str) -> bool {
    parse_log_entry(line)
        .and_then(|entry| entry.session_id)
        .is_some_and(|id| id == session_id)
}

/// Derived display name: the package manifest's declared name when one
/// exists at the resolved path, else a contracted or full path.
fn derive_display_name(full_path: &Path) -> String {
    if let Ok(raw) = fs::read_to_string(full_path.join("package.json")) {
        if let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&raw) {
            if let Some(name) = manifest.get("name").and_then(|v| v.as_str()) {
                if !name.trim().is_empty() {
                    return name.to_string();
                }
            }
        }
    }

    let display = full_path.to_string_lossy();
    let segments: Vec<&str> = display.split('/').filter(|s| !s.is_empty()).collect();
    if full_path.is_absolute() && segments.len() > DISPLAY_PATH_MAX_SEGMENTS {
        format!(
            ".../{}/{}",
            segments[segments.len() - 2],
            segments[segments.len() - 1]
        )
    } else {
        display.to_string()
    }
}
