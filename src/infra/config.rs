use crate::domain::ProjectConfigEntry;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// The persisted config document: project identifier → overrides. Read and
/// written wholesale on every operation; last writer wins.
#[derive(Clone, Debug, Default)]
pub struct ProjectConfig {
    entries: BTreeMap<String, ProjectConfigEntry>,
}

impl ProjectConfig {
    pub fn entry(&self, name: &str) -> Option<&ProjectConfigEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &ProjectConfigEntry)> {
        self.entries.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn display_name_for(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|entry| entry.display_name.as_deref())
            .filter(|display| !display.trim().is_empty())
    }

    pub fn insert(&mut self, name: &str, entry: ProjectConfigEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Set or clear the display-name override. An empty (or all-whitespace)
    /// name clears it; an entry left with no overrides is dropped entirely.
    pub fn set_display_name(&mut self, name: &str, display_name: &str) {
        let display_name = display_name.trim();
        let entry = self.entries.entry(name.to_string()).or_default();
        if display_name.is_empty() {
            entry.display_name = None;
        } else {
            entry.display_name = Some(display_name.to_string());
        }
        if entry.is_empty() {
            self.entries.remove(name);
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadProjectConfigError {
    #[error("failed to read project config: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse project config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveProjectConfigError {
    #[error("failed to encode project config: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write project config: {0}")]
    Write(#[from] io::Error),
}

pub fn load_project_config(path: &Path) -> Result<ProjectConfig, LoadProjectConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(ProjectConfig::default());
        }
        Err(error) => return Err(error.into()),
    };

    let entries: BTreeMap<String, ProjectConfigEntry> = serde_json::from_str(&raw)?;
    Ok(ProjectConfig { entries })
}

pub fn save_project_config(
    path: &Path,
    config: &ProjectConfig,
) -> Result<(), SaveProjectConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(SaveProjectConfigError::Write)?;
    }

    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(&config.entries)?;
    fs::write(&tmp, text).map_err(SaveProjectConfigError::Write)?;
    fs::rename(tmp, path).map_err(SaveProjectConfigError::Write)?;
    Ok(())
}
