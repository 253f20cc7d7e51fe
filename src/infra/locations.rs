use dirs::home_dir;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveProjectsRootError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

#[derive(Debug, Error)]
pub enum ResolveConfigPathError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

/// Default root holding one log directory per project.
pub fn resolve_projects_root() -> Result<PathBuf, ResolveProjectsRootError> {
    if let Some(override_dir) = std::env::var_os("CC_CATALOG_PROJECTS_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveProjectsRootError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("projects"))
}

/// Default location of the persisted project-config document.
pub fn resolve_config_path() -> Result<PathBuf, ResolveConfigPathError> {
    if let Some(override_path) = std::env::var_os("CC_CATALOG_CONFIG_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveConfigPathError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("project-config.json"))
}
