use notify::event::EventKind;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use thiserror::Error;

/// Signal for the consumer to call `ProjectCatalog::invalidate` and refresh
/// its listings. The catalog itself never watches the filesystem; this
/// helper is the collaborator that feeds it.
#[derive(Clone, Debug)]
pub enum WatchSignal {
    Changed,
    Error(String),
}

#[derive(Debug)]
pub struct ProjectsRootWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<WatchSignal>,
}

impl ProjectsRootWatcher {
    pub fn try_recv(&self) -> Option<WatchSignal> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Error)]
pub enum WatchProjectsRootError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn watch_projects_root(path: &Path) -> Result<ProjectsRootWatcher, WatchProjectsRootError> {
    let (tx, rx) = channel::<WatchSignal>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if should_signal_invalidation(&event) {
                    let _ = tx.send(WatchSignal::Changed);
                }
            }
            Err(error) => {
                let _ = tx.send(WatchSignal::Error(error.to_string()));
            }
        },
        Config::default(),
    )?;

    watcher.watch(path, RecursiveMode::Recursive)?;

    Ok(ProjectsRootWatcher {
        _watcher: watcher,
        rx,
    })
}

fn should_signal_invalidation(event: &notify::Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    if event.paths.is_empty() {
        return true;
    }

    // Log files matter, and so do the project directories themselves
    // (created or removed log directories change the catalog).
    event.paths.iter().any(|path| {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext == "jsonl",
            None => true,
        }
    })
}
