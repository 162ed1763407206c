use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;
use tracing::warn;

/// Events emitted by the repository watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Working tree or index changed; status and diff need reloading
    RepoChanged(Vec<String>),
}

/// Debounced watcher over a repository's working tree
pub struct RepoWatcher {
    _debouncer: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl RepoWatcher {
    pub fn new(root: &Path, debounce_ms: u64, tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    let paths: Vec<String> = events
                        .iter()
                        .filter(|e| e.kind == DebouncedEventKind::Any)
                        .map(|e| e.path.to_string_lossy().to_string())
                        .filter(|p| is_relevant(p))
                        .collect();
                    if !paths.is_empty() {
                        let _ = tx.send(WatchEvent::RepoChanged(paths));
                    }
                }
                Err(e) => warn!(error = %e, "file watcher error"),
            },
        )?;

        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        Ok(RepoWatcher {
            _debouncer: debouncer,
        })
    }
}

/// Working tree files always count. Inside `.git/` only the index (staging)
/// and refs (commits, branch switches) do.
fn is_relevant(path: &str) -> bool {
    let path = path.replace('\\', "/");
    if !path.contains("/.git/") {
        return true;
    }
    path.ends_with("/.git/index") || path.contains("/.git/refs/") || path.ends_with("/.git/HEAD")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_tree_paths_are_relevant() {
        assert!(is_relevant("/repo/src/main.rs"));
    }

    #[test]
    fn git_internals_are_filtered() {
        assert!(!is_relevant("/repo/.git/objects/ab/cdef"));
        assert!(!is_relevant("/repo/.git/logs/HEAD"));
        assert!(is_relevant("/repo/.git/index"));
        assert!(is_relevant("/repo/.git/refs/heads/main"));
        assert!(is_relevant("/repo/.git/HEAD"));
    }

    #[test]
    fn windows_separators_are_normalized() {
        assert!(!is_relevant(r"C:\repo\.git\objects\ab"));
        assert!(is_relevant(r"C:\repo\.git\index"));
    }
}
