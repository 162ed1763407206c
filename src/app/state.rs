use crate::config::Settings;
use crate::git::{self, Diff, StashEntry, StatusEntry};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::search::{QuickSearch, SearchTarget};

// ── Enums ──

/// Which command set the next key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// `d` discards the active file, `a` discards everything
    Delete,
    /// `s` stashes, `a` applies the branch stash, `d` drops it
    Stash,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Delete => "DELETE",
            Mode::Stash => "STASH",
        }
    }
}

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Prompt,
}

/// What a text prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    CommitMessage,
    OpenRepo,
    NewRepo,
    NewBranch,
}

impl PromptKind {
    pub fn placeholder(&self) -> &'static str {
        match self {
            PromptKind::CommitMessage => "Commit message",
            PromptKind::OpenRepo => "Path to repository folder",
            PromptKind::NewRepo => "Path to new repository folder",
            PromptKind::NewBranch => "New branch name",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

// ── Repo snapshot ──

/// Everything the UI shows about the open repository
#[derive(Debug, Clone, Default)]
pub struct Repo {
    pub name: String,
    pub path: String,
    pub current_branch: String,
    pub branches: Vec<String>,
    pub changes: Vec<StatusEntry>,
    pub stashes: Vec<StashEntry>,
}

impl Repo {
    pub fn load(path: &str) -> Result<Self> {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        Ok(Repo {
            name,
            path: path.to_string(),
            current_branch: git::current_branch(path)?,
            branches: git::list_branches(path)?,
            changes: git::status(path)?,
            stashes: git::list_stash(path)?,
        })
    }

    /// Stash made on the current branch, if any
    pub fn branch_stash(&self) -> Option<&StashEntry> {
        git::stash_for_branch(&self.current_branch, &self.stashes)
    }
}

// ── Main App State ──

pub struct App {
    pub settings: Settings,
    /// Where settings are persisted
    pub settings_path: PathBuf,

    /// None until a repository has been opened
    pub repo: Option<Repo>,

    /// Index of the active entry in `repo.changes`
    pub selected: usize,
    /// State of the last toggle-all
    pub all_selected: bool,

    /// Diff of the active entry, rebuilt on every navigation
    pub diff: Diff,
    pub diff_scroll: u16,

    pub mode: Mode,
    pub input_mode: InputMode,
    pub search: Option<QuickSearch>,
    pub prompt: Option<Prompt>,

    pub should_quit: bool,
    pub watching: bool,

    /// Last notification and ticks since it was shown
    pub message: Option<String>,
    pub message_ticks: u8,
}

impl App {
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        App {
            settings,
            settings_path,
            repo: None,
            selected: 0,
            all_selected: true,
            diff: Diff::default(),
            diff_scroll: 0,
            mode: Mode::Normal,
            input_mode: InputMode::Normal,
            search: None,
            prompt: None,
            should_quit: false,
            watching: false,
            message: None,
            message_ticks: 0,
        }
    }

    /// Open the remembered active repo, or the first known one
    pub fn open_initial_repo(&mut self) {
        let path = if !self.settings.active_repo.is_empty() {
            self.settings.active_repo.clone()
        } else if let Some(first) = self.settings.repos.first() {
            first.clone()
        } else {
            return;
        };

        if let Err(e) = self.set_repository(&path) {
            warn!(path = %path, error = %e, "failed to open repository");
            self.notify(&format!("Cannot open {}: {}", path, e));
        }
    }

    // ── Repository ──

    /// Switch to `path`, remember it and make it the active repo
    pub fn open_repository(&mut self, path: &str) -> Result<()> {
        let root = git::repo_root_in(path)?;
        self.set_repository(&root)?;
        self.remember_active_repo(&root);
        Ok(())
    }

    /// `git init` a folder, then open it
    pub fn create_repository(&mut self, path: &str) -> Result<()> {
        git::init_repo(path)?;
        self.open_repository(path)
    }

    fn set_repository(&mut self, path: &str) -> Result<()> {
        let repo = Repo::load(path)?;
        info!(path, branch = %repo.current_branch, changes = repo.changes.len(), "opened repository");
        self.repo = Some(repo);
        self.show_entries();
        Ok(())
    }

    fn remember_active_repo(&mut self, path: &str) {
        let branch = self
            .repo
            .as_ref()
            .map(|r| r.current_branch.clone())
            .unwrap_or_default();
        self.settings.add_repo(path);
        self.settings.set_active_repo(path);
        self.settings.set_active_branch(&branch);
        self.persist_settings();
    }

    pub fn persist_settings(&mut self) {
        if let Err(e) = self.settings.save_to(&self.settings_path) {
            warn!(error = %e, "failed to save settings");
            self.notify(&format!("Settings not saved: {}", e));
        }
    }

    /// Reload branches, status and stashes from disk, keeping the selection
    /// where possible. The diff keeps its scroll offset while the same file
    /// stays active.
    pub fn refresh(&mut self) -> Result<()> {
        let active_path = self.active_entry().map(|e| e.path.clone());
        let Some(repo) = self.repo.as_mut() else {
            return Ok(());
        };
        repo.current_branch = git::current_branch(&repo.path)?;
        repo.branches = git::list_branches(&repo.path)?;
        repo.stashes = git::list_stash(&repo.path)?;
        let changes = git::status(&repo.path)?;

        // Carry over the user's commit selection for paths that are still changed
        let previous: Vec<(String, bool)> = repo
            .changes
            .iter()
            .map(|e| (e.path.clone(), e.selected))
            .collect();
        repo.changes = changes;
        for entry in repo.changes.iter_mut() {
            if let Some((_, sel)) = previous.iter().find(|(p, _)| *p == entry.path) {
                entry.selected = *sel;
            }
        }
        if let Some(idx) = active_path
            .as_ref()
            .and_then(|path| repo.changes.iter().position(|e| &e.path == path))
        {
            self.selected = idx;
        }

        self.clamp_selection();
        let still_active = active_path.is_some()
            && self.active_entry().map(|e| &e.path) == active_path.as_ref();
        if still_active {
            self.reload_active_diff();
        } else {
            self.show_active_diff();
        }
        Ok(())
    }

    /// Reset the staging list after the set of changes was replaced
    fn show_entries(&mut self) {
        self.selected = 0;
        self.all_selected = true;
        self.show_active_diff();
    }

    fn reload_changes(&mut self) -> Result<()> {
        if let Some(repo) = self.repo.as_mut() {
            repo.changes = git::status(&repo.path)?;
            repo.stashes = git::list_stash(&repo.path)?;
        }
        self.show_entries();
        Ok(())
    }

    // ── Staging list ──

    pub fn changes(&self) -> &[StatusEntry] {
        self.repo.as_ref().map(|r| r.changes.as_slice()).unwrap_or(&[])
    }

    pub fn active_entry(&self) -> Option<&StatusEntry> {
        self.changes().get(self.selected)
    }

    pub fn next_entry(&mut self) {
        let len = self.changes().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.show_active_diff();
    }

    pub fn prev_entry(&mut self) {
        if self.changes().is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.show_active_diff();
    }

    pub fn toggle_entry_selected(&mut self) {
        let idx = self.selected;
        if let Some(entry) = self.repo.as_mut().and_then(|r| r.changes.get_mut(idx)) {
            entry.selected = !entry.selected;
        }
    }

    pub fn toggle_all_selected(&mut self) {
        self.all_selected = !self.all_selected;
        let value = self.all_selected;
        if let Some(repo) = self.repo.as_mut() {
            for entry in repo.changes.iter_mut() {
                entry.selected = value;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.changes().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Show the active entry's diff from the top
    pub fn show_active_diff(&mut self) {
        self.diff_scroll = 0;
        self.reload_active_diff();
    }

    /// Rebuild the diff for the active entry, keeping the scroll offset where
    /// it still fits. Failures show an empty diff.
    fn reload_active_diff(&mut self) {
        let (path, entry) = match (&self.repo, self.active_entry()) {
            (Some(repo), Some(entry)) => (repo.path.clone(), entry.clone()),
            _ => {
                self.diff = Diff::default();
                self.diff_scroll = 0;
                return;
            }
        };
        self.diff = match git::diff_entry(&path, &entry) {
            Ok(diff) => diff,
            Err(e) => {
                warn!(file = %entry.path, error = %e, "diff failed");
                self.notify(&format!("Diff failed: {}", e));
                Diff::default()
            }
        };
        self.diff_scroll = self.diff_scroll.min(self.max_scroll());
    }

    // ── Diff scrolling ──

    /// Last offset that still shows a row at the top of the columns
    fn max_scroll(&self) -> u16 {
        let rows = self.diff.row_count().saturating_sub(1);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    pub fn scroll_down(&mut self) {
        let step = self.settings.display.scroll_step;
        self.diff_scroll = self.diff_scroll.saturating_add(step).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self) {
        let step = self.settings.display.scroll_step;
        self.diff_scroll = self.diff_scroll.saturating_sub(step);
    }

    // ── Modes ──

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Discard changes to the active file
    pub fn discard_active(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        let (path, entry) = match (&self.repo, self.active_entry()) {
            (Some(repo), Some(entry)) => (repo.path.clone(), entry.clone()),
            _ => return Ok(()),
        };
        git::discard(&path, &entry)?;
        self.reload_changes()?;
        self.notify(&format!("Discarded {}", entry.path));
        Ok(())
    }

    pub fn discard_all(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        let Some(path) = self.repo.as_ref().map(|r| r.path.clone()) else {
            return Ok(());
        };
        git::discard_all(&path)?;
        self.reload_changes()?;
        self.notify("Discarded all changes");
        Ok(())
    }

    pub fn stash_changes(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        let Some(path) = self.repo.as_ref().map(|r| r.path.clone()) else {
            return Ok(());
        };
        git::stash(&path)?;
        self.reload_changes()?;
        self.notify("Changes stashed");
        Ok(())
    }

    /// Pop the stash made on the current branch
    pub fn apply_branch_stash(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        let Some((path, index)) = self.branch_stash_ref() else {
            self.notify("No stash for this branch");
            return Ok(());
        };
        git::apply_stash(&path, &index)?;
        self.reload_changes()?;
        self.notify("Stash applied");
        Ok(())
    }

    pub fn drop_branch_stash(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        let Some((path, index)) = self.branch_stash_ref() else {
            self.notify("No stash for this branch");
            return Ok(());
        };
        git::drop_stash(&path, &index)?;
        if let Some(repo) = self.repo.as_mut() {
            repo.stashes = git::list_stash(&repo.path)?;
        }
        self.notify("Stash dropped");
        Ok(())
    }

    fn branch_stash_ref(&self) -> Option<(String, String)> {
        let repo = self.repo.as_ref()?;
        let stash = repo.branch_stash()?;
        Some((repo.path.clone(), stash.index.clone()))
    }

    pub fn undo_last_commit(&mut self) -> Result<()> {
        let Some(path) = self.repo.as_ref().map(|r| r.path.clone()) else {
            return Ok(());
        };
        git::undo_last_commit(&path)?;
        self.reload_changes()?;
        self.notify("Undid last commit");
        Ok(())
    }

    // ── Quick search ──

    pub fn open_branch_search(&mut self) {
        let Some(repo) = self.repo.as_ref() else {
            return;
        };
        self.search = Some(QuickSearch::branches(&repo.branches));
        self.input_mode = InputMode::Search;
    }

    pub fn open_repo_search(&mut self) {
        if self.settings.repos.is_empty() {
            self.notify("No repositories added");
            return;
        }
        self.search = Some(QuickSearch::repositories(&self.settings.repos));
        self.input_mode = InputMode::Search;
    }

    pub fn close_search(&mut self) {
        self.search = None;
        self.input_mode = InputMode::Normal;
    }

    /// Act on the highlighted search result
    pub fn submit_search(&mut self) -> Result<()> {
        let picked = self
            .search
            .as_ref()
            .and_then(|s| s.selected().map(|item| (s.target, item.value.clone())));
        self.close_search();

        let Some((target, value)) = picked else {
            return Ok(());
        };
        match target {
            SearchTarget::Branch => self.switch_branch(&value),
            SearchTarget::Repository => {
                self.set_repository(&value)?;
                self.remember_active_repo(&value);
                Ok(())
            }
        }
    }

    fn switch_branch(&mut self, branch: &str) -> Result<()> {
        let Some(path) = self.repo.as_ref().map(|r| r.path.clone()) else {
            return Ok(());
        };
        git::switch_branch(&path, branch)?;
        if let Some(repo) = self.repo.as_mut() {
            repo.current_branch = branch.to_string();
        }
        self.settings.set_active_branch(branch);
        self.persist_settings();
        self.reload_changes()?;
        self.notify(&format!("Switched to {}", branch));
        Ok(())
    }

    // ── Prompt ──

    pub fn start_prompt(&mut self, kind: PromptKind) {
        if self.repo.is_none() && matches!(kind, PromptKind::CommitMessage | PromptKind::NewBranch) {
            return;
        }
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
        self.input_mode = InputMode::Prompt;
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.input_mode = InputMode::Normal;
    }

    /// Run the action the prompt was opened for. Empty input just closes it.
    pub fn submit_prompt(&mut self) -> Result<()> {
        let Some(prompt) = self.prompt.take() else {
            return Ok(());
        };
        self.input_mode = InputMode::Normal;
        let value = prompt.input.trim().to_string();
        if value.is_empty() {
            return Ok(());
        }

        match prompt.kind {
            PromptKind::CommitMessage => self.commit(&value),
            PromptKind::OpenRepo => self.open_repository(&expand_home(&value)),
            PromptKind::NewRepo => self.create_repository(&expand_home(&value)),
            PromptKind::NewBranch => self.create_branch(&value),
        }
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        let Some(repo) = self.repo.as_ref() else {
            return Ok(());
        };
        git::commit(&repo.path, &repo.changes, message)?;
        self.reload_changes()?;
        self.notify("Committed!");
        Ok(())
    }

    fn create_branch(&mut self, branch: &str) -> Result<()> {
        let Some(path) = self.repo.as_ref().map(|r| r.path.clone()) else {
            return Ok(());
        };
        git::create_branch(&path, branch)?;
        if let Some(repo) = self.repo.as_mut() {
            repo.current_branch = git::current_branch(&path)?;
            repo.branches = git::list_branches(&path)?;
        }
        self.settings.set_active_branch(branch);
        self.persist_settings();
        self.reload_changes()?;
        self.notify(&format!("Created {}", branch));
        Ok(())
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_ticks = 0;
    }

    /// Called on every event loop iteration; clears stale notifications
    pub fn tick(&mut self) {
        if self.message.is_some() {
            self.message_ticks += 1;
            if self.message_ticks > 30 {
                self.message = None;
                self.message_ticks = 0;
            }
        }
    }
}

/// Expand a leading `~/` using the home directory
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ChangeKind;

    fn entry(path: &str) -> StatusEntry {
        StatusEntry {
            path: path.to_string(),
            orig_path: None,
            kind: ChangeKind::Modified,
            staged: false,
            selected: true,
        }
    }

    fn make_app(changes: Vec<StatusEntry>) -> App {
        let mut app = App::new(Settings::default(), PathBuf::from("/nonexistent/config.toml"));
        app.repo = Some(Repo {
            name: "test".into(),
            path: "/nonexistent/repo".into(),
            current_branch: "main".into(),
            branches: vec!["main".into(), "dev".into()],
            changes,
            stashes: vec![StashEntry {
                index: "stash@{0}".into(),
                branch: "dev".into(),
                message: "wip".into(),
            }],
        });
        app
    }

    #[test]
    fn navigation_is_clamped() {
        let mut app = make_app(vec![entry("a"), entry("b")]);
        app.prev_entry();
        assert_eq!(app.selected, 0);
        app.next_entry();
        app.next_entry();
        assert_eq!(app.selected, 1);
        assert_eq!(app.active_entry().map(|e| e.path.as_str()), Some("b"));
    }

    fn tall_diff(rows: usize) -> Diff {
        let body: String = (0..rows).map(|i| format!(" line{}\n", i)).collect();
        git::parse_diff(&format!("@@ -1,{0} +1,{0} @@\n{1}", rows, body))
    }

    #[test]
    fn navigation_resets_scroll() {
        let mut app = make_app(vec![entry("a"), entry("b")]);
        app.diff = tall_diff(30);
        app.scroll_down();
        assert_eq!(app.diff_scroll, 10);
        app.next_entry();
        assert_eq!(app.diff_scroll, 0);
    }

    #[test]
    fn scroll_up_stops_at_top() {
        let mut app = make_app(vec![]);
        app.diff = tall_diff(30);
        app.scroll_down();
        app.scroll_up();
        app.scroll_up();
        assert_eq!(app.diff_scroll, 0);
    }

    #[test]
    fn scroll_down_stops_at_last_row() {
        let mut app = make_app(vec![]);
        // 25 lines plus the hunk separator
        app.diff = tall_diff(25);
        for _ in 0..5 {
            app.scroll_down();
        }
        assert_eq!(app.diff_scroll, 25);

        app.diff = Diff::default();
        app.scroll_down();
        assert_eq!(app.diff_scroll, 0);
    }

    #[test]
    fn toggles_commit_selection() {
        let mut app = make_app(vec![entry("a"), entry("b")]);
        app.toggle_entry_selected();
        assert!(!app.changes()[0].selected);
        assert!(app.changes()[1].selected);

        app.toggle_all_selected();
        assert!(app.changes().iter().all(|e| !e.selected));
        app.toggle_all_selected();
        assert!(app.changes().iter().all(|e| e.selected));
    }

    #[test]
    fn failed_diff_leaves_empty_diff_and_notifies() {
        let mut app = make_app(vec![entry("a")]);
        app.show_active_diff();
        assert!(app.diff.is_empty());
        assert!(app.message.is_some());
    }

    #[test]
    fn empty_prompt_just_closes() {
        let mut app = make_app(vec![]);
        app.start_prompt(PromptKind::CommitMessage);
        assert_eq!(app.input_mode, InputMode::Prompt);
        app.prompt.as_mut().unwrap().input.push_str("   ");
        app.submit_prompt().unwrap();
        assert!(app.prompt.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn commit_prompt_needs_a_repo() {
        let mut app = App::new(Settings::default(), PathBuf::from("/nonexistent/config.toml"));
        app.start_prompt(PromptKind::CommitMessage);
        assert!(app.prompt.is_none());
        app.start_prompt(PromptKind::OpenRepo);
        assert!(app.prompt.is_some());
    }

    #[test]
    fn branch_stash_only_for_current_branch() {
        let mut app = make_app(vec![]);
        assert!(app.repo.as_ref().unwrap().branch_stash().is_none());
        app.repo.as_mut().unwrap().current_branch = "dev".into();
        assert_eq!(
            app.repo.as_ref().unwrap().branch_stash().map(|s| s.index.as_str()),
            Some("stash@{0}")
        );
    }

    #[test]
    fn apply_without_branch_stash_is_a_noop() {
        let mut app = make_app(vec![]);
        app.set_mode(Mode::Stash);
        app.apply_branch_stash().unwrap();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.message.as_deref(), Some("No stash for this branch"));
    }

    #[test]
    fn repo_search_requires_known_repos() {
        let mut app = make_app(vec![]);
        app.open_repo_search();
        assert!(app.search.is_none());
        app.settings.add_repo("/work/alpha");
        app.open_repo_search();
        assert_eq!(app.input_mode, InputMode::Search);
        app.close_search();
        assert!(app.search.is_none());
    }

    #[test]
    fn notifications_expire() {
        let mut app = make_app(vec![]);
        app.notify("hi");
        for _ in 0..31 {
            app.tick();
        }
        assert!(app.message.is_none());
    }

    fn git_in(dir: &Path, args: &[&str]) -> bool {
        std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn refresh_keeps_scroll_on_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        if !git_in(root, &["init"]) {
            return;
        }
        git_in(root, &["config", "user.email", "test@example.com"]);
        git_in(root, &["config", "user.name", "Test"]);
        git_in(root, &["config", "commit.gpgsign", "false"]);

        let original: String = (0..40).map(|i| format!("line {}\n", i)).collect();
        std::fs::write(root.join("a.txt"), &original).unwrap();
        assert!(git_in(root, &["add", "a.txt"]));
        assert!(git_in(root, &["commit", "-m", "init"]));
        let changed: String = (0..40).map(|i| format!("changed {}\n", i)).collect();
        std::fs::write(root.join("a.txt"), &changed).unwrap();

        let config_dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Settings::default(), config_dir.path().join("config.toml"));
        app.open_repository(root.to_str().unwrap()).unwrap();
        assert_eq!(app.active_entry().map(|e| e.path.as_str()), Some("a.txt"));
        app.scroll_down();
        assert_eq!(app.diff_scroll, 10);

        // An unrelated file appears on disk
        std::fs::write(root.join("b.txt"), "new\n").unwrap();
        app.refresh().unwrap();
        assert_eq!(app.changes().len(), 2);
        assert_eq!(app.active_entry().map(|e| e.path.as_str()), Some("a.txt"));
        assert_eq!(app.diff_scroll, 10);

        app.next_entry();
        assert_eq!(app.diff_scroll, 0);
    }
}
