use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Persisted client settings (`~/.config/gitgud/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Known repositories, in the order they were added
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default)]
    pub active_repo: String,
    #[serde(default)]
    pub active_branch: String,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_true")]
    pub syntax_highlight: bool,
    /// Rows moved per diff scroll step
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u16,
}

fn default_true() -> bool {
    true
}

fn default_scroll_step() -> u16 {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            syntax_highlight: true,
            scroll_step: default_scroll_step(),
        }
    }
}

impl Settings {
    /// Remember a repository path. Paths already in the list are ignored.
    pub fn add_repo(&mut self, repo_path: &str) {
        if !self.repos.iter().any(|r| r == repo_path) {
            self.repos.push(repo_path.to_string());
        }
    }

    pub fn set_active_repo(&mut self, repo_path: &str) {
        self.active_repo = repo_path.to_string();
    }

    pub fn set_active_branch(&mut self, branch: &str) {
        self.active_branch = branch.to_string();
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }
}

/// Location of the settings file
pub fn settings_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dir.join("gitgud").join("config.toml"))
}

/// Load settings from `path`. A missing file is created with defaults; a
/// file that doesn't parse falls back to defaults without touching it.
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        let settings = Settings::default();
        settings.save_to(path)?;
        return Ok(settings);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match toml::from_str::<Settings>(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Ok(Settings::default())
        }
    }
}

/// Open the settings file in `$EDITOR` and wait for it to exit
pub fn open_settings_in_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        anyhow::bail!("Editor exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_repo_deduplicates() {
        let mut s = Settings::default();
        s.add_repo("/a");
        s.add_repo("/b");
        s.add_repo("/a");
        assert_eq!(s.repos, vec!["/a", "/b"]);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let s = load_from(&path).unwrap();
        assert_eq!(s, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut s = Settings::default();
        s.add_repo("/work/project");
        s.set_active_repo("/work/project");
        s.set_active_branch("main");
        s.display.scroll_step = 5;
        s.save_to(&path).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "active_repo = \"/x\"\n[display]\nline_numbers = false\n").unwrap();

        let s = load_from(&path).unwrap();
        assert_eq!(s.active_repo, "/x");
        assert!(s.repos.is_empty());
        assert!(!s.display.line_numbers);
        assert!(s.display.syntax_highlight);
        assert_eq!(s.display.scroll_step, 10);
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(load_from(&path).unwrap(), Settings::default());
    }
}
