use super::diff::{parse_diff, Diff};
use super::status::{
    parse_branches, parse_stash_list, parse_status, ChangeKind, StashEntry, StatusEntry,
};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, info};

/// Run git in `repo_root` and return stdout. Non-zero exits are errors
/// carrying git's stderr.
fn run_git(repo_root: &str, args: &[&str]) -> Result<String> {
    let output = spawn_git(repo_root, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn spawn_git(repo_root: &str, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .with_context(|| format!("Failed to run git in '{}'", repo_root))?;

    debug!(
        cmd = %args.join(" "),
        cwd = repo_root,
        exit = ?output.status.code(),
        stdout_len = output.stdout.len(),
        "git"
    );

    Ok(output)
}

// ── Repo ──

/// Resolve the top-level directory of the repository containing `dir`
pub fn repo_root_in(dir: &str) -> Result<String> {
    let out = run_git(dir, &["rev-parse", "--show-toplevel"])
        .with_context(|| format!("Not a git repository: {}", dir))?;
    Ok(out.trim().to_string())
}

/// Create `dir` if needed and run `git init` in it
pub fn init_repo(dir: &str) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create '{}'", dir))?;
    run_git(dir, &["init"])?;
    info!(path = dir, "initialized repository");
    Ok(())
}

// ── Status ──

pub fn status(repo_root: &str) -> Result<Vec<StatusEntry>> {
    let out = run_git(repo_root, &["status", "--porcelain", "--untracked-files=all"])?;
    Ok(parse_status(&out))
}

// ── Branches ──

pub fn list_branches(repo_root: &str) -> Result<Vec<String>> {
    let out = run_git(repo_root, &["branch", "-l", "--format=%(refname:short)"])?;
    Ok(parse_branches(&out))
}

pub fn current_branch(repo_root: &str) -> Result<String> {
    let out = run_git(repo_root, &["branch", "--show-current"])?;
    Ok(out.trim().to_string())
}

pub fn switch_branch(repo_root: &str, branch: &str) -> Result<()> {
    run_git(repo_root, &["checkout", branch])?;
    info!(branch, "switched branch");
    Ok(())
}

pub fn create_branch(repo_root: &str, branch: &str) -> Result<()> {
    run_git(repo_root, &["checkout", "-b", branch])?;
    info!(branch, "created branch");
    Ok(())
}

// ── Diff ──

/// Get the aligned diff for a single changed path
pub fn diff_entry(repo_root: &str, entry: &StatusEntry) -> Result<Diff> {
    let raw = match entry.kind {
        ChangeKind::Untracked => {
            // --no-index exits with 1 when the files differ
            let output = spawn_git(
                repo_root,
                &["diff", "--no-color", "--no-index", "--", "/dev/null", &entry.path],
            )?;
            if output.status.code().is_some_and(|c| c > 1) {
                let stderr = String::from_utf8_lossy(&output.stderr);
                anyhow::bail!("git diff failed: {}", stderr.trim());
            }
            String::from_utf8_lossy(&output.stdout).to_string()
        }
        _ if entry.staged => {
            let mut args = vec!["diff", "--no-color", "--no-ext-diff", "--cached", "-M", "--"];
            args.extend(pathspec(entry));
            run_git(repo_root, &args)?
        }
        _ => run_git(
            repo_root,
            &["diff", "--no-color", "--no-ext-diff", "--", &entry.path],
        )?,
    };
    Ok(parse_diff(&raw))
}

// ── Discard ──

/// Throw away the changes to one path
pub fn discard(repo_root: &str, entry: &StatusEntry) -> Result<()> {
    match entry.kind {
        // restore doesn't know about untracked files; deleting them is what it would do
        ChangeKind::Untracked => {
            let path = Path::new(repo_root).join(&entry.path);
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        ChangeKind::Added => {
            run_git(repo_root, &["rm", "--cached", "--quiet", "--", &entry.path])?;
            let path = Path::new(repo_root).join(&entry.path);
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        // A rename restores its source path too
        _ => {
            let mut args = vec!["restore", "--staged", "--worktree", "--source=HEAD", "--"];
            args.extend(pathspec(entry));
            run_git(repo_root, &args)?;
        }
    }
    info!(path = %entry.path, "discarded changes");
    Ok(())
}

pub fn discard_all(repo_root: &str) -> Result<()> {
    run_git(repo_root, &["reset", "--hard"])?;
    run_git(repo_root, &["clean", "-fd"])?;
    info!(repo = repo_root, "discarded all changes");
    Ok(())
}

// ── Stash ──

pub fn list_stash(repo_root: &str) -> Result<Vec<StashEntry>> {
    let out = run_git(repo_root, &["stash", "list"])?;
    Ok(parse_stash_list(&out))
}

/// Stash everything, untracked files included
pub fn stash(repo_root: &str) -> Result<()> {
    run_git(repo_root, &["stash", "push", "-u"])?;
    Ok(())
}

/// Apply a stash and remove it from the list
pub fn apply_stash(repo_root: &str, index: &str) -> Result<()> {
    run_git(repo_root, &["stash", "pop", index])?;
    Ok(())
}

pub fn drop_stash(repo_root: &str, index: &str) -> Result<()> {
    run_git(repo_root, &["stash", "drop", index])?;
    Ok(())
}

// ── Commit ──

/// Stage the selected entries and commit them. A rename's source path is
/// already staged as deleted; it only joins the commit pathspec so that
/// deletion lands in the same commit.
pub fn commit(repo_root: &str, entries: &[StatusEntry], message: &str) -> Result<()> {
    let selected: Vec<&StatusEntry> = entries.iter().filter(|e| e.selected).collect();
    if selected.is_empty() {
        anyhow::bail!("Nothing selected to commit");
    }

    let mut add_args = vec!["add", "-A", "--"];
    add_args.extend(selected.iter().map(|e| e.path.as_str()));
    run_git(repo_root, &add_args)?;

    let mut commit_args = vec!["commit", "-m", message, "--"];
    commit_args.extend(selected.iter().flat_map(|e| pathspec(e)));
    run_git(repo_root, &commit_args)?;

    info!(files = selected.len(), "committed");
    Ok(())
}

/// Paths git must be given to act on the whole of `entry`
fn pathspec(entry: &StatusEntry) -> Vec<&str> {
    match (entry.kind, entry.orig_path.as_deref()) {
        (ChangeKind::Renamed, Some(orig)) => vec![orig, entry.path.as_str()],
        _ => vec![entry.path.as_str()],
    }
}

/// Undo the last commit, keeping its changes in the index
pub fn undo_last_commit(repo_root: &str) -> Result<()> {
    run_git(repo_root, &["reset", "--soft", "HEAD~1"])?;
    info!(repo = repo_root, "undid last commit");
    Ok(())
}
