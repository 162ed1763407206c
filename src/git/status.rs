/// Kind of change reported by `git status --porcelain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    /// New file already in the index
    Added,
    /// New file git doesn't know about yet (`??`)
    Untracked,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "~",
            ChangeKind::Added => "+",
            ChangeKind::Untracked => "?",
            ChangeKind::Deleted => "-",
            ChangeKind::Renamed => "R",
        }
    }

    /// Map a porcelain `XY` code. Unknown codes are treated as modifications.
    fn from_code(code: &str) -> Self {
        if code == "??" {
            ChangeKind::Untracked
        } else if code.contains('D') {
            ChangeKind::Deleted
        } else if code.contains('R') {
            ChangeKind::Renamed
        } else if code.contains('A') || code.contains('C') {
            ChangeKind::Added
        } else {
            ChangeKind::Modified
        }
    }
}

/// One changed path in the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    /// Source path of a rename or copy (`R`/`C` codes)
    pub orig_path: Option<String>,
    pub kind: ChangeKind,
    /// Change lives only in the index (nothing left in the worktree column)
    pub staged: bool,
    /// Included in the next commit
    pub selected: bool,
}

/// A `git stash list` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    /// Ref usable with `git stash pop/drop`, e.g. `stash@{0}`
    pub index: String,
    pub branch: String,
    pub message: String,
}

/// Parse `git status --porcelain` output
pub fn parse_status(text: &str) -> Vec<StatusEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_status_line)
        .collect()
}

fn parse_status_line(line: &str) -> StatusEntry {
    // Porcelain v1 is "XY path"; fall back to splitting on the first space
    // when the columns don't line up
    let (code, path) = if line.len() > 3 && line.is_char_boundary(2) && line.as_bytes()[2] == b' ' {
        (&line[..2], &line[3..])
    } else {
        let trimmed = line.trim();
        trimmed.split_once(' ').unwrap_or((trimmed, ""))
    };

    // Renames and copies are printed as "old -> new"
    let (orig_path, path) = match path.trim().split_once(" -> ") {
        Some((orig, new)) => (Some(orig.trim_matches('"').to_string()), new),
        None => (None, path.trim()),
    };
    let path = path.trim_matches('"');

    let mut cols = code.chars();
    let index_col = cols.next().unwrap_or(' ');
    let worktree_col = cols.next().unwrap_or(' ');

    StatusEntry {
        path: path.to_string(),
        orig_path,
        kind: ChangeKind::from_code(code.trim()),
        staged: index_col != ' ' && index_col != '?' && worktree_col == ' ',
        selected: true,
    }
}

/// Parse `git branch --format=%(refname:short)` output
pub fn parse_branches(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_matches('\''))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `git stash list` output.
///
/// Lines look like `stash@{0}: WIP on main: 1a2b3c4 message` or
/// `stash@{1}: On feature: message`.
pub fn parse_stash_list(text: &str) -> Vec<StashEntry> {
    text.lines().filter_map(parse_stash_line).collect()
}

fn parse_stash_line(line: &str) -> Option<StashEntry> {
    let (index, rest) = line.trim().split_once(": ")?;
    if !index.starts_with("stash@{") {
        return None;
    }

    let rest = rest
        .strip_prefix("WIP on ")
        .or_else(|| rest.strip_prefix("On "))
        .unwrap_or(rest);
    let (branch, message) = rest.split_once(": ").unwrap_or((rest, ""));

    Some(StashEntry {
        index: index.to_string(),
        branch: branch.trim().to_string(),
        message: message.trim().to_string(),
    })
}

/// Most recent stash made on `branch`
pub fn stash_for_branch<'a>(branch: &str, stashes: &'a [StashEntry]) -> Option<&'a StashEntry> {
    stashes.iter().find(|s| s.branch == branch)
}
