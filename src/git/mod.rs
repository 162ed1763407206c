mod command;
mod diff;
mod status;

pub use command::{
    apply_stash, commit, create_branch, current_branch, diff_entry, discard, discard_all,
    drop_stash, init_repo, list_branches, list_stash, repo_root_in, stash, status,
    switch_branch, undo_last_commit,
};
pub use diff::{parse_diff, Diff, Hunk, LineKind};
pub use status::{stash_for_branch, ChangeKind, StashEntry, StatusEntry};
