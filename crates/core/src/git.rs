//! Git HEAD resolution. Absence of a repository (or of any commits) is never
//! an error here — callers treat a missing commit hash as "not tracked by git".

use git2::Repository;
use std::path::Path;

/// Current HEAD commit hash, or `None` if `root` is not a git repository, has
/// no commits yet, or libgit2 otherwise fails to resolve it. Never fatal.
pub fn resolve_head(root: &Path) -> Option<String> {
    let repo = Repository::open(root).ok()?;
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}
