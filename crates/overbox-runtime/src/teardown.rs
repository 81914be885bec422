//! LIFO unwind of everything the engine mounted or created.
//!
//! Every successful setup step pushes its reversal here immediately, so
//! the stack mirrors the exact acquisition order. Unwinding pops in
//! reverse and keeps going past individual failures: a stale mount left
//! behind is worse when compounded by skipping the remaining entries.

use std::path::PathBuf;

/// A single reversal, recorded right after its setup step succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    /// Lazily detach a mount point.
    Unmount(PathBuf),
    /// Remove an empty directory.
    RemoveDir(PathBuf),
    /// Remove a directory tree.
    RemoveDirAll(PathBuf),
}

impl CleanupAction {
    fn apply(&self) -> bool {
        match self {
            Self::Unmount(target) => {
                if let Err(e) = overbox_core::filesystem::mount::unmount(target) {
                    tracing::warn!(target = %target.display(), error = %e, "unmount failed");
                    return false;
                }
                true
            }
            Self::RemoveDir(path) => {
                if let Err(e) = std::fs::remove_dir(path) {
                    tracing::warn!(path = %path.display(), error = %e, "directory removal failed");
                    return false;
                }
                tracing::debug!(path = %path.display(), "directory removed");
                true
            }
            Self::RemoveDirAll(path) => {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    tracing::warn!(path = %path.display(), error = %e, "directory tree removal failed");
                    return false;
                }
                tracing::debug!(path = %path.display(), "directory tree removed");
                true
            }
        }
    }
}

/// The unwind stack.
///
/// Any entries still pending are applied on drop, so a panic or an early
/// error path tears down exactly like the happy path.
#[derive(Debug, Default)]
pub struct Teardown {
    actions: Vec<CleanupAction>,
}

impl Teardown {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reversal for a setup step that just succeeded.
    pub fn push(&mut self, action: CleanupAction) {
        self.actions.push(action);
    }

    /// Number of reversals still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    /// Pops and applies every recorded action, newest first.
    ///
    /// Failures are logged and do not stop the unwind. Returns how many
    /// actions failed.
    pub fn unwind(&mut self) -> usize {
        let mut failures = 0;
        while let Some(action) = self.actions.pop() {
            if !action.apply() {
                failures += 1;
            }
        }
        failures
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if !self.actions.is_empty() {
            tracing::warn!(pending = self.actions.len(), "unwinding on drop");
            let _ = self.unwind();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwind_removes_in_reverse_creation_order() {
        let tmp = tempfile::tempdir().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        std::fs::create_dir_all(&child).unwrap();

        let mut teardown = Teardown::new();
        // Creation order: parent first, child second. Only a LIFO unwind
        // can remove both with non-recursive removals.
        teardown.push(CleanupAction::RemoveDir(parent.clone()));
        teardown.push(CleanupAction::RemoveDir(child.clone()));

        assert_eq!(teardown.unwind(), 0);
        assert!(!child.exists());
        assert!(!parent.exists());
        assert_eq!(teardown.pending(), 0);
    }

    #[test]
    fn unwind_continues_past_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("real");
        std::fs::create_dir(&real).unwrap();

        let mut teardown = Teardown::new();
        teardown.push(CleanupAction::RemoveDir(real.clone()));
        teardown.push(CleanupAction::RemoveDir(tmp.path().join("missing")));

        assert_eq!(teardown.unwind(), 1);
        assert!(!real.exists(), "failure must not stop the unwind");
    }

    #[test]
    fn drop_unwinds_pending_actions() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("left-behind");
        std::fs::create_dir(&dir).unwrap();

        {
            let mut teardown = Teardown::new();
            teardown.push(CleanupAction::RemoveDir(dir.clone()));
        }

        assert!(!dir.exists());
    }

    #[test]
    fn unwind_is_idempotent() {
        let mut teardown = Teardown::new();
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("once");
        std::fs::create_dir(&dir).unwrap();
        teardown.push(CleanupAction::RemoveDir(dir));

        assert_eq!(teardown.unwind(), 0);
        assert_eq!(teardown.unwind(), 0);
    }

    #[test]
    fn remove_dir_all_clears_populated_trees() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir_all(work.join("work")).unwrap();
        std::fs::write(work.join("work").join("index"), b"scratch").unwrap();

        let mut teardown = Teardown::new();
        teardown.push(CleanupAction::RemoveDirAll(work.clone()));

        assert_eq!(teardown.unwind(), 0);
        assert!(!work.exists());
    }
}
