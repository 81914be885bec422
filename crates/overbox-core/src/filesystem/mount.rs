//! Pseudo-filesystem mounts inside the combined root.
//!
//! `/proc` and the tmpfs instances for `/tmp` and `/dev` are mounted by
//! absolute path under the combined directory, before the launched child
//! chroots. The engine process itself never chroots, so teardown always
//! operates on host-resolvable paths.

use std::path::Path;

use overbox_common::error::{OverboxError, Result};

/// Mount options for the scratch tmpfs.
pub const SCRATCH_TMPFS_OPTIONS: &str = "mode=1777";

/// Mount options for the device tmpfs.
pub const DEV_TMPFS_OPTIONS: &str = "mode=755";

/// Mounts a proc filesystem with device, exec, and set-uid features
/// disabled.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_proc(target: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some("proc"),
        target,
        Some("proc"),
        MsFlags::MS_NODEV | MsFlags::MS_NOEXEC | MsFlags::MS_NOSUID,
        None::<&str>,
    )
    .map_err(|e| OverboxError::Mount {
        fstype: "proc",
        target: target.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!(target = %target.display(), "proc mounted");
    Ok(())
}

/// Mounts a world-writable, sticky tmpfs for temporary files.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_scratch_tmpfs(target: &Path) -> Result<()> {
    use nix::mount::MsFlags;

    mount_tmpfs(
        target,
        MsFlags::MS_NOSUID | MsFlags::MS_NODEV,
        SCRATCH_TMPFS_OPTIONS,
    )
}

/// Mounts the tmpfs that backs the device directory.
///
/// Device nodes are created inside afterwards, so `MS_NODEV` is not set
/// here; the nodes must stay openable.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_dev_tmpfs(target: &Path) -> Result<()> {
    use nix::mount::MsFlags;

    mount_tmpfs(target, MsFlags::MS_NOSUID, DEV_TMPFS_OPTIONS)
}

#[cfg(target_os = "linux")]
fn mount_tmpfs(target: &Path, flags: nix::mount::MsFlags, options: &str) -> Result<()> {
    nix::mount::mount(
        Some("tmpfs"),
        target,
        Some("tmpfs"),
        flags,
        Some(options),
    )
    .map_err(|e| OverboxError::Mount {
        fstype: "tmpfs",
        target: target.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!(target = %target.display(), options, "tmpfs mounted");
    Ok(())
}

/// Lazily detaches a mount point.
///
/// # Errors
///
/// Returns an error if the `umount2(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn unmount(target: &Path) -> Result<()> {
    nix::mount::umount2(target, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
        OverboxError::Unmount {
            target: target.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    tracing::info!(target = %target.display(), "unmounted");
    Ok(())
}

/// Stubs for non-Linux platforms.
///
/// # Errors
///
/// Always return an error — these mounts require Linux.
#[cfg(not(target_os = "linux"))]
mod stub {
    use super::{Path, Result};

    fn unsupported<T>() -> Result<T> {
        Err(super::OverboxError::Config {
            message: "Linux required for container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    pub fn mount_proc(_target: &Path) -> Result<()> {
        unsupported()
    }

    /// Stub for non-Linux platforms.
    pub fn mount_scratch_tmpfs(_target: &Path) -> Result<()> {
        unsupported()
    }

    /// Stub for non-Linux platforms.
    pub fn mount_dev_tmpfs(_target: &Path) -> Result<()> {
        unsupported()
    }

    /// Stub for non-Linux platforms.
    pub fn unmount(_target: &Path) -> Result<()> {
        unsupported()
    }
}

#[cfg(not(target_os = "linux"))]
pub use stub::{mount_dev_tmpfs, mount_proc, mount_scratch_tmpfs, unmount};

/// Prepares the skeleton directories a minimal root needs.
///
/// `sys`, `proc`, and `dev` are recreated empty so leftovers carried over
/// from the base or data layer never mask the fresh mounts; `tmp` is kept
/// when already present. Creation failures here are benign and only
/// logged; the mounts that follow fail hard if the skeleton is actually
/// unusable.
pub fn ensure_root_skeleton(combined: &Path) {
    reset_dir(&combined.join("sys"), 0o555);
    reset_dir(&combined.join("proc"), 0o555);
    reset_dir(&combined.join("dev"), 0o755);

    let tmp = combined.join("tmp");
    if !tmp.is_dir() {
        make_dir(&tmp, 0o1777);
    }
}

fn reset_dir(path: &Path, mode: u32) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "stale directory kept");
        }
    }
    make_dir(path, mode);
}

fn make_dir(path: &Path, mode: u32) {
    use std::os::unix::fs::DirBuilderExt;

    let mut builder = std::fs::DirBuilder::new();
    if let Err(e) = builder.mode(mode).create(path) {
        tracing::warn!(path = %path.display(), error = %e, "skeleton mkdir skipped");
    }
}
