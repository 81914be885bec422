//! Namespace detachment for the engine process.
//!
//! The engine unshares its mount and PID namespaces (plus the
//! file-descriptor table and the System V semaphore undo list) before
//! touching anything inside the combined root, so the mounts and the
//! launched process tree stay invisible to the host and to other callers.

use overbox_common::error::{OverboxError, Result};

/// Witness that the calling process has entered its private namespaces.
///
/// Dropping the guard is deliberately a no-op: namespace membership ends
/// implicitly when the process exits, and there is no way back without a
/// file descriptor saved beforehand. The type exists so callers cannot
/// reach the provisioning steps without having isolated first.
#[derive(Debug)]
pub struct NamespaceGuard(());

/// Detaches the calling process from the host's mount table and PID space.
///
/// After a successful call, the next `fork(2)` child becomes PID 1 of the
/// new PID namespace, and mounts performed by this process are local to
/// its copy of the mount table.
///
/// # Errors
///
/// Returns an error if `unshare(2)` or the private remount of `/` fails.
/// Failure is fatal to the whole operation: proceeding to chroot into a
/// root that could not be isolated would expose the host's real `/proc`
/// and `/dev` to the child.
#[cfg(target_os = "linux")]
pub fn isolate() -> Result<NamespaceGuard> {
    use nix::mount::{MsFlags, mount};
    use nix::sched::{CloneFlags, unshare};

    unshare(
        CloneFlags::CLONE_NEWNS
            | CloneFlags::CLONE_NEWPID
            | CloneFlags::CLONE_FILES
            | CloneFlags::CLONE_SYSVSEM,
    )
    .map_err(|e| OverboxError::Namespace {
        message: format!("unshare failed: {e}"),
    })?;

    // The unshared mount table may still share propagation peers with the
    // host. Remount everything private so namespace-local mounts never
    // propagate back.
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(|e| OverboxError::Namespace {
        message: format!("remounting / private failed: {e}"),
    })?;

    tracing::info!("mount and PID namespaces detached");
    Ok(NamespaceGuard(()))
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — namespace isolation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn isolate() -> Result<NamespaceGuard> {
    Err(OverboxError::Config {
        message: "Linux required for container operations".into(),
    })
}
