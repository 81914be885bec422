//! The minimal `/dev` a chrooted process expects.
//!
//! The device table is fixed and must stay bit-exact: programs inside the
//! container open `/dev/urandom`, `/dev/tty`, and friends by well-known
//! major/minor numbers and permission bits.

use std::path::Path;

use overbox_common::error::{OverboxError, Result};

/// One character device node to materialize under the device directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    /// Node name relative to the device directory.
    pub name: &'static str,
    /// Driver major number.
    pub major: u64,
    /// Driver minor number.
    pub minor: u64,
    /// Permission bits, applied exactly (the umask is zeroed during
    /// creation).
    pub mode: libc::mode_t,
}

/// The devices every POSIX process expects to find.
pub const DEVICE_TABLE: &[DeviceSpec] = &[
    DeviceSpec {
        name: "full",
        major: 1,
        minor: 7,
        mode: 0o666,
    },
    DeviceSpec {
        name: "ptmx",
        major: 5,
        minor: 2,
        mode: 0o666,
    },
    DeviceSpec {
        name: "random",
        major: 1,
        minor: 8,
        mode: 0o644,
    },
    DeviceSpec {
        name: "urandom",
        major: 1,
        minor: 9,
        mode: 0o644,
    },
    DeviceSpec {
        name: "zero",
        major: 1,
        minor: 5,
        mode: 0o666,
    },
    DeviceSpec {
        name: "tty",
        major: 5,
        minor: 0,
        mode: 0o666,
    },
];

/// Scoped umask override.
///
/// Zeroing the umask lets `mknod(2)` apply the table's permission bits
/// exactly; the previous value is restored when the guard drops, on
/// success and error paths alike.
#[derive(Debug)]
pub struct UmaskGuard {
    previous: nix::sys::stat::Mode,
}

impl UmaskGuard {
    /// Sets the process umask and remembers the old one.
    #[must_use]
    pub fn set(mode: nix::sys::stat::Mode) -> Self {
        Self {
            previous: nix::sys::stat::umask(mode),
        }
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        let _ = nix::sys::stat::umask(self.previous);
    }
}

/// Materializes the fixed device table inside `dev_dir`.
///
/// The process umask is zeroed for the duration of the call and restored
/// before returning, so the mode column of the table lands on disk
/// unmodified.
///
/// # Errors
///
/// Returns an error on the first `mknod(2)` failure. Nodes created before
/// the failure are left for the caller's teardown to reclaim with the
/// device tmpfs they live on.
#[cfg(target_os = "linux")]
pub fn populate_device_dir(dev_dir: &Path) -> Result<()> {
    use nix::sys::stat::{Mode, SFlag, makedev, mknod};

    let _umask = UmaskGuard::set(Mode::empty());

    for spec in DEVICE_TABLE {
        let path = dev_dir.join(spec.name);
        mknod(
            &path,
            SFlag::S_IFCHR,
            Mode::from_bits_truncate(spec.mode),
            makedev(spec.major, spec.minor),
        )
        .map_err(|e| OverboxError::DeviceNode {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            path = %path.display(),
            major = spec.major,
            minor = spec.minor,
            "device node created"
        );
    }

    tracing::info!(dev = %dev_dir.display(), count = DEVICE_TABLE.len(), "device nodes created");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — device node creation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn populate_device_dir(_dev_dir: &Path) -> Result<()> {
    Err(OverboxError::Config {
        message: "Linux required for container operations".into(),
    })
}
