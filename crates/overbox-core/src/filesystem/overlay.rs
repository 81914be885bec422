//! Overlay composition of the container root.
//!
//! Stacks a read-only base layer under a single writable data layer,
//! with writes materializing only in the upper directory.

use std::path::{Path, PathBuf};

use overbox_common::error::{OverboxError, Result};

/// The directories participating in one overlay composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSet {
    /// Read-only lower layer. Must already exist; its contents are opaque
    /// to the engine.
    pub base: PathBuf,
    /// Writable upper layer. Survives across invocations against the same
    /// data directory.
    pub upper: PathBuf,
    /// Scratch directory required by overlayfs.
    pub work: PathBuf,
    /// Final combined mount target.
    pub combined: PathBuf,
}

impl LayerSet {
    /// Returns the `mount(2)` data string for this layer set.
    #[must_use]
    pub fn mount_options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.base.display(),
            self.upper.display(),
            self.work.display()
        )
    }

    /// Checks that the base layer exists before anything else is created.
    ///
    /// # Errors
    ///
    /// Returns [`OverboxError::NotFound`] if the base directory is missing.
    pub fn validate(&self) -> Result<()> {
        if self.base.is_dir() {
            Ok(())
        } else {
            Err(OverboxError::NotFound {
                kind: "base layer",
                path: self.base.clone(),
            })
        }
    }

    /// Creates the upper, work, and combined directories.
    ///
    /// Pre-existing directories are expected on repeated invocations
    /// against the same data layer and are skipped with a debug log.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_dirs(&self) -> Result<()> {
        ensure_dir(&self.upper)?;
        ensure_dir(&self.work)?;
        ensure_dir(&self.combined)?;
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        tracing::debug!(path = %path.display(), "directory already exists");
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| OverboxError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Mounts the overlay filesystem composing the given layer set.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_overlay(layers: &LayerSet) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    let opts = layers.mount_options();
    mount(
        Some("overlay"),
        &layers.combined,
        Some("overlay"),
        MsFlags::empty(),
        Some(opts.as_str()),
    )
    .map_err(|e| OverboxError::Mount {
        fstype: "overlay",
        target: layers.combined.clone(),
        message: e.to_string(),
    })?;

    tracing::info!(combined = %layers.combined.display(), "overlay mounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — overlay mounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_overlay(_layers: &LayerSet) -> Result<()> {
    Err(OverboxError::Config {
        message: "Linux required for container operations".into(),
    })
}
