//! Unified error types for the Overbox workspace.
//!
//! Every fatal engine failure maps to one of these variants, carrying the
//! operation target and the underlying OS error text so a missing kernel
//! feature or permission problem is diagnosable from the message alone.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum OverboxError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A required filesystem entry was not found.
    #[error("{kind} not found: {path}")]
    NotFound {
        /// What the missing entry was supposed to be.
        kind: &'static str,
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// A `mount(2)` call failed.
    #[error("mounting {fstype} on {target} failed: {message}")]
    Mount {
        /// Filesystem type that was being mounted.
        fstype: &'static str,
        /// Mount target.
        target: PathBuf,
        /// OS error text.
        message: String,
    },

    /// An `umount2(2)` call failed.
    #[error("unmounting {target} failed: {message}")]
    Unmount {
        /// Mount point that could not be released.
        target: PathBuf,
        /// OS error text.
        message: String,
    },

    /// Namespace detachment failed.
    #[error("namespace isolation failed: {message}")]
    Namespace {
        /// OS error text.
        message: String,
    },

    /// A `mknod(2)` call failed.
    #[error("creating device node {path} failed: {message}")]
    DeviceNode {
        /// Device node path.
        path: PathBuf,
        /// OS error text.
        message: String,
    },

    /// Forking, executing, or waiting for the container process failed.
    #[error("launching {command} failed: {message}")]
    Launch {
        /// Executable that was being launched.
        command: String,
        /// OS error text.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, OverboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_operation_and_target() {
        let err = OverboxError::Mount {
            fstype: "overlay",
            target: PathBuf::from("/tmp/overlay"),
            message: "EINVAL: Invalid argument".into(),
        };
        let text = err.to_string();
        assert!(text.contains("overlay"));
        assert!(text.contains("/tmp/overlay"));
        assert!(text.contains("EINVAL"));
    }

    #[test]
    fn not_found_names_the_kind() {
        let err = OverboxError::NotFound {
            kind: "base layer",
            path: PathBuf::from("/nonexistent"),
        };
        assert_eq!(err.to_string(), "base layer not found: /nonexistent");
    }
}
