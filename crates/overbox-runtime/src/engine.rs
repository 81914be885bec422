//! Lifecycle orchestration for one container invocation.
//!
//! Sequences the whole engine: compose the overlay root, detach
//! namespaces, provision the minimal root, run the command, and unwind in
//! reverse on every exit path. Nothing created here outlives the
//! invocation except the writable data layer.

use std::time::Duration;

use overbox_common::error::Result;
use overbox_core::filesystem::{mount, overlay};
use overbox_core::{devices, namespace};

use crate::process;
use crate::teardown::{CleanupAction, Teardown};

/// Configuration for one engine invocation.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// The overlay layer directories.
    pub layers: overlay::LayerSet,
    /// Command and arguments to execute inside the root.
    pub command: Vec<String>,
    /// Delay between child exit and teardown, for inspecting the mounted
    /// tree from outside. Zero skips the delay entirely.
    pub grace: Duration,
}

/// The one-shot execution engine.
///
/// One engine instance runs exactly one container lifecycle; there is no
/// state shared between invocations beyond the data layer on disk.
pub struct Engine {
    config: ContainerConfig,
}

impl Engine {
    /// Creates an engine for the given configuration.
    #[must_use]
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// Runs the full lifecycle and returns the child's exit status.
    ///
    /// Teardown runs on every exit path, including fatal setup errors:
    /// whatever was mounted before the failure is unmounted again, newest
    /// first, and the scratch directories are removed when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if composition, isolation, provisioning, or the
    /// launch fails. The child's own non-zero exit is not an error; it is
    /// the returned status.
    pub fn run(&self) -> Result<i32> {
        let mut teardown = Teardown::new();
        let result = self.run_to_completion(&mut teardown);

        let failures = teardown.unwind();
        if failures > 0 {
            tracing::warn!(failures, "teardown finished with unreleased resources");
        }

        result
    }

    fn run_to_completion(&self, teardown: &mut Teardown) -> Result<i32> {
        let status = self.compose_and_launch(teardown)?;

        if !self.config.grace.is_zero() {
            tracing::info!(
                seconds = self.config.grace.as_secs(),
                "grace delay before teardown"
            );
            std::thread::sleep(self.config.grace);
        }

        Ok(status)
    }

    fn compose_and_launch(&self, teardown: &mut Teardown) -> Result<i32> {
        let layers = &self.config.layers;
        tracing::info!(
            base = %layers.base.display(),
            data = %layers.upper.display(),
            work = %layers.work.display(),
            combined = %layers.combined.display(),
            "composing container root"
        );

        // Fails before anything is created when the base layer is absent.
        layers.validate()?;

        layers.ensure_dirs()?;
        teardown.push(CleanupAction::RemoveDirAll(layers.work.clone()));
        teardown.push(CleanupAction::RemoveDir(layers.combined.clone()));

        overlay::mount_overlay(layers)?;
        teardown.push(CleanupAction::Unmount(layers.combined.clone()));

        // From here on, every mount is local to this process's namespace.
        let _namespaces = namespace::isolate()?;

        mount::ensure_root_skeleton(&layers.combined);

        let proc_dir = layers.combined.join("proc");
        mount::mount_proc(&proc_dir)?;
        teardown.push(CleanupAction::Unmount(proc_dir));

        let tmp_dir = layers.combined.join("tmp");
        mount::mount_scratch_tmpfs(&tmp_dir)?;
        teardown.push(CleanupAction::Unmount(tmp_dir));

        let dev_dir = layers.combined.join("dev");
        mount::mount_dev_tmpfs(&dev_dir)?;
        teardown.push(CleanupAction::Unmount(dev_dir.clone()));

        devices::populate_device_dir(&dev_dir)?;

        process::launch(&layers.combined, &self.config.command)
    }
}
