//! `obx run` — compose, isolate, execute, tear down.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use overbox_common::constants;
use overbox_core::filesystem::overlay::LayerSet;
use overbox_runtime::engine::{ContainerConfig, Engine};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read-only base layer holding the container's operating system tree.
    #[arg(long)]
    pub base: PathBuf,

    /// Writable data layer; changes made inside the container land here.
    #[arg(long, default_value = constants::DEFAULT_DATA_DIR)]
    pub data: PathBuf,

    /// Scratch directory required by the overlay filesystem.
    #[arg(long, default_value = constants::DEFAULT_WORK_DIR)]
    pub work: PathBuf,

    /// Mount target for the combined root.
    #[arg(long, default_value = constants::DEFAULT_COMBINED_DIR)]
    pub combined: PathBuf,

    /// Seconds to keep the mounted tree around after the command exits.
    #[arg(long, default_value_t = 0)]
    pub grace: u64,

    /// Command and arguments to execute; defaults to an interactive shell.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    fn into_config(self) -> ContainerConfig {
        let command = if self.command.is_empty() {
            vec![constants::DEFAULT_COMMAND.to_string()]
        } else {
            self.command
        };

        ContainerConfig {
            layers: LayerSet {
                base: self.base,
                upper: self.data,
                work: self.work,
                combined: self.combined,
            },
            command,
            grace: Duration::from_secs(self.grace),
        }
    }
}

/// Executes the `run` command and returns the container's exit status.
///
/// # Errors
///
/// Returns an error if the engine fails during setup, launch, or
/// teardown.
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let config = args.into_config();
    tracing::debug!(command = ?config.command, grace = config.grace.as_secs(), "resolved run configuration");

    let engine = Engine::new(config);
    Ok(engine.run()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: Vec<String>) -> RunArgs {
        RunArgs {
            base: PathBuf::from("/srv/img"),
            data: PathBuf::from("data"),
            work: PathBuf::from("work"),
            combined: PathBuf::from("overlay"),
            grace: 5,
            command,
        }
    }

    #[test]
    fn empty_command_falls_back_to_a_shell() {
        let config = args(Vec::new()).into_config();
        assert_eq!(config.command, vec!["/bin/sh"]);
    }

    #[test]
    fn explicit_command_is_passed_through() {
        let config = args(vec!["/bin/true".to_string()]).into_config();
        assert_eq!(config.command, vec!["/bin/true"]);
        assert_eq!(config.grace, Duration::from_secs(5));
        assert_eq!(config.layers.upper.to_str(), Some("data"));
    }
}
