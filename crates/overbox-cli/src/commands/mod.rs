//! CLI command definitions and dispatch.

pub mod run;

use clap::{Parser, Subcommand};

/// Overbox — one-shot overlay container runner.
#[derive(Parser, Debug)]
#[command(name = "obx", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command inside an overlay-composed, namespace-isolated root.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// Returns the exit status the binary should terminate with. When the
/// lifecycle completed, that is the container's own status.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Run(args) => run::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_follow_the_current_directory_convention() {
        let cli = Cli::try_parse_from(["obx", "run", "--base", "/srv/img"]).unwrap();
        let Command::Run(args) = cli.command;

        assert_eq!(args.base.to_str(), Some("/srv/img"));
        assert_eq!(args.data.to_str(), Some("data"));
        assert_eq!(args.work.to_str(), Some("work"));
        assert_eq!(args.combined.to_str(), Some("overlay"));
        assert_eq!(args.grace, 0);
        assert!(args.command.is_empty());
    }

    #[test]
    fn run_accepts_a_trailing_command_with_flags() {
        let cli = Cli::try_parse_from([
            "obx", "run", "--base", "/srv/img", "/bin/ls", "-la", "/tmp",
        ])
        .unwrap();
        let Command::Run(args) = cli.command;

        assert_eq!(args.command, vec!["/bin/ls", "-la", "/tmp"]);
    }

    #[test]
    fn run_requires_the_base_layer() {
        assert!(Cli::try_parse_from(["obx", "run"]).is_err());
    }
}
