//! # obx — Overbox CLI
//!
//! One-shot container execution: overlay root composition, namespace
//! isolation, minimal `/dev` provisioning, and guaranteed teardown.

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match commands::execute(cli) {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("{}: {err:#}", overbox_common::constants::BIN_NAME);
            std::process::exit(1);
        }
    }
}
