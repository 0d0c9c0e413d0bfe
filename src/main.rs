use std::process::ExitCode;

use clap::Parser;
use rustdoc_index::cli::{self, Cli};

fn main() -> anyhow::Result<ExitCode> {
    rustdoc_index::tracing::init();
    cli::run(Cli::parse())
}
