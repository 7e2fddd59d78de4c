// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, hand off to
//   `commands::run`.
// - Returns `anyhow::Result` so any fatal error exits non-zero with its
//   context chain.

use clap::Parser;
use clipanda::{cli::Cli, commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default; logs go to stderr so stdout stays
    // usable for `login` and `sites` output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipanda=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run(cli)
}
