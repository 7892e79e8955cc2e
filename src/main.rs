use clap::Parser;
use crosswatch::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
