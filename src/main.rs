use clap::Parser;
use estatesim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
