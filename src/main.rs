use clap::Parser;
use extlint::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    if let Err(e) = extlint::run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
