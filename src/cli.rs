use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extlint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate packaged platform extensions against platform conventions")]
#[command(
    long_about = "A CLI tool that lints packaged platform extensions: it checks that the extension's chart is structurally sound, and that platform-wide overrides such as global.nodeSelector and global.imageRegistry propagate into every rendered workload."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint one or more extension directories
    Lint {
        /// Paths to the extension directories to lint
        #[arg(value_name = "EXTENSION_PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Specify values in a YAML file (can be repeated)
        #[arg(short = 'f', long = "values", value_name = "FILE")]
        values: Vec<PathBuf>,

        /// Set values on the command line (key1=val1,key2=val2)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Set string values on the command line (never coerced)
        #[arg(long = "set-string", value_name = "KEY=VALUE")]
        set_string: Vec<String>,

        /// Set values from files on the command line (key=path)
        #[arg(long = "set-file", value_name = "KEY=PATH")]
        set_file: Vec<String>,

        /// Set JSON values on the command line (key=json-fragment)
        #[arg(long = "set-json", value_name = "KEY=JSON")]
        set_json: Vec<String>,

        /// Also lint charts found under the extension's charts/ directory
        #[arg(long)]
        with_subcharts: bool,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
