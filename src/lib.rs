//! # extlint
//!
//! A Rust-based command-line application that validates packaged platform
//! extensions (templated Kubernetes charts) against platform conventions.
//!
//! ## Features
//!
//! - **Structural Linting**: Verifies that a chart loads, its values parse,
//!   and every template renders
//! - **Override Propagation**: Renders the chart with injected sentinel
//!   values and checks that `global.nodeSelector` and `global.imageRegistry`
//!   reach every workload's pod template and container images
//! - **Naming Conventions**: Validates extension names against DNS-1123
//!   subdomain syntax
//! - **Image Declarations**: Cross-checks declared images against the
//!   rendered manifests
//!
//! ## Example
//!
//! ```rust,no_run
//! use extlint::helm::chart::Chart;
//! use extlint::helm::values::ValueOptions;
//! use extlint::extension::metadata::Metadata;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = Path::new("./my-extension");
//! let metadata = Metadata::load(dir)?;
//! let chart = Chart::load_with_metadata(dir, metadata.to_chart_metadata())?;
//! let report = extlint::linter::run_conventions(&chart, &metadata, &ValueOptions::default());
//! print!("{}", extlint::linter::report::format_report(&report));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod extension;
pub mod handlers;
pub mod helm;
pub mod linter;

// Re-export commonly used types and functions
pub use error::{ExtlintError, Result};
use cli::{Cli, Commands};
use handlers::lint::LintOptions;
use helm::values::ValueOptions;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Lint {
            paths,
            values,
            set,
            set_string,
            set_file,
            set_json,
            with_subcharts,
        } => handlers::lint::handle_lint(LintOptions {
            paths,
            values: ValueOptions {
                value_files: values,
                values: set,
                string_values: set_string,
                file_values: set_file,
                json_values: set_json,
            },
            with_subcharts,
            quiet,
        }),
    }
}
