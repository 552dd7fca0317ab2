//! The lint command.
//!
//! Two phases: a structural phase over every chart path (plus discovered
//! subcharts), which alone decides the exit code, and an advisory
//! convention phase over the primary extension directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{ExtlintError, Result};
use crate::extension::Metadata;
use crate::helm::chart::{parse_chart_yaml_file, Chart, ChartMetadata};
use crate::helm::lint::{lint_chart, Severity};
use crate::helm::values::ValueOptions;
use crate::linter;

/// Options for one lint run; the configuration surface of the command.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Extension directories to lint; the first is the primary extension.
    pub paths: Vec<PathBuf>,
    /// The value overlay shared by both phases.
    pub values: ValueOptions,
    /// Also lint charts under each path's charts/ directory.
    pub with_subcharts: bool,
    /// Only print charts with warnings or errors.
    pub quiet: bool,
}

pub fn handle_lint(opts: LintOptions) -> Result<()> {
    // Guards keep expanded archives alive for the whole run and remove
    // them on every exit path.
    let (paths, _guards) = discover_charts(&opts)?;

    println!("\n#################### lint by helm ####################");
    let mut message = String::new();
    let mut failed = 0;
    let mut warnings_or_errors = 0;

    for path in &paths {
        let metadata = resolve_chart_metadata(path)?;
        let result = lint_chart(path, metadata, &opts.values);

        if result.has_warnings_or_errors() {
            warnings_or_errors += 1;
        }
        if opts.quiet && !result.has_warnings_or_errors() {
            continue;
        }

        message.push_str(&format!("==> Linting {}\n", path.display()));
        for msg in &result.messages {
            if !opts.quiet || msg.severity >= Severity::Warning {
                message.push_str(&format!("{}\n", msg));
            }
        }
        if result.has_errors() {
            failed += 1;
        }
        message.push('\n');
    }
    print!("{}", message);

    let summary = format!("{} chart(s) linted, {} chart(s) failed", paths.len(), failed);
    if failed > 0 {
        return Err(ExtlintError::LintFailed(summary));
    }
    if !opts.quiet || warnings_or_errors > 0 {
        println!("{}", summary);
    }

    println!("\n#################### lint by extension ####################");
    let Some(primary) = opts.paths.first() else {
        return Ok(());
    };
    let metadata = Metadata::load(primary)?;
    let chart = Chart::load_with_metadata(primary, metadata.to_chart_metadata())?;
    let report = linter::run_conventions(&chart, &metadata, &opts.values);
    print!("{}", linter::report::format_report(&report));

    Ok(())
}

/// Resolve chart metadata: Chart.yaml when present, otherwise synthesized
/// from extension.yaml.
fn resolve_chart_metadata(path: &Path) -> Result<ChartMetadata> {
    let chart_yaml = path.join("Chart.yaml");
    if chart_yaml.exists() {
        Ok(parse_chart_yaml_file(&chart_yaml)?)
    } else {
        Ok(Metadata::load(path)?.to_chart_metadata())
    }
}

/// Expand the lint set with subcharts when requested. Returns the chart
/// paths plus the temp-dir guards backing expanded archives.
fn discover_charts(opts: &LintOptions) -> Result<(Vec<PathBuf>, Vec<TempDir>)> {
    let mut paths = opts.paths.clone();
    let mut guards = Vec::new();

    if opts.with_subcharts {
        for path in &opts.paths {
            collect_subcharts(&path.join("charts"), &mut paths, &mut guards)?;
        }
    }

    Ok((paths, guards))
}

fn collect_subcharts(
    dir: &Path,
    found: &mut Vec<PathBuf>,
    guards: &mut Vec<TempDir>,
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some("Chart.yaml") {
            if let Some(parent) = path.parent() {
                log::debug!("found subchart {}", parent.display());
                found.push(parent.to_path_buf());
            }
        } else if has_archive_suffix(path) {
            let chart_dir = expand_archive(path, guards)?;
            found.push(chart_dir.clone());
            collect_subcharts(&chart_dir.join("charts"), found, guards)?;
        }
    }

    Ok(())
}

fn has_archive_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |name| {
            name.ends_with(".tgz") || name.ends_with(".tar.gz")
        })
}

/// Expand a packaged subchart into a temp dir and return the contained
/// chart directory. The guard is only retained on success; every error
/// path drops it, which removes the directory.
fn expand_archive(archive: &Path, guards: &mut Vec<TempDir>) -> Result<PathBuf> {
    let temp = TempDir::new()?;
    let file = File::open(archive)?;
    let mut tarball = tar::Archive::new(flate2::read::GzDecoder::new(file));
    tarball.unpack(temp.path())?;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(temp.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    let Some(first) = entries.first() else {
        return Err(ExtlintError::ArchiveLayout {
            file: "<empty archive>".to_string(),
            archive: archive.display().to_string(),
        });
    };
    if !first.is_dir() {
        return Err(ExtlintError::ArchiveLayout {
            file: first
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            archive: archive.display().to_string(),
        });
    }

    log::debug!(
        "expanded subchart archive {} into {}",
        archive.display(),
        first.display()
    );
    let chart_dir = first.clone();
    guards.push(temp);
    Ok(chart_dir)
}
