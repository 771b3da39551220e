//! Plain-text search report.
//!
//! Every name from the inventory appears in the report, and every outcome
//! in the [`ResultSet`] is enumerated in its bucket. Percentages come from
//! [`KindStats`], so empty kinds read as 0%.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::ScoutError;
use crate::inventory::Inventory;
use crate::results::{KindResults, KindStats, ResultSet};

const RULE: &str = "======================================================================";

/// File name for a report produced at `at`.
pub fn report_file_name(at: &DateTime<Local>) -> String {
    format!("search_results_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Render the full report as a string.
pub fn render_report(inventory: &Inventory, roots: &[PathBuf], results: &ResultSet, at: &DateTime<Local>) -> String {
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "File presence search report");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Target directory: {}", inventory.root.display());
    let _ = writeln!(out, "Generated:        {}", at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Elapsed:          {:.2}s", results.stats.duration.as_secs_f64());
    if results.cancelled {
        let _ = writeln!(out, "Status:           interrupted, results are partial");
    }
    let _ = writeln!(out, "Search roots ({}):", roots.len());
    for root in roots {
        let _ = writeln!(out, "  - {}", root.display());
    }
    out.push('\n');

    let _ = writeln!(out, "Directory contents:");
    let _ = writeln!(out, "  Folders: {}", inventory.folders.len());
    for name in &inventory.folders {
        let _ = writeln!(out, "    - {name}");
    }
    let _ = writeln!(out, "\n  Files: {}", inventory.files.len());
    for name in &inventory.files {
        let _ = writeln!(out, "    - {name}");
    }
    let _ = writeln!(out, "\n{RULE}");

    let _ = writeln!(out, "Statistics:\n");
    write_stats(&mut out, "Folders", &results.folders.stats());
    write_stats(&mut out, "Files", &results.files.stats());
    write_stats(&mut out, "Overall", &results.overall());

    write_names(&mut out, "Folders not found", &results.folders.not_found);
    write_names(&mut out, "Files not found", &results.files.not_found);
    write_failed(&mut out, "Folders with search errors", &results.folders);
    write_failed(&mut out, "Files with search errors", &results.files);
    write_found(&mut out, "Folders found", &results.folders);
    write_found(&mut out, "Files found", &results.files);

    out
}

/// Write the report into `dir` and return the file's path.
pub fn write_report(
    dir: &Path,
    inventory: &Inventory,
    roots: &[PathBuf],
    results: &ResultSet,
    at: &DateTime<Local>,
) -> Result<PathBuf, ScoutError> {
    let path = dir.join(report_file_name(at));
    let body = render_report(inventory, roots, results, at);
    fs::write(&path, body).map_err(|source| ScoutError::Report { path: path.clone(), source })?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

fn write_stats(out: &mut String, label: &str, s: &KindStats) {
    let _ = writeln!(out, "{label}:");
    let _ = writeln!(out, "  Total:     {}", s.total);
    let _ = writeln!(out, "  Found:     {} ({:.1}%)", s.found, s.found_pct());
    let _ = writeln!(out, "  Not found: {} ({:.1}%)", s.not_found, s.not_found_pct());
    if s.failed > 0 {
        let _ = writeln!(out, "  Errors:    {} ({:.1}%)", s.failed, s.failed_pct());
    }
    if s.pending > 0 {
        let _ = writeln!(out, "  Unsearched: {}", s.pending);
    }
    out.push('\n');
}

fn write_names(out: &mut String, heading: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for name in names {
        let _ = writeln!(out, "  - {name}");
    }
    out.push('\n');
}

fn write_failed(out: &mut String, heading: &str, kr: &KindResults) {
    if kr.failed.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for (name, msg) in &kr.failed {
        let _ = writeln!(out, "  - {name} (error: {msg})");
    }
    out.push('\n');
}

fn write_found(out: &mut String, heading: &str, kr: &KindResults) {
    if kr.found.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for (name, path) in &kr.found {
        let _ = writeln!(out, "  - {name} (at: {})", path.display());
    }
    out.push('\n');
}
