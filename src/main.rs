//! namescout - check which names from one directory exist under a set of roots
//!
//! Entry point for the CLI application.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use console::style;
use crossbeam_channel::Receiver;
use namescout::config::{CliArgs, RunConfig};
use namescout::{
    report, Inventory, KindResults, KindStats, ProgressCounters, ProgressReporter, Resolution, ResultSet,
    SearchEvent, TargetKind,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How many found items per kind the terminal summary lists.
const FOUND_PREVIEW: usize = 10;

/// How many roots the pre-search status lists.
const ROOTS_PREVIEW: usize = 5;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    let inventory = Inventory::collect(&config.target)
        .with_context(|| format!("Cannot read target directory {}", config.target.display()))?;
    print_inventory(&inventory);

    if inventory.is_empty() {
        println!("{}", style("Target directory has no folders or files, nothing to search.").yellow());
        return Ok(());
    }

    print_status(&config, &inventory);
    if config.confirm && !confirm("Start searching for these names?", false)? {
        println!("{}", style("Search cancelled.").yellow());
        return Ok(());
    }

    // Setup signal handler for graceful shutdown
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            eprintln!("\nInterrupt received, finishing running tasks...");
            cancel.store(true, Ordering::SeqCst);
        })
        .context("Failed to set signal handler")?;
    }

    let results = search(&config, &inventory, cancel)?;

    print_summary(&results, config.show_found);

    let save = config.save && (!config.confirm || confirm("Save results to a file?", true)?);
    if save {
        let path = report::write_report(&config.output_dir, &inventory, &config.roots, &results, &Local::now())
            .context("Failed to save report")?;
        let shown = path.canonicalize().unwrap_or(path);
        println!("\n{} {}", style("Report saved to:").green(), style(shown.display()).cyan());
    }

    Ok(())
}

fn search(config: &RunConfig, inventory: &Inventory, cancel: Arc<AtomicBool>) -> Result<ResultSet> {
    let counters = ProgressCounters::new();
    let (tx, rx) = crossbeam_channel::unbounded();
    let reporter = config.show_progress.then(|| ProgressReporter::start(counters.clone()));

    let results = thread::scope(|s| {
        let printer = s.spawn(|| print_events(rx, reporter.as_ref(), config));

        let results = namescout::search()
            .roots(config.roots.iter().cloned())
            .targets(inventory.folder_targets())
            .targets(inventory.file_targets())
            .threads(config.workers)
            .native_order(config.native_order)
            .concurrent_kinds(config.concurrent_kinds)
            .progress(counters.clone())
            .cancel_flag(cancel)
            .events(tx);
        let results = match config.max_depth {
            Some(d) => results.max_depth(d),
            None => results,
        };
        // The builder owns the only sender; the printer stops once it is dropped.
        let results = results.run();

        printer_finished(printer.join());
        results
    })
    .context("Search failed")?;

    if let Some(r) = reporter {
        r.finish();
    }
    if results.cancelled {
        info!("search was interrupted before completion");
    }
    Ok(results)
}

fn print_events(rx: Receiver<SearchEvent>, reporter: Option<&ProgressReporter>, config: &RunConfig) {
    let emit = |line: String| match reporter {
        Some(r) => r.println(line),
        None => println!("{line}"),
    };

    for event in rx.iter() {
        match event {
            SearchEvent::Probing { worker, target, root } if config.show_paths => {
                emit(format!(
                    "{} searching {} {} in {}",
                    style(format!("worker {worker}:")).magenta(),
                    kind_icon(target.kind),
                    style(&target.name).yellow(),
                    style(root.display()).blue(),
                ));
            }
            SearchEvent::Resolved { worker, outcome } if config.show_items => {
                let who = style(format!("worker {worker}:")).magenta();
                let what = format!("{} {}", kind_icon(outcome.target.kind), style(&outcome.target.name).yellow());
                let line = match &outcome.resolution {
                    Resolution::Found(path) => {
                        format!("{who} {} {what} at {}", style("found").green(), style(path.display()).cyan())
                    }
                    Resolution::NotFound => format!("{who} {} {what}", style("not found").red()),
                    Resolution::Failed(msg) => format!("{who} {} {what}: {msg}", style("error").red().bold()),
                };
                emit(line);
            }
            _ => {}
        }
    }
}

/// Log a panicked event printer; returns whether it finished cleanly.
fn printer_finished(joined: thread::Result<()>) -> bool {
    if joined.is_err() {
        warn!("event printer thread panicked, some progress lines were lost");
        return false;
    }
    true
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("namescout=debug,warn")
    } else {
        EnvFilter::new("namescout=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn confirm(question: &str, default: bool) -> Result<bool> {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    print!("{} ", style(format!("{question} {hint}:")).yellow());
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).context("Failed to read answer")?;
    Ok(parse_answer(&answer, default))
}

/// An empty answer takes `default`; anything else must be "y" or "yes".
fn parse_answer(answer: &str, default: bool) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return default;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

fn kind_icon(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Folder => "[dir]",
        TargetKind::File => "[file]",
    }
}

fn rule() {
    println!("{}", style("=".repeat(70)).cyan());
}

fn print_inventory(inventory: &Inventory) {
    println!();
    rule();
    println!("{} {}", style("Directory contents:").yellow(), style(inventory.root.display()).cyan());
    rule();

    for (kind, heading) in [(TargetKind::Folder, "Folders"), (TargetKind::File, "Files")] {
        let names = inventory.names(kind);
        println!("\n{}", style(format!("{heading} ({}):", names.len())).green());
        if names.is_empty() {
            println!("  (none)");
        }
        for (i, name) in names.iter().enumerate() {
            println!("  {:>3}. {}", i + 1, name);
        }
    }
    println!();
    rule();
}

fn print_status(config: &RunConfig, inventory: &Inventory) {
    println!("{} {}", style("Folders to search:").green(), inventory.folders.len());
    println!("{} {}", style("Files to search:  ").green(), inventory.files.len());
    println!("{} {}", style("Workers:          ").green(), config.workers);
    println!("{} {}", style("Search roots:     ").green(), config.roots.len());
    for (i, root) in config.roots.iter().take(ROOTS_PREVIEW).enumerate() {
        println!("  {}. {}", i + 1, style(root.display()).blue());
    }
    if config.roots.len() > ROOTS_PREVIEW {
        println!("  ... and {} more", config.roots.len() - ROOTS_PREVIEW);
    }
    println!("{}", style("Press Ctrl+C during the search to stop early.").dim());
}

fn print_summary(results: &ResultSet, show_found: bool) {
    println!();
    rule();
    println!("{}", style("Search finished - statistics").yellow());
    rule();
    if results.cancelled {
        println!("{}", style("Interrupted: results are partial.").yellow().bold());
    }
    println!("\n{} {:.2}s", style("Elapsed:").green(), results.stats.duration.as_secs_f64());

    print_stats("Folders", &results.folders.stats());
    print_stats("Files", &results.files.stats());
    print_stats("Overall", &results.overall());

    if results.stats.targets_per_sec > 0.0 {
        println!("\n{} {:.1} items/s", style("Throughput:").green(), results.stats.targets_per_sec);
    }

    let overall = results.overall();
    if overall.not_found == 0 && overall.failed == 0 && overall.pending == 0 {
        println!("\n{}", style("Every item exists under the search roots.").green().bold());
    }

    for (kind, kr) in [(TargetKind::Folder, &results.folders), (TargetKind::File, &results.files)] {
        print_missing(kind, kr);
    }
    if show_found {
        for (kind, kr) in [(TargetKind::Folder, &results.folders), (TargetKind::File, &results.files)] {
            print_found(kind, kr);
        }
    }
    println!();
    rule();
}

fn print_stats(label: &str, s: &KindStats) {
    println!("\n{}", style(format!("{label}:")).green());
    println!("  total:     {}", s.total);
    println!("  found:     {} ({})", s.found, style(format!("{:.1}%", s.found_pct())).green());
    println!("  not found: {} ({})", s.not_found, style(format!("{:.1}%", s.not_found_pct())).red());
    if s.failed > 0 {
        println!("  errors:    {} ({})", s.failed, style(format!("{:.1}%", s.failed_pct())).red().bold());
    }
    if s.pending > 0 {
        println!("  unsearched: {}", s.pending);
    }
}

fn print_missing(kind: TargetKind, kr: &KindResults) {
    if !kr.not_found.is_empty() {
        println!("\n{}", style(format!("{} not found ({}):", kind_icon(kind), kr.not_found.len())).red());
        for (i, name) in kr.not_found.iter().enumerate() {
            println!("  {:>3}. {}", i + 1, style(name).red());
        }
    }
    if !kr.failed.is_empty() {
        println!("\n{}", style(format!("{} search errors ({}):", kind_icon(kind), kr.failed.len())).red().bold());
        for (i, (name, msg)) in kr.failed.iter().enumerate() {
            println!("  {:>3}. {} ({msg})", i + 1, name);
        }
    }
}

fn print_found(kind: TargetKind, kr: &KindResults) {
    println!("\n{}", style(format!("{} found ({}):", kind_icon(kind), kr.found.len())).green());
    for (i, (name, path)) in kr.found.iter().take(FOUND_PREVIEW).enumerate() {
        println!("  {:>2}. {} -> {}", i + 1, style(name).cyan(), style(path.display()).yellow());
    }
    if kr.found.len() > FOUND_PREVIEW {
        println!("  ... and {} more", kr.found.len() - FOUND_PREVIEW);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printer_panic_is_reported() {
        assert!(printer_finished(Ok(())));
        let joined = thread::spawn(|| panic!("printer bug")).join();
        assert!(!printer_finished(joined));
    }

    #[test]
    fn empty_answer_takes_the_default() {
        assert!(parse_answer("\n", true));
        assert!(!parse_answer("  \n", false));
    }

    #[test]
    fn explicit_answers_override_the_default() {
        assert!(parse_answer("Y\n", false));
        assert!(parse_answer("yes", false));
        assert!(!parse_answer("n\n", true));
        assert!(!parse_answer("nope", true));
    }
}
