//! Command-line arguments and the validated run configuration.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::builder::DEFAULT_THREADS;
use crate::error::ConfigError;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Check which names from one directory exist anywhere under a set of roots
#[derive(Parser, Debug, Clone)]
#[command(
    name = "namescout",
    version,
    about = "Check which names from one directory exist anywhere under a set of roots",
    long_about = "Lists the folders and files directly inside TARGET, then searches the \
                  search roots for an entry with each exact name. Roots are tried in order \
                  and the first match wins.",
    after_help = "EXAMPLES:\n    \
        namescout ./incoming\n    \
        namescout ./incoming --root /srv/backup --root /mnt/archive -w 8\n    \
        namescout ./incoming --root '/srv/backup;/mnt/archive' --yes --no-save\n    \
        namescout . --scope volume --show-found"
)]
pub struct CliArgs {
    /// Directory whose children are looked up (defaults to the current directory)
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Where to search
    #[arg(short = 's', long, value_enum, default_value_t = SearchScope::System)]
    pub scope: SearchScope,

    /// Search root, in priority order (repeatable, or ';'-separated). Implies --scope custom
    #[arg(short = 'r', long = "root", value_name = "PATH", value_delimiter = ';', action = clap::ArgAction::Append)]
    pub roots: Vec<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'w', long, default_value_t = DEFAULT_THREADS, value_name = "NUM")]
    pub workers: usize,

    /// Maximum directory depth below each root (unlimited if not set)
    #[arg(short = 'd', long, value_name = "NUM")]
    pub max_depth: Option<usize>,

    /// Keep the OS directory listing order instead of sorting entries by name
    #[arg(long)]
    pub native_order: bool,

    /// Search folders and files at the same time
    #[arg(long)]
    pub concurrent_kinds: bool,

    /// Do not print which root each worker is searching
    #[arg(long)]
    pub hide_paths: bool,

    /// Do not print a line per resolved item
    #[arg(long)]
    pub hide_items: bool,

    /// Also list found items (with their paths) in the terminal summary
    #[arg(long)]
    pub show_found: bool,

    /// Do not ask before searching or before saving the report
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Do not write a report file
    #[arg(long)]
    pub no_save: bool,

    /// Directory the report file is written to
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Quiet mode - no progress bars or per-item lines
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose logging (shows skipped directories and missing roots)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Where the search looks.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Every drive plus the usual system locations
    System,
    /// Only the volume holding the current directory
    Volume,
    /// Only the paths given with --root
    Custom,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target:           PathBuf,
    pub roots:            Vec<PathBuf>,
    pub workers:          usize,
    pub max_depth:        Option<usize>,
    pub native_order:     bool,
    pub concurrent_kinds: bool,
    pub show_paths:       bool,
    pub show_items:       bool,
    pub show_found:       bool,
    pub confirm:          bool,
    pub save:             bool,
    pub output_dir:       PathBuf,
    pub show_progress:    bool,
    pub verbose:          bool,
}

impl RunConfig {
    /// Validate arguments and resolve the search scope into roots.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::Workers { got: args.workers, max: MAX_WORKERS });
        }

        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        let target = args.target.unwrap_or_else(|| cwd.clone());

        let scope = if args.roots.is_empty() { args.scope } else { SearchScope::Custom };
        let roots = match scope {
            SearchScope::System => system_roots(),
            SearchScope::Volume => vec![volume_root(&cwd)],
            SearchScope::Custom => {
                let roots: Vec<PathBuf> = args
                    .roots
                    .into_iter()
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect();
                if roots.is_empty() {
                    return Err(ConfigError::EmptyCustomScope);
                }
                roots
            }
        };

        Ok(Self {
            target,
            roots,
            workers:          args.workers,
            max_depth:        args.max_depth,
            native_order:     args.native_order,
            concurrent_kinds: args.concurrent_kinds,
            show_paths:       !args.hide_paths && !args.quiet,
            show_items:       !args.hide_items && !args.quiet,
            show_found:       args.show_found,
            confirm:          !args.yes,
            save:             !args.no_save,
            output_dir:       args.output_dir,
            show_progress:    !args.quiet,
            verbose:          args.verbose,
        })
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Roots for [`SearchScope::System`], in priority order.
#[cfg(windows)]
pub fn system_roots() -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = ["C:\\", "D:\\", "E:\\", "F:\\", "G:\\"].into_iter().map(PathBuf::from).collect();
    roots.extend(home_dir());
    roots.extend(
        ["C:\\Program Files", "C:\\Program Files (x86)", "C:\\Windows", "C:\\Users"]
            .into_iter()
            .map(PathBuf::from),
    );
    roots
}

/// Roots for [`SearchScope::System`], in priority order.
#[cfg(not(windows))]
pub fn system_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from("/")];
    roots.extend(home_dir());
    roots
}

/// The drive (Windows) or filesystem root holding `cwd`.
pub fn volume_root(cwd: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        use std::path::Component;
        if let Some(Component::Prefix(prefix)) = cwd.components().next() {
            let mut root = PathBuf::from(prefix.as_os_str());
            root.push("\\");
            return root;
        }
    }
    cwd.ancestors().last().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"))
}
