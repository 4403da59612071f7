use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tailwind_class_sorter::config::{resolve, SorterConfig};
use tailwind_class_sorter::languages::HTML_CLASS;
use tailwind_class_sorter::{
    process_file, FileError, FileOutcome, LangConfig, LanguageTable, Rewriter, WriteMode,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "tailwind-class-sorter")]
#[command(about = "Sort Tailwind CSS classes in files", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort classes in files and directories
    Sort {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Config file (auto-discovered if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Do not remove duplicate classes
        #[arg(long)]
        keep_duplicates: bool,

        /// Place custom classes before Tailwind classes
        #[arg(long)]
        prepend_custom: bool,

        /// Custom Tailwind prefix (e.g. "tw-")
        #[arg(long)]
        prefix: Option<String>,

        /// External command that reorders classes read from stdin.
        /// Repeat to pass arguments: `--sorter-command node --sorter-command sort.js`
        #[arg(long, action = clap::ArgAction::Append, allow_hyphen_values = true)]
        sorter_command: Vec<String>,

        /// Report unsorted files without modifying them; exit 1 if any
        #[arg(long)]
        check: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List file extensions and the patterns used for them
    Languages {
        /// Config file (auto-discovered if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

struct SortArgs {
    paths: Vec<PathBuf>,
    config: Option<PathBuf>,
    keep_duplicates: bool,
    prepend_custom: bool,
    prefix: Option<String>,
    sorter_command: Vec<String>,
    check: bool,
    diff: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sort {
            paths,
            config,
            keep_duplicates,
            prepend_custom,
            prefix,
            sorter_command,
            check,
            diff,
        } => cmd_sort(SortArgs {
            paths,
            config,
            keep_duplicates,
            prepend_custom,
            prefix,
            sorter_command,
            check,
            diff,
        }),

        Commands::Languages { config } => cmd_languages(config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Helper: Load config from an explicit path or by discovery from the cwd.
fn load_config(explicit: Option<&Path>) -> Result<SorterConfig> {
    let cwd = env::current_dir().context("could not determine current directory")?;
    let (config, path) = resolve(explicit, &cwd)?;
    if let Some(path) = path {
        log::info!("using config {}", path.display());
    }
    Ok(config)
}

/// Helper: CLI flags take precedence over config values.
fn apply_overrides(config: &mut SorterConfig, args: &SortArgs) {
    if args.keep_duplicates {
        config.remove_duplicates = false;
    }
    if args.prepend_custom {
        config.prepend_custom_classes = true;
    }
    if let Some(prefix) = &args.prefix {
        config.custom_prefix = prefix.clone();
    }
    if !args.sorter_command.is_empty() {
        config.sorter_command = Some(args.sorter_command.clone());
    }
}

/// Helper: Expand paths into the files to process.
///
/// Explicit files are always processed; directories contribute only files
/// with a known extension.
fn collect_files(paths: &[PathBuf], table: &LanguageTable) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("{} does not exist", path.display());
        }

        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file() && table.is_known(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }

    // A file named explicitly may also turn up in a directory walk
    let mut seen = HashSet::new();
    files.retain(|file| seen.insert(fs::canonicalize(file).unwrap_or_else(|_| file.clone())));
    Ok(files)
}

/// Helper: Build one rewriter per distinct extension.
///
/// Files whose extension has no configuration use the HTML `class="..."`
/// pattern.
fn build_rewriters(
    files: &[PathBuf],
    config: &SorterConfig,
    table: &LanguageTable,
) -> Result<HashMap<String, Rewriter>> {
    let order = config.order_source();
    let options = config.sort_options();
    let html = LangConfig::pattern(HTML_CLASS);

    let mut rewriters = HashMap::new();
    for file in files {
        let key = extension_key(file);
        if rewriters.contains_key(&key) {
            continue;
        }

        let lang = table.lookup_extension(&key).unwrap_or(&html);
        let rewriter = Rewriter::new(Some(lang), order.clone(), options.clone())
            .with_context(|| format!("invalid language configuration for '.{key}' files"))?
            .with_ignore_markers(
                config.ignore_all_marker.clone(),
                config.ignore_marker.clone(),
            );
        rewriters.insert(key, rewriter);
    }

    Ok(rewriters)
}

fn extension_key(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Helper: Show unified diff between original and sorted content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (sorted)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}

fn cmd_sort(args: SortArgs) -> Result<()> {
    // 1. Load config and apply CLI overrides
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // 2. Determine files to process
    let table = config.language_table();
    let files = collect_files(&args.paths, &table)?;
    if files.is_empty() {
        println!("{}", "No matching files found".yellow());
        return Ok(());
    }

    // 3. Build rewriters
    let rewriters = build_rewriters(&files, &config, &table)?;
    let mode = if args.check {
        WriteMode::Check
    } else {
        WriteMode::Write
    };

    // 4. Process files in parallel, report in input order
    let results: Vec<(&PathBuf, Result<FileOutcome, FileError>)> = files
        .par_iter()
        .map(|file| {
            let rewriter = &rewriters[&extension_key(file)];
            (file, process_file(file, rewriter, mode))
        })
        .collect();

    let mut total_changed = 0;
    let mut total_unchanged = 0;
    let mut total_failed = 0;

    for (file, result) in results {
        match result {
            Ok(outcome @ FileOutcome::Rewritten { .. }) => {
                println!("{} Sorted {}", "✓".green(), file.display());
                show_diff(args.diff, &outcome);
                total_changed += 1;
            }
            Ok(outcome @ FileOutcome::WouldRewrite { .. }) => {
                println!(
                    "{} {}: classes are not sorted",
                    "✗".yellow(),
                    file.display()
                );
                show_diff(args.diff, &outcome);
                total_changed += 1;
            }
            Ok(FileOutcome::Unchanged { .. }) => {
                log::info!("{} already sorted", file.display());
                total_unchanged += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;
            }
        }
    }

    // 5. Summary
    println!();
    let changed_label = if args.check { "unsorted" } else { "sorted" };
    println!(
        "{} {}, {} unchanged, {} failed",
        total_changed.to_string().green(),
        changed_label,
        total_unchanged,
        total_failed.to_string().red()
    );

    if total_failed > 0 {
        anyhow::bail!("{total_failed} file(s) could not be processed");
    }
    if args.check && total_changed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn show_diff(enabled: bool, outcome: &FileOutcome) {
    if !enabled {
        return;
    }
    if let Some((original, updated)) = outcome.contents() {
        display_diff(outcome.file(), original, updated);
    }
}

fn cmd_languages(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let table = config.language_table();

    for extension in table.extensions() {
        let patterns = match table.lookup_extension(extension) {
            Some(LangConfig::Pattern(pattern)) => pattern.clone(),
            Some(other) => format!("{other:?}"),
            None => continue,
        };
        println!("{:<8} {}", format!(".{extension}").bold(), patterns);
    }

    if config.lang_config.is_some() {
        println!(
            "{}",
            "Note: lang_config applies to every extension without its own entry".dimmed()
        );
    }

    Ok(())
}
