use anyhow::{Context, Result};
use chart_values_patcher::config::{
    apply_to_file, load_from_path, ApplicationError, FileOutcome, RuleSet,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "chart-values-patcher")]
#[command(about = "Surgical in-place updates of Helm values files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log what the engine matches and rewrites (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply rule files to values files
    Apply {
        /// Rule file, or directory of .toml rule files
        #[arg(short, long)]
        rules: PathBuf,

        /// Values files to update
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Load and validate rule files without touching any values file
    Check {
        /// Rule file, or directory of .toml rule files
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            rules,
            files,
            dry_run,
            diff,
        } => cmd_apply(&rules, &files, dry_run, diff),

        Commands::Check { rules } => cmd_check(&rules),
    }
}

/// `RUST_LOG` wins; otherwise `-v` enables debug and `-vv` trace output.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "chart_values_patcher=debug",
        _ => "chart_values_patcher=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Helper: A rule path is either one file or a directory whose top-level
/// `.toml` files are loaded in name order.
fn discover_rule_files(rules: &Path) -> Result<Vec<PathBuf>> {
    if !rules.is_dir() {
        return Ok(vec![rules.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(rules).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .toml rule files found in {}", rules.display());
    }
    Ok(files)
}

fn load_rule_sets(rules: &Path) -> Result<Vec<(PathBuf, RuleSet)>> {
    discover_rule_files(rules)?
        .into_iter()
        .map(|path| {
            let set = load_from_path(&path)?;
            Ok::<_, anyhow::Error>((path, set))
        })
        .collect()
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (updated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(rules: &Path, files: &[PathBuf], dry_run: bool, show_diff: bool) -> Result<()> {
    let rule_sets = load_rule_sets(rules)
        .with_context(|| format!("loading rules from {}", rules.display()))?;

    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }

    // Every rule file runs against the same in-memory document, so each
    // values file is written at most once and only if every rule succeeds.
    let mut combined = RuleSet::default();
    for (rule_file, set) in rule_sets {
        let label = if set.meta.name.is_empty() {
            rule_file.display().to_string()
        } else {
            set.meta.name.clone()
        };
        println!("Loaded {} ({} rules)", label.bold(), set.rules.len());
        combined.append(set);
    }
    println!("Applying {} rules...", combined.rules.len());

    let mut total_changed = 0;
    let mut total_unchanged = 0;
    let mut total_failed = 0;

    for file in files {
        match apply_to_file(&combined, file, dry_run) {
            Ok(outcome @ FileOutcome::Changed { .. }) => {
                let verb = if dry_run { "Would update" } else { "Updated" };
                println!("{} {} {}", "✓".green(), verb, outcome.file().display());
                total_changed += 1;

                if show_diff {
                    if let FileOutcome::Changed { file, before, after } = &outcome {
                        display_diff(
                            file,
                            &String::from_utf8_lossy(before),
                            &String::from_utf8_lossy(after),
                        );
                    }
                }
            }
            Ok(outcome @ FileOutcome::Unchanged { .. }) => {
                println!("{} {}", "⊙".yellow(), outcome);
                total_unchanged += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;

                if let ApplicationError::Rule { source, .. } = &e {
                    if source.is_internal() {
                        eprintln!(
                            "  {}",
                            "INTERNAL: the engine refused to produce this edit".red()
                        );
                        eprintln!("  The file was left untouched; please report this input.");
                    }
                }
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    let changed_label = if dry_run { "would change" } else { "changed" };
    println!("  {} {}", format!("{}", total_changed).green(), changed_label);
    println!("  {} unchanged", format!("{}", total_unchanged).yellow());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(rules: &Path) -> Result<()> {
    let mut failed = 0;

    for path in discover_rule_files(rules)? {
        match load_from_path(&path) {
            Ok(set) => {
                println!(
                    "{} {}: {} rules",
                    "✓".green(),
                    path.display(),
                    set.rules.len()
                );
                for rule in &set.rules {
                    println!("    {}", rule.id.dimmed());
                }
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
