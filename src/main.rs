use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use codegraft::{GraftConfig, MergeConfig, MergeEngine, MergeLevel, MergeOutcome, telemetry};

/// Merge generated code fragments into existing Java sources
///
/// codegraft matches the fragment's declarations against the target file
/// node by node. Declarations that already exist are left alone (or
/// replaced with --override); new ones are inserted next to their kind:
/// imports after imports, fields after fields, methods after methods.
/// Nothing else in the file is touched.
///
/// FRAGMENTS:
///
///   A fragment is either a whole compilation unit (package, imports, a
///   class named like the target's class) or bare members:
///
///     private String name;
///
///     public String getName() {
///         return name;
///     }
///
/// CONFIG:
///
///   Settings are read from ./codegraft.toml when present:
///
///     [merge]
///     level = "method"     # file | method | line | subline
///     override = false
///
///   Command-line flags win over the file.
#[derive(Parser)]
#[command(name = "codegraft")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'codegraft <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a fragment into one or more target files
    ///
    /// Each target is merged independently. A target that fails (parse
    /// error, I/O error) is left untouched and reported; the others are
    /// still merged. Exits non-zero if any target failed.
    Merge(MergeArgs),

    /// Print the insertion plan for one target as JSON, without writing
    Plan(PlanArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Fragment file, or '-' to read it from stdin
    #[arg(short, long)]
    fragment: PathBuf,

    /// Config file [default: ./codegraft.toml if present]
    #[arg(long, env = "CODEGRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Merge level: file, method, line or subline
    #[arg(long)]
    level: Option<MergeLevel>,
}

#[derive(Args)]
struct MergeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Replace existing declarations the fragment redefines
    #[arg(long = "override")]
    override_existing: bool,

    /// Print the merged text instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Files to merge into
    #[arg(required = true)]
    targets: Vec<PathBuf>,
}

#[derive(Args)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Plan as if --override were given
    #[arg(long = "override")]
    override_existing: bool,

    /// File to plan the merge for
    target: PathBuf,
}

fn main() -> Result<ExitCode> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge(args) => merge(&args),
        Commands::Plan(args) => plan(&args),
    }
}

fn merge(args: &MergeArgs) -> Result<ExitCode> {
    let config = resolve_config(&args.common, args.override_existing)?;
    let fragment = read_fragment(&args.common.fragment)?;
    let engine = MergeEngine::new(config);

    let mut failed = 0_usize;
    for target in &args.targets {
        let result = if args.dry_run {
            engine.preview_file(target, &fragment)
        } else {
            engine.merge_file(target, &fragment)
        };

        match result {
            Ok(outcome) => {
                println!("{}", summary(target, &outcome, args.dry_run));
                if args.dry_run && outcome.changed {
                    print!("{}", outcome.text);
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} target(s) failed", args.targets.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn plan(args: &PlanArgs) -> Result<ExitCode> {
    let config = resolve_config(&args.common, args.override_existing)?;
    let fragment = read_fragment(&args.common.fragment)?;
    let located = MergeEngine::new(config).plan_file(&args.target, &fragment)?;

    let report = serde_json::json!({
        "target": args.target,
        "entries": located.plan,
        "insertions": located.plan.insertions(),
        "replacements": located.plan.replacements(),
        "unsupported": located.unsupported,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

/// Config file values, overridden by command-line flags.
fn resolve_config(args: &CommonArgs, override_existing: bool) -> Result<MergeConfig> {
    let file = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            GraftConfig::load(path)?
        }
        None => GraftConfig::load(Path::new(GraftConfig::FILE_NAME))?,
    };

    let mut config = file.merge;
    if let Some(level) = args.level {
        config.level = level;
    }
    if override_existing {
        config.override_existing = true;
    }
    Ok(config)
}

fn read_fragment(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read fragment from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fragment {}", path.display()))
}

fn summary(target: &Path, outcome: &MergeOutcome, dry_run: bool) -> String {
    let verb = match (outcome.changed, dry_run) {
        (false, _) => "unchanged",
        (true, false) => "updated",
        (true, true) => "would update",
    };
    let mut line = format!(
        "{}: {verb} ({} applied, {} skipped)",
        target.display(),
        outcome.applied,
        outcome.skipped.len()
    );
    if !outcome.unsupported.is_empty() {
        let kinds: Vec<String> = outcome
            .unsupported
            .iter()
            .map(ToString::to_string)
            .collect();
        line.push_str(&format!("; unsupported: {}", kinds.join(", ")));
    }
    line
}
