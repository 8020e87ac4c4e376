use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use media_renamer_core::{
    app_paths, init_config, load_config, run_rename, undo_last, FileOutcome, InputMode,
    RunOptions, RunSummary, VideoProberKind,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "media_renamer_core=info,media_renamer_cli=info";

#[derive(Debug, Parser)]
#[command(name = "media-renamer")]
#[command(about = "Renames photos and videos after capture time and the event folder they live in")]
struct Cli {
    /// Log strategy misses and probe failures.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Undo,
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// A directory tree, or a text file listing one directory per line.
    input: PathBuf,
    #[arg(long, overrides_with = "apply")]
    dry_run: bool,
    /// Rename for real even when the config asks for dry runs.
    #[arg(long, overrides_with = "dry_run")]
    apply: bool,
    #[arg(long, overrides_with = "include_hidden")]
    skip_hidden: bool,
    #[arg(long, overrides_with = "skip_hidden")]
    include_hidden: bool,
    #[arg(long, value_enum)]
    video_prober: Option<ProberArg>,
    #[arg(long)]
    ordinal_width: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProberArg {
    Ffprobe,
    Exiftool,
    None,
}

impl From<ProberArg> for VideoProberKind {
    fn from(value: ProberArg) -> Self {
        match value {
            ProberArg::Ffprobe => VideoProberKind::Ffprobe,
            ProberArg::Exiftool => VideoProberKind::Exiftool,
            ProberArg::None => VideoProberKind::None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Undo => cmd_undo(),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "media_renamer_core=debug,media_renamer_cli=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let mut options = RunOptions::from_config(args.input.clone(), &config);
    merge_options(&mut options, &args);
    options.undo_log = Some(app_paths()?.undo_path);

    let summary = run_rename(&options)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => print_table(&summary),
    }

    if summary.dry_run {
        eprintln!("dry run: nothing was renamed. Run again without --dry-run to apply.");
    }

    Ok(())
}

fn merge_options(options: &mut RunOptions, args: &RenameArgs) {
    if args.dry_run {
        options.dry_run = true;
    } else if args.apply {
        options.dry_run = false;
    }
    if args.skip_hidden {
        options.skip_hidden = true;
    } else if args.include_hidden {
        options.skip_hidden = false;
    }
    if let Some(prober) = args.video_prober {
        options.video_prober = prober.into();
    }
    if let Some(width) = args.ordinal_width {
        options.ordinal_width = width;
    }
}

fn cmd_undo() -> Result<()> {
    let result = undo_last()?;
    println!(
        "restored {} file(s) ({} missing, {} left because the old name is taken)",
        result.restored, result.missing, result.conflicts
    );
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if init_config()? {
        println!("wrote defaults to {}", paths.config_path.display());
    } else {
        println!("config already exists: {}", paths.config_path.display());
    }
    Ok(())
}

fn print_table(summary: &RunSummary) {
    if summary.mode == InputMode::ListFile && summary.list_empty {
        println!("{}: no directories listed", summary.input.display());
        return;
    }

    for path in &summary.skipped_inputs {
        println!("skipped (not a directory): {}", path.display());
    }

    for root in &summary.roots {
        println!("== {}", root.root.display());
        for dir in &root.directories {
            for outcome in &dir.outcomes {
                print_outcome(outcome);
            }
            println!(
                "   {} [{}]: renamed={} planned={} unchanged={} skipped={} failed={}",
                dir.path.display(),
                dir.event_label,
                dir.renamed,
                dir.planned,
                dir.unchanged,
                dir.skipped,
                dir.failed
            );
        }
        for dir in &root.unlabeled {
            println!("   {}: no event label, left alone", dir.display());
        }
        println!("   total renamed in {}: {}", root.root.display(), root.renamed());
    }

    println!(
        "\ngrand total: renamed={} planned={} skipped={} failed={}",
        summary.total_renamed(),
        summary.total_planned(),
        summary.total_skipped(),
        summary.total_failed()
    );
}

fn print_outcome(outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Renamed { from, to, .. } => {
            println!("  {} -> {}", file_name(from), file_name(to))
        }
        FileOutcome::Planned { from, to, .. } => {
            println!("  {} => {} (dry run)", file_name(from), file_name(to))
        }
        FileOutcome::Unchanged { .. } => {}
        FileOutcome::MetadataUnavailable { path } => {
            println!("  {}: no capture time, skipped", file_name(path))
        }
        FileOutcome::RenameFailed { from, reason, .. } => {
            println!("  {}: rename failed: {}", file_name(from), reason)
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
