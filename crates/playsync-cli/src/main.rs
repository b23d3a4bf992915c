//! Playsync - copy and synchronize playlist tracks to portable media.
//!
//! This is the command line entry point. All engine behavior lives in
//! `playsync-core`; this binary parses arguments, wires up the real
//! collaborators, and maps failures onto the process exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use playsync_core::{
    ConsoleReporter, FolderTemplate, GroupBy, Id3TagReader, RealFileSystem, Result, StatsReport,
    SyncMode, SyncOptions, SyncOrchestrator, collect_stats,
};

#[derive(Parser)]
#[command(
    name = "playsync",
    version,
    about = "Copy and synchronize playlist tracks (M3U/M3U8) to a destination device"
)]
struct Cli {
    /// Show diagnostic output for all actions
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress normal report output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize playlists to the destination, deleting files that are
    /// not on any playlist
    Sync(SyncArgs),
    /// Copy new playlist tracks to the destination, keeping everything else
    Append(SyncArgs),
    /// Randomly redistribute the destination's files across its folders
    Reshuffle(ReshuffleArgs),
    /// Show track statistics for a destination
    Stats(StatsArgs),
}

#[derive(Args)]
struct SyncArgs {
    /// Path to the destination (e.g. usb storage)
    destination: PathBuf,

    /// Paths to playlist files (M3U/M3U8), multiple playlists possible
    #[arg(required = true)]
    playlists: Vec<PathBuf>,

    /// Plan and report everything without touching the destination
    #[arg(long)]
    dry_run: bool,

    /// Rewrite destination filenames from tags as "artist - album - title"
    #[arg(long)]
    tag_names: bool,

    /// Keep playlist order instead of randomizing track placement
    #[arg(long)]
    no_shuffle: bool,

    /// Randomly redistribute all destination files after copying
    #[arg(long)]
    reshuffle: bool,

    /// Maximum track count per folder (0 = single folder, no subfolders)
    #[arg(long, default_value_t = 0)]
    tracks_per_folder: usize,

    /// Folder name template, containing one %d placeholder
    #[arg(long, default_value = "Folder %d")]
    folder_name: String,
}

#[derive(Args)]
struct ReshuffleArgs {
    /// Path to the destination (e.g. usb storage)
    destination: PathBuf,

    /// Plan and report everything without touching the destination
    #[arg(long)]
    dry_run: bool,

    /// Folder name template, containing one %d placeholder
    #[arg(long, default_value = "Folder %d")]
    folder_name: String,
}

#[derive(Args)]
struct StatsArgs {
    /// Path to the destination (e.g. usb storage)
    destination: PathBuf,

    /// Grouping for the statistics
    #[arg(long, value_enum, default_value_t = GroupByArg::Artist)]
    group_by: GroupByArg,

    /// Folder name template, containing one %d placeholder
    #[arg(long, default_value = "Folder %d")]
    folder_name: String,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupByArg {
    /// Group by artist tag
    Artist,
    /// Group by artist and title
    Track,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Artist => Self::Artist,
            GroupByArg::Track => Self::Track,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        #[allow(clippy::expect_used)]
        Cli::command()
            .print_help()
            .expect("failed to print usage");
        return ExitCode::SUCCESS;
    };

    match run(command, cli.quiet) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "playsync=debug" } else { "playsync=warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn run(command: Commands, quiet: bool) -> Result<()> {
    let fs = RealFileSystem::new();
    let tags = Id3TagReader::new();
    let mut reporter = ConsoleReporter::new(quiet);
    let mut rng = rand::thread_rng();

    match command {
        Commands::Sync(args) => {
            let options = sync_options(&args, SyncMode::Sync)?;
            let mut orchestrator = SyncOrchestrator::new(&fs, &tags, &mut reporter);
            let report =
                orchestrator.run(&args.destination, &args.playlists, &options, &mut rng)?;
            if !quiet {
                println!(
                    "{} copied, {} deleted, {} already present{}",
                    report.copied,
                    report.deleted,
                    report.skipped_existing,
                    dry_run_suffix(report.dry_run)
                );
            }
        }
        Commands::Append(args) => {
            let options = sync_options(&args, SyncMode::Append)?;
            let mut orchestrator = SyncOrchestrator::new(&fs, &tags, &mut reporter);
            let report =
                orchestrator.run(&args.destination, &args.playlists, &options, &mut rng)?;
            if !quiet {
                println!(
                    "{} copied, {} already present{}",
                    report.copied,
                    report.skipped_existing,
                    dry_run_suffix(report.dry_run)
                );
            }
        }
        Commands::Reshuffle(args) => {
            let template = FolderTemplate::new(&args.folder_name)?;
            let mut orchestrator = SyncOrchestrator::new(&fs, &tags, &mut reporter);
            let report =
                orchestrator.reshuffle(&args.destination, &template, args.dry_run, &mut rng)?;
            if !quiet {
                println!(
                    "{} files redistributed{}",
                    report.moved,
                    dry_run_suffix(report.dry_run)
                );
            }
        }
        Commands::Stats(args) => {
            let template = FolderTemplate::new(&args.folder_name)?;
            let report = collect_stats(
                &fs,
                &tags,
                &args.destination,
                &template,
                args.group_by.into(),
            )?;
            print_stats(&report, args.json)?;
        }
    }

    info!("Finished");
    Ok(())
}

fn sync_options(args: &SyncArgs, mode: SyncMode) -> Result<SyncOptions> {
    Ok(SyncOptions {
        mode,
        dry_run: args.dry_run,
        rewrite_names: args.tag_names,
        shuffle: !args.no_shuffle,
        reshuffle: args.reshuffle,
        tracks_per_folder: args.tracks_per_folder,
        folder_template: FolderTemplate::new(&args.folder_name)?,
    })
}

fn print_stats(report: &StatsReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for row in &report.rows {
            println!("{:>6}  {}", row.count, row.name);
        }
        println!("{:>6}  total", report.total_files);
    }
    Ok(())
}

const fn dry_run_suffix(dry_run: bool) -> &'static str {
    if dry_run { " (dry run)" } else { "" }
}
