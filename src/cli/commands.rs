use crate::cli::args::{Cli, Commands, GenerateArgs};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::models::{LocationIndex, Province};
use crate::processors::{BuildReport, IndexBuilder};
use crate::readers::open_corpus;
use crate::utils::constants::{DEFAULT_CORPUS_ROOT, DEFAULT_OUTPUT_PATH};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// `--strict` was given and at least one file was rejected
    RejectionsFound,
}

impl RunOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunOutcome::Completed => ExitCode::SUCCESS,
            RunOutcome::RejectionsFound => ExitCode::from(2),
        }
    }
}

pub async fn run(cli: Cli) -> Result<RunOutcome> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.resolved_command() {
        Commands::Generate(args) => run_build(args, cli.quiet, true).await,
        Commands::Validate(args) => run_build(args, cli.quiet, false).await,
        Commands::Info { index, sample } => {
            let path = index.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
            show_info(&path, sample)?;
            Ok(RunOutcome::Completed)
        }
    }
}

/// Layer CLI flags over the file/environment configuration
pub fn resolve_config(args: &GenerateArgs) -> Result<IndexConfig> {
    let config = IndexConfig::load(args.config.as_deref())?;
    apply_overrides(config, args)
}

/// Apply command-line flags on top of an already loaded configuration
pub fn apply_overrides(mut config: IndexConfig, args: &GenerateArgs) -> Result<IndexConfig> {
    if let Some(root) = &args.corpus_root {
        config = config.with_corpus_root(root);
    }
    if let Some(output) = &args.output {
        config = config.with_output_path(output);
    }
    if !args.province.is_empty() {
        let mut provinces = args
            .province
            .iter()
            .map(|code| code.parse::<Province>())
            .collect::<Result<Vec<_>>>()?;
        provinces.sort();
        provinces.dedup();
        config = config.with_provinces(provinces);
    }
    if let Some(format) = &args.format {
        config = config.with_format(format.parse()?);
    }
    if let Some(stations) = &args.stations_file {
        config = config.with_stations_file(stations);
    }
    if let Some(workers) = args.max_workers {
        config = config.with_max_workers(workers);
    }
    if args.mmap {
        config = config.with_mmap(true);
    }

    Ok(config)
}

async fn run_build(args: GenerateArgs, quiet: bool, write: bool) -> Result<RunOutcome> {
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            let corpus = args
                .corpus_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_ROOT));
            println!("{}", BuildReport::new(corpus.display().to_string()).summary_line());
            return Err(e);
        }
    };

    println!(
        "{} location index...",
        if write { "Generating" } else { "Validating" }
    );
    println!("Corpus root: {}", config.corpus_root.display());
    if write {
        println!("Output file: {} ({})", config.output_path.display(), config.format);
    }
    println!("Workers: {}", config.max_workers);

    let cancelled = Arc::new(AtomicBool::new(false));
    let signal_flag = cancelled.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; the index will not be written");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let joined =
        tokio::task::spawn_blocking(move || execute(config, quiet, write, cancelled)).await;
    signal_task.abort();
    let (report, result) = joined?;

    println!("{}", report.summary_line());
    result?;

    if args.strict && report.has_rejections() {
        warn!(
            "{} file(s) rejected; failing because --strict was given",
            report.rejections.len()
        );
        return Ok(RunOutcome::RejectionsFound);
    }
    Ok(RunOutcome::Completed)
}

/// Build the index and, when `write` is set, replace the output file.
///
/// A report is always returned; it is empty when the run failed before the
/// corpus could be scanned.
pub fn execute(
    config: IndexConfig,
    quiet: bool,
    write: bool,
    cancelled: Arc<AtomicBool>,
) -> (BuildReport, Result<()>) {
    let empty_report = BuildReport::new(config.corpus_root.display().to_string());

    let builder = match IndexBuilder::new(config) {
        Ok(builder) => builder.with_cancel_flag(cancelled),
        Err(e) => return (empty_report, Err(e)),
    };
    let source = match open_corpus(&builder.config().corpus_root, builder.config().use_mmap) {
        Ok(source) => source,
        Err(e) => return (empty_report, Err(e)),
    };

    let progress = ProgressReporter::new_spinner("Scanning corpus...", quiet);
    let build = match builder.build(source.as_ref(), Some(&progress)) {
        Ok(build) => build,
        Err(e) => return (empty_report, Err(e)),
    };
    drop(progress);

    println!("\n{}", build.report.summary());

    let result = if write {
        builder.write(&build).map(|()| {
            println!("Index written to {}", builder.config().output_path.display());
        })
    } else {
        println!("Validation complete - no index written");
        Ok(())
    };

    (build.report, result)
}

fn show_info(path: &Path, sample: usize) -> Result<()> {
    println!("Analyzing index file: {}", path.display());

    let index = LocationIndex::load(path)?;
    println!("Locations: {}", index.len());

    for (province, count) in index.counts_by_province() {
        println!("\n{} ({}): {} location(s)", province.name(), province, count);

        for record in index.by_province(province).take(sample) {
            let coordinates = record
                .coordinates
                .as_ref()
                .map(|c| format!(" @ {:.4}, {:.4}", c.latitude, c.longitude))
                .unwrap_or_default();
            println!(
                "  {} [{}]{}: {} to {}, {} observation(s), {} field(s)",
                record.display_name,
                record.location_id,
                coordinates,
                record.date_range.earliest(),
                record.date_range.latest(),
                record.observations,
                record.available_fields.len()
            );
        }
        if count > sample {
            println!("  ... and {} more", count - sample);
        }
    }

    Ok(())
}
