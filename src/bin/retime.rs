use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use retime::{
    BatchOptions, DEFAULT_SUFFIX, FfmpegLogLevel, FileReport, ProgressCallback, ProgressInfo,
    RemuxOptions, RemuxOutcome, StartProbe,
};

const CLI_AFTER_HELP: &str = "Examples:\n  retime capture.ts\n  retime *.ts --keep-source --progress\n  retime clip.mkv --suffix _fixed --overwrite\n  retime --check capture.ts\n  retime completions zsh > _retime";

#[derive(Debug, Parser)]
#[command(
    name = "retime",
    version,
    about = "Remux media files so every stream starts at timestamp zero",
    after_help = CLI_AFTER_HELP,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    /// Media files to fix. Each is written next to itself as <stem><suffix>.<ext>.
    inputs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output for each file.
    #[arg(long)]
    verbose: bool,

    /// Show a progress spinner while remuxing. Not available with --jobs above 1.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// Keep source files after a successful fix.
    #[arg(long)]
    keep_source: bool,

    /// Suffix inserted before the extension of each output file.
    #[arg(long, default_value = DEFAULT_SUFFIX, value_parser = parse_suffix)]
    suffix: String,

    /// Only report whether each file needs fixing; write nothing.
    #[arg(long)]
    check: bool,

    /// Print one machine-readable JSON report for all files.
    #[arg(long)]
    json: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Number of files to process in parallel. Reports are printed once all
    /// files are done.
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_suffix(value: &str) -> Result<String, String> {
    retime::validate_suffix(value)
        .map(|()| value.to_string())
        .map_err(|error| error.to_string())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(label: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let position = info
            .current_timestamp
            .map(|timestamp| format!(" @ {:.1}s", timestamp.as_secs_f64()))
            .unwrap_or_default();
        self.bar
            .set_message(format!("{} packets{position}", info.packets_written));
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn batch_options(global: &GlobalOptions) -> BatchOptions {
    BatchOptions::new()
        .with_suffix(&global.suffix)
        .keep_source(global.keep_source)
        .overwrite(global.overwrite)
        .with_remux_options(RemuxOptions::new().with_batch_size(250))
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if global.progress && global.jobs.is_some_and(|jobs| jobs > 1) {
        return Err("--progress cannot be combined with --jobs above 1".into());
    }

    let level = match &global.log_level {
        Some(value) => value.parse::<FfmpegLogLevel>()?,
        None => FfmpegLogLevel::Error,
    };
    retime::set_ffmpeg_log_level(level);
    Ok(())
}

fn print_report(report: &FileReport, verbose: bool) {
    let destination = report
        .destination
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    match &report.result {
        Ok(RemuxOutcome::Completed(stats)) => {
            println!("{} `{}`", "fixed".green().bold(), destination);
            if verbose {
                println!(
                    "  {} packets written, {} dropped, {} streams",
                    stats.packets_written, stats.packets_dropped, stats.streams_created
                );
            }
            if report.source_removed {
                println!("  {} `{}`", "removed".dimmed(), report.source.display());
            }
        }
        Ok(RemuxOutcome::AlreadyNormalized { stream, .. }) => {
            println!(
                "{} `{}` (stream {stream} already starts at zero)",
                "skipped".cyan().bold(),
                report.source.display()
            );
        }
        Err(error) => {
            let code = error
                .code()
                .map(|code| format!(" (code {code})"))
                .unwrap_or_default();
            eprintln!(
                "{} `{}`: {error}{code}",
                "failed".red().bold(),
                report.source.display()
            );
        }
    }
}

fn report_json(report: &FileReport) -> serde_json::Value {
    let (status, detail) = match &report.result {
        Ok(RemuxOutcome::Completed(stats)) => (
            "completed",
            json!({
                "packets_read": stats.packets_read,
                "packets_written": stats.packets_written,
                "packets_dropped": stats.packets_dropped,
                "streams_created": stats.streams_created,
            }),
        ),
        Ok(RemuxOutcome::AlreadyNormalized { stream, .. }) => {
            ("already_normalized", json!({ "stream": stream }))
        }
        Err(error) => (
            "failed",
            json!({ "error": error.to_string(), "code": error.code() }),
        ),
    };

    json!({
        "source": report.source.display().to_string(),
        "destination": report.destination.as_ref().map(|path| path.display().to_string()),
        "status": status,
        "source_removed": report.source_removed,
        "detail": detail,
    })
}

fn process_sequential(inputs: &[PathBuf], global: &GlobalOptions) -> Vec<FileReport> {
    let options = batch_options(global);
    inputs
        .iter()
        .map(|input| {
            if !global.json {
                println!("Processing `{}`", input.display());
            }
            let report = if global.progress {
                let progress = Arc::new(TerminalProgress::new(&input.display().to_string()));
                let options = options
                    .clone()
                    .with_remux_options(RemuxOptions::new().with_progress(progress).with_batch_size(250));
                retime::process_file(input, &options)
            } else {
                retime::process_file(input, &options)
            };
            if !global.json {
                print_report(&report, global.verbose);
            }
            report
        })
        .collect()
}

#[cfg(feature = "rayon")]
fn process_parallel(
    inputs: &[PathBuf],
    global: &GlobalOptions,
    jobs: usize,
) -> Result<Vec<FileReport>, Box<dyn std::error::Error>> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let options = batch_options(global);
    Ok(pool.install(|| retime::process_all_parallel(inputs, &options)))
}

fn check(inputs: &[PathBuf], global: &GlobalOptions) -> Result<bool, Box<dyn std::error::Error>> {
    let mut all_ok = true;
    let mut payload = Vec::new();

    for input in inputs {
        match StartProbe::probe(input) {
            Ok(report) => {
                if global.json {
                    payload.push(json!({
                        "source": input.display().to_string(),
                        "needs_fix": report.needs_fix(),
                        "streams": report.streams.iter().map(|stream| json!({
                            "index": stream.index,
                            "kind": stream.kind.to_string(),
                            "time_base": stream.time_base.to_string(),
                            "pts_origin": stream.baseline.pts_origin,
                            "dts_origin": stream.baseline.dts_origin,
                        })).collect::<Vec<_>>(),
                    }));
                    continue;
                }

                let verdict = if report.needs_fix() {
                    "needs fix".yellow().bold()
                } else {
                    "ok".green().bold()
                };
                println!("{verdict} `{}`", input.display());
                for stream in &report.streams {
                    let start = stream
                        .start_seconds()
                        .map(|seconds| format!("{seconds:.3}s"))
                        .unwrap_or_else(|| "-".to_string());
                    println!("  #{} {:<8} {:<10} start {start}", stream.index, stream.kind, stream.time_base);
                }
            }
            Err(error) => {
                all_ok = false;
                if global.json {
                    payload.push(json!({
                        "source": input.display().to_string(),
                        "error": error.to_string(),
                    }));
                } else {
                    eprintln!("{} `{}`: {error}", "failed".red().bold(), input.display());
                }
            }
        }
    }

    if global.json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(all_ok)
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "retime", &mut std::io::stdout());
        return Ok(true);
    }

    if cli.inputs.is_empty() {
        return Err("please provide at least one input file".into());
    }

    apply_global_options(&cli.global)?;

    if cli.global.check {
        return check(&cli.inputs, &cli.global);
    }

    let jobs = cli.global.jobs.unwrap_or(1);

    #[cfg(feature = "rayon")]
    let reports = if jobs > 1 {
        let reports = process_parallel(&cli.inputs, &cli.global, jobs)?;
        if !cli.global.json {
            for report in &reports {
                print_report(report, cli.global.verbose);
            }
        }
        reports
    } else {
        process_sequential(&cli.inputs, &cli.global)
    };

    #[cfg(not(feature = "rayon"))]
    let reports = {
        if jobs > 1 {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                "--jobs requires building with the `rayon` feature".yellow()
            );
        }
        process_sequential(&cli.inputs, &cli.global)
    };

    if cli.global.json {
        let payload: Vec<_> = reports.iter().map(report_json).collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(reports.iter().all(|report| !report.is_failure()))
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands, apply_global_options, batch_options};

    #[test]
    fn parses_multiple_inputs_with_defaults() {
        let cli = Cli::try_parse_from(["retime", "a.ts", "b.mkv"]).unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.global.suffix, "_convert");
        assert!(!cli.global.keep_source);
        assert!(cli.command.is_none());
    }

    #[test]
    fn batch_options_follow_flags() {
        let cli = Cli::try_parse_from([
            "retime",
            "--suffix",
            "_fixed",
            "--keep-source",
            "--overwrite",
            "a.ts",
        ])
        .unwrap();
        let options = batch_options(&cli.global);
        assert_eq!(options.suffix(), "_fixed");
    }

    #[test]
    fn empty_or_nested_suffix_is_rejected() {
        assert!(Cli::try_parse_from(["retime", "--suffix", "", "a.ts"]).is_err());
        assert!(Cli::try_parse_from(["retime", "--suffix", "/fixed", "a.ts"]).is_err());
        assert!(Cli::try_parse_from(["retime", "--suffix", "_fixed", "a.ts"]).is_ok());
    }

    #[test]
    fn progress_with_parallel_jobs_is_rejected() {
        let cli = Cli::try_parse_from(["retime", "--progress", "--jobs", "4", "a.ts"]).unwrap();
        assert!(apply_global_options(&cli.global).is_err());

        let cli = Cli::try_parse_from(["retime", "--progress", "--jobs", "1", "a.ts"]).unwrap();
        assert!(apply_global_options(&cli.global).is_ok());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::try_parse_from(["retime", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }

    #[test]
    fn log_level_names_parse() {
        assert!("warn".parse::<retime::FfmpegLogLevel>().is_ok());
        assert!("QUIET".parse::<retime::FfmpegLogLevel>().is_ok());
        assert!("loud".parse::<retime::FfmpegLogLevel>().is_err());
    }
}
