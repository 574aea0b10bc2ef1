//! Moodatlas CLI - Command-line interface for the Moodatlas engine
//!
//! Commands:
//! - analyze: Run the engine over a JSON array of journal records
//! - seasons: Print the season bucket table for a given year

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use moodatlas_engine::temporal::season_for_date;
use moodatlas_engine::types::{AnalysisMode, RawRecord};
use moodatlas_engine::{EngineProcessor, ENGINE_VERSION};

/// Moodatlas - Environmental-mood correlation and spatial aggregation engine
#[derive(Parser)]
#[command(name = "moodatlas")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Correlate journal moods with environmental snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine over a JSON array of journal records
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Aggregation window
        #[arg(short, long, default_value = "7days")]
        mode: ModeArg,

        /// Force compact output even on a TTY
        #[arg(long)]
        compact: bool,
    },

    /// Print the season bucket table for a given year
    Seasons {
        /// Calendar year
        #[arg(default_value = "2024")]
        year: i32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Snapshot clustering, today's records only
    Today,
    /// Windowed clustering over the last 7 days
    #[value(name = "7days")]
    SevenDays,
    /// Windowed clustering over the last 30 days
    #[value(name = "30days")]
    ThirtyDays,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Today => AnalysisMode::Today,
            ModeArg::SevenDays => AnalysisMode::SevenDays,
            ModeArg::ThirtyDays => AnalysisMode::ThirtyDays,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            mode,
            compact,
        } => run_analyze(&input, &output, mode.into(), compact),
        Commands::Seasons { year } => run_seasons(year),
    }
}

fn run_analyze(input: &PathBuf, output: &PathBuf, mode: AnalysisMode, compact: bool) -> ExitCode {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", input.display());
            return ExitCode::FAILURE;
        }
    };

    let records: Vec<RawRecord> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: input is not a JSON array of records: {e}");
            return ExitCode::FAILURE;
        }
    };

    let summary = EngineProcessor::new().analyze(&records, mode);

    let pretty = !compact && output.as_os_str() == "-" && atty::is(atty::Stream::Stdout);
    let encoded = if pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    };
    let encoded = match encoded {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to encode summary: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(output, &encoded) {
        eprintln!("error: failed to write {}: {e}", output.display());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_seasons(year: i32) -> ExitCode {
    println!("Season buckets for {year}:");
    for month in 1..=12u32 {
        let date = match chrono::NaiveDate::from_ymd_opt(year, month, 1) {
            Some(d) => d,
            None => {
                eprintln!("error: invalid year {year}");
                return ExitCode::FAILURE;
            }
        };
        println!("  {year}-{month:02}  {}", season_for_date(date).as_str());
    }
    ExitCode::SUCCESS
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &PathBuf, content: &str) -> io::Result<()> {
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()
    } else {
        fs::write(path, content)
    }
}
