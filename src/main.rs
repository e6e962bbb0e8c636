//! ChunkRunner CLI Entry Point
//!
//! Scores sequencing reads against a reference using the chunked execution
//! engine and prints one JSON record per line.
//!
//! # Usage
//!
//! ```bash
//! # Score reads sequentially
//! chunkrunner reads.yaml --reference ACGTACGT
//!
//! # Four workers, sixteen reads per chunk
//! chunkrunner reads.yaml --reference ACGTACGT --workers 4 --chunk-size 16
//!
//! # One worker per CPU, options from a file, print a summary
//! chunkrunner reads.yaml --config options.yaml --workers auto --summary
//! ```

use std::env;
use std::process::ExitCode;

use colored::Colorize;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use chunkrunner::execution::available_workers;
use chunkrunner::{load_workload, Aligner, Engine, ExecutionOptions, UnitError};
use chunkrunner::{APP_NAME, VERSION};

/// Reference used when none is given on the command line.
const DEFAULT_REFERENCE: &str = "ACGTACGTACGTACGT";

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    workload_path: Option<String>,
    options_path: Option<String>,
    reference: Option<String>,
    max_workers: Option<WorkerCount>,
    chunk_size: Option<usize>,
    no_cleanup: bool,
    summary: bool,
    timeline: bool,
    verbose: bool,
}

/// Worker count requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerCount {
    Auto,
    Fixed(usize),
}

/// A read as it appears in the workload file: either a bare sequence or an
/// object with an id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Read {
    Named { id: String, sequence: String },
    Bare(String),
}

impl Read {
    fn id(&self) -> &str {
        match self {
            Self::Named { id, .. } => id,
            Self::Bare(sequence) => sequence,
        }
    }

    fn sequence(&self) -> &str {
        match self {
            Self::Named { sequence, .. } => sequence,
            Self::Bare(sequence) => sequence,
        }
    }
}

/// One scored strand of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct AlignmentRecord {
    id: String,
    reference: String,
    strand: char,
    score: usize,
}

/// Scores both strands of each read by counting positions that match the
/// reference.
struct ReferenceScorer {
    reference: Vec<u8>,
}

impl ReferenceScorer {
    fn new(reference: &str) -> Result<Self, String> {
        let reference = normalize(reference).map_err(|e| format!("Invalid reference: {}", e))?;
        if reference.is_empty() {
            return Err("Reference sequence is empty".to_string());
        }
        Ok(Self { reference })
    }

    fn reference_name(&self) -> String {
        String::from_utf8_lossy(&self.reference).into_owned()
    }

    fn score(&self, bases: &[u8]) -> usize {
        bases
            .iter()
            .zip(&self.reference)
            .filter(|(a, b)| a == b && **a != b'N')
            .count()
    }
}

impl Aligner<Read> for ReferenceScorer {
    type Record = AlignmentRecord;

    fn align(&self, unit: &Read) -> Result<Vec<AlignmentRecord>, UnitError> {
        let forward = normalize(unit.sequence()).map_err(|e| format!("read '{}': {}", unit.id(), e))?;
        let reverse = reverse_complement(&forward);
        let reference = self.reference_name();

        Ok(vec![
            AlignmentRecord {
                id: unit.id().to_string(),
                reference: reference.clone(),
                strand: '+',
                score: self.score(&forward),
            },
            AlignmentRecord {
                id: unit.id().to_string(),
                reference,
                strand: '-',
                score: self.score(&reverse),
            },
        ])
    }

    fn cleanup(&self, records: &[AlignmentRecord]) -> Result<(), UnitError> {
        if let Some(first) = records.first() {
            debug!("Released {} records for read '{}'", records.len(), first.id);
        }
        Ok(())
    }
}

/// Upper-cases a nucleotide sequence and rejects anything but ACGTN.
fn normalize(sequence: &str) -> Result<Vec<u8>, String> {
    sequence
        .trim()
        .bytes()
        .map(|b| match b.to_ascii_uppercase() {
            base @ (b'A' | b'C' | b'G' | b'T' | b'N') => Ok(base),
            other => Err(format!("invalid base '{}'", other as char)),
        })
        .collect()
}

fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases
        .iter()
        .rev()
        .map(|base| match base {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            _ => b'N',
        })
        .collect()
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    eprintln!();
    eprintln!("{} v{}", APP_NAME.bold(), VERSION);
    eprintln!("{}", "Chunked Parallel Execution Engine".dimmed());
    eprintln!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: chunkrunner [OPTIONS] <WORKLOAD_FILE>");
    println!();
    println!("Arguments:");
    println!("  <WORKLOAD_FILE>      YAML/JSON list of reads (strings or {{id, sequence}})");
    println!();
    println!("Options:");
    println!("  --reference SEQ      Reference sequence (default: {})", DEFAULT_REFERENCE);
    println!("  --config PATH        Load execution options from a YAML file");
    println!("  --workers N|auto     Worker threads; 1 runs sequentially (default: 1)");
    println!("  --chunk-size N       Reads per dispatched chunk (default: 1)");
    println!("  --no-cleanup         Skip the per-read cleanup hook");
    println!("  --summary            Print an execution summary to stderr");
    println!("  --timeline           Print a per-chunk timeline to stderr");
    println!("  --verbose            Enable debug logging");
    println!("  --help               Show this help message");
    println!("  --version            Show version information");
    println!();
    println!("Examples:");
    println!("  chunkrunner reads.yaml --reference ACGTACGT");
    println!("  chunkrunner reads.yaml --workers auto --chunk-size 64 --summary");
}

/// Returns the value following a flag, advancing the cursor.
fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => config.verbose = true,
            "--no-cleanup" => config.no_cleanup = true,
            "--summary" => config.summary = true,
            "--timeline" => config.timeline = true,
            "--reference" => {
                config.reference = Some(flag_value(args, &mut i, arg)?.to_string());
            }
            "--config" => {
                config.options_path = Some(flag_value(args, &mut i, arg)?.to_string());
            }
            "--workers" => {
                let value = flag_value(args, &mut i, arg)?;
                config.max_workers = Some(parse_worker_count(value)?);
            }
            "--chunk-size" => {
                let value = flag_value(args, &mut i, arg)?;
                config.chunk_size = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid chunk size: {}", value))?,
                );
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.workload_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.workload_path = Some(arg.clone());
            }
        }
        i += 1;
    }

    Ok(config)
}

fn parse_worker_count(value: &str) -> Result<WorkerCount, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(WorkerCount::Auto);
    }
    value
        .parse()
        .map(WorkerCount::Fixed)
        .map_err(|_| format!("Invalid worker count: {}", value))
}

/// Merges the options file with command-line overrides.
fn resolve_options(config: &Config) -> Result<ExecutionOptions, Box<dyn std::error::Error>> {
    let mut options = match &config.options_path {
        Some(path) => ExecutionOptions::load(path)?,
        None => ExecutionOptions::default(),
    };

    match config.max_workers {
        Some(WorkerCount::Auto) => options = options.with_max_workers(available_workers()),
        Some(WorkerCount::Fixed(n)) => options = options.with_max_workers(n),
        None => {}
    }
    if let Some(chunk_size) = config.chunk_size {
        options = options.with_chunk_size(chunk_size);
    }
    if config.no_cleanup {
        options = options.with_cleanup(false);
    }

    options.validate()?;
    Ok(options)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    // Print banner
    print_banner();

    let workload_path = config
        .workload_path
        .clone()
        .ok_or("No workload file given")?;

    let options = resolve_options(&config)?;
    let scorer = ReferenceScorer::new(config.reference.as_deref().unwrap_or(DEFAULT_REFERENCE))?;

    // Load workload
    let reads: Vec<Read> = load_workload(&workload_path).map_err(|e| {
        error!("Failed to load workload: {}", e);
        e
    })?;

    info!(
        "Scoring {} reads against {} ({} workers, chunk size {})",
        reads.len(),
        scorer.reference_name(),
        options.max_workers,
        options.chunk_size
    );

    // Execute
    let engine = Engine::new(scorer);
    let execution = engine.execute_with_report(&reads, &options)?;

    for record in &execution.records {
        println!("{}", serde_json::to_string(record)?);
    }

    if config.summary {
        eprintln!();
        eprintln!("{}", execution.report.get_summary().green());
    }

    if config.timeline {
        eprintln!("{}", execution.timeline.gantt_chart());
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkrunner::ExecutionError;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("chunkrunner")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_full_arguments() {
        let config = parse_arguments(&args(&[
            "reads.yaml",
            "--workers",
            "4",
            "--chunk-size",
            "8",
            "--no-cleanup",
            "--reference",
            "ACGT",
            "--summary",
        ]))
        .unwrap();

        assert_eq!(config.workload_path.as_deref(), Some("reads.yaml"));
        assert_eq!(config.max_workers, Some(WorkerCount::Fixed(4)));
        assert_eq!(config.chunk_size, Some(8));
        assert!(config.no_cleanup);
        assert!(config.summary);
        assert_eq!(config.reference.as_deref(), Some("ACGT"));
    }

    #[test]
    fn test_parse_auto_workers() {
        let config = parse_arguments(&args(&["reads.yaml", "--workers", "auto"])).unwrap();
        assert_eq!(config.max_workers, Some(WorkerCount::Auto));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_arguments(&args(&["--workers"])).is_err());
        assert!(parse_arguments(&args(&["--workers", "many"])).is_err());
        assert!(parse_arguments(&args(&["--chunk-size", "-1"])).is_err());
        assert!(parse_arguments(&args(&["--bogus"])).is_err());
        assert!(parse_arguments(&args(&["a.yaml", "b.yaml"])).is_err());
    }

    #[test]
    fn test_resolve_options_overrides() {
        let config = Config {
            max_workers: Some(WorkerCount::Fixed(3)),
            chunk_size: Some(5),
            no_cleanup: true,
            ..Config::default()
        };

        let options = resolve_options(&config).unwrap();
        assert_eq!(options.max_workers, 3);
        assert_eq!(options.chunk_size, 5);
        assert!(!options.cleanup);
    }

    #[test]
    fn test_resolve_options_rejects_zero_workers() {
        let config = Config {
            max_workers: Some(WorkerCount::Fixed(0)),
            ..Config::default()
        };

        let err = resolve_options(&config).unwrap_err();
        assert!(err.downcast_ref::<ExecutionError>().is_some());
    }

    #[test]
    fn test_scorer_scores_both_strands() {
        let scorer = ReferenceScorer::new("ACGTTT").unwrap();
        let read = Read::Named {
            id: "r1".to_string(),
            sequence: "aaacgt".to_string(),
        };

        let records = scorer.align(&read).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].strand, '+');
        assert_eq!(records[0].score, 2); // AAACGT vs ACGTTT
        assert_eq!(records[1].strand, '-');
        assert_eq!(records[1].score, 6); // reverse complement is ACGTTT
        assert_eq!(records[1].id, "r1");
    }

    #[test]
    fn test_scorer_rejects_invalid_bases() {
        let scorer = ReferenceScorer::new("ACGT").unwrap();
        let err = scorer.align(&Read::Bare("ACXT".to_string())).unwrap_err();
        assert!(err.to_string().contains("invalid base 'X'"));
    }

    #[test]
    fn test_scorer_rejects_empty_reference() {
        assert!(ReferenceScorer::new("  ").is_err());
        assert!(ReferenceScorer::new("AC-T").is_err());
    }

    #[test]
    fn test_engine_with_scorer_keeps_read_order() {
        let reads: Vec<Read> = ["ACGT", "TTTT", "GGCC", "ACGA", "NNNN"]
            .iter()
            .map(|s| Read::Bare(s.to_string()))
            .collect();
        let engine = Engine::new(ReferenceScorer::new("ACGT").unwrap());
        let options = ExecutionOptions::new().with_max_workers(3).with_chunk_size(2);

        let records = engine.execute(&reads, &options).unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["ACGT", "ACGT", "TTTT", "TTTT", "GGCC", "GGCC", "ACGA", "ACGA", "NNNN", "NNNN"]
        );
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"AACGTN"), b"NACGTT".to_vec());
    }
}
