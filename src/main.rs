mod analyzer;
mod export;
mod parser;
mod report;

use analyzer::{Aggregator, Mode};
use clap::Parser;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use thiserror::Error;

/// A CLI tool for mining security signals out of web server access logs
#[derive(Parser, Debug)]
#[command(
    name = "weblog-sentry",
    author,
    version,
    about = "Analyzes web server access logs for request volume, endpoint popularity and brute-force login attempts"
)]
struct Args {
    /// Path to the access log to analyze
    #[arg(value_name = "LOG_FILE", default_value = "sample.log")]
    file: PathBuf,

    /// Line classification strategy
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = Mode::Field)]
    mode: Mode,

    /// CSV output path (defaults per mode: ip_request_analysis.csv / security_report.csv)
    #[arg(short = 'o', long = "output", value_name = "CSV_FILE")]
    output: Option<PathBuf>,

    /// Failed-login count above which an IP is reported as suspicious
    #[arg(long = "login-threshold", default_value_t = 5, value_name = "COUNT")]
    login_threshold: usize,

    /// Failed-request count above which an IP is flagged a security risk
    #[arg(long = "risk-threshold", default_value_t = 5, value_name = "COUNT")]
    risk_threshold: usize,

    /// Export the full report as JSON to the specified file path
    #[arg(short = 'j', long = "json-output", value_name = "OUTPUT_FILE")]
    json_output: Option<PathBuf>,
}

/// Failures that terminate a run. Every variant surfaces as a single
/// user-facing message, never a panic trace.
#[derive(Debug, Error)]
enum RunError {
    #[error("could not open log file '{}': {source}", path.display())]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read line {line}: {source}")]
    ReadLine { line: usize, source: std::io::Error },
    #[error("failed to write CSV output: {0}")]
    CsvExport(#[from] export::ExportError),
    #[error("failed to write JSON output: {0}")]
    JsonExport(std::io::Error),
}

fn default_output(mode: Mode) -> PathBuf {
    match mode {
        Mode::Substring => PathBuf::from("ip_request_analysis.csv"),
        Mode::Field => PathBuf::from("security_report.csv"),
    }
}

/// Open, aggregate, report, export. Separated from `main` so the
/// missing-input and failed-export paths are reachable from tests.
fn run(args: &Args) -> Result<(), RunError> {
    // A missing input aborts here: no report is printed and no output
    // file is created.
    let file = File::open(&args.file).map_err(|source| RunError::OpenInput {
        path: args.file.clone(),
        source,
    })?;

    let reader = BufReader::new(file);
    let mut aggregator = Aggregator::new(args.mode);

    // Stream through the file line-by-line; unmatched lines are skipped
    // silently inside the aggregator. A read failure aborts the run.
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| RunError::ReadLine {
            line: line_num + 1,
            source,
        })?;
        aggregator.observe(&line);
    }

    let report = aggregator.finish(args.login_threshold, args.risk_threshold);

    // Print terminal report
    report::print_report(&report, &args.file);

    // Write the CSV report. A write failure loses only the save step; the
    // console results above are already out.
    let csv_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(args.mode));
    export::write_csv(&report, &csv_path)?;
    println!("✓ CSV report saved to '{}'", csv_path.display());

    // Optionally export JSON
    if let Some(json_path) = &args.json_output {
        report::export_json(&report, json_path).map_err(RunError::JsonExport)?;
        println!("✓ JSON report saved to '{}'", json_path.display());
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args_for(file: PathBuf, output: PathBuf) -> Args {
        Args {
            file,
            mode: Mode::Field,
            output: Some(output),
            login_threshold: 5,
            risk_threshold: 5,
            json_output: None,
        }
    }

    #[test]
    fn missing_input_reports_error_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let args = args_for(dir.path().join("no_such.log"), output.clone());

        let err = run(&args);
        assert!(matches!(err, Err(RunError::OpenInput { .. })));
        assert!(!output.exists(), "no output file on missing input");
    }

    #[test]
    fn unwritable_output_fails_after_analysis() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("access.log");
        std::fs::write(&log, "10.0.0.1 - - \"GET / HTTP/1.1\" 200 0\n").unwrap();
        let args = args_for(log, PathBuf::from("/nonexistent/dir/out.csv"));

        // The input parses fine; only the save step fails.
        let err = run(&args);
        assert!(matches!(err, Err(RunError::CsvExport(_))));
    }

    #[test]
    fn valid_input_writes_csv_report() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("access.log");
        std::fs::write(
            &log,
            "10.0.0.1 - - \"GET /api/users HTTP/1.1\" 200 512\n\
             not a log line\n\
             10.0.0.2 - - \"POST /login HTTP/1.1\" 401 217\n",
        )
        .unwrap();
        let output = dir.path().join("security_report.csv");
        let args = args_for(log, output.clone());

        run(&args).unwrap();
        let raw = std::fs::read_to_string(&output).unwrap();
        assert!(raw.starts_with("Top IP Addresses\n"));
        assert!(raw.contains("10.0.0.1,1"));
    }
}
