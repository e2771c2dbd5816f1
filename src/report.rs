use crate::analyzer::{Mode, Report, CONSOLE_TOP_IPS};
use colored::Colorize;
use serde_json;
use std::io;
use std::path::Path;

const SEPARATOR: &str =
    "════════════════════════════════════════════════════════════════════";
const THIN_SEP: &str =
    "────────────────────────────────────────────────────────────────────";

/// Print a fully formatted analysis report to stdout.
///
/// The layout depends on the classification mode: substring mode shows the
/// per-IP request breakdown with risk flags, field mode shows top IPs, top
/// endpoints and the suspicious-login alerts.
pub fn print_report(report: &Report, source_file: &Path) {
    println!("\n{}", SEPARATOR.cyan().bold());
    match report.mode {
        Mode::Substring => println!("{}", "  📋  IP REQUEST ANALYSIS".white().bold()),
        Mode::Field => println!("{}", "  🛡  SECURITY REPORT".white().bold()),
    }
    println!("{}", SEPARATOR.cyan().bold());
    println!("  Source : {}", source_file.display().to_string().yellow());
    println!(
        "  Matched: {} lines",
        report.total_matched_lines.to_string().green().bold()
    );
    println!();

    match report.mode {
        Mode::Substring => print_ip_breakdown(report),
        Mode::Field => print_security_sections(report),
    }

    println!("\n{}\n", SEPARATOR.cyan());
}

fn print_ip_breakdown(report: &Report) {
    section_header(&format!(
        "TOP {} IP ADDRESSES BY REQUEST COUNT",
        CONSOLE_TOP_IPS
    ));
    if report.ip_stats.is_empty() {
        println!("  (no data)");
        return;
    }

    for stats in report.ip_stats.iter().take(CONSOLE_TOP_IPS) {
        println!("\n  IP: {}", stats.ip.cyan().bold());
        println!("    Total Requests:      {}", stats.total_requests);
        println!("    Successful Requests: {}", stats.successful_requests);
        println!("    Failed Requests:     {}", stats.failed_requests);
        println!("    Success Rate:        {}%", stats.success_rate);
        if stats.failed_requests > report.risk_threshold {
            println!("    {}", "POTENTIAL SECURITY RISK".red().bold());
        }
    }
}

fn print_security_sections(report: &Report) {
    section_header("TOP IP ADDRESSES");
    if report.top_ips.is_empty() {
        println!("  (no data)");
    } else {
        println!("  {:<3}  {:<17}  {:>8}", "#", "IP Address", "Requests");
        println!("  {}", &THIN_SEP[..39]);
        for (i, item) in report.top_ips.iter().enumerate() {
            println!(
                "  {:<3}  {:<17}  {:>8}",
                (i + 1).to_string().dimmed(),
                item.value.cyan(),
                item.count
            );
        }
    }
    println!();

    section_header("TOP ENDPOINTS");
    if report.top_endpoints.is_empty() {
        println!("  (no data)");
    } else {
        println!("  {:<3}  {:<40}  {:>8}", "#", "Endpoint", "Visits");
        println!("  {}", &THIN_SEP[..60]);
        for (i, item) in report.top_endpoints.iter().enumerate() {
            // Truncate by chars, not bytes: endpoints may carry
            // multi-byte UTF-8 and a byte slice could split one.
            let ep = if item.value.chars().count() > 40 {
                let head: String = item.value.chars().take(39).collect();
                format!("{}…", head)
            } else {
                item.value.clone()
            };
            println!(
                "  {:<3}  {:<40}  {:>8}",
                (i + 1).to_string().dimmed(),
                ep.cyan(),
                item.count
            );
        }
    }
    println!();

    section_header(&format!(
        "SUSPICIOUS LOGIN ATTEMPTS — FAILURES > {}",
        report.login_threshold
    ));
    if report.suspicious_ips.is_empty() {
        println!(
            "  {} No IPs exceeded the failed-login threshold.",
            "✓".green()
        );
    } else {
        println!(
            "  {} IPs flagged!\n",
            report.suspicious_ips.len().to_string().red().bold()
        );
        println!("  {:<3}  {:<17}  {:>15}", "#", "IP Address", "Failed Logins");
        println!("  {}", &THIN_SEP[..45]);
        for (i, item) in report.suspicious_ips.iter().enumerate() {
            println!(
                "  {:<3}  {:<17}  {:>15}",
                (i + 1).to_string().dimmed(),
                item.ip.red().bold(),
                item.failed_attempts.to_string().red()
            );
        }
    }
}

/// Export the full report as pretty-printed JSON to the given path.
pub fn export_json(report: &Report, path: &Path) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(report).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("serialization failed: {}", e),
        )
    })?;
    std::fs::write(path, json)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn section_header(title: &str) {
    println!("  {} {}", "▶".cyan(), title.white().bold());
    println!("  {}", THIN_SEP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Aggregator, Mode};
    use tempfile::tempdir;

    fn sample_report() -> Report {
        let mut agg = Aggregator::new(Mode::Field);
        for _ in 0..6 {
            agg.observe("10.0.0.2 - - \"POST /login HTTP/1.1\" 401 9");
        }
        agg.observe("10.0.0.1 - - \"GET /api/users HTTP/1.1\" 200 512");
        agg.finish(5, 5)
    }

    #[test]
    fn json_export_writes_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_json(&sample_report(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["mode"], "field");
        assert_eq!(value["suspicious_ips"][0]["ip"], "10.0.0.2");
        assert_eq!(value["suspicious_ips"][0]["failed_attempts"], 6);
    }

    #[test]
    fn long_multibyte_endpoint_prints_without_panic() {
        // A >40-char endpoint whose 39th byte sits inside a multi-byte
        // character must still render, truncated on a char boundary.
        let line = format!(
            "10.0.0.1 - - \"GET /café{} HTTP/1.1\" 200 0",
            "é".repeat(40)
        );
        let mut agg = Aggregator::new(Mode::Field);
        agg.observe(&line);
        let report = agg.finish(5, 5);
        assert_eq!(report.top_endpoints.len(), 1);
        print_report(&report, Path::new("test.log"));
    }

    #[test]
    fn json_export_fails_on_unwritable_path() {
        let report = sample_report();
        let err = export_json(&report, Path::new("/nonexistent/dir/report.json"));
        assert!(err.is_err());
    }
}
