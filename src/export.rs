use crate::analyzer::{Mode, Report};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Errors raised while writing the CSV report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not create output file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write CSV row: {0}")]
    Csv(#[from] csv::Error),
}

/// Write the report to CSV in the shape matching its mode.
pub fn write_csv(report: &Report, path: &Path) -> Result<(), ExportError> {
    match report.mode {
        Mode::Substring => write_ip_analysis(report, path),
        Mode::Field => write_security_report(report, path),
    }
}

/// Flat per-IP breakdown: one row per observed IP (all of them, not just
/// the console top list), in full-ranking order.
fn write_ip_analysis(report: &Report, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "IP Address",
        "Total Requests",
        "Successful Requests",
        "Failed Requests",
        "Success Rate (%)",
    ])?;
    for stats in &report.ip_stats {
        writer.write_record([
            stats.ip.as_str(),
            &stats.total_requests.to_string(),
            &stats.successful_requests.to_string(),
            &stats.failed_requests.to_string(),
            &stats.success_rate.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Three titled blocks separated by blank rows: top IPs, top endpoints,
/// suspicious login attempts. Rows vary in width, so the writer runs in
/// flexible mode.
fn write_security_report(report: &Report, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

    writer.write_record(["Top IP Addresses"])?;
    writer.write_record(["IP Address", "Request Count"])?;
    for item in &report.top_ips {
        writer.write_record([item.value.as_str(), &item.count.to_string()])?;
    }

    writer.write_record([""])?;
    writer.write_record(["Top Endpoints"])?;
    writer.write_record(["Endpoint", "Visits"])?;
    for item in &report.top_endpoints {
        writer.write_record([item.value.as_str(), &item.count.to_string()])?;
    }

    writer.write_record([""])?;
    writer.write_record(["Suspicious Login Attempts"])?;
    writer.write_record(["IP Address", "Failed Attempts"])?;
    for item in &report.suspicious_ips {
        writer.write_record([item.ip.as_str(), &item.failed_attempts.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}
