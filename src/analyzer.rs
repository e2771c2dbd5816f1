use crate::parser;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// How many IPs the substring-mode console report shows.
pub const CONSOLE_TOP_IPS: usize = 10;
/// Field-mode top-N cutoffs for IPs and endpoints.
pub const TOP_IPS: usize = 5;
pub const TOP_ENDPOINTS: usize = 3;

/// Line classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Extract only the IP; classify by the literal substrings " 200 " / " 401 ".
    Substring,
    /// Parse method, endpoint and status as fields; flag 401s on /login paths.
    Field,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Substring => write!(f, "substring"),
            Mode::Field => write!(f, "field"),
        }
    }
}

/// Per-IP request breakdown for the full ranking.
#[derive(Debug, Clone, Serialize)]
pub struct IpStats {
    pub ip: String,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub success_rate: f64,
}

/// A ranked (value, count) row for top-N listings.
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub value: String,
    pub count: usize,
}

/// An IP whose failed-login count exceeded the login threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousIp {
    pub ip: String,
    pub failed_attempts: usize,
}

/// The complete analysis output, ready for console, CSV and JSON sinks.
#[derive(Debug, Serialize)]
pub struct Report {
    pub mode: Mode,
    pub total_matched_lines: usize,
    /// Every observed IP, sorted by total requests descending.
    pub ip_stats: Vec<IpStats>,
    pub top_ips: Vec<RankedItem>,
    pub top_endpoints: Vec<RankedItem>,
    pub suspicious_ips: Vec<SuspiciousIp>,
    pub login_threshold: usize,
    pub risk_threshold: usize,
}

/// Single-pass accumulator over raw log lines.
///
/// One instance per run; every table lives here as a field so no state
/// survives across runs. Counting is order-independent — only the
/// sort in [`Aggregator::finish`] fixes the display order.
#[derive(Debug)]
pub struct Aggregator {
    mode: Mode,
    matched_lines: usize,
    ip_totals: HashMap<String, usize>,
    ip_success: HashMap<String, usize>,
    ip_failure: HashMap<String, usize>,
    endpoint_visits: HashMap<String, usize>,
    failed_logins: HashMap<String, usize>,
}

impl Aggregator {
    pub fn new(mode: Mode) -> Self {
        Aggregator {
            mode,
            matched_lines: 0,
            ip_totals: HashMap::new(),
            ip_success: HashMap::new(),
            ip_failure: HashMap::new(),
            endpoint_visits: HashMap::new(),
            failed_logins: HashMap::new(),
        }
    }

    /// Feed one raw line. Lines the parser can't match are skipped
    /// silently; nothing is counted for them.
    pub fn observe(&mut self, line: &str) {
        match self.mode {
            Mode::Substring => self.observe_substring(line),
            Mode::Field => self.observe_field(line),
        }
    }

    fn observe_substring(&mut self, line: &str) {
        let Some(ip) = parser::extract_ip(line) else {
            return;
        };
        self.matched_lines += 1;
        *self.ip_totals.entry(ip.to_string()).or_insert(0) += 1;

        // Crude by contract: a " 200 " or " 401 " anywhere in the line
        // counts, even outside the status-code position. Other statuses
        // contribute to the total only.
        if line.contains(" 200 ") {
            *self.ip_success.entry(ip.to_string()).or_insert(0) += 1;
        } else if line.contains(" 401 ") {
            *self.ip_failure.entry(ip.to_string()).or_insert(0) += 1;
        }
    }

    fn observe_field(&mut self, line: &str) {
        let Some(record) = parser::parse_record(line) else {
            return;
        };
        self.matched_lines += 1;
        *self.ip_totals.entry(record.ip.clone()).or_insert(0) += 1;
        *self
            .endpoint_visits
            .entry(record.endpoint.clone())
            .or_insert(0) += 1;

        match record.status_code {
            200 => {
                *self.ip_success.entry(record.ip.clone()).or_insert(0) += 1;
            }
            401 => {
                *self.ip_failure.entry(record.ip.clone()).or_insert(0) += 1;
                if record.endpoint.contains("/login") {
                    *self.failed_logins.entry(record.ip).or_insert(0) += 1;
                }
            }
            _ => {}
        }
    }

    /// Consume the accumulated tables and build the ranked report.
    ///
    /// `login_threshold` gates the suspicious-IP set (strictly greater
    /// than); `risk_threshold` is only carried through for display-time
    /// flagging of high-failure IPs.
    pub fn finish(self, login_threshold: usize, risk_threshold: usize) -> Report {
        // Full ranking: total requests descending, IP string ascending as
        // the deterministic tie-break, shared by console and CSV output.
        let mut ip_stats: Vec<IpStats> = self
            .ip_totals
            .iter()
            .map(|(ip, &total)| {
                let success = *self.ip_success.get(ip).unwrap_or(&0);
                let failure = *self.ip_failure.get(ip).unwrap_or(&0);
                IpStats {
                    ip: ip.clone(),
                    total_requests: total,
                    successful_requests: success,
                    failed_requests: failure,
                    success_rate: success_rate(success, total),
                }
            })
            .collect();
        ip_stats.sort_unstable_by(|a, b| {
            b.total_requests
                .cmp(&a.total_requests)
                .then_with(|| a.ip.cmp(&b.ip))
        });

        let top_ips = ip_stats
            .iter()
            .take(TOP_IPS)
            .map(|s| RankedItem {
                value: s.ip.clone(),
                count: s.total_requests,
            })
            .collect();

        let mut ep_vec: Vec<(&str, usize)> = self
            .endpoint_visits
            .iter()
            .map(|(k, &v)| (k.as_str(), v))
            .collect();
        ep_vec.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let top_endpoints = ep_vec
            .iter()
            .take(TOP_ENDPOINTS)
            .map(|&(ep, count)| RankedItem {
                value: ep.to_string(),
                count,
            })
            .collect();

        // Threshold rule is strictly-greater-than: attempts == threshold
        // is NOT suspicious.
        let mut suspicious: Vec<SuspiciousIp> = self
            .failed_logins
            .iter()
            .filter(|(_, &n)| n > login_threshold)
            .map(|(ip, &n)| SuspiciousIp {
                ip: ip.clone(),
                failed_attempts: n,
            })
            .collect();
        suspicious.sort_unstable_by(|a, b| {
            b.failed_attempts
                .cmp(&a.failed_attempts)
                .then_with(|| a.ip.cmp(&b.ip))
        });

        Report {
            mode: self.mode,
            total_matched_lines: self.matched_lines,
            ip_stats,
            top_ips,
            top_endpoints,
            suspicious_ips: suspicious,
            login_threshold,
            risk_threshold,
        }
    }
}

/// Percentage of successful requests, rounded to two decimals.
/// Zero-total IPs yield 0.0 rather than dividing by zero.
fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((successful as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
}
