use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::http_probe::result::ProbeResult;

pub const RECORD_HEADER: &str = "id|outcome|status|bytes|ttfb_ms|latency_ms";

/// One pipe-separated line per result. Absent fields are left empty.
pub fn format_record(result: &ProbeResult) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        result.id,
        result.outcome,
        result.http_status.map(|s| s.to_string()).unwrap_or_default(),
        result.bytes,
        result.ttfb_ms().map(|ms| ms.to_string()).unwrap_or_default(),
        result.latency_ms()
    )
}

pub fn banner(target: &str, requests: usize, concurrency: usize, started: DateTime<Utc>) -> String {
    let title = format!(" GET probe: {target} ");
    let details = format!(
        " {requests} requests, {concurrency} in parallel, started {} ",
        started.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let width = title.chars().count().max(details.chars().count());
    let line = "─".repeat(width);
    format!("┌{line}┐\n│{title:<width$}│\n│{details:<width$}│\n└{line}┘")
}

/// Aggregate view over a finished run.
#[derive(Debug, PartialEq)]
pub struct Summary {
    /// Outcome token with its count, most frequent first, ties alphabetical.
    pub counts: Vec<(String, usize)>,
    pub avg_latency_ms: u128,
}

impl Summary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut tally: HashMap<String, usize> = HashMap::new();
        for result in results {
            *tally.entry(result.outcome.to_string()).or_default() += 1;
        }

        let mut counts: Vec<(String, usize)> = tally.into_iter().collect();
        counts.sort_by(|(a_name, a_count), (b_name, b_count)| {
            b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
        });

        let avg_latency_ms = if results.is_empty() {
            0
        } else {
            let total: u128 = results.iter().map(ProbeResult::latency_ms).sum();
            total / results.len() as u128
        };

        Summary {
            counts,
            avg_latency_ms,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(f, "───────")?;
        for (outcome, count) in &self.counts {
            writeln!(f, "{outcome:<10}: {count}")?;
        }
        write!(f, "{:<10}: {}", "avg_latency_ms", self.avg_latency_ms)
    }
}
