// src/core/parser/throughput.rs

use tracing::debug;

use super::{lines, ParseOutcome, Tokens, WithParseError};
use crate::core::models::{IntervalResult, ThroughputRecord, ThroughputSummary};

// Offsets below follow the iperf3 text layout, where "[  5]" splits into two tokens:
// `[  5]   0.00-1.00   sec  5.12 GBytes  44.0 Gbits/sec ...`

/// Marks the line announcing which server the client connects to.
const CONNECTING_MARKER: &str = "Connecting to host";
/// Interval rows start with a bracketed, right-aligned stream id.
const INTERVAL_LINE_PREFIX: &str = "[  ";
const HEADER_ID_MARKER: &str = "[ ID]";
const HEADER_INTERVAL_MARKER: &str = "Interval";
const SENDER_MARKER: &str = "sender";
const RECEIVER_MARKER: &str = "receiver";

const MIN_INTERVAL_TOKENS: usize = 9;
const MIN_SUMMARY_TOKENS: usize = 9;
const INTERVAL_TOKEN: usize = 2;
const TRANSFER_TOKENS: (usize, usize) = (4, 5);
const BANDWIDTH_TOKENS: (usize, usize) = (6, 7);

impl WithParseError for ThroughputRecord {
    fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }
}

/// Parses the captured stdout of a throughput-test run.
///
/// The connection line and the summary are both first-match-wins. Interval rows keep their
/// original order. Every token offset read lies below the minimum token count a row must
/// reach, so rows that are too short are skipped and this parser never returns
/// [`ParseOutcome::Degraded`].
pub fn parse_throughput(output: &str) -> ParseOutcome<ThroughputRecord> {
    let lines: Vec<&str> = lines(output).collect();
    let mut record = ThroughputRecord::default();

    if let Some(line) = lines.iter().find(|line| line.contains(CONNECTING_MARKER)) {
        record.connection_info = line.to_string();
    }

    record.test_results = lines
        .iter()
        .filter(|line| is_interval_line(line))
        .filter_map(|line| read_interval(line))
        .collect();

    record.summary = lines
        .iter()
        .filter(|line| is_summary_line(line))
        .find_map(|line| read_summary(line));

    debug!(
        intervals = record.test_results.len(),
        has_summary = record.summary.is_some(),
        "Parsed throughput output."
    );

    if record.connection_info.is_empty()
        && record.test_results.is_empty()
        && record.summary.is_none()
    {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Parsed(record)
    }
}

fn read_interval(line: &str) -> Option<IntervalResult> {
    let tokens = Tokens::new(line);
    if tokens.len() < MIN_INTERVAL_TOKENS {
        return None;
    }
    let interval = tokens.get(INTERVAL_TOKEN)?;
    // A genuine "start-end" interval has exactly one hyphen.
    if interval.matches('-').count() != 1 {
        return None;
    }
    Some(IntervalResult {
        interval: interval.to_string(),
        transfer: tokens.pair(TRANSFER_TOKENS)?,
        bandwidth: tokens.pair(BANDWIDTH_TOKENS)?,
    })
}

fn read_summary(line: &str) -> Option<ThroughputSummary> {
    let tokens = Tokens::new(line);
    if tokens.len() < MIN_SUMMARY_TOKENS {
        return None;
    }
    Some(ThroughputSummary {
        total_transfer: tokens.pair(TRANSFER_TOKENS)?,
        average_bandwidth: tokens.pair(BANDWIDTH_TOKENS)?,
    })
}

fn is_header_line(line: &str) -> bool {
    line.contains(HEADER_ID_MARKER) && line.contains(HEADER_INTERVAL_MARKER)
}

fn is_summary_line(line: &str) -> bool {
    line.contains(SENDER_MARKER) || line.contains(RECEIVER_MARKER)
}

// Sender/receiver rows repeat the whole run as one "0.00-N" interval; they feed the
// summary only, so N interval rows give N results.
fn is_interval_line(line: &str) -> bool {
    line.starts_with(INTERVAL_LINE_PREFIX) && !is_header_line(line) && !is_summary_line(line)
}
