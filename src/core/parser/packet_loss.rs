// src/core/parser/packet_loss.rs

use tracing::{debug, warn};

use super::{lines, ParseOutcome, Tokens, WithParseError, UNEXPECTED_FORMAT};
use crate::core::models::PacketLossRecord;

const DATAGRAMS_MARKER: &str = "datagrams received";

const MIN_DATAGRAM_TOKENS: usize = 11;
const SENT_TOKEN: usize = 3;
const RECEIVED_TOKEN: usize = 5;
const LOST_TOKEN: usize = 8;
const LOSS_PERCENT_TOKEN: usize = 10;

/// Characters trimmed from both ends of the loss figure, e.g. `(5.2%)`.
const LOSS_DECORATION: &[char] = &['(', ')', '%'];

impl WithParseError for PacketLossRecord {
    fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }
}

/// Parses the captured output of a UDP loss test.
///
/// Only the first line mentioning received datagrams is considered; the scan never falls
/// back to a later line. Values stay as the raw tokens the tool printed.
pub fn parse_packet_loss(output: &str) -> ParseOutcome<PacketLossRecord> {
    let Some(line) = lines(output).find(|line| line.contains(DATAGRAMS_MARKER)) else {
        debug!("No datagram summary found in packet loss output.");
        return ParseOutcome::Empty;
    };

    let tokens = Tokens::new(line);
    if tokens.len() < MIN_DATAGRAM_TOKENS {
        warn!(tokens = tokens.len(), line, "Datagram summary line is too short.");
        return ParseOutcome::Degraded {
            partial: PacketLossRecord::default(),
            error: UNEXPECTED_FORMAT.to_string(),
        };
    }

    let field = |index: usize| tokens.get(index).map(str::to_string);
    let record = PacketLossRecord {
        datagrams_sent: field(SENT_TOKEN),
        datagrams_received: field(RECEIVED_TOKEN),
        lost_datagrams: field(LOST_TOKEN),
        loss_percentage: tokens
            .get(LOSS_PERCENT_TOKEN)
            .map(|token| token.trim_matches(LOSS_DECORATION).to_string()),
        error: None,
    };
    debug!(loss = ?record.loss_percentage, "Parsed packet loss output.");
    ParseOutcome::Parsed(record)
}
