// src/core/parser/mod.rs

//! Parsers turning line-oriented tool output into fixed-shape records.
//!
//! Every parser is a pure function over the captured text. None of them fail: output that
//! cannot be fully interpreted degrades into a partial record carrying an error marker.

pub mod host_scan;
pub mod packet_loss;
pub mod throughput;

/// Marker stored in a record's `error` field when output was only partly understood.
pub const UNEXPECTED_FORMAT: &str = "Unexpected output format";

/// The tagged result of parsing one captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// The expected structure was found and fully extracted.
    Parsed(T),
    /// Some structure was found but extraction stopped early; `partial` keeps what was read.
    Degraded { partial: T, error: String },
    /// Nothing recognizable was found.
    Empty,
}

/// Records that can absorb a parse error marker.
pub trait WithParseError: Default {
    fn set_error(&mut self, error: String);
}

impl<T: WithParseError> ParseOutcome<T> {
    /// Collapses the outcome into the record shape that goes into the report.
    pub fn into_record(self) -> T {
        match self {
            ParseOutcome::Parsed(record) => record,
            ParseOutcome::Degraded { mut partial, error } => {
                partial.set_error(error);
                partial
            }
            ParseOutcome::Empty => T::default(),
        }
    }
}

impl<T> ParseOutcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, ParseOutcome::Empty)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ParseOutcome::Degraded { .. })
    }
}

/// A whitespace-split line with checked positional access.
pub(crate) struct Tokens<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self { parts: line.split_whitespace().collect() }
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    /// Joins two tokens with a single space, e.g. a value and its unit.
    pub(crate) fn pair(&self, (first, second): (usize, usize)) -> Option<String> {
        Some(format!("{} {}", self.get(first)?, self.get(second)?))
    }
}

/// Splits captured output into lines after trimming surrounding whitespace.
pub(crate) fn lines(output: &str) -> impl Iterator<Item = &str> {
    output.trim().lines()
}
