//! Error taxonomy for the streaming CSV core.

use std::fmt;

use thiserror::Error;

use crate::signal::CancelReason;

/// A `(line, column, offset)` triple counted in characters from the start of
/// the logical input, not the current chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column within the current line.
    pub column: usize,
    /// Total characters consumed since the start of the logical input.
    pub offset: usize,
}

impl Position {
    /// The position at the very start of an input stream.
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    pub(crate) fn advance(&mut self, ch: char) {
        self.offset += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {} (offset {})", self.line, self.column, self.offset)
    }
}

fn source_suffix(source: Option<&str>) -> String {
    match source {
        Some(src) => format!(" in {src:?}"),
        None => String::new(),
    }
}

/// Every error the core can produce. Every condition in this enum surfaces to
/// the caller; none are swallowed or retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Flush was called while a quoted field was still open.
    #[error("unterminated quoted field opened at {position}{}", source_suffix(.source_label.as_deref()))]
    UnterminatedQuotedField {
        position: Position,
        source_label: Option<String>,
    },

    /// The lexer's pending-character buffer grew past `max_buffer_size`.
    #[error(
        "lexer buffer overflow: {length} characters exceeds limit of {limit}{}",
        source_suffix(.source_label.as_deref())
    )]
    BufferOverflow {
        length: usize,
        limit: usize,
        source_label: Option<String>,
    },

    /// A header or record would exceed `max_field_count` fields.
    #[error(
        "field count exceeded at row {row_number}: limit is {limit}{}",
        source_suffix(.source_label.as_deref())
    )]
    FieldCountExceeded {
        row_number: usize,
        limit: usize,
        source_label: Option<String>,
    },

    /// Object-shape output with a header containing a repeated entry.
    #[error("duplicate header entry {entry:?}{}", source_suffix(.source_label.as_deref()))]
    DuplicateHeader {
        entry: String,
        source_label: Option<String>,
    },

    /// Object-shape output with an empty header.
    #[error("header must be non-empty for object-shape output{}", source_suffix(.source_label.as_deref()))]
    EmptyHeader { source_label: Option<String> },

    /// `Strict` column-count strategy observed `R != H`.
    #[error(
        "column count mismatch at row {row_number}: header has {header_len} fields, record has {record_len}{}",
        source_suffix(.source_label.as_deref())
    )]
    ColumnCountMismatch {
        header_len: usize,
        record_len: usize,
        row_number: usize,
        source_label: Option<String>,
    },

    /// The decoder saw an invalid, or (in streaming mode at flush) truncated,
    /// byte sequence for the configured charset.
    #[error("invalid encoding for charset {charset}{}", source_suffix(.source_label.as_deref()))]
    InvalidEncoding {
        charset: String,
        source_label: Option<String>,
    },

    /// A disallowed option combination was supplied at construction time.
    #[error("invalid option combination: {reason}")]
    InvalidOption { reason: String },

    /// A cancellation signal was observed; `reason` is the signal's own
    /// reason, verbatim.
    #[error("operation cancelled: {reason}")]
    Cancelled { reason: CancelReason },
}

impl Error {
    /// The position attached to this error, when the error carries one.
    ///
    /// Most variants are reported at a row/field granularity rather than a
    /// character position; only the lexer-level errors carry a `Position`.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::UnterminatedQuotedField { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// The row number attached to this error, when available.
    pub fn row_number(&self) -> Option<usize> {
        match self {
            Error::FieldCountExceeded { row_number, .. }
            | Error::ColumnCountMismatch { row_number, .. } => Some(*row_number),
            _ => None,
        }
    }

    /// The opaque `source` diagnostic identifier attached at construction,
    /// when this error carries one.
    pub fn source_label(&self) -> Option<&str> {
        match self {
            Error::UnterminatedQuotedField { source_label, .. }
            | Error::BufferOverflow { source_label, .. }
            | Error::FieldCountExceeded { source_label, .. }
            | Error::DuplicateHeader { source_label, .. }
            | Error::EmptyHeader { source_label }
            | Error::ColumnCountMismatch { source_label, .. }
            | Error::InvalidEncoding { source_label, .. } => source_label.as_deref(),
            Error::InvalidOption { .. } | Error::Cancelled { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
