//! Concrete, validated configuration structs (§4, §6).
//!
//! Each `*Options` type mirrors the option table of its corresponding
//! component and validates mutually exclusive combinations at construction,
//! returning [`Error::InvalidOption`] rather than failing midway through a
//! parse (§7).

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::signal::Signal;

/// Default buffer size: 10 Mi characters (§4.2).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Default field count ceiling (§4.3).
pub const DEFAULT_MAX_FIELD_COUNT: usize = 100_000;

/// A shared, type-erased cancellation signal.
pub type SharedSignal = Arc<dyn Signal + Send + Sync>;

/// Output shape for assembled records (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// A mapping from header name to field value.
    #[default]
    Object,
    /// A positional sequence of field values.
    Array,
}

/// How a data record's field count is reconciled against the header's (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCountStrategy {
    /// Pass the row through unchanged, regardless of length. Array shape only.
    Keep,
    /// Pad short rows with absent values; truncate long rows.
    Pad,
    /// Leave short rows short; truncate long rows.
    Truncate,
    /// Fail `ColumnCountMismatch` unless the row's length equals the header's.
    Strict,
}

impl ColumnCountStrategy {
    fn default_for(shape: OutputShape) -> Self {
        match shape {
            OutputShape::Object => ColumnCountStrategy::Pad,
            OutputShape::Array => ColumnCountStrategy::Keep,
        }
    }
}

/// Options for a lexer (scalar or byte-indexer), §4.2.
#[derive(Clone)]
pub struct LexerOptions {
    pub delimiter: String,
    pub quotation: String,
    pub track_location: bool,
    pub max_buffer_size: usize,
    pub signal: Option<SharedSignal>,
    pub source: Option<String>,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quotation: "\"".to_string(),
            track_location: false,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            signal: None,
            source: None,
        }
    }
}

impl LexerOptions {
    /// Validates the option set shared by every lexer implementation.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::InvalidOption {
                reason: "delimiter must not be empty".to_string(),
            });
        }
        if self.quotation.chars().count() != 1 {
            return Err(Error::InvalidOption {
                reason: "quotation must be exactly one character".to_string(),
            });
        }
        if self.delimiter == self.quotation {
            return Err(Error::InvalidOption {
                reason: "delimiter and quotation must differ".to_string(),
            });
        }
        if self.max_buffer_size == 0 {
            return Err(Error::InvalidOption {
                reason: "max_buffer_size must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Validates the additional restriction the byte-indexer fast path
    /// imposes: the delimiter must be exactly one byte (§4.2, §9).
    pub fn validate_for_indexed(&self) -> Result<()> {
        self.validate()?;
        if self.delimiter.len() != 1 {
            return Err(Error::InvalidOption {
                reason: "the byte-indexer lexer requires a single-byte delimiter".to_string(),
            });
        }
        if self.quotation.len() != 1 {
            return Err(Error::InvalidOption {
                reason: "the byte-indexer lexer requires an ASCII quotation mark".to_string(),
            });
        }
        Ok(())
    }
}

/// Options for the record assembler, §4.3.
#[derive(Clone)]
pub struct AssemblerOptions {
    pub header: Option<Vec<String>>,
    pub output_shape: OutputShape,
    pub column_count_strategy: Option<ColumnCountStrategy>,
    pub skip_empty_lines: bool,
    pub include_header_row: bool,
    pub max_field_count: usize,
    pub signal: Option<SharedSignal>,
    pub source: Option<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            header: None,
            output_shape: OutputShape::default(),
            column_count_strategy: None,
            skip_empty_lines: false,
            include_header_row: false,
            max_field_count: DEFAULT_MAX_FIELD_COUNT,
            signal: None,
            source: None,
        }
    }
}

impl AssemblerOptions {
    /// Resolves `column_count_strategy` to its shape-dependent default and
    /// validates every cross-field constraint in §4.3/§7.
    pub fn validate(&self) -> Result<ColumnCountStrategy> {
        if self.max_field_count == 0 {
            return Err(Error::InvalidOption {
                reason: "max_field_count must be positive".to_string(),
            });
        }

        let strategy = self
            .column_count_strategy
            .unwrap_or_else(|| ColumnCountStrategy::default_for(self.output_shape));

        if self.output_shape == OutputShape::Object && strategy == ColumnCountStrategy::Keep {
            return Err(Error::InvalidOption {
                reason: "object-shape output does not support the Keep column-count strategy"
                    .to_string(),
            });
        }

        if self.include_header_row && self.output_shape == OutputShape::Object {
            return Err(Error::InvalidOption {
                reason: "include_header_row is only meaningful for array-shape output"
                    .to_string(),
            });
        }

        if let Some(header) = &self.header {
            if header.len() > self.max_field_count {
                return Err(Error::InvalidOption {
                    reason: format!(
                        "header has {} fields, exceeding max_field_count of {}",
                        header.len(),
                        self.max_field_count
                    ),
                });
            }

            let is_headerless = header.is_empty();
            if is_headerless {
                if self.output_shape != OutputShape::Array {
                    return Err(Error::InvalidOption {
                        reason: "an empty header (headerless mode) requires array-shape output"
                            .to_string(),
                    });
                }
                if strategy != ColumnCountStrategy::Keep {
                    return Err(Error::InvalidOption {
                        reason: "headerless mode requires the Keep column-count strategy"
                            .to_string(),
                    });
                }
            } else if self.output_shape == OutputShape::Object {
                validate_object_header(header, self.source.as_deref())?;
            }
        }

        Ok(strategy)
    }
}

/// Validates a header for object-shape output: non-empty, no duplicates
/// (§4.3 header resolution, §7 `EmptyHeader`/`DuplicateHeader`).
pub fn validate_object_header(header: &[String], source: Option<&str>) -> Result<()> {
    if header.is_empty() {
        return Err(Error::EmptyHeader { source_label: source.map(str::to_string) });
    }
    let mut seen = std::collections::HashSet::with_capacity(header.len());
    for entry in header {
        if !seen.insert(entry.as_str()) {
            return Err(Error::DuplicateHeader {
                entry: entry.clone(),
                source_label: source.map(str::to_string),
            });
        }
    }
    Ok(())
}

/// Options for the binary decoder, §4.1.
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// An IANA charset label understood by `encoding_rs`, e.g. `"utf-8"`.
    pub charset: String,
    /// Fail on invalid byte sequences rather than substituting U+FFFD.
    pub fatal: bool,
    /// Strip a leading byte-order mark on the very first chunk.
    pub strip_bom: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            charset: "utf-8".to_string(),
            fatal: false,
            strip_bom: true,
        }
    }
}

impl DecoderOptions {
    /// Resolves `charset` to an `encoding_rs::Encoding`, failing
    /// `InvalidOption` for unrecognized labels.
    pub fn resolve_encoding(&self) -> Result<&'static encoding_rs::Encoding> {
        encoding_rs::Encoding::for_label(self.charset.as_bytes()).ok_or_else(|| {
            Error::InvalidOption {
                reason: format!("unrecognized charset {:?}", self.charset),
            }
        })
    }
}
