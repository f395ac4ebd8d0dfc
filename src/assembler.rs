//! Turns a token stream into records: header resolution, column-count
//! reconciliation, empty-line policy, field-count enforcement (§4.3).
//!
//! Grounded on the teacher's `CSVRecordAssemblerLegacy`: the field-index
//! cursor, the delimiter pre-seeding the next field slot, and "no resize on
//! `RecordDelimiter`, so a short row leaves trailing positions absent" are
//! all carried over verbatim from `process_token`. Reworked from an
//! always-object-shape, untyped-JS-value assembler into one that also
//! builds array-shape records and enforces the four column-count
//! strategies.

use indexmap::IndexMap;
use log::trace;

use crate::error::{Error, Result};
use crate::options::{AssemblerOptions, ColumnCountStrategy, OutputShape};
use crate::record::Record;
use crate::token::Token;

enum HeaderState {
    /// Caller supplied a header; data emission starts immediately.
    Resolved(Vec<String>),
    /// A non-empty header will be inferred from the first record.
    Pending,
    /// Caller supplied an empty header: headerless array mode, every
    /// record (including the first) is data.
    Headerless,
}

pub struct Assembler {
    header: HeaderState,
    output_shape: OutputShape,
    column_count_strategy: ColumnCountStrategy,
    skip_empty_lines: bool,
    include_header_row: bool,
    max_field_count: usize,
    options: AssemblerOptions,
    row_number: usize,
    current: Vec<Option<String>>,
    field_index: usize,
    header_row_emitted: bool,
    poisoned: Option<Error>,
}

impl Assembler {
    pub fn new(options: AssemblerOptions) -> Result<Self> {
        let column_count_strategy = options.validate()?;
        let header = match &options.header {
            None => HeaderState::Pending,
            Some(h) if h.is_empty() => HeaderState::Headerless,
            Some(h) => HeaderState::Resolved(h.clone()),
        };
        Ok(Self {
            header,
            output_shape: options.output_shape,
            column_count_strategy,
            skip_empty_lines: options.skip_empty_lines,
            include_header_row: options.include_header_row,
            max_field_count: options.max_field_count,
            options,
            row_number: 0,
            current: Vec::new(),
            field_index: 0,
            header_row_emitted: false,
            poisoned: None,
        })
    }

    /// Consumes tokens in order, returning every record whose terminator has
    /// arrived. Once a call fails, every subsequent call re-raises the same
    /// error rather than resuming against half-built state (§4.3).
    pub fn assemble(&mut self, tokens: &[Token]) -> Result<Vec<Record>> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        match self.assemble_inner(tokens) {
            Ok(records) => Ok(records),
            Err(err) => {
                self.poisoned = Some(err.clone());
                Err(err)
            }
        }
    }

    fn assemble_inner(&mut self, tokens: &[Token]) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for token in tokens {
            if let Some(signal) = &self.options.signal {
                if let Some(reason) = signal.reason() {
                    return Err(Error::Cancelled { reason });
                }
            }
            match token {
                Token::Field { value, .. } => self.set_current_field(value.clone())?,
                Token::FieldDelimiter { .. } => self.advance_field()?,
                Token::RecordDelimiter { row_number, .. } => {
                    self.row_number = *row_number;
                    records.extend(self.finish_record()?);
                }
            }
        }
        Ok(records)
    }

    fn set_current_field(&mut self, value: String) -> Result<()> {
        self.ensure_slot(self.field_index)?;
        self.current[self.field_index] = Some(value);
        Ok(())
    }

    fn advance_field(&mut self) -> Result<()> {
        self.ensure_slot(self.field_index)?;
        self.field_index += 1;
        self.ensure_slot(self.field_index)?;
        Ok(())
    }

    fn ensure_slot(&mut self, index: usize) -> Result<()> {
        if index >= self.max_field_count {
            return Err(Error::FieldCountExceeded {
                row_number: self.row_number + 1,
                limit: self.max_field_count,
                source_label: self.options.source.clone(),
            });
        }
        if index >= self.current.len() {
            self.current.resize(index + 1, None);
        }
        Ok(())
    }

    /// Closes the current record at a `RecordDelimiter` and, depending on
    /// whether the header is still pending, either captures it as the
    /// header or reconciles and emits it as a data record.
    fn finish_record(&mut self) -> Result<Vec<Record>> {
        let fields = std::mem::take(&mut self.current);
        self.field_index = 0;

        match &self.header {
            HeaderState::Pending => {
                let header: Vec<String> = fields
                    .into_iter()
                    .map(|f| f.unwrap_or_default())
                    .collect();
                if self.output_shape == OutputShape::Object {
                    crate::options::validate_object_header(&header, self.options.source.as_deref())?;
                }
                trace!("resolved inferred header with {} columns at row {}", header.len(), self.row_number);
                self.header = HeaderState::Resolved(header);
                Ok(Vec::new())
            }
            HeaderState::Headerless => self.emit_data_record(&[], fields),
            HeaderState::Resolved(header) => {
                let header = header.clone();
                self.emit_data_record(&header, fields)
            }
        }
    }

    fn emit_data_record(
        &mut self,
        header: &[String],
        fields: Vec<Option<String>>,
    ) -> Result<Vec<Record>> {
        if self.is_headerless() {
            return Ok(vec![Record::Array(fields)]);
        }

        let mut records = Vec::new();
        if self.include_header_row && !self.header_row_emitted {
            self.header_row_emitted = true;
            records.push(Record::Array(
                header.iter().cloned().map(Some).collect(),
            ));
        }

        // A blank input line produces zero tokens between its two
        // `RecordDelimiter`s (the lexer never emits a `Field` for it), so
        // `fields` is empty here rather than containing one empty field.
        // Normalize both shapes to "one conceptual empty field" up front so
        // the column-count strategies below don't need to special-case length.
        let is_single_empty_field = fields.is_empty()
            || (fields.len() == 1
                && fields[0].as_deref().unwrap_or("").is_empty());
        let fields = if fields.is_empty() { vec![None] } else { fields };
        if is_single_empty_field && self.skip_empty_lines {
            return Ok(records);
        }

        let reconciled = self.reconcile_columns(header.len(), fields, is_single_empty_field)?;
        records.push(self.build_record(header, reconciled));
        Ok(records)
    }

    fn is_headerless(&self) -> bool {
        matches!(self.header, HeaderState::Headerless)
    }

    fn reconcile_columns(
        &self,
        header_len: usize,
        mut fields: Vec<Option<String>>,
        is_single_empty_field: bool,
    ) -> Result<Vec<Option<String>>> {
        let record_len = fields.len();
        match self.column_count_strategy {
            ColumnCountStrategy::Keep => {
                if is_single_empty_field {
                    return Ok(vec![Some(String::new())]);
                }
                Ok(fields)
            }
            ColumnCountStrategy::Pad => {
                if is_single_empty_field && self.output_shape == OutputShape::Object {
                    return Ok(vec![Some(String::new()); header_len]);
                }
                if record_len < header_len {
                    fields.resize(header_len, None);
                } else if record_len > header_len {
                    fields.truncate(header_len);
                }
                Ok(fields)
            }
            ColumnCountStrategy::Truncate => {
                if record_len > header_len {
                    fields.truncate(header_len);
                }
                Ok(fields)
            }
            ColumnCountStrategy::Strict => {
                if record_len != header_len {
                    return Err(Error::ColumnCountMismatch {
                        header_len,
                        record_len,
                        row_number: self.row_number,
                        source_label: self.options.source.clone(),
                    });
                }
                Ok(fields)
            }
        }
    }

    fn build_record(&self, header: &[String], fields: Vec<Option<String>>) -> Record {
        match self.output_shape {
            OutputShape::Array => Record::Array(fields),
            OutputShape::Object => {
                let mut map = IndexMap::with_capacity(header.len());
                for (key, value) in header.iter().zip(
                    fields
                        .into_iter()
                        .chain(std::iter::repeat(None)),
                ) {
                    map.insert(key.clone(), value);
                }
                Record::Object(map)
            }
        }
    }
}
