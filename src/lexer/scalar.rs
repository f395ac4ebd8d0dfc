//! The reference scalar lexer: a character-level state machine (§4.2).
//!
//! Grounded on the teacher's `BinaryCSVLexerLegacy::process_text`, reworked
//! from a byte/JS-value state machine into an owned-`Token` one that can
//! suspend mid-field across an arbitrary chunk boundary and resume without
//! re-reading anything it already committed to a token.
//!
//! The buffer holds only *unconsumed* characters (§3's "accumulated but not
//! yet tokenized input"); every rule below operates on `self.buffer[0..]`
//! and drains what it consumes before returning.

use crate::error::{Error, Position, Result};
use crate::options::LexerOptions;
use crate::signal::CancelReason;
use crate::token::{Location, RecordDelimiterKind, Token};

enum PrefixMatch {
    Yes(usize),
    No,
    Ambiguous,
}

pub struct ScalarLexer {
    delimiter_chars: Vec<char>,
    quote_char: char,
    track_location: bool,
    max_buffer_size: usize,
    options: LexerOptions,
    buffer: Vec<char>,
    position: Position,
    row_number: usize,
    /// True once a `Field` or `FieldDelimiter` has been emitted without a
    /// following `RecordDelimiter` yet — tracks whether `flush` owes the
    /// caller a synthetic final `RecordDelimiter` (§6).
    pending_record: bool,
}

impl ScalarLexer {
    pub fn new(options: LexerOptions) -> Result<Self> {
        options.validate()?;
        let delimiter_chars = options.delimiter.chars().collect();
        let quote_char = options.quotation.chars().next().expect("validated non-empty");
        Ok(Self {
            delimiter_chars,
            quote_char,
            track_location: options.track_location,
            max_buffer_size: options.max_buffer_size,
            options,
            buffer: Vec::new(),
            position: Position::start(),
            row_number: 1,
            pending_record: false,
        })
    }

    /// Appends one chunk of characters and returns every token whose
    /// boundary is now certain.
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<Token>> {
        self.buffer.extend(chunk.chars());
        if self.buffer.len() > self.max_buffer_size {
            return Err(Error::BufferOverflow {
                length: self.buffer.len(),
                limit: self.max_buffer_size,
                source_label: self.options.source.clone(),
            });
        }
        self.drain_tokens(false)
    }

    /// Signals end of input: emits the final unterminated field (if any) and
    /// a synthetic trailing `RecordDelimiter` (if a record was left open),
    /// or fails `UnterminatedQuotedField` if a quoted field never closed.
    /// Idempotent — a second call returns an empty `Vec`.
    pub fn flush(&mut self) -> Result<Vec<Token>> {
        let mut tokens = self.drain_tokens(true)?;
        debug_assert!(self.buffer.is_empty());
        if self.pending_record {
            let row_number = self.row_number;
            self.row_number += 1;
            self.pending_record = false;
            tokens.push(Token::RecordDelimiter {
                kind: RecordDelimiterKind::Lf,
                location: None,
                row_number,
            });
        }
        Ok(tokens)
    }

    fn drain_tokens(&mut self, final_call: bool) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            if let Some(signal) = &self.options.signal {
                if let Some(reason) = signal.reason() {
                    return Err(Error::Cancelled { reason });
                }
            }
            match self.step(final_call)? {
                Some(token) => {
                    match &token {
                        Token::Field { .. } | Token::FieldDelimiter { .. } => {
                            self.pending_record = true;
                        }
                        Token::RecordDelimiter { .. } => {
                            self.pending_record = false;
                        }
                    }
                    tokens.push(token);
                }
                None => break,
            }
        }
        Ok(tokens)
    }

    fn consume(&mut self, n: usize) {
        self.buffer.drain(..n);
    }

    fn advance_over(&mut self, chars: &[char]) -> Position {
        let start = self.position;
        for &ch in chars {
            self.position.advance(ch);
        }
        start
    }

    fn location_for(&self, start: Position) -> Option<Location> {
        self.track_location.then(|| Location {
            start,
            end: self.position,
            row_number: self.row_number,
        })
    }

    /// Tries to produce exactly one token from the front of the buffer.
    /// `Ok(None)` means "need more input"; only returned when `final_call`
    /// is false, since a final call always resolves every ambiguity.
    fn step(&mut self, final_call: bool) -> Result<Option<Token>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        // Rule 1/2: CRLF or bare LF starting a record delimiter. A bare CR
        // not itself followed by LF is ordinary field content (falls through
        // to rule 5 below).
        if self.buffer[0] == '\r' {
            if self.buffer.len() >= 2 {
                if self.buffer[1] == '\n' {
                    return Ok(Some(self.emit_record_delimiter(RecordDelimiterKind::CrLf, 2)));
                }
            } else if !final_call {
                return Ok(None);
            }
        } else if self.buffer[0] == '\n' {
            return Ok(Some(self.emit_record_delimiter(RecordDelimiterKind::Lf, 1)));
        }

        // Rule 3: field delimiter.
        match self.match_delimiter_at(0, final_call) {
            PrefixMatch::Yes(len) => return Ok(Some(self.emit_field_delimiter(len))),
            PrefixMatch::Ambiguous => return Ok(None),
            PrefixMatch::No => {}
        }

        // Rule 4: quotation opens a quoted field.
        if self.buffer[0] == self.quote_char {
            return self.scan_quoted_field(final_call);
        }

        // Rule 5: run of ordinary field characters.
        self.scan_unquoted_field(final_call)
    }

    fn emit_record_delimiter(&mut self, kind: RecordDelimiterKind, len: usize) -> Token {
        let chars: Vec<char> = self.buffer[..len].to_vec();
        let start = self.advance_over(&chars);
        let location = self.location_for(start);
        let row_number = self.row_number;
        self.row_number += 1;
        self.consume(len);
        Token::RecordDelimiter { kind, location, row_number }
    }

    fn emit_field_delimiter(&mut self, len: usize) -> Token {
        let chars: Vec<char> = self.buffer[..len].to_vec();
        let start = self.advance_over(&chars);
        let location = self.location_for(start);
        self.consume(len);
        Token::FieldDelimiter { location }
    }

    /// Consumes the run of characters until the next delimiter, quotation,
    /// LF, CR-followed-by-LF, or (only when `final_call`) end of buffer.
    fn scan_unquoted_field(&mut self, final_call: bool) -> Result<Option<Token>> {
        let mut i = 0usize;
        loop {
            if i >= self.buffer.len() {
                if final_call {
                    break;
                }
                return Ok(None);
            }
            let c = self.buffer[i];
            if c == self.quote_char || c == '\n' {
                break;
            }
            if c == '\r' {
                if i + 1 < self.buffer.len() {
                    if self.buffer[i + 1] == '\n' {
                        break;
                    }
                    i += 1;
                    continue;
                }
                if final_call {
                    i += 1;
                    break;
                }
                return Ok(None);
            }
            match self.match_delimiter_at(i, final_call) {
                PrefixMatch::Yes(_) => break,
                PrefixMatch::No => i += 1,
                PrefixMatch::Ambiguous => return Ok(None),
            }
        }

        let chars: Vec<char> = self.buffer[..i].to_vec();
        let value: String = chars.iter().collect();
        let start = self.advance_over(&chars);
        let location = self.location_for(start);
        self.consume(i);
        Ok(Some(Token::Field { value, location }))
    }

    fn match_delimiter_at(&self, offset: usize, final_call: bool) -> PrefixMatch {
        let pat = &self.delimiter_chars;
        let remaining = &self.buffer[offset..];
        if remaining.len() < pat.len() {
            if final_call {
                return PrefixMatch::No;
            }
            if remaining.iter().zip(pat.iter()).all(|(a, b)| a == b) {
                return PrefixMatch::Ambiguous;
            }
            return PrefixMatch::No;
        }
        if &remaining[..pat.len()] == pat.as_slice() {
            PrefixMatch::Yes(pat.len())
        } else {
            PrefixMatch::No
        }
    }

    /// Consumes an opening quote, its content (with `""` collapsing to a
    /// literal `"`), and its closing quote.
    fn scan_quoted_field(&mut self, final_call: bool) -> Result<Option<Token>> {
        let opening_position = self.position;
        let mut i = 1usize;
        let mut value = String::new();
        loop {
            if i >= self.buffer.len() {
                if final_call {
                    return Err(Error::UnterminatedQuotedField {
                        position: opening_position,
                        source_label: self.options.source.clone(),
                    });
                }
                return Ok(None);
            }
            let c = self.buffer[i];
            if c == self.quote_char {
                if i + 1 < self.buffer.len() {
                    if self.buffer[i + 1] == self.quote_char {
                        value.push(self.quote_char);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                if final_call {
                    i += 1;
                    break;
                }
                return Ok(None);
            }
            value.push(c);
            i += 1;
        }

        let chars: Vec<char> = self.buffer[..i].to_vec();
        let start = self.advance_over(&chars);
        let location = self.location_for(start);
        self.consume(i);
        Ok(Some(Token::Field { value, location }))
    }
}
