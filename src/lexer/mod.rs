//! Two interchangeable lexer implementations sharing one contract (§4.2).
//!
//! [`scalar::ScalarLexer`] is the reference implementation: a character-level
//! state machine, grounded on the teacher's `BinaryCSVLexerLegacy`.
//! [`indexed::IndexedLexer`] is the accelerated byte-indexer fast path,
//! grounded on the teacher's `parser/parse.rs` and `simd/scanner.rs`; it
//! trades the single-byte-delimiter/single-byte-quote restriction for raw
//! throughput via `memchr`.
//!
//! Both emit the same [`crate::token::Token`] stream for the same logical
//! input, chunked any way at all (Testable Property 8).

pub mod indexed;
pub mod scalar;
mod separator;

pub use indexed::IndexedLexer;
pub use scalar::ScalarLexer;

use crate::error::Result;
use crate::token::Token;

/// The contract both lexer implementations satisfy: feed chunks, get back
/// every token whose boundary is certain, then flush once at end of input.
pub trait Lexer {
    fn feed(&mut self, chunk: &str) -> Result<Vec<Token>>;
    fn flush(&mut self) -> Result<Vec<Token>>;
}

impl Lexer for ScalarLexer {
    fn feed(&mut self, chunk: &str) -> Result<Vec<Token>> {
        ScalarLexer::feed(self, chunk)
    }

    fn flush(&mut self) -> Result<Vec<Token>> {
        ScalarLexer::flush(self)
    }
}

impl Lexer for IndexedLexer {
    fn feed(&mut self, chunk: &str) -> Result<Vec<Token>> {
        IndexedLexer::feed(self, chunk)
    }

    fn flush(&mut self) -> Result<Vec<Token>> {
        IndexedLexer::flush(self)
    }
}
