//! A streaming CSV lexer and record assembler core.
//!
//! The pipeline is two stages: a [`lexer`] turns character or byte chunks
//! into a stream of [`token::Token`]s (field boundaries, record boundaries),
//! and an [`assembler::Assembler`] turns those tokens into [`record::Record`]s
//! against a resolved or inferred header. [`pipeline::Pipeline`] wires the two
//! together behind `feed`/`flush`/`cancel`; [`iter::Records`] and
//! [`stream::PollPipeline`] adapt that into a blocking iterator or an async
//! `Stream` respectively.
//!
//! Two lexer implementations share the [`lexer::Lexer`] trait and are
//! interchangeable: [`lexer::ScalarLexer`] is the reference character-level
//! state machine, and [`lexer::IndexedLexer`] is a `memchr`-accelerated
//! byte-indexer restricted to single-byte delimiters and ASCII quotation.

mod assembler;
mod decoder;
mod error;
mod iter;
mod lexer;
mod options;
mod pipeline;
mod record;
mod signal;
mod stream;
mod token;

#[cfg(test)]
mod tests;

pub use assembler::Assembler;
pub use decoder::Decoder;
pub use error::{Error, Position, Result};
pub use iter::Records;
pub use lexer::{IndexedLexer, Lexer, ScalarLexer};
pub use options::{
    AssemblerOptions, ColumnCountStrategy, DecoderOptions, LexerOptions, OutputShape,
    SharedSignal, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MAX_FIELD_COUNT,
};
pub use pipeline::Pipeline;
pub use record::Record;
pub use signal::{CancelReason, ManualSignal, NeverSignal, Signal};
pub use stream::PollPipeline;
pub use token::{Location, RecordDelimiterKind, Token};
