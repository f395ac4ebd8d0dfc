//! The public `(lexer, assembler)` pair as one object (§4.4).
//!
//! Grounded on the teacher's top-level `CSVStreamParser` (the wasm-bindgen
//! façade that owned one lexer and one assembler and forwarded `parseChunk`/
//! `parseEnd` to them in turn) with the JS value marshalling stripped out
//! and the `cancel` operation — absent from the teacher, since JS abort
//! signals were handled entirely on the TypeScript side — added directly.

use crate::assembler::Assembler;
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::options::{AssemblerOptions, DecoderOptions};
use crate::record::Record;
use crate::signal::CancelReason;

/// Combines a lexer and an assembler into the three operations described in
/// §4.4: `feed`, `flush`, `cancel`. Generic over the lexer implementation so
/// [`crate::lexer::ScalarLexer`] and [`crate::lexer::IndexedLexer`] are
/// interchangeable here.
pub struct Pipeline<L: Lexer> {
    lexer: L,
    assembler: Assembler,
    decoder: Decoder,
    cancelled: Option<CancelReason>,
    spent: bool,
}

impl<L: Lexer> Pipeline<L> {
    /// Builds a pipeline from an already-constructed lexer and assembler
    /// options. Binary input decodes with `DecoderOptions::default()`; use
    /// [`Pipeline::with_decoder`] to customize charset handling.
    pub fn new(lexer: L, assembler_options: AssemblerOptions) -> Result<Self> {
        Self::with_decoder(lexer, assembler_options, DecoderOptions::default())
    }

    pub fn with_decoder(
        lexer: L,
        assembler_options: AssemblerOptions,
        decoder_options: DecoderOptions,
    ) -> Result<Self> {
        Ok(Self {
            lexer,
            assembler: Assembler::new(assembler_options)?,
            decoder: Decoder::new(&decoder_options)?,
            cancelled: None,
            spent: false,
        })
    }

    /// Feeds one chunk of already-decoded text. Non-blocking; returns every
    /// record that became available. Fails `Error::Cancelled` once the
    /// pipeline is spent (§3 lifecycle) — unlike `flush`, re-use after
    /// completion is not supported.
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<Record>> {
        self.check_spent()?;
        self.check_cancelled()?;
        let tokens = self.lexer.feed(chunk)?;
        self.assembler.assemble(&tokens)
    }

    /// Feeds one chunk of raw bytes, decoding it with the configured
    /// charset before lexing (§4.1). Terminal once spent, like `feed`.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Vec<Record>> {
        self.check_spent()?;
        self.check_cancelled()?;
        let text = self.decoder.feed(bytes, true)?;
        let tokens = self.lexer.feed(&text)?;
        self.assembler.assemble(&tokens)
    }

    /// Signals end of input. Idempotent: once spent, every further call
    /// returns an empty, successful result rather than an error — `flush`
    /// is the one operation allowed to be harmless after completion
    /// (Testable Property 6); `feed`/`feed_bytes` are terminal instead.
    pub fn flush(&mut self) -> Result<Vec<Record>> {
        if self.spent {
            return Ok(Vec::new());
        }
        self.check_cancelled()?;
        // Finalizes any decoder state even for a text-only pipeline, where
        // this is a no-op against an untouched decoder.
        self.decoder.feed(&[], false)?;
        let tokens = self.lexer.flush()?;
        let records = self.assembler.assemble(&tokens)?;
        self.spent = true;
        Ok(records)
    }

    /// Wires a cancellation reason. The next `feed`/`feed_bytes`/`flush`
    /// raises `Error::Cancelled` with this reason instead of doing any
    /// further work.
    pub fn cancel(&mut self, reason: CancelReason) {
        self.cancelled = Some(reason);
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    fn check_cancelled(&self) -> Result<()> {
        if let Some(reason) = &self.cancelled {
            return Err(Error::Cancelled { reason: reason.clone() });
        }
        Ok(())
    }

    fn check_spent(&self) -> Result<()> {
        if self.spent {
            return Err(Error::Cancelled { reason: CancelReason::StreamSpent });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::ScalarLexer;
    use crate::options::LexerOptions;
    use crate::record::Record;

    fn pipeline() -> Pipeline<ScalarLexer> {
        let lexer = ScalarLexer::new(LexerOptions::default()).unwrap();
        Pipeline::new(lexer, AssemblerOptions::default()).unwrap()
    }

    #[test]
    fn feed_then_flush_yields_all_records() {
        let mut pipeline = pipeline();
        let mut records = pipeline.feed("a,b\n1,2\n").unwrap();
        records.extend(pipeline.flush().unwrap());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn flush_is_idempotent_and_harmless_after_spent() {
        let mut pipeline = pipeline();
        pipeline.feed("a,b\n1,2\n").unwrap();
        pipeline.flush().unwrap();
        assert!(pipeline.is_spent());
        assert_eq!(pipeline.flush().unwrap(), Vec::<Record>::new());
        assert!(matches!(
            pipeline.feed("3,4\n"),
            Err(Error::Cancelled { reason: CancelReason::StreamSpent })
        ));
    }

    #[test]
    fn cancel_fails_the_next_call() {
        let mut pipeline = pipeline();
        pipeline.cancel(CancelReason::Timeout);
        assert!(matches!(pipeline.feed("a,b\n"), Err(Error::Cancelled { .. })));
    }

    #[test]
    fn feed_bytes_decodes_before_lexing() {
        let mut pipeline = pipeline();
        let mut records = pipeline.feed_bytes("a,b\n1,2\n".as_bytes()).unwrap();
        records.extend(pipeline.flush().unwrap());
        assert_eq!(records.len(), 1);
    }
}
