//! The blocking iterator façade over a [`Pipeline`] (§4.5).
//!
//! Grounded on the teacher's Node.js `Readable`/`Transform` stream wrappers
//! in spirit (pull one upstream chunk, push zero or more downstream
//! records) but expressed as a plain [`Iterator`] adapter, since that is how
//! the pack's non-wasm repos expose synchronous chunked work (e.g. line
//! readers built over `std::io::Lines`).

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::pipeline::Pipeline;
use crate::record::Record;

/// Drives a [`Pipeline`] from a blocking source of text chunks, yielding one
/// [`Record`] at a time. Calls `flush` automatically once the chunk source
/// is exhausted.
pub struct Records<L: Lexer, I> {
    pipeline: Pipeline<L>,
    chunks: I,
    buffered: VecDeque<Record>,
    chunks_done: bool,
}

impl<L: Lexer, I: Iterator<Item = Result<String>>> Records<L, I> {
    pub fn new(pipeline: Pipeline<L>, chunks: I) -> Self {
        Self {
            pipeline,
            chunks,
            buffered: VecDeque::new(),
            chunks_done: false,
        }
    }
}

impl<L: Lexer, I: Iterator<Item = Result<String>>> Iterator for Records<L, I> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffered.pop_front() {
                return Some(Ok(record));
            }
            if self.chunks_done {
                return None;
            }
            match self.chunks.next() {
                None => {
                    self.chunks_done = true;
                    match self.pipeline.flush() {
                        Ok(records) => {
                            self.buffered.extend(records);
                            continue;
                        }
                        Err(err) => return Some(Err(err)),
                    }
                }
                Some(Err(err)) => {
                    self.chunks_done = true;
                    return Some(Err(err));
                }
                Some(Ok(chunk)) => match self.pipeline.feed(&chunk) {
                    Ok(records) => {
                        self.buffered.extend(records);
                        continue;
                    }
                    Err(err) => {
                        self.chunks_done = true;
                        return Some(Err(err));
                    }
                },
            }
        }
    }
}

impl<L: Lexer> Pipeline<L> {
    /// Adapts this pipeline into a blocking [`Iterator`] of [`Record`]s,
    /// pulling chunks from `chunks` until it's exhausted.
    pub fn into_records<I>(self, chunks: I) -> Records<L, I>
    where
        I: Iterator<Item = Result<String>>,
    {
        Records::new(self, chunks)
    }
}
