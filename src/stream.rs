//! The async façade over a [`Pipeline`] (§4.5).
//!
//! Implements `futures_core::Stream` by hand rather than pulling in the
//! `futures`/`tokio` ecosystem crates, matching the teacher's own choice of
//! the bare `futures-core` crate for its WASM stream plumbing rather than a
//! full async runtime dependency.
//!
//! Holds no queue beyond `Pipeline`'s own buffered records and whatever one
//! upstream chunk is currently in flight (§5's memory-bound guarantee).

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::pipeline::Pipeline;
use crate::record::Record;

/// Wraps an upstream byte-chunk stream and a [`Pipeline`] into one
/// `Stream<Item = Result<Record, Error>>`.
///
/// `S` yields raw byte chunks rather than already-decoded text, so this
/// drives the pipeline through [`Pipeline::feed_bytes`], letting the
/// configured [`crate::decoder::Decoder`] handle charset conversion.
pub struct PollPipeline<L: Lexer, S> {
    pipeline: Pipeline<L>,
    inner: S,
    buffered: VecDeque<Record>,
    inner_done: bool,
}

impl<L: Lexer, S> PollPipeline<L, S> {
    pub fn new(pipeline: Pipeline<L>, inner: S) -> Self {
        Self {
            pipeline,
            inner,
            buffered: VecDeque::new(),
            inner_done: false,
        }
    }
}

impl<L, S> Stream for PollPipeline<L, S>
where
    L: Lexer + Unpin,
    S: Stream<Item = Result<Vec<u8>>> + Unpin,
{
    type Item = Result<Record>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(record) = this.buffered.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }
            if this.inner_done {
                return Poll::Ready(None);
            }
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.inner_done = true;
                    match this.pipeline.flush() {
                        Ok(records) => {
                            this.buffered.extend(records);
                            continue;
                        }
                        Err(err) => return Poll::Ready(Some(Err(err))),
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    this.inner_done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(Some(Ok(bytes))) => match this.pipeline.feed_bytes(&bytes) {
                    Ok(records) => {
                        this.buffered.extend(records);
                        continue;
                    }
                    Err(err) => {
                        this.inner_done = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                },
            }
        }
    }
}

impl<L: Lexer> Pipeline<L> {
    /// Adapts this pipeline into an async [`Stream`] of [`Record`]s, driven
    /// by polling `inner` for raw byte chunks.
    pub fn into_stream<S>(self, inner: S) -> PollPipeline<L, S>
    where
        S: Stream<Item = Result<Vec<u8>>>,
    {
        PollPipeline::new(self, inner)
    }
}
