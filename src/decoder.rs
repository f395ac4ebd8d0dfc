//! Maps byte chunks to character chunks for the binary input path (§4.1).
//!
//! Delegates the actual charset/BOM handling to `encoding_rs`, which already
//! buffers an incomplete trailing multi-byte sequence internally across
//! calls — the same carry-over the teacher's `find_utf8_boundary`/
//! `utf8_buffer` hand-rolled for the UTF-8-only case.

use encoding_rs::{CoderResult, Decoder as InnerDecoder, DecoderResult, Encoding};

use crate::error::{Error, Result};
use crate::options::DecoderOptions;

/// Maps a byte stream to a character stream, one chunk at a time.
pub struct Decoder {
    inner: InnerDecoder,
    fatal: bool,
    charset_label: String,
}

impl Decoder {
    /// Builds a decoder from validated options (§4.1).
    pub fn new(options: &DecoderOptions) -> Result<Self> {
        let encoding = options.resolve_encoding()?;
        let inner = if options.strip_bom {
            encoding.new_decoder_with_bom_removal()
        } else {
            encoding.new_decoder_without_bom_handling()
        };
        Ok(Self {
            inner,
            fatal: options.fatal,
            charset_label: options.charset.clone(),
        })
    }

    /// Decodes one chunk of bytes. `stream = true` means more bytes may
    /// follow; a trailing incomplete multi-byte sequence is held internally
    /// and prepended to the next call. `stream = false` is the flush call:
    /// a trailing incomplete sequence is an `InvalidEncoding` error.
    pub fn feed(&mut self, bytes: &[u8], stream: bool) -> Result<String> {
        if bytes.is_empty() && stream {
            // Touching the decoder here would let it sniff/consume a BOM on
            // an empty chunk; the contract requires leaving BOM state alone.
            return Ok(String::new());
        }

        let last = !stream;
        let mut output = String::with_capacity(bytes.len());

        if self.fatal {
            let mut input = bytes;
            loop {
                let (result, read) =
                    self.inner.decode_to_string_without_replacement(input, &mut output, last);
                match result {
                    DecoderResult::InputEmpty => break,
                    DecoderResult::OutputFull => {
                        output.reserve(input.len().saturating_sub(read).max(64));
                        input = &input[read..];
                    }
                    DecoderResult::Malformed(_, _) => {
                        return Err(Error::InvalidEncoding {
                            charset: self.charset_label.clone(),
                            source_label: None,
                        });
                    }
                }
            }
        } else {
            let mut input = bytes;
            loop {
                let (result, read, _had_replacements) =
                    self.inner.decode_to_string(input, &mut output, last);
                match result {
                    CoderResult::InputEmpty => break,
                    CoderResult::OutputFull => {
                        output.reserve(input.len().saturating_sub(read).max(64));
                        input = &input[read..];
                    }
                }
            }
        }

        Ok(output)
    }
}
