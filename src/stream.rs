//! Chunked record reader
//!
//! [`Chunks`] pulls input from any [`BufRead`] one buffer at a time, runs it
//! through the tokenizer and yields batches of `chunk_size` records. Neither
//! the input nor the full document is ever held in memory at once: each read
//! is bounded by the reader's buffer, whatever record terminators are used.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crate::error::{CsvError, Result};
use crate::parser::{Document, Record, Tokenizer, TypedDocument};
use crate::value::infer_record;

/// Lazy, fused sequence of record batches
///
/// Each item holds exactly `chunk_size` records except possibly the last.
/// A parse or read error is yielded after every complete record preceding
/// it, and ends the sequence.
#[derive(Debug)]
pub struct Chunks<R> {
    reader: R,
    tokenizer: Tokenizer,
    chunk_size: usize,
    pending: VecDeque<Record>,
    /// Bytes read but not yet fed: at most an incomplete UTF-8 sequence
    /// carried over from the previous buffer, plus the current buffer.
    carry: Vec<u8>,
    exhausted: bool,
    error: Option<CsvError>,
    emitted: usize,
}

impl<R: BufRead> Chunks<R> {
    /// Fails with `InvalidArgument` when `chunk_size` is zero
    pub fn new(reader: R, chunk_size: usize, trim: bool) -> Result<Self> {
        check_chunk_size(chunk_size)?;

        Ok(Self {
            reader,
            tokenizer: Tokenizer::new(trim),
            chunk_size,
            pending: VecDeque::with_capacity(chunk_size),
            carry: Vec::new(),
            exhausted: false,
            error: None,
            emitted: 0,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Classify every field of every chunk
    pub fn typed(self) -> impl Iterator<Item = Result<TypedDocument>> {
        self.map(|chunk| chunk.map(|records| records.into_iter().map(infer_record).collect()))
    }

    /// Read and tokenize the next buffer of input
    fn fill(&mut self) {
        let available = match self.reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return,
            Err(e) => {
                self.fail(map_read_error(e));
                return;
            }
        };

        if available.is_empty() {
            if !self.carry.is_empty() {
                self.fail(CsvError::Encoding(
                    "input ends inside a UTF-8 sequence".to_string(),
                ));
                return;
            }
            self.exhausted = true;
            match self.tokenizer.finish() {
                Ok(Some(record)) => self.pending.push_back(record),
                Ok(None) => {}
                Err(e) => self.error = Some(e),
            }
            return;
        }

        let len = available.len();
        self.carry.extend_from_slice(available);
        self.reader.consume(len);

        let (valid, invalid) = match std::str::from_utf8(&self.carry) {
            Ok(_) => (self.carry.len(), false),
            Err(e) => (e.valid_up_to(), e.error_len().is_some()),
        };

        if let Ok(text) = std::str::from_utf8(&self.carry[..valid]) {
            let pending = &mut self.pending;
            self.tokenizer.feed(text, |record| pending.push_back(record));
        }
        self.carry.drain(..valid);

        if invalid {
            self.fail(CsvError::Encoding("input is not valid UTF-8".to_string()));
        }
    }

    fn fail(&mut self, error: CsvError) {
        self.exhausted = true;
        self.error = Some(error);
    }

    fn take_chunk(&mut self, len: usize) -> Document {
        let chunk: Document = self.pending.drain(..len).collect();
        self.emitted += 1;
        tracing::trace!(
            chunk = self.emitted,
            records = chunk.len(),
            line = self.tokenizer.line(),
            "emitting chunk"
        );
        chunk
    }
}

pub(crate) fn check_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size < 1 {
        return Err(CsvError::InvalidArgument(format!(
            "chunk size must be at least 1, got {}",
            chunk_size
        )));
    }
    Ok(())
}

fn map_read_error(e: io::Error) -> CsvError {
    if e.kind() == io::ErrorKind::InvalidData {
        CsvError::Encoding(e.to_string())
    } else {
        CsvError::Io(e)
    }
}

impl<R: BufRead> Iterator for Chunks<R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending.len() >= self.chunk_size {
                return Some(Ok(self.take_chunk(self.chunk_size)));
            }

            if self.exhausted {
                if !self.pending.is_empty() {
                    let len = self.pending.len();
                    return Some(Ok(self.take_chunk(len)));
                }
                return self.error.take().map(Err);
            }

            self.fill();
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for Chunks<R> {}

/// Chunk in-memory CSV text
pub fn stream_str(text: &str, chunk_size: usize, trim: bool) -> Result<Chunks<&[u8]>> {
    Chunks::new(text.as_bytes(), chunk_size, trim)
}
