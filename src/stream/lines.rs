//! Line reassembly over chunked byte streams
//!
//! Decoded chunks arrive with line boundaries falling anywhere, including
//! in the middle of a multi-byte UTF-8 sequence. [`LineAssembler`] keeps a
//! single pending-fragment buffer, splits on `\n` at the byte level, and
//! emits complete right-trimmed lines in arrival order; the final fragment
//! is flushed at stream end. [`LineStream`] drives an assembler from any
//! `Read` as a lazy iterator of lines.

use std::collections::VecDeque;
use std::io::{self, Read};

/// Chunk size used when pulling from the underlying reader
const CHUNK_SIZE: usize = 64 * 1024;

/// Reassembles complete lines from arbitrarily split byte chunks
#[derive(Debug, Default)]
pub struct LineAssembler {
    /// Trailing bytes of the last chunk that did not end in a newline
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line completed by it.
    ///
    /// The split happens on raw bytes before UTF-8 conversion, so a chunk
    /// boundary inside a multi-byte character cannot corrupt the line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            lines.push(to_trimmed_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Flush the final buffered fragment, if any, as one last line
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = to_trimmed_line(&self.pending);
        self.pending.clear();
        Some(line)
    }
}

fn to_trimmed_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Lazy iterator of complete lines over any byte stream.
///
/// Restartable per run (construct a fresh one per sync), not resumable
/// across runs. A read error ends the iteration with that error; no
/// further lines are produced after it.
pub struct LineStream<R: Read> {
    reader: R,
    assembler: LineAssembler,
    ready: VecDeque<String>,
    done: bool,
}

impl<R: Read> LineStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            assembler: LineAssembler::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for LineStream<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }

            let mut buf = [0u8; CHUNK_SIZE];
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    if let Some(last) = self.assembler.finish() {
                        return Some(Ok(last));
                    }
                    return None;
                }
                Ok(n) => {
                    self.ready.extend(self.assembler.push(&buf[..n]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
