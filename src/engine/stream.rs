// src/engine/stream.rs
//
// A reader that can rewind a forward-only stream to a saved position.
//
// Network bodies are not seekable. To sniff the container and to run the
// bounds probe before the full decode, the bytes read after a mark are
// retained (up to a limit) and replayed after `reset`.

use std::io::{self, Read};

/// Forward-only reader with bounded rewind.
///
/// `save_position(limit)` returns an offset and starts retaining the next
/// `limit` bytes. `reset(offset)` rewinds to any retained offset as long as
/// nothing past the retained window has been consumed.
#[derive(Debug)]
pub struct MarkableReader<R> {
    inner: R,
    /// Offset of the next byte handed to the caller.
    offset: u64,
    /// Offset of the next byte `inner` will produce.
    inner_offset: u64,
    /// Retained bytes, starting at `buffer_start`.
    buffer: Vec<u8>,
    buffer_start: u64,
    /// Retention stops at this offset.
    limit: u64,
}

impl<R: Read> MarkableReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            inner_offset: 0,
            buffer: Vec::new(),
            buffer_start: 0,
            limit: 0,
        }
    }

    /// Mark the current position and retain up to `read_limit` bytes past it.
    pub fn save_position(&mut self, read_limit: usize) -> u64 {
        let buffer_end = self.buffer_end();
        if self.offset >= self.buffer_start && self.offset <= buffer_end {
            // Keep the tail we are still replaying, drop what is behind us.
            let consumed = (self.offset - self.buffer_start) as usize;
            self.buffer.drain(..consumed);
            self.buffer_start = self.offset;
        } else {
            self.buffer.clear();
            self.buffer_start = self.offset;
        }
        self.limit = self.offset.saturating_add(read_limit as u64);
        self.offset
    }

    /// Rewind to a previously saved offset.
    pub fn reset(&mut self, position: u64) -> io::Result<()> {
        let buffer_end = self.buffer_end();
        if position < self.buffer_start
            || position > buffer_end
            || self.inner_offset != buffer_end
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cannot reset to {position}: retained window is {}..{buffer_end}, stream at {}",
                    self.buffer_start, self.inner_offset
                ),
            ));
        }
        self.offset = position;
        Ok(())
    }

    /// Offset of the next byte `read` returns.
    pub fn position(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn buffer_end(&self) -> u64 {
        self.buffer_start + self.buffer.len() as u64
    }
}

impl<R: Read> Read for MarkableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Replay retained bytes first.
        let buffer_end = self.buffer_end();
        if self.offset >= self.buffer_start && self.offset < buffer_end {
            let start = (self.offset - self.buffer_start) as usize;
            let n = buf.len().min(self.buffer.len() - start);
            buf[..n].copy_from_slice(&self.buffer[start..start + n]);
            self.offset += n as u64;
            return Ok(n);
        }

        let n = self.inner.read(buf)?;
        let read_start = self.inner_offset;
        self.inner_offset += n as u64;
        self.offset = self.inner_offset;

        if read_start == buffer_end && read_start < self.limit {
            let keep = ((self.limit - read_start) as usize).min(n);
            self.buffer.extend_from_slice(&buf[..keep]);
        } else if read_start >= self.limit && !self.buffer.is_empty() {
            // Past the window: no reset can succeed any more.
            self.buffer.clear();
            self.buffer_start = self.inner_offset;
        }
        Ok(n)
    }
}
