//! Line-based codec for tokio.
//!
//! Decodes newline-terminated lines (CR/LF stripped) and encodes
//! pre-framed lines verbatim.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default receive bound. Inbound lines are never truncated; this only
/// caps how much a peer can make us buffer without a newline.
pub const DEFAULT_MAX_LEN: usize = 8192;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Replace invalid UTF-8 instead of failing
    lossy: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a strict UTF-8 codec with the default length bound.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: DEFAULT_MAX_LEN,
            lossy: false,
        }
    }

    /// Create a codec with a custom length bound.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::new()
        }
    }

    /// Decode invalid UTF-8 with replacement characters instead of failing.
    pub fn lossy(mut self) -> Self {
        self.lossy = true;
        self
    }

    fn decode_line(&self, line: &[u8]) -> error::Result<String> {
        let line = strip_terminator(line);
        match std::str::from_utf8(line) {
            Ok(s) => Ok(s.to_string()),
            Err(_) if self.lossy => Ok(String::from_utf8_lossy(line).into_owned()),
            Err(e) => Err(ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
                command_hint: error::extract_command_hint(line),
            }),
        }
    }
}

fn strip_terminator(mut line: &[u8]) -> &[u8] {
    while let Some((&last, rest)) = line.split_last() {
        if last == b'\n' || last == b'\r' {
            line = rest;
        } else {
            break;
        }
    }
    line
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            self.decode_line(&line).map(Some)
        } else {
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            None => {
                // Unterminated final line.
                let line = src.split_to(src.len());
                self.next_index = 0;
                self.decode_line(&line).map(Some)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}
