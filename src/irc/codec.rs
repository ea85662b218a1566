//! IRC message codec for tokio.
//!
//! Frames lines with [`LinesCodec`] and parses them into `irc-proto`
//! [`Message`] values. A framed stream ends on the first decoder error, so
//! lines that are too long, not UTF-8 or not parseable are logged and
//! skipped here instead.

use bytes::BytesMut;
use irc_proto::Message;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::debug;

/// Maximum line length, terminator included (RFC 2812).
pub const MAX_LINE_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tokio codec for encoding/decoding IRC messages.
pub struct IrcCodec {
    inner: LinesCodec,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(MAX_LINE_LEN),
        }
    }

    /// Sanitize outgoing message data: everything from the first line break
    /// on is dropped so one message can never smuggle a second command.
    pub fn sanitize(mut data: String) -> String {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        data
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, CodecError> {
        loop {
            match self.inner.decode(src) {
                Ok(Some(line)) => match line.parse::<Message>() {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(e) => debug!(error = %e, line = %line, "Skipping unparseable line"),
                },
                Ok(None) => return Ok(None),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    debug!("Skipping line longer than {MAX_LINE_LEN} bytes");
                }
                Err(LinesCodecError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                    debug!(error = %e, "Skipping non UTF-8 line");
                }
                Err(LinesCodecError::Io(e)) => return Err(CodecError::Io(e)),
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        // The rendered message carries its own CRLF; sanitizing cuts it too.
        let mut line = Self::sanitize(msg.to_string());
        if line.len() > MAX_LINE_LEN - 2 {
            let mut cut = MAX_LINE_LEN - 2;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
        }
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
