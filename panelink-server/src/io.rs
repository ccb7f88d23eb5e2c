//! Framed transport halves: TLink extraction on read, TLink assembly on write.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use panelink_itv2::{Extracted, PacketExtractor, TlinkExtractor, encode_frame};

use crate::errors::{Error, ErrorKind, Result};

pub(crate) type Reader = Box<dyn AsyncRead + Send + Unpin>;
pub(crate) type Writer = Box<dyn AsyncWrite + Send + Unpin>;

const READ_CHUNK: usize = 4096;

// ─── FrameReader ─────────────────────────────────────────────────────────────

/// Buffers the inbound byte stream and yields whole TLink packets.
pub(crate) struct FrameReader {
    io: Reader,
    extractor: TlinkExtractor,
    buf: Vec<u8>,
}

impl FrameReader {
    pub(crate) fn new(io: Reader) -> Self {
        Self { io, extractor: TlinkExtractor, buf: Vec::new() }
    }

    /// The next whole packet, terminator included.
    ///
    /// A closed byte source reports once as `Disconnected`.
    pub(crate) async fn next_raw(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Extracted::Packet { bytes, consumed } = self.extractor.try_extract(&self.buf) {
                self.buf.drain(..consumed);
                return Ok(bytes);
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::new(ErrorKind::Disconnected, "byte stream closed"));
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

// ─── FrameWriter ─────────────────────────────────────────────────────────────

/// Assembles outbound TLink packets under the session's default header.
pub(crate) struct FrameWriter {
    io: Writer,
    header: Vec<u8>,
}

impl FrameWriter {
    pub(crate) fn new(io: Writer) -> Self {
        Self { io, header: Vec::new() }
    }

    /// Adopt the header captured from the first inbound packet.
    pub(crate) fn set_header(&mut self, header: Vec<u8>) {
        self.header = header;
    }

    /// Stuff, delimit and write one payload under the default header.
    pub(crate) async fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        let raw = encode_frame(&self.header, payload);
        self.io.write_all(&raw).await?;
        self.io.flush().await?;
        Ok(())
    }
}
