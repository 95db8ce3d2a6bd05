//! `ProtocolEndpoint`: the pair of rings every ASC participant owns, plus
//! the thin encode/decode wrappers around them. Grounded directly on the
//! `ascii_serial_com` struct (`asc->in_buf` / `asc->out_buf`, both
//! `MAXMESSAGELEN` bytes) in the original firmware.

use crate::err::AscError;
use crate::frame::{self, DecodedFrame};
use crate::ring::ByteRing;
use crate::MAX_MESSAGE_LEN;

/// Owns the input and output byte rings for one ASC participant (host or
/// device side — the protocol is symmetric). Transport I/O (reading bytes
/// into `in_buf`, writing bytes out of `out_buf`) is someone else's job; see
/// [`crate::io`].
pub struct ProtocolEndpoint {
    in_buf: ByteRing<MAX_MESSAGE_LEN>,
    out_buf: ByteRing<MAX_MESSAGE_LEN>,
}

impl Default for ProtocolEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEndpoint {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_buf: ByteRing::new(),
            out_buf: ByteRing::new(),
        }
    }

    #[must_use]
    pub fn in_buf(&self) -> &ByteRing<MAX_MESSAGE_LEN> {
        &self.in_buf
    }

    #[must_use]
    pub fn in_buf_mut(&mut self) -> &mut ByteRing<MAX_MESSAGE_LEN> {
        &mut self.in_buf
    }

    #[must_use]
    pub fn out_buf(&self) -> &ByteRing<MAX_MESSAGE_LEN> {
        &self.out_buf
    }

    #[must_use]
    pub fn out_buf_mut(&mut self) -> &mut ByteRing<MAX_MESSAGE_LEN> {
        &mut self.out_buf
    }

    /// Encodes and queues a frame for sending.
    pub fn put_message(&mut self, ver: u8, app: u8, cmd: u8, data: &[u8]) -> Result<(), AscError> {
        frame::encode_into(&mut self.out_buf, ver, app, cmd, data)
    }

    /// Attempts to pull one frame out of `in_buf`.
    pub fn get_message(&mut self) -> Result<Option<DecodedFrame>, AscError> {
        frame::decode_from(&mut self.in_buf)
    }
}
