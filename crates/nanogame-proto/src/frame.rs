//! Length-prefixed frame reassembly and framing of outbound packets.
//!
//! A frame on the wire is `VarInt length | packet id | payload`, where the
//! length counts the id byte plus the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::types::{VarInt, VarIntDecoder};

/// Largest frame body accepted from a client.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024;

/// Outcome of feeding bytes to a [`FrameAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameResult {
    /// The frame in progress needs more input.
    NeedMore,
    /// A complete frame body (packet id + payload, length prefix stripped).
    Complete(Bytes),
}

/// Reassembles one length-prefixed frame at a time from arbitrarily split input.
#[derive(Debug)]
pub struct FrameAssembler {
    max_length: usize,
    /// Declared body length, once the prefix has been fully decoded.
    length: Option<usize>,
    prefix: VarIntDecoder,
    /// Body bytes received so far; its length is the write cursor.
    payload: BytesMut,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_max_length(MAX_FRAME_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            length: None,
            prefix: VarIntDecoder::new(),
            payload: BytesMut::new(),
        }
    }

    /// Declared length of the frame in progress, if the prefix is complete.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Body bytes buffered for the frame in progress.
    pub fn write_cursor(&self) -> usize {
        self.payload.len()
    }

    /// Whether no part of a frame has been consumed yet.
    pub fn is_idle(&self) -> bool {
        self.length.is_none() && self.prefix.bytes_consumed() == 0
    }

    /// Consume bytes from `input` until one frame completes or the input runs
    /// out.
    ///
    /// The length prefix is consumed a single byte at a time so nothing past
    /// the end of the current frame is ever taken; leftover bytes stay in
    /// `input` for the next call. The assembler is reset for the next frame
    /// when it returns [`FrameResult::Complete`].
    pub fn feed(&mut self, input: &mut impl Buf) -> Result<FrameResult, ProtoError> {
        let length = loop {
            if let Some(length) = self.length {
                break length;
            }
            if !input.has_remaining() {
                return Ok(FrameResult::NeedMore);
            }
            let decoded = match self.prefix.step(input.get_u8()) {
                Ok(decoded) => decoded,
                Err(e) => {
                    self.reset();
                    return Err(e.into());
                }
            };
            if let Some(value) = decoded {
                let length = value as usize;
                if length > self.max_length {
                    self.reset();
                    return Err(ProtoError::FrameTooLong {
                        length,
                        max: self.max_length,
                    });
                }
                self.payload.reserve(length);
                self.length = Some(length);
            }
        };

        let wanted = length - self.payload.len();
        let take = wanted.min(input.remaining());
        if take > 0 {
            let chunk = input.copy_to_bytes(take);
            self.payload.extend_from_slice(&chunk);
        }

        if self.payload.len() == length {
            self.length = None;
            Ok(FrameResult::Complete(self.payload.split().freeze()))
        } else {
            Ok(FrameResult::NeedMore)
        }
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.length = None;
        self.prefix.reset();
        self.payload.clear();
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix `body` (packet id + payload) with its minimal VarInt length.
pub fn encode_frame(body: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(VarInt::MAX_BYTES + body.len());
    VarInt(body.len() as i32).proto_encode(&mut frame);
    frame.put_slice(body);
    frame.freeze()
}

/// Builds a frame whose length field is reserved before the body is known
/// and patched in as a fixed-width VarInt afterwards.
pub struct FrameWriter {
    buf: BytesMut,
}

impl FrameWriter {
    /// Bytes reserved for the length field; bodies up to 2 MiB fit.
    pub const RESERVED_PREFIX: usize = 3;

    pub fn new(packet_id: u8) -> Self {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_bytes(0, Self::RESERVED_PREFIX);
        buf.put_u8(packet_id);
        Self { buf }
    }

    /// The body written so far, after the packet id.
    pub fn body(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Patch the reserved length field and return the finished frame.
    ///
    /// A body too large for the reserved width is re-framed with a minimal
    /// prefix instead.
    pub fn finish(mut self) -> Bytes {
        let body_len = self.buf.len() - Self::RESERVED_PREFIX;
        let mut prefix = &mut self.buf[..Self::RESERVED_PREFIX];
        match VarInt(body_len as i32).encode_fixed_width(Self::RESERVED_PREFIX, &mut prefix) {
            Ok(()) => self.buf.freeze(),
            Err(_) => encode_frame(&self.buf[Self::RESERVED_PREFIX..]),
        }
    }
}
