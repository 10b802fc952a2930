// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::protocol::{RemoteStatus, SimCommand};
use crate::errors::{Error, Result};

// "VREP"
pub const MAGIC: u32 = 0x5652_4550;
pub const VERSION: u16 = 1;
// 4+2+2+4+4+4+4
pub const FIXED_HEADER_LEN: usize = 24;

// 1MB, no command carries more.
const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// One decoded frame of the remote API protocol.
#[derive(Debug, Clone)]
pub struct Frame {
    pub seq: u32,
    pub command: SimCommand,
    pub status: RemoteStatus,
    pub payload: Bytes,
}

/// Raw header fields as laid out on the wire, little-endian.
#[derive(Debug, Clone, Copy)]
struct RawHeader {
    magic: u32,
    version: u16,
    _flags: u16,
    seq: u32,
    command: u32,
    status: u32,
    payload_len: u32,
}

impl RawHeader {
    fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::InvalidFrame(format!(
                "bad magic:{:#010x}",
                self.magic
            )));
        }
        if self.version != VERSION {
            return Err(Error::InvalidFrame(format!(
                "version mismatch, expected:{}, got:{}",
                VERSION, self.version
            )));
        }
        if self.payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidFrame(format!(
                "payload too large:{} (max:{})",
                self.payload_len, MAX_PAYLOAD_LEN
            )));
        }
        Ok(())
    }

    fn read_from(buf: &[u8]) -> Result<Self> {
        if buf.len() < FIXED_HEADER_LEN {
            return Err(Error::InsufficientData);
        }
        let mut cursor = buf;
        let header = Self {
            magic: cursor.get_u32_le(),
            version: cursor.get_u16_le(),
            _flags: cursor.get_u16_le(),
            seq: cursor.get_u32_le(),
            command: cursor.get_u32_le(),
            status: cursor.get_u32_le(),
            payload_len: cursor.get_u32_le(),
        };
        header.validate()?;
        Ok(header)
    }
}

/// Frame encoder/decoder over byte buffers.
pub struct FrameCodec;

impl FrameCodec {
    /// Quick check whether the buffer holds a complete frame, and how
    /// long it is. Used by the stream reader.
    #[inline]
    pub fn peek_frame_len(buf: &[u8]) -> Option<usize> {
        if buf.len() < FIXED_HEADER_LEN {
            return None;
        }

        let payload_len =
            u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]) as usize;
        if payload_len > MAX_PAYLOAD_LEN {
            return None;
        }

        let total = FIXED_HEADER_LEN + payload_len;
        if buf.len() >= total {
            Some(total)
        } else {
            None
        }
    }

    pub fn encode(seq: u32, command: SimCommand, status: RemoteStatus, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::with_capacity(FIXED_HEADER_LEN + payload.len());
        buf.put_u32_le(MAGIC);
        buf.put_u16_le(VERSION);
        buf.put_u16_le(0);
        buf.put_u32_le(seq);
        buf.put_u32_le(command.as_u32());
        buf.put_u32_le(status.as_u32());
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(payload);
        buf
    }

    /// Decode exactly one frame, consuming it from the buffer.
    pub fn decode(buf: &mut BytesMut) -> Result<Frame> {
        let total_len = Self::peek_frame_len(buf).ok_or(Error::InsufficientData)?;

        let header = RawHeader::read_from(buf)?;
        let command = SimCommand::from_u32(header.command)
            .ok_or_else(|| Error::InvalidFrame(format!("unknown command:{}", header.command)))?;
        let status = RemoteStatus::from_u32(header.status)
            .ok_or_else(|| Error::InvalidFrame(format!("unknown status:{}", header.status)))?;

        buf.advance(FIXED_HEADER_LEN);
        let payload = buf.split_to(total_len - FIXED_HEADER_LEN).freeze();

        Ok(Frame {
            seq: header.seq,
            command,
            status,
            payload,
        })
    }

    /// Streaming decode: `None` while the frame is still incomplete.
    pub fn decode_stream(buf: &mut BytesMut) -> Result<Option<Frame>> {
        if Self::peek_frame_len(buf).is_none() {
            return Ok(None);
        }

        Self::decode(buf).map(Some)
    }
}

/// Payload helpers shared by client and mock, little-endian throughout.
pub mod payload {
    use super::*;

    pub fn put_name(name: &str) -> BytesMut {
        let raw = name.as_bytes();
        let mut buf = BytesMut::with_capacity(4 + raw.len());
        buf.put_u32_le(raw.len() as u32);
        buf.put_slice(raw);
        buf
    }

    pub fn get_name(mut buf: &[u8]) -> Result<String> {
        if buf.len() < 4 {
            return Err(Error::InsufficientData);
        }
        let len = buf.get_u32_le() as usize;
        if buf.len() < len {
            return Err(Error::InsufficientData);
        }
        String::from_utf8(buf[..len].to_vec())
            .map_err(|e| Error::InvalidFrame(format!("name not utf8: {}", e)))
    }

    pub fn get_i32(mut buf: &[u8]) -> Result<i32> {
        if buf.len() < 4 {
            return Err(Error::InsufficientData);
        }
        Ok(buf.get_i32_le())
    }

    pub fn get_f64(mut buf: &[u8]) -> Result<f64> {
        if buf.len() < 8 {
            return Err(Error::InsufficientData);
        }
        Ok(buf.get_f64_le())
    }
}
