//! Versioned binary encoding for payloads that cross process boundaries.
//!
//! The hosting runtime transports descriptors and partial results as
//! opaque byte strings, so their layout is a documented contract rather
//! than an accidental in-memory representation. Every payload starts
//! with a 4-byte magic and a little-endian u16 version; result payloads
//! are length-prefixed with a record count. Anything that does not
//! decode exactly — wrong magic, unknown version, truncation, trailing
//! bytes — is a protocol violation and surfaces as a typed error,
//! never as a zeroed or partial value.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! descriptor: "TDS1" | version u16 | x u32 | y u32
//!             | domain_w u32 | domain_h u32 | tile_w u32 | tile_h u32
//! result:     "TRS1" | version u16 | count u32
//!             | count * (x u32 | y u32 | r f32 | g f32 | b f32)
//! ```

use crate::partition::PartitionDescriptor;
use crate::processor::{PartialResult, PixelSample};
use crate::sampler::Color;

/// Magic prefix of descriptor payloads.
pub const DESCRIPTOR_MAGIC: [u8; 4] = *b"TDS1";

/// Magic prefix of partial-result payloads.
pub const RESULT_MAGIC: [u8; 4] = *b"TRS1";

/// Current wire version for both payload kinds.
pub const WIRE_VERSION: u16 = 1;

const DESCRIPTOR_LEN: usize = 4 + 2 + 6 * 4;
const RESULT_HEADER_LEN: usize = 4 + 2 + 4;
const SAMPLE_RECORD_LEN: usize = 2 * 4 + 3 * 4;

/// Decode failure for a descriptor or result payload.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("bad payload magic {found:?}, expected {expected:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u16),

    #[error("payload truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

/// Encode a partition descriptor into its wire form.
pub fn encode_descriptor(descriptor: &PartitionDescriptor) -> Vec<u8> {
    let mut buf = Vec::with_capacity(DESCRIPTOR_LEN);
    buf.extend_from_slice(&DESCRIPTOR_MAGIC);
    buf.extend_from_slice(&WIRE_VERSION.to_le_bytes());
    for field in [
        descriptor.x,
        descriptor.y,
        descriptor.domain_width,
        descriptor.domain_height,
        descriptor.tile_width,
        descriptor.tile_height,
    ] {
        buf.extend_from_slice(&field.to_le_bytes());
    }
    buf
}

/// Decode a partition descriptor from its wire form.
pub fn decode_descriptor(payload: &[u8]) -> Result<PartitionDescriptor, CodecError> {
    let mut reader = Reader::new(payload);
    reader.expect_magic(DESCRIPTOR_MAGIC)?;
    reader.expect_version()?;

    let descriptor = PartitionDescriptor {
        x: reader.read_u32()?,
        y: reader.read_u32()?,
        domain_width: reader.read_u32()?,
        domain_height: reader.read_u32()?,
        tile_width: reader.read_u32()?,
        tile_height: reader.read_u32()?,
    };
    reader.expect_end()?;
    Ok(descriptor)
}

/// Encode a partial result into its wire form.
pub fn encode_result(result: &PartialResult) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RESULT_HEADER_LEN + result.len() * SAMPLE_RECORD_LEN);
    buf.extend_from_slice(&RESULT_MAGIC);
    buf.extend_from_slice(&WIRE_VERSION.to_le_bytes());
    buf.extend_from_slice(&(result.len() as u32).to_le_bytes());
    for sample in &result.samples {
        buf.extend_from_slice(&sample.x.to_le_bytes());
        buf.extend_from_slice(&sample.y.to_le_bytes());
        buf.extend_from_slice(&sample.color.r.to_le_bytes());
        buf.extend_from_slice(&sample.color.g.to_le_bytes());
        buf.extend_from_slice(&sample.color.b.to_le_bytes());
    }
    buf
}

/// Decode a partial result from its wire form.
pub fn decode_result(payload: &[u8]) -> Result<PartialResult, CodecError> {
    let mut reader = Reader::new(payload);
    reader.expect_magic(RESULT_MAGIC)?;
    reader.expect_version()?;

    let count = reader.read_u32()? as usize;
    let mut samples = Vec::with_capacity(count.min(payload.len() / SAMPLE_RECORD_LEN + 1));
    for _ in 0..count {
        samples.push(PixelSample {
            x: reader.read_u32()?,
            y: reader.read_u32()?,
            color: Color {
                r: reader.read_f32()?,
                g: reader.read_f32()?,
                b: reader.read_f32()?,
            },
        });
    }
    reader.expect_end()?;
    Ok(PartialResult { samples })
}

/// Cursor over a payload that fails loudly on any shortfall.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(n).ok_or(CodecError::Truncated {
            needed: usize::MAX,
            available: self.buf.len(),
        })?;
        if end > self.buf.len() {
            return Err(CodecError::Truncated {
                needed: end,
                available: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn expect_magic(&mut self, expected: [u8; 4]) -> Result<(), CodecError> {
        let found: [u8; 4] = self.take(4)?.try_into().unwrap();
        if found != expected {
            return Err(CodecError::BadMagic { expected, found });
        }
        Ok(())
    }

    fn expect_version(&mut self) -> Result<(), CodecError> {
        let version = u16::from_le_bytes(self.take(2)?.try_into().unwrap());
        if version != WIRE_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        Ok(())
    }

    fn expect_end(&self) -> Result<(), CodecError> {
        let remaining = self.buf.len() - self.pos;
        if remaining != 0 {
            return Err(CodecError::TrailingBytes(remaining));
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
}
