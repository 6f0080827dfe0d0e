//! # Count and Length Prefixes
//!
//! Counts and content lengths are written as 0, 1 or 2 big-endian bytes, the
//! width chosen by a [`SizeCode`]. Code 0 writes nothing and reads as zero.
//!
//! | Code | Bytes | Range |
//! |------|-------|-------|
//! | 0 | 0 | 0 |
//! | 1 | 1 | 1 - 255 |
//! | 2 | 2 | 256 - 65535 |

use eyre::Result;
use smallvec::SmallVec;

use crate::data::CodecError;
use crate::encoding::header::SizeCode;

/// Header byte plus the widest count and length prefixes.
pub type Frame = SmallVec<[u8; 5]>;

/// Appends `value` using exactly `code.width()` bytes.
///
/// `code` must come from [`SizeCode::for_value`] for the same value.
#[inline]
pub fn push_sized<E: Extend<u8>>(out: &mut E, code: SizeCode, value: usize) {
    match code {
        SizeCode::Empty => {}
        SizeCode::OneByte => out.extend([value as u8]),
        SizeCode::TwoByte => out.extend((value as u16).to_be_bytes()),
    }
}

/// Reads a prefix of width `code.width()` starting at `pos`.
pub fn read_sized(buf: &[u8], pos: usize, code: SizeCode) -> Result<usize> {
    let end = pos + code.width();
    let bytes = buf.get(pos..end).ok_or(CodecError::TruncatedBuffer {
        needed: end,
        available: buf.len(),
    })?;
    Ok(match code {
        SizeCode::Empty => 0,
        SizeCode::OneByte => bytes[0] as usize,
        SizeCode::TwoByte => u16::from_be_bytes([bytes[0], bytes[1]]) as usize,
    })
}

/// Checks that `len` bytes are available at `pos`, returning the end offset.
#[inline]
pub fn require(buf: &[u8], pos: usize, len: usize) -> Result<usize> {
    let end = pos + len;
    if end > buf.len() {
        return Err(CodecError::TruncatedBuffer {
            needed: end,
            available: buf.len(),
        }
        .into());
    }
    Ok(end)
}
