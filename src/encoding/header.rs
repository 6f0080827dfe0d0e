//! # Header Byte
//!
//! Every self-describing value starts with one header byte packing six
//! fields:
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +-------+-------+---+---+-------+
//! | array | rec   | L | C | len   |
//! | count | count |   |   | code  |
//! +-------+-------+---+---+-------+
//! ```
//!
//! | Bits | Field | Codes |
//! |------|-------|-------|
//! | 7-6 | array count | 0 none, 1 one-byte count, 2 two-byte count, 3 invalid |
//! | 5-4 | record count | same codes; exclusive with the array count |
//! | 3 | lookup | reserved, must be 0 |
//! | 2 | compression | reserved, must be 0 |
//! | 1-0 | content length | 0 empty, 1 one-byte length, 2 two-byte length, 3 invalid |
//!
//! The same two-bit codes double as the [`ParentContext`] a container (or a
//! record) hands to a child: the child is then framed by its parent and
//! carries no header of its own, except under [`ParentContext::SelfDescribing`].

use eyre::Result;

use crate::config::{MAX_CONTENT_LENGTH, ONE_BYTE_LIMIT};
use crate::data::CodecError;

const ARRAY_SHIFT: u8 = 6;
const RECORD_SHIFT: u8 = 4;
const LOOKUP_BIT: u8 = 1 << 3;
const COMPRESSION_BIT: u8 = 1 << 2;
const CODE_MASK: u8 = 0b11;

/// How a child's length is communicated by whoever frames it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParentContext {
    /// No bytes at all: the child is nil.
    None = 0,
    /// One-byte length prefix, then content.
    OneByteLength = 1,
    /// Two-byte big-endian length prefix, then content.
    TwoByteLength = 2,
    /// The child carries its own header byte.
    SelfDescribing = 3,
}

impl ParentContext {
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & CODE_MASK {
            0 => ParentContext::None,
            1 => ParentContext::OneByteLength,
            2 => ParentContext::TwoByteLength,
            _ => ParentContext::SelfDescribing,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// The length prefix code a parent-framed child uses, or `None` for a
    /// self-describing child.
    pub const fn size_code(self) -> Option<SizeCode> {
        match self {
            ParentContext::None => Some(SizeCode::Empty),
            ParentContext::OneByteLength => Some(SizeCode::OneByte),
            ParentContext::TwoByteLength => Some(SizeCode::TwoByte),
            ParentContext::SelfDescribing => None,
        }
    }
}

impl From<SizeCode> for ParentContext {
    fn from(code: SizeCode) -> Self {
        ParentContext::from_bits(code.bits())
    }
}

/// Width code for a count or length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SizeCode {
    Empty = 0,
    OneByte = 1,
    TwoByte = 2,
}

impl SizeCode {
    /// Smallest code able to carry `value`, or `None` past the format ceiling.
    #[inline]
    pub const fn for_value(value: usize) -> Option<Self> {
        if value == 0 {
            Some(SizeCode::Empty)
        } else if value <= ONE_BYTE_LIMIT {
            Some(SizeCode::OneByte)
        } else if value <= MAX_CONTENT_LENGTH {
            Some(SizeCode::TwoByte)
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & CODE_MASK {
            0 => Some(SizeCode::Empty),
            1 => Some(SizeCode::OneByte),
            2 => Some(SizeCode::TwoByte),
            _ => None,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Number of prefix bytes this code occupies on the wire.
    #[inline]
    pub const fn width(self) -> usize {
        self as usize
    }
}

/// Parsed header byte. Construction never fails; validation happens in
/// [`Header::layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header(u8);

/// What a valid header says about the bytes following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub shape: Shape,
    pub count_code: SizeCode,
    pub length_code: SizeCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Primitive,
    Array,
    RecordList,
}

impl Shape {
    pub const fn name(self) -> &'static str {
        match self {
            Shape::Primitive => "primitive",
            Shape::Array => "data array",
            Shape::RecordList => "record list",
        }
    }
}

impl Header {
    pub const NIL: Header = Header(0x00);

    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Header(byte)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Header of a leaf with the given content length code.
    #[inline]
    pub const fn primitive(length: SizeCode) -> Self {
        Header(length.bits())
    }

    /// Header of an array with the given count and content length codes.
    #[inline]
    pub const fn array(count: SizeCode, length: SizeCode) -> Self {
        Header((count.bits() << ARRAY_SHIFT) | length.bits())
    }

    /// Header of a record list with the given count and content length codes.
    #[inline]
    pub const fn record_list(count: SizeCode, length: SizeCode) -> Self {
        Header((count.bits() << RECORD_SHIFT) | length.bits())
    }

    #[inline]
    pub const fn array_bits(self) -> u8 {
        (self.0 >> ARRAY_SHIFT) & CODE_MASK
    }

    #[inline]
    pub const fn record_bits(self) -> u8 {
        (self.0 >> RECORD_SHIFT) & CODE_MASK
    }

    #[inline]
    pub const fn is_lookup(self) -> bool {
        self.0 & LOOKUP_BIT != 0
    }

    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.0 & COMPRESSION_BIT != 0
    }

    #[inline]
    pub const fn length_bits(self) -> u8 {
        self.0 & CODE_MASK
    }

    /// Validates every field and reports the shape of the value.
    ///
    /// Fields are checked in wire order: array count, record count, lookup,
    /// compression, content length.
    pub fn layout(self) -> Result<HeaderLayout> {
        let byte = self.0;
        let array = SizeCode::from_bits(self.array_bits()).ok_or(CodecError::InvalidHeader {
            byte,
            field: "array count",
        })?;
        let records = SizeCode::from_bits(self.record_bits()).ok_or(CodecError::InvalidHeader {
            byte,
            field: "record count",
        })?;

        let (shape, count_code) = match (array, records) {
            (SizeCode::Empty, SizeCode::Empty) => (Shape::Primitive, SizeCode::Empty),
            (array, SizeCode::Empty) => (Shape::Array, array),
            (SizeCode::Empty, records) => (Shape::RecordList, records),
            _ => return Err(CodecError::ConflictingVariant { byte }.into()),
        };

        if self.is_lookup() {
            return Err(CodecError::UnsupportedFeature {
                byte,
                feature: "lookup",
            }
            .into());
        }
        if self.is_compressed() {
            return Err(CodecError::UnsupportedFeature {
                byte,
                feature: "compression",
            }
            .into());
        }

        let length_code =
            SizeCode::from_bits(self.length_bits()).ok_or(CodecError::InvalidHeader {
                byte,
                field: "content length",
            })?;

        Ok(HeaderLayout {
            shape,
            count_code,
            length_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(header: u8) -> CodecError {
        Header::from_byte(header)
            .layout()
            .unwrap_err()
            .downcast::<CodecError>()
            .unwrap()
    }

    #[test]
    fn size_code_boundaries() {
        assert_eq!(SizeCode::for_value(0), Some(SizeCode::Empty));
        assert_eq!(SizeCode::for_value(1), Some(SizeCode::OneByte));
        assert_eq!(SizeCode::for_value(255), Some(SizeCode::OneByte));
        assert_eq!(SizeCode::for_value(256), Some(SizeCode::TwoByte));
        assert_eq!(SizeCode::for_value(65535), Some(SizeCode::TwoByte));
        assert_eq!(SizeCode::for_value(65536), None);
    }

    #[test]
    fn composes_array_and_record_headers() {
        assert_eq!(Header::array(SizeCode::OneByte, SizeCode::OneByte).raw(), 0x41);
        assert_eq!(Header::record_list(SizeCode::OneByte, SizeCode::OneByte).raw(), 0x11);
        assert_eq!(Header::array(SizeCode::TwoByte, SizeCode::TwoByte).raw(), 0x82);
        assert_eq!(Header::primitive(SizeCode::Empty), Header::NIL);
    }

    #[test]
    fn layout_reports_shape() {
        let layout = Header::from_byte(0x41).layout().unwrap();
        assert_eq!(layout.shape, Shape::Array);
        assert_eq!(layout.count_code, SizeCode::OneByte);
        assert_eq!(layout.length_code, SizeCode::OneByte);

        let layout = Header::from_byte(0x22).layout().unwrap();
        assert_eq!(layout.shape, Shape::RecordList);
        assert_eq!(layout.count_code, SizeCode::TwoByte);
        assert_eq!(layout.length_code, SizeCode::TwoByte);

        let layout = Header::from_byte(0x01).layout().unwrap();
        assert_eq!(layout.shape, Shape::Primitive);
    }

    #[test]
    fn layout_rejects_reserved_codes() {
        assert!(matches!(kind(0xC1), CodecError::InvalidHeader { field: "array count", .. }));
        assert!(matches!(kind(0x31), CodecError::InvalidHeader { field: "record count", .. }));
        assert!(matches!(kind(0x03), CodecError::InvalidHeader { field: "content length", .. }));
    }

    #[test]
    fn layout_rejects_both_counts() {
        assert_eq!(kind(0x51), CodecError::ConflictingVariant { byte: 0x51 });
    }

    #[test]
    fn layout_rejects_reserved_features() {
        assert_eq!(
            kind(0x08),
            CodecError::UnsupportedFeature { byte: 0x08, feature: "lookup" }
        );
        assert_eq!(
            kind(0x04),
            CodecError::UnsupportedFeature { byte: 0x04, feature: "compression" }
        );
    }

    #[test]
    fn parent_context_maps_to_size_code() {
        assert_eq!(ParentContext::from_bits(0xFF), ParentContext::SelfDescribing);
        assert_eq!(ParentContext::OneByteLength.size_code(), Some(SizeCode::OneByte));
        assert_eq!(ParentContext::SelfDescribing.size_code(), None);
        assert_eq!(ParentContext::from(SizeCode::TwoByte), ParentContext::TwoByteLength);
    }
}
