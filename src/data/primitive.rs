//! # Primitive - Constructed Leaf
//!
//! An owned byte string, or nil. Encodes itself in one of two forms:
//!
//! | Content | Self-describing (`is_child = false`) | Parent-framed (`is_child = true`) |
//! |---------|--------------------------------------|-----------------------------------|
//! | nil or empty | `00` | nothing, context `None` |
//! | 1 - 255 bytes | `01 len content` | `len content`, context `OneByteLength` |
//! | 256 - 65535 bytes | `02 len_hi len_lo content` | `len_hi len_lo content`, context `TwoByteLength` |
//! | 65536+ bytes | `ContentTooLarge` | `ContentTooLarge` |

use eyre::Result;

use crate::config::MAX_CONTENT_LENGTH;
use crate::data::{CodecError, Constructed, Data, Encoded};
use crate::encoding::{push_sized, Header, ParentContext, Shape, SizeCode};
use crate::record::OwnedRecord;

#[derive(Debug, Clone, Default)]
pub struct Primitive {
    content: Option<Vec<u8>>,
    encoded: Option<Encoded>,
}

impl Primitive {
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Some(content.into()),
            encoded: None,
        }
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn set_content(&mut self, content: Option<Vec<u8>>) -> &mut Self {
        self.content = content;
        self.encoded = None;
        self
    }

    pub fn into_content(self) -> Option<Vec<u8>> {
        self.content
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded.is_some()
    }

    /// Encodes the leaf, reusing the cached buffer when the requested form
    /// matches the last one.
    ///
    /// Returns the buffer and the parent context echo: the length code the
    /// framing parent must record for a child encode, `SelfDescribing`
    /// otherwise.
    pub fn encode(&mut self, is_child: bool) -> Result<(&[u8], ParentContext)> {
        if !matches!(&self.encoded, Some(enc) if enc.as_child == is_child) {
            self.encoded = Some(encode_leaf(self.content.as_deref(), is_child)?);
        }
        let enc = self.cached("encode");
        Ok((&enc.buf, enc.context))
    }

    /// The last encoded buffer.
    ///
    /// # Panics
    ///
    /// Panics if the primitive has not been encoded since its last change.
    pub fn buf(&self) -> &[u8] {
        &self.cached("buf").buf
    }

    /// Header byte of the last encode (the length code for a leaf).
    ///
    /// # Panics
    ///
    /// Panics if the primitive has not been encoded since its last change.
    pub fn header_byte(&self) -> u8 {
        self.cached("header_byte").header.raw()
    }

    pub(crate) fn encoded_height(&self) -> usize {
        self.cached("encoded_height").height
    }

    fn cached(&self, accessor: &str) -> &Encoded {
        match &self.encoded {
            Some(enc) => enc,
            None => panic!("Primitive::{accessor} called before encode"),
        }
    }
}

fn encode_leaf(content: Option<&[u8]>, is_child: bool) -> Result<Encoded> {
    let content = content.unwrap_or_default();
    let len = content.len();
    let code = SizeCode::for_value(len).ok_or(CodecError::ContentTooLarge {
        len,
        max: MAX_CONTENT_LENGTH,
    })?;
    let header = Header::primitive(code);

    let mut buf = Vec::with_capacity(1 + code.width() + len);
    if !is_child {
        buf.push(header.raw());
    }
    push_sized(&mut buf, code, len);
    buf.extend_from_slice(content);

    let context = if is_child {
        ParentContext::from(code)
    } else {
        ParentContext::SelfDescribing
    };
    Ok(Encoded {
        buf,
        header,
        context,
        as_child: is_child,
        height: 0,
    })
}

impl Data for Primitive {
    type Child = Constructed;
    type Rec = OwnedRecord;

    fn is_nil(&self) -> bool {
        self.content.as_ref().map_or(true, |c| c.is_empty())
    }

    fn is_primitive(&self) -> bool {
        true
    }

    fn is_array(&self) -> bool {
        false
    }

    fn is_record_list(&self) -> bool {
        false
    }

    fn size(&self) -> usize {
        0
    }

    fn child_at(&self, _index: usize) -> Result<&Constructed> {
        Err(CodecError::WrongVariant {
            expected: Shape::Array.name(),
            found: Shape::Primitive.name(),
        }
        .into())
    }

    fn record_at(&self, _index: usize) -> Result<&OwnedRecord> {
        Err(CodecError::WrongVariant {
            expected: Shape::RecordList.name(),
            found: Shape::Primitive.name(),
        }
        .into())
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self.content.as_deref().unwrap_or_default())
    }

    fn copy_construct(&self) -> Result<Constructed> {
        Ok(Constructed::Primitive(Primitive {
            content: self.content.clone(),
            encoded: None,
        }))
    }
}

/// Equality is by raw bytes, so nil equals empty content (both encode to
/// `00`); the encode cache is ignored.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.content.as_deref().unwrap_or_default() == other.content.as_deref().unwrap_or_default()
    }
}

impl Eq for Primitive {}

impl From<Vec<u8>> for Primitive {
    fn from(content: Vec<u8>) -> Self {
        Primitive::new(content)
    }
}

impl From<&[u8]> for Primitive {
    fn from(content: &[u8]) -> Self {
        Primitive::new(content)
    }
}

impl From<&str> for Primitive {
    fn from(content: &str) -> Self {
        Primitive::new(content)
    }
}
