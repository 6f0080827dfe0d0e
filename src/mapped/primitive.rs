//! # Mapped Primitive
//!
//! A read-only leaf framed by its parent: the parent context says whether a
//! 0, 1 or 2 byte big-endian length prefix precedes the content. There is no
//! header byte, so a mapped primitive cannot decode under `SelfDescribing`;
//! self-describing leaves are read through [`MappedComposite`].
//!
//! The context is fixed when the view is wrapped. Decoding again under the
//! same context is a no-op; a different context is a protocol desync between
//! the framing parent and the child and fails with `ParentContextMismatch`.

use std::ops::Range;

use eyre::Result;

use crate::data::{CodecError, Constructed, Data, Primitive};
use crate::encoding::length::require;
use crate::encoding::{read_sized, ParentContext, Shape};
use crate::mapped::{MappedBuf, MappedComposite};
use crate::record::MappedRecord;

#[derive(Debug, Clone)]
pub struct MappedPrimitive<'a> {
    context: ParentContext,
    buf: MappedBuf<'a>,
    content: Option<Range<usize>>,
}

impl<'a> MappedPrimitive<'a> {
    /// Wraps `buf` without reading it.
    pub fn wrap(context: ParentContext, buf: impl Into<MappedBuf<'a>>) -> Self {
        Self {
            context,
            buf: buf.into(),
            content: None,
        }
    }

    /// Wraps and decodes, returning the view and the number of bytes it
    /// consumed from the front of `buf`.
    pub fn new(context: ParentContext, buf: impl Into<MappedBuf<'a>>) -> Result<(Self, usize)> {
        let mut view = Self::wrap(context, buf);
        view.decode(context)?;
        let consumed = view.buf.len();
        Ok((view, consumed))
    }

    pub fn decode(&mut self, context: ParentContext) -> Result<()> {
        if context != self.context {
            return Err(CodecError::ParentContextMismatch {
                stored: self.context,
                requested: context,
            }
            .into());
        }
        if self.content.is_some() {
            return Ok(());
        }
        let code = context
            .size_code()
            .ok_or(CodecError::UnsupportedParent { found: context })?;

        let bytes = self.buf.as_slice();
        let len = read_sized(bytes, 0, code)?;
        let start = code.width();
        let end = require(bytes, start, len)?;

        self.buf = self.buf.slice(0..end);
        self.content = Some(start..end);
        Ok(())
    }

    pub fn is_decoded(&self) -> bool {
        self.content.is_some()
    }

    pub fn context(&self) -> ParentContext {
        self.context
    }

    /// The bytes this leaf occupies, length prefix included.
    ///
    /// # Panics
    ///
    /// Panics if the view has not been decoded.
    pub fn buf(&self) -> &[u8] {
        self.require_decoded("buf");
        self.buf.as_slice()
    }

    /// The leaf content.
    ///
    /// # Panics
    ///
    /// Panics if the view has not been decoded.
    pub fn content(&self) -> &[u8] {
        let range = self.require_decoded("content");
        &self.buf.as_slice()[range]
    }

    /// An equal view that owns its bytes.
    pub fn copy(&self) -> MappedPrimitive<'static> {
        self.rebase(&self.buf.to_shared(), 0)
    }

    /// The same view over `base[at..]`, which must hold identical bytes.
    pub(crate) fn rebase(&self, base: &MappedBuf<'static>, at: usize) -> MappedPrimitive<'static> {
        MappedPrimitive {
            context: self.context,
            buf: base.slice(at..at + self.buf.len()),
            content: self.content.clone(),
        }
    }

    pub(crate) fn buf_len(&self) -> usize {
        self.buf.len()
    }

    fn require_decoded(&self, accessor: &str) -> Range<usize> {
        match &self.content {
            Some(range) => range.clone(),
            None => panic!("MappedPrimitive::{accessor} called before decode"),
        }
    }
}

impl<'a> Data for MappedPrimitive<'a> {
    type Child = MappedComposite<'a>;
    type Rec = MappedRecord<'a>;

    fn is_nil(&self) -> bool {
        self.context == ParentContext::None || self.content.as_ref().is_some_and(|r| r.is_empty())
    }

    fn is_primitive(&self) -> bool {
        self.require_decoded("is_primitive");
        true
    }

    fn is_array(&self) -> bool {
        self.require_decoded("is_array");
        false
    }

    fn is_record_list(&self) -> bool {
        self.require_decoded("is_record_list");
        false
    }

    fn size(&self) -> usize {
        self.require_decoded("size");
        0
    }

    fn child_at(&self, _index: usize) -> Result<&MappedComposite<'a>> {
        Err(CodecError::WrongVariant {
            expected: Shape::Array.name(),
            found: Shape::Primitive.name(),
        }
        .into())
    }

    fn record_at(&self, _index: usize) -> Result<&MappedRecord<'a>> {
        Err(CodecError::WrongVariant {
            expected: Shape::RecordList.name(),
            found: Shape::Primitive.name(),
        }
        .into())
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self.content())
    }

    fn copy_construct(&self) -> Result<Constructed> {
        let content = self.content();
        Ok(Constructed::Primitive(if self.context == ParentContext::None {
            Primitive::nil()
        } else {
            Primitive::new(content)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_length_prefix() {
        let (view, used) = MappedPrimitive::new(ParentContext::OneByteLength, &[0x02, b'h', b'i', 0xFF]).unwrap();
        assert_eq!(view.content(), b"hi");
        assert_eq!(used, 3);

        let mut buf = vec![0x01, 0x00];
        buf.extend(std::iter::repeat(7u8).take(256));
        let (view, used) = MappedPrimitive::new(ParentContext::TwoByteLength, &buf).unwrap();
        assert_eq!(view.content().len(), 256);
        assert_eq!(used, 258);

        let (view, used) = MappedPrimitive::new(ParentContext::None, &[0x09]).unwrap();
        assert!(view.is_nil());
        assert_eq!(used, 0);
    }

    #[test]
    fn decode_checks_stored_context() {
        let mut view = MappedPrimitive::wrap(ParentContext::OneByteLength, &[0x01, b'a']);
        view.decode(ParentContext::OneByteLength).unwrap();
        view.decode(ParentContext::OneByteLength).unwrap();

        let err = view.decode(ParentContext::TwoByteLength).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CodecError>(),
            Some(&CodecError::ParentContextMismatch {
                stored: ParentContext::OneByteLength,
                requested: ParentContext::TwoByteLength,
            })
        );
    }

    #[test]
    fn rejects_self_describing_context() {
        let err = MappedPrimitive::new(ParentContext::SelfDescribing, &[0x00]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CodecError>(),
            Some(&CodecError::UnsupportedParent {
                found: ParentContext::SelfDescribing
            })
        );
    }

    #[test]
    fn copy_owns_its_bytes() {
        let copy = {
            let buf = vec![0x03, b'a', b'b', b'c'];
            let (view, _) = MappedPrimitive::new(ParentContext::OneByteLength, &buf).unwrap();
            view.copy()
        };
        assert_eq!(copy.content(), b"abc");
    }

    #[test]
    #[should_panic(expected = "MappedPrimitive::content called before decode")]
    fn content_before_decode_panics() {
        let view = MappedPrimitive::wrap(ParentContext::OneByteLength, &[0x01, b'a']);
        let _ = view.content();
    }
}
