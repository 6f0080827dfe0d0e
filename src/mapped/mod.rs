//! # Mapped Values
//!
//! Read-only, zero-copy views over encoded buffers. A view borrows the
//! caller's bytes (or shares a reference-counted copy after [`Mapped::copy`])
//! and never outlives them.
//!
//! | Type | Framed by | Decodes |
//! |------|-----------|---------|
//! | [`MappedPrimitive`] | parent-supplied length prefix | leaf only |
//! | [`MappedComposite`] | its own header byte | leaf, array or record list |
//! | [`Mapped`] | either, chosen by the parent context | whichever applies |
//!
//! Views cannot be encoded: they already are.

pub mod buffer;
pub mod composite;
pub mod primitive;

use eyre::Result;

use crate::data::{Constructed, Data, ValueRef};
use crate::encoding::ParentContext;
use crate::record::MappedRecord;

pub use buffer::MappedBuf;
pub use composite::MappedComposite;
pub use primitive::MappedPrimitive;

/// A view whose framing is decided by the parent context: parent-framed
/// leaves become [`MappedPrimitive`], self-describing values become
/// [`MappedComposite`].
#[derive(Debug)]
pub enum Mapped<'a> {
    Primitive(MappedPrimitive<'a>),
    Composite(MappedComposite<'a>),
}

impl<'a> Mapped<'a> {
    /// Wraps without decoding.
    pub fn wrap(context: ParentContext, buf: impl Into<MappedBuf<'a>>) -> Self {
        match context {
            ParentContext::SelfDescribing => Mapped::Composite(MappedComposite::wrap(buf)),
            _ => Mapped::Primitive(MappedPrimitive::wrap(context, buf)),
        }
    }

    /// Wraps and decodes under `context`, returning the view and the bytes it
    /// consumed.
    pub fn new(context: ParentContext, buf: impl Into<MappedBuf<'a>>) -> Result<(Self, usize)> {
        Self::nested(context, buf, 0)
    }

    /// Like [`Mapped::new`] for a value `depth` levels below the top-level
    /// value.
    pub(crate) fn nested(
        context: ParentContext,
        buf: impl Into<MappedBuf<'a>>,
        depth: usize,
    ) -> Result<(Self, usize)> {
        composite::check_depth(depth)?;
        let mut view = match context {
            ParentContext::SelfDescribing => {
                Mapped::Composite(MappedComposite::wrap_nested(buf, depth))
            }
            _ => Mapped::Primitive(MappedPrimitive::wrap(context, buf)),
        };
        view.decode(context)?;
        let consumed = view.buf_len();
        Ok((view, consumed))
    }

    pub fn decode(&mut self, context: ParentContext) -> Result<()> {
        match self {
            Mapped::Primitive(p) => p.decode(context),
            Mapped::Composite(c) => c.decode(context),
        }
    }

    pub fn is_decoded(&self) -> bool {
        match self {
            Mapped::Primitive(p) => p.is_decoded(),
            Mapped::Composite(c) => c.is_decoded(),
        }
    }

    pub fn buf(&self) -> &[u8] {
        match self {
            Mapped::Primitive(p) => p.buf(),
            Mapped::Composite(c) => c.buf(),
        }
    }

    pub fn copy(&self) -> Mapped<'static> {
        match self {
            Mapped::Primitive(p) => Mapped::Primitive(p.copy()),
            Mapped::Composite(c) => Mapped::Composite(c.copy()),
        }
    }

    pub fn as_value_ref(&self) -> ValueRef<'_, 'a> {
        match self {
            Mapped::Primitive(p) => ValueRef::Primitive(p),
            Mapped::Composite(c) => ValueRef::Composite(c),
        }
    }

    pub(crate) fn rebase(&self, base: &MappedBuf<'static>, at: usize) -> Mapped<'static> {
        match self {
            Mapped::Primitive(p) => Mapped::Primitive(p.rebase(base, at)),
            Mapped::Composite(c) => Mapped::Composite(c.rebase(base, at)),
        }
    }

    pub(crate) fn buf_len(&self) -> usize {
        match self {
            Mapped::Primitive(p) => p.buf_len(),
            Mapped::Composite(c) => c.buf_len(),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $v:ident => $body:expr) => {
        match $self {
            Mapped::Primitive($v) => $body,
            Mapped::Composite($v) => $body,
        }
    };
}

impl<'a> Data for Mapped<'a> {
    type Child = MappedComposite<'a>;
    type Rec = MappedRecord<'a>;

    fn is_nil(&self) -> bool {
        dispatch!(self, v => v.is_nil())
    }

    fn is_primitive(&self) -> bool {
        dispatch!(self, v => v.is_primitive())
    }

    fn is_array(&self) -> bool {
        dispatch!(self, v => v.is_array())
    }

    fn is_record_list(&self) -> bool {
        dispatch!(self, v => v.is_record_list())
    }

    fn size(&self) -> usize {
        dispatch!(self, v => v.size())
    }

    fn child_at(&self, index: usize) -> Result<&MappedComposite<'a>> {
        dispatch!(self, v => v.child_at(index))
    }

    fn record_at(&self, index: usize) -> Result<&MappedRecord<'a>> {
        dispatch!(self, v => v.record_at(index))
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        dispatch!(self, v => v.raw_bytes())
    }

    fn copy_construct(&self) -> Result<Constructed> {
        dispatch!(self, v => v.copy_construct())
    }
}

impl<'a> From<MappedPrimitive<'a>> for Mapped<'a> {
    fn from(p: MappedPrimitive<'a>) -> Self {
        Mapped::Primitive(p)
    }
}

impl<'a> From<MappedComposite<'a>> for Mapped<'a> {
    fn from(c: MappedComposite<'a>) -> Self {
        Mapped::Composite(c)
    }
}
