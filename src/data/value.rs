//! # Value
//!
//! One type for a value of either representation. The representation is in
//! the type, so the wrong-direction operation is a returned error rather
//! than a runtime flag check scattered through the codec:
//!
//! | Operation | `Constructed` | `Mapped` |
//! |-----------|---------------|----------|
//! | `encode` | buffer + context echo | `EncodeUnsupported` |
//! | `decode` | `DecodeUnsupported` | idempotent decode |
//! | `copy` | deep clone | view over a self-owned copy of the bytes |
//! | `copy_construct` | deep clone | lift into an owned tree |
//!
//! Children of a value are reached through [`ValueRef`], which borrows a
//! node of any representation.

use eyre::Result;

use crate::data::{CodecError, Constructed, Data};
use crate::encoding::ParentContext;
use crate::mapped::{Mapped, MappedBuf, MappedComposite, MappedPrimitive};
use crate::record::RecordRef;

#[derive(Debug)]
pub enum Value<'a> {
    Constructed(Constructed),
    Mapped(Mapped<'a>),
}

impl<'a> Value<'a> {
    /// Wraps and decodes a top-level buffer.
    pub fn decode_from(buf: impl Into<MappedBuf<'a>>) -> Result<Self> {
        let (view, _) = Mapped::new(ParentContext::SelfDescribing, buf)?;
        Ok(Value::Mapped(view))
    }

    pub fn encode(&mut self, is_child: bool) -> Result<(&[u8], ParentContext)> {
        match self {
            Value::Constructed(c) => c.encode(is_child),
            Value::Mapped(_) => Err(CodecError::EncodeUnsupported.into()),
        }
    }

    pub fn decode(&mut self, context: ParentContext) -> Result<()> {
        match self {
            Value::Constructed(_) => Err(CodecError::DecodeUnsupported.into()),
            Value::Mapped(m) => m.decode(context),
        }
    }

    pub fn copy(&self) -> Value<'static> {
        match self {
            Value::Constructed(c) => Value::Constructed(c.clone()),
            Value::Mapped(m) => Value::Mapped(m.copy()),
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self, Value::Constructed(_))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Value::Mapped(_))
    }

    pub fn as_value_ref(&self) -> ValueRef<'_, 'a> {
        match self {
            Value::Constructed(c) => ValueRef::Constructed(c),
            Value::Mapped(m) => m.as_value_ref(),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.as_value_ref().is_nil()
    }

    pub fn is_primitive(&self) -> bool {
        self.as_value_ref().is_primitive()
    }

    pub fn is_array(&self) -> bool {
        self.as_value_ref().is_array()
    }

    pub fn is_record_list(&self) -> bool {
        self.as_value_ref().is_record_list()
    }

    pub fn size(&self) -> usize {
        self.as_value_ref().size()
    }

    pub fn child_at(&self, index: usize) -> Result<ValueRef<'_, 'a>> {
        self.as_value_ref().child_at(index)
    }

    pub fn record_at(&self, index: usize) -> Result<RecordRef<'_, 'a>> {
        self.as_value_ref().record_at(index)
    }

    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.as_value_ref().raw_bytes()
    }

    pub fn copy_construct(&self) -> Result<Constructed> {
        self.as_value_ref().copy_construct()
    }
}

impl From<Constructed> for Value<'_> {
    fn from(c: Constructed) -> Self {
        Value::Constructed(c)
    }
}

impl<'a> From<Mapped<'a>> for Value<'a> {
    fn from(m: Mapped<'a>) -> Self {
        Value::Mapped(m)
    }
}

/// A borrowed node of any representation.
#[derive(Debug, Clone, Copy)]
pub enum ValueRef<'r, 'a> {
    Constructed(&'r Constructed),
    Primitive(&'r MappedPrimitive<'a>),
    Composite(&'r MappedComposite<'a>),
}

macro_rules! each {
    ($self:ident, $v:ident => $body:expr) => {
        match $self {
            ValueRef::Constructed($v) => $body,
            ValueRef::Primitive($v) => $body,
            ValueRef::Composite($v) => $body,
        }
    };
}

impl<'r, 'a> ValueRef<'r, 'a> {
    pub fn is_nil(self) -> bool {
        each!(self, v => v.is_nil())
    }

    pub fn is_primitive(self) -> bool {
        each!(self, v => v.is_primitive())
    }

    pub fn is_array(self) -> bool {
        each!(self, v => v.is_array())
    }

    pub fn is_record_list(self) -> bool {
        each!(self, v => v.is_record_list())
    }

    pub fn size(self) -> usize {
        each!(self, v => v.size())
    }

    pub fn child_at(self, index: usize) -> Result<ValueRef<'r, 'a>> {
        match self {
            ValueRef::Constructed(c) => c.child_at(index).map(ValueRef::Constructed),
            ValueRef::Primitive(p) => p.child_at(index).map(ValueRef::Composite),
            ValueRef::Composite(c) => c.child_at(index).map(ValueRef::Composite),
        }
    }

    pub fn record_at(self, index: usize) -> Result<RecordRef<'r, 'a>> {
        match self {
            ValueRef::Constructed(c) => c.record_at(index).map(RecordRef::Owned),
            ValueRef::Primitive(p) => p.record_at(index).map(RecordRef::Mapped),
            ValueRef::Composite(c) => c.record_at(index).map(RecordRef::Mapped),
        }
    }

    pub fn raw_bytes(self) -> Option<&'r [u8]> {
        each!(self, v => v.raw_bytes())
    }

    pub fn copy_construct(self) -> Result<Constructed> {
        each!(self, v => v.copy_construct())
    }

    pub fn variant_name(self) -> &'static str {
        each!(self, v => v.variant_name())
    }
}
