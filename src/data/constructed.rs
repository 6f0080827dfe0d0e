//! The owned value sum type: any of the three constructed variants.

use eyre::Result;

use crate::data::{Data, DataArray, Primitive, RecordList};
use crate::encoding::ParentContext;
use crate::record::OwnedRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constructed {
    Primitive(Primitive),
    Array(DataArray),
    RecordList(RecordList),
}

impl Default for Constructed {
    fn default() -> Self {
        Constructed::Primitive(Primitive::nil())
    }
}

impl Constructed {
    /// Encodes the value. `is_child` only affects primitives; arrays and
    /// record lists are always self-describing.
    pub fn encode(&mut self, is_child: bool) -> Result<(&[u8], ParentContext)> {
        match self {
            Constructed::Primitive(p) => p.encode(is_child),
            Constructed::Array(a) => a.encode(),
            Constructed::RecordList(r) => r.encode(),
        }
    }

    pub fn buf(&self) -> &[u8] {
        match self {
            Constructed::Primitive(p) => p.buf(),
            Constructed::Array(a) => a.buf(),
            Constructed::RecordList(r) => r.buf(),
        }
    }

    pub fn header_byte(&self) -> u8 {
        match self {
            Constructed::Primitive(p) => p.header_byte(),
            Constructed::Array(a) => a.header_byte(),
            Constructed::RecordList(r) => r.header_byte(),
        }
    }

    /// Depth of the deepest value inside the last encode.
    pub(crate) fn encoded_height(&self) -> usize {
        match self {
            Constructed::Primitive(p) => p.encoded_height(),
            Constructed::Array(a) => a.encoded_height(),
            Constructed::RecordList(r) => r.encoded_height(),
        }
    }

    pub fn is_encoded(&self) -> bool {
        match self {
            Constructed::Primitive(p) => p.is_encoded(),
            Constructed::Array(a) => a.is_encoded(),
            Constructed::RecordList(r) => r.is_encoded(),
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Constructed::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&DataArray> {
        match self {
            Constructed::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut DataArray> {
        match self {
            Constructed::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_record_list(&self) -> Option<&RecordList> {
        match self {
            Constructed::RecordList(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_list_mut(&mut self) -> Option<&mut RecordList> {
        match self {
            Constructed::RecordList(r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $v:ident => $body:expr) => {
        match $self {
            Constructed::Primitive($v) => $body,
            Constructed::Array($v) => $body,
            Constructed::RecordList($v) => $body,
        }
    };
}

impl Data for Constructed {
    type Child = Constructed;
    type Rec = OwnedRecord;

    fn is_nil(&self) -> bool {
        dispatch!(self, v => v.is_nil())
    }

    fn is_primitive(&self) -> bool {
        matches!(self, Constructed::Primitive(_))
    }

    fn is_array(&self) -> bool {
        matches!(self, Constructed::Array(_))
    }

    fn is_record_list(&self) -> bool {
        matches!(self, Constructed::RecordList(_))
    }

    fn size(&self) -> usize {
        dispatch!(self, v => v.size())
    }

    fn child_at(&self, index: usize) -> Result<&Constructed> {
        dispatch!(self, v => v.child_at(index))
    }

    fn record_at(&self, index: usize) -> Result<&OwnedRecord> {
        dispatch!(self, v => v.record_at(index))
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        dispatch!(self, v => v.raw_bytes())
    }

    fn copy_construct(&self) -> Result<Constructed> {
        dispatch!(self, v => v.copy_construct())
    }
}

impl From<Primitive> for Constructed {
    fn from(p: Primitive) -> Self {
        Constructed::Primitive(p)
    }
}

impl From<DataArray> for Constructed {
    fn from(a: DataArray) -> Self {
        Constructed::Array(a)
    }
}

impl From<RecordList> for Constructed {
    fn from(r: RecordList) -> Self {
        Constructed::RecordList(r)
    }
}

impl From<Vec<u8>> for Constructed {
    fn from(content: Vec<u8>) -> Self {
        Constructed::Primitive(Primitive::new(content))
    }
}

impl From<&[u8]> for Constructed {
    fn from(content: &[u8]) -> Self {
        Constructed::Primitive(Primitive::new(content))
    }
}

impl From<&str> for Constructed {
    fn from(content: &str) -> Self {
        Constructed::Primitive(Primitive::new(content))
    }
}
