//! # Records
//!
//! A record pairs a key, a value and a scheme with an optional timestamp.
//! Record lists hold records the way arrays hold values.
//!
//! ## Wire Format
//!
//! ```text
//! +-------+-----------+-------------+--------------+-------------------+
//! | magic | key field | value field | scheme field | timestamp (0 / 8) |
//! +-------+-----------+-------------+--------------+-------------------+
//! ```
//!
//! The magic byte carries the parent context of each field, so fields are
//! encoded without a header unless they are composites:
//!
//! | Bits | Field | Codes |
//! |------|-------|-------|
//! | 7-6 | key | [`ParentContext`](crate::encoding::ParentContext) |
//! | 5-4 | value | same |
//! | 3-2 | scheme | same |
//! | 1-0 | timestamp | 0 absent, 1 big-endian u64 nanoseconds since the Unix epoch |
//!
//! A record carries no outer length: it ends where its last field ends.

pub mod mapped;
pub mod owned;

use std::time::SystemTime;

use eyre::Result;

use crate::data::{Data, ValueRef};

pub use mapped::MappedRecord;
pub use owned::OwnedRecord;

pub(crate) const KEY_SHIFT: u8 = 6;
pub(crate) const VALUE_SHIFT: u8 = 4;
pub(crate) const SCHEME_SHIFT: u8 = 2;
pub(crate) const TIMESTAMP_MASK: u8 = 0b11;
pub(crate) const TIMESTAMP_ABSENT: u8 = 0;
pub(crate) const TIMESTAMP_NANOS: u8 = 1;

/// What the codec needs from a record.
///
/// Decoding and copying are not trait methods because their signatures
/// differ per side:
///
/// | Operation | [`MappedRecord`] | [`OwnedRecord`] |
/// |-----------|------------------|-----------------|
/// | decode | [`MappedRecord::decode`] `(buf) -> (view, consumed)` | not applicable |
/// | copy | [`MappedRecord::copy`], detaches into `MappedRecord<'static>` | `Clone` |
pub trait Record {
    type Field: Data;

    fn key(&self) -> &Self::Field;
    fn value(&self) -> &Self::Field;
    fn scheme(&self) -> &Self::Field;
    fn timestamp(&self) -> Option<SystemTime>;

    /// The record's self-delimiting encoding. Views fail with
    /// `EncodeUnsupported`.
    fn encode(&mut self) -> Result<&[u8]>;

    fn buf(&self) -> &[u8];
    fn is_decoded(&self) -> bool;

    /// Deep copy with every field in the constructed representation.
    fn copy_construct(&self) -> Result<OwnedRecord>;
}

/// A borrowed record of either representation.
#[derive(Debug, Clone, Copy)]
pub enum RecordRef<'r, 'a> {
    Owned(&'r OwnedRecord),
    Mapped(&'r MappedRecord<'a>),
}

impl<'r, 'a> RecordRef<'r, 'a> {
    pub fn key(self) -> ValueRef<'r, 'a> {
        match self {
            RecordRef::Owned(r) => ValueRef::Constructed(r.key()),
            RecordRef::Mapped(r) => r.key().as_value_ref(),
        }
    }

    pub fn value(self) -> ValueRef<'r, 'a> {
        match self {
            RecordRef::Owned(r) => ValueRef::Constructed(r.value()),
            RecordRef::Mapped(r) => r.value().as_value_ref(),
        }
    }

    pub fn scheme(self) -> ValueRef<'r, 'a> {
        match self {
            RecordRef::Owned(r) => ValueRef::Constructed(r.scheme()),
            RecordRef::Mapped(r) => r.scheme().as_value_ref(),
        }
    }

    pub fn timestamp(self) -> Option<SystemTime> {
        match self {
            RecordRef::Owned(r) => r.timestamp(),
            RecordRef::Mapped(r) => r.timestamp(),
        }
    }

    pub fn buf(self) -> &'r [u8] {
        match self {
            RecordRef::Owned(r) => r.buf(),
            RecordRef::Mapped(r) => r.buf(),
        }
    }

    pub fn copy_construct(self) -> Result<OwnedRecord> {
        match self {
            RecordRef::Owned(r) => r.copy_construct(),
            RecordRef::Mapped(r) => r.copy_construct(),
        }
    }
}
