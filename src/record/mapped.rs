//! Record view: fields decoded eagerly as [`Mapped`] views over the record's
//! bytes; nested composites inside a field still materialize lazily.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use eyre::{Result, WrapErr};

use crate::config::{RECORD_MAGIC_LENGTH, TIMESTAMP_LENGTH};
use crate::data::{CodecError, Data};
use crate::encoding::length::require;
use crate::encoding::ParentContext;
use crate::mapped::{Mapped, MappedBuf};
use crate::record::{
    OwnedRecord, Record, KEY_SHIFT, SCHEME_SHIFT, TIMESTAMP_ABSENT, TIMESTAMP_MASK, TIMESTAMP_NANOS,
    VALUE_SHIFT,
};

#[derive(Debug)]
pub struct MappedRecord<'a> {
    buf: MappedBuf<'a>,
    key: Mapped<'a>,
    value: Mapped<'a>,
    scheme: Mapped<'a>,
    /// Offsets of key, value and scheme within `buf`.
    offsets: [usize; 3],
    timestamp: Option<SystemTime>,
}

impl<'a> MappedRecord<'a> {
    /// Decodes the record at the front of `buf`, returning the view and the
    /// number of bytes it occupies.
    pub fn decode(buf: impl Into<MappedBuf<'a>>) -> Result<(Self, usize)> {
        Self::decode_nested(buf, 1)
    }

    /// Decodes a record whose fields sit `depth` levels below the top-level
    /// value.
    pub(crate) fn decode_nested(
        buf: impl Into<MappedBuf<'a>>,
        depth: usize,
    ) -> Result<(Self, usize)> {
        let buf = buf.into();
        let bytes = buf.as_slice();
        let magic = *bytes.first().ok_or(CodecError::TruncatedBuffer {
            needed: RECORD_MAGIC_LENGTH,
            available: 0,
        })?;

        let mut pos = RECORD_MAGIC_LENGTH;
        let mut field = |name: &'static str, shift: u8| -> Result<(Mapped<'a>, usize)> {
            let at = pos;
            let context = ParentContext::from_bits(magic >> shift);
            let (view, consumed) = Mapped::nested(context, buf.slice(at..buf.len()), depth)
                .wrap_err_with(|| format!("failed to decode record {name}"))?;
            pos += consumed;
            Ok((view, at))
        };
        let (key, key_at) = field("key", KEY_SHIFT)?;
        let (value, value_at) = field("value", VALUE_SHIFT)?;
        let (scheme, scheme_at) = field("scheme", SCHEME_SHIFT)?;

        let timestamp = match magic & TIMESTAMP_MASK {
            TIMESTAMP_ABSENT => None,
            TIMESTAMP_NANOS => {
                let end = require(bytes, pos, TIMESTAMP_LENGTH)?;
                let mut raw = [0u8; TIMESTAMP_LENGTH];
                raw.copy_from_slice(&bytes[pos..end]);
                pos = end;
                let nanos = Duration::from_nanos(u64::from_be_bytes(raw));
                Some(
                    UNIX_EPOCH
                        .checked_add(nanos)
                        .ok_or(CodecError::InvalidTimestamp)?,
                )
            }
            _ => {
                return Err(CodecError::InvalidHeader {
                    byte: magic,
                    field: "timestamp",
                }
                .into())
            }
        };

        let record = MappedRecord {
            buf: buf.slice(0..pos),
            key,
            value,
            scheme,
            offsets: [key_at, value_at, scheme_at],
            timestamp,
        };
        Ok((record, pos))
    }

    /// An equal view that owns its bytes, shared by all three fields.
    pub fn copy(&self) -> MappedRecord<'static> {
        let base = self.buf.to_shared();
        MappedRecord {
            key: self.key.rebase(&base, self.offsets[0]),
            value: self.value.rebase(&base, self.offsets[1]),
            scheme: self.scheme.rebase(&base, self.offsets[2]),
            offsets: self.offsets,
            timestamp: self.timestamp,
            buf: base,
        }
    }
}

impl<'a> Record for MappedRecord<'a> {
    type Field = Mapped<'a>;

    fn key(&self) -> &Mapped<'a> {
        &self.key
    }

    fn value(&self) -> &Mapped<'a> {
        &self.value
    }

    fn scheme(&self) -> &Mapped<'a> {
        &self.scheme
    }

    fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    fn encode(&mut self) -> Result<&[u8]> {
        Err(CodecError::EncodeUnsupported.into())
    }

    fn buf(&self) -> &[u8] {
        self.buf.as_slice()
    }

    fn is_decoded(&self) -> bool {
        true
    }

    fn copy_construct(&self) -> Result<OwnedRecord> {
        let mut record = OwnedRecord::new(self.key.copy_construct()?);
        record
            .set_value(self.value.copy_construct()?)
            .set_scheme(self.scheme.copy_construct()?)
            .set_timestamp(self.timestamp);
        Ok(record)
    }
}
