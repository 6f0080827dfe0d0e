//! Constructed record: owned fields, encoded on demand and cached until a
//! setter changes a field.

use std::time::{SystemTime, UNIX_EPOCH};

use eyre::{Result, WrapErr};

use crate::config::{
    MAX_KEY_LENGTH, MAX_SCHEME_LENGTH, MAX_VALUE_LENGTH, RECORD_MAGIC_LENGTH, TIMESTAMP_LENGTH,
};
use crate::data::{check_height, CodecError, Constructed, Data};
use crate::encoding::ParentContext;
use crate::record::{Record, KEY_SHIFT, SCHEME_SHIFT, TIMESTAMP_ABSENT, TIMESTAMP_NANOS, VALUE_SHIFT};

#[derive(Debug, Clone, Default)]
pub struct OwnedRecord {
    key: Constructed,
    value: Constructed,
    scheme: Constructed,
    timestamp: Option<SystemTime>,
    encoded: Option<Vec<u8>>,
    /// Depth of the deepest field value below the record, valid with `encoded`.
    height: usize,
}

impl OwnedRecord {
    pub fn new(key: impl Into<Constructed>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Constructed>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<Constructed>) -> Self {
        self.set_scheme(scheme);
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.set_timestamp(Some(timestamp));
        self
    }

    pub fn set_key(&mut self, key: impl Into<Constructed>) -> &mut Self {
        self.key = key.into();
        self.encoded = None;
        self
    }

    pub fn set_value(&mut self, value: impl Into<Constructed>) -> &mut Self {
        self.value = value.into();
        self.encoded = None;
        self
    }

    pub fn set_scheme(&mut self, scheme: impl Into<Constructed>) -> &mut Self {
        self.scheme = scheme.into();
        self.encoded = None;
        self
    }

    pub fn set_timestamp(&mut self, timestamp: Option<SystemTime>) -> &mut Self {
        self.timestamp = timestamp;
        self.encoded = None;
        self
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded.is_some()
    }

    pub(crate) fn encoded_height(&self) -> usize {
        match self.encoded {
            Some(_) => self.height,
            None => panic!("OwnedRecord::encoded_height called before encode"),
        }
    }

    fn encode_uncached(&mut self) -> Result<(Vec<u8>, usize)> {
        let mut fields = Vec::new();
        let key = encode_field(&mut self.key, "key", MAX_KEY_LENGTH, &mut fields)?;
        let value = encode_field(&mut self.value, "value", MAX_VALUE_LENGTH, &mut fields)?;
        let scheme = encode_field(&mut self.scheme, "scheme", MAX_SCHEME_LENGTH, &mut fields)?;

        let height = 1 + self
            .key
            .encoded_height()
            .max(self.value.encoded_height())
            .max(self.scheme.encoded_height());
        check_height(height)?;

        let nanos = self.timestamp.map(timestamp_nanos).transpose()?;
        let timestamp_code = match nanos {
            Some(_) => TIMESTAMP_NANOS,
            None => TIMESTAMP_ABSENT,
        };
        let magic = (key.bits() << KEY_SHIFT)
            | (value.bits() << VALUE_SHIFT)
            | (scheme.bits() << SCHEME_SHIFT)
            | timestamp_code;

        let mut buf = Vec::with_capacity(RECORD_MAGIC_LENGTH + fields.len() + TIMESTAMP_LENGTH);
        buf.push(magic);
        buf.extend_from_slice(&fields);
        if let Some(nanos) = nanos {
            buf.extend_from_slice(&nanos.to_be_bytes());
        }
        Ok((buf, height))
    }
}

/// Equality is by fields; the encode cache is ignored.
impl PartialEq for OwnedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.scheme == other.scheme
            && self.timestamp == other.timestamp
    }
}

impl Eq for OwnedRecord {}

fn encode_field(
    field: &mut Constructed,
    name: &'static str,
    max: usize,
    out: &mut Vec<u8>,
) -> Result<ParentContext> {
    let (bytes, context) = field
        .encode(true)
        .wrap_err_with(|| format!("failed to encode record {name}"))?;
    if bytes.len() > max {
        return Err(CodecError::RecordFieldTooLarge {
            field: name,
            len: bytes.len(),
            max,
        }
        .into());
    }
    out.extend_from_slice(bytes);
    Ok(context)
}

fn timestamp_nanos(timestamp: SystemTime) -> Result<u64> {
    let since_epoch = timestamp
        .duration_since(UNIX_EPOCH)
        .map_err(|_| CodecError::InvalidTimestamp)?;
    Ok(u64::try_from(since_epoch.as_nanos()).map_err(|_| CodecError::InvalidTimestamp)?)
}

impl Record for OwnedRecord {
    type Field = Constructed;

    fn key(&self) -> &Constructed {
        &self.key
    }

    fn value(&self) -> &Constructed {
        &self.value
    }

    fn scheme(&self) -> &Constructed {
        &self.scheme
    }

    fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    fn encode(&mut self) -> Result<&[u8]> {
        if self.encoded.is_none() {
            let (buf, height) = self.encode_uncached()?;
            self.encoded = Some(buf);
            self.height = height;
        }
        Ok(self.buf())
    }

    /// # Panics
    ///
    /// Panics if the record has not been encoded since its last change.
    fn buf(&self) -> &[u8] {
        match &self.encoded {
            Some(buf) => buf,
            None => panic!("OwnedRecord::buf called before encode"),
        }
    }

    fn is_decoded(&self) -> bool {
        false
    }

    fn copy_construct(&self) -> Result<OwnedRecord> {
        Ok(OwnedRecord {
            key: self.key.copy_construct()?,
            value: self.value.copy_construct()?,
            scheme: self.scheme.copy_construct()?,
            timestamp: self.timestamp,
            encoded: None,
            height: 0,
        })
    }
}
