//! Constructed record list: an ordered list of owned records, each a
//! self-contained record encoding inside the list's content region.

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::data::{count_code, frame_container, index_error, CodecError, Constructed, Data, Encoded};
use crate::encoding::{ParentContext, Shape};
use crate::record::{OwnedRecord, Record};

#[derive(Debug, Clone, Default)]
pub struct RecordList {
    records: Vec<OwnedRecord>,
    encoded: Option<Encoded>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<OwnedRecord>) -> Self {
        Self {
            records,
            encoded: None,
        }
    }

    pub fn append(&mut self, record: OwnedRecord) -> &mut Self {
        self.records.push(record);
        self.encoded = None;
        self
    }

    pub fn delete_at(&mut self, index: usize) -> Result<OwnedRecord> {
        if index >= self.records.len() {
            return Err(index_error(index, self.records.len()).into());
        }
        self.encoded = None;
        Ok(self.records.remove(index))
    }

    pub fn record_at_mut(&mut self, index: usize) -> Result<&mut OwnedRecord> {
        let size = self.records.len();
        self.encoded = None;
        self.records
            .get_mut(index)
            .ok_or_else(|| index_error(index, size).into())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.encoded = None;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OwnedRecord> {
        self.records.iter()
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded.is_some()
    }

    /// Encodes the list; same failure order as [`DataArray::encode`](crate::data::DataArray::encode).
    pub fn encode(&mut self) -> Result<(&[u8], ParentContext)> {
        if self.encoded.is_none() {
            self.encoded = Some(self.encode_uncached()?);
        }
        let enc = self.cached("encode");
        Ok((&enc.buf, enc.context))
    }

    fn encode_uncached(&mut self) -> Result<Encoded> {
        let count = self.records.len();
        let count_code = count_code(count)?;

        let mut content = Vec::new();
        let mut height = 0;
        for (index, record) in self.records.iter_mut().enumerate() {
            let bytes = record
                .encode()
                .wrap_err_with(|| format!("failed to encode record {index}"))?;
            content.extend_from_slice(bytes);
            height = height.max(record.encoded_height());
        }

        let encoded = frame_container(Shape::RecordList, count_code, count, &content, height)?;
        debug!(records = count, bytes = encoded.buf.len(), "encoded record list");
        Ok(encoded)
    }

    /// # Panics
    ///
    /// Panics if the list has not been encoded since its last change.
    pub fn buf(&self) -> &[u8] {
        &self.cached("buf").buf
    }

    pub fn header_byte(&self) -> u8 {
        self.cached("header_byte").header.raw()
    }

    pub(crate) fn encoded_height(&self) -> usize {
        self.cached("encoded_height").height
    }

    fn cached(&self, accessor: &str) -> &Encoded {
        match &self.encoded {
            Some(enc) => enc,
            None => panic!("RecordList::{accessor} called before encode"),
        }
    }
}

impl Data for RecordList {
    type Child = Constructed;
    type Rec = OwnedRecord;

    fn is_nil(&self) -> bool {
        self.records.is_empty()
    }

    fn is_primitive(&self) -> bool {
        false
    }

    fn is_array(&self) -> bool {
        false
    }

    fn is_record_list(&self) -> bool {
        true
    }

    fn size(&self) -> usize {
        self.records.len()
    }

    fn child_at(&self, _index: usize) -> Result<&Constructed> {
        Err(CodecError::WrongVariant {
            expected: Shape::Array.name(),
            found: Shape::RecordList.name(),
        }
        .into())
    }

    fn record_at(&self, index: usize) -> Result<&OwnedRecord> {
        self.records
            .get(index)
            .ok_or_else(|| index_error(index, self.records.len()).into())
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn copy_construct(&self) -> Result<Constructed> {
        let records = self
            .records
            .iter()
            .map(Record::copy_construct)
            .collect::<Result<Vec<_>>>()?;
        Ok(Constructed::RecordList(RecordList::with_records(records)))
    }
}

impl PartialEq for RecordList {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for RecordList {}

impl FromIterator<OwnedRecord> for RecordList {
    fn from_iter<I: IntoIterator<Item = OwnedRecord>>(iter: I) -> Self {
        RecordList::with_records(iter.into_iter().collect())
    }
}
