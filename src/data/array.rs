//! Constructed array: an ordered list of owned values, each encoded
//! self-describing inside the array's content region.

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::data::{count_code, frame_container, index_error, CodecError, Constructed, Data, Encoded};
use crate::encoding::{ParentContext, Shape};
use crate::record::OwnedRecord;

#[derive(Debug, Clone, Default)]
pub struct DataArray {
    children: Vec<Constructed>,
    encoded: Option<Encoded>,
}

impl DataArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children(children: Vec<Constructed>) -> Self {
        Self {
            children,
            encoded: None,
        }
    }

    /// Appends a child, invalidating any cached encoding.
    pub fn append(&mut self, child: impl Into<Constructed>) -> &mut Self {
        self.children.push(child.into());
        self.encoded = None;
        self
    }

    /// Removes and returns the child at `index`, shifting later children down.
    pub fn delete_at(&mut self, index: usize) -> Result<Constructed> {
        if index >= self.children.len() {
            return Err(index_error(index, self.children.len()).into());
        }
        self.encoded = None;
        Ok(self.children.remove(index))
    }

    /// Mutable access to a child. Invalidates the cached encoding since the
    /// child may change through the returned reference.
    pub fn child_at_mut(&mut self, index: usize) -> Result<&mut Constructed> {
        let size = self.children.len();
        self.encoded = None;
        self.children
            .get_mut(index)
            .ok_or_else(|| index_error(index, size).into())
    }

    pub fn clear(&mut self) {
        self.children.clear();
        self.encoded = None;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constructed> {
        self.children.iter()
    }

    pub fn into_children(self) -> Vec<Constructed> {
        self.children
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded.is_some()
    }

    /// Encodes the array. Arrays are always self-describing, so the context
    /// echo is `SelfDescribing`.
    ///
    /// Fails with `TooManyChildren` before touching any child, then with the
    /// first child failure, then with `ContentTooLarge` if the children do
    /// not fit one content region.
    pub fn encode(&mut self) -> Result<(&[u8], ParentContext)> {
        if self.encoded.is_none() {
            self.encoded = Some(self.encode_uncached()?);
        }
        let enc = self.cached("encode");
        Ok((&enc.buf, enc.context))
    }

    fn encode_uncached(&mut self) -> Result<Encoded> {
        let count = self.children.len();
        let count_code = count_code(count)?;

        let mut content = Vec::new();
        let mut height = 0;
        for (index, child) in self.children.iter_mut().enumerate() {
            let (bytes, _) = child
                .encode(false)
                .wrap_err_with(|| format!("failed to encode array child {index}"))?;
            content.extend_from_slice(bytes);
            height = height.max(child.encoded_height() + 1);
        }

        let encoded = frame_container(Shape::Array, count_code, count, &content, height)?;
        debug!(children = count, bytes = encoded.buf.len(), "encoded data array");
        Ok(encoded)
    }

    /// The last encoded buffer.
    ///
    /// # Panics
    ///
    /// Panics if the array has not been encoded since its last change.
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
            None => panic!("DataArray::{accessor} called before encode"),
        }
    }
}

impl Data for DataArray {
    type Child = Constructed;
    type Rec = OwnedRecord;

    fn is_nil(&self) -> bool {
        self.children.is_empty()
    }

    fn is_primitive(&self) -> bool {
        false
    }

    fn is_array(&self) -> bool {
        true
    }

    fn is_record_list(&self) -> bool {
        false
    }

    fn size(&self) -> usize {
        self.children.len()
    }

    fn child_at(&self, index: usize) -> Result<&Constructed> {
        self.children
            .get(index)
            .ok_or_else(|| index_error(index, self.children.len()).into())
    }

    fn record_at(&self, _index: usize) -> Result<&OwnedRecord> {
        Err(CodecError::WrongVariant {
            expected: Shape::RecordList.name(),
            found: Shape::Array.name(),
        }
        .into())
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn copy_construct(&self) -> Result<Constructed> {
        let children = self
            .children
            .iter()
            .map(Data::copy_construct)
            .collect::<Result<Vec<_>>>()?;
        Ok(Constructed::Array(DataArray::with_children(children)))
    }
}

impl PartialEq for DataArray {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for DataArray {}

impl<C: Into<Constructed>> FromIterator<C> for DataArray {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        DataArray::with_children(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a DataArray {
    type Item = &'a Constructed;
    type IntoIter = std::slice::Iter<'a, Constructed>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}
