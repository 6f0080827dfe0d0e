//! # Mapped Composite
//!
//! A read-only, zero-copy view over a self-describing value: a leaf, an array
//! or a record list, told apart by the header byte.
//!
//! ## Decode
//!
//! Decoding reads only the header, the count and the content length, then
//! trims the view's buffer to exactly the bytes the value occupies, so the
//! next sibling starts where this one ends. Children stay unparsed.
//!
//! ## Lazy Materialization
//!
//! The format has no offset table: child `i` starts where child `i - 1` ends.
//! Each child has a slot that is filled on first access and never cleared.
//!
//! ```text
//! slots:   [ c0 ][ c1 ][    ][    ][    ]
//!                     ^ end offset of the last filled slot
//! child_at(3) parses c2 then c3 from that offset; c4 stays empty
//! ```
//!
//! Filled slots always form a prefix, so resolving index `i` resumes from the
//! last filled slot before it. Forward sequential access is the cheap pattern
//! (amortized O(1) per child); a cold random access is O(i).
//!
//! Slots are `OnceCell`s: a view is `Sync`, and threads racing on the same
//! slot agree on one parsed child.
//!
//! ## Depth
//!
//! Each view knows how deep it sits below the top-level value. Decoding a view
//! deeper than `MAX_NESTING_DEPTH` fails with `NestingTooDeep`, which bounds
//! the recursion of `copy_construct` over untrusted input.

use std::ops::Range;

use eyre::{Result, WrapErr};
use once_cell::sync::OnceCell;
use tracing::trace;

use crate::config::MAX_NESTING_DEPTH;
use crate::data::{index_error, CodecError, Constructed, Data, DataArray, Primitive, RecordList};
use crate::encoding::length::require;
use crate::encoding::{read_sized, Header, HeaderLayout, ParentContext, Shape};
use crate::mapped::MappedBuf;
use crate::record::{MappedRecord, Record};

#[derive(Debug)]
pub struct MappedComposite<'a> {
    buf: MappedBuf<'a>,
    depth: usize,
    decoded: Option<Decoded<'a>>,
}

#[derive(Debug)]
struct Decoded<'a> {
    header: Header,
    layout: HeaderLayout,
    content: Range<usize>,
    slots: Slots<'a>,
}

#[derive(Debug)]
enum Slots<'a> {
    Leaf,
    Children(Box<[OnceCell<Materialized<MappedComposite<'a>>>]>),
    Records(Box<[OnceCell<Materialized<MappedRecord<'a>>>]>),
}

/// A parsed child and the content offset just past it.
#[derive(Debug)]
struct Materialized<T> {
    value: T,
    end: usize,
}

fn empty_slots<T>(count: usize) -> Box<[OnceCell<T>]> {
    (0..count).map(|_| OnceCell::new()).collect()
}

impl<'a> Slots<'a> {
    fn for_shape(shape: Shape, count: usize) -> Self {
        match shape {
            Shape::Primitive => Slots::Leaf,
            Shape::Array => Slots::Children(empty_slots(count)),
            Shape::RecordList => Slots::Records(empty_slots(count)),
        }
    }

    fn len(&self) -> usize {
        match self {
            Slots::Leaf => 0,
            Slots::Children(s) => s.len(),
            Slots::Records(s) => s.len(),
        }
    }

    fn filled(&self) -> usize {
        match self {
            Slots::Leaf => 0,
            Slots::Children(s) => s.iter().filter(|c| c.get().is_some()).count(),
            Slots::Records(s) => s.iter().filter(|c| c.get().is_some()).count(),
        }
    }
}

impl<'a> MappedComposite<'a> {
    /// Wraps `buf` without reading it.
    pub fn wrap(buf: impl Into<MappedBuf<'a>>) -> Self {
        Self::wrap_nested(buf, 0)
    }

    /// Wraps `buf` as a value `depth` levels below the top-level value.
    pub(crate) fn wrap_nested(buf: impl Into<MappedBuf<'a>>, depth: usize) -> Self {
        Self {
            buf: buf.into(),
            depth,
            decoded: None,
        }
    }

    /// Wraps and decodes a top-level value.
    pub fn new(buf: impl Into<MappedBuf<'a>>) -> Result<Self> {
        let mut view = Self::wrap(buf);
        view.decode(ParentContext::SelfDescribing)?;
        Ok(view)
    }

    /// Parses the header, count and content length.
    ///
    /// Only `SelfDescribing` is accepted; decoding an already decoded view is
    /// a no-op.
    pub fn decode(&mut self, context: ParentContext) -> Result<()> {
        if context != ParentContext::SelfDescribing {
            return Err(CodecError::UnsupportedParent { found: context }.into());
        }
        if self.decoded.is_some() {
            return Ok(());
        }
        check_depth(self.depth)?;

        let bytes = self.buf.as_slice();
        let first = *bytes.first().ok_or(CodecError::TruncatedBuffer {
            needed: 1,
            available: 0,
        })?;
        let header = Header::from_byte(first);
        let layout = header.layout()?;

        let mut pos = 1;
        let count = read_sized(bytes, pos, layout.count_code)?;
        pos += layout.count_code.width();
        let len = read_sized(bytes, pos, layout.length_code)?;
        pos += layout.length_code.width();
        let end = require(bytes, pos, len)?;

        trace!(
            header = first,
            shape = layout.shape.name(),
            count,
            len,
            "decoded composite"
        );

        self.buf = self.buf.slice(0..end);
        self.decoded = Some(Decoded {
            header,
            layout,
            content: pos..end,
            slots: Slots::for_shape(layout.shape, count),
        });
        Ok(())
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    /// # Panics
    ///
    /// Panics if the view has not been decoded.
    pub fn header(&self) -> Header {
        self.require_decoded("header").header
    }

    pub fn layout(&self) -> HeaderLayout {
        self.require_decoded("layout").layout
    }

    /// Exactly the bytes this value occupies.
    ///
    /// # Panics
    ///
    /// Panics if the view has not been decoded.
    pub fn buf(&self) -> &[u8] {
        self.require_decoded("buf");
        self.buf.as_slice()
    }

    /// The content region: leaf bytes, or the concatenated children.
    pub fn content(&self) -> &[u8] {
        let range = self.require_decoded("content").content.clone();
        &self.buf.as_slice()[range]
    }

    /// Number of children parsed so far.
    pub fn materialized(&self) -> usize {
        self.require_decoded("materialized").slots.filled()
    }

    /// Children in order, each parsed on first visit.
    pub fn iter_children(&self) -> impl Iterator<Item = Result<&MappedComposite<'a>>> + '_ {
        (0..self.size()).map(move |i| self.child_at(i))
    }

    pub fn iter_records(&self) -> impl Iterator<Item = Result<&MappedRecord<'a>>> + '_ {
        (0..self.size()).map(move |i| self.record_at(i))
    }

    /// An equal view that owns its bytes. Decoded state is kept; the
    /// materialization cache starts empty.
    pub fn copy(&self) -> MappedComposite<'static> {
        self.rebase(&self.buf.to_shared(), 0)
    }

    /// The same view over `base[at..]`, which must hold identical bytes.
    pub(crate) fn rebase(&self, base: &MappedBuf<'static>, at: usize) -> MappedComposite<'static> {
        let decoded = self.decoded.as_ref().map(|d| Decoded {
            header: d.header,
            layout: d.layout,
            content: d.content.clone(),
            slots: Slots::for_shape(d.layout.shape, d.slots.len()),
        });
        MappedComposite {
            buf: base.slice(at..at + self.buf.len()),
            depth: self.depth,
            decoded,
        }
    }

    pub(crate) fn buf_len(&self) -> usize {
        self.buf.len()
    }

    fn require_decoded(&self, accessor: &str) -> &Decoded<'a> {
        match &self.decoded {
            Some(d) => d,
            None => panic!("MappedComposite::{accessor} called before decode"),
        }
    }

    fn content_buf(&self, offset: usize) -> Result<MappedBuf<'a>> {
        let content = &self.require_decoded("child_at").content;
        let len = content.len();
        if offset >= len {
            return Err(CodecError::TruncatedContent { offset, len }.into());
        }
        Ok(self.buf.slice(content.start + offset..content.end))
    }

    /// Resolves slot `index`, parsing every empty slot before it in order.
    fn materialize<'s, T>(
        &'s self,
        slots: &'s [OnceCell<Materialized<T>>],
        index: usize,
        parse: fn(MappedBuf<'a>, usize) -> Result<(T, usize)>,
    ) -> Result<&'s T> {
        let slot = slots.get(index).ok_or_else(|| index_error(index, slots.len()))?;
        if let Some(done) = slot.get() {
            return Ok(&done.value);
        }

        let (first, mut offset) = slots[..index]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(j, s)| s.get().map(|m| (j + 1, m.end)))
            .unwrap_or((0, 0));

        let parse_at = |j: usize, offset: usize| -> Result<Materialized<T>> {
            let (value, consumed) = parse(self.content_buf(offset)?, self.depth + 1)
                .wrap_err_with(|| format!("failed to decode child {j}"))?;
            trace!(index = j, offset, consumed, "materialized child");
            Ok(Materialized {
                value,
                end: offset + consumed,
            })
        };

        for (j, earlier) in slots.iter().enumerate().take(index).skip(first) {
            offset = earlier.get_or_try_init(|| parse_at(j, offset))?.end;
        }
        Ok(&slot.get_or_try_init(|| parse_at(index, offset))?.value)
    }
}

/// Fails if a value `depth` levels down is past `MAX_NESTING_DEPTH`.
pub(crate) fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(CodecError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        }
        .into());
    }
    Ok(())
}

fn parse_child<'a>(buf: MappedBuf<'a>, depth: usize) -> Result<(MappedComposite<'a>, usize)> {
    let mut child = MappedComposite::wrap_nested(buf, depth);
    child.decode(ParentContext::SelfDescribing)?;
    let consumed = child.buf_len();
    Ok((child, consumed))
}

/// Records have no header of their own; their fields sit at `depth`.
fn parse_record<'a>(buf: MappedBuf<'a>, depth: usize) -> Result<(MappedRecord<'a>, usize)> {
    MappedRecord::decode_nested(buf, depth)
}

impl<'a> Data for MappedComposite<'a> {
    type Child = MappedComposite<'a>;
    type Rec = MappedRecord<'a>;

    fn is_nil(&self) -> bool {
        match &self.decoded {
            Some(d) => d.header == Header::NIL || (d.layout.shape == Shape::Primitive && d.content.is_empty()),
            None => self.buf.as_slice().first().map_or(true, |b| *b == Header::NIL.raw()),
        }
    }

    fn is_primitive(&self) -> bool {
        self.require_decoded("is_primitive").layout.shape == Shape::Primitive
    }

    fn is_array(&self) -> bool {
        self.require_decoded("is_array").layout.shape == Shape::Array
    }

    fn is_record_list(&self) -> bool {
        self.require_decoded("is_record_list").layout.shape == Shape::RecordList
    }

    fn size(&self) -> usize {
        self.require_decoded("size").slots.len()
    }

    fn child_at(&self, index: usize) -> Result<&MappedComposite<'a>> {
        let decoded = self.require_decoded("child_at");
        match &decoded.slots {
            Slots::Children(slots) => self.materialize(&slots[..], index, parse_child),
            _ => Err(CodecError::WrongVariant {
                expected: Shape::Array.name(),
                found: decoded.layout.shape.name(),
            }
            .into()),
        }
    }

    fn record_at(&self, index: usize) -> Result<&MappedRecord<'a>> {
        let decoded = self.require_decoded("record_at");
        match &decoded.slots {
            Slots::Records(slots) => self.materialize(&slots[..], index, parse_record),
            _ => Err(CodecError::WrongVariant {
                expected: Shape::RecordList.name(),
                found: decoded.layout.shape.name(),
            }
            .into()),
        }
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        self.is_primitive().then(|| self.content())
    }

    fn copy_construct(&self) -> Result<Constructed> {
        match self.require_decoded("copy_construct").layout.shape {
            Shape::Primitive if self.is_nil() => Ok(Primitive::nil().into()),
            Shape::Primitive => Ok(Primitive::new(self.content()).into()),
            Shape::Array => {
                let children = self
                    .iter_children()
                    .map(|child| child?.copy_construct())
                    .collect::<Result<Vec<_>>>()?;
                Ok(DataArray::with_children(children).into())
            }
            Shape::RecordList => {
                let records = self
                    .iter_records()
                    .map(|record| record?.copy_construct())
                    .collect::<Result<Vec<_>>>()?;
                Ok(RecordList::with_records(records).into())
            }
        }
    }
}
