//! # Data Values
//!
//! This module defines the value contract shared by every representation and
//! the constructed (owned, mutable) side of the codec.
//!
//! ## Two Representations
//!
//! | Representation | Types | Encode | Decode |
//! |----------------|-------|--------|--------|
//! | **Constructed** | [`Primitive`], [`DataArray`], [`RecordList`], [`Constructed`] | yes, cached until mutated | no |
//! | **Mapped** | [`MappedPrimitive`](crate::mapped::MappedPrimitive), [`MappedComposite`](crate::mapped::MappedComposite), [`Mapped`](crate::mapped::Mapped) | no | lazily, children on first access |
//!
//! Both implement [`Data`], so read-only code can be written once. The sum
//! type [`Value`] holds either representation and turns the wrong-direction
//! operation into [`CodecError::EncodeUnsupported`] or
//! [`CodecError::DecodeUnsupported`].
//!
//! ## Lifecycle
//!
//! ```text
//! Constructed:  Unencoded --encode--> Encoded --append/delete--> Unencoded
//! Mapped:       Undecoded --decode--> Decoded   (one way)
//! ```
//!
//! Structural accessors on an undecoded view, and `buf()` on an unencoded
//! constructed value, panic: that is caller misuse, not bad input.
//!
//! ## Usage
//!
//! ```
//! use datamap::data::{Constructed, Data, DataArray, Primitive};
//! use datamap::mapped::MappedComposite;
//!
//! let mut array = DataArray::new();
//! array.append(Primitive::new("abc"));
//! let (buf, _) = array.encode().unwrap();
//! assert_eq!(buf, &[0x41, 0x01, 0x05, 0x01, 0x03, b'a', b'b', b'c']);
//!
//! let view = MappedComposite::new(buf).unwrap();
//! assert_eq!(view.size(), 1);
//! assert_eq!(view.child_at(0).unwrap().raw_bytes(), Some(&b"abc"[..]));
//!
//! let editable: Constructed = view.copy_construct().unwrap();
//! assert!(editable.is_array());
//! ```

pub mod array;
pub mod constructed;
pub mod error;
pub mod primitive;
pub mod record_list;
pub mod value;


use eyre::Result;
use smallvec::smallvec;

use crate::config::{MAX_CHILD_COUNT, MAX_CONTENT_LENGTH, MAX_NESTING_DEPTH};
use crate::encoding::{push_sized, Frame, Header, ParentContext, Shape, SizeCode};
use crate::record::Record;

pub use array::DataArray;
pub use constructed::Constructed;
pub use error::CodecError;
pub use primitive::Primitive;
pub use record_list::RecordList;
pub use value::{Value, ValueRef};

/// The representation-independent value contract.
///
/// `is_nil` is always cheap. The other classifiers, `size`, and the child
/// accessors require a mapped value to be decoded and panic otherwise.
pub trait Data {
    /// Type of the children of an array.
    type Child: Data;
    /// Type of the children of a record list.
    type Rec: Record;

    fn is_nil(&self) -> bool;
    fn is_primitive(&self) -> bool;
    fn is_array(&self) -> bool;
    fn is_record_list(&self) -> bool;

    /// Number of children; zero for primitives.
    fn size(&self) -> usize;

    /// The `index`-th child of an array.
    ///
    /// Fails with `IndexOutOfRange` past the end and `WrongVariant` on
    /// anything but an array.
    fn child_at(&self, index: usize) -> Result<&Self::Child>;

    /// The `index`-th record of a record list.
    fn record_at(&self, index: usize) -> Result<&Self::Rec>;

    /// Leaf content. `None` for arrays and record lists; nil reads as empty.
    fn raw_bytes(&self) -> Option<&[u8]>;

    /// Deep copy into the constructed representation, whatever `self` is.
    fn copy_construct(&self) -> Result<Constructed>;

    fn variant_name(&self) -> &'static str {
        if self.is_array() {
            Shape::Array.name()
        } else if self.is_record_list() {
            Shape::RecordList.name()
        } else {
            Shape::Primitive.name()
        }
    }
}

/// Cached output of the last encode of a constructed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Encoded {
    pub buf: Vec<u8>,
    pub header: Header,
    pub context: ParentContext,
    pub as_child: bool,
    /// Depth of the deepest value inside, relative to this one.
    pub height: usize,
}

pub(crate) fn index_error(index: usize, size: usize) -> CodecError {
    CodecError::IndexOutOfRange { index, size }
}

/// Count code for a container, checked before any child is encoded.
pub(crate) fn count_code(count: usize) -> Result<SizeCode> {
    match SizeCode::for_value(count) {
        Some(code) if count <= MAX_CHILD_COUNT => Ok(code),
        _ => Err(CodecError::TooManyChildren { count }.into()),
    }
}

/// Rejects a value whose deepest descendant would sit past
/// `MAX_NESTING_DEPTH`, since decoding it back would fail.
pub(crate) fn check_height(height: usize) -> Result<()> {
    if height > MAX_NESTING_DEPTH {
        return Err(CodecError::NestingTooDeep {
            depth: height,
            max: MAX_NESTING_DEPTH,
        }
        .into());
    }
    Ok(())
}

/// Frames the concatenated child encodings of an array or record list.
pub(crate) fn frame_container(
    shape: Shape,
    count_code: SizeCode,
    count: usize,
    content: &[u8],
    height: usize,
) -> Result<Encoded> {
    check_height(height)?;
    let length_code = SizeCode::for_value(content.len()).ok_or(CodecError::ContentTooLarge {
        len: content.len(),
        max: MAX_CONTENT_LENGTH,
    })?;
    let header = match shape {
        Shape::RecordList => Header::record_list(count_code, length_code),
        _ => Header::array(count_code, length_code),
    };

    let mut frame: Frame = smallvec![header.raw()];
    push_sized(&mut frame, count_code, count);
    push_sized(&mut frame, length_code, content.len());

    let mut buf = Vec::with_capacity(frame.len() + content.len());
    buf.extend_from_slice(&frame);
    buf.extend_from_slice(content);

    Ok(Encoded {
        buf,
        header,
        context: ParentContext::SelfDescribing,
        as_child: false,
        height,
    })
}
