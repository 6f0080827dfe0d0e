//! # Mapped Buffer
//!
//! The byte region a mapped view reads from: either a slice of a buffer the
//! caller owns, or a reference-counted [`Bytes`] the view shares with its
//! copies. Slicing never copies in either form, so a whole tree of views over
//! one buffer costs one allocation at most.

use std::ops::Range;

use bytes::Bytes;

#[derive(Debug, Clone)]
pub enum MappedBuf<'a> {
    Borrowed(&'a [u8]),
    Shared(Bytes),
}

impl<'a> MappedBuf<'a> {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            MappedBuf::Borrowed(b) => *b,
            MappedBuf::Shared(b) => b.as_ref(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Sub-region without copying. `range` must lie inside the buffer.
    pub fn slice(&self, range: Range<usize>) -> MappedBuf<'a> {
        match *self {
            MappedBuf::Borrowed(b) => MappedBuf::Borrowed(&b[range]),
            MappedBuf::Shared(ref b) => MappedBuf::Shared(b.slice(range)),
        }
    }

    /// Detaches from the caller's buffer. A borrowed region is copied once;
    /// a shared region only bumps its reference count.
    pub fn to_shared(&self) -> MappedBuf<'static> {
        match self {
            MappedBuf::Borrowed(b) => MappedBuf::Shared(Bytes::copy_from_slice(b)),
            MappedBuf::Shared(b) => MappedBuf::Shared(b.clone()),
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, MappedBuf::Shared(_))
    }
}

impl<'a> From<&'a [u8]> for MappedBuf<'a> {
    fn from(buf: &'a [u8]) -> Self {
        MappedBuf::Borrowed(buf)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for MappedBuf<'a> {
    fn from(buf: &'a [u8; N]) -> Self {
        MappedBuf::Borrowed(buf)
    }
}

impl<'a> From<&'a Vec<u8>> for MappedBuf<'a> {
    fn from(buf: &'a Vec<u8>) -> Self {
        MappedBuf::Borrowed(buf)
    }
}

impl From<Bytes> for MappedBuf<'static> {
    fn from(buf: Bytes) -> Self {
        MappedBuf::Shared(buf)
    }
}

impl From<Vec<u8>> for MappedBuf<'static> {
    fn from(buf: Vec<u8>) -> Self {
        MappedBuf::Shared(Bytes::from(buf))
    }
}

impl AsRef<[u8]> for MappedBuf<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for MappedBuf<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for MappedBuf<'_> {}
