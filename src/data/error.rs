//! # Codec Errors
//!
//! Every data-format fault the codec can report. Operations return
//! `eyre::Result`, and the kind is recovered with
//! `report.downcast_ref::<CodecError>()`, which still works after context has
//! been attached with `wrap_err`.
//!
//! Misuse of the API (reading structure from an undecoded view, reading the
//! buffer of an unencoded value) is not represented here: those are
//! programming errors and panic.

use std::fmt;

use crate::encoding::ParentContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Content (at any level) does not fit the two-byte length code.
    ContentTooLarge { len: usize, max: usize },
    /// A container holds more children than the two-byte count code allows.
    TooManyChildren { count: usize },
    /// A declared count or length runs past the end of the buffer.
    TruncatedBuffer { needed: usize, available: usize },
    /// A lazily materialized child starts beyond its parent's content region.
    TruncatedContent { offset: usize, len: usize },
    /// A two-bit field holds the reserved code 3.
    InvalidHeader { byte: u8, field: &'static str },
    /// Both the array and record-list count codes are set.
    ConflictingVariant { byte: u8 },
    /// The lookup or compression bit is set.
    UnsupportedFeature { byte: u8, feature: &'static str },
    /// A view was asked to decode under a parent context it cannot handle.
    UnsupportedParent { found: ParentContext },
    /// A view was decoded again under a different context than its first decode.
    ParentContextMismatch {
        stored: ParentContext,
        requested: ParentContext,
    },
    /// Mapped values are already encoded and cannot be re-encoded.
    EncodeUnsupported,
    /// Constructed values own their data and have nothing to decode.
    DecodeUnsupported,
    IndexOutOfRange { index: usize, size: usize },
    WrongVariant {
        expected: &'static str,
        found: &'static str,
    },
    /// An encoded record field exceeds its per-field limit.
    RecordFieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },
    /// A timestamp before the Unix epoch or beyond 64-bit nanoseconds.
    InvalidTimestamp,
    /// A value is nested deeper than `MAX_NESTING_DEPTH`.
    NestingTooDeep { depth: usize, max: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ContentTooLarge { len, max } => {
                write!(f, "content length {len} exceeds maximum {max}")
            }
            CodecError::TooManyChildren { count } => {
                write!(f, "container holds {count} children, too many to encode")
            }
            CodecError::TruncatedBuffer { needed, available } => {
                write!(f, "truncated buffer: need {needed} bytes, have {available}")
            }
            CodecError::TruncatedContent { offset, len } => {
                write!(f, "child offset {offset} beyond content length {len}")
            }
            CodecError::InvalidHeader { byte, field } => {
                write!(f, "invalid header {byte:#04x}: reserved code in {field}")
            }
            CodecError::ConflictingVariant { byte } => {
                write!(f, "invalid header {byte:#04x}: both array and record list counts set")
            }
            CodecError::UnsupportedFeature { byte, feature } => {
                write!(f, "invalid header {byte:#04x}: {feature} not supported")
            }
            CodecError::UnsupportedParent { found } => {
                write!(f, "unsupported parent context {found:?}")
            }
            CodecError::ParentContextMismatch { stored, requested } => {
                write!(f, "parent context mismatch: decoded as {stored:?}, requested {requested:?}")
            }
            CodecError::EncodeUnsupported => write!(f, "encode not supported for mapped data"),
            CodecError::DecodeUnsupported => {
                write!(f, "decode not supported for constructed data")
            }
            CodecError::IndexOutOfRange { index, size } => {
                write!(f, "index {index} out of range (size={size})")
            }
            CodecError::WrongVariant { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            CodecError::RecordFieldTooLarge { field, len, max } => {
                write!(f, "record {field} is {len} bytes, maximum {max}")
            }
            CodecError::InvalidTimestamp => {
                write!(f, "timestamp not representable as nanoseconds since the Unix epoch")
            }
            CodecError::NestingTooDeep { depth, max } => {
                write!(f, "nesting depth {depth} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for CodecError {}
