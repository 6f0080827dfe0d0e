//! # Encoding Module
//!
//! Byte-level building blocks shared by the constructed and mapped
//! representations:
//!
//! - **Header byte**: bit-packed variant, count and content-length codes
//! - **Prefixes**: 0/1/2-byte big-endian counts and lengths

pub mod header;
pub mod length;

pub use header::{Header, HeaderLayout, ParentContext, Shape, SizeCode};
pub use length::{push_sized, read_sized, Frame};
