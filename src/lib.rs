//! # datamap - Self-Describing Binary Values
//!
//! A compact binary encoding for three kinds of value: opaque byte strings
//! (primitives), ordered arrays of values, and ordered lists of records.
//! Every encoded buffer can be read two ways:
//!
//! - **Mapped**: a zero-copy view over the buffer. Decoding parses only the
//!   top-level header; children are parsed on first access and cached.
//! - **Constructed**: an owned, mutable tree built in memory and encoded on
//!   demand, with the encoding cached until the tree changes.
//!
//! Both implement [`Data`], so read-only code does not care which one it holds.
//!
//! ## Quick Start
//!
//! ```
//! use datamap::{Data, DataArray, MappedComposite, OwnedRecord, RecordList};
//!
//! let mut records = RecordList::new();
//! records.append(OwnedRecord::new("user:1").with_value("alice"));
//!
//! let mut root = DataArray::new();
//! root.append("header").append(records);
//! let (buf, _) = root.encode()?;
//! let buf = buf.to_vec();
//!
//! let view = MappedComposite::new(&buf)?;
//! let list = view.child_at(1)?;
//! assert!(list.is_record_list());
//! assert_eq!(view.materialized(), 2);
//! # Ok::<(), eyre::Report>(())
//! ```
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Value / ValueRef (either representation)    │
//! ├──────────────────────┬──────────────────────┤
//! │ data: Primitive,     │ mapped: MappedBuf,   │
//! │ DataArray,           │ MappedPrimitive,     │
//! │ RecordList           │ MappedComposite      │
//! ├──────────────────────┴──────────────────────┤
//! │  record: OwnedRecord, MappedRecord           │
//! ├─────────────────────────────────────────────┤
//! │  encoding: header byte, length prefixes      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: format ceilings and record field limits
//! - [`encoding`]: the header byte and big-endian count/length prefixes
//! - [`data`]: the value contract, errors, and constructed values
//! - [`mapped`]: zero-copy views and the materialization cache
//! - [`record`]: the record format in both representations

pub mod config;
pub mod data;
pub mod encoding;
pub mod mapped;
pub mod record;

pub use data::{CodecError, Constructed, Data, DataArray, Primitive, RecordList, Value, ValueRef};
pub use encoding::ParentContext;
pub use mapped::{Mapped, MappedBuf, MappedComposite, MappedPrimitive};
pub use record::{MappedRecord, OwnedRecord, Record, RecordRef};
