//! # Wire Format Constants
//!
//! This module centralizes every limit the encoder and decoder enforce.
//! Constants that depend on each other are co-located and tied together by
//! compile-time assertions.
//!
//! ## Dependency Graph
//!
//! ```text
//! ONE_BYTE_LIMIT (255)
//!       │
//!       └─> largest count/length that fits code 1 (one-byte prefix)
//!
//! MAX_CONTENT_LENGTH (65535)
//!       │
//!       ├─> MAX_CHILD_COUNT (same two-byte ceiling for counts)
//!       │
//!       └─> MAX_KEY_LENGTH + MAX_VALUE_LENGTH + MAX_SCHEME_LENGTH
//!             + RECORD_MAGIC_LENGTH + TIMESTAMP_LENGTH (must be <=)
//!             A single maximal record must fit in one record list's content.
//!
//! MAX_NESTING_DEPTH (128)
//!       │
//!       └─> enforced by encode (tree height) and decode (view depth) alike
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `ONE_BYTE_LIMIT < MAX_CONTENT_LENGTH` (code 1 is strictly narrower than code 2)
//! 2. `MAX_CONTENT_LENGTH == u16::MAX` (two-byte big-endian prefix is the widest code)
//! 3. A maximal record fits inside `MAX_CONTENT_LENGTH`
//!
//! ## Versioning
//!
//! Raising `MAX_CONTENT_LENGTH` means adding a wider length code. Code 3 is
//! reserved and rejected today, so such a change is a new format version, not
//! a tweak of this file.

// ============================================================================
// HEADER FIELD CEILINGS
// ============================================================================

/// Largest count or length representable with a one-byte prefix (code 1).
pub const ONE_BYTE_LIMIT: usize = 0xFF;

/// Largest content length representable at all (code 2, two-byte prefix).
pub const MAX_CONTENT_LENGTH: usize = 0xFFFF;

/// Largest number of children in one array or record list.
pub const MAX_CHILD_COUNT: usize = 0xFFFF;

const _: () = assert!(
    ONE_BYTE_LIMIT < MAX_CONTENT_LENGTH,
    "one-byte length code must be narrower than the two-byte code"
);

const _: () = assert!(
    MAX_CONTENT_LENGTH == u16::MAX as usize,
    "MAX_CONTENT_LENGTH must match the two-byte prefix width"
);

const _: () = assert!(
    MAX_CHILD_COUNT == u16::MAX as usize,
    "MAX_CHILD_COUNT must match the two-byte count width"
);

// ============================================================================
// NESTING
// ============================================================================

/// Deepest level a value may sit at inside a top-level value (the top level
/// is depth 0). Array children and record fields are one level below their
/// container. Decoding and lifting are recursive, so this bounds stack use.
pub const MAX_NESTING_DEPTH: usize = 128;

const _: () = assert!(
    MAX_NESTING_DEPTH >= 1,
    "containers need at least one level for their children"
);

// ============================================================================
// RECORD LAYOUT
// ============================================================================

/// Size of the record magic byte carrying the four field codes.
pub const RECORD_MAGIC_LENGTH: usize = 1;

/// Size of an encoded timestamp (big-endian nanoseconds since the Unix epoch).
pub const TIMESTAMP_LENGTH: usize = 8;

/// Maximum encoded key field (4 KB).
pub const MAX_KEY_LENGTH: usize = 4 * 1024;

/// Maximum encoded value field (56 KB).
pub const MAX_VALUE_LENGTH: usize = 56 * 1024;

/// Maximum encoded scheme field (2 KB).
pub const MAX_SCHEME_LENGTH: usize = 2 * 1024;

/// Largest possible encoded record.
pub const MAX_RECORD_LENGTH: usize = RECORD_MAGIC_LENGTH
    + MAX_KEY_LENGTH
    + MAX_VALUE_LENGTH
    + MAX_SCHEME_LENGTH
    + TIMESTAMP_LENGTH;

const _: () = assert!(
    MAX_RECORD_LENGTH <= MAX_CONTENT_LENGTH,
    "a maximal record must fit in one record list's content"
);
