//! # Codec Configuration Module
//!
//! This module centralizes the fixed limits of the wire format. The format has
//! no runtime knobs: every ceiling below is part of the byte layout, so two
//! independent encoders must agree on all of them.
//!
//! ## Module Organization
//!
//! - [`constants`]: Format ceilings and record field limits with dependency documentation

pub mod constants;
pub use constants::*;
