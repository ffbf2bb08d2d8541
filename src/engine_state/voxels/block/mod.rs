//! # Block Module
//!
//! This module provides the block registry: block type codes, their static
//! properties and texture descriptors, and the face enum used by the mesher.

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to store block codes in chunks.
pub type BlockTypeSize = u8;
