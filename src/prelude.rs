//! # flatscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the flatscope library. Import it to write encoders without listing every item.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all flatscope operations
pub use crate::Error;

/// The result type used throughout flatscope
pub use crate::Result;

/// Configuration for an encode
pub use crate::WriterConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Encode a root table into a fresh byte vector
pub use crate::{write_flatbuffer, write_flatbuffer_with};

/// The writer and the buffer it fills
pub use crate::{FlatWriter, InwardBuffer};

// ================================================================================================
// Addressing
// ================================================================================================

/// Back positions of finished objects, vtable field offsets and open scope handles
pub use crate::{Position, TableMark, VOffset, VectorMark};

// ================================================================================================
// Encodable Types
// ================================================================================================

/// Hooks implemented by tables, unions and inline structs
pub use crate::{NativeStruct, Serialize, SerializeUnion, Struct, StructWriter};

/// Fixed-size little-endian values usable as scalars and vector elements
pub use crate::buffer::io::Primitive;
