// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # flatscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/flatscope.svg)](https://crates.io/crates/flatscope)
//! [![Documentation](https://docs.rs/flatscope/badge.svg)](https://docs.rs/flatscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/flatscope/blob/main/LICENSE-APACHE)
//!
//! A bottom-up writer for vtable-based binary tables in the FlatBuffers wire format. `flatscope`
//! encodes an in-memory object graph straight into its final bytes, without an intermediate
//! tree and without a builder object per table.
//!
//! ## Features
//!
//! - **Single pass** - Leaves are finished first, parents reference them by relative offset
//! - **Bounded scratch** - Per-field bookkeeping lives in the front of the output buffer and is
//!   released as soon as its table ends
//! - **Reallocation safe** - Objects are addressed by distance from the buffer end, never by
//!   raw address
//! - **Conformant output** - Every reference, vtable and alignment rule of the format is honored
//!
//! ## Quick Start
//!
//! Add `flatscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! flatscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use flatscope::prelude::*;
//!
//! struct Monster {
//!     name: String,
//!     hp: i16,
//!     position: Option<[f32; 3]>,
//!     inventory: Vec<u8>,
//! }
//!
//! impl Serialize for Monster {
//!     fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
//!         // reference fields first, inline fields last
//!         writer.string(4, &self.name)?;
//!         writer.vector_of_scalars(6, &self.inventory)?;
//!         writer.native_struct_opt(8, self.position.as_ref())?;
//!         writer.scalar(10, self.hp, 100)
//!     }
//! }
//!
//! let orc = Monster {
//!     name: "Orc".to_string(),
//!     hp: 300,
//!     position: Some([1.0, 2.0, 3.0]),
//!     inventory: vec![0, 1, 2],
//! };
//!
//! let bytes = write_flatbuffer(&orc)?;
//! assert_eq!(bytes.len() % 4, 0);
//! # Ok::<(), flatscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`buffer`] - The dual-growth [`InwardBuffer`] and little-endian primitive I/O
//! - [`writer`] - The [`FlatWriter`] table and vector encoders, value traits and configuration
//!
//! ### Write Order
//!
//! Within one table, reference fields (strings, tables, unions, vectors) must be written before
//! inline fields (scalars, structs). Nested objects are always finished before their parent.
//!
//! ### Logging
//!
//! The crate reports through [`tracing`] and never installs a subscriber. Leaked scratch memory
//! is reported at `error` level, finished top-level objects at `debug`, buffer growth and vtable
//! emission at `trace`.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Misuse of the writer, such as crossing scopes
//! or writing a field outside a table, surfaces as [`Error::ContractViolation`] carrying the
//! source location that detected it. No bytes are produced after an error.

#[macro_use]
pub(crate) mod error;
pub(crate) mod utils;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use flatscope::prelude::*;
///
/// let mut buffer = InwardBuffer::new();
/// let mut writer = FlatWriter::new(&mut buffer, WriterConfig::default());
/// let table = writer.start_table()?;
/// let root = writer.end_table(table)?;
/// writer.finish(root)?;
/// # Ok::<(), flatscope::Error>(())
/// ```
pub mod prelude;

/// Dual-growth byte buffer and primitive I/O.
///
/// The [`InwardBuffer`] keeps transient bookkeeping at its front and finished objects at its
/// back, growing both towards each other in one allocation.
pub mod buffer;

/// Bottom-up table writer.
///
/// Contains the [`FlatWriter`] with its table and vector encoders, the traits encodable types
/// implement, and [`WriterConfig`].
pub mod writer;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use flatscope::{InwardBuffer, Result};
///
/// fn drop_scratch(buffer: &mut InwardBuffer) -> Result<()> {
///     buffer.erase_front(buffer.front_size())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `flatscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use flatscope::{Error, FlatWriter, InwardBuffer, Position, WriterConfig};
///
/// let mut buffer = InwardBuffer::new();
/// let mut writer = FlatWriter::new(&mut buffer, WriterConfig::default());
///
/// match writer.finish(Position::new(64)) {
///     Err(Error::ReferenceOutOfBounds { reference, .. }) => assert_eq!(reference, 64),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::Error;

/// Dual-growth buffer that receives the encoded bytes.
pub use buffer::InwardBuffer;

/// Main entry points for encoding.
///
/// See [`writer::FlatWriter`] for the table and vector operations.
pub use writer::{write_flatbuffer, write_flatbuffer_with, FlatWriter, WriterConfig};

/// Positions, field offsets and scope handles.
pub use writer::{Position, TableMark, VOffset, VectorMark};

/// Traits implemented by encodable types.
pub use writer::{NativeStruct, Serialize, SerializeUnion, Struct, StructWriter};
