//! Bottom-up writer for the vtable-based table format.
//!
//! The [`FlatWriter`] encodes an object graph straight into an [`crate::InwardBuffer`] without
//! building an intermediate tree. Objects are finished leaves-first into the back extent, and
//! every finished object is addressed by its back [`Position`] until some enclosing table, vector
//! or the root reference turns that position into a relative offset.
//!
//! # Architecture
//!
//! - [`crate::writer::ledger`] - Per-field scratch records kept in front memory
//! - [`crate::writer::table`] - Table encoder: field writes, `start_table`/`end_table`
//! - [`crate::writer::vector`] - Vector encoder: element writes, `start_vector`/`end_vector`
//! - [`crate::writer::reference`] - Back position to relative offset conversion
//! - [`crate::writer::vtable`] - VTable generation at table end
//! - [`crate::writer::traits`] - Hooks implemented by encodable types
//! - [`crate::writer::native`] - Native struct layouts for common value types
//! - [`crate::writer::config`] - [`WriterConfig`]
//!
//! Open tables and vectors are tracked on an explicit scope stack. Each scope remembers the
//! front size at which it started; its ledger is everything above that mark. Scopes must be
//! closed innermost first, so front memory never holds more than the records of the currently
//! open nesting chain.
//!
//! # Examples
//!
//! ```rust
//! use flatscope::{FlatWriter, InwardBuffer, WriterConfig};
//!
//! let mut buffer = InwardBuffer::new();
//! let mut writer = FlatWriter::new(&mut buffer, WriterConfig::default());
//!
//! let table = writer.start_table()?;
//! writer.string(4, "hello")?;
//! writer.scalar(6, 42u32, 0)?;
//! let root = writer.end_table(table)?;
//! let bytes = writer.finish(root)?;
//!
//! // First four bytes locate the root table
//! let root_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
//! assert_eq!(root_offset as usize % 4, 0);
//! # Ok::<(), flatscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A [`FlatWriter`] holds the only mutable borrow of its buffer for the duration of an encode
//! and is meant to be driven from a single call stack.

mod config;
mod ledger;
mod native;
mod reference;
mod table;
mod traits;
mod vector;
mod vtable;

pub use config::WriterConfig;
pub use table::TableMark;
pub use traits::{NativeStruct, Serialize, SerializeUnion, Struct, StructWriter};
pub use vector::VectorMark;

use strum::Display;
use tracing::{debug, error};

use crate::{
    utils::{padding_for, to_u32},
    Error, InwardBuffer, Result,
};

/// Byte offset of a field's entry inside its vtable, as used by generated accessors.
///
/// The first field of a table has offset 4, the next 6, and so on; the ledger slot of a field
/// is its offset divided by two.
pub type VOffset = u16;

/// Back position of a finished object.
///
/// A position is the distance from the end of the buffer to the object's first byte. It is not
/// a relative reference yet; it becomes one when a table field, a vector element or the root
/// reference points at it. [`Position::NULL`] stands for "no object" and produces an absent
/// field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u32);

impl Position {
    /// The null position; references to it are written as absent fields
    pub const NULL: Position = Position(0);

    /// Wraps a raw back position.
    #[must_use]
    pub fn new(position: u32) -> Self {
        Self(position)
    }

    /// The raw back position.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether this is [`Position::NULL`].
    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Kind of an open scope on the writer's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum ScopeKind {
    Table,
    Vector,
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    kind: ScopeKind,
    mark: usize,
}

/// Encodes tables, vectors, strings and structs bottom-up into an [`InwardBuffer`].
///
/// See the [module documentation](crate::writer) for the overall flow.
pub struct FlatWriter<'a> {
    buffer: &'a mut InwardBuffer,
    config: WriterConfig,
    scopes: Vec<Scope>,
    min_align: usize,
}

impl<'a> FlatWriter<'a> {
    /// Creates a writer appending to `buffer`.
    pub fn new(buffer: &'a mut InwardBuffer, config: WriterConfig) -> Self {
        Self {
            buffer,
            config,
            scopes: Vec::new(),
            min_align: 1,
        }
    }

    /// Encodes `obj` as the root table of a complete buffer and returns the finished bytes.
    ///
    /// The returned slice starts with the root reference and remains valid until `buffer` is
    /// mutated again. Anything already in the back extent stays in place behind the new
    /// object.
    ///
    /// # Errors
    ///
    /// Propagates every error raised while encoding. Returns [`crate::Error::ScratchLeak`] if
    /// the front extent changed size and [`WriterConfig::fail_on_scratch_leak`] is set.
    pub fn serialize_object<T: Serialize + ?Sized>(
        obj: &T,
        buffer: &'a mut InwardBuffer,
        config: WriterConfig,
    ) -> Result<&'a [u8]> {
        let before = buffer.front_size();

        let mut writer = FlatWriter::new(buffer, config);
        let root = writer.create_table(obj)?;
        match config.file_identifier {
            Some(identifier) => writer.finish_with_identifier(root, identifier)?,
            None => writer.finish(root)?,
        };
        let min_align = writer.min_align;

        let buffer: &'a InwardBuffer = writer.into_buffer();
        check_scratch(before, buffer.front_size(), &config)?;

        debug!(bytes = buffer.back_size(), min_align, "serialized object");
        Ok(buffer.back())
    }

    /// The buffer being written.
    #[must_use]
    pub fn buffer(&self) -> &InwardBuffer {
        self.buffer
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Number of currently open tables and vectors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Largest alignment requested so far.
    #[must_use]
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    /// Gives the buffer borrow back to the caller.
    #[must_use]
    pub fn into_buffer(self) -> &'a mut InwardBuffer {
        self.buffer
    }

    /// Pads the back extent so that after writing `len` more bytes its size is a multiple of
    /// `alignment`.
    ///
    /// Raw vector element writes through [`FlatWriter::add_vector_value`] and friends rely on
    /// the caller having aligned the whole element block this way before the first element.
    pub fn pre_align(&mut self, len: usize, alignment: usize) {
        if alignment == 0 {
            return;
        }

        self.track_alignment(alignment);
        let padding = padding_for(self.buffer.back_size() + len, alignment);
        if padding > 0 {
            self.buffer.alloc_back(padding);
        }
    }

    /// Writes the root reference to `root` and returns the finished bytes.
    ///
    /// The output is padded so its total size is a multiple of the largest alignment used,
    /// which keeps every field naturally aligned relative to the start of the returned slice.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if scopes are still open or `root` is null,
    /// and [`crate::Error::ReferenceOutOfBounds`] if `root` is not a finished object.
    pub fn finish(&mut self, root: Position) -> Result<&[u8]> {
        self.check_finishable()?;
        self.pre_align(reference::REFERENCE_SIZE, self.min_align);
        self.write_reference(root)?;
        Ok(self.buffer.back())
    }

    /// Like [`FlatWriter::finish`], additionally storing a 4-byte file identifier right after
    /// the root reference.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::finish`].
    pub fn finish_with_identifier(&mut self, root: Position, identifier: [u8; 4]) -> Result<&[u8]> {
        self.check_finishable()?;
        self.pre_align(reference::REFERENCE_SIZE + identifier.len(), self.min_align);
        self.buffer.write_back_bytes(&identifier);
        self.write_reference(root)?;
        Ok(self.buffer.back())
    }

    fn check_finishable(&self) -> Result<()> {
        if let Some(scope) = self.scopes.last() {
            return Err(contract_error!(
                "cannot finish while a {} opened at front mark {} is still open",
                scope.kind,
                scope.mark
            ));
        }
        Ok(())
    }

    /// Aligns and writes a reference slot to `target`, returning the slot's back position.
    fn write_reference(&mut self, target: Position) -> Result<Position> {
        self.pre_align(reference::REFERENCE_SIZE, reference::REFERENCE_SIZE);
        reference::write_reference(self.buffer, target)
    }

    /// Current back size as a position.
    fn back_position(&self) -> Result<Position> {
        Ok(Position::new(to_u32(self.buffer.back_size())?))
    }

    fn track_alignment(&mut self, alignment: usize) {
        self.min_align = self.min_align.max(alignment);
    }

    fn push_scope(&mut self, kind: ScopeKind) -> Result<usize> {
        if self.scopes.len() >= self.config.max_depth {
            return Err(Error::DepthLimit(self.config.max_depth));
        }

        let mark = self.buffer.front_size();
        self.scopes.push(Scope { kind, mark });
        Ok(mark)
    }

    /// Checks that the innermost open scope is of `kind`.
    fn expect_open(&self, kind: ScopeKind) -> Result<()> {
        match self.scopes.last() {
            Some(scope) if scope.kind == kind => Ok(()),
            Some(scope) => Err(contract_error!(
                "expected an open {}, innermost open scope is a {}",
                kind,
                scope.kind
            )),
            None => Err(contract_error!("expected an open {}, no scope is open", kind)),
        }
    }

    fn pop_scope(&mut self, kind: ScopeKind, mark: usize) -> Result<()> {
        match self.scopes.last() {
            Some(scope) if scope.kind == kind && scope.mark == mark => {
                self.scopes.pop();
                Ok(())
            }
            Some(scope) => Err(contract_error!(
                "cannot end {} at front mark {}, innermost open scope is a {} at {}",
                kind,
                mark,
                scope.kind,
                scope.mark
            )),
            None => Err(contract_error!(
                "cannot end {} at front mark {}, no scope is open",
                kind,
                mark
            )),
        }
    }
}

/// Reports front memory that survived a top-level encode.
fn check_scratch(before: usize, after: usize, config: &WriterConfig) -> Result<()> {
    if before == after {
        return Ok(());
    }

    error!(before, after, "unexpected temporary memory left behind");
    if config.fail_on_scratch_leak {
        return Err(Error::ScratchLeak { before, after });
    }
    Ok(())
}

/// Encodes `obj` as the root table of a fresh buffer using the default [`WriterConfig`].
///
/// # Errors
///
/// Propagates every error raised while encoding.
///
/// # Examples
///
/// ```rust
/// use flatscope::{FlatWriter, Result, Serialize};
///
/// struct Empty;
///
/// impl Serialize for Empty {
///     fn serialize(&self, _writer: &mut FlatWriter<'_>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let bytes = flatscope::write_flatbuffer(&Empty)?;
/// // root offset, vtable (3 entries) with padding, soffset
/// assert_eq!(bytes.len() % 4, 0);
/// # Ok::<(), flatscope::Error>(())
/// ```
pub fn write_flatbuffer<T: Serialize + ?Sized>(obj: &T) -> Result<Vec<u8>> {
    write_flatbuffer_with(obj, WriterConfig::default())
}

/// Encodes `obj` as the root table of a fresh buffer using `config`.
///
/// # Errors
///
/// Propagates every error raised while encoding.
pub fn write_flatbuffer_with<T: Serialize + ?Sized>(
    obj: &T,
    config: WriterConfig,
) -> Result<Vec<u8>> {
    let mut buffer = InwardBuffer::with_capacity(config.initial_capacity);
    FlatWriter::serialize_object(obj, &mut buffer, config)?;
    Ok(buffer.take_back())
}
