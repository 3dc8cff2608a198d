//! Vector encoder.
//!
//! A vector object is a `u32` element count followed by its elements. Inline elements (scalars,
//! structs) go straight into back memory and must therefore be added last to first. Reference
//! elements (strings, tables) are finished objects whose positions are parked in front memory in
//! natural order; [`FlatWriter::end_vector`] pops them and writes one relative offset per element,
//! which lands them in natural order as well.
//!
//! The `vector_of_*` helpers handle the ordering and alignment. The raw element calls exist for
//! hand-written encoders and leave alignment to the caller: before the first inline element,
//! call [`FlatWriter::pre_align`] with the total element byte length, once for 4 and once for the
//! element alignment.
//!
//! # Examples
//!
//! ```rust
//! use flatscope::{FlatWriter, InwardBuffer, WriterConfig};
//!
//! let mut buffer = InwardBuffer::new();
//! let mut writer = FlatWriter::new(&mut buffer, WriterConfig::default());
//!
//! let numbers = writer.create_vector_of_scalars(&[10u16, 20, 30])?;
//!
//! let table = writer.start_table()?;
//! writer.reference(4, numbers)?;
//! writer.vector_of_strings(6, &["a", "bb", "ccc"])?;
//! let root = writer.end_table(table)?;
//! writer.finish(root)?;
//! # Ok::<(), flatscope::Error>(())
//! ```

use crate::{
    buffer::io::{read_le, Primitive},
    utils::to_u32,
    writer::{
        reference::{self, REFERENCE_SIZE},
        traits::{NativeStruct, Serialize, Struct, StructWriter},
        FlatWriter, Position, ScopeKind, VOffset,
    },
    Result,
};

/// Handle returned by [`FlatWriter::start_vector`], consumed by [`FlatWriter::end_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a started vector must be ended with FlatWriter::end_vector"]
pub struct VectorMark(pub(crate) usize);

impl FlatWriter<'_> {
    /// Opens a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DepthLimit`] if too many scopes are already open.
    pub fn start_vector(&mut self) -> Result<VectorMark> {
        self.push_scope(ScopeKind::Vector).map(VectorMark)
    }

    /// Adds an inline scalar element. Elements must be added last to first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if the innermost open scope is not a vector.
    pub fn add_vector_value<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.expect_open(ScopeKind::Vector)?;
        self.buffer.write_back(value);
        Ok(())
    }

    /// Adds an inline struct element. Elements must be added last to first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if the innermost open scope is not a vector,
    /// and [`crate::Error::OutOfBounds`] if the struct overflows its `SIZE`.
    pub fn add_vector_struct<S: Struct>(&mut self, value: &S) -> Result<()> {
        self.expect_open(ScopeKind::Vector)?;
        value.write_fields(&mut StructWriter::new(self.buffer.alloc_back(S::SIZE)))
    }

    /// Adds an inline native struct element. Elements must be added last to first.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::add_vector_struct`].
    pub fn add_vector_native_struct<N: NativeStruct>(&mut self, value: &N) -> Result<()> {
        self.expect_open(ScopeKind::Vector)?;
        value.write_native(self.buffer.alloc_back(N::SIZE))
    }

    /// Adds a reference element to the finished object at `target`. Elements are added in
    /// natural order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if the innermost open scope is not a vector or
    /// `target` is null, and [`crate::Error::ReferenceOutOfBounds`] if `target` is not finished.
    pub fn add_vector_reference(&mut self, target: Position) -> Result<()> {
        self.expect_open(ScopeKind::Vector)?;
        if target.is_null() {
            return Err(contract_error!("vector elements cannot reference the null position"));
        }
        reference::check_target(target, self.buffer.back_size())?;

        self.buffer.write_front(target.get());
        Ok(())
    }

    /// Finishes the vector opened with `mark` holding `count` elements.
    ///
    /// Returns [`Position::NULL`] for an empty vector, which stores as an absent field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if `mark` is not the innermost open scope,
    /// if pending reference elements do not match `count`, or if the inline elements leave the
    /// length prefix misaligned.
    pub fn end_vector(&mut self, mark: VectorMark, count: usize) -> Result<Position> {
        self.pop_scope(ScopeKind::Vector, mark.0)?;

        let Some(pending) = self.buffer.front_size().checked_sub(mark.0) else {
            return Err(contract_error!(
                "front extent shrank below the vector mark {}",
                mark.0
            ));
        };
        if pending != 0 && Some(pending) != count.checked_mul(REFERENCE_SIZE) {
            return Err(contract_error!(
                "vector of {count} elements has {pending} bytes of pending references"
            ));
        }

        if pending != 0 {
            for _ in 0..count {
                let at = self.buffer.front_size() - REFERENCE_SIZE;
                let target = read_le::<u32>(&self.buffer.front()[at..])?;

                self.write_reference(Position::new(target))?;
                self.buffer.erase_front(REFERENCE_SIZE)?;
            }
        }

        if count == 0 {
            return Ok(Position::NULL);
        }

        if self.buffer.back_size() % REFERENCE_SIZE != 0 {
            return Err(contract_error!(
                "vector length at back position {} is not 4-byte aligned",
                self.buffer.back_size()
            ));
        }
        self.buffer.write_back(to_u32(count)?);

        self.back_position()
    }

    /// Writes a vector of scalars field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if no table is open or `field` is not a valid
    /// vtable offset.
    pub fn vector_of_scalars<T: Primitive>(&mut self, field: VOffset, values: &[T]) -> Result<()> {
        let target = self.create_vector_of_scalars(values)?;
        self.reference(field, target)
    }

    /// Finishes a vector of scalars and returns its position, [`Position::NULL`] if empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DepthLimit`] if no further scope can be opened.
    pub fn create_vector_of_scalars<T: Primitive>(&mut self, values: &[T]) -> Result<Position> {
        self.create_inline_vector(values.len(), T::SIZE, T::ALIGN, |writer| {
            values
                .iter()
                .rev()
                .try_for_each(|value| writer.add_vector_value(*value))
        })
    }

    /// Writes a vector of strings field. Empty strings become zero-length string objects.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::vector_of_scalars`].
    pub fn vector_of_strings<S: AsRef<str>>(&mut self, field: VOffset, values: &[S]) -> Result<()> {
        let mark = self.start_vector()?;
        for value in values {
            let target = self.create_string_object(value.as_ref())?;
            self.add_vector_reference(target)?;
        }
        let target = self.end_vector(mark, values.len())?;

        self.reference(field, target)
    }

    /// Writes a vector of structs field.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::vector_of_scalars`], plus [`crate::Error::OutOfBounds`] if a struct
    /// overflows its `SIZE`.
    pub fn vector_of_structs<S: Struct>(&mut self, field: VOffset, values: &[S]) -> Result<()> {
        let target = self.create_inline_vector(values.len(), S::SIZE, S::ALIGN, |writer| {
            values
                .iter()
                .rev()
                .try_for_each(|value| writer.add_vector_struct(value))
        })?;

        self.reference(field, target)
    }

    /// Writes a vector of native structs field.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::vector_of_structs`].
    pub fn vector_of_native_structs<N: NativeStruct>(
        &mut self,
        field: VOffset,
        values: &[N],
    ) -> Result<()> {
        let target = self.create_inline_vector(values.len(), N::SIZE, N::ALIGN, |writer| {
            values
                .iter()
                .rev()
                .try_for_each(|value| writer.add_vector_native_struct(value))
        })?;

        self.reference(field, target)
    }

    /// Writes a vector of tables field.
    ///
    /// # Errors
    ///
    /// Propagates errors from every element table and from [`FlatWriter::reference`].
    pub fn vector_of_tables<T: Serialize>(&mut self, field: VOffset, values: &[T]) -> Result<()> {
        let mark = self.start_vector()?;
        for value in values {
            let target = self.create_table(value)?;
            self.add_vector_reference(target)?;
        }
        let target = self.end_vector(mark, values.len())?;

        self.reference(field, target)
    }

    fn create_inline_vector<F>(
        &mut self,
        count: usize,
        size: usize,
        align: usize,
        write: F,
    ) -> Result<Position>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if count > 0 {
            let Some(len) = count.checked_mul(size) else {
                return Err(contract_error!("vector of {count} elements overflows"));
            };
            self.pre_align(len, REFERENCE_SIZE);
            self.pre_align(len, align);
        }

        let mark = self.start_vector()?;
        write(self)?;
        self.end_vector(mark, count)
    }
}
