//! Capabilities a type implements to be encoded by the [`crate::FlatWriter`].
//!
//! The writer never inspects user types itself. Each encodable type provides one of the hooks
//! below, typically generated from a schema, and the writer calls it at the right moment:
//!
//! - [`Serialize`] - tables; writes the type's fields between a `start_table`/`end_table` pair
//! - [`SerializeUnion`] - unions; reports the active discriminant and writes the active variant
//! - [`Struct`] - fixed-layout inline structs written field by field through a [`StructWriter`]
//! - [`NativeStruct`] - fixed-layout inline structs whose bytes are produced by custom code
//!
//! # Field Order
//!
//! Within one [`Serialize::serialize`] call, all reference-producing fields (strings, tables,
//! unions, vectors) must be written before the inline scalar and struct fields. References are
//! resolved lazily when the table ends, while inline bytes are placed eagerly; writing a nested
//! object after an inline field would split the table's inline region. This is a caller
//! contract and is not checked.

use crate::{
    buffer::io::{write_le_at, Primitive},
    utils::padding_for,
    FlatWriter, Result,
};

/// A table type that can write its fields into an open table.
///
/// # Examples
///
/// ```rust
/// use flatscope::{FlatWriter, Result, Serialize, VOffset};
///
/// struct Weapon {
///     name: String,
///     damage: i16,
/// }
///
/// impl Weapon {
///     const VT_NAME: VOffset = 4;
///     const VT_DAMAGE: VOffset = 6;
/// }
///
/// impl Serialize for Weapon {
///     fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
///         writer.string(Self::VT_NAME, &self.name)?;
///         writer.scalar(Self::VT_DAMAGE, self.damage, 0)
///     }
/// }
///
/// let bytes = flatscope::write_flatbuffer(&Weapon { name: "Axe".into(), damage: 5 })?;
/// assert!(!bytes.is_empty());
/// # Ok::<(), flatscope::Error>(())
/// ```
pub trait Serialize {
    /// Writes every present field of `self` into the table currently open on `writer`.
    ///
    /// # Errors
    /// Propagates any error raised by the writer.
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()>;
}

impl<T: Serialize + ?Sized> Serialize for &T {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        (**self).serialize(writer)
    }
}

impl<T: Serialize + ?Sized> Serialize for Box<T> {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        (**self).serialize(writer)
    }
}

/// A union type: a discriminant plus one table-typed variant.
///
/// A discriminant of `0` is the union's "none" value; the writer then stores a null reference
/// and never calls [`SerializeUnion::serialize_variant`].
pub trait SerializeUnion {
    /// The discriminant of the active variant, `0` if none is set.
    fn union_type(&self) -> u8;

    /// Writes the fields of the variant selected by `union_type` into the table currently open
    /// on `writer`.
    ///
    /// # Errors
    /// Propagates any error raised by the writer.
    fn serialize_variant(&self, union_type: u8, writer: &mut FlatWriter<'_>) -> Result<()>;
}

/// A fixed-size inline struct laid out field by field.
///
/// `SIZE` must be the padded size of the struct as declared by the schema and `ALIGN` its
/// largest member alignment. The [`StructWriter`] inserts member padding automatically.
pub trait Struct {
    /// Size in bytes including trailing padding
    const SIZE: usize;
    /// Alignment of the struct
    const ALIGN: usize;

    /// Writes the struct members in declaration order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the members do not fit `SIZE`.
    fn write_fields(&self, writer: &mut StructWriter<'_>) -> Result<()>;
}

/// A fixed-size inline struct whose bytes are produced by custom code.
///
/// Used for hand-maintained binary layouts, such as math or identifier types, that must match
/// a schema struct exactly without generated per-field code. `write_native` receives a zeroed
/// region of exactly `SIZE` bytes.
pub trait NativeStruct {
    /// Size in bytes
    const SIZE: usize;
    /// Alignment of the struct
    const ALIGN: usize;

    /// Writes the binary representation of `self` into `out`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `out` is too small for the layout.
    fn write_native(&self, out: &mut [u8]) -> Result<()>;
}

/// Cursor over the inline bytes of one [`Struct`].
///
/// Members are placed in declaration order at their natural alignment; padding bytes stay zero.
pub struct StructWriter<'a> {
    out: &'a mut [u8],
    cursor: usize,
}

impl<'a> StructWriter<'a> {
    pub(crate) fn new(out: &'a mut [u8]) -> Self {
        Self { out, cursor: 0 }
    }

    /// Writes a primitive member.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the member does not fit the struct.
    pub fn field<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.cursor += padding_for(self.cursor, T::ALIGN);
        write_le_at(self.out, &mut self.cursor, value)
    }

    /// Writes a nested struct member.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the member does not fit the struct.
    pub fn nested<S: Struct>(&mut self, value: &S) -> Result<()> {
        self.cursor += padding_for(self.cursor, S::ALIGN);
        let end = self.cursor + S::SIZE;
        let Some(region) = self.out.get_mut(self.cursor..end) else {
            return Err(crate::Error::OutOfBounds);
        };

        value.write_fields(&mut StructWriter::new(region))?;
        self.cursor = end;
        Ok(())
    }

    /// Writes a fixed array of primitive members.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the array does not fit the struct.
    pub fn array<T: Primitive>(&mut self, values: &[T]) -> Result<()> {
        for value in values {
            self.field(*value)?;
        }
        Ok(())
    }

    /// Skips explicit padding.
    pub fn pad(&mut self, bytes: usize) {
        self.cursor += bytes;
    }

    /// Number of bytes written so far, including padding.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }
}
