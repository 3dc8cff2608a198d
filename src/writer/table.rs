//! Table encoder: field writes and table finalization.
//!
//! A table is built between [`FlatWriter::start_table`] and [`FlatWriter::end_table`]. Each field
//! write appends one record to the table's ledger in front memory:
//!
//! - inline fields (scalars, structs, native structs) are aligned and written into back memory
//!   immediately, their record remembers where
//! - reference fields (strings, tables, unions, vectors) expect a finished referent and only
//!   record its position; the 4-byte slot is written when the table ends
//! - union discriminants are recorded with the union's reference and written alongside it
//!
//! Ending the table writes the pending reference slots, the union discriminants, the signed
//! offset to the vtable and the vtable itself, then erases the ledger.
//!
//! # Examples
//!
//! ```rust
//! use flatscope::{FlatWriter, InwardBuffer, WriterConfig};
//!
//! let mut buffer = InwardBuffer::new();
//! let mut writer = FlatWriter::new(&mut buffer, WriterConfig::default());
//!
//! let inner = writer.start_table()?;
//! writer.scalar(4, 7u8, 0)?;
//! let inner = writer.end_table(inner)?;
//!
//! let outer = writer.start_table()?;
//! writer.reference(4, inner)?;
//! writer.scalar_opt::<f32>(6, None)?;
//! writer.scalar(8, 1.5f64, 0.0)?;
//! let root = writer.end_table(outer)?;
//!
//! writer.finish(root)?;
//! # Ok::<(), flatscope::Error>(())
//! ```

use crate::{
    buffer::io::{write_le, Primitive},
    utils::{to_u16, to_u32},
    writer::{
        ledger::{self, FieldKind, FieldRecord},
        reference::{self, REFERENCE_SIZE},
        traits::{NativeStruct, Serialize, SerializeUnion, Struct, StructWriter},
        vtable::{self, VTableLayout, FIRST_FIELD_SLOT},
        FlatWriter, Position, ScopeKind, VOffset,
    },
    Result,
};

/// Handle returned by [`FlatWriter::start_table`], consumed by [`FlatWriter::end_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a started table must be ended with FlatWriter::end_table"]
pub struct TableMark(pub(crate) usize);

/// Ledger slot addressed by the vtable byte offset `field`.
fn field_slot(field: VOffset) -> Result<u16> {
    if field % 2 != 0 || field / 2 < FIRST_FIELD_SLOT {
        return Err(contract_error!(
            "field offset {field} is not a vtable entry, expected an even offset of at least 4"
        ));
    }

    Ok(field / 2)
}

impl FlatWriter<'_> {
    /// Opens a new table; fields written until the matching [`FlatWriter::end_table`] belong to it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DepthLimit`] if too many scopes are already open.
    pub fn start_table(&mut self) -> Result<TableMark> {
        self.push_scope(ScopeKind::Table).map(TableMark)
    }

    /// Finishes the table opened with `mark` and returns its back position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if `mark` is not the innermost open scope,
    /// a slot was written twice, an inline field is misaligned or the table outgrows the 16-bit
    /// vtable offsets.
    pub fn end_table(&mut self, mark: TableMark) -> Result<Position> {
        self.pop_scope(ScopeKind::Table, mark.0)?;

        let start = mark.0;
        let end = self.buffer.front_size();
        let mut layout = VTableLayout::default();

        for at in ledger::records(start, end)? {
            let record = ledger::read(self.buffer, at)?;
            layout.max_slot = layout.max_slot.max(record.slot);

            match record.kind() {
                FieldKind::Absent | FieldKind::Discriminant => {}
                FieldKind::Reference => {
                    let slot = self.write_reference(Position::new(record.position))?;
                    // The write may have grown the buffer; the record is re-resolved by index
                    ledger::set_position(self.buffer, at, slot.get())?;
                }
                FieldKind::Inline => {
                    if record.position as usize % usize::from(record.align).max(1) != 0 {
                        return Err(contract_error!(
                            "inline field in slot {} at back position {} breaks its {}-byte alignment",
                            record.slot,
                            record.position,
                            record.align
                        ));
                    }
                }
            }

            layout.object_size += record.object_bytes();
        }

        // Discriminant bytes sit between the reference slots and the signed vtable offset
        for at in ledger::records(start, end)? {
            let record = ledger::read(self.buffer, at)?;
            if record.kind() == FieldKind::Discriminant {
                self.buffer.write_back(record.union_type());
                let position = self.back_position()?;
                ledger::set_position(self.buffer, at, position.get())?;
            }
        }

        let vtable_size = to_u16(layout.byte_size())?;
        self.pre_align(REFERENCE_SIZE, REFERENCE_SIZE);
        self.buffer.write_back(i32::from(vtable_size));
        let root = self.buffer.back_size();

        vtable::emit(self.buffer, start, end, root, layout)?;
        self.buffer.erase_front(end - start)?;

        Ok(Position::new(to_u32(root)?))
    }

    /// Writes a scalar field.
    ///
    /// The value is always written unless [`crate::WriterConfig::force_defaults`] is disabled
    /// and `value` equals `default`, in which case the field stays absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if no table is open or `field` is not a valid
    /// vtable offset.
    pub fn scalar<T: Primitive + PartialEq>(
        &mut self,
        field: VOffset,
        value: T,
        default: T,
    ) -> Result<()> {
        if !self.config.force_defaults && value == default {
            field_slot(field)?;
            return self.expect_open(ScopeKind::Table);
        }

        self.inline_field(field, T::SIZE, T::ALIGN, |out| write_le(out, value))
    }

    /// Writes a scalar field if `value` is set.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::scalar`].
    pub fn scalar_opt<T: Primitive>(&mut self, field: VOffset, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.inline_field(field, T::SIZE, T::ALIGN, |out| write_le(out, value)),
            None => Ok(()),
        }
    }

    /// Writes an inline struct field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if no table is open or `field` is not a valid
    /// vtable offset, and [`crate::Error::OutOfBounds`] if the struct overflows its `SIZE`.
    pub fn struct_field<S: Struct>(&mut self, field: VOffset, value: &S) -> Result<()> {
        self.inline_field(field, S::SIZE, S::ALIGN, |out| {
            value.write_fields(&mut StructWriter::new(out))
        })
    }

    /// Writes an inline struct field if `value` is set.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::struct_field`].
    pub fn struct_opt<S: Struct>(&mut self, field: VOffset, value: Option<&S>) -> Result<()> {
        match value {
            Some(value) => self.struct_field(field, value),
            None => Ok(()),
        }
    }

    /// Writes an inline struct field using the type's own byte layout.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::struct_field`].
    pub fn native_struct<N: NativeStruct>(&mut self, field: VOffset, value: &N) -> Result<()> {
        self.inline_field(field, N::SIZE, N::ALIGN, |out| value.write_native(out))
    }

    /// Writes a native struct field if `value` is set.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::struct_field`].
    pub fn native_struct_opt<N: NativeStruct>(
        &mut self,
        field: VOffset,
        value: Option<&N>,
    ) -> Result<()> {
        match value {
            Some(value) => self.native_struct(field, value),
            None => Ok(()),
        }
    }

    /// Writes a string field. The empty string is stored as an absent field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if no table is open, `field` is not a valid
    /// vtable offset or the string exceeds the 32-bit length range.
    pub fn string(&mut self, field: VOffset, value: &str) -> Result<()> {
        let target = self.create_string(value)?;
        self.reference(field, target)
    }

    /// Finishes a string object and returns its position, or [`Position::NULL`] if `value` is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if the string exceeds the 32-bit length range.
    pub fn create_string(&mut self, value: &str) -> Result<Position> {
        if value.is_empty() {
            return Ok(Position::NULL);
        }

        self.create_string_object(value)
    }

    /// Writes `len:u32, bytes, 0` with the length 4-byte aligned, even for an empty string.
    pub(crate) fn create_string_object(&mut self, value: &str) -> Result<Position> {
        let length = to_u32(value.len())?;

        self.pre_align(value.len() + 1, REFERENCE_SIZE);
        self.buffer.write_back(0u8);
        self.buffer.write_back_bytes(value.as_bytes());
        self.buffer.write_back(length);

        self.back_position()
    }

    /// Writes a reference field to an already finished object. [`Position::NULL`] leaves the
    /// field absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ReferenceOutOfBounds`] if `target` lies beyond the finished
    /// region, and [`crate::Error::ContractViolation`] if no table is open or `field` is not a
    /// valid vtable offset.
    pub fn reference(&mut self, field: VOffset, target: Position) -> Result<()> {
        let slot = field_slot(field)?;
        self.expect_open(ScopeKind::Table)?;
        reference::check_target(target, self.buffer.back_size())?;

        ledger::push(self.buffer, &FieldRecord::reference(slot, target));
        Ok(())
    }

    /// Writes a nested table field.
    ///
    /// # Errors
    ///
    /// Propagates errors from the nested table and from [`FlatWriter::reference`].
    pub fn table<T: Serialize + ?Sized>(&mut self, field: VOffset, value: &T) -> Result<()> {
        let target = self.create_table(value)?;
        self.reference(field, target)
    }

    /// Writes a nested table field if `value` is set.
    ///
    /// # Errors
    ///
    /// Same as [`FlatWriter::table`].
    pub fn table_opt<T: Serialize + ?Sized>(&mut self, field: VOffset, value: Option<&T>) -> Result<()> {
        match value {
            Some(value) => self.table(field, value),
            None => Ok(()),
        }
    }

    /// Finishes `value` as a standalone table and returns its position.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by `value`'s fields.
    pub fn create_table<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Position> {
        let mark = self.start_table()?;
        value.serialize(self)?;
        self.end_table(mark)
    }

    /// Writes a union: the active variant as a table referenced from `field`, and its
    /// discriminant as a `u8` at `field - 2`.
    ///
    /// A discriminant of 0 stores no variant and leaves the reference absent. Like the
    /// reference, the discriminant byte is placed when the table ends, so a union may be followed
    /// by any other reference field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContractViolation`] if `field - 2` is not a valid vtable offset,
    /// and propagates errors raised while writing the variant.
    pub fn union<U: SerializeUnion + ?Sized>(&mut self, field: VOffset, value: &U) -> Result<()> {
        let Some(type_field) = field.checked_sub(2) else {
            return Err(contract_error!("union at field offset {field} has no discriminant slot"));
        };
        let type_slot = field_slot(type_field)?;

        let union_type = value.union_type();
        let target = if union_type == 0 {
            Position::NULL
        } else {
            let mark = self.start_table()?;
            value.serialize_variant(union_type, self)?;
            self.end_table(mark)?
        };

        self.reference(field, target)?;
        if union_type == 0 && !self.config.force_defaults {
            return Ok(());
        }

        ledger::push(self.buffer, &FieldRecord::discriminant(type_slot, union_type));
        Ok(())
    }

    /// Aligns, allocates and fills an inline field, then records it in the ledger.
    fn inline_field<F>(&mut self, field: VOffset, size: usize, align: usize, write: F) -> Result<()>
    where
        F: FnOnce(&mut [u8]) -> Result<()>,
    {
        let slot = field_slot(field)?;
        self.expect_open(ScopeKind::Table)?;
        let mut record = FieldRecord::inline(slot, size, align, 0)?;

        self.pre_align(size, align);
        write(self.buffer.alloc_back(size))?;
        record.position = self.back_position()?.get();

        ledger::push(self.buffer, &record);
        Ok(())
    }
}
