//! VTable construction for finished tables.
//!
//! Every table object is paired with its own vtable, emitted directly below the table root so
//! that the table's leading signed offset equals the vtable's byte length:
//!
//! ```text
//! vtable                                         table object
//! +---------+---------+---------+-----+---------+-----------+--------------------+
//! | vt size | obj size| slot 2  | ... | slot N  | soffset   | fields ...         |
//! | u16     | u16     | u16     |     | u16     | i32 = vt  |                    |
//! +---------+---------+---------+-----+---------+-----------+--------------------+
//! ```
//!
//! Slot entries hold the byte offset of a field from the table root, or 0 when the field is
//! absent and readers must use the schema default. VTables are never shared between tables.

use tracing::trace;

use crate::{
    buffer::io::write_le_at,
    utils::to_u16,
    writer::ledger::{self, FieldKind},
    InwardBuffer, Result,
};

/// Index of the first field slot; slots 0 and 1 hold the two header lengths
pub(crate) const FIRST_FIELD_SLOT: u16 = 2;

/// Shape of the vtable of one table, gathered while its fields are finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VTableLayout {
    /// Highest slot seen in the ledger, at least [`FIRST_FIELD_SLOT`]
    pub max_slot: u16,
    /// Sum of the object bytes of all present fields
    pub object_size: usize,
}

impl Default for VTableLayout {
    fn default() -> Self {
        Self {
            max_slot: FIRST_FIELD_SLOT,
            object_size: 0,
        }
    }
}

impl VTableLayout {
    /// Byte length of the vtable including both header entries.
    pub fn byte_size(&self) -> usize {
        (usize::from(self.max_slot) + 1) * 2
    }
}

/// Emits the vtable for the table whose root sits at back position `root`.
///
/// `start..end` is the table's ledger region in front memory; every present record must
/// already carry its final back position.
///
/// # Errors
/// Returns [`crate::Error::ContractViolation`] if a field offset or size does not fit 16 bits,
/// or if a slot was written twice.
pub(crate) fn emit(
    buffer: &mut InwardBuffer,
    start: usize,
    end: usize,
    root: usize,
    layout: VTableLayout,
) -> Result<()> {
    let vtable_size = layout.byte_size();
    let entries_size = vtable_size - usize::from(FIRST_FIELD_SLOT) * 2;

    // Zeroed entries, i.e. every field absent until proven otherwise
    buffer.alloc_back(entries_size);
    let entries_position = buffer.back_size();

    buffer.write_back(to_u16(layout.object_size)?);
    buffer.write_back(to_u16(vtable_size)?);

    for at in ledger::records(start, end)? {
        let record = ledger::read(buffer, at)?;
        let kind = record.kind();
        if kind == FieldKind::Absent {
            continue;
        }

        let Some(distance) = root.checked_sub(record.position as usize) else {
            return Err(contract_error!(
                "{kind} field in slot {} lies below its table root",
                record.slot
            ));
        };
        let field_offset = to_u16(distance)?;

        let entries = buffer.back_at_mut(entries_position)?;
        let mut index = usize::from(record.slot - FIRST_FIELD_SLOT) * 2;
        if entries[index..index + 2] != [0, 0] {
            return Err(contract_error!(
                "{kind} field in slot {} reuses a slot already written in this table",
                record.slot
            ));
        }
        write_le_at(entries, &mut index, field_offset)?;
    }

    trace!(
        vtable_size,
        object_size = layout.object_size,
        max_slot = layout.max_slot,
        "emitted vtable"
    );

    Ok(())
}
