//! Field ledger kept in front memory while a table is open.
//!
//! Every field write appends one fixed-size [`FieldRecord`] to the front extent of the
//! [`crate::InwardBuffer`]. The records of a table occupy the front region between the table's
//! mark and the current front size, and are erased as a block when the table ends. Records are
//! always addressed by their front index and decoded on access, never through a retained slice,
//! so they can be rewritten after a back write has reallocated the buffer.
//!
//! # Record Layout
//!
//! ```text
//! +--------+--------+--------+------------------+
//! | slot   | size   | align  | position         |
//! | u16 LE | u8     | u8     | u32 LE           |
//! +--------+--------+--------+------------------+
//! ```
//!
//! A `size` of zero marks a reference field whose `position` is the back position of the
//! referent, or zero for an absent (null) reference. Inline fields carry the back position
//! their bytes were written at. A one-byte record with an `align` of zero is a union
//! discriminant; its `position` holds the discriminant until the table ends and the byte is
//! placed next to the reference slots.

use strum::Display;

use crate::{
    buffer::io::{read_le_at, write_le_at},
    writer::Position,
    InwardBuffer, Result,
};

/// Encoded size of one [`FieldRecord`]
pub(crate) const RECORD_SIZE: usize = 8;

/// How a ledger record contributes to its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum FieldKind {
    /// Scalar or struct bytes already written into back memory
    Inline,
    /// Pending reference to a finished object
    Reference,
    /// Union discriminant, placed when the table ends
    Discriminant,
    /// Null reference, contributes nothing
    Absent,
}

/// Scratch description of one field of the table currently being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldRecord {
    /// VTable slot; the first field lives in slot 2
    pub slot: u16,
    /// Inline byte size, 0 for references
    pub size: u8,
    /// Natural alignment of the inline value
    pub align: u8,
    /// Back position of the inline value, or of the referent
    pub position: u32,
}

impl FieldRecord {
    /// Record for an inline value written at back position `position`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContractViolation`] if size or alignment do not fit a byte, or
    /// if the value is empty.
    pub fn inline(slot: u16, size: usize, align: usize, position: u32) -> Result<Self> {
        if size == 0 {
            return Err(contract_error!("inline field in slot {slot} has no bytes"));
        }
        if align == 0 {
            return Err(contract_error!("inline field in slot {slot} has no alignment"));
        }
        let Ok(size) = u8::try_from(size) else {
            return Err(contract_error!(
                "inline field in slot {slot} is {size} bytes, the ledger holds at most 255"
            ));
        };
        let Ok(align) = u8::try_from(align) else {
            return Err(contract_error!(
                "inline field in slot {slot} requests alignment {align}"
            ));
        };

        Ok(Self {
            slot,
            size,
            align,
            position,
        })
    }

    /// Record for a reference to the finished object at `target`.
    pub fn reference(slot: u16, target: Position) -> Self {
        Self {
            slot,
            size: 0,
            align: 4,
            position: target.get(),
        }
    }

    /// Record for the discriminant of a union whose reference lives in a neighbouring slot.
    pub fn discriminant(slot: u16, union_type: u8) -> Self {
        Self {
            slot,
            size: 1,
            align: 0,
            position: u32::from(union_type),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match (self.size, self.align, self.position) {
            (0, _, 0) => FieldKind::Absent,
            (0, _, _) => FieldKind::Reference,
            (1, 0, _) => FieldKind::Discriminant,
            _ => FieldKind::Inline,
        }
    }

    /// The pending discriminant of a [`FieldKind::Discriminant`] record.
    pub fn union_type(&self) -> u8 {
        self.position.to_le_bytes()[0]
    }

    /// Bytes this field occupies inside the table object.
    pub fn object_bytes(&self) -> usize {
        match self.kind() {
            FieldKind::Inline | FieldKind::Discriminant => usize::from(self.size),
            FieldKind::Reference => 4,
            FieldKind::Absent => 0,
        }
    }

    fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..2].copy_from_slice(&self.slot.to_le_bytes());
        bytes[2] = self.size;
        bytes[3] = self.align;
        bytes[4..8].copy_from_slice(&self.position.to_le_bytes());
        bytes
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut offset = 0;
        Ok(Self {
            slot: read_le_at(bytes, &mut offset)?,
            size: read_le_at(bytes, &mut offset)?,
            align: read_le_at(bytes, &mut offset)?,
            position: read_le_at(bytes, &mut offset)?,
        })
    }
}

/// Appends `record` to the front extent.
pub(crate) fn push(buffer: &mut InwardBuffer, record: &FieldRecord) {
    buffer.write_front_bytes(&record.encode());
}

/// Decodes the record stored at front index `at`.
pub(crate) fn read(buffer: &InwardBuffer, at: usize) -> Result<FieldRecord> {
    let front = buffer.front();
    let Some(bytes) = front.get(at..at + RECORD_SIZE) else {
        return Err(crate::Error::OutOfBounds);
    };
    FieldRecord::decode(bytes)
}

/// Rewrites the position of the record stored at front index `at`.
///
/// Resolves the record from its index on every call, so it is safe to use after a back write
/// that grew the buffer.
pub(crate) fn set_position(buffer: &mut InwardBuffer, at: usize, position: u32) -> Result<()> {
    let mut offset = at + 4;
    write_le_at(buffer.front_mut(), &mut offset, position)
}

/// Front indices of the records in `[start, end)`.
///
/// # Errors
/// Returns [`crate::Error::ContractViolation`] if the region is not a whole number of records,
/// which happens when vector scratch and table fields were interleaved.
pub(crate) fn records(start: usize, end: usize) -> Result<impl Iterator<Item = usize>> {
    if end < start || (end - start) % RECORD_SIZE != 0 {
        return Err(contract_error!(
            "front region [{start}, {end}) does not hold whole field records"
        ));
    }

    Ok((start..end).step_by(RECORD_SIZE))
}
