//! Conversion of back positions into the format's relative offsets.
//!
//! Objects are addressed by back position while they are being built. Once a referent is
//! finished, a reference to it is materialized as an unsigned 32-bit distance stored in a 4-byte
//! slot: reading the slot at address `A` and adding its value yields the referent's address.
//! Because back memory grows toward lower addresses, that distance is
//!
//! ```text
//! offset = (back size right after the slot is written) - (referent back position)
//! ```
//!
//! The root reference uses the same computation for a slot at the very start of the output.
//! Forward references are impossible by construction: the referent must already be inside the
//! back extent when its reference is written.

use crate::{utils::to_u32, writer::Position, Error, InwardBuffer, Result};

/// Size of a reference slot in bytes
pub(crate) const REFERENCE_SIZE: usize = 4;

/// Checks that `target` names an object already inside the back extent.
///
/// # Errors
/// Returns [`crate::Error::ReferenceOutOfBounds`] if `target` lies beyond `back_size`.
pub(crate) fn check_target(target: Position, back_size: usize) -> Result<()> {
    if target.get() as usize > back_size {
        return Err(Error::ReferenceOutOfBounds {
            reference: target.get(),
            back_size,
        });
    }

    Ok(())
}

/// Distance from a slot ending at back position `slot_end` to the referent at `target`.
///
/// # Errors
/// Returns [`crate::Error::ReferenceOutOfBounds`] if the referent would not precede the slot.
pub(crate) fn relative_offset(slot_end: usize, target: Position) -> Result<u32> {
    let slot_start = slot_end.saturating_sub(REFERENCE_SIZE);
    check_target(target, slot_start)?;
    to_u32(slot_end - target.get() as usize)
}

/// Writes a 4-byte reference to `target` at the back of `buffer`.
///
/// The caller is responsible for the slot's alignment. Returns the back position of the slot.
///
/// # Errors
/// Returns [`crate::Error::ContractViolation`] for a null target, which has no object to point
/// at, and [`crate::Error::ReferenceOutOfBounds`] if the target is not yet finished.
pub(crate) fn write_reference(buffer: &mut InwardBuffer, target: Position) -> Result<Position> {
    if target.is_null() {
        return Err(contract_error!("cannot materialize a reference to the null position"));
    }

    let slot_end = buffer.back_size() + REFERENCE_SIZE;
    let offset = relative_offset(slot_end, target)?;
    buffer.write_back(offset);

    Ok(Position::new(to_u32(buffer.back_size())?))
}
