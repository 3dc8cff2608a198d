//! Dual-growth byte buffer backing the table writer.
//!
//! The [`crate::buffer::InwardBuffer`] owns a single contiguous allocation with two independent
//! extents growing towards each other:
//!
//! - the *front* extent `[0, front_size)` appends forward and holds transient bookkeeping
//!   (field ledgers and pending vector references),
//! - the *back* extent `[len - back_size, len)` appends backward and holds finished, immutable
//!   objects in their final read order.
//!
//! ```text
//!  0            front_size                     len - back_size          len
//!  |-- scratch -->|............ free ..............|<-- finished bytes --|
//! ```
//!
//! # Positions
//!
//! Locations inside the back extent are expressed as *back positions*: the distance from the end
//! of the allocation. A back position stays valid across reallocation because growth keeps the
//! back extent flush with the end of the new storage. Front locations are plain indices from the
//! start. Raw slices handed out by [`crate::buffer::InwardBuffer::alloc_back`] and the accessors
//! borrow the buffer, so they are valid until the next mutation and no longer.
//!
//! # Growth
//!
//! Any write that would make the extents overlap reallocates to
//! `max(2 * capacity, capacity + needed, 64)` bytes, moving the front extent to the new start and
//! the back extent to the new end.
//!
//! # Examples
//!
//! ```rust
//! use flatscope::InwardBuffer;
//!
//! let mut buffer = InwardBuffer::new();
//! buffer.write_front(7u32);
//! buffer.write_back(0x0102u16);
//! buffer.write_back(0x03u8);
//!
//! assert_eq!(buffer.front_size(), 4);
//! assert_eq!(buffer.back(), &[0x03, 0x02, 0x01]);
//!
//! buffer.erase_front(4)?;
//! assert_eq!(buffer.front_size(), 0);
//! # Ok::<(), flatscope::Error>(())
//! ```

pub mod io;

use tracing::trace;

use crate::{buffer::io::Primitive, Error::OutOfBounds, Result};

const MIN_CAPACITY: usize = 64;

/// A byte buffer with a forward-growing front extent and a backward-growing back extent.
///
/// See the [module documentation](crate::buffer) for the layout and addressing rules.
#[derive(Debug, Default, Clone)]
pub struct InwardBuffer {
    data: Vec<u8>,
    front_size: usize,
    back_size: usize,
}

impl InwardBuffer {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes across both extents.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            front_size: 0,
            back_size: 0,
        }
    }

    /// Number of bytes in the front extent.
    #[must_use]
    pub fn front_size(&self) -> usize {
        self.front_size
    }

    /// Number of bytes in the back extent.
    #[must_use]
    pub fn back_size(&self) -> usize {
        self.back_size
    }

    /// Total bytes currently allocated for both extents.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Appends a primitive to the front extent.
    pub fn write_front<T: Primitive>(&mut self, value: T) {
        self.write_front_bytes(value.to_le_bytes().as_ref());
    }

    /// Appends raw bytes to the front extent.
    pub fn write_front_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        let start = self.front_size;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self.front_size += bytes.len();
    }

    /// Prepends a primitive to the back extent.
    pub fn write_back<T: Primitive>(&mut self, value: T) {
        self.write_back_bytes(value.to_le_bytes().as_ref());
    }

    /// Prepends raw bytes to the back extent, keeping their order.
    pub fn write_back_bytes(&mut self, bytes: &[u8]) {
        self.alloc_back(bytes.len()).copy_from_slice(bytes);
    }

    /// Reserves `size` zeroed bytes at the back and returns them.
    ///
    /// The returned slice starts at back position `back_size()` (after the call) and is only
    /// valid until the buffer is mutated again.
    pub fn alloc_back(&mut self, size: usize) -> &mut [u8] {
        self.reserve(size);
        let end = self.data.len() - self.back_size;
        let start = end - size;
        self.back_size += size;

        let region = &mut self.data[start..end];
        region.fill(0);
        region
    }

    /// Removes `size` bytes from the end of the front extent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the front extent holds fewer than `size` bytes.
    pub fn erase_front(&mut self, size: usize) -> Result<()> {
        if size > self.front_size {
            return Err(OutOfBounds);
        }

        self.front_size -= size;
        Ok(())
    }

    /// The live front extent.
    #[must_use]
    pub fn front(&self) -> &[u8] {
        &self.data[..self.front_size]
    }

    /// The live front extent, mutable.
    pub fn front_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.front_size]
    }

    /// The live back extent in read order.
    #[must_use]
    pub fn back(&self) -> &[u8] {
        &self.data[self.data.len() - self.back_size..]
    }

    /// The finished bytes starting at back position `position`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `position` exceeds the back extent.
    pub fn back_at(&self, position: usize) -> Result<&[u8]> {
        if position > self.back_size {
            return Err(OutOfBounds);
        }

        Ok(&self.data[self.data.len() - position..])
    }

    /// The finished bytes starting at back position `position`, mutable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `position` exceeds the back extent.
    pub fn back_at_mut(&mut self, position: usize) -> Result<&mut [u8]> {
        if position > self.back_size {
            return Err(OutOfBounds);
        }

        let len = self.data.len();
        Ok(&mut self.data[len - position..])
    }

    /// Empties both extents while keeping the allocation.
    pub fn clear(&mut self) {
        self.front_size = 0;
        self.back_size = 0;
    }

    /// Moves the finished back extent out of the buffer and resets it.
    #[must_use]
    pub fn take_back(&mut self) -> Vec<u8> {
        let finished = self.back().to_vec();
        self.clear();
        finished
    }

    fn reserve(&mut self, additional: usize) {
        let free = self.data.len() - self.front_size - self.back_size;
        if additional <= free {
            return;
        }

        let old_capacity = self.data.len();
        let needed = self.front_size + self.back_size + additional;
        let capacity = (old_capacity * 2)
            .max(old_capacity + additional)
            .max(needed)
            .max(MIN_CAPACITY);

        let mut data = vec![0; capacity];
        data[..self.front_size].copy_from_slice(&self.data[..self.front_size]);
        data[capacity - self.back_size..]
            .copy_from_slice(&self.data[old_capacity - self.back_size..]);
        self.data = data;

        trace!(
            old_capacity,
            capacity,
            front_size = self.front_size,
            back_size = self.back_size,
            "grew inward buffer"
        );
    }
}
