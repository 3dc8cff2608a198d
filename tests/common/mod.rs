//! Minimal reader for the table format, used by the integration tests to decode what the
//! writer produced. It follows the read rules of the format only as far as the tests need:
//! root offset, signed offset to the vtable, vtable lookup with schema defaults and the
//! dereferencing of strings, vectors and tables.

#![allow(dead_code)]

use flatscope::{
    buffer::io::{read_le, Primitive},
    Error, Result,
};

fn read_at<T: Primitive>(bytes: &[u8], at: usize) -> Result<T> {
    read_le(bytes.get(at..).ok_or(Error::OutOfBounds)?)
}

/// Follows the `u32` relative offset stored at `at`.
pub fn follow(bytes: &[u8], at: usize) -> Result<usize> {
    let offset: u32 = read_at(bytes, at)?;
    let target = at + offset as usize;
    if target >= bytes.len() {
        return Err(Error::OutOfBounds);
    }
    Ok(target)
}

/// The root table of a finished buffer.
pub fn root(bytes: &[u8]) -> Result<Table<'_>> {
    Table::at(bytes, follow(bytes, 0)?)
}

/// The file identifier stored behind the root offset.
pub fn identifier(bytes: &[u8]) -> Option<&[u8]> {
    bytes.get(4..8)
}

fn string_at(bytes: &[u8], at: usize) -> Result<&str> {
    let len: u32 = read_at(bytes, at)?;
    let start = at + 4;
    let end = start + len as usize;

    let terminated = bytes.get(start..=end).ok_or(Error::OutOfBounds)?;
    assert_eq!(terminated[len as usize], 0, "string at {at} is not zero terminated");
    Ok(std::str::from_utf8(&terminated[..len as usize]).expect("valid utf-8"))
}

/// A table inside a finished buffer.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Table<'a> {
    pub fn at(bytes: &'a [u8], position: usize) -> Result<Self> {
        if position % 4 != 0 {
            panic!("table at {position} is not 4-byte aligned");
        }
        Ok(Self { bytes, position })
    }

    /// Absolute address of the table root.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Absolute address of the vtable.
    pub fn vtable(&self) -> Result<usize> {
        let soffset: i32 = read_at(self.bytes, self.position)?;
        let vtable = self.position as i64 - i64::from(soffset);
        usize::try_from(vtable).map_err(|_| Error::OutOfBounds)
    }

    /// Byte length of the vtable as stored in its header.
    pub fn vtable_len(&self) -> Result<u16> {
        read_at(self.bytes, self.vtable()?)
    }

    /// Object length as stored in the vtable header.
    pub fn object_len(&self) -> Result<u16> {
        read_at(self.bytes, self.vtable()? + 2)
    }

    /// Raw vtable entry for `field`, 0 when absent or beyond the vtable.
    pub fn entry(&self, field: u16) -> Result<u16> {
        if field >= self.vtable_len()? {
            return Ok(0);
        }
        read_at(self.bytes, self.vtable()? + usize::from(field))
    }

    /// Absolute address of `field`, `None` when absent.
    pub fn field(&self, field: u16) -> Result<Option<usize>> {
        Ok(match self.entry(field)? {
            0 => None,
            entry => Some(self.position + usize::from(entry)),
        })
    }

    pub fn scalar<T: Primitive>(&self, field: u16, default: T) -> Result<T> {
        match self.field(field)? {
            Some(at) => read_at(self.bytes, at),
            None => Ok(default),
        }
    }

    pub fn is_present(&self, field: u16) -> Result<bool> {
        Ok(self.field(field)?.is_some())
    }

    pub fn bytes(&self, field: u16, size: usize) -> Result<Option<&'a [u8]>> {
        match self.field(field)? {
            Some(at) => Ok(Some(
                self.bytes.get(at..at + size).ok_or(Error::OutOfBounds)?,
            )),
            None => Ok(None),
        }
    }

    pub fn string(&self, field: u16) -> Result<Option<&'a str>> {
        match self.field(field)? {
            Some(at) => Ok(Some(string_at(self.bytes, follow(self.bytes, at)?)?)),
            None => Ok(None),
        }
    }

    pub fn table(&self, field: u16) -> Result<Option<Table<'a>>> {
        match self.field(field)? {
            Some(at) => Ok(Some(Table::at(self.bytes, follow(self.bytes, at)?)?)),
            None => Ok(None),
        }
    }

    pub fn vector(&self, field: u16) -> Result<Option<Vector<'a>>> {
        match self.field(field)? {
            Some(at) => Ok(Some(Vector::at(self.bytes, follow(self.bytes, at)?)?)),
            None => Ok(None),
        }
    }
}

/// A vector inside a finished buffer.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a> {
    bytes: &'a [u8],
    position: usize,
    len: usize,
}

impl<'a> Vector<'a> {
    pub fn at(bytes: &'a [u8], position: usize) -> Result<Self> {
        if position % 4 != 0 {
            panic!("vector at {position} is not 4-byte aligned");
        }
        let len: u32 = read_at(bytes, position)?;
        Ok(Self {
            bytes,
            position,
            len: len as usize,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Absolute address of the first element.
    pub fn elements(&self) -> usize {
        self.position + 4
    }

    pub fn scalar<T: Primitive>(&self, index: usize) -> Result<T> {
        assert!(index < self.len);
        read_at(self.bytes, self.elements() + index * T::SIZE)
    }

    pub fn scalars<T: Primitive>(&self) -> Result<Vec<T>> {
        (0..self.len).map(|index| self.scalar(index)).collect()
    }

    pub fn element_bytes(&self, index: usize, size: usize) -> Result<&'a [u8]> {
        assert!(index < self.len);
        let at = self.elements() + index * size;
        self.bytes.get(at..at + size).ok_or(Error::OutOfBounds)
    }

    pub fn string(&self, index: usize) -> Result<&'a str> {
        assert!(index < self.len);
        string_at(self.bytes, follow(self.bytes, self.elements() + index * 4)?)
    }

    pub fn strings(&self) -> Result<Vec<&'a str>> {
        (0..self.len).map(|index| self.string(index)).collect()
    }

    pub fn table(&self, index: usize) -> Result<Table<'a>> {
        assert!(index < self.len);
        Table::at(self.bytes, follow(self.bytes, self.elements() + index * 4)?)
    }
}
