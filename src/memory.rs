use std::fmt;

/// Default size of the byte-addressable memory, in bytes.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1024;

/// An access that does not fit inside memory.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfBounds {
    pub offset: i64,
    pub len: usize,
    pub capacity: usize,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Access of {} bytes at offset {} is outside of memory ({} bytes)",
            self.len, self.offset, self.capacity
        )
    }
}

impl std::error::Error for OutOfBounds {}

/// Flat, fixed-capacity, zero-initialized memory.
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Memory {
            bytes: vec![0; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, offset: i64, len: usize) -> Result<std::ops::Range<usize>, OutOfBounds> {
        let err = OutOfBounds {
            offset,
            len,
            capacity: self.capacity(),
        };
        let start = usize::try_from(offset).map_err(|_| err)?;
        let end = start.checked_add(len).ok_or(err)?;
        if end > self.capacity() {
            return Err(err);
        }
        Ok(start..end)
    }

    /// Fill `buf` with the bytes starting at `offset`.
    pub fn load(&self, offset: i64, buf: &mut [u8]) -> Result<(), OutOfBounds> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    /// Copy `data` into memory starting at `offset`. Nothing is written on failure.
    pub fn store(&mut self, offset: i64, data: &[u8]) -> Result<(), OutOfBounds> {
        let range = self.range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new(DEFAULT_MEMORY_CAPACITY)
    }
}
