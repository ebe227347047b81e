//! RAM Buffer Implementation.
//!
//! Byte-addressed backing storage for the data memory. Accesses are relative to the start of the
//! buffer and bounds-checked; out-of-range reads return `None` and out-of-range writes are
//! refused, so the memory model can turn them into access faults.

/// Little-endian byte storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RamBuffer {
    bytes: Vec<u8>,
}

impl RamBuffer {
    /// Creates a zero-filled buffer of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Size in bytes.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-sized buffer.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads the doubleword at `offset`.
    pub fn read_u64(&self, offset: u64) -> Option<u64> {
        let start = usize::try_from(offset).ok()?;
        let slice = self.bytes.get(start..start.checked_add(8)?)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(slice);
        Some(u64::from_le_bytes(word))
    }

    /// Writes the bytes of `value` selected by `strobe` into the doubleword at `offset`.
    ///
    /// Returns `false` if the doubleword is out of range.
    pub fn write_masked(&mut self, offset: u64, value: u64, strobe: u8) -> bool {
        let Some(start) = usize::try_from(offset).ok() else {
            return false;
        };
        let Some(slice) = start
            .checked_add(8)
            .and_then(|end| self.bytes.get_mut(start..end))
        else {
            return false;
        };
        for (i, (dst, src)) in slice.iter_mut().zip(value.to_le_bytes()).enumerate() {
            if strobe & (1 << i) != 0 {
                *dst = src;
            }
        }
        true
    }

    /// Copies `data` to `offset`. Returns `false` if it does not fit.
    pub fn write_slice(&mut self, offset: u64, data: &[u8]) -> bool {
        let Some(start) = usize::try_from(offset).ok() else {
            return false;
        };
        match start
            .checked_add(data.len())
            .and_then(|end| self.bytes.get_mut(start..end))
        {
            Some(dst) => {
                dst.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    /// Clears every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}
