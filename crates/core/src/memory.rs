//! Memory bus interface for the 6502 core.
//!
//! The CPU reaches all addressable storage through `Memory6502`. Bus
//! implementations own address decoding and decide what happens on an
//! access outside the storage they back. `FlatMemory` takes the lenient
//! route: such reads return 0 and such writes are dropped.

use crate::logging::{log, LogCategory, LogLevel};

/// Memory interface trait for the 6502 CPU
///
/// Systems using the 6502 must implement this trait to provide memory access.
pub trait Memory6502 {
    /// Read a byte from memory at the given address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);

    /// Read a little-endian word from `addr` and `addr + 1`.
    ///
    /// This is a plain adjacent-byte read used for vector fetches. The
    /// indirect JMP page-wrap behaviour lives in the address resolver.
    fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Size of the full 6502 address space.
pub const ADDRESS_SPACE: usize = 0x10000;

/// Flat memory image backing the low `len` bytes of the address space.
#[derive(Debug, Clone)]
pub struct FlatMemory {
    data: Vec<u8>,
}

impl FlatMemory {
    /// A zero-filled image covering the whole 64 KiB address space.
    pub fn new() -> Self {
        Self::with_size(ADDRESS_SPACE)
    }

    /// A zero-filled image covering `$0000..len`. Sizes above 64 KiB are clamped.
    pub fn with_size(len: usize) -> Self {
        Self {
            data: vec![0; len.min(ADDRESS_SPACE)],
        }
    }

    /// Number of bytes backed by this image.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy `bytes` into the image starting at `offset`.
    ///
    /// Bytes that would land past the end of the image are dropped. Returns
    /// how many bytes were actually stored.
    pub fn load(&mut self, offset: u16, bytes: &[u8]) -> usize {
        let start = offset as usize;
        if start >= self.data.len() {
            return 0;
        }
        let count = bytes.len().min(self.data.len() - start);
        self.data[start..start + count].copy_from_slice(&bytes[..count]);
        if count < bytes.len() {
            log(LogCategory::Memory, LogLevel::Warn, || {
                format!(
                    "Memory: load at ${:04X} clipped, {} of {} bytes stored",
                    offset,
                    count,
                    bytes.len()
                )
            });
        }
        count
    }

    /// Load a program and point the reset vector at it.
    pub fn load_program(&mut self, offset: u16, bytes: &[u8]) {
        self.load(offset, bytes);
        self.set_reset_vector(offset);
    }

    /// Store `addr` at `$FFFC/$FFFD`.
    pub fn set_reset_vector(&mut self, addr: u16) {
        self.write(0xFFFC, (addr & 0xFF) as u8);
        self.write(0xFFFD, (addr >> 8) as u8);
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory6502 for FlatMemory {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        match self.data.get(addr as usize) {
            Some(v) => *v,
            None => {
                log(LogCategory::Memory, LogLevel::Trace, || {
                    format!("Memory: read from unmapped ${:04X} returns 0", addr)
                });
                0
            }
        }
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        match self.data.get_mut(addr as usize) {
            Some(slot) => *slot = val,
            None => log(LogCategory::Memory, LogLevel::Trace, || {
                format!("Memory: write ${:02X} to unmapped ${:04X} dropped", val, addr)
            }),
        }
    }
}
