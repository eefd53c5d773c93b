//! Programmer-visible 6502 registers.

use serde::{Deserialize, Serialize};

/// Carry
pub const FLAG_C: u8 = 0x01;
/// Zero
pub const FLAG_Z: u8 = 0x02;
/// Interrupt disable
pub const FLAG_I: u8 = 0x04;
/// Decimal mode (stored, never affects arithmetic)
pub const FLAG_D: u8 = 0x08;
/// Break; only exists in pushed copies of the status byte
pub const FLAG_B: u8 = 0x10;
/// Unused; always reads as 1
pub const FLAG_U: u8 = 0x20;
/// Overflow
pub const FLAG_V: u8 = 0x40;
/// Negative
pub const FLAG_N: u8 = 0x80;

/// Status byte after power-up and RESET: I and U set.
pub const POWER_ON_STATUS: u8 = FLAG_I | FLAG_U;
/// Stack pointer after RESET.
pub const POWER_ON_SP: u8 = 0xFD;
/// Base address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Register file snapshot (NV-BDIZC status layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Stack pointer, offset into page $01
    pub sp: u8,
    pub status: u8,
    pub pc: u16,
}

impl Registers {
    pub fn power_on() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: POWER_ON_SP,
            status: POWER_ON_STATUS,
            pc: 0,
        }
    }

    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        self.status & mask != 0
    }

    #[inline]
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    /// Replace the whole status byte.
    #[inline]
    pub fn set_flags(&mut self, status: u8) {
        self.status = status;
    }

    /// Update Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, v: u8) {
        self.set_flag(FLAG_Z, v == 0);
        self.set_flag(FLAG_N, v & 0x80 != 0);
    }

    /// Carry as 0 or 1, for arithmetic.
    #[inline]
    pub fn carry(&self) -> u8 {
        self.status & FLAG_C
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::power_on()
    }
}
