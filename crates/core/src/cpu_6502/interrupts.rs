//! RESET, IRQ, NMI and the shared interrupt entry used by BRK.

use super::registers::{Registers, FLAG_B, FLAG_I, FLAG_U};
use super::Cpu6502;
use crate::logging::{log, LogCategory, LogLevel};
use crate::memory::Memory6502;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
/// Shared by IRQ and BRK
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles charged for RESET and for an externally triggered IRQ/NMI.
const INTERRUPT_CYCLES: u64 = 7;

impl<M: Memory6502> Cpu6502<M> {
    /// Reset the CPU to its power-up state (memory is untouched).
    pub fn reset(&mut self) {
        self.regs = Registers::power_on();
        self.regs.pc = self.memory.read_u16(RESET_VECTOR);
        self.cycles = INTERRUPT_CYCLES;
        self.jammed = None;
        log(LogCategory::Cpu, LogLevel::Info, || {
            format!("CPU: reset, PC=${:04X}", self.regs.pc)
        });
    }

    /// Request a maskable interrupt. Returns false when the I flag blocks it
    /// or the CPU is jammed.
    pub fn trigger_irq(&mut self) -> bool {
        if self.ignore_while_jammed("IRQ") {
            return false;
        }
        if self.regs.flag(FLAG_I) {
            log(LogCategory::Interrupts, LogLevel::Trace, || {
                format!("IRQ: masked at PC=${:04X}", self.regs.pc)
            });
            return false;
        }
        self.enter_interrupt(IRQ_VECTOR);
        self.cycles += INTERRUPT_CYCLES;
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!("IRQ: taken, vector ${:04X}", self.regs.pc)
        });
        true
    }

    /// Trigger a Non-Maskable Interrupt (NMI). Never masked, but a jammed
    /// CPU ignores it.
    pub fn trigger_nmi(&mut self) {
        if self.ignore_while_jammed("NMI") {
            return;
        }
        self.enter_interrupt(NMI_VECTOR);
        self.cycles += INTERRUPT_CYCLES;
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!("NMI: taken, vector ${:04X}", self.regs.pc)
        });
    }

    /// A jammed CPU keeps its fault state until reset.
    fn ignore_while_jammed(&self, kind: &str) -> bool {
        match self.jammed {
            Some(opcode) => {
                log(LogCategory::Interrupts, LogLevel::Trace, || {
                    format!(
                        "{}: ignored, CPU jammed by ${:02X} at PC=${:04X}",
                        kind, opcode, self.regs.pc
                    )
                });
                true
            }
            None => false,
        }
    }

    /// Push PC and status (B and U set), set I, jump through `vector`.
    ///
    /// Cycle accounting is left to the caller: BRK pays through its
    /// descriptor, external interrupts pay `INTERRUPT_CYCLES`.
    pub(super) fn enter_interrupt(&mut self, vector: u16) {
        self.push_u16(self.regs.pc);
        self.push_u8(self.regs.status | FLAG_B | FLAG_U);
        self.regs.set_flag(FLAG_I, true);
        self.regs.pc = self.memory.read_u16(vector);
    }
}
