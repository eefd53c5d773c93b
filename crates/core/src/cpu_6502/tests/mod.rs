//! Tests for the MOS 6502 core
//!
//! Organized by instruction group:
//! - `tests_load_store`: loads, stores, transfers and addressing modes
//! - `tests_alu`: ADC/SBC, logic, compares, increments
//! - `tests_shifts`: shifts and rotates on A and memory
//! - `tests_jumps`: JMP, JSR/RTS, RTI, branch timing
//! - `tests_stack`: PHA/PLA, PHP/PLP, stack pointer wrap
//! - `tests_interrupts`: RESET, IRQ, NMI, BRK
//! - `tests_undocumented`: undocumented opcodes and jams
//! - `tests_timing`: page-cross charging and the execution hook
//! - `tests_state`: save/load state

mod tests_load_store;

use crate::cpu_6502::Cpu6502;
use crate::memory::FlatMemory;

/// Program origin used by every test.
pub(super) const ORIGIN: u16 = 0x8000;

/// CPU with `program` at `ORIGIN`, already reset onto it.
pub(super) fn cpu_with(program: &[u8]) -> Cpu6502<FlatMemory> {
    let mut mem = FlatMemory::new();
    mem.load_program(ORIGIN, program);
    let mut cpu = Cpu6502::new(mem);
    cpu.reset();
    cpu
}

/// Step once, panicking on a fault.
pub(super) fn step(cpu: &mut Cpu6502<FlatMemory>) -> u32 {
    cpu.step().expect("instruction should execute")
}
