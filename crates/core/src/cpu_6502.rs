//! MOS 6502 CPU core implementation
//!
//! A table-driven, instruction-stepped 6502 that any system can host by
//! implementing `Memory6502`. Each `step` runs one instruction to completion:
//!
//! 1. fetch the opcode and its operand bytes, look up the `Descriptor`
//! 2. resolve the effective address and whether indexing crossed a page
//! 3. hand everything to the installed `ExecutionHook`, if any
//! 4. charge the descriptor's cycles, advance PC past the instruction
//! 5. run the operation, which may overwrite PC
//!
//! PC is advanced before the operation body on purpose: branch targets and
//! the return address pushed by JSR are computed from the next instruction.

mod addressing;
mod interrupts;
mod opcodes;
mod ops;
mod registers;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use addressing::{read_u16_page_wrapped, resolve, same_page, DecodedInstruction};
pub use interrupts::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
pub use opcodes::{descriptor, Access, AddressingMode, Descriptor, Op, OPCODES};
pub use registers::{
    Registers, FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_U, FLAG_V, FLAG_Z, POWER_ON_SP,
    POWER_ON_STATUS, STACK_BASE,
};

use crate::memory::Memory6502;
use crate::CpuError;

/// Version tag written by `save_state`.
pub const STATE_VERSION: u64 = 1;

/// Observer called once per `step`, before cycles are charged and PC moves.
///
/// Hooks are for tracing. They see the bus read-only and get the cycle count
/// as it was before the instruction.
pub trait ExecutionHook<M> {
    fn before_execute(
        &mut self,
        descriptor: &Descriptor,
        instruction: &DecodedInstruction,
        registers: &Registers,
        memory: &M,
        cycles: u64,
    );
}

/// Adapter so plain closures can be installed as hooks.
struct FnHook<F>(F);

impl<M, F> ExecutionHook<M> for FnHook<F>
where
    F: FnMut(&Descriptor, &DecodedInstruction, &Registers, &M, u64),
{
    fn before_execute(
        &mut self,
        descriptor: &Descriptor,
        instruction: &DecodedInstruction,
        registers: &Registers,
        memory: &M,
        cycles: u64,
    ) {
        (self.0)(descriptor, instruction, registers, memory, cycles)
    }
}

#[derive(Serialize, Deserialize)]
struct CpuSnapshot {
    version: u64,
    registers: Registers,
    cycles: u64,
    jammed: Option<u8>,
}

/// MOS 6502 CPU state and execution engine
pub struct Cpu6502<M: Memory6502> {
    regs: Registers,
    /// Cycles since power-up; RESET seeds it with 7
    cycles: u64,
    /// Memory interface
    pub memory: M,
    /// Opcode that faulted; the CPU refuses to run until reset
    jammed: Option<u8>,
    hook: Option<Box<dyn ExecutionHook<M>>>,
}

impl<M: Memory6502> Cpu6502<M> {
    /// Create a CPU in its power-on register state.
    ///
    /// PC is not loaded until `reset`, so the bus can be filled first.
    pub fn new(memory: M) -> Self {
        Self {
            regs: Registers::power_on(),
            cycles: 0,
            memory,
            jammed: None,
            hook: None,
        }
    }

    /// Execute one instruction and return the cycles it used.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        if let Some(opcode) = self.jammed {
            return Err(CpuError::Jammed {
                opcode,
                pc: self.regs.pc,
            });
        }

        let start = self.cycles;
        let (desc, decoded) = addressing::decode(&self.regs, &self.memory);

        if let Some(hook) = self.hook.as_mut() {
            hook.before_execute(desc, &decoded, &self.regs, &self.memory, self.cycles);
        }

        self.cycles += desc.cycles_for(decoded.page_crossed);
        self.regs.pc = self.regs.pc.wrapping_add(desc.length as u16);

        self.execute(desc, &decoded)?;
        Ok((self.cycles - start) as u32)
    }

    /// Install a hook object, replacing any previous one.
    pub fn set_hook<H>(&mut self, hook: H)
    where
        H: ExecutionHook<M> + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    /// Install a closure as the hook.
    pub fn set_hook_fn<F>(&mut self, f: F)
    where
        F: FnMut(&Descriptor, &DecodedInstruction, &Registers, &M, u64) + 'static,
    {
        self.hook = Some(Box::new(FnHook(f)));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    pub fn a(&self) -> u8 {
        self.regs.a
    }

    pub fn set_a(&mut self, v: u8) {
        self.regs.a = v;
    }

    pub fn x(&self) -> u8 {
        self.regs.x
    }

    pub fn set_x(&mut self, v: u8) {
        self.regs.x = v;
    }

    pub fn y(&self) -> u8 {
        self.regs.y
    }

    pub fn set_y(&mut self, v: u8) {
        self.regs.y = v;
    }

    pub fn sp(&self) -> u8 {
        self.regs.sp
    }

    pub fn set_sp(&mut self, v: u8) {
        self.regs.sp = v;
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_pc(&mut self, v: u16) {
        self.regs.pc = v;
    }

    /// Status byte (NV-BDIZC)
    pub fn status(&self) -> u8 {
        self.regs.status
    }

    pub fn set_status(&mut self, v: u8) {
        self.regs.set_flags(v);
    }

    pub fn flag(&self, mask: u8) -> bool {
        self.regs.flag(mask)
    }

    pub fn set_flag(&mut self, mask: u8, on: bool) {
        self.regs.set_flag(mask, on);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Copy of the register file.
    pub fn registers(&self) -> Registers {
        self.regs
    }

    pub fn set_registers(&mut self, regs: Registers) {
        self.regs = regs;
    }

    /// True after an illegal opcode until the next `reset`.
    pub fn is_jammed(&self) -> bool {
        self.jammed.is_some()
    }

    /// Serialize registers, cycle count and jam state (not memory).
    pub fn save_state(&self) -> serde_json::Value {
        serde_json::json!({
            "cpu": "6502",
            "version": STATE_VERSION,
            "registers": self.regs,
            "cycles": self.cycles,
            "jammed": self.jammed,
        })
    }

    /// Restore a state produced by `save_state`.
    pub fn load_state(&mut self, v: &serde_json::Value) -> Result<(), CpuError> {
        let snapshot = CpuSnapshot::deserialize(v)?;
        if snapshot.version != STATE_VERSION {
            return Err(CpuError::UnsupportedStateVersion(snapshot.version));
        }
        self.regs = snapshot.registers;
        self.cycles = snapshot.cycles;
        self.jammed = snapshot.jammed;
        Ok(())
    }

    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val);
    }

    #[inline]
    fn push_u8(&mut self, v: u8) {
        let addr = STACK_BASE | self.regs.sp as u16;
        self.write(addr, v);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    #[inline]
    fn pop_u8(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.read(STACK_BASE | self.regs.sp as u16)
    }

    /// High byte first, so the word reads back little-endian.
    #[inline]
    fn push_u16(&mut self, v: u16) {
        self.push_u8((v >> 8) as u8);
        self.push_u8((v & 0xFF) as u8);
    }

    #[inline]
    fn pop_u16(&mut self) -> u16 {
        let lo = self.pop_u8() as u16;
        let hi = self.pop_u8() as u16;
        (hi << 8) | lo
    }
}

impl<M: Memory6502> fmt::Debug for Cpu6502<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu6502")
            .field("regs", &self.regs)
            .field("cycles", &self.cycles)
            .field("jammed", &self.jammed)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<M: Memory6502> crate::Cpu for Cpu6502<M> {
    fn reset(&mut self) {
        Cpu6502::reset(self);
    }

    fn step(&mut self) -> Result<u32, CpuError> {
        Cpu6502::step(self)
    }

    fn trigger_irq(&mut self) -> bool {
        Cpu6502::trigger_irq(self)
    }

    fn trigger_nmi(&mut self) {
        Cpu6502::trigger_nmi(self);
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }
}
