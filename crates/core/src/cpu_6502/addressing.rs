//! Instruction decoding and effective-address resolution.

use super::opcodes::{descriptor, AddressingMode, Descriptor};
use super::registers::Registers;
use crate::memory::Memory6502;

/// One fetched and resolved instruction. Lives for a single `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Address of the opcode byte
    pub pc: u16,
    pub opcode: u8,
    /// Bytes following the opcode; only `length - 1` of them are meaningful
    pub operands: [u8; 2],
    /// Effective address. Zero for implied, accumulator and immediate modes.
    pub address: u16,
    /// An index register carried the address into another page
    pub page_crossed: bool,
}

impl DecodedInstruction {
    /// First operand byte (immediate value, zero-page address, branch offset).
    #[inline]
    pub fn operand_u8(&self) -> u8 {
        self.operands[0]
    }

    /// Both operand bytes as a little-endian word.
    #[inline]
    pub fn operand_u16(&self) -> u16 {
        u16::from_le_bytes(self.operands)
    }
}

/// Fetch the instruction at `regs.pc` and resolve its operand address.
///
/// Nothing is written and PC is not moved; the engine advances PC after
/// the instrumentation hook has seen the instruction.
pub fn decode<M: Memory6502>(
    regs: &Registers,
    memory: &M,
) -> (&'static Descriptor, DecodedInstruction) {
    let pc = regs.pc;
    let opcode = memory.read(pc);
    let desc = descriptor(opcode);

    let mut operands = [0u8; 2];
    for (i, slot) in operands
        .iter_mut()
        .take(desc.length.saturating_sub(1) as usize)
        .enumerate()
    {
        *slot = memory.read(pc.wrapping_add(1 + i as u16));
    }

    let next_pc = pc.wrapping_add(desc.length as u16);
    let (address, page_crossed) = resolve(desc.mode, operands, regs, next_pc, memory);

    (
        desc,
        DecodedInstruction {
            pc,
            opcode,
            operands,
            address,
            page_crossed,
        },
    )
}

/// Effective address and page-crossed flag for `mode`.
///
/// `next_pc` is the address following the instruction, which is the base
/// for relative branches.
pub fn resolve<M: Memory6502>(
    mode: AddressingMode,
    operands: [u8; 2],
    regs: &Registers,
    next_pc: u16,
    memory: &M,
) -> (u16, bool) {
    let zp = operands[0];
    let abs = u16::from_le_bytes(operands);
    match mode {
        AddressingMode::Accumulator | AddressingMode::Immediate | AddressingMode::Implied => {
            (0, false)
        }
        AddressingMode::Absolute => (abs, false),
        AddressingMode::AbsoluteX => indexed(abs, regs.x),
        AddressingMode::AbsoluteY => indexed(abs, regs.y),
        AddressingMode::ZeroPage => (zp as u16, false),
        AddressingMode::ZeroPageX => (zp.wrapping_add(regs.x) as u16, false),
        AddressingMode::ZeroPageY => (zp.wrapping_add(regs.y) as u16, false),
        AddressingMode::Relative => (next_pc.wrapping_add(zp as i8 as u16), false),
        AddressingMode::IndexedIndirect => {
            (read_zero_page_u16(memory, zp.wrapping_add(regs.x)), false)
        }
        AddressingMode::IndirectIndexed => indexed(read_zero_page_u16(memory, zp), regs.y),
        AddressingMode::Indirect => (read_u16_page_wrapped(memory, abs), false),
    }
}

#[inline]
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let addr = base.wrapping_add(index as u16);
    (addr, !same_page(addr, addr.wrapping_sub(index as u16)))
}

/// Pointer stored in the zero page; the high byte wraps to $00 after $FF.
#[inline]
fn read_zero_page_u16<M: Memory6502>(memory: &M, ptr: u8) -> u16 {
    let lo = memory.read(ptr as u16) as u16;
    let hi = memory.read(ptr.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// Read a 16-bit pointer for JMP (indirect) with the 6502 page-wrapping bug:
/// the high byte comes from the start of the same page when `ptr` ends in $FF.
#[inline]
pub fn read_u16_page_wrapped<M: Memory6502>(memory: &M, ptr: u16) -> u16 {
    let lo = memory.read(ptr) as u16;
    let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
    let hi = memory.read(hi_addr) as u16;
    (hi << 8) | lo
}

#[inline]
pub fn same_page(a: u16, b: u16) -> bool {
    a & 0xFF00 == b & 0xFF00
}
