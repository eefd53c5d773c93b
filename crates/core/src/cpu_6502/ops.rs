//! Instruction semantics.
//!
//! `execute` runs after the engine has charged the base cycles and moved PC
//! past the instruction. Undocumented read-modify-write opcodes are built
//! from the same shift/increment and ALU primitives as the documented ones.

use super::addressing::{same_page, DecodedInstruction};
use super::interrupts::IRQ_VECTOR;
use super::opcodes::{AddressingMode, Descriptor, Op};
use super::registers::{FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_U, FLAG_V, FLAG_Z};
use super::Cpu6502;
use crate::logging::{log, LogCategory, LogLevel};
use crate::memory::Memory6502;
use crate::CpuError;

impl<M: Memory6502> Cpu6502<M> {
    pub(super) fn execute(
        &mut self,
        desc: &Descriptor,
        ins: &DecodedInstruction,
    ) -> Result<(), CpuError> {
        let mode = desc.mode;
        match desc.op {
            // loads, stores, transfers
            Op::Lda => {
                self.regs.a = self.operand(mode, ins);
                self.regs.set_zn(self.regs.a);
            }
            Op::Ldx => {
                self.regs.x = self.operand(mode, ins);
                self.regs.set_zn(self.regs.x);
            }
            Op::Ldy => {
                self.regs.y = self.operand(mode, ins);
                self.regs.set_zn(self.regs.y);
            }
            Op::Sta => self.write(ins.address, self.regs.a),
            Op::Stx => self.write(ins.address, self.regs.x),
            Op::Sty => self.write(ins.address, self.regs.y),
            Op::Tax => {
                self.regs.x = self.regs.a;
                self.regs.set_zn(self.regs.x);
            }
            Op::Tay => {
                self.regs.y = self.regs.a;
                self.regs.set_zn(self.regs.y);
            }
            Op::Txa => {
                self.regs.a = self.regs.x;
                self.regs.set_zn(self.regs.a);
            }
            Op::Tya => {
                self.regs.a = self.regs.y;
                self.regs.set_zn(self.regs.a);
            }
            Op::Tsx => {
                self.regs.x = self.regs.sp;
                self.regs.set_zn(self.regs.x);
            }
            // TXS leaves the flags alone
            Op::Txs => self.regs.sp = self.regs.x,

            // arithmetic and logic
            Op::Adc => {
                let v = self.operand(mode, ins);
                self.add_with_carry(v);
            }
            Op::Sbc => {
                let v = self.operand(mode, ins);
                self.add_with_carry(!v);
            }
            Op::And => {
                self.regs.a &= self.operand(mode, ins);
                self.regs.set_zn(self.regs.a);
            }
            Op::Ora => {
                self.regs.a |= self.operand(mode, ins);
                self.regs.set_zn(self.regs.a);
            }
            Op::Eor => {
                self.regs.a ^= self.operand(mode, ins);
                self.regs.set_zn(self.regs.a);
            }
            Op::Cmp => {
                let v = self.operand(mode, ins);
                self.compare(self.regs.a, v);
            }
            Op::Cpx => {
                let v = self.operand(mode, ins);
                self.compare(self.regs.x, v);
            }
            Op::Cpy => {
                let v = self.operand(mode, ins);
                self.compare(self.regs.y, v);
            }
            Op::Bit => {
                let m = self.operand(mode, ins);
                self.regs.set_flag(FLAG_Z, self.regs.a & m == 0);
                self.regs.set_flag(FLAG_V, m & 0x40 != 0);
                self.regs.set_flag(FLAG_N, m & 0x80 != 0);
            }

            // shifts, rotates, increments
            Op::Asl => {
                let r = self.modify(mode, ins, Self::asl);
                self.regs.set_zn(r);
            }
            Op::Lsr => {
                let r = self.modify(mode, ins, Self::lsr);
                self.regs.set_zn(r);
            }
            Op::Rol => {
                let r = self.modify(mode, ins, Self::rol);
                self.regs.set_zn(r);
            }
            Op::Ror => {
                let r = self.modify(mode, ins, Self::ror);
                self.regs.set_zn(r);
            }
            Op::Inc => {
                let r = self.modify(mode, ins, |_, v| v.wrapping_add(1));
                self.regs.set_zn(r);
            }
            Op::Dec => {
                let r = self.modify(mode, ins, |_, v| v.wrapping_sub(1));
                self.regs.set_zn(r);
            }
            Op::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.set_zn(self.regs.x);
            }
            Op::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.set_zn(self.regs.y);
            }
            Op::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.set_zn(self.regs.x);
            }
            Op::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.set_zn(self.regs.y);
            }

            // branches
            Op::Bcc => self.branch(desc, ins, !self.regs.flag(FLAG_C)),
            Op::Bcs => self.branch(desc, ins, self.regs.flag(FLAG_C)),
            Op::Bne => self.branch(desc, ins, !self.regs.flag(FLAG_Z)),
            Op::Beq => self.branch(desc, ins, self.regs.flag(FLAG_Z)),
            Op::Bpl => self.branch(desc, ins, !self.regs.flag(FLAG_N)),
            Op::Bmi => self.branch(desc, ins, self.regs.flag(FLAG_N)),
            Op::Bvc => self.branch(desc, ins, !self.regs.flag(FLAG_V)),
            Op::Bvs => self.branch(desc, ins, self.regs.flag(FLAG_V)),

            // jumps and subroutines
            Op::Jmp => self.regs.pc = ins.address,
            Op::Jsr => {
                // PC is past the operand; push the address of its last byte
                self.push_u16(self.regs.pc.wrapping_sub(1));
                self.regs.pc = ins.address;
            }
            Op::Rts => self.regs.pc = self.pop_u16().wrapping_add(1),
            Op::Rti => {
                let s = self.pop_u8();
                self.regs.set_flags((s & !FLAG_B) | FLAG_U);
                self.regs.pc = self.pop_u16();
            }
            Op::Brk => {
                log(LogCategory::Interrupts, LogLevel::Debug, || {
                    format!(
                        "BRK: at ${:04X}, status=${:02X}",
                        ins.pc, self.regs.status
                    )
                });
                self.enter_interrupt(IRQ_VECTOR);
            }

            // stack
            Op::Pha => self.push_u8(self.regs.a),
            Op::Php => self.push_u8(self.regs.status | FLAG_B | FLAG_U),
            Op::Pla => {
                self.regs.a = self.pop_u8();
                self.regs.set_zn(self.regs.a);
            }
            Op::Plp => {
                let s = self.pop_u8();
                self.regs.set_flags((s & !FLAG_B) | FLAG_U);
            }

            // flags
            Op::Clc => self.regs.set_flag(FLAG_C, false),
            Op::Sec => self.regs.set_flag(FLAG_C, true),
            Op::Cli => self.regs.set_flag(FLAG_I, false),
            Op::Sei => self.regs.set_flag(FLAG_I, true),
            Op::Cld => self.regs.set_flag(FLAG_D, false),
            Op::Sed => self.regs.set_flag(FLAG_D, true),
            Op::Clv => self.regs.set_flag(FLAG_V, false),

            Op::Nop => {
                // multi-byte NOPs still perform their dummy read
                if mode.has_address() {
                    let _ = self.read(ins.address);
                }
            }

            // undocumented combinations
            Op::Lax => {
                let v = self.operand(mode, ins);
                self.regs.a = v;
                self.regs.x = v;
                self.regs.set_zn(v);
            }
            Op::Sax => self.write(ins.address, self.regs.a & self.regs.x),
            Op::Slo => {
                let r = self.modify(mode, ins, Self::asl);
                self.regs.a |= r;
                self.regs.set_zn(self.regs.a);
            }
            Op::Rla => {
                let r = self.modify(mode, ins, Self::rol);
                self.regs.a &= r;
                self.regs.set_zn(self.regs.a);
            }
            Op::Sre => {
                let r = self.modify(mode, ins, Self::lsr);
                self.regs.a ^= r;
                self.regs.set_zn(self.regs.a);
            }
            Op::Rra => {
                // carry out of the rotate feeds the add
                let r = self.modify(mode, ins, Self::ror);
                self.add_with_carry(r);
            }
            Op::Dcp => {
                let r = self.modify(mode, ins, |_, v| v.wrapping_sub(1));
                self.compare(self.regs.a, r);
            }
            Op::Isb => {
                let r = self.modify(mode, ins, |_, v| v.wrapping_add(1));
                self.add_with_carry(!r);
            }
            Op::Anc => {
                self.regs.a &= self.operand(mode, ins);
                self.regs.set_zn(self.regs.a);
                self.regs.set_flag(FLAG_C, self.regs.a & 0x80 != 0);
            }
            Op::Alr => {
                let v = self.regs.a & self.operand(mode, ins);
                self.regs.a = self.lsr(v);
                self.regs.set_zn(self.regs.a);
            }
            Op::Arr => {
                let v = self.regs.a & self.operand(mode, ins);
                let r = (v >> 1) | (self.regs.carry() << 7);
                self.regs.a = r;
                self.regs.set_zn(r);
                self.regs.set_flag(FLAG_C, r & 0x40 != 0);
                self.regs.set_flag(FLAG_V, ((r >> 6) ^ (r >> 5)) & 1 != 0);
            }
            Op::Axs => {
                let t = self.regs.a & self.regs.x;
                let v = self.operand(mode, ins);
                self.regs.set_flag(FLAG_C, t >= v);
                self.regs.x = t.wrapping_sub(v);
                self.regs.set_zn(self.regs.x);
            }

            Op::Illegal => return Err(self.fault(desc, ins)),
        }
        Ok(())
    }

    /// Operand value: the immediate byte, the accumulator, or memory.
    #[inline]
    fn operand(&self, mode: AddressingMode, ins: &DecodedInstruction) -> u8 {
        match mode {
            AddressingMode::Immediate => ins.operand_u8(),
            AddressingMode::Accumulator => self.regs.a,
            _ => self.read(ins.address),
        }
    }

    /// Read-modify-write on the accumulator or memory; returns the new value.
    #[inline]
    fn modify<F>(&mut self, mode: AddressingMode, ins: &DecodedInstruction, f: F) -> u8
    where
        F: FnOnce(&mut Self, u8) -> u8,
    {
        let v = self.operand(mode, ins);
        let r = f(&mut *self, v);
        if mode == AddressingMode::Accumulator {
            self.regs.a = r;
        } else {
            self.write(ins.address, r);
        }
        r
    }

    /// Binary add of `value` and carry into A. SBC passes the one's complement.
    fn add_with_carry(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = a as u16 + value as u16 + self.regs.carry() as u16;
        let result = sum as u8;
        self.regs.set_flag(FLAG_C, sum > 0xFF);
        self.regs
            .set_flag(FLAG_V, (value ^ result) & (a ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.set_zn(result);
    }

    fn compare(&mut self, reg: u8, value: u8) {
        let r = reg.wrapping_sub(value);
        self.regs.set_flag(FLAG_C, reg >= value);
        self.regs.set_flag(FLAG_Z, reg == value);
        self.regs.set_flag(FLAG_N, r & 0x80 != 0);
    }

    fn asl(&mut self, v: u8) -> u8 {
        self.regs.set_flag(FLAG_C, v & 0x80 != 0);
        v << 1
    }

    fn lsr(&mut self, v: u8) -> u8 {
        self.regs.set_flag(FLAG_C, v & 0x01 != 0);
        v >> 1
    }

    fn rol(&mut self, v: u8) -> u8 {
        let carry_in = self.regs.carry();
        self.regs.set_flag(FLAG_C, v & 0x80 != 0);
        (v << 1) | carry_in
    }

    fn ror(&mut self, v: u8) -> u8 {
        let carry_in = self.regs.carry();
        self.regs.set_flag(FLAG_C, v & 0x01 != 0);
        (v >> 1) | (carry_in << 7)
    }

    /// Taken branches cost one cycle, plus the page-cross cost when the
    /// target is in a different page than the next instruction.
    fn branch(&mut self, desc: &Descriptor, ins: &DecodedInstruction, condition: bool) {
        if !condition {
            return;
        }
        self.cycles += 1;
        if !same_page(self.regs.pc, ins.address) {
            self.cycles += desc.page_cross_cycles as u64;
        }
        self.regs.pc = ins.address;
    }

    /// Jam on an opcode with no defined behaviour. PC is put back on the
    /// opcode so the state reads as "stopped at this instruction".
    fn fault(&mut self, desc: &Descriptor, ins: &DecodedInstruction) -> CpuError {
        self.regs.pc = ins.pc;
        self.jammed = Some(ins.opcode);
        log(LogCategory::Cpu, LogLevel::Error, || {
            format!(
                "CPU: illegal opcode ${:02X} ({}) at ${:04X}, A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X}",
                ins.opcode,
                desc.mnemonic,
                ins.pc,
                self.regs.a,
                self.regs.x,
                self.regs.y,
                self.regs.sp,
                self.regs.status
            )
        });
        CpuError::IllegalOpcode {
            opcode: ins.opcode,
            pc: ins.pc,
        }
    }
}
