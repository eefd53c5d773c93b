//! Instruction descriptor table.
//!
//! One `Descriptor` per opcode byte: addressing mode, length, base cycle
//! cost, page-cross cost, mnemonic and the operation that executes it.
//! Opcodes with no usable behaviour (KIL/JAM and the unstable
//! store/transfer combinations) map to `Op::Illegal`, which faults.

/// Addressing modes of the NMOS 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Accumulator,
    Immediate,
    Implied,
    /// `(zp,X)`
    IndexedIndirect,
    /// `(abs)`, JMP only
    Indirect,
    /// `(zp),Y`
    IndirectIndexed,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

impl AddressingMode {
    /// Instruction length in bytes, opcode included.
    pub const fn length(self) -> u8 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied => 1,
            AddressingMode::Immediate
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed
            | AddressingMode::Relative
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY => 2,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
        }
    }

    /// Whether the mode resolves to a memory address.
    pub const fn has_address(self) -> bool {
        !matches!(
            self,
            AddressingMode::Accumulator | AddressingMode::Immediate | AddressingMode::Implied
        )
    }
}

/// How an operation touches its operand; decides the page-cross charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Pays the page-cross cost only when a page is actually crossed.
    Read,
    /// Always pays the page-cross cost.
    Write,
    /// Read-modify-write; always pays the page-cross cost.
    Modify,
    /// No operand access (implied, stack, flow control).
    Internal,
}

/// Operation executed by a descriptor.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // undocumented
    Alr, Anc, Arr, Axs, Dcp, Isb, Lax, Rla, Rra, Sax, Slo, Sre,
    Illegal,
}

impl Op {
    pub const fn access(self) -> Access {
        match self {
            Op::Adc | Op::And | Op::Bit | Op::Cmp | Op::Cpx | Op::Cpy | Op::Eor | Op::Lda
            | Op::Ldx | Op::Ldy | Op::Nop | Op::Ora | Op::Sbc | Op::Lax | Op::Alr | Op::Anc
            | Op::Arr | Op::Axs => Access::Read,
            Op::Sta | Op::Stx | Op::Sty | Op::Sax => Access::Write,
            Op::Asl | Op::Lsr | Op::Rol | Op::Ror | Op::Inc | Op::Dec | Op::Dcp | Op::Isb
            | Op::Rla | Op::Rra | Op::Slo | Op::Sre => Access::Modify,
            _ => Access::Internal,
        }
    }

    #[rustfmt::skip]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Op::Adc => "ADC", Op::And => "AND", Op::Asl => "ASL", Op::Bcc => "BCC",
            Op::Bcs => "BCS", Op::Beq => "BEQ", Op::Bit => "BIT", Op::Bmi => "BMI",
            Op::Bne => "BNE", Op::Bpl => "BPL", Op::Brk => "BRK", Op::Bvc => "BVC",
            Op::Bvs => "BVS", Op::Clc => "CLC", Op::Cld => "CLD", Op::Cli => "CLI",
            Op::Clv => "CLV", Op::Cmp => "CMP", Op::Cpx => "CPX", Op::Cpy => "CPY",
            Op::Dec => "DEC", Op::Dex => "DEX", Op::Dey => "DEY", Op::Eor => "EOR",
            Op::Inc => "INC", Op::Inx => "INX", Op::Iny => "INY", Op::Jmp => "JMP",
            Op::Jsr => "JSR", Op::Lda => "LDA", Op::Ldx => "LDX", Op::Ldy => "LDY",
            Op::Lsr => "LSR", Op::Nop => "NOP", Op::Ora => "ORA", Op::Pha => "PHA",
            Op::Php => "PHP", Op::Pla => "PLA", Op::Plp => "PLP", Op::Rol => "ROL",
            Op::Ror => "ROR", Op::Rti => "RTI", Op::Rts => "RTS", Op::Sbc => "SBC",
            Op::Sec => "SEC", Op::Sed => "SED", Op::Sei => "SEI", Op::Sta => "STA",
            Op::Stx => "STX", Op::Sty => "STY", Op::Tax => "TAX", Op::Tay => "TAY",
            Op::Tsx => "TSX", Op::Txa => "TXA", Op::Txs => "TXS", Op::Tya => "TYA",
            Op::Alr => "ALR", Op::Anc => "ANC", Op::Arr => "ARR", Op::Axs => "AXS",
            Op::Dcp => "DCP", Op::Isb => "ISB", Op::Lax => "LAX", Op::Rla => "RLA",
            Op::Rra => "RRA", Op::Sax => "SAX", Op::Slo => "SLO", Op::Sre => "SRE",
            Op::Illegal => "???",
        }
    }
}

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub op: Op,
    pub mode: AddressingMode,
    /// Bytes including the opcode (1-3)
    pub length: u8,
    /// Base cycle cost
    pub cycles: u8,
    /// Extra cost for an indexed page crossing (and for taken branches that
    /// land in another page)
    pub page_cross_cycles: u8,
    pub mnemonic: &'static str,
    /// Not part of the documented instruction set
    pub undocumented: bool,
}

impl Descriptor {
    /// Cycles charged before the handler runs.
    ///
    /// Write and read-modify-write accesses pay the page-cross cost whether
    /// or not a page was crossed; reads only pay it on a crossing. Branches
    /// never pay here: their taken and page-cross costs are added when the
    /// branch executes.
    #[inline]
    pub const fn cycles_for(&self, page_crossed: bool) -> u64 {
        let penalty = match self.op.access() {
            Access::Write | Access::Modify => true,
            Access::Read => page_crossed,
            Access::Internal => false,
        };
        if penalty {
            self.cycles as u64 + self.page_cross_cycles as u64
        } else {
            self.cycles as u64
        }
    }

    pub const fn is_illegal(&self) -> bool {
        matches!(self.op, Op::Illegal)
    }
}

use AddressingMode as M;

const fn op(op: Op, mode: M, cycles: u8, page: u8) -> Descriptor {
    Descriptor {
        op,
        mode,
        length: mode.length(),
        cycles,
        page_cross_cycles: page,
        mnemonic: op.mnemonic(),
        undocumented: false,
    }
}

const fn un(op: Op, mode: M, cycles: u8, page: u8) -> Descriptor {
    let mut d = self::op(op, mode, cycles, page);
    d.undocumented = true;
    d
}

/// Fault entry. Mnemonic and mode are kept for tracing only.
const fn bad(mnemonic: &'static str, mode: M) -> Descriptor {
    Descriptor {
        op: Op::Illegal,
        mode,
        length: mode.length(),
        cycles: 0,
        page_cross_cycles: 0,
        mnemonic,
        undocumented: true,
    }
}

const BRK: Descriptor = Descriptor {
    // opcode + signature byte
    length: 2,
    ..op(Op::Brk, M::Implied, 7, 0)
};

const ABS: M = M::Absolute;
const ABX: M = M::AbsoluteX;
const ABY: M = M::AbsoluteY;
const ACC: M = M::Accumulator;
const IMM: M = M::Immediate;
const IMP: M = M::Implied;
const IZX: M = M::IndexedIndirect;
const IND: M = M::Indirect;
const IZY: M = M::IndirectIndexed;
const REL: M = M::Relative;
const ZP: M = M::ZeroPage;
const ZPX: M = M::ZeroPageX;
const ZPY: M = M::ZeroPageY;

const JAM: Descriptor = bad("JAM", IMP);

use Op::*;

/// Indexed write and read-modify-write forms list the hardware cost minus
/// one with a page-cross cost of one; `cycles_for` always adds it back.
#[rustfmt::skip]
pub static OPCODES: [Descriptor; 256] = [
    // 0x00
    BRK,                op(Ora, IZX, 6, 0), JAM,                un(Slo, IZX, 8, 0),
    un(Nop, ZP, 3, 0),  op(Ora, ZP, 3, 0),  op(Asl, ZP, 5, 0),  un(Slo, ZP, 5, 0),
    op(Php, IMP, 3, 0), op(Ora, IMM, 2, 0), op(Asl, ACC, 2, 0), un(Anc, IMM, 2, 0),
    un(Nop, ABS, 4, 0), op(Ora, ABS, 4, 0), op(Asl, ABS, 6, 0), un(Slo, ABS, 6, 0),
    // 0x10
    op(Bpl, REL, 2, 1), op(Ora, IZY, 5, 1), JAM,                un(Slo, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(Ora, ZPX, 4, 0), op(Asl, ZPX, 6, 0), un(Slo, ZPX, 6, 0),
    op(Clc, IMP, 2, 0), op(Ora, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Slo, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(Ora, ABX, 4, 1), op(Asl, ABX, 6, 1), un(Slo, ABX, 6, 1),
    // 0x20
    op(Jsr, ABS, 6, 0), op(And, IZX, 6, 0), JAM,                un(Rla, IZX, 8, 0),
    op(Bit, ZP, 3, 0),  op(And, ZP, 3, 0),  op(Rol, ZP, 5, 0),  un(Rla, ZP, 5, 0),
    op(Plp, IMP, 4, 0), op(And, IMM, 2, 0), op(Rol, ACC, 2, 0), un(Anc, IMM, 2, 0),
    op(Bit, ABS, 4, 0), op(And, ABS, 4, 0), op(Rol, ABS, 6, 0), un(Rla, ABS, 6, 0),
    // 0x30
    op(Bmi, REL, 2, 1), op(And, IZY, 5, 1), JAM,                un(Rla, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(And, ZPX, 4, 0), op(Rol, ZPX, 6, 0), un(Rla, ZPX, 6, 0),
    op(Sec, IMP, 2, 0), op(And, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Rla, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(And, ABX, 4, 1), op(Rol, ABX, 6, 1), un(Rla, ABX, 6, 1),
    // 0x40
    op(Rti, IMP, 6, 0), op(Eor, IZX, 6, 0), JAM,                un(Sre, IZX, 8, 0),
    un(Nop, ZP, 3, 0),  op(Eor, ZP, 3, 0),  op(Lsr, ZP, 5, 0),  un(Sre, ZP, 5, 0),
    op(Pha, IMP, 3, 0), op(Eor, IMM, 2, 0), op(Lsr, ACC, 2, 0), un(Alr, IMM, 2, 0),
    op(Jmp, ABS, 3, 0), op(Eor, ABS, 4, 0), op(Lsr, ABS, 6, 0), un(Sre, ABS, 6, 0),
    // 0x50
    op(Bvc, REL, 2, 1), op(Eor, IZY, 5, 1), JAM,                un(Sre, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(Eor, ZPX, 4, 0), op(Lsr, ZPX, 6, 0), un(Sre, ZPX, 6, 0),
    op(Cli, IMP, 2, 0), op(Eor, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Sre, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(Eor, ABX, 4, 1), op(Lsr, ABX, 6, 1), un(Sre, ABX, 6, 1),
    // 0x60
    op(Rts, IMP, 6, 0), op(Adc, IZX, 6, 0), JAM,                un(Rra, IZX, 8, 0),
    un(Nop, ZP, 3, 0),  op(Adc, ZP, 3, 0),  op(Ror, ZP, 5, 0),  un(Rra, ZP, 5, 0),
    op(Pla, IMP, 4, 0), op(Adc, IMM, 2, 0), op(Ror, ACC, 2, 0), un(Arr, IMM, 2, 0),
    op(Jmp, IND, 5, 0), op(Adc, ABS, 4, 0), op(Ror, ABS, 6, 0), un(Rra, ABS, 6, 0),
    // 0x70
    op(Bvs, REL, 2, 1), op(Adc, IZY, 5, 1), JAM,                un(Rra, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(Adc, ZPX, 4, 0), op(Ror, ZPX, 6, 0), un(Rra, ZPX, 6, 0),
    op(Sei, IMP, 2, 0), op(Adc, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Rra, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(Adc, ABX, 4, 1), op(Ror, ABX, 6, 1), un(Rra, ABX, 6, 1),
    // 0x80
    un(Nop, IMM, 2, 0), op(Sta, IZX, 6, 0), un(Nop, IMM, 2, 0), un(Sax, IZX, 6, 0),
    op(Sty, ZP, 3, 0),  op(Sta, ZP, 3, 0),  op(Stx, ZP, 3, 0),  un(Sax, ZP, 3, 0),
    op(Dey, IMP, 2, 0), un(Nop, IMM, 2, 0), op(Txa, IMP, 2, 0), bad("XAA", IMM),
    op(Sty, ABS, 4, 0), op(Sta, ABS, 4, 0), op(Stx, ABS, 4, 0), un(Sax, ABS, 4, 0),
    // 0x90
    op(Bcc, REL, 2, 1), op(Sta, IZY, 5, 1), JAM,                bad("AHX", IZY),
    op(Sty, ZPX, 4, 0), op(Sta, ZPX, 4, 0), op(Stx, ZPY, 4, 0), un(Sax, ZPY, 4, 0),
    op(Tya, IMP, 2, 0), op(Sta, ABY, 4, 1), op(Txs, IMP, 2, 0), bad("TAS", ABY),
    bad("SHY", ABX),    op(Sta, ABX, 4, 1), bad("SHX", ABY),    bad("AHX", ABY),
    // 0xA0
    op(Ldy, IMM, 2, 0), op(Lda, IZX, 6, 0), op(Ldx, IMM, 2, 0), un(Lax, IZX, 6, 0),
    op(Ldy, ZP, 3, 0),  op(Lda, ZP, 3, 0),  op(Ldx, ZP, 3, 0),  un(Lax, ZP, 3, 0),
    op(Tay, IMP, 2, 0), op(Lda, IMM, 2, 0), op(Tax, IMP, 2, 0), bad("LAX", IMM),
    op(Ldy, ABS, 4, 0), op(Lda, ABS, 4, 0), op(Ldx, ABS, 4, 0), un(Lax, ABS, 4, 0),
    // 0xB0
    op(Bcs, REL, 2, 1), op(Lda, IZY, 5, 1), JAM,                un(Lax, IZY, 5, 1),
    op(Ldy, ZPX, 4, 0), op(Lda, ZPX, 4, 0), op(Ldx, ZPY, 4, 0), un(Lax, ZPY, 4, 0),
    op(Clv, IMP, 2, 0), op(Lda, ABY, 4, 1), op(Tsx, IMP, 2, 0), bad("LAS", ABY),
    op(Ldy, ABX, 4, 1), op(Lda, ABX, 4, 1), op(Ldx, ABY, 4, 1), un(Lax, ABY, 4, 1),
    // 0xC0
    op(Cpy, IMM, 2, 0), op(Cmp, IZX, 6, 0), un(Nop, IMM, 2, 0), un(Dcp, IZX, 8, 0),
    op(Cpy, ZP, 3, 0),  op(Cmp, ZP, 3, 0),  op(Dec, ZP, 5, 0),  un(Dcp, ZP, 5, 0),
    op(Iny, IMP, 2, 0), op(Cmp, IMM, 2, 0), op(Dex, IMP, 2, 0), un(Axs, IMM, 2, 0),
    op(Cpy, ABS, 4, 0), op(Cmp, ABS, 4, 0), op(Dec, ABS, 6, 0), un(Dcp, ABS, 6, 0),
    // 0xD0
    op(Bne, REL, 2, 1), op(Cmp, IZY, 5, 1), JAM,                un(Dcp, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(Cmp, ZPX, 4, 0), op(Dec, ZPX, 6, 0), un(Dcp, ZPX, 6, 0),
    op(Cld, IMP, 2, 0), op(Cmp, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Dcp, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(Cmp, ABX, 4, 1), op(Dec, ABX, 6, 1), un(Dcp, ABX, 6, 1),
    // 0xE0
    op(Cpx, IMM, 2, 0), op(Sbc, IZX, 6, 0), un(Nop, IMM, 2, 0), un(Isb, IZX, 8, 0),
    op(Cpx, ZP, 3, 0),  op(Sbc, ZP, 3, 0),  op(Inc, ZP, 5, 0),  un(Isb, ZP, 5, 0),
    op(Inx, IMP, 2, 0), op(Sbc, IMM, 2, 0), op(Nop, IMP, 2, 0), un(Sbc, IMM, 2, 0),
    op(Cpx, ABS, 4, 0), op(Sbc, ABS, 4, 0), op(Inc, ABS, 6, 0), un(Isb, ABS, 6, 0),
    // 0xF0
    op(Beq, REL, 2, 1), op(Sbc, IZY, 5, 1), JAM,                un(Isb, IZY, 7, 1),
    un(Nop, ZPX, 4, 0), op(Sbc, ZPX, 4, 0), op(Inc, ZPX, 6, 0), un(Isb, ZPX, 6, 0),
    op(Sed, IMP, 2, 0), op(Sbc, ABY, 4, 1), un(Nop, IMP, 2, 0), un(Isb, ABY, 6, 1),
    un(Nop, ABX, 4, 1), op(Sbc, ABX, 4, 1), op(Inc, ABX, 6, 1), un(Isb, ABX, 6, 1),
];

/// Look up the descriptor for `opcode`.
#[inline]
pub fn descriptor(opcode: u8) -> &'static Descriptor {
    &OPCODES[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Total cycles for the common no-crossing case, as listed in hardware references.
    fn cost(opcode: u8) -> u64 {
        descriptor(opcode).cycles_for(false)
    }

    #[test]
    fn lengths_match_addressing_modes() {
        for (opcode, d) in OPCODES.iter().enumerate() {
            if opcode == 0x00 {
                assert_eq!(d.length, 2, "BRK carries a signature byte");
                continue;
            }
            assert_eq!(d.length, d.mode.length(), "opcode {:02X}", opcode);
            assert!((1..=3).contains(&d.length));
        }
    }

    #[test]
    fn illegal_slots_fault() {
        let illegal: Vec<u8> = (0..=255u8).filter(|&o| descriptor(o).is_illegal()).collect();
        assert_eq!(
            illegal,
            vec![
                0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x8B, 0x92, 0x93, 0x9B, 0x9C,
                0x9E, 0x9F, 0xAB, 0xB2, 0xBB, 0xD2, 0xF2
            ]
        );
        for &o in &illegal {
            assert_eq!(descriptor(o).cycles, 0);
        }
    }

    #[test]
    fn documented_opcode_count() {
        let documented = OPCODES.iter().filter(|d| !d.undocumented).count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn page_cross_only_on_indexed_and_branch_modes() {
        for (opcode, d) in OPCODES.iter().enumerate() {
            if d.page_cross_cycles > 0 {
                assert!(
                    matches!(
                        d.mode,
                        M::AbsoluteX | M::AbsoluteY | M::IndirectIndexed | M::Relative
                    ),
                    "opcode {:02X}",
                    opcode
                );
            }
        }
    }

    #[test]
    fn write_forms_always_pay_page_cross() {
        // STA abs,X / abs,Y / (zp),Y
        assert_eq!(cost(0x9D), 5);
        assert_eq!(cost(0x99), 5);
        assert_eq!(cost(0x91), 6);
        // read forms only pay on a crossing
        assert_eq!(cost(0xBD), 4);
        assert_eq!(descriptor(0xBD).cycles_for(true), 5);
        assert_eq!(cost(0xB1), 5);
        assert_eq!(descriptor(0xB1).cycles_for(true), 6);
    }

    #[test]
    fn branches_cost_base_before_execution() {
        for opcode in [0x10u8, 0x30, 0x50, 0x70, 0x90, 0xB0, 0xD0, 0xF0] {
            let d = descriptor(opcode);
            assert_eq!(d.mode, M::Relative);
            assert_eq!(d.cycles_for(false), 2);
            assert_eq!(d.cycles_for(true), 2, "opcode {:02X}", opcode);
        }
    }

    #[test]
    fn read_modify_write_costs() {
        assert_eq!(cost(0x1E), 7); // ASL abs,X
        assert_eq!(descriptor(0x1E).cycles_for(true), 7);
        assert_eq!(cost(0xFE), 7); // INC abs,X
        assert_eq!(cost(0xDB), 7); // DCP abs,Y
        assert_eq!(cost(0xD3), 8); // DCP (zp),Y
        assert_eq!(cost(0xC3), 8); // DCP (zp,X)
    }

    #[test]
    fn mnemonics() {
        assert_eq!(descriptor(0xA9).mnemonic, "LDA");
        assert_eq!(descriptor(0x6C).mnemonic, "JMP");
        assert_eq!(descriptor(0x6C).mode, M::Indirect);
        assert_eq!(descriptor(0xEB).mnemonic, "SBC");
        assert!(descriptor(0xEB).undocumented);
        assert!(!descriptor(0xE9).undocumented);
        assert_eq!(descriptor(0x02).mnemonic, "JAM");
        assert_eq!(descriptor(0x9C).mnemonic, "SHY");
    }
}
