//! nestest-style execution trace lines.

use std::fmt::Write;

use emu_6502::cpu_6502::{DecodedInstruction, Descriptor, Registers};

/// Format one instruction as it is about to execute:
///
/// `PPPP  OP B1 B2 *MNE    A:xx X:xx Y:xx P:xx SP:xx CYC:n`
///
/// Undocumented opcodes are marked with `*`. Registers and cycles are the
/// values before the instruction runs.
pub fn format_line(
    desc: &Descriptor,
    ins: &DecodedInstruction,
    regs: &Registers,
    cycles: u64,
) -> String {
    let mut bytes = format!("{:02X}", ins.opcode);
    for b in ins
        .operands
        .iter()
        .take(desc.length.saturating_sub(1) as usize)
    {
        let _ = write!(bytes, " {:02X}", b);
    }
    let marker = if desc.undocumented { '*' } else { ' ' };
    format!(
        "{:04X}  {:<8} {}{:<3}    A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        ins.pc,
        bytes,
        marker,
        desc.mnemonic,
        regs.a,
        regs.x,
        regs.y,
        regs.status,
        regs.sp,
        cycles
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_6502::cpu_6502::descriptor;

    fn ins(pc: u16, opcode: u8, operands: [u8; 2]) -> DecodedInstruction {
        DecodedInstruction {
            pc,
            opcode,
            operands,
            address: 0,
            page_crossed: false,
        }
    }

    #[test]
    fn documented_two_byte() {
        let line = format_line(
            descriptor(0xA9),
            &ins(0x8000, 0xA9, [0x05, 0x00]),
            &Registers::power_on(),
            7,
        );
        assert_eq!(
            line,
            "8000  A9 05     LDA    A:00 X:00 Y:00 P:24 SP:FD CYC:7"
        );
    }

    #[test]
    fn three_byte_instruction() {
        let line = format_line(
            descriptor(0x4C),
            &ins(0xC000, 0x4C, [0xF5, 0xC5]),
            &Registers::power_on(),
            7,
        );
        assert!(line.starts_with("C000  4C F5 C5  JMP    A:00"), "{}", line);
    }

    #[test]
    fn undocumented_marked_and_unused_bytes_hidden() {
        let regs = Registers {
            a: 0x12,
            x: 0x34,
            y: 0x56,
            sp: 0xFB,
            status: 0xE5,
            pc: 0x0400,
        };
        let line = format_line(descriptor(0x04), &ins(0x0400, 0x04, [0x12, 0x99]), &regs, 1234);
        assert_eq!(
            line,
            "0400  04 12    *NOP    A:12 X:34 Y:56 P:E5 SP:FB CYC:1234"
        );

        let line = format_line(descriptor(0xEA), &ins(0x0400, 0xEA, [0x99, 0x99]), &regs, 0);
        assert!(line.starts_with("0400  EA        NOP"), "{}", line);
    }
}
