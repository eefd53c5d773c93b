//! MOS 6502 instruction core.
//!
//! The crate provides a table-driven 6502 (`cpu_6502::Cpu6502`) that runs
//! against any bus implementing `memory::Memory6502`, plus the logging
//! facility shared by the core and its frontends.

pub mod cpu_6502;
pub mod logging;
pub mod memory;

pub use cpu_6502::Cpu6502;
pub use memory::{FlatMemory, Memory6502};

/// A CPU-like component that can be stepped; `step` returns cycles consumed.
pub trait Cpu {
    fn reset(&mut self);
    fn step(&mut self) -> Result<u32, CpuError>;
    /// Returns false when the interrupt is masked or the CPU is jammed.
    fn trigger_irq(&mut self) -> bool;
    fn trigger_nmi(&mut self);
    fn cycles(&self) -> u64;
    fn pc(&self) -> u16;
}

#[derive(Debug, thiserror::Error)]
pub enum CpuError {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[error("CPU jammed by opcode ${opcode:02X} at ${pc:04X}; reset required")]
    Jammed { opcode: u8, pc: u16 },
    #[error("invalid save state: {0}")]
    State(#[from] serde_json::Error),
    #[error("unsupported save state version {0}")]
    UnsupportedStateVersion(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Steps until the CPU reaches `target` or the budget runs out.
    fn run_until<C: Cpu>(cpu: &mut C, target: u16, budget: usize) -> Result<usize, CpuError> {
        for n in 0..budget {
            if cpu.pc() == target {
                return Ok(n);
            }
            cpu.step()?;
        }
        Ok(budget)
    }

    #[test]
    fn cpu_trait_drives_6502() {
        let mut mem = FlatMemory::new();
        // LDX #$03; DEX; BNE -3; NOP
        mem.load_program(0x0600, &[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0xEA]);
        let mut cpu = Cpu6502::new(mem);
        Cpu::reset(&mut cpu);
        assert_eq!(Cpu::pc(&cpu), 0x0600);
        assert_eq!(Cpu::cycles(&cpu), 7);

        let steps = run_until(&mut cpu, 0x0605, 100).expect("runs");
        assert_eq!(steps, 1 + 3 * 2);
        assert_eq!(cpu.x(), 0);
        // 7 reset + LDX 2 + 3*DEX 2 + 2 taken BNE 3 + final BNE 2
        assert_eq!(Cpu::cycles(&cpu), 7 + 2 + 6 + 6 + 2);
    }

    #[test]
    fn error_messages() {
        let e = CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0x8000,
        };
        assert_eq!(e.to_string(), "illegal opcode $02 at $8000");
        assert_eq!(
            CpuError::UnsupportedStateVersion(9).to_string(),
            "unsupported save state version 9"
        );
    }

    #[test]
    fn state_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: CpuError = err.into();
        assert!(matches!(e, CpuError::State(_)));
    }
}
