//! Emulation loop around any `Cpu`: step budget, stop address, trap
//! detection and periodic interrupt lines.

use std::fmt;

use emu_6502::{Cpu, CpuError};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_steps: u64,
    pub stop_at: Option<u16>,
    /// Assert IRQ every N cycles; stays pending while masked
    pub irq_every: Option<u64>,
    /// Pulse NMI every N cycles
    pub nmi_every: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            stop_at: None,
            irq_every: None,
            nmi_every: None,
        }
    }
}

#[derive(Debug)]
pub enum StopReason {
    /// PC reached `--stop-at`
    StopAddress(u16),
    /// An instruction jumped or branched to itself
    Trap(u16),
    StepLimit,
    Fault(CpuError),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopAddress(pc) => write!(f, "reached stop address ${:04X}", pc),
            StopReason::Trap(pc) => write!(f, "trapped at ${:04X}", pc),
            StopReason::StepLimit => write!(f, "step limit reached"),
            StopReason::Fault(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub reason: StopReason,
    pub steps: u64,
    /// Cycles spent in this run, not since power-up
    pub cycles: u64,
}

/// Cycle-driven interrupt source.
struct Periodic {
    every: u64,
    next: u64,
    pending: bool,
}

impl Periodic {
    fn new(every: u64, now: u64) -> Self {
        let every = every.max(1);
        Self {
            every,
            next: now + every,
            pending: false,
        }
    }

    fn poll(&mut self, now: u64) {
        while now >= self.next {
            self.pending = true;
            self.next += self.every;
        }
    }
}

/// Run until a stop condition is met.
///
/// Trap detection is disabled while an interrupt source is configured, since
/// `JMP *` is then a legitimate wait loop.
pub fn run<C: Cpu>(cpu: &mut C, opts: &RunOptions) -> RunSummary {
    let start = cpu.cycles();
    let mut irq = opts.irq_every.map(|n| Periodic::new(n, start));
    let mut nmi = opts.nmi_every.map(|n| Periodic::new(n, start));
    let detect_traps = irq.is_none() && nmi.is_none();
    let mut steps = 0u64;

    let reason = loop {
        let pc = cpu.pc();
        if opts.stop_at == Some(pc) {
            break StopReason::StopAddress(pc);
        }
        if steps >= opts.max_steps {
            break StopReason::StepLimit;
        }
        if let Err(e) = cpu.step() {
            break StopReason::Fault(e);
        }
        steps += 1;
        if detect_traps && cpu.pc() == pc {
            break StopReason::Trap(pc);
        }

        let now = cpu.cycles();
        if let Some(line) = nmi.as_mut() {
            line.poll(now);
            if line.pending {
                log::debug!("NMI at cycle {}", now);
                cpu.trigger_nmi();
                line.pending = false;
            }
        }
        if let Some(line) = irq.as_mut() {
            line.poll(now);
            if line.pending && cpu.trigger_irq() {
                log::debug!("IRQ at cycle {}", now);
                line.pending = false;
            }
        }
    };

    RunSummary {
        reason,
        steps,
        cycles: cpu.cycles() - start,
    }
}
