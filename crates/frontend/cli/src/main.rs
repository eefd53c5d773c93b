mod runner;
mod trace;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emu_6502::logging::{self, LogConfig};
use emu_6502::{Cpu6502, FlatMemory};

use runner::{RunOptions, StopReason};

/// Run a raw 6502 binary image on the emulated core.
#[derive(Parser)]
#[command(name = "emu6502")]
struct Args {
    /// Raw binary image to load
    image: PathBuf,

    /// Address the image is loaded at (hex)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0000")]
    load_addr: u16,

    /// Override the reset vector with this entry point (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    entry: Option<u16>,

    /// Maximum number of instructions to execute
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// Stop when PC reaches this address (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    stop_at: Option<u16>,

    /// Raise IRQ every N cycles
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    irq_every: Option<u64>,

    /// Raise NMI every N cycles
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    nmi_every: Option<u64>,

    /// Print a nestest-style trace line per instruction to stdout
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Core log spec, e.g. "debug" or "cpu=trace,interrupts=debug"
    #[arg(long)]
    log: Option<String>,

    /// Send core log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Dump CPU save-state to this file as JSON
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Parse a 16-bit hex value with an optional `$` or `0x` prefix.
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || digits.len() > 4 {
        return Err(format!("expected 1-4 hex digits, got {:?}", s));
    }
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex {:?}: {}", s, e))
}

fn configure_core_logging(args: &Args) -> Result<()> {
    logging::init_from_env().context("invalid EMU6502_LOG / EMU6502_LOG_FILE")?;
    let config = LogConfig::global();
    if let Some(spec) = args.log.as_deref() {
        config
            .apply_spec(spec)
            .with_context(|| format!("invalid --log spec {:?}", spec))?;
    }
    if let Some(path) = args.log_file.as_deref() {
        config
            .set_log_file(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    configure_core_logging(&args)?;

    let image =
        fs::read(&args.image).with_context(|| format!("reading {}", args.image.display()))?;
    let mut mem = FlatMemory::new();
    let loaded = mem.load(args.load_addr, &image);
    if loaded < image.len() {
        log::warn!(
            "image truncated: {} of {} bytes fit at ${:04X}",
            loaded,
            image.len(),
            args.load_addr
        );
    }
    if let Some(entry) = args.entry {
        mem.set_reset_vector(entry);
    }

    let mut cpu = Cpu6502::new(mem);
    cpu.reset();
    log::info!("reset to ${:04X}", cpu.pc());

    if args.trace {
        let mut out = BufWriter::new(io::stdout());
        cpu.set_hook_fn(move |desc, ins, regs, _mem, cycles| {
            // a closed stdout only loses the trace
            let _ = writeln!(out, "{}", trace::format_line(desc, ins, regs, cycles));
        });
    }

    let opts = RunOptions {
        max_steps: args.max_steps,
        stop_at: args.stop_at,
        irq_every: args.irq_every,
        nmi_every: args.nmi_every,
    };
    let summary = runner::run(&mut cpu, &opts);
    // dropping the hook flushes the trace
    cpu.clear_hook();

    eprintln!(
        "{} after {} steps, {} cycles (PC=${:04X} A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X})",
        summary.reason,
        summary.steps,
        summary.cycles,
        cpu.pc(),
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.sp(),
        cpu.status()
    );

    if let Some(path) = args.save.as_ref() {
        let state = cpu.save_state();
        let mut f =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
    }

    LogConfig::global().clear_log_file();

    if let StopReason::Fault(e) = summary.reason {
        return Err(e.into());
    }
    Ok(())
}
