use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_6502::cpu_6502::Cpu6502;
use emu_6502::memory::{FlatMemory, Memory6502};

/// Bare RAM bus so the numbers measure the core, not the memory model
struct BenchMemory {
    ram: Vec<u8>,
}

impl BenchMemory {
    fn new() -> Self {
        let mut ram = vec![0; 0x10000];

        // Reset vector -> $8000
        ram[0xFFFC] = 0x00;
        ram[0xFFFD] = 0x80;

        #[rustfmt::skip]
        let program = [
            0xA9, 0x42,       // LDA #$42
            0x8D, 0x00, 0x20, // STA $2000
            0xA2, 0x10,       // LDX #$10
            0xA0, 0x20,       // LDY #$20
            0xE8,             // INX
            0xC8,             // INY
            0xCA,             // DEX
            0x88,             // DEY
            0x69, 0x01,       // ADC #$01
            0x4C, 0x00, 0x80, // JMP $8000
        ];
        ram[0x8000..0x8000 + program.len()].copy_from_slice(&program);

        Self { ram }
    }
}

impl Memory6502 for BenchMemory {
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_step");

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(BenchMemory::new());
            cpu.reset();
            let _ = black_box(cpu.step());
            black_box(cpu.a());
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = Cpu6502::new(BenchMemory::new());
                    cpu.reset();
                    for _ in 0..count {
                        let _ = cpu.step();
                    }
                    black_box(cpu.cycles());
                });
            },
        );
    }

    group.finish();
}

fn bench_cpu_hooked(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_hook");

    // Cost of tracing through the hook, against the same loop without one
    group.bench_function("1000_steps_with_hook", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(BenchMemory::new());
            cpu.reset();
            let mut seen = 0u64;
            cpu.set_hook_fn(move |_desc, ins, _regs, _mem, _cycles| {
                seen = seen.wrapping_add(ins.pc as u64);
                black_box(seen);
            });
            for _ in 0..1000 {
                let _ = cpu.step();
            }
            black_box(cpu.cycles());
        });
    });

    group.finish();
}

fn bench_flat_memory(c: &mut Criterion) {
    c.bench_function("cpu_6502_flat_memory_1000_steps", |b| {
        let mut mem = FlatMemory::new();
        mem.load_program(0x8000, &[0xE8, 0xC8, 0x4C, 0x00, 0x80]);
        let mut cpu = Cpu6502::new(mem);
        b.iter(|| {
            cpu.reset();
            for _ in 0..1000 {
                let _ = cpu.step();
            }
            black_box(cpu.x());
        });
    });
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_6502_reset", |b| {
        let mut cpu = Cpu6502::new(BenchMemory::new());
        b.iter(|| {
            cpu.reset();
            black_box(cpu.pc());
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_cpu_hooked,
    bench_flat_memory,
    bench_cpu_reset
);
criterion_main!(benches);
