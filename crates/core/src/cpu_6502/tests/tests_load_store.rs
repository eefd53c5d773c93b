//! Loads, stores, register transfers and operand addressing

use super::{cpu_with, step};
use crate::cpu_6502::{FLAG_N, FLAG_Z};
use crate::memory::Memory6502;

#[test]
fn lda_immediate_sets_a_and_flags() {
    let mut cpu = cpu_with(&[0xA9, 0x05, 0xEA]);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.a(), 5);
    assert!(!cpu.flag(FLAG_Z));
    assert!(!cpu.flag(FLAG_N));
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.pc(), 0x8003);
}

#[test]
fn lda_zero_and_negative_flags() {
    let mut cpu = cpu_with(&[0xA9, 0x00, 0xA9, 0x80]);
    step(&mut cpu);
    assert!(cpu.flag(FLAG_Z));
    assert!(!cpu.flag(FLAG_N));
    step(&mut cpu);
    assert!(!cpu.flag(FLAG_Z));
    assert!(cpu.flag(FLAG_N));
}

#[test]
fn lda_zero_page_and_sta_zero_page() {
    // LDA #$42 ; STA $10
    let mut cpu = cpu_with(&[0xA9, 0x42, 0x85, 0x10]);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(step(&mut cpu), 3);
    assert_eq!(cpu.memory.read(0x0010), 0x42);
}

#[test]
fn ldx_zero_page_y_wraps() {
    // LDX $F0,Y with Y=$20 reads $0010
    let mut cpu = cpu_with(&[0xB6, 0xF0]);
    cpu.memory.write(0x0010, 0x99);
    cpu.memory.write(0x0110, 0x11);
    cpu.set_y(0x20);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.x(), 0x99);
}

#[test]
fn ldy_absolute_x() {
    let mut cpu = cpu_with(&[0xBC, 0x00, 0x20]);
    cpu.memory.write(0x2005, 0x7E);
    cpu.set_x(5);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.y(), 0x7E);
}

#[test]
fn lda_indexed_indirect() {
    // LDA ($20,X) with X=4 -> pointer at $24
    let mut cpu = cpu_with(&[0xA1, 0x20]);
    cpu.memory.write(0x0024, 0x00);
    cpu.memory.write(0x0025, 0x30);
    cpu.memory.write(0x3000, 0x5A);
    cpu.set_x(4);
    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.a(), 0x5A);
}

#[test]
fn lda_indirect_indexed_page_cross() {
    // LDA ($40),Y; pointer $20FF + 1 crosses into $2100
    let mut cpu = cpu_with(&[0xB1, 0x40, 0xB1, 0x40]);
    cpu.memory.write(0x0040, 0xFF);
    cpu.memory.write(0x0041, 0x20);
    cpu.memory.write(0x2100, 0x33);
    cpu.memory.write(0x20FF, 0x44);
    cpu.set_y(1);
    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.a(), 0x33);
    cpu.set_y(0);
    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.a(), 0x44);
}

#[test]
fn stores_do_not_touch_flags() {
    // STA $0200 ; STX $10 ; STY $11
    let mut cpu = cpu_with(&[0x8D, 0x00, 0x02, 0x86, 0x10, 0x84, 0x11]);
    cpu.set_a(0x00);
    cpu.set_x(0x80);
    cpu.set_y(0x7F);
    let before = cpu.status();
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(step(&mut cpu), 3);
    assert_eq!(step(&mut cpu), 3);
    assert_eq!(cpu.status(), before);
    assert_eq!(cpu.memory.read(0x0200), 0x00);
    assert_eq!(cpu.memory.read(0x0010), 0x80);
    assert_eq!(cpu.memory.read(0x0011), 0x7F);
}

#[test]
fn register_transfers_set_flags() {
    // TAX ; TAY ; LDA #0 ; TXA ; TYA
    let mut cpu = cpu_with(&[0xAA, 0xA8, 0xA9, 0x00, 0x8A, 0x98]);
    cpu.set_a(0x81);
    step(&mut cpu);
    assert_eq!(cpu.x(), 0x81);
    assert!(cpu.flag(FLAG_N));
    step(&mut cpu);
    assert_eq!(cpu.y(), 0x81);
    step(&mut cpu);
    assert!(cpu.flag(FLAG_Z));
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x81);
    assert!(!cpu.flag(FLAG_Z));
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x81);
}

#[test]
fn tsx_sets_flags_but_txs_does_not() {
    // TSX ; TXS
    let mut cpu = cpu_with(&[0xBA, 0x9A]);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.x(), 0xFD);
    assert!(cpu.flag(FLAG_N));

    cpu.set_x(0x00);
    let before = cpu.status();
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.sp(), 0x00);
    assert_eq!(cpu.status(), before);
}
