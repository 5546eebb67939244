//! Unit tests for individual Z80 instructions.
//!
//! Each test assembles a few bytes into a `SimpleBus`, runs them and checks
//! registers, memory and the T-states reported by `step()`.

use emu_core::{Cpu, SimpleBus};
use zilog_z80::{CF, HF, NF, PF, SF, XF, YF, Z80, ZF};

/// Run CPU until it HALTs, return instruction count.
fn run_until_halt(cpu: &mut Z80, bus: &mut SimpleBus) -> u64 {
    let mut count = 0;
    while !cpu.is_halted() && count < 10_000 {
        cpu.step(bus);
        count += 1;
    }
    count
}

fn setup(program: &[u8]) -> (Z80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, program);
    let mut cpu = Z80::new();
    cpu.set_sp(0x8000);
    (cpu, bus)
}

#[test]
fn test_nop() {
    let (mut cpu, mut bus) = setup(&[0x00, 0x76]); // NOP; HALT
    assert_eq!(cpu.step(&mut bus), 4);
    run_until_halt(&mut cpu, &mut bus);
    // PC stays on the HALT opcode
    assert_eq!(cpu.pc(), 0x0001);
}

#[test]
fn test_ld_a_n() {
    let (mut cpu, mut bus) = setup(&[0x3E, 0x42, 0x76]); // LD A,42h; HALT
    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.a(), 0x42);
}

#[test]
fn test_ld_bc_nn() {
    let (mut cpu, mut bus) = setup(&[0x01, 0x34, 0x12, 0x76]); // LD BC,1234h
    assert_eq!(cpu.step(&mut bus), 10);
    assert_eq!(cpu.bc(), 0x1234);
    assert_eq!(cpu.regs().b(), 0x12);
    assert_eq!(cpu.regs().c(), 0x34);
}

#[test]
fn test_halt_reexecutes() {
    let (mut cpu, mut bus) = setup(&[0x76]);
    for expected_r in 1..=3 {
        assert_eq!(cpu.step(&mut bus), 4);
        assert!(cpu.is_halted());
        assert_eq!(cpu.pc(), 0x0000);
        assert_eq!(cpu.r(), expected_r);
    }
}

#[test]
fn test_ldir_copies_three_bytes() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x00, 0x50, // LD HL,5000h
        0x11, 0x00, 0x60, // LD DE,6000h
        0x01, 0x03, 0x00, // LD BC,3
        0xED, 0xB0, // LDIR
        0x76, // HALT
    ]);
    bus.load(0x5000, &[0x01, 0x02, 0x03, 0x04]);

    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    let mut timings = Vec::new();
    let mut counts = Vec::new();
    while cpu.pc() == 0x0009 {
        timings.push(cpu.step(&mut bus));
        counts.push(cpu.bc());
    }

    assert_eq!(timings, vec![21, 21, 16]);
    assert_eq!(counts, vec![2, 1, 0]);
    assert_eq!(cpu.pc(), 0x000B);
    assert_eq!(bus.peek(0x6000), 0x01);
    assert_eq!(bus.peek(0x6001), 0x02);
    assert_eq!(bus.peek(0x6002), 0x03);
    assert_eq!(bus.peek(0x6003), 0x00);
    assert_eq!(cpu.hl(), 0x5003);
    assert_eq!(cpu.de(), 0x6003);
    assert_eq!(cpu.f() & PF, 0);
}

#[test]
fn test_lddr_runs_backwards() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x01, 0x50, // LD HL,5001h
        0x11, 0x01, 0x60, // LD DE,6001h
        0x01, 0x02, 0x00, // LD BC,2
        0xED, 0xB8, // LDDR
        0x76,
    ]);
    bus.load(0x5000, &[0xAA, 0xBB]);
    run_until_halt(&mut cpu, &mut bus);

    assert_eq!(bus.peek(0x6000), 0xAA);
    assert_eq!(bus.peek(0x6001), 0xBB);
    assert_eq!(cpu.hl(), 0x4FFF);
    assert_eq!(cpu.bc(), 0);
}

#[test]
fn test_cpir_stops_on_match() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x00, 0x50, // LD HL,5000h
        0x01, 0x10, 0x00, // LD BC,10h
        0x3E, 0x33, // LD A,33h
        0xED, 0xB1, // CPIR
        0x76,
    ]);
    bus.load(0x5000, &[0x11, 0x22, 0x33, 0x44]);
    run_until_halt(&mut cpu, &mut bus);

    assert_eq!(cpu.hl(), 0x5003);
    assert_eq!(cpu.bc(), 0x000D);
    assert_eq!(cpu.f() & (ZF | PF | NF), ZF | PF | NF);
}

#[test]
fn test_djnz_loop() {
    // LD B,5; loop: INC A; DJNZ loop; HALT
    let (mut cpu, mut bus) = setup(&[0x06, 0x05, 0x3C, 0x10, 0xFD, 0x76]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 13);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 5);
    assert_eq!(cpu.regs().b(), 0);
}

#[test]
fn test_jr_timings() {
    // JR +0; JR NZ,+0 with Z set
    let (mut cpu, mut bus) = setup(&[0x18, 0x00, 0x20, 0x00]);
    cpu.regs_mut().set_f(ZF);
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.pc(), 0x0004);
}

#[test]
fn test_call_and_ret() {
    let (mut cpu, mut bus) = setup(&[
        0xCD, 0x10, 0x00, // CALL 0010h
        0x76,
    ]);
    bus.load(0x0010, &[0x3E, 0x42, 0xC9]); // LD A,42h; RET

    assert_eq!(cpu.step(&mut bus), 17);
    assert_eq!(cpu.pc(), 0x0010);
    assert_eq!(cpu.sp(), 0x7FFE);
    assert_eq!(bus.peek(0x7FFE), 0x03);

    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 0x42);
    assert_eq!(cpu.sp(), 0x8000);
    assert_eq!(cpu.pc(), 0x0003);
}

#[test]
fn test_rst_timing() {
    let (mut cpu, mut bus) = setup(&[0xFF]); // RST 38h
    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(cpu.pc(), 0x0038);
}

#[test]
fn test_push_pop() {
    let (mut cpu, mut bus) = setup(&[
        0x01, 0x34, 0x12, // LD BC,1234h
        0xC5, // PUSH BC
        0xD1, // POP DE
    ]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(cpu.step(&mut bus), 10);
    assert_eq!(cpu.de(), 0x1234);
    assert_eq!(cpu.sp(), 0x8000);
}

#[test]
fn test_ex_sp_hl() {
    let (mut cpu, mut bus) = setup(&[0x21, 0x34, 0x12, 0xE3]); // LD HL,1234h; EX (SP),HL
    bus.load(0x8000, &[0x78, 0x56]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.hl(), 0x5678);
    assert_eq!(bus.peek(0x8000), 0x34);
    assert_eq!(bus.peek(0x8001), 0x12);
}

#[test]
fn test_exchanges() {
    let (mut cpu, mut bus) = setup(&[0x08, 0xD9, 0xEB]); // EX AF,AF'; EXX; EX DE,HL
    cpu.regs_mut().af.set(0x1122);
    cpu.regs_mut().af_alt = 0x3344;
    cpu.regs_mut().bc.set(0x5566);
    cpu.regs_mut().hl.set(0x7788);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs().af.get(), 0x3344);

    cpu.step(&mut bus);
    assert_eq!(cpu.bc(), 0x0000);
    assert_eq!(cpu.regs().bc_alt, 0x5566);

    cpu.regs_mut().de.set(0xABCD);
    cpu.step(&mut bus);
    assert_eq!(cpu.hl(), 0xABCD);
    assert_eq!(cpu.de(), 0x0000);
}

#[test]
fn test_inc_dec_pair_wrap() {
    let (mut cpu, mut bus) = setup(&[
        0x01, 0xFF, 0xFF, // LD BC,FFFFh
        0x03, // INC BC
        0x0B, // DEC BC
    ]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.bc(), 0x0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.bc(), 0xFFFF);
}

#[test]
fn test_add_then_sub_restores_accumulator() {
    let grid = [0u8, 1, 127, 128, 255];
    for &a in &grid {
        for &v in &grid {
            // LD A,a; ADD A,v; SUB v; HALT
            let (mut cpu, mut bus) = setup(&[0x3E, a, 0xC6, v, 0xD6, v, 0x76]);
            run_until_halt(&mut cpu, &mut bus);
            assert_eq!(cpu.a(), a, "ADD/SUB {a:#04X},{v:#04X}");
        }
    }
}

#[test]
fn test_alu_register_forms() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x0F, // LD A,0Fh
        0x06, 0x01, // LD B,1
        0x80, // ADD A,B
        0xA0, // AND B
        0xB8, // CP B
    ]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.a(), 0x10);
    assert_eq!(cpu.f() & HF, HF);

    cpu.step(&mut bus);
    assert_eq!(cpu.a(), 0x00);
    assert_eq!(cpu.f() & (ZF | HF), ZF | HF);

    cpu.step(&mut bus);
    assert_eq!(cpu.f() & (CF | NF | SF), CF | NF | SF);
}

#[test]
fn test_sbc_hl() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x00, 0x10, // LD HL,1000h
        0x11, 0x01, 0x00, // LD DE,1
        0x37, // SCF
        0xED, 0x52, // SBC HL,DE
    ]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(cpu.hl(), 0x0FFE);
    assert_eq!(cpu.f() & (NF | CF), NF);
}

#[test]
fn test_neg() {
    let (mut cpu, mut bus) = setup(&[0x3E, 0x01, 0xED, 0x44]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.a(), 0xFF);
    assert_eq!(cpu.f() & (CF | NF | SF), CF | NF | SF);
}

#[test]
fn test_rld() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x00, 0x50, // LD HL,5000h
        0x3E, 0x12, // LD A,12h
        0xED, 0x6F, // RLD
    ]);
    bus.load(0x5000, &[0x34]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 18);
    assert_eq!(bus.peek(0x5000), 0x42);
    assert_eq!(cpu.a(), 0x13);
}

#[test]
fn test_ld_a_r_keeps_bit7() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x80, // LD A,80h
        0xED, 0x4F, // LD R,A
        0xED, 0x5F, // LD A,R
    ]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 9);
    assert_eq!(cpu.r(), 0x80);
    cpu.step(&mut bus);
    // Two M1 fetches since the load
    assert_eq!(cpu.a(), 0x82);
    assert_eq!(cpu.f() & SF, SF);
}

#[test]
fn test_im_and_interrupt_enable() {
    let (mut cpu, mut bus) = setup(&[0xED, 0x5E, 0xFB, 0xF3]); // IM 2; EI; DI
    cpu.step(&mut bus);
    assert_eq!(cpu.regs().im, 2);
    cpu.step(&mut bus);
    assert!(cpu.regs().iff1 && cpu.regs().iff2);
    cpu.step(&mut bus);
    assert!(!cpu.regs().iff1 && !cpu.regs().iff2);
}

#[test]
fn test_undefined_ed_is_nop() {
    let (mut cpu, mut bus) = setup(&[0xED, 0x00, 0x76]);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.pc(), 0x0002);
    assert_eq!(cpu.r(), 2);
}

#[test]
fn test_out_and_in_ports() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x12, // LD A,12h
        0xD3, 0xFE, // OUT (FEh),A
        0xDB, 0xFE, // IN A,(FEh)
    ]);
    bus.set_port_value(0x12FE, 0x1F);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(bus.port_writes(), &[(0x12FE, 0x12)]);
    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(cpu.a(), 0x1F);
}

#[test]
fn test_in_r_c_sets_flags() {
    let (mut cpu, mut bus) = setup(&[0x01, 0xFE, 0x00, 0xED, 0x78]); // LD BC,00FEh; IN A,(C)
    bus.set_port_value(0x00FE, 0x00);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.a(), 0x00);
    assert_eq!(cpu.f() & (ZF | PF), ZF | PF);
}

#[test]
fn test_otir_decrements_b_before_write() {
    let (mut cpu, mut bus) = setup(&[
        0x21, 0x00, 0x50, // LD HL,5000h
        0x01, 0xFE, 0x02, // LD BC,02FEh
        0xED, 0xB3, // OTIR
        0x76,
    ]);
    bus.load(0x5000, &[0xA1, 0xA2]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(bus.port_writes(), &[(0x01FE, 0xA1), (0x00FE, 0xA2)]);
    assert_eq!(cpu.f() & ZF, ZF);
}

#[test]
fn test_index_memory_ops() {
    let (mut cpu, mut bus) = setup(&[
        0xDD, 0x21, 0x00, 0x50, // LD IX,5000h
        0xDD, 0x36, 0x05, 0x77, // LD (IX+5),77h
        0xDD, 0x7E, 0x05, // LD A,(IX+5)
        0xDD, 0x34, 0x05, // INC (IX+5)
        0xFD, 0x21, 0x10, 0x50, // LD IY,5010h
        0xFD, 0x96, 0xF5, // SUB (IY-11)
    ]);
    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(bus.peek(0x5005), 0x77);
    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.a(), 0x77);
    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.peek(0x5005), 0x78);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.a(), 0xFF);
}

#[test]
fn test_index_halves() {
    let (mut cpu, mut bus) = setup(&[
        0xDD, 0x21, 0x34, 0x12, // LD IX,1234h
        0xDD, 0x7C, // LD A,IXh
        0xDD, 0x2C, // INC IXl
        0xDD, 0x66, 0x00, // LD H,(IX+0)
    ]);
    bus.load(0x1235, &[0x99]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.a(), 0x12);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs().ix.get(), 0x1235);
    cpu.step(&mut bus);
    // The plain H is loaded, not IXh
    assert_eq!(cpu.regs().h(), 0x99);
    assert_eq!(cpu.regs().ix.get(), 0x1235);
}

#[test]
fn test_ddcb_set_copies_into_register() {
    let (mut cpu, mut bus) = setup(&[
        0xDD, 0x21, 0x00, 0x50, // LD IX,5000h
        0xDD, 0xCB, 0x02, 0xC0, // SET 0,(IX+2),B
    ]);
    bus.load(0x5002, &[0x10]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.peek(0x5002), 0x11);
    assert_eq!(cpu.regs().b(), 0x11);
    // Only the two prefix bytes of each instruction refresh
    assert_eq!(cpu.r(), 4);
}

#[test]
fn test_fdcb_bit_takes_xy_from_address() {
    let (mut cpu, mut bus) = setup(&[
        0xFD, 0x21, 0x00, 0x28, // LD IY,2800h
        0xFD, 0xCB, 0x00, 0x46, // BIT 0,(IY+0)
    ]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(cpu.f() & (ZF | HF | XF | YF), ZF | HF | XF | YF);
}

#[test]
fn test_cb_register_and_memory_forms() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x81, // LD A,81h
        0xCB, 0x07, // RLC A
        0x21, 0x00, 0x50, // LD HL,5000h
        0xCB, 0xFE, // SET 7,(HL)
        0xCB, 0x7E, // BIT 7,(HL)
    ]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.a(), 0x03);
    assert_eq!(cpu.f() & CF, CF);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(bus.peek(0x5000), 0x80);
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.f() & (ZF | SF), SF);
}

#[test]
fn test_undefined_index_opcode_falls_through() {
    // DD followed by LD A,n
    let (mut cpu, mut bus) = setup(&[0xDD, 0x3E, 0x42, 0x76]);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.pc(), 0x0001);
    assert_eq!(cpu.r(), 1);

    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.a(), 0x42);
    assert_eq!(cpu.pc(), 0x0003);
    assert_eq!(cpu.r(), 2);
}

#[test]
fn test_double_prefix_uses_last() {
    // DD FD 21 nn nn: the DD is dropped, FD applies
    let (mut cpu, mut bus) = setup(&[0xDD, 0xFD, 0x21, 0x34, 0x12]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs().iy.get(), 0x1234);
    assert_eq!(cpu.regs().ix.get(), 0x0000);
}

#[test]
fn test_daa_after_bcd_add() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x19, // LD A,19h
        0xC6, 0x28, // ADD A,28h
        0x27, // DAA
    ]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.a(), 0x47);
}

#[test]
fn test_scf_ccf() {
    let (mut cpu, mut bus) = setup(&[0x37, 0x3F]);
    cpu.step(&mut bus);
    assert_eq!(cpu.f() & CF, CF);
    cpu.step(&mut bus);
    assert_eq!(cpu.f() & (CF | HF), HF);
}
