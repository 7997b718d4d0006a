extern crate chip8;
use chip8::memory::MemoryMap;
use chip8::{Chip8Error, Chip8Interpreter, Config, Cycle};
use std::time::Duration;

fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn load(words: &[u16]) -> Chip8Interpreter {
    let mut vm = Chip8Interpreter::new(&Config {
        rng_seed: Some(1),
        ..Config::default()
    });
    vm.load_program(&assemble(words)).unwrap();
    vm
}

fn run_steps(vm: &mut Chip8Interpreter, steps: usize) {
    for _ in 0..steps {
        vm.step().unwrap();
    }
}

#[test]
fn test_add_immediate_wraps_back() {
    for k in [0u8, 1, 0x7f, 0x80, 0xfe, 0xff].iter() {
        for start in [0u8, 1, 0x42, 0xff].iter() {
            let back = (256 - *k as u16) as u8;
            let mut vm = load(&[
                0x6300 | *start as u16,
                0x7300 | *k as u16,
                0x7300 | back as u16,
            ]);
            run_steps(&mut vm, 3);
            assert_eq!(vm.registers().v(3), *start, "V3={:#x} K={:#x}", start, k);
        }
    }
}

#[test]
fn test_call_return_round_trip() {
    // 0x200 CALL 0x208; 0x202 LD V1, 1; ... 0x208 RET
    let mut vm = load(&[0x2208, 0x6101, 0x0000, 0x0000, 0x00ee]);
    let sp = vm.stack_pointer();
    run_steps(&mut vm, 2);
    assert_eq!(vm.program_counter(), 0x202);
    assert_eq!(vm.stack_pointer(), sp);
    run_steps(&mut vm, 1);
    assert_eq!(vm.registers().v(1), 1);
}

#[test]
fn test_double_draw_is_idempotent() {
    // I = glyph A; draw at (61, 30) so the sprite wraps both ways, twice
    let mut vm = load(&[0x600a, 0xf029, 0x613d, 0x621e, 0xd125, 0xd125]);
    run_steps(&mut vm, 4);
    let before = vm.snapshot_display();
    assert_eq!(vm.step().unwrap(), Cycle::DisplayChanged);
    assert_ne!(vm.snapshot_display(), before);
    assert_eq!(vm.registers().flag(), 0);
    vm.step().unwrap();
    assert_eq!(vm.snapshot_display(), before);
    assert_eq!(vm.registers().flag(), 1);
}

#[test]
fn test_timers_only_count_down() {
    let mut vm = load(&[0x6005, 0xf015, 0x1204]);
    run_steps(&mut vm, 2);
    let mut last = vm.registers().delay_timer;
    for ms in [0u64, 1, 16, 17, 40, 1000, 5].iter() {
        vm.tick(Duration::from_millis(*ms));
        let now = vm.registers().delay_timer;
        assert!(now <= last);
        last = now;
    }
    assert_eq!(last, 0);
    assert_eq!(vm.registers().sound_timer, 0);
    vm.tick(Duration::from_secs(3600));
    assert_eq!(vm.registers().delay_timer, 0);
}

#[test]
fn test_display_top_boundary() {
    let mut memory = chip8::memory::Chip8MemoryMap::new();
    assert!(memory.write8(0x1ff, 0x01).is_ok());
    assert!(matches!(
        memory.write16(0x1ff, 0x0101),
        Err(Chip8Error::OutOfRange { address: 0x1ff, .. })
    ));
    assert!(memory.write8(0xfff, 0x01).is_err());
}

#[test]
fn test_self_jump_pauses() {
    let mut vm = load(&[0x1204, 0x0000, 0x1204]);
    run_steps(&mut vm, 2);
    assert!(vm.is_paused());
    assert_eq!(vm.program_counter(), 0x204);
    assert_eq!(vm.step().unwrap(), Cycle::Paused);
}

#[test]
fn test_bcd_store() {
    let mut vm = load(&[0xa300, 0x6a05, 0xfa33]);
    run_steps(&mut vm, 3);
    assert_eq!(vm.memory().get_ro_slice(0x300, 3).unwrap(), &[0, 0, 5]);
}

#[test]
fn test_unknown_opcode_reports_address() {
    let mut vm = load(&[0x5123]);
    match vm.step() {
        Err(Chip8Error::UnknownOpcode { address, opcode }) => {
            assert_eq!((address, opcode), (0x200, 0x5123));
        }
        other => panic!("expected an unknown opcode, got {:?}", other),
    }
    assert!(vm.is_halted());
    assert!(matches!(vm.step(), Err(Chip8Error::Halted)));
}

#[test]
fn test_oversized_rom_is_refused() {
    let mut vm = Chip8Interpreter::new(&Config::default());
    let rom = vec![0u8; 0xe00];
    assert!(matches!(
        vm.load_program(&rom),
        Err(Chip8Error::RomTooLarge { size: 0xe00, .. })
    ));
}

#[test]
fn test_independent_instances() {
    let mut a = load(&[0x6001]);
    let b = load(&[0x6002]);
    run_steps(&mut a, 1);
    assert_eq!(a.registers().v(0), 1);
    assert_eq!(b.registers().v(0), 0);
    assert_eq!(b.program_counter(), 0x200);
}
