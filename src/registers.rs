use crate::memory::PROGRAM_ADDR;

/// VF doubles as the carry, borrow, shift-out and collision flag
pub const FLAG: u8 = 0xf;

/// The register file: V0-VF, I, the program counter and both timers.
/// The stack pointer lives with the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_ADDR,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    /// value of VX. Register numbers come from 4-bit fields, so anything
    /// above 0xf is a bug in the caller.
    pub fn v(&self, x: u8) -> u8 {
        assert!(x < 16, "no such register V{:X}", x);
        self.v[x as usize]
    }

    pub fn v_mut(&mut self, x: u8) -> &mut u8 {
        assert!(x < 16, "no such register V{:X}", x);
        &mut self.v[x as usize]
    }

    pub fn set_v(&mut self, x: u8, value: u8) {
        *self.v_mut(x) = value;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG as usize]
    }

    pub fn set_flag(&mut self, value: u8) {
        self.v[FLAG as usize] = value;
    }

    /// hop over the next instruction when `condition` holds
    pub fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub fn all(&self) -> &[u8; 16] {
        &self.v
    }
}

impl Default for Registers {
    fn default() -> Self {
        Registers::new()
    }
}
