use crate::error::Chip8Error;
use crate::memory::{MemoryMap, STACK_ADDR, STACK_TOP};
use log::warn;

/// Return-address stack overlaid on 0x0e0-0x0ff. The pointer holds the
/// address of the most recently pushed 2-byte slot; when it sits on the base
/// of the region the stack is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallStack {
    sp: u8,
}

const STACK_BASE: u8 = STACK_ADDR as u8;
const SLOT_BYTES: u8 = 2;

impl CallStack {
    pub fn new() -> Self {
        CallStack { sp: STACK_BASE }
    }

    pub fn pointer(&self) -> u8 {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == STACK_BASE
    }

    /// number of return addresses held
    pub fn depth(&self) -> usize {
        ((self.sp - STACK_BASE) / SLOT_BYTES) as usize
    }

    pub fn reset(&mut self) {
        self.sp = STACK_BASE;
    }

    /// advance the pointer a slot, then store `addr` there
    pub fn push(&mut self, memory: &mut impl MemoryMap, addr: u16) -> Result<(), Chip8Error> {
        let next = self.sp as u16 + SLOT_BYTES as u16;
        if next + 1 > STACK_TOP {
            warn!("call stack full at depth {}", self.depth());
            return Err(Chip8Error::StackOverflow { pointer: self.sp });
        }
        memory.write16(next, addr)?;
        self.sp = next as u8;
        Ok(())
    }

    /// read the top slot, then retreat the pointer
    pub fn pop(&mut self, memory: &impl MemoryMap) -> Result<u16, Chip8Error> {
        let addr = self.peek(memory)?;
        self.sp -= SLOT_BYTES;
        Ok(addr)
    }

    pub fn peek(&self, memory: &impl MemoryMap) -> Result<u16, Chip8Error> {
        if self.is_empty() {
            return Err(Chip8Error::StackUnderrun { pointer: self.sp });
        }
        Ok(memory.read16(self.sp as u16))
    }
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new()
    }
}
