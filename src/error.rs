use std::io;
use thiserror::Error;

/// Everything that can go wrong loading or running a CHIP-8 program.
///
/// `OutOfRange` is recoverable: the interpreter logs it and carries on.
/// The stack faults and `UnknownOpcode` stop the run. The ROM errors are
/// raised before any instruction executes.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("memory access of {len} byte(s) at {address:#05x} is outside the mapped regions")]
    OutOfRange { address: u16, len: usize },

    #[error("call stack overflow (stack pointer {pointer:#04x})")]
    StackOverflow { pointer: u8 },

    #[error("return with an empty call stack (stack pointer {pointer:#04x})")]
    StackUnderrun { pointer: u8 },

    #[error("unknown opcode {opcode:#06x} at {address:#05x}")]
    UnknownOpcode { address: u16, opcode: u16 },

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("ROM is empty")]
    EmptyRom,

    #[error("interpreter has halted")]
    Halted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Chip8Error {
    /// whether the error stops the run loop
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Chip8Error::OutOfRange { .. })
    }
}
