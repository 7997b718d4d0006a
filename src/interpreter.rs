//! # interpreter
//!
//! The fetch/decode/execute core. One `Chip8Interpreter` owns the whole
//! machine: memory (font, call stack and display all live inside it), the
//! register file and the run state. Nothing is shared, so independent
//! instances can sit side by side.
//!
//! Run states:
//!
//! ```text
//!  Running           -- step() executes one instruction
//!  PausedOnSelfJump  -- a 1NNN jumped to its own address; any key event resumes
//!  PausedOnKeyWait   -- FX0A is waiting; the next key press lands in VX
//!  Halted            -- unknown opcode or stack fault; step() refuses to go on
//! ```
//!
//! Timers are not threads: the run loop hands wall-clock deltas to tick(),
//! which turns them into 60Hz decrements.
use crate::config::{Config, Quirks};
use crate::error::Chip8Error;
use crate::framebuffer;
use crate::instruction::{Address, Instruction, Register};
use crate::memory::{self, Chip8MemoryMap, MemoryMap, DISPLAY_SIZE_BYTES, PROGRAM_ADDR};
use crate::registers::Registers;
use crate::stack::CallStack;
use crate::timer::{self, FrameTimer};
use log::{error, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    PausedOnSelfJump,
    PausedOnKeyWait { register: u8 },
    Halted,
}

/// what a successful step() did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// an instruction ran and the display is unchanged
    Executed,
    /// an instruction ran and touched the display
    DisplayChanged,
    /// nothing ran, waiting on input
    Paused,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: Registers,
    stack: CallStack,
    quirks: Quirks,
    keys: [bool; 16],
    state: RunState,
    frame_timer: FrameTimer,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new(config: &Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            stack: CallStack::new(),
            quirks: config.quirks,
            keys: [false; 16],
            state: RunState::Running,
            frame_timer: FrameTimer::new(),
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(rom)?;
        info!("loaded {} byte program at {:#05x}", rom.len(), PROGRAM_ADDR);
        Ok(())
    }

    /// load a chip8 program from a file or other reader
    pub fn read_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let len = self.memory.read_program(reader)?;
        info!("loaded {} byte program at {:#05x}", len, PROGRAM_ADDR);
        Ok(())
    }

    /// restart the loaded program: font, display, PC, SP and timers go back to
    /// power-on values; the program image and V0-VF/I are left alone
    pub fn reset(&mut self) {
        self.memory.load_font();
        framebuffer::clear(&mut self.memory);
        self.registers.pc = PROGRAM_ADDR;
        self.registers.delay_timer = 0;
        self.registers.sound_timer = 0;
        self.stack.reset();
        self.frame_timer.reset();
        self.state = RunState::Running;
        info!("reset");
    }

    /// execute exactly one instruction. `Err` means the run is over.
    pub fn step(&mut self) -> Result<Cycle, Chip8Error> {
        match self.state {
            RunState::Halted => return Err(Chip8Error::Halted),
            RunState::PausedOnSelfJump | RunState::PausedOnKeyWait { .. } => {
                return Ok(Cycle::Paused)
            }
            RunState::Running => {}
        }

        let address = self.registers.pc;
        let word = self.memory.read16(address);
        let instruction = Instruction::decode(word);
        trace!("{:#05x}: {:04x}  {}", address, word, instruction);

        self.registers.pc = address.wrapping_add(2);
        self.execute(address, instruction).map_err(|e| self.halt(e))
    }

    fn halt(&mut self, e: Chip8Error) -> Chip8Error {
        if e.is_fatal() {
            error!("halting: {}", e);
            self.state = RunState::Halted;
        }
        e
    }

    /// run one decoded instruction fetched from `address`; PC already points
    /// past it
    fn execute(&mut self, address: u16, instruction: Instruction) -> Result<Cycle, Chip8Error> {
        use Instruction::*;
        let regs = &mut self.registers;
        match instruction {
            // display
            ClearDisplay => {
                framebuffer::clear(&mut self.memory);
                return Ok(Cycle::DisplayChanged);
            }
            Draw(Register(x), Register(y), rows) => {
                let (vx, vy) = (regs.v(x), regs.v(y));
                let collision = framebuffer::draw_sprite(&mut self.memory, vx, vy, regs.i, rows);
                regs.set_flag(collision as u8);
                return Ok(Cycle::DisplayChanged);
            }

            // flow control
            Return => regs.pc = self.stack.pop(&self.memory)?,
            Jump(Address(target)) => {
                if target == address {
                    info!("self-jump at {:#05x}, pausing until input", address);
                    self.state = RunState::PausedOnSelfJump;
                }
                regs.pc = target;
            }
            Call(Address(target)) => {
                self.stack.push(&mut self.memory, regs.pc)?;
                regs.pc = target;
            }
            JumpOffset(Address(base)) => regs.pc = base.wrapping_add(regs.v(0) as u16),

            // conditionals
            SkipIfEqualConst(Register(x), n) => regs.skip_if(regs.v(x) == n),
            SkipIfNotEqualConst(Register(x), n) => regs.skip_if(regs.v(x) != n),
            SkipIfEqual(Register(x), Register(y)) => regs.skip_if(regs.v(x) == regs.v(y)),
            SkipIfNotEqual(Register(x), Register(y)) => regs.skip_if(regs.v(x) != regs.v(y)),
            SkipIfKey(Register(x)) => regs.skip_if(key_held(&self.keys, regs.v(x))),
            SkipIfNotKey(Register(x)) => regs.skip_if(!key_held(&self.keys, regs.v(x))),

            // register arithmetic
            SetConst(Register(x), n) => regs.set_v(x, n),
            AddConst(Register(x), n) => regs.set_v(x, regs.v(x).wrapping_add(n)),
            Set(Register(x), Register(y)) => regs.set_v(x, regs.v(y)),
            Or(Register(x), Register(y)) => regs.set_v(x, regs.v(x) | regs.v(y)),
            And(Register(x), Register(y)) => regs.set_v(x, regs.v(x) & regs.v(y)),
            Xor(Register(x), Register(y)) => regs.set_v(x, regs.v(x) ^ regs.v(y)),
            Add(Register(x), Register(y)) => {
                let (sum, carry) = regs.v(x).overflowing_add(regs.v(y));
                regs.set_v(x, sum);
                regs.set_flag(carry as u8);
            }
            Sub(Register(x), Register(y)) => {
                let (vx, vy) = (regs.v(x), regs.v(y));
                regs.set_v(x, vx.wrapping_sub(vy));
                regs.set_flag((vx >= vy) as u8);
            }
            SubNeg(Register(x), Register(y)) => {
                let (vx, vy) = (regs.v(x), regs.v(y));
                regs.set_v(x, vy.wrapping_sub(vx));
                regs.set_flag((vy >= vx) as u8);
            }
            ShiftRight(Register(x), Register(y)) => {
                let src = regs.v(shift_source(&self.quirks, x, y));
                regs.set_v(x, src >> 1);
                regs.set_flag(src & 0x01);
            }
            ShiftLeft(Register(x), Register(y)) => {
                let src = regs.v(shift_source(&self.quirks, x, y));
                regs.set_v(x, src << 1);
                regs.set_flag(src >> 7);
            }
            Random(Register(x), mask) => regs.set_v(x, self.rng.gen::<u8>() & mask),

            // I register
            SetIndex(Address(addr)) => regs.i = addr,
            AddToIndex(Register(x)) => regs.i = regs.i.wrapping_add(regs.v(x) as u16),
            GlyphAddr(Register(x)) => regs.i = memory::glyph_addr(regs.v(x)),
            StoreBcd(Register(x)) => {
                let (value, i) = (regs.v(x), regs.i);
                store(&mut self.memory, i, value / 100);
                store(&mut self.memory, i.wrapping_add(1), value / 10 % 10);
                store(&mut self.memory, i.wrapping_add(2), value % 10);
            }
            StoreRegisters(Register(x)) => {
                for r in 0..=x {
                    store(&mut self.memory, regs.i.wrapping_add(r as u16), regs.v(r));
                }
                advance_index(regs, &self.quirks, x);
            }
            LoadRegisters(Register(x)) => {
                for r in 0..=x {
                    let value = self.memory.read8(regs.i.wrapping_add(r as u16));
                    regs.set_v(r, value);
                }
                advance_index(regs, &self.quirks, x);
            }

            // timers and keys
            GetDelayTimer(Register(x)) => regs.set_v(x, regs.delay_timer),
            SetDelayTimer(Register(x)) => regs.delay_timer = regs.v(x),
            SetSoundTimer(Register(x)) => regs.sound_timer = regs.v(x),
            WaitKey(Register(x)) => {
                info!("waiting for a key for V{:X}", x);
                self.state = RunState::PausedOnKeyWait { register: x };
            }

            Unknown(opcode) => return Err(Chip8Error::UnknownOpcode { address, opcode }),
        }
        Ok(Cycle::Executed)
    }

    /// advance the timers by a wall-clock delta; they only ever count down
    pub fn tick(&mut self, elapsed: Duration) {
        let frames = self.frame_timer.advance(elapsed);
        if frames > 0 {
            self.registers.delay_timer = timer::decay(self.registers.delay_timer, frames);
            self.registers.sound_timer = timer::decay(self.registers.sound_timer, frames);
        }
    }

    /// key 0x0-0xf went down or up. Any event ends a self-jump pause; a press
    /// ends a key wait and lands in the waiting register.
    pub fn deliver_key_event(&mut self, key: u8, pressed: bool) {
        if key >= 16 {
            warn!("ignoring event for key {:#x}", key);
            return;
        }
        self.keys[key as usize] = pressed;
        match self.state {
            RunState::PausedOnSelfJump => {
                info!("input received, resuming");
                self.state = RunState::Running;
            }
            RunState::PausedOnKeyWait { register } if pressed => {
                self.registers.set_v(register, key);
                self.state = RunState::Running;
            }
            _ => {}
        }
    }

    pub fn snapshot_display(&self) -> [u8; DISPLAY_SIZE_BYTES] {
        let mut snapshot = [0u8; DISPLAY_SIZE_BYTES];
        snapshot.copy_from_slice(self.memory.display());
        snapshot
    }

    pub fn display(&self) -> &[u8] {
        self.memory.display()
    }

    pub fn is_paused(&self) -> bool {
        matches!(
            self.state,
            RunState::PausedOnSelfJump | RunState::PausedOnKeyWait { .. }
        )
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, RunState::PausedOnKeyWait { .. })
    }

    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    /// whether the sound timer would be sounding the buzzer
    pub fn is_sounding(&self) -> bool {
        self.registers.sound_timer > 0
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn program_counter(&self) -> u16 {
        self.registers.pc
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack.pointer()
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }
}

fn shift_source(quirks: &Quirks, x: u8, y: u8) -> u8 {
    if quirks.shift_uses_single_register {
        x
    } else {
        y
    }
}

/// FX55/FX65 move I past the block unless the quirk says otherwise
fn advance_index(regs: &mut Registers, quirks: &Quirks, x: u8) {
    if !quirks.load_store_keeps_index {
        regs.i = regs.i.wrapping_add(x as u16 + 1);
    }
}

fn key_held(keys: &[bool; 16], key: u8) -> bool {
    keys.get(key as usize).copied().unwrap_or(false)
}

/// write a byte for a program instruction; a bad address is logged and the
/// instruction carries on
fn store(memory: &mut Chip8MemoryMap, addr: u16, value: u8) {
    if let Err(e) = memory.write8(addr, value) {
        warn!("{}", e);
    }
}
