//! # chip8
//!
//! ## Design
//!
//! * one owned interpreter per run: memory, registers, call stack and run
//!   state in a single struct, no globals
//! * memory map with region checks; the font, call stack and display all
//!   live inside it
//! * decode is a separate step producing an `Instruction`, so the decoder can
//!   be tested on its own
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * CHIP-8 instructions will run as fast as the configured speed allows,
//!   then sleep; timers follow the wall clock at 60Hz regardless
//! * a couple of quirks (shift source, FX55/FX65 index) picked by config
//!
//! ## Model
//!
//! ```text
//! Environment
//!  |-- display, input, config
//!  |-- interpreter(config)
//!  |    |-- memory map: font, stack, display, program
//!  |    |-- registers, call stack, run state
//!  |    `-- instruction set: decode then execute
//!  `-- main loop
//!       |-- for event in input.poll_events() { interpreter.deliver_key_event(..) }
//!       |-- interpreter.tick(now - last)
//!       |-- if interpreter.step()? == DisplayChanged { display.draw(..) }
//!       `-- sleep(instruction interval, or a frame while paused)
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod stack;
pub mod timer;

pub use config::{Config, Quirks};
pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, Cycle, RunState};
