//! # environment
//!
//! Sets everything up and runs the main loop. The loop is the only thing
//! that touches the interpreter, once per iteration:
//!
//! ```text
//!  |-- drain input, forward key events; Reset restarts, Quit ends the run
//!  |-- feed the wall-clock delta to the timers
//!  |-- step one instruction; redraw if the display changed
//!  `-- sleep the rest of the instruction's time slice
//!       (a whole frame while paused, there is nothing to do but wait)
//! ```
use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Input, InputEvent};
use crate::interpreter::{Chip8Interpreter, Cycle};
use crate::timer::TIMER_INTERVAL;
use log::info;
use std::time::{Duration, Instant};

/// how a run ended, when it ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// loop iterations, paused ones included
    pub cycles: u64,
    pub frames_drawn: u64,
    /// the user asked to stop
    pub quit: bool,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    instruction_interval: Duration,
    throttle: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: &Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
    ) -> Environment<'a> {
        Environment::with_interpreter(Chip8Interpreter::new(config), config, display, input)
    }

    /// wrap an interpreter that already has a program loaded
    pub fn with_interpreter(
        interpreter: Chip8Interpreter,
        config: &Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
    ) -> Environment<'a> {
        Environment {
            interpreter,
            display,
            input,
            instruction_interval: config.instruction_interval(),
            throttle: true,
        }
    }

    /// run flat out without sleeping; timers then follow the (fast) wall clock
    pub fn unthrottled(mut self) -> Self {
        self.throttle = false;
        self
    }

    /// load a chip8 program
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.interpreter.load_program(rom)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// run until the user quits, the program faults or `max_cycles` loop
    /// iterations have gone by
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<RunSummary, Chip8Error> {
        let mut summary = RunSummary::default();
        let mut last_tick = Instant::now();
        self.display.draw(self.interpreter.display())?;
        summary.frames_drawn += 1;

        while max_cycles.map_or(true, |max| summary.cycles < max) {
            for event in self.input.poll_events()? {
                match event {
                    InputEvent::Key { key, pressed } => {
                        self.interpreter.deliver_key_event(key, pressed)
                    }
                    InputEvent::Reset => self.interpreter.reset(),
                    InputEvent::Quit => {
                        info!("quit after {} cycles", summary.cycles);
                        summary.quit = true;
                        return Ok(summary);
                    }
                }
            }

            let now = Instant::now();
            self.interpreter.tick(now.duration_since(last_tick));
            last_tick = now;

            summary.cycles += 1;
            let cycle = self.interpreter.step()?;
            if cycle == Cycle::DisplayChanged {
                self.display.draw(self.interpreter.display())?;
                summary.frames_drawn += 1;
            }

            if self.throttle {
                let nap = match cycle {
                    Cycle::Paused => TIMER_INTERVAL,
                    _ => self.instruction_interval,
                };
                let spent = last_tick.elapsed();
                if spent < nap {
                    spin_sleep::sleep(nap - spent);
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::ScriptedInput;

    fn rom(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn test_run_stops_at_max_cycles() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::idle();
        let mut env = Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
        // 0x200: V0 += 1; JP 0x200
        env.load_program(&rom(&[0x7001, 0x1200]))?;
        let summary = env.run(Some(10))?;
        assert_eq!(summary.cycles, 10);
        assert!(!summary.quit);
        assert_eq!(env.interpreter().registers().v(0), 5);
        Ok(())
    }

    #[test]
    fn test_run_redraws_on_display_change() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::idle();
        {
            let mut env =
                Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
            // draw glyph 0 at (0, 0), then sit in a self-jump
            env.load_program(&rom(&[0xf029, 0xd005, 0x1204]))?;
            env.run(Some(5))?;
            assert!(env.interpreter().is_paused());
        }
        // initial frame plus the draw
        assert_eq!(display.frames, 2);
        assert_eq!(display.last_frame[0], 0xf0);
        Ok(())
    }

    #[test]
    fn test_quit_ends_run() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::new(vec![vec![], vec![], vec![InputEvent::Quit]]);
        let mut env = Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
        env.load_program(&rom(&[0x1200]))?;
        let summary = env.run(None)?;
        assert!(summary.quit);
        assert_eq!(summary.cycles, 2);
        Ok(())
    }

    #[test]
    fn test_key_events_reach_the_interpreter() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::new(vec![
            vec![],
            vec![],
            vec![InputEvent::Key {
                key: 0xb,
                pressed: true,
            }],
        ]);
        let mut env = Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
        // wait for a key into V3, then spin
        env.load_program(&rom(&[0xf30a, 0x1202]))?;
        env.run(Some(4))?;
        assert_eq!(env.interpreter().registers().v(3), 0xb);
        Ok(())
    }

    #[test]
    fn test_reset_restarts_program() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::new(vec![vec![], vec![], vec![InputEvent::Reset]]);
        let mut env = Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
        // V0 += 1 three times, then stop at an unknown opcode
        env.load_program(&rom(&[0x7001, 0x7001, 0x7001, 0x0000]))?;
        env.run(Some(3))?;
        // two steps, a reset, one more step from the top
        assert_eq!(env.interpreter().program_counter(), 0x202);
        assert_eq!(env.interpreter().registers().v(0), 3);
        Ok(())
    }

    #[test]
    fn test_fault_is_returned() {
        let mut display = DummyDisplay::new();
        let mut input = ScriptedInput::idle();
        let mut env = Environment::new(&Config::default(), &mut display, &mut input).unthrottled();
        env.load_program(&rom(&[0x6001, 0x5123])).unwrap();
        assert!(matches!(
            env.run(None),
            Err(Chip8Error::UnknownOpcode { address: 0x202, opcode: 0x5123 })
        ));
        assert!(env.interpreter().is_halted());
    }
}
