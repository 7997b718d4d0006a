use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// the COSMAC hex keypad laid over the left-hand side of a qwerty keyboard:
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <-  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// hex key 0x0-0xf went down or up
    Key { key: u8, pressed: bool },
    /// restart the program
    Reset,
    /// the user wants out
    Quit,
}

/// reads keypresses
pub trait Input {
    /// everything that happened since the last poll, without blocking
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// Keyboard input from a raw-mode terminal. Terminals report key repeats but
/// never key releases, so a key counts as held until `key_hold` passes
/// without a repeat.
pub struct TerminalInput {
    keymap: HashMap<char, u8>,
    key_hold: Duration,
    held_since: [Option<Instant>; 16],
}

impl TerminalInput {
    pub fn new(key_hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            key_hold,
            held_since: [None; 16],
        })
    }

    fn read_terminal(&mut self, now: Instant, events: &mut Vec<InputEvent>) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                        Some(&key) => {
                            if self.held_since[key as usize].is_none() {
                                events.push(InputEvent::Key { key, pressed: true });
                            }
                            self.held_since[key as usize] = Some(now);
                        }
                        None => debug!("can't map {:?} to a COSMAC key", c),
                    },
                    KeyCode::Backspace => events.push(InputEvent::Reset),
                    KeyCode::Esc => events.push(InputEvent::Quit),
                    other => debug!("ignoring key {:?}", other),
                },
                other => debug!("ignoring event {:?}", other),
            }
        }
        Ok(())
    }

    /// release keys whose last repeat is older than the hold time
    fn expire_keys(&mut self, now: Instant, events: &mut Vec<InputEvent>) {
        for (key, since) in self.held_since.iter_mut().enumerate() {
            if let Some(t) = *since {
                if now.duration_since(t) >= self.key_hold {
                    *since = None;
                    events.push(InputEvent::Key {
                        key: key as u8,
                        pressed: false,
                    });
                }
            }
        }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TerminalInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let now = Instant::now();
        let mut events = Vec::new();
        self.expire_keys(now, &mut events);
        self.read_terminal(now, &mut events)?;
        Ok(events)
    }
}

/// replays a fixed list of event batches, one batch per poll; for testing
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        ScriptedInput {
            batches: batches.into(),
        }
    }

    /// nothing at all, forever
    pub fn idle() -> Self {
        ScriptedInput::new(Vec::new())
    }
}

impl Input for ScriptedInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
