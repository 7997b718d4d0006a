use crate::framebuffer::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::memory::DISPLAY_SIZE_BYTES;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is the rendering sink the run loop pushes display snapshots to.
/// It should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize;
}

// store useful metadata about the display: width, height, bits per pixel
struct Resolution(usize, usize, usize);

impl Resolution {
    fn chip8() -> Self {
        Resolution(DISPLAY_WIDTH as usize, DISPLAY_HEIGHT as usize, 1)
    }

    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// expand the pixels matching `bitplane` into canvas coordinates; y runs
    /// downwards from 0
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution::chip8(),
        })
    }

    pub fn test_card(&mut self) -> Result<(), io::Error> {
        self.draw(&CHIP8_TEST_CARD)
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "expected {} bytes of display data, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            ));
        }

        // this assumes a 1:1 ratio between terminal cells, chip8 pixels and
        // the internal TUI canvas
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // only lit pixels need painting over the black background
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for headless runs and testing; keeps the last frame
pub struct DummyDisplay {
    pub frames: usize,
    pub last_frame: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay {
            frames: 0,
            last_frame: vec![0; DISPLAY_SIZE_BYTES],
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        DummyDisplay::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(data);
        Ok(())
    }

    fn get_display_size_bytes(&mut self) -> usize {
        DISPLAY_SIZE_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_pixel_count() {
        let r = Resolution::chip8();
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution::chip8();
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution::chip8();
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution::chip8();
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_split_pixels() {
        let r = Resolution::chip8();
        assert_eq!(r.bitplane_from_data(&[0; 256], 1).count(), 0);
        assert_eq!(r.bitplane_from_data(&[0; 256], 0).count(), 2048);
        let lit: Vec<_> = r.bitplane_from_data(&CHIP8_TEST_CARD, 1).collect();
        let dark = r.bitplane_from_data(&CHIP8_TEST_CARD, 0).count();
        assert_eq!(lit.len() + dark, 2048);
        // the card is framed, so its corners are lit
        assert!(lit.contains(&(0.0, 0.0)));
        assert!(lit.contains(&(63.0, 0.0)));
        assert!(lit.contains(&(63.0, -31.0)));
    }

    #[test]
    fn test_dummy_display_keeps_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        assert_eq!(d.get_display_size_bytes(), 256);
        d.draw(&CHIP8_TEST_CARD)?;
        d.draw(&CHIP8_TEST_CARD)?;
        assert_eq!(d.frames, 2);
        assert_eq!(d.last_frame, CHIP8_TEST_CARD.to_vec());
        Ok(())
    }
}

/// this is a display test card suitable for CHIP8, for testing display routines
#[rustfmt::skip]
pub const CHIP8_TEST_CARD: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // 00 XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|
    0x80, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x01, // 01 X                              |X                              |
    0x80, 0x00, 0x00, 0x03, 0xc2, 0x41, 0x55, 0x55, // 02 X                             X|XX    X  X     | X X X | X X X |
    0x81, 0xff, 0xff, 0xc5, 0xa2, 0x40, 0xaa, 0xa9, // 03 X      |XXXXXXX|XXXXXXX|XX   X |X X   X  X      X X X X X X X  |
    0x80, 0x00, 0x00, 0x09, 0x92, 0x41, 0x55, 0x55, // 04 X                           X  |X  X  X  X     | X X X | X X X |
    0x81, 0xff, 0xff, 0xc1, 0x82, 0x40, 0xaa, 0xa9, // 05 X      |XXXXXXX|XXXXXXX|XX     |X     X  X      X X X X X X X  |
    0xa0, 0x00, 0x00, 0x01, 0x83, 0xc1, 0x55, 0x55, // 06 X X                            |X     X|XX     | X X X | X X X |
    0xa1, 0xff, 0xff, 0xc1, 0x80, 0x00, 0xaa, 0xa9, // 07 X X    |XXXXXXX|XXXXXXX|XX     |X               X X X X X X X  |
    0xa0, 0x00, 0x00, 0x00, 0x00, 0x01, 0x55, 0x55, // 08 X X                                            | X X X | X X X |
    0xa1, 0xff, 0xff, 0xc0, 0x00, 0x00, 0xaa, 0xa9, // 09 X X    |XXXXXXX|XXXXXXX|XX                      X X X X X X X  |
    0xbc, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // 10 X XXXX                                                         |
    0x81, 0xff, 0xff, 0xc0, 0x00, 0x00, 0x00, 0x01, // 11 X      |XXXXXXX|XXXXXXX|XX                                     |
    0x88, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x11, // 12 X   X                          |X                          X   |
    0x91, 0xff, 0xff, 0xc1, 0x80, 0x00, 0x00, 0x09, // 13 X  X   |XXXXXXX|XXXXXXX|XX     |X                           X  |
    0xa0, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x05, // 14 X X                            |X                            X |
    0xff, 0x80, 0x00, 0x1f, 0xf8, 0x00, 0x01, 0xff, // 15 XXXXXXX|X                  XXXX|XXXXX                  |XXXXXXX|
    0xff, 0x80, 0x00, 0x1f, 0xf8, 0x00, 0x01, 0xff, // 16 XXXXXXX|X                  XXXX|XXXXX                  |XXXXXXX|
    0xa0, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x05, // 17 X X                            |X                            X |
    0x90, 0x00, 0x00, 0x01, 0x85, 0x55, 0x55, 0x09, // 18 X  X                           |X    X | X X X | X X X |    X  |
    0x88, 0x00, 0x00, 0x01, 0x85, 0x55, 0x55, 0x11, // 19 X   X                          |X    X | X X X | X X X |   X   |
    0x80, 0x00, 0x00, 0x00, 0x05, 0x55, 0x55, 0x01, // 20 X                                    X | X X X | X X X |       |
    0x80, 0x00, 0x00, 0x00, 0x05, 0x55, 0x55, 0x3d, // 21 X                                    X | X X X | X X X |  XXXX |
    0x95, 0x55, 0x40, 0x00, 0x05, 0x55, 0x55, 0x25, // 22 X  X X | X X X | X                   X | X X X | X X X |  X  X |
    0xaa, 0xaa, 0x80, 0x00, 0x05, 0x55, 0x55, 0x3d, // 23 X X X X X X X X X                    X | X X X | X X X |  XXXX |
    0x95, 0x55, 0x40, 0x01, 0x85, 0x55, 0x55, 0x29, // 24 X  X X | X X X | X             |X    X | X X X | X X X |  X X  |
    0xaa, 0xaa, 0x83, 0xc1, 0x85, 0x55, 0x55, 0x25, // 25 X X X X X X X X X     X|XX     |X    X | X X X | X X X |  X  X |
    0x95, 0x55, 0x41, 0x41, 0x85, 0x55, 0x55, 0x01, // 26 X  X X | X X X | X     | X     |X    X | X X X | X X X |       |
    0xaa, 0xaa, 0x81, 0x49, 0x95, 0x55, 0x55, 0x01, // 27 X X X X X X X X X      | X  X  |X  X X | X X X | X X X |       |
    0x95, 0x55, 0x41, 0x45, 0xa5, 0x55, 0x55, 0x01, // 28 X  X X | X X X | X     | X   X |X X  X | X X X | X X X |       |
    0xaa, 0xaa, 0x83, 0xc3, 0xc5, 0x55, 0x55, 0x01, // 29 X X X X X X X X X     X|XX    X|XX   X | X X X | X X X |       |
    0x80, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x01, // 30 X                              |X                              |
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // 31 XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|XXXXXXX|
]; //                                                  .. 0......78......f0......78......f0......78......f0......78......f
