//! Mutation of the packed 1bpp display region: clear and sprite XOR-blit.
//! Pixels are stored row-major, eight to a byte, MSB leftmost.
use crate::memory::{Chip8MemoryMap, MemoryMap};

pub const DISPLAY_WIDTH: u8 = 64;
pub const DISPLAY_HEIGHT: u8 = 32;

const BYTES_PER_ROW: usize = DISPLAY_WIDTH as usize / 8;

/// zero the whole display
pub fn clear(memory: &mut Chip8MemoryMap) {
    memory.display_mut().fill(0);
}

/// XOR `rows` bytes of sprite data from `sprite_addr` onto the display at
/// (x, y), wrapping at the screen edges. Returns true if any lit pixel was
/// turned off by any row.
pub fn draw_sprite(memory: &mut Chip8MemoryMap, x: u8, y: u8, sprite_addr: u16, rows: u8) -> bool {
    // fetch first, the sprite may live in the display region itself
    let mut sprite = [0u8; 16];
    for (row, byte) in sprite.iter_mut().enumerate().take(rows as usize) {
        *byte = memory.read8(sprite_addr.wrapping_add(row as u16));
    }

    let x = x % DISPLAY_WIDTH;
    let shift = x % 8;
    let column = x as usize / 8;
    let display = memory.display_mut();
    let mut collision = false;

    for (row, &bits) in sprite.iter().enumerate().take(rows as usize) {
        let dy = (y as usize + row) % DISPLAY_HEIGHT as usize;
        let line = dy * BYTES_PER_ROW;

        collision |= xor_byte(&mut display[line + column], bits >> shift);
        if shift != 0 {
            // the tail spills into the next byte, wrapping round to column 0
            let next = line + (column + 1) % BYTES_PER_ROW;
            collision |= xor_byte(&mut display[next], bits << (8 - shift));
        }
    }
    collision
}

fn xor_byte(dst: &mut u8, bits: u8) -> bool {
    let hit = *dst & bits != 0;
    *dst ^= bits;
    hit
}

/// whether the pixel at (x, y) is lit; coordinates wrap
#[cfg(test)]
fn pixel(display: &[u8], x: u8, y: u8) -> bool {
    let x = (x % DISPLAY_WIDTH) as usize;
    let y = (y % DISPLAY_HEIGHT) as usize;
    display[y * BYTES_PER_ROW + x / 8] & (0x80 >> (x % 8)) != 0
}
