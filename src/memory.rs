use crate::error::Chip8Error;
use log::warn;
use std::io;
use std::ops::RangeInclusive;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the checked memory map. Every access is tested against the
/// mapped regions; a multi-byte access must sit wholly inside one region.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error>;

    /// read one byte; out-of-range reads are logged and yield 0xff
    fn read8(&self, addr: u16) -> u8 {
        match self.get_ro_slice(addr, 1) {
            Ok(byte) => byte[0],
            Err(e) => {
                warn!("{}", e);
                0xff
            }
        }
    }

    /// read a big-endian word; out-of-range reads are logged and yield 0xffff
    fn read16(&self, addr: u16) -> u16 {
        match self.get_ro_slice(addr, 2) {
            Ok(word) => u16::from_be_bytes([word[0], word[1]]),
            Err(e) => {
                warn!("{}", e);
                0xffff
            }
        }
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// write a big-endian word
    fn write16(&mut self, addr: u16, value: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, 2)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// The four mapped regions:
///   0x090-0x0df  font glyphs, 16 x 5 bytes
///   0x0e0-0x0ff  call stack, 16 x 2 bytes
///   0x100-0x1ff  display, 64x32 pixels at 1bpp
///   0x200-0xffe  program
///
/// anything else (0x000-0x08f, 0xfff and up) is unmapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Font,
    Stack,
    Display,
    Program,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Font, Region::Stack, Region::Display, Region::Program];

    pub fn span(self) -> RangeInclusive<u16> {
        match self {
            Region::Font => FONT_ADDR..=STACK_ADDR - 1,
            Region::Stack => STACK_ADDR..=STACK_TOP,
            Region::Display => DISPLAY_ADDR..=PROGRAM_ADDR - 1,
            Region::Program => PROGRAM_ADDR..=PROGRAM_TOP,
        }
    }

    /// which region an address falls in, if any
    pub fn of(addr: u16) -> Option<Region> {
        Region::ALL.iter().copied().find(|r| r.span().contains(&addr))
    }
}

/// how much RAM we have; the last addressable byte is 0xffe
const CHIP8_RAM_SIZE_BYTES: usize = 0x0fff;

pub const FONT_ADDR: u16 = 0x090;
pub const FONT_GLYPH_BYTES: u16 = 5;
pub const STACK_ADDR: u16 = 0x0e0;
pub const STACK_TOP: u16 = 0x0ff;
pub const DISPLAY_ADDR: u16 = 0x100;
pub const DISPLAY_SIZE_BYTES: usize = 0x100;
pub const PROGRAM_ADDR: u16 = 0x200;
pub const PROGRAM_TOP: u16 = 0xffe;

/// room for a ROM
pub const PROGRAM_SIZE_BYTES: usize = (PROGRAM_TOP - PROGRAM_ADDR + 1) as usize;

/// Defines the CHIP-8 memory map used by this interpreter
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let a = check_span(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let a = check_span(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }
}

/// the span addr..addr+len must be non-empty and inside a single region
fn check_span(addr: u16, len: usize) -> Result<usize, Chip8Error> {
    let out_of_range = Chip8Error::OutOfRange { address: addr, len };
    if len == 0 {
        return Err(out_of_range);
    }
    let region = Region::of(addr).ok_or_else(|| Chip8Error::OutOfRange { address: addr, len })?;
    let last = addr as usize + len - 1;
    if last > *region.span().end() as usize {
        return Err(out_of_range);
    }
    Ok(addr as usize)
}

impl Chip8MemoryMap {
    /// initialises memory with the font baked in and everything else zeroed
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.load_font();
        mm
    }

    /// (re)write the built-in hex glyphs
    pub fn load_font(&mut self) {
        let start = FONT_ADDR as usize;
        self.bytes[start..start + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// load a CHIP-8 program at 0x200, zeroing whatever is left of program space
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.is_empty() {
            return Err(Chip8Error::EmptyRom);
        }
        if rom.len() > PROGRAM_SIZE_BYTES {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: PROGRAM_SIZE_BYTES,
            });
        }
        let program = self.get_rw_slice(PROGRAM_ADDR, PROGRAM_SIZE_BYTES)?;
        program.fill(0);
        program[..rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// load a program of unknown length from a reader
    pub fn read_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.load_program(&buf)?;
        Ok(len)
    }

    /// the packed display bitmap
    pub fn display(&self) -> &[u8] {
        let a = DISPLAY_ADDR as usize;
        &self.bytes[a..a + DISPLAY_SIZE_BYTES]
    }

    pub fn display_mut(&mut self) -> &mut [u8] {
        let a = DISPLAY_ADDR as usize;
        &mut self.bytes[a..a + DISPLAY_SIZE_BYTES]
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap::new()
    }
}

/// address of the glyph for the low nibble of `digit`
pub fn glyph_addr(digit: u8) -> u16 {
    FONT_ADDR + (digit & 0x0f) as u16 * FONT_GLYPH_BYTES
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. only the font is baked in
        assert_eq!(m.bytes[..0x90], [0; 0x90]);
        assert_eq!(m.bytes[0xe0..], [0; 0xf1f]);
        assert_eq!(m.bytes.len(), 0xfff);
    }

    #[test]
    fn test_font_loaded() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(glyph_addr(0), 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.get_ro_slice(glyph_addr(0xf), 5).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(glyph_addr(0x1a), glyph_addr(0xa));
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 0x208)?;
        assert_eq!(
            dst.get_ro_slice(0x200, 16)?,
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.read16(0x304), 0x0405);
        m.write16(0x400, 0xbeef)?;
        assert_eq!(m.read8(0x400), 0xbe);
        assert_eq!(m.read8(0x401), 0xef);
        Ok(())
    }

    #[test]
    fn test_unmapped_reads_return_sentinel() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.read8(0x000), 0xff);
        assert_eq!(m.read8(0x08f), 0xff);
        assert_eq!(m.read8(0xfff), 0xff);
        assert_eq!(m.read16(0xffe), 0xffff);
    }

    #[test]
    fn test_display_boundary() {
        let mut m = Chip8MemoryMap::new();
        assert!(m.write8(0x1ff, 0xaa).is_ok());
        assert_eq!(m.display()[0xff], 0xaa);
        // a word at the top of the display would spill into program space
        assert!(matches!(
            m.write16(0x1ff, 0x1234),
            Err(Chip8Error::OutOfRange { address: 0x1ff, len: 2 })
        ));
        assert_eq!(m.read16(0x1ff), 0xffff);
        assert!(m.write8(0xfff, 0).is_err());
    }

    #[test]
    fn test_straddling_write_leaves_memory_alone() {
        let mut m = Chip8MemoryMap::new();
        assert!(m.write(&[1, 2, 3], 0x0fe).is_err());
        assert_eq!(m.read8(0x0fe), 0);
        assert_eq!(m.read8(0x100), 0);
    }

    #[test]
    fn test_region_of() {
        assert_eq!(Region::of(0x08f), None);
        assert_eq!(Region::of(0x090), Some(Region::Font));
        assert_eq!(Region::of(0x0df), Some(Region::Font));
        assert_eq!(Region::of(0x0e0), Some(Region::Stack));
        assert_eq!(Region::of(0x100), Some(Region::Display));
        assert_eq!(Region::of(0x200), Some(Region::Program));
        assert_eq!(Region::of(0xffe), Some(Region::Program));
        assert_eq!(Region::of(0xfff), None);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.read_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_reload_clears_old_image() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        m.load_program(&[0x11, 0x22, 0x33, 0x44])?;
        m.load_program(&[0x55])?;
        assert_eq!(m.get_ro_slice(0x200, 4)?, &[0x55, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut m = Chip8MemoryMap::new();
        assert!(m.load_program(&[0; PROGRAM_SIZE_BYTES]).is_ok());
        assert!(matches!(
            m.load_program(&[0; PROGRAM_SIZE_BYTES + 1]),
            Err(Chip8Error::RomTooLarge { size: 0xe00, max_size: 0xdff })
        ));
    }

    #[test]
    fn test_program_empty() {
        let mut m = Chip8MemoryMap::new();
        assert!(matches!(m.load_program(&[]), Err(Chip8Error::EmptyRom)));
    }

    #[test]
    fn test_mem_layout() {
        assert_eq!(Region::Font.span(), 0x090..=0x0df);
        assert_eq!(Region::Stack.span(), 0x0e0..=0x0ff);
        assert_eq!(Region::Display.span(), 0x100..=0x1ff);
        assert_eq!(Region::Program.span(), 0x200..=0xffe);
        assert_eq!(PROGRAM_SIZE_BYTES, 0xdff);
    }
}
