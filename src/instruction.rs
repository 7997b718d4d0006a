use std::fmt;

/// a 12-bit address operand (NNN)
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Address(pub u16);

/// a register operand (X or Y)
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Register(pub u8);

/// One decoded CHIP-8 instruction. Anything that matches no family decodes
/// to `Unknown` carrying the raw word.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Instruction {
    ClearDisplay,                          // 00E0
    Return,                                // 00EE
    Jump(Address),                         // 1NNN
    Call(Address),                         // 2NNN
    SkipIfEqualConst(Register, u8),        // 3XNN
    SkipIfNotEqualConst(Register, u8),     // 4XNN
    SkipIfEqual(Register, Register),       // 5XY0
    SetConst(Register, u8),                // 6XNN
    AddConst(Register, u8),                // 7XNN
    Set(Register, Register),               // 8XY0
    Or(Register, Register),                // 8XY1
    And(Register, Register),               // 8XY2
    Xor(Register, Register),               // 8XY3
    Add(Register, Register),               // 8XY4
    Sub(Register, Register),               // 8XY5
    ShiftRight(Register, Register),        // 8XY6
    SubNeg(Register, Register),            // 8XY7
    ShiftLeft(Register, Register),         // 8XYE
    SkipIfNotEqual(Register, Register),    // 9XY0
    SetIndex(Address),                     // ANNN
    JumpOffset(Address),                   // BNNN
    Random(Register, u8),                  // CXNN
    Draw(Register, Register, u8),          // DXYN
    SkipIfKey(Register),                   // EX9E
    SkipIfNotKey(Register),                // EXA1
    GetDelayTimer(Register),               // FX07
    WaitKey(Register),                     // FX0A
    SetDelayTimer(Register),               // FX15
    SetSoundTimer(Register),               // FX18
    AddToIndex(Register),                  // FX1E
    GlyphAddr(Register),                   // FX29
    StoreBcd(Register),                    // FX33
    StoreRegisters(Register),              // FX55
    LoadRegisters(Register),               // FX65
    Unknown(u16),
}

impl Instruction {
    /// decode a big-endian instruction word, highest nibble first
    pub fn decode(word: u16) -> Instruction {
        let nibbles = (
            (word >> 12) as u8,
            (word >> 8 & 0xf) as u8,
            (word >> 4 & 0xf) as u8,
            (word & 0xf) as u8,
        );
        let nnn = Address(word & 0x0fff);
        let nn = (word & 0xff) as u8;
        let x = Register(nibbles.1);
        let y = Register(nibbles.2);

        match nibbles {
            (0x0, 0x0, 0xe, 0x0) => Instruction::ClearDisplay,
            (0x0, 0x0, 0xe, 0xe) => Instruction::Return,
            (0x1, _, _, _) => Instruction::Jump(nnn),
            (0x2, _, _, _) => Instruction::Call(nnn),
            (0x3, _, _, _) => Instruction::SkipIfEqualConst(x, nn),
            (0x4, _, _, _) => Instruction::SkipIfNotEqualConst(x, nn),
            (0x5, _, _, 0x0) => Instruction::SkipIfEqual(x, y),
            (0x6, _, _, _) => Instruction::SetConst(x, nn),
            (0x7, _, _, _) => Instruction::AddConst(x, nn),
            (0x8, _, _, 0x0) => Instruction::Set(x, y),
            (0x8, _, _, 0x1) => Instruction::Or(x, y),
            (0x8, _, _, 0x2) => Instruction::And(x, y),
            (0x8, _, _, 0x3) => Instruction::Xor(x, y),
            (0x8, _, _, 0x4) => Instruction::Add(x, y),
            (0x8, _, _, 0x5) => Instruction::Sub(x, y),
            (0x8, _, _, 0x6) => Instruction::ShiftRight(x, y),
            (0x8, _, _, 0x7) => Instruction::SubNeg(x, y),
            (0x8, _, _, 0xe) => Instruction::ShiftLeft(x, y),
            (0x9, _, _, 0x0) => Instruction::SkipIfNotEqual(x, y),
            (0xa, _, _, _) => Instruction::SetIndex(nnn),
            (0xb, _, _, _) => Instruction::JumpOffset(nnn),
            (0xc, _, _, _) => Instruction::Random(x, nn),
            (0xd, _, _, n) => Instruction::Draw(x, y, n),
            (0xe, _, 0x9, 0xe) => Instruction::SkipIfKey(x),
            (0xe, _, 0xa, 0x1) => Instruction::SkipIfNotKey(x),
            (0xf, _, 0x0, 0x7) => Instruction::GetDelayTimer(x),
            (0xf, _, 0x0, 0xa) => Instruction::WaitKey(x),
            (0xf, _, 0x1, 0x5) => Instruction::SetDelayTimer(x),
            (0xf, _, 0x1, 0x8) => Instruction::SetSoundTimer(x),
            (0xf, _, 0x1, 0xe) => Instruction::AddToIndex(x),
            (0xf, _, 0x2, 0x9) => Instruction::GlyphAddr(x),
            (0xf, _, 0x3, 0x3) => Instruction::StoreBcd(x),
            (0xf, _, 0x5, 0x5) => Instruction::StoreRegisters(x),
            (0xf, _, 0x6, 0x5) => Instruction::LoadRegisters(x),
            _ => Instruction::Unknown(word),
        }
    }
}

/// Cowgod-style mnemonics, for trace logs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearDisplay => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05x}", a.0),
            Call(a) => write!(f, "CALL {:#05x}", a.0),
            SkipIfEqualConst(x, n) => write!(f, "SE V{:X}, {:#04x}", x.0, n),
            SkipIfNotEqualConst(x, n) => write!(f, "SNE V{:X}, {:#04x}", x.0, n),
            SkipIfEqual(x, y) => write!(f, "SE V{:X}, V{:X}", x.0, y.0),
            SetConst(x, n) => write!(f, "LD V{:X}, {:#04x}", x.0, n),
            AddConst(x, n) => write!(f, "ADD V{:X}, {:#04x}", x.0, n),
            Set(x, y) => write!(f, "LD V{:X}, V{:X}", x.0, y.0),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x.0, y.0),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x.0, y.0),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x.0, y.0),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x.0, y.0),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x.0, y.0),
            ShiftRight(x, y) => write!(f, "SHR V{:X}, V{:X}", x.0, y.0),
            SubNeg(x, y) => write!(f, "SUBN V{:X}, V{:X}", x.0, y.0),
            ShiftLeft(x, y) => write!(f, "SHL V{:X}, V{:X}", x.0, y.0),
            SkipIfNotEqual(x, y) => write!(f, "SNE V{:X}, V{:X}", x.0, y.0),
            SetIndex(a) => write!(f, "LD I, {:#05x}", a.0),
            JumpOffset(a) => write!(f, "JP V0, {:#05x}", a.0),
            Random(x, n) => write!(f, "RND V{:X}, {:#04x}", x.0, n),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x.0, y.0, n),
            SkipIfKey(x) => write!(f, "SKP V{:X}", x.0),
            SkipIfNotKey(x) => write!(f, "SKNP V{:X}", x.0),
            GetDelayTimer(x) => write!(f, "LD V{:X}, DT", x.0),
            WaitKey(x) => write!(f, "LD V{:X}, K", x.0),
            SetDelayTimer(x) => write!(f, "LD DT, V{:X}", x.0),
            SetSoundTimer(x) => write!(f, "LD ST, V{:X}", x.0),
            AddToIndex(x) => write!(f, "ADD I, V{:X}", x.0),
            GlyphAddr(x) => write!(f, "LD F, V{:X}", x.0),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x.0),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x.0),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x.0),
            Unknown(word) => write!(f, "??? {:#06x}", word),
        }
    }
}
