use std::fmt;

use crate::error::{Error, Result};
use crate::opcode::Opcode;

/// A decoded Chip-8 instruction.
///
/// Register operands are indices into V0..VF and are always in range by
/// construction since they come from a single nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` clear the frame buffer
    Clear,
    /// `00EE` PC = STACK.pop() + 2
    Return,
    /// `1nnn` PC = nnn
    Jump { addr: u16 },
    /// `2nnn` STACK.push(PC); PC = nnn
    Call { addr: u16 },
    /// `3xkk` skip if Vx == kk
    SkipEqImm { x: usize, kk: u8 },
    /// `4xkk` skip if Vx != kk
    SkipNeImm { x: usize, kk: u8 },
    /// `5xy0` skip if Vx == Vy
    SkipEqReg { x: usize, y: usize },
    /// `6xkk` Vx = kk
    Load { x: usize, kk: u8 },
    /// `7xkk` Vx += kk, no flag
    AddImm { x: usize, kk: u8 },
    /// `8xy0` Vx = Vy
    Move { x: usize, y: usize },
    /// `8xy1` Vx |= Vy
    Or { x: usize, y: usize },
    /// `8xy2` Vx &= Vy
    And { x: usize, y: usize },
    /// `8xy3` Vx ^= Vy
    Xor { x: usize, y: usize },
    /// `8xy4` Vx += Vy; VF = carry
    AddReg { x: usize, y: usize },
    /// `8xy5` Vx -= Vy; VF = Vx > Vy
    Sub { x: usize, y: usize },
    /// `8xy6` Vx >>= 1; VF = lsb
    ShiftRight { x: usize },
    /// `8xy7` Vx = Vy - Vx; VF = Vy > Vx
    SubN { x: usize, y: usize },
    /// `8xyE` Vx <<= 1; VF = msb
    ShiftLeft { x: usize },
    /// `9xy0` skip if Vx != Vy
    SkipNeReg { x: usize, y: usize },
    /// `Annn` I = nnn
    LoadIndex { addr: u16 },
    /// `Bnnn` PC = V0 + nnn
    JumpOffset { addr: u16 },
    /// `Cxkk` Vx = random & kk
    Random { x: usize, kk: u8 },
    /// `Dxyn` draw an n-row sprite from I at (Vx, Vy)
    Draw { x: usize, y: usize, n: u8 },
    /// `Ex9E` skip if key Vx is pressed
    SkipPressed { x: usize },
    /// `ExA1` skip if key Vx is not pressed
    SkipNotPressed { x: usize },
    /// `Fx07` Vx = DT
    ReadDelay { x: usize },
    /// `Fx0A` wait for a key press and store it in Vx
    WaitKey { x: usize },
    /// `Fx15` DT = Vx
    SetDelay { x: usize },
    /// `Fx18` ST = Vx
    SetSound { x: usize },
    /// `Fx1E` I += Vx
    AddIndex { x: usize },
    /// `Fx29` I = address of glyph Vx
    LoadGlyph { x: usize },
    /// `Fx33` mem[I..I+3] = bcd(Vx)
    Bcd { x: usize },
    /// `Fx55` mem[I..=I+x] = V0..=Vx
    Store { x: usize },
    /// `Fx65` V0..=Vx = mem[I..=I+x]; I += x + 1
    Read { x: usize },
}

impl Instruction {
    /// Decodes a raw opcode.
    ///
    /// # Arguments
    /// * `op` the 16-bit opcode
    /// * `address` where `op` was fetched from; only used for error reporting
    pub fn decode(op: u16, address: u16) -> Result<Instruction> {
        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Clear,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, ..) => Instruction::Jump { addr },
            (0x2, ..) => Instruction::Call { addr },
            (0x3, ..) => Instruction::SkipEqImm { x, kk },
            (0x4, ..) => Instruction::SkipNeImm { x, kk },
            (0x5, .., 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, ..) => Instruction::Load { x, kk },
            (0x7, ..) => Instruction::AddImm { x, kk },
            (0x8, .., 0x0) => Instruction::Move { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddReg { x, y },
            (0x8, .., 0x5) => Instruction::Sub { x, y },
            (0x8, .., 0x6) => Instruction::ShiftRight { x },
            (0x8, .., 0x7) => Instruction::SubN { x, y },
            (0x8, .., 0xE) => Instruction::ShiftLeft { x },
            (0x9, .., 0x0) => Instruction::SkipNeReg { x, y },
            (0xA, ..) => Instruction::LoadIndex { addr },
            (0xB, ..) => Instruction::JumpOffset { addr },
            (0xC, ..) => Instruction::Random { x, kk },
            (0xD, ..) => Instruction::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::SkipPressed { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => Instruction::ReadDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Instruction::LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::Store { x },
            (0xF, _, 0x6, 0x5) => Instruction::Read { x },
            _ => return Err(Error::UnsupportedOpcode { opcode: op, address }),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Clear => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { addr } => write!(f, "JP {:#05X}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#05X}", addr),
            Instruction::SkipEqImm { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            Instruction::SkipNeImm { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            Instruction::AddImm { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Instruction::Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x } => write!(f, "SHR V{:X}", x),
            Instruction::SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            Instruction::JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            Instruction::ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            Instruction::Bcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::Store { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::Read { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(op: u16) -> Instruction {
        Instruction::decode(op, 0x200).unwrap()
    }

    #[test]
    fn test_decodes_flow_control() {
        assert_eq!(decode(0x00E0), Instruction::Clear);
        assert_eq!(decode(0x00EE), Instruction::Return);
        assert_eq!(decode(0x1ABC), Instruction::Jump { addr: 0xABC });
        assert_eq!(decode(0x2123), Instruction::Call { addr: 0x123 });
        assert_eq!(decode(0xB300), Instruction::JumpOffset { addr: 0x300 });
    }

    #[test]
    fn test_decodes_skips() {
        assert_eq!(decode(0x3A11), Instruction::SkipEqImm { x: 0xA, kk: 0x11 });
        assert_eq!(decode(0x4A11), Instruction::SkipNeImm { x: 0xA, kk: 0x11 });
        assert_eq!(decode(0x5120), Instruction::SkipEqReg { x: 0x1, y: 0x2 });
        assert_eq!(decode(0x9120), Instruction::SkipNeReg { x: 0x1, y: 0x2 });
        assert_eq!(decode(0xE49E), Instruction::SkipPressed { x: 0x4 });
        assert_eq!(decode(0xE4A1), Instruction::SkipNotPressed { x: 0x4 });
    }

    #[test]
    fn test_decodes_arithmetic_family_by_low_nibble() {
        assert_eq!(decode(0x8120), Instruction::Move { x: 1, y: 2 });
        assert_eq!(decode(0x8121), Instruction::Or { x: 1, y: 2 });
        assert_eq!(decode(0x8122), Instruction::And { x: 1, y: 2 });
        assert_eq!(decode(0x8123), Instruction::Xor { x: 1, y: 2 });
        assert_eq!(decode(0x8124), Instruction::AddReg { x: 1, y: 2 });
        assert_eq!(decode(0x8125), Instruction::Sub { x: 1, y: 2 });
        assert_eq!(decode(0x8126), Instruction::ShiftRight { x: 1 });
        assert_eq!(decode(0x8127), Instruction::SubN { x: 1, y: 2 });
        assert_eq!(decode(0x812E), Instruction::ShiftLeft { x: 1 });
    }

    #[test]
    fn test_decodes_f_family_by_low_byte() {
        assert_eq!(decode(0xF207), Instruction::ReadDelay { x: 2 });
        assert_eq!(decode(0xF20A), Instruction::WaitKey { x: 2 });
        assert_eq!(decode(0xF215), Instruction::SetDelay { x: 2 });
        assert_eq!(decode(0xF218), Instruction::SetSound { x: 2 });
        assert_eq!(decode(0xF21E), Instruction::AddIndex { x: 2 });
        assert_eq!(decode(0xF229), Instruction::LoadGlyph { x: 2 });
        assert_eq!(decode(0xF233), Instruction::Bcd { x: 2 });
        assert_eq!(decode(0xF255), Instruction::Store { x: 2 });
        assert_eq!(decode(0xF265), Instruction::Read { x: 2 });
    }

    #[test]
    fn test_decodes_draw_operands() {
        assert_eq!(decode(0xD12F), Instruction::Draw { x: 1, y: 2, n: 0xF });
    }

    #[test]
    fn test_rejects_unsupported_opcodes() {
        for &op in &[0x0123, 0x00E1, 0x5121, 0x8128, 0x812F, 0x9121, 0xE19F, 0xF1FF] {
            assert_eq!(
                Instruction::decode(op, 0x240),
                Err(Error::UnsupportedOpcode {
                    opcode: op,
                    address: 0x240
                })
            );
        }
    }

    #[test]
    fn test_displays_mnemonics() {
        assert_eq!(decode(0x00E0).to_string(), "CLS");
        assert_eq!(decode(0x6A2F).to_string(), "LD VA, 0x2F");
        assert_eq!(decode(0xD125).to_string(), "DRW V1, V2, 5");
        assert_eq!(decode(0x1234).to_string(), "JP 0x234");
    }
}
