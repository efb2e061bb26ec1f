/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian. Which instruction an opcode
/// encodes depends on some combination of:
/// - `(n, _, _, _)` the family; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within the arithmetic and `5`/`9` families
/// - `(_, _, n, n)` specific behavior within the `E` and `F` families
/// - `(_, n, n, n)` a fixed function within the `0` family (e.g. CLS; clear screen)
///
/// Operands are always found in the same place regardless of family:
/// - `[_nnn]` a 12-bit address
/// - `[__kk]` an 8-bit immediate
/// - `[_x__]` the register Vx, or the last register of the range V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a 4-bit immediate (sprite height)
pub trait Opcode {
    /// Returns the Opcode's component nibbles, most significant first.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// The register index held in the second nibble.
    /// `[_x__]`
    fn x(&self) -> usize;

    /// The register index held in the third nibble.
    /// `[__y_]`
    fn y(&self) -> usize;

    /// The Opcode's fourth nibble.
    /// `[___n]`
    fn n(&self) -> u8;

    /// The Opcode's least significant byte.
    /// `[__kk]`
    fn kk(&self) -> u8;

    /// The Opcode without its most significant nibble.
    /// `[_nnn]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            ((self & 0xF000) >> 12) as u8,
            ((self & 0x0F00) >> 8) as u8,
            ((self & 0x00F0) >> 4) as u8,
            self.n(),
        )
    }

    fn x(&self) -> usize {
        ((self & 0x0F00) >> 8) as usize
    }

    fn y(&self) -> usize {
        ((self & 0x00F0) >> 4) as usize
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }
}
