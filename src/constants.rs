/// Total addressable memory in bytes (0x000..=0xFFF)
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded into memory starting at this address
pub const PROGRAM_START: u16 = 0x200;

/// The sprite sheet is loaded into memory starting at this address
pub const FONT_START: u16 = 0x050;

/// Each glyph in the sprite sheet is 5 rows (bytes) tall
pub const FONT_GLYPH_SIZE: u16 = 5;

/// Maximum number of return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Nanoseconds per CPU cycle when driven in real time (~125Hz)
pub const DEFAULT_CLOCK_SPEED: u64 = 8_000_000;

/// # Sprite Sheet
/// Hexadecimal digits 0..F, each encoded as 5 rows of 4 pixels in the high nibble.
///
/// ```text
/// "0"       Binary    Hex
/// ****      11110000  0xF0
/// *  *      10010000  0x90
/// *  *      10010000  0x90
/// *  *      10010000  0x90
/// ****      11110000  0xF0
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
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
