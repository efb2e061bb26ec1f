use crate::constants::{
    DISPLAY_SIZE, FONT_START, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_DEPTH,
};

/// The FrameBuffer is row-major; the pixel at (x, y) lives at `y * DISPLAY_WIDTH + x`
pub type FrameBuffer = [u8; DISPLAY_SIZE];

/// A snapshot of the Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack, 0..=16
///
/// Timers
/// - 2 8-bit timers (delay & sound)
/// - both count down once per executed cycle
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x050..0x0A0 holds the sprite sheet
///     - 0x200.. holds the loaded program
/// - 64x32 byte frame buffer, one byte (0 or 1) per pixel
///
/// ## Input
/// - 16 booleans tracking the pressed status of keys 0..F
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub pressed_keys: [bool; KEY_COUNT],
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [0; DISPLAY_SIZE],
            draw_flag: false,
            pressed_keys: [false; KEY_COUNT],
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
