use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioSink, Mute};
use crate::constants::{KEY_COUNT, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::operations::memory_range;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the random source consumed by `Cxkk`
///  - the `audio` sink told about every active sound timer cycle
///
/// Supplies interfaces for:
/// - loading programs
/// - setting the key latch
/// - advancing the CPU one cycle at a time
/// - inspecting its frame buffer for rendering by some display
/// - inspecting registers for debugging
///
/// The Chip-8 never schedules itself; whoever owns it decides how often to `step`.
pub struct Chip8 {
    state: State,
    rng: StdRng,
    audio: Box<dyn AudioSink>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A Chip-8 whose random numbers are reproducible across runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            rng,
            audio: Box::new(Mute),
        }
    }

    /// Replaces the sink that is told when a tone should sound
    pub fn link_audio(&mut self, audio: Box<dyn AudioSink>) {
        self.audio = audio;
    }

    /// Copies a program into memory starting at 0x200
    ///
    /// # Arguments
    /// * `program` the raw program image; there is no header
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let max = MEMORY_SIZE - start;
        if program.len() > max {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max,
            });
        }
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// Advances the CPU by a single cycle
    /// - gets, decodes and executes the next opcode
    /// - ticks the delay and sound timers
    ///
    /// A failed cycle leaves the state as it was before the call.
    pub fn step(&mut self) -> Result<()> {
        let pc = self.state.pc;
        self.cycle().map_err(|e| {
            debug!("cycle at {:#05X} failed: {}", pc, e);
            e
        })
    }

    fn cycle(&mut self) -> Result<()> {
        let op = self.get_op()?;
        let instruction = Instruction::decode(op, self.state.pc)?;
        trace!(
            "{:03X}: {:04X} {:<16} v{:02X?} i{:04X}",
            self.state.pc,
            op,
            instruction.to_string(),
            self.state.v,
            self.state.i
        );
        instruction.execute(&mut self.state, &mut self.rng)?;
        self.advance_timers();
        Ok(())
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> Result<u16> {
        let range = memory_range(self.state.pc, 2)?;
        let bytes = &self.state.memory[range];
        Ok(u16::from(bytes[0]) << 8 | u16::from(bytes[1]))
    }

    /// Counts both timers down by one; every active sound cycle beeps once
    fn advance_timers(&mut self) {
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
            self.audio.beep();
        }

        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }
    }

    /// Overwrites the pressed status of every key
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.state.pressed_keys = keys;
    }

    /// Sets the pressed status of a single key; keys outside 0..F are ignored
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if let Some(slot) = self.state.pressed_keys.get_mut(key as usize) {
            *slot = pressed;
        }
    }

    /// Whether the frame buffer changed since the last `take_redraw_flag`
    pub fn needs_redraw(&self) -> bool {
        self.state.draw_flag
    }

    /// Clears the redraw flag, returning whether it was set.
    /// Displays call this once they have rendered the frame buffer.
    pub fn take_redraw_flag(&mut self) -> bool {
        std::mem::replace(&mut self.state.draw_flag, false)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    pub fn program_counter(&self) -> u16 {
        self.state.pc
    }

    pub fn index_register(&self) -> u16 {
        self.state.i
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
