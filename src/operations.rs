use std::ops::Range;

use rand::Rng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, FONT_GLYPH_SIZE, FONT_START, MEMORY_SIZE,
    STACK_DEPTH,
};
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::state::State;

impl Instruction {
    /// Applies this instruction to `state`, including the program counter update.
    ///
    /// Memory ranges are checked before anything is written, so an `Err` leaves
    /// `state` exactly as it was.
    pub fn execute<R: Rng>(self, state: &mut State, rng: &mut R) -> Result<()> {
        match self {
            Instruction::Clear => {
                state.frame_buffer.iter_mut().for_each(|pixel| *pixel = 0);
                state.draw_flag = true;
                state.next();
            }
            Instruction::Return => {
                if state.sp == 0 {
                    return Err(Error::StackUnderflow { address: state.pc });
                }
                state.sp -= 1;
                // land on the instruction after the call
                state.pc = state.stack[state.sp] + 0x2;
            }
            Instruction::Jump { addr } => state.pc = addr,
            Instruction::Call { addr } => {
                if state.sp == STACK_DEPTH {
                    return Err(Error::StackOverflow { address: state.pc });
                }
                state.stack[state.sp] = state.pc;
                state.sp += 1;
                state.pc = addr;
            }
            Instruction::SkipEqImm { x, kk } => state.skip_if(state.v[x] == kk),
            Instruction::SkipNeImm { x, kk } => state.skip_if(state.v[x] != kk),
            Instruction::SkipEqReg { x, y } => state.skip_if(state.v[x] == state.v[y]),
            Instruction::SkipNeReg { x, y } => state.skip_if(state.v[x] != state.v[y]),
            Instruction::Load { x, kk } => {
                state.v[x] = kk;
                state.next();
            }
            Instruction::AddImm { x, kk } => {
                state.v[x] = state.v[x].wrapping_add(kk);
                state.next();
            }
            Instruction::Move { x, y } => {
                state.v[x] = state.v[y];
                state.next();
            }
            Instruction::Or { x, y } => {
                state.v[x] |= state.v[y];
                state.next();
            }
            Instruction::And { x, y } => {
                state.v[x] &= state.v[y];
                state.next();
            }
            Instruction::Xor { x, y } => {
                state.v[x] ^= state.v[y];
                state.next();
            }
            Instruction::AddReg { x, y } => {
                let (res, carry) = state.v[x].overflowing_add(state.v[y]);
                state.set_flag_and(x, carry, res);
            }
            Instruction::Sub { x, y } => {
                let (vx, vy) = (state.v[x], state.v[y]);
                state.set_flag_and(x, vx > vy, vx.wrapping_sub(vy));
            }
            Instruction::ShiftRight { x } => {
                let vx = state.v[x];
                state.set_flag_and(x, vx & 0x1 == 0x1, vx >> 1);
            }
            Instruction::SubN { x, y } => {
                let (vx, vy) = (state.v[x], state.v[y]);
                state.set_flag_and(x, vy > vx, vy.wrapping_sub(vx));
            }
            Instruction::ShiftLeft { x } => {
                let vx = state.v[x];
                state.set_flag_and(x, vx & 0x80 == 0x80, vx << 1);
            }
            Instruction::LoadIndex { addr } => {
                state.i = addr;
                state.next();
            }
            Instruction::JumpOffset { addr } => {
                state.pc = (u16::from(state.v[0x0]) + addr) & 0x0FFF;
            }
            Instruction::Random { x, kk } => {
                state.v[x] = rng.gen::<u8>() & kk;
                state.next();
            }
            Instruction::Draw { x, y, n } => draw(state, x, y, n)?,
            Instruction::SkipPressed { x } => state.skip_if(state.key(x) == Some(true)),
            Instruction::SkipNotPressed { x } => state.skip_if(state.key(x) == Some(false)),
            Instruction::ReadDelay { x } => {
                state.v[x] = state.delay_timer;
                state.next();
            }
            Instruction::WaitKey { x } => {
                // busy-wait: without a pressed key the PC stays put and this re-executes
                if let Some(key) = state.pressed_keys.iter().position(|&pressed| pressed) {
                    state.v[x] = key as u8;
                    state.next();
                }
            }
            Instruction::SetDelay { x } => {
                state.delay_timer = state.v[x];
                state.next();
            }
            Instruction::SetSound { x } => {
                // any nonzero duration plays a single tone
                state.sound_timer = if state.v[x] == 0 { 0 } else { 1 };
                state.next();
            }
            Instruction::AddIndex { x } => {
                state.i = state.i.saturating_add(u16::from(state.v[x]));
                state.next();
            }
            Instruction::LoadGlyph { x } => {
                state.i = FONT_START + u16::from(state.v[x]) * FONT_GLYPH_SIZE;
                state.next();
            }
            Instruction::Bcd { x } => {
                let range = memory_range(state.i, 3)?;
                let vx = state.v[x];
                state.memory[range].copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
                state.next();
            }
            Instruction::Store { x } => {
                let range = memory_range(state.i, x + 1)?;
                state.memory[range].copy_from_slice(&state.v[..=x]);
                state.next();
            }
            Instruction::Read { x } => {
                let range = memory_range(state.i, x + 1)?;
                state.v[..=x].copy_from_slice(&state.memory[range]);
                state.i = state.i.saturating_add(x as u16 + 1);
                state.next();
            }
        }
        Ok(())
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at memory I..I+n onto the FrameBuffer at (Vx, Vy), wrapping at the edges.
/// Sets VF if any lit pixel is erased.
fn draw(state: &mut State, x: usize, y: usize, n: u8) -> Result<()> {
    let rows = memory_range(state.i, n as usize)?;
    let origin_x = state.v[x] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y] as usize % DISPLAY_HEIGHT;

    let mut collision = false;
    for (row, &byte) in state.memory[rows].iter().enumerate() {
        let py = (origin_y + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            if byte & (0x80 >> bit) == 0 {
                continue;
            }
            let px = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = &mut state.frame_buffer[py * DISPLAY_WIDTH + px];
            collision |= *pixel == 1;
            *pixel ^= 1;
        }
    }

    state.v[FLAG_REGISTER] = collision as u8;
    state.draw_flag = true;
    state.next();
    Ok(())
}

/// The memory indices `start..start + len`, or the first address past the end of memory.
pub(crate) fn memory_range(start: u16, len: usize) -> Result<Range<usize>> {
    let start = start as usize;
    if start + len > MEMORY_SIZE {
        return Err(Error::OutOfBounds {
            address: start.max(MEMORY_SIZE),
        });
    }
    Ok(start..start + len)
}

impl State {
    fn next(&mut self) {
        self.pc += 0x2;
    }

    fn skip_if(&mut self, condition: bool) {
        self.pc += if condition { 0x4 } else { 0x2 };
    }

    /// Pressed status of the key named by Vx, or None when Vx names no key
    fn key(&self, x: usize) -> Option<bool> {
        self.pressed_keys.get(self.v[x] as usize).copied()
    }

    /// VF = flag, then Vx = result; when x is VF the result wins
    fn set_flag_and(&mut self, x: usize, flag: bool, result: u8) {
        self.v[FLAG_REGISTER] = flag as u8;
        self.v[x] = result;
        self.next();
    }
}
