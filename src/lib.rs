pub use audio::{AudioSink, Mute};
pub use chip8::Chip8;
pub use error::{Error, Result};
pub use instruction::Instruction;
pub use state::FrameBuffer;

mod audio;
mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
