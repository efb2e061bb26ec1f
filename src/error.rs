use thiserror::Error;

/// Failures surfaced by the Chip-8 engine.
///
/// Everything except `ProgramTooLarge` is fatal to a run: the cycle that
/// produced it did not complete and the caller should stop stepping.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported opcode {opcode:#06X} at {address:#05X}")]
    UnsupportedOpcode { opcode: u16, address: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    OutOfBounds { address: usize },

    #[error("stack overflow calling from {address:#05X}")]
    StackOverflow { address: u16 },

    #[error("stack underflow returning from {address:#05X}")]
    StackUnderflow { address: u16 },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
