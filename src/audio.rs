/// Something that can make a beep.
///
/// The Chip-8 calls `beep` once for every cycle in which its sound timer is active.
pub trait AudioSink {
    fn beep(&mut self);
}

/// An AudioSink that swallows every tone
#[derive(Debug, Default, Clone, Copy)]
pub struct Mute;

impl AudioSink for Mute {
    fn beep(&mut self) {}
}
