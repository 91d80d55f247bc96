pub mod autoplay;
pub mod sequencer;

pub use autoplay::AutoplayTimer;
pub use sequencer::Sequencer;
