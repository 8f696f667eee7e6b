//! Process-backed speech: a local synthesizer command and an audio player
//! command for audio returned by the synthesis endpoint.

mod local;
mod player;
mod process;

pub use local::ProcessSpeech;
pub use player::{PlaybackError, ProcessPlayer};
pub use process::{CommandLine, ProcessError};
