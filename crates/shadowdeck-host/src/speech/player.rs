use std::io::{self, Write};

use log::debug;
use shadowdeck_core::speech::AudioPlayer;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::process::{CommandLine, ProcessError, RunningChild};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to stage audio: {0}")]
    Stage(#[from] io::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Plays endpoint audio by writing it to a temporary `.mp3` file and handing
/// the path to a player command such as `mpg123 -q`.
#[derive(Debug)]
pub struct ProcessPlayer {
    command: CommandLine,
    running: RunningChild,
    staged: Option<NamedTempFile>,
}

impl ProcessPlayer {
    pub fn new(command: CommandLine) -> Self {
        Self {
            command,
            running: RunningChild::default(),
            staged: None,
        }
    }
}

impl AudioPlayer for ProcessPlayer {
    type Error = PlaybackError;

    fn play(&mut self, audio: Vec<u8>) -> Result<(), Self::Error> {
        self.stop();

        let mut staged = tempfile::Builder::new()
            .prefix("shadowdeck-")
            .suffix(".mp3")
            .tempfile()?;
        staged.write_all(&audio)?;
        staged.flush()?;

        let child = self.command.spawn(None, staged.path())?;
        debug!(
            "speech: playing {} bytes pid={} via {}",
            audio.len(),
            child.id(),
            self.command.program
        );
        self.running.start(child);
        self.staged = Some(staged);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.stop();
        self.staged = None;
    }

    fn is_playing(&mut self) -> bool {
        let playing = self.running.is_running();
        if !playing {
            self.staged = None;
        }
        playing
    }
}
