use log::{debug, info};
use shadowdeck_core::speech::LocalSpeech;

use super::process::{CommandLine, ProcessError, RunningChild};

/// Built-in voice backed by a speech command such as `espeak-ng -v {lang}`.
/// The text is passed as the last argument.
#[derive(Debug)]
pub struct ProcessSpeech {
    command: Option<CommandLine>,
    running: RunningChild,
}

impl ProcessSpeech {
    /// A command that cannot be parsed or found leaves speech unsupported.
    pub fn new(raw_command: &str) -> Self {
        let command = CommandLine::parse(raw_command)
            .ok()
            .filter(CommandLine::is_available);

        match &command {
            Some(command) => info!("speech: built-in voice via {}", command.program),
            None => info!("speech: no built-in voice, {:?} not found", raw_command),
        }

        Self {
            command,
            running: RunningChild::default(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            command: None,
            running: RunningChild::default(),
        }
    }
}

impl LocalSpeech for ProcessSpeech {
    type Error = ProcessError;

    fn is_supported(&self) -> bool {
        self.command.is_some()
    }

    fn speak(&mut self, text: &str, lang: &str) -> Result<(), Self::Error> {
        let command = self.command.as_ref().ok_or(ProcessError::Empty)?;
        let child = command.spawn(Some(lang), text)?;
        debug!("speech: local pid={} lang={}", child.id(), lang);
        self.running.start(child);
        Ok(())
    }

    fn cancel(&mut self) {
        self.running.stop();
    }

    fn is_speaking(&mut self) -> bool {
        self.running.is_running()
    }
}
