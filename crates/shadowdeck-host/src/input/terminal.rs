//! Line-oriented terminal input: one command per line, read on a background
//! thread and turned into deck input events.

use std::{
    collections::VecDeque,
    io::{self, BufRead},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use log::{debug, warn};
use shadowdeck_core::{
    deck::Direction,
    input::{InputEvent, InputProvider},
    speech::VoiceProvider,
};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  n | next          next card (p | prev for the previous one)
  press n|p         hold a navigation button; release | leave ends it
  tap <card-id>     focus or expand a card
  drag <dy> [vy]    release a vertical drag (negative is up)
  s | speak         speak or stop the focused card
  group <id>        switch script group
  voice <name>      browser, google-us, google-uk or google-au
  m | menu          toggle the group menu
  ok                dismiss the alert
  q | quit          exit";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("unknown voice: {0}")]
    UnknownVoice(String),
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
}

/// Input closed without a quit command.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[error("terminal input closed")]
pub struct InputClosed;

pub fn parse_command(line: &str) -> Result<Vec<InputEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };
    let argument = words.next();

    let events = match command.to_ascii_lowercase().as_str() {
        "n" | "next" | "down" => click(Direction::Forward),
        "p" | "prev" | "up" => click(Direction::Backward),
        "press" => {
            let raw = argument.ok_or(CommandError::MissingArgument("press"))?;
            vec![InputEvent::NavPressed(parse_direction(raw)?)]
        }
        "release" => vec![InputEvent::NavReleased],
        "leave" => vec![InputEvent::NavCancelled],
        "tap" => {
            let id = argument.ok_or(CommandError::MissingArgument("tap"))?;
            vec![InputEvent::TapCard(id.to_string())]
        }
        "drag" => {
            let offset_y = parse_number(argument.ok_or(CommandError::MissingArgument("drag"))?)?;
            let velocity_y = words.next().map(parse_number).transpose()?.unwrap_or(0.0);
            vec![InputEvent::DragReleased {
                offset_y,
                velocity_y,
            }]
        }
        "s" | "speak" => vec![InputEvent::ToggleSpeech],
        "group" => {
            let id = argument.ok_or(CommandError::MissingArgument("group"))?;
            vec![InputEvent::SelectGroup(id.to_string())]
        }
        "voice" => {
            let raw = argument.ok_or(CommandError::MissingArgument("voice"))?;
            let voice = VoiceProvider::parse(&raw.to_ascii_lowercase())
                .ok_or_else(|| CommandError::UnknownVoice(raw.to_string()))?;
            vec![InputEvent::SelectVoice(voice)]
        }
        "m" | "menu" => vec![InputEvent::ToggleMenu],
        "ok" | "dismiss" => vec![InputEvent::DismissAlert],
        "q" | "quit" | "exit" => vec![InputEvent::Quit],
        _ => return Err(CommandError::Unknown(command.to_string())),
    };

    Ok(events)
}

fn click(direction: Direction) -> Vec<InputEvent> {
    vec![InputEvent::NavPressed(direction), InputEvent::NavReleased]
}

fn parse_direction(raw: &str) -> Result<Direction, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "n" | "next" | "down" => Ok(Direction::Forward),
        "p" | "prev" | "up" => Ok(Direction::Backward),
        _ => Err(CommandError::UnknownDirection(raw.to_string())),
    }
}

fn parse_number(raw: &str) -> Result<f32, CommandError> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber(raw.to_string()))
}

/// Input provider fed by a line reader on a background thread. End of input
/// becomes a quit.
#[derive(Debug)]
pub struct TerminalInput {
    lines: Receiver<String>,
    pending: VecDeque<InputEvent>,
    closed: bool,
}

impl TerminalInput {
    pub fn stdin() -> Self {
        Self::spawn(|| io::stdin().lock())
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::spawn(move || reader)
    }

    fn spawn<F, R>(open: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: BufRead,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("terminal-input".to_string())
            .spawn(move || {
                for line in open().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            warn!("input: read failed: {}", err);
                            break;
                        }
                    }
                }
                let _ = tx.send("quit".to_string());
            });

        if let Err(err) = spawned {
            warn!("input: failed to start reader: {}", err);
        }

        Self {
            lines: rx,
            pending: VecDeque::new(),
            closed: false,
        }
    }
}

impl InputProvider for TerminalInput {
    type Error = InputClosed;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.closed {
                return Err(InputClosed);
            }

            let line = match self.lines.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    continue;
                }
            };

            match parse_command(&line) {
                Ok(events) => {
                    debug!("input: {:?} -> {} events", line.trim(), events.len());
                    self.pending.extend(events);
                }
                Err(CommandError::Unknown(command)) if command == "help" || command == "?" => {
                    println!("{HELP}");
                }
                Err(err) => println!("{err}\n{HELP}"),
            }
        }
    }
}
