pub mod terminal;

pub use terminal::{CommandError, TerminalInput, parse_command};
