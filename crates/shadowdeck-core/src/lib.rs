//! Card-stack navigation, speech dispatch and preference handling for the
//! shadowing flashcard viewer. Platform glue lives in `shadowdeck-host`.

pub mod catalog;
pub mod deck;
pub mod hold;
pub mod input;
pub mod render;
pub mod settings;
pub mod speech;
pub mod text_policy;
