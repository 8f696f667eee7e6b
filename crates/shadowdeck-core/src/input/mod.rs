//! Input abstraction layer.

pub mod mock;

use crate::{deck::Direction, speech::VoiceProvider};

/// Logical actions consumed by the deck.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer went down on a navigation button.
    NavPressed(Direction),
    /// Pointer went up on the button it pressed.
    NavReleased,
    /// Pointer left the button while pressed.
    NavCancelled,
    TapCard(String),
    DragReleased { offset_y: f32, velocity_y: f32 },
    ToggleSpeech,
    SelectGroup(String),
    SelectVoice(VoiceProvider),
    ToggleMenu,
    DismissAlert,
    Quit,
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
