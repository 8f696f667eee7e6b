//! Card-stack state machine: navigation, expansion, drag gestures and the
//! slot targets that drive the card animations.

use heapless::Vec as HeaplessVec;
use log::{debug, warn};

use crate::{
    catalog::{Card, ScriptCatalog, groups_by_category},
    hold::{HoldAccelerator, HoldRelease},
    input::{InputEvent, InputProvider},
    render::{
        AnimationKind, AnimationSpec, CardSlotView, LeavingSlotView, MenuItemView,
        MenuSectionView, MenuView, NavButtonsView, Screen, SlotTarget, enter_style, exit_style,
    },
    settings::Preferences,
    speech::{SpeechOutcome, SpeechOutput, UNSUPPORTED_ALERT, VoiceProvider},
    text_policy::{LOADING_LABEL, counter_label, full_title, short_title},
};

/// Cards rendered at once around the focused card.
pub const VISIBLE_SLOTS: usize = 5;
pub const COLLAPSE_DELAY_MS: u32 = 150;
pub const SPRING_STIFFNESS: f32 = 300.0;
pub const DRAG_OFFSET_THRESHOLD: f32 = 50.0;
pub const DRAG_VELOCITY_THRESHOLD: f32 = 300.0;

/// Approximate time for a spring of `stiffness` to settle visually.
///
/// Deliberately generous: it only has to outlast the real transition.
pub fn settle_ms_for_stiffness(stiffness: f32) -> u32 {
    let base = if stiffness > 0.0 {
        1_000.0 / stiffness
    } else {
        0.0
    };
    (base * 5.0 + 300.0).ceil() as u32
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub const fn step(self) -> isize {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }

    pub const fn from_delta(delta: isize) -> Option<Self> {
        if delta > 0 {
            Some(Self::Forward)
        } else if delta < 0 {
            Some(Self::Backward)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeckConfig {
    /// Navigation lock after an index change.
    pub settle_ms: u32,
    /// Wait between collapsing an expanded card and moving.
    pub collapse_delay_ms: u32,
    pub drag_offset_threshold: f32,
    pub drag_velocity_threshold: f32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            settle_ms: settle_ms_for_stiffness(SPRING_STIFFNESS),
            collapse_delay_ms: COLLAPSE_DELAY_MS,
            drag_offset_threshold: DRAG_OFFSET_THRESHOLD,
            drag_velocity_threshold: DRAG_VELOCITY_THRESHOLD,
        }
    }
}

/// Index change deferred until the collapse animation has played.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PendingStep {
    direction: Direction,
    due_ms: u64,
}

pub struct DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    catalog: C,
    input: IN,
    speech: SP,
    config: DeckConfig,
    group_id: Option<String>,
    cards: Vec<Card>,
    current_index: usize,
    previous_index: usize,
    expanded_card: Option<String>,
    transition: Option<AnimationSpec>,
    pending_step: Option<PendingStep>,
    hold: HoldAccelerator,
    voice: VoiceProvider,
    menu_open: bool,
    alert: Option<&'static str>,
    pending_redraw: bool,
    exit_requested: bool,
}

include!("view.rs");
include!("input.rs");
include!("runtime.rs");
include!("navigation.rs");

impl<C, IN, SP> DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    /// Switch the active card list. Unknown ids are ignored; load failures
    /// leave an empty deck.
    pub fn select_group(&mut self, group_id: &str, now_ms: u64) {
        if self.catalog.group(group_id).is_none() {
            warn!("deck: select unknown group={}", group_id);
            return;
        }

        self.hold.cancel();
        self.speech.cancel();
        self.load_group(group_id);
        self.menu_open = false;
        debug!(
            "deck: selected group={} cards={} at={}",
            group_id,
            self.cards.len(),
            now_ms
        );
        self.pending_redraw = true;
    }

    pub fn select_voice(&mut self, voice: VoiceProvider) {
        if voice != self.voice {
            debug!("deck: voice {} -> {}", self.voice.as_str(), voice.as_str());
            self.speech.cancel();
            self.voice = voice;
            self.pending_redraw = true;
        }
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        self.pending_redraw = true;
    }

    /// Speak the focused card, or stop if something is already speaking.
    pub fn toggle_speech(&mut self) {
        if self.speech.is_speaking() {
            self.speech.cancel();
            self.pending_redraw = true;
            return;
        }

        let Some(card) = self.cards.get(self.current_index) else {
            return;
        };

        let outcome = self.speech.speak(&card.english_text, self.voice);
        self.note_speech_outcome(outcome);
        self.pending_redraw = true;
    }

    pub fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.pending_redraw = true;
        }
    }

    /// Stop timers and speech before the view goes away.
    pub fn shutdown(&mut self) {
        self.hold.cancel();
        self.pending_step = None;
        self.transition = None;
        self.speech.cancel();
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            group_id: self.group_id.clone(),
            last_index: self.current_index,
            voice: self.voice,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn previous_index(&self) -> usize {
        self.previous_index
    }

    pub fn expanded_card(&self) -> Option<&str> {
        self.expanded_card.as_deref()
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn voice(&self) -> VoiceProvider {
        self.voice
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn alert(&self) -> Option<&'static str> {
        self.alert
    }

    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn speech(&self) -> &SP {
        &self.speech
    }

    fn load_group(&mut self, group_id: &str) {
        self.cards = match self.catalog.load_cards(group_id) {
            Ok(cards) => cards,
            Err(err) => {
                warn!("catalog: failed to load group={}: {}", group_id, err);
                Vec::new()
            }
        };
        self.group_id = Some(group_id.to_string());
        self.current_index = 0;
        self.previous_index = 0;
        self.expanded_card = None;
        self.transition = None;
        self.pending_step = None;
    }

    fn note_speech_outcome(&mut self, outcome: SpeechOutcome) {
        if outcome == SpeechOutcome::Unsupported {
            self.alert = Some(UNSUPPORTED_ALERT);
        }
    }
}
