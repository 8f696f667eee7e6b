//! App-level view models and animation metadata.

use crate::{catalog::Card, deck::Direction, speech::VoiceProvider};

pub const ITEM_HEIGHT: f32 = 300.0;
pub const PEEK_SCALE: f32 = 0.85;
pub const PEEK_OPACITY: f32 = 0.5;
pub const EXPANDED_PEEK_OPACITY: f32 = 0.1;
pub const EXPANDED_SCALE: f32 = 1.05;

/// Named animation target of one rendered card.
///
/// The first five are resting positions; the rest are used while a scroll is
/// settling and always start from the previous resting layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SlotTarget {
    Behind,
    Prev,
    Current,
    Next,
    Front,
    PrevToBehind,
    CurrentToPrev,
    NextToCurrent,
    FrontToNext,
    NextToFront,
    CurrentToNext,
    PrevToCurrent,
    BehindToPrev,
}

/// Visual parameters handed to the animation layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotStyle {
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub z_index: u8,
    pub delay_ms: u16,
}

impl SlotStyle {
    const fn at(y: f32, scale: f32, opacity: f32, z_index: u8) -> Self {
        Self {
            y,
            scale,
            opacity,
            z_index,
            delay_ms: 0,
        }
    }

    const fn delayed(mut self, delay_ms: u16) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

const BEHIND_Y: f32 = -ITEM_HEIGHT * 0.5;
const PREV_Y: f32 = 0.0;
const CURRENT_Y: f32 = ITEM_HEIGHT * 0.7;
const NEXT_Y: f32 = ITEM_HEIGHT * 1.4;
const FRONT_Y: f32 = ITEM_HEIGHT * 1.9;
const HIDDEN_SCALE: f32 = PEEK_SCALE * 0.8;

impl SlotTarget {
    pub const fn is_transitional(self) -> bool {
        !matches!(
            self,
            Self::Behind | Self::Prev | Self::Current | Self::Next | Self::Front
        )
    }

    /// `expanded` is the styled card's own expansion state.
    pub fn style(self, expanded: bool) -> SlotStyle {
        let peek_opacity = if expanded {
            EXPANDED_PEEK_OPACITY
        } else {
            PEEK_OPACITY
        };

        match self {
            Self::Behind => SlotStyle::at(BEHIND_Y, HIDDEN_SCALE, 0.0, 0)
                .delayed(if expanded { 150 } else { 50 }),
            Self::Prev => SlotStyle::at(PREV_Y, PEEK_SCALE, peek_opacity, 1)
                .delayed(if expanded { 100 } else { 0 }),
            Self::Current => {
                if expanded {
                    SlotStyle::at(CURRENT_Y, EXPANDED_SCALE, 1.0, 20)
                } else {
                    SlotStyle::at(CURRENT_Y, 1.0, 1.0, 10).delayed(50)
                }
            }
            Self::Next => SlotStyle::at(NEXT_Y, PEEK_SCALE, peek_opacity, 1)
                .delayed(if expanded { 100 } else { 0 }),
            Self::Front => SlotStyle::at(FRONT_Y, HIDDEN_SCALE, 0.0, 0)
                .delayed(if expanded { 150 } else { 50 }),
            Self::PrevToBehind => SlotStyle::at(BEHIND_Y, HIDDEN_SCALE, 0.0, 0),
            Self::CurrentToPrev | Self::BehindToPrev => {
                SlotStyle::at(PREV_Y, PEEK_SCALE, PEEK_OPACITY, 1)
            }
            Self::NextToCurrent | Self::PrevToCurrent => SlotStyle::at(CURRENT_Y, 1.0, 1.0, 10),
            Self::FrontToNext | Self::CurrentToNext => {
                SlotStyle::at(NEXT_Y, PEEK_SCALE, PEEK_OPACITY, 1)
            }
            Self::NextToFront => SlotStyle::at(FRONT_Y, HIDDEN_SCALE, 0.0, 0),
        }
    }
}

/// Style a card starts from when it enters the window.
pub fn enter_style(direction: Option<Direction>) -> SlotStyle {
    let y = match direction {
        Some(Direction::Forward) => FRONT_Y,
        _ => BEHIND_Y,
    };
    SlotStyle::at(y, HIDDEN_SCALE, 0.0, 0)
}

/// Style a card animates to when it leaves the window.
pub fn exit_style(direction: Option<Direction>, expanded: bool) -> SlotStyle {
    let y = match direction {
        Some(Direction::Forward) => BEHIND_Y,
        _ => FRONT_Y,
    };
    SlotStyle::at(y, HIDDEN_SCALE, 0.0, 0).delayed(if expanded { 150 } else { 50 })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnimationKind {
    Step(Direction),
    Jump,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnimationFrame {
    pub kind: AnimationKind,
    /// 0..=100
    pub progress_pct: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnimationSpec {
    pub kind: AnimationKind,
    pub start_ms: u64,
    pub duration_ms: u32,
}

impl AnimationSpec {
    pub const fn new(kind: AnimationKind, start_ms: u64, duration_ms: u32) -> Self {
        Self {
            kind,
            start_ms,
            duration_ms,
        }
    }

    pub fn end_ms(self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms as u64)
    }

    pub fn frame(self, now_ms: u64) -> Option<AnimationFrame> {
        let duration = self.duration_ms.max(1) as u64;
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed >= duration {
            return None;
        }

        let progress = ((elapsed * 100) / duration).min(100) as u8;
        Some(AnimationFrame {
            kind: self.kind,
            progress_pct: progress,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSlotView<'a> {
    /// Absolute index into the active card list.
    pub index: usize,
    pub card: &'a Card,
    pub target: SlotTarget,
    pub style: SlotStyle,
    pub expanded: bool,
    pub draggable: bool,
    /// Set while scrolling for a card that was outside the previous window.
    pub enter_from: Option<SlotStyle>,
}

/// A card that dropped out of the window during the current scroll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeavingSlotView<'a> {
    pub index: usize,
    pub card: &'a Card,
    pub style: SlotStyle,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NavButtonsView {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MenuItemView<'a> {
    pub group_id: &'a str,
    pub title: &'a str,
    pub selected: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MenuSectionView<'a> {
    pub category: &'a str,
    pub items: Vec<MenuItemView<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MenuView<'a> {
    pub sections: Vec<MenuSectionView<'a>>,
    pub selected_voice: VoiceProvider,
}

/// App-level view model consumed by the host renderer.
pub enum Screen<'a> {
    Empty {
        title: &'a str,
        menu: Option<MenuView<'a>>,
        alert: Option<&'a str>,
    },
    Deck {
        title: &'a str,
        short_title: &'a str,
        counter: &'a str,
        slots: &'a [CardSlotView<'a>],
        leaving: &'a [LeavingSlotView<'a>],
        nav: NavButtonsView,
        speaking: bool,
        voice: VoiceProvider,
        animation: Option<AnimationFrame>,
        menu: Option<MenuView<'a>>,
        alert: Option<&'a str>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_focus_grows_and_rises_above_peeks() {
        let resting = SlotTarget::Current.style(false);
        let expanded = SlotTarget::Current.style(true);
        assert_eq!(resting.scale, 1.0);
        assert_eq!(expanded.scale, EXPANDED_SCALE);
        assert!(expanded.z_index > resting.z_index);
        assert_eq!(SlotTarget::Next.style(true).opacity, EXPANDED_PEEK_OPACITY);
    }

    #[test]
    fn transitional_targets_land_on_resting_geometry() {
        let pairs = [
            (SlotTarget::PrevToBehind, SlotTarget::Behind),
            (SlotTarget::CurrentToPrev, SlotTarget::Prev),
            (SlotTarget::NextToCurrent, SlotTarget::Current),
            (SlotTarget::FrontToNext, SlotTarget::Next),
            (SlotTarget::NextToFront, SlotTarget::Front),
            (SlotTarget::CurrentToNext, SlotTarget::Next),
            (SlotTarget::PrevToCurrent, SlotTarget::Current),
            (SlotTarget::BehindToPrev, SlotTarget::Prev),
        ];
        for (moving, resting) in pairs {
            assert!(moving.is_transitional());
            assert!(!resting.is_transitional());
            let a = moving.style(false);
            let b = resting.style(false);
            assert_eq!((a.y, a.scale, a.opacity, a.z_index), (b.y, b.scale, b.opacity, b.z_index));
        }
    }

    #[test]
    fn entering_and_leaving_follow_scroll_direction() {
        assert_eq!(enter_style(Some(Direction::Forward)).y, FRONT_Y);
        assert_eq!(enter_style(Some(Direction::Backward)).y, BEHIND_Y);
        assert_eq!(exit_style(Some(Direction::Forward), false).y, BEHIND_Y);
        assert_eq!(exit_style(None, true).delay_ms, 150);
    }

    #[test]
    fn animation_frame_expires() {
        let spec = AnimationSpec::new(AnimationKind::Jump, 100, 200);
        assert_eq!(spec.frame(200).map(|f| f.progress_pct), Some(50));
        assert_eq!(spec.frame(300), None);
        assert_eq!(spec.end_ms(), 300);
    }
}
