//! Plain-text rendering of the deck for a terminal.

use std::fmt::Write;

use shadowdeck_core::{
    deck::Direction,
    render::{
        AnimationFrame, AnimationKind, CardSlotView, MenuView, NavButtonsView, Screen, SlotTarget,
    },
};

use super::FrameRenderer;

const DEFAULT_WIDTH: usize = 72;

#[derive(Debug, Clone)]
pub struct TextRenderer {
    width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl TextRenderer {
    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.max(24),
        }
    }

    fn rule(&self, frame: &mut String) {
        frame.push_str(&"-".repeat(self.width));
        frame.push('\n');
    }

    fn render_slot(&self, slot: &CardSlotView<'_>, frame: &mut String) {
        // Hidden slots are fully transparent.
        if slot.style.opacity <= 0.0 {
            return;
        }

        let marker = match slot.target {
            SlotTarget::Current | SlotTarget::NextToCurrent | SlotTarget::PrevToCurrent => '>',
            _ => ' ',
        };
        let body = self.width.saturating_sub(8);
        let _ = writeln!(
            frame,
            "{marker} [{:>2}] {}",
            slot.card.id,
            clip(&slot.card.english_text, body)
        );

        if marker == '>' {
            let _ = writeln!(frame, "       {}", clip(&slot.card.japanese_translation, body));
        }
        if slot.expanded && !slot.card.explanation.is_empty() {
            for line in wrap(&slot.card.explanation, body) {
                let _ = writeln!(frame, "       | {line}");
            }
        }
    }

    fn render_menu(&self, menu: &MenuView<'_>, frame: &mut String) {
        self.rule(frame);
        for section in &menu.sections {
            let _ = writeln!(frame, "{}", section.category);
            for item in &section.items {
                let marker = if item.selected { '*' } else { ' ' };
                let _ = writeln!(
                    frame,
                    " {marker} {}  ({})",
                    clip(item.title, self.width.saturating_sub(8)),
                    item.group_id
                );
            }
        }
        let _ = writeln!(frame, "voice: {}", menu.selected_voice.as_str());
    }
}

impl FrameRenderer for TextRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut String) {
        frame.clear();

        match screen {
            Screen::Empty { title, menu, alert } => {
                let _ = writeln!(frame, "{}", clip(title, self.width));
                self.rule(frame);
                frame.push_str("(no cards)\n");
                if let Some(menu) = menu {
                    self.render_menu(&menu, frame);
                }
                render_alert(alert, frame);
            }
            Screen::Deck {
                title,
                short_title,
                counter,
                slots,
                leaving: _,
                nav,
                speaking,
                voice,
                animation,
                menu,
                alert,
            } => {
                let status = if speaking { "speaking" } else { "" };
                let _ = writeln!(
                    frame,
                    "{}  {}  [{}] {}",
                    short_title,
                    counter,
                    voice.as_str(),
                    status
                );
                if menu.is_some() {
                    let _ = writeln!(frame, "{}", clip(title, self.width));
                }
                self.rule(frame);
                for slot in slots {
                    self.render_slot(slot, frame);
                }
                self.rule(frame);
                render_nav(nav, animation, frame);
                if let Some(menu) = menu {
                    self.render_menu(&menu, frame);
                }
                render_alert(alert, frame);
            }
        }
    }
}

fn render_nav(nav: NavButtonsView, animation: Option<AnimationFrame>, frame: &mut String) {
    let prev = if nav.prev_enabled { "[p]rev" } else { " prev " };
    let next = if nav.next_enabled { "[n]ext" } else { " next " };
    let _ = write!(frame, "{prev}  {next}");
    // Progress is left out so a redraw only happens when the layout changes.
    match animation.map(|anim| anim.kind) {
        Some(AnimationKind::Step(Direction::Forward)) => frame.push_str("  [v]"),
        Some(AnimationKind::Step(Direction::Backward)) => frame.push_str("  [^]"),
        Some(AnimationKind::Jump) => frame.push_str("  [jump]"),
        None => {}
    }
    frame.push('\n');
}

fn render_alert(alert: Option<&str>, frame: &mut String) {
    if let Some(alert) = alert {
        let _ = writeln!(frame, "! {alert}  (ok to dismiss)");
    }
}

/// Cut `text` to `width` characters, marking the cut with `...`.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(core::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
