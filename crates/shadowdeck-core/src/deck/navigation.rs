impl<C, IN, SP> DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    /// Step one card. Ignored while animating or with no cards; out-of-range
    /// steps still lock navigation for one settle window.
    pub fn navigate(&mut self, direction: Direction, now_ms: u64) {
        if self.cards.is_empty() || self.is_animating() {
            return;
        }

        self.previous_index = self.current_index;
        self.start_transition(AnimationKind::Step(direction), now_ms);

        if self.expanded_card.take().is_some() {
            let due_ms = now_ms.saturating_add(self.config.collapse_delay_ms as u64);
            debug!(
                "deck-nav: collapse then step direction={:?} from={} due={}",
                direction, self.current_index, due_ms
            );
            self.pending_step = Some(PendingStep { direction, due_ms });
        } else {
            self.apply_step(direction);
        }

        self.pending_redraw = true;
    }

    /// Tap on a card: jump to a non-focused card, or toggle the focused one.
    pub fn tap_card(&mut self, card_id: &str, now_ms: u64) {
        if self.is_animating() {
            return;
        }

        let Some(tapped) = self.cards.iter().position(|card| card.id == card_id) else {
            return;
        };

        if tapped == self.current_index {
            self.expanded_card = match self.expanded_card.take() {
                Some(expanded) if expanded == card_id => None,
                _ => Some(card_id.to_string()),
            };
            debug!(
                "deck-nav: toggle expand card={} expanded={}",
                card_id,
                self.expanded_card.is_some()
            );
        } else {
            debug!(
                "deck-nav: jump from={} to={} card={}",
                self.current_index, tapped, card_id
            );
            self.expanded_card = None;
            self.previous_index = self.current_index;
            self.current_index = tapped;
            self.start_transition(AnimationKind::Jump, now_ms);
        }

        self.pending_redraw = true;
    }

    /// Vertical drag released on the focused card. Negative values are upward.
    pub fn release_drag(&mut self, offset_y: f32, velocity_y: f32, now_ms: u64) {
        if self.is_animating() {
            return;
        }

        let offset_limit = self.config.drag_offset_threshold;
        let velocity_limit = self.config.drag_velocity_threshold;

        if offset_y < -offset_limit || velocity_y < -velocity_limit {
            self.navigate(Direction::Forward, now_ms);
        } else if offset_y > offset_limit || velocity_y > velocity_limit {
            self.navigate(Direction::Backward, now_ms);
        } else {
            // Card springs back in the view.
            self.pending_redraw = true;
        }
    }

    /// Animation target for the card at absolute `index`.
    pub fn slot_target(&self, index: usize) -> SlotTarget {
        let index = index as isize;
        let current = self.current_index as isize;
        let previous = self.previous_index as isize;

        if self.is_animating() {
            match Direction::from_delta(current - previous) {
                Some(Direction::Forward) => {
                    return match index - previous {
                        -1 => SlotTarget::PrevToBehind,
                        0 => SlotTarget::CurrentToPrev,
                        1 => SlotTarget::NextToCurrent,
                        2 => SlotTarget::FrontToNext,
                        offset if offset < -1 => SlotTarget::Behind,
                        _ => SlotTarget::Front,
                    };
                }
                Some(Direction::Backward) => {
                    return match index - previous {
                        1 => SlotTarget::NextToFront,
                        0 => SlotTarget::CurrentToNext,
                        -1 => SlotTarget::PrevToCurrent,
                        -2 => SlotTarget::BehindToPrev,
                        offset if offset > 1 => SlotTarget::Front,
                        _ => SlotTarget::Behind,
                    };
                }
                None => {}
            }
        }

        match index - current {
            -1 => SlotTarget::Prev,
            0 => SlotTarget::Current,
            1 => SlotTarget::Next,
            offset if offset < -1 => SlotTarget::Behind,
            _ => SlotTarget::Front,
        }
    }

    /// Up to [`VISIBLE_SLOTS`] indices around the focused card, shifted to
    /// stay inside the list near either end.
    pub fn visible_indices(&self) -> HeaplessVec<usize, VISIBLE_SLOTS> {
        self.window_around(self.current_index)
    }

    fn window_around(&self, center: usize) -> HeaplessVec<usize, VISIBLE_SLOTS> {
        let count = self.cards.len().min(VISIBLE_SLOTS);
        let start = center
            .saturating_sub(VISIBLE_SLOTS / 2)
            .min(self.cards.len() - count);

        let mut indices = HeaplessVec::new();
        for index in start..start + count {
            let _ = indices.push(index);
        }
        indices
    }

    /// Whether the navigation button for `direction` should look enabled.
    pub fn can_go(&self, direction: Direction) -> bool {
        if self.cards.is_empty() || self.expanded_card.is_some() || self.is_animating() {
            return false;
        }

        match direction {
            Direction::Backward => self.current_index > 0,
            Direction::Forward => self.current_index + 1 < self.cards.len(),
        }
    }

    fn apply_step(&mut self, direction: Direction) {
        let target = self.current_index as isize + direction.step();
        if (0..self.cards.len() as isize).contains(&target) {
            self.current_index = target as usize;
            debug!(
                "deck-nav: step direction={:?} from={} to={}",
                direction, self.previous_index, self.current_index
            );
        } else {
            debug!(
                "deck-nav: step direction={:?} blocked at={} total={}",
                direction,
                self.current_index,
                self.cards.len()
            );
        }
    }

    fn start_transition(&mut self, kind: AnimationKind, now_ms: u64) {
        self.transition = Some(AnimationSpec::new(kind, now_ms, self.config.settle_ms));
    }

    fn transition_frame(&self, now_ms: u64) -> Option<crate::render::AnimationFrame> {
        self.transition.and_then(|anim| anim.frame(now_ms))
    }
}
