impl<C, IN, SP> DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    fn process_inputs(&mut self, now_ms: u64) {
        loop {
            match self.input.poll_event() {
                Ok(Some(event)) => self.apply_input_event(event, now_ms),
                Ok(None) => break,
                Err(_) => {
                    warn!("deck: input provider failed, cancelling hold");
                    self.hold.cancel();
                    break;
                }
            }
        }
    }

    pub fn apply_input_event(&mut self, event: InputEvent, now_ms: u64) {
        match event {
            InputEvent::NavPressed(direction) => {
                if self.can_go(direction) {
                    self.hold.press(direction, now_ms);
                } else {
                    debug!("deck-nav: press on disabled button direction={:?}", direction);
                }
            }
            InputEvent::NavReleased => match self.hold.release(now_ms) {
                HoldRelease::Tap(direction) if self.can_go(direction) => {
                    self.navigate(direction, now_ms)
                }
                _ => {}
            },
            InputEvent::NavCancelled => self.hold.cancel(),
            InputEvent::TapCard(card_id) => self.tap_card(&card_id, now_ms),
            InputEvent::DragReleased {
                offset_y,
                velocity_y,
            } => {
                // Only the focused, collapsed card carries a drag handle.
                if self.expanded_card.is_none() {
                    self.release_drag(offset_y, velocity_y, now_ms);
                }
            }
            InputEvent::ToggleSpeech => self.toggle_speech(),
            InputEvent::SelectGroup(group_id) => self.select_group(&group_id, now_ms),
            InputEvent::SelectVoice(voice) => self.select_voice(voice),
            InputEvent::ToggleMenu => self.toggle_menu(),
            InputEvent::DismissAlert => self.dismiss_alert(),
            InputEvent::Quit => {
                self.shutdown();
                self.exit_requested = true;
            }
        }
    }
}
