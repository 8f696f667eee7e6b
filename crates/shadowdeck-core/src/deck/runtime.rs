impl<C, IN, SP> DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    fn run_hold(&mut self, now_ms: u64) {
        if let Some(direction) = self.hold.poll(now_ms) {
            self.navigate(direction, now_ms);
        }
    }

    fn run_pending_step(&mut self, now_ms: u64) {
        let Some(step) = self.pending_step else {
            return;
        };

        if now_ms < step.due_ms {
            return;
        }

        self.pending_step = None;
        self.apply_step(step.direction);
        self.pending_redraw = true;
    }

    /// Clears the navigation lock once its window has passed. Only ever
    /// unlocks, so a late tick cannot disturb a newer navigation.
    fn settle_transition(&mut self, now_ms: u64) {
        let Some(transition) = self.transition else {
            return;
        };

        if self.pending_step.is_some() || now_ms < transition.end_ms() {
            return;
        }

        debug!(
            "deck-nav: settled index={} previous={} after={}ms",
            self.current_index,
            self.previous_index,
            now_ms.saturating_sub(transition.start_ms)
        );
        self.transition = None;
        self.pending_redraw = true;
    }

    fn poll_speech(&mut self) {
        if let Some(outcome) = self.speech.poll() {
            debug!("speech: {:?}", outcome);
            self.note_speech_outcome(outcome);
            self.pending_redraw = true;
        }
    }
}
