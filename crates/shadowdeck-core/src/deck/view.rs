impl<C, IN, SP> DeckApp<C, IN, SP>
where
    C: ScriptCatalog,
    IN: InputProvider,
    SP: SpeechOutput,
{
    /// Build the deck and restore the saved group, card and voice.
    ///
    /// A saved group missing from the catalog falls back to the first group;
    /// a saved index outside the loaded list falls back to 0.
    pub fn new(
        catalog: C,
        input: IN,
        speech: SP,
        config: DeckConfig,
        restored: &Preferences,
    ) -> Self {
        let mut app = Self {
            catalog,
            input,
            speech,
            config,
            group_id: None,
            cards: Vec::new(),
            current_index: 0,
            previous_index: 0,
            expanded_card: None,
            transition: None,
            pending_step: None,
            hold: HoldAccelerator::new(),
            voice: restored.voice,
            menu_open: false,
            alert: None,
            pending_redraw: true,
            exit_requested: false,
        };

        let saved_group = restored
            .group_id
            .as_deref()
            .filter(|id| app.catalog.group(id).is_some())
            .map(str::to_string);
        let initial_group = saved_group
            .clone()
            .or_else(|| app.catalog.groups().first().map(|group| group.id.clone()));

        if let Some(group_id) = initial_group {
            app.load_group(&group_id);

            let restorable = saved_group.as_deref() == Some(group_id.as_str());
            if restorable && restored.last_index < app.cards.len() {
                app.current_index = restored.last_index;
                app.previous_index = restored.last_index;
            } else if restored.last_index != 0 {
                debug!(
                    "prefs: discarded last_index={} for group={} cards={}",
                    restored.last_index,
                    group_id,
                    app.cards.len()
                );
            }
        }

        app
    }

    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        self.process_inputs(now_ms);
        self.run_hold(now_ms);
        self.run_pending_step(now_ms);
        self.settle_transition(now_ms);
        self.poll_speech();

        if self.pending_redraw || self.transition_frame(now_ms).is_some() {
            self.pending_redraw = false;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    pub fn with_screen<F>(&self, now_ms: u64, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        let group = self
            .group_id
            .as_deref()
            .and_then(|id| self.catalog.group(id));
        let menu = self.menu_open.then(|| self.menu_view());

        if self.cards.is_empty() {
            f(Screen::Empty {
                title: group.map_or(LOADING_LABEL, |group| group.title.as_str()),
                menu,
                alert: self.alert,
            });
            return;
        }

        let short = short_title(group);
        let counter = counter_label(self.current_index, self.cards.len());
        let scroll = self.scroll_direction();
        let visible = self.visible_indices();
        let previous_window = self.window_around(self.previous_index);

        let slots: HeaplessVec<CardSlotView<'_>, VISIBLE_SLOTS> = visible
            .iter()
            .filter_map(|&index| {
                let card = self.cards.get(index)?;
                let target = self.slot_target(index);
                let card_expanded = self.is_expanded(card);
                Some(CardSlotView {
                    index,
                    card,
                    target,
                    style: target.style(card_expanded),
                    expanded: card_expanded,
                    draggable: index == self.current_index
                        && !card_expanded
                        && !self.is_animating(),
                    enter_from: scroll
                        .filter(|_| !previous_window.contains(&index))
                        .map(|direction| enter_style(Some(direction))),
                })
            })
            .collect();

        let leaving: HeaplessVec<LeavingSlotView<'_>, VISIBLE_SLOTS> = match scroll {
            Some(direction) => previous_window
                .iter()
                .copied()
                .filter(|index| !visible.contains(index))
                .filter_map(|index| {
                    let card = self.cards.get(index)?;
                    Some(LeavingSlotView {
                        index,
                        card,
                        style: exit_style(Some(direction), self.is_expanded(card)),
                    })
                })
                .collect(),
            None => HeaplessVec::new(),
        };

        f(Screen::Deck {
            title: full_title(group),
            short_title: &short,
            counter: &counter,
            slots: &slots,
            leaving: &leaving,
            nav: NavButtonsView {
                prev_enabled: self.can_go(Direction::Backward),
                next_enabled: self.can_go(Direction::Forward),
            },
            speaking: self.speech.is_speaking(),
            voice: self.voice,
            animation: self.transition_frame(now_ms),
            menu,
            alert: self.alert,
        });
    }

    /// Scroll direction of the running transition, if the index moved.
    fn scroll_direction(&self) -> Option<Direction> {
        if !self.is_animating() {
            return None;
        }
        Direction::from_delta(self.current_index as isize - self.previous_index as isize)
    }

    fn is_expanded(&self, card: &Card) -> bool {
        self.expanded_card.as_deref() == Some(card.id.as_str())
    }

    fn menu_view(&self) -> MenuView<'_> {
        let current = self.group_id.as_deref();
        let sections = groups_by_category(self.catalog.groups())
            .into_iter()
            .map(|(category, groups)| MenuSectionView {
                category,
                items: groups
                    .into_iter()
                    .map(|group| MenuItemView {
                        group_id: group.id.as_str(),
                        title: group.title.as_str(),
                        selected: current == Some(group.id.as_str()),
                    })
                    .collect(),
            })
            .collect();

        MenuView {
            sections,
            selected_voice: self.voice,
        }
    }
}
