//! Press-and-hold accelerator for the navigation buttons.
//!
//! A press held past [`HOLD_INITIAL_DELAY_MS`] fires a navigation step, then
//! keeps firing with an interval that shrinks as the hold gets longer.

use log::debug;

use crate::deck::Direction;

pub const HOLD_INITIAL_DELAY_MS: u64 = 500;

/// `(elapsed since press, interval until the next step)`, ascending.
pub const HOLD_STAGES: [(u64, u64); 4] = [(0, 150), (2_000, 100), (4_000, 60), (6_000, 30)];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct HoldState {
    direction: Direction,
    started_ms: u64,
    next_fire_ms: u64,
    fired: u32,
}

/// Outcome of lifting the pointer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HoldRelease {
    /// Released before the first repeat: treat as an ordinary click.
    Tap(Direction),
    /// The accelerator already produced steps; no click.
    Held,
    /// No press was active.
    Idle,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HoldAccelerator {
    hold: Option<HoldState>,
}

/// Repeat interval after `elapsed_ms` of holding.
pub fn repeat_interval_ms(elapsed_ms: u64) -> u64 {
    HOLD_STAGES
        .iter()
        .rev()
        .find(|(threshold, _)| elapsed_ms >= *threshold)
        .map_or(HOLD_STAGES[0].1, |(_, interval)| *interval)
}

impl HoldAccelerator {
    pub const fn new() -> Self {
        Self { hold: None }
    }

    pub fn is_active(&self) -> bool {
        self.hold.is_some()
    }

    /// Start a fresh acceleration curve, discarding any previous press.
    pub fn press(&mut self, direction: Direction, now_ms: u64) {
        debug!("hold: press direction={:?} at={}", direction, now_ms);
        self.hold = Some(HoldState {
            direction,
            started_ms: now_ms,
            next_fire_ms: now_ms.saturating_add(HOLD_INITIAL_DELAY_MS),
            fired: 0,
        });
    }

    pub fn release(&mut self, now_ms: u64) -> HoldRelease {
        let Some(hold) = self.hold.take() else {
            return HoldRelease::Idle;
        };

        debug!(
            "hold: release direction={:?} held_ms={} fired={}",
            hold.direction,
            now_ms.saturating_sub(hold.started_ms),
            hold.fired
        );

        if hold.fired == 0 {
            HoldRelease::Tap(hold.direction)
        } else {
            HoldRelease::Held
        }
    }

    /// Pointer left the control or the view is going away.
    pub fn cancel(&mut self) {
        if self.hold.take().is_some() {
            debug!("hold: cancelled");
        }
    }

    /// At most one step per call; the next deadline is measured from `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<Direction> {
        let hold = self.hold.as_mut()?;
        if now_ms < hold.next_fire_ms {
            return None;
        }

        let elapsed = now_ms.saturating_sub(hold.started_ms);
        hold.fired = hold.fired.saturating_add(1);
        hold.next_fire_ms = now_ms.saturating_add(repeat_interval_ms(elapsed));
        Some(hold.direction)
    }
}
