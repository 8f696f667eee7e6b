//! Persisted user preferences.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::speech::VoiceProvider;

pub const GROUP_KEY: &str = "shadowing-card-current-group";
pub const LAST_INDEX_KEY: &str = "shadowing-card-last-index";
pub const VOICE_KEY: &str = "shadowing-card-voice";

pub const SAVE_DEBOUNCE_MS: u64 = 1_500;

/// Abstract string key/value persistence backend.
pub trait KeyValueStore {
    type Error: core::fmt::Display;

    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Volatile store for tests and runs without a preference file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences that should survive a restart.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Preferences {
    pub group_id: Option<String>,
    /// Unvalidated; the deck clamps it against the loaded card list.
    pub last_index: usize,
    pub voice: VoiceProvider,
}

impl Preferences {
    /// Read preferences, silently replacing malformed values with defaults.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let group_id = store
            .get(GROUP_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let last_index = store
            .get(LAST_INDEX_KEY)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let voice = store
            .get(VOICE_KEY)
            .and_then(|value| VoiceProvider::parse(value.trim()))
            .unwrap_or_default();

        debug!(
            "prefs: loaded group={:?} last_index={} voice={}",
            group_id,
            last_index,
            voice.as_str()
        );

        Self {
            group_id,
            last_index,
            voice,
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), S::Error> {
        if let Some(group_id) = self.group_id.as_deref() {
            store.set(GROUP_KEY, group_id)?;
        }
        store.set(LAST_INDEX_KEY, &self.last_index.to_string())?;
        store.set(VOICE_KEY, self.voice.as_str())
    }
}

/// Debounced writer: a changed snapshot is saved once it has been stable for
/// [`SAVE_DEBOUNCE_MS`].
#[derive(Debug, Clone)]
pub struct PreferenceSync {
    last_saved: Preferences,
    pending: Option<(Preferences, u64)>,
}

impl PreferenceSync {
    pub fn new(initial: Preferences) -> Self {
        Self {
            last_saved: initial,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn track_current(&mut self, current: Preferences, now_ms: u64) {
        if current == self.last_saved {
            self.pending = None;
            return;
        }

        match self.pending.as_mut() {
            Some((pending, changed_at_ms)) => {
                if *pending != current {
                    *pending = current;
                    *changed_at_ms = now_ms;
                }
            }
            None => {
                self.pending = Some((current, now_ms));
            }
        }
    }

    pub fn flush_if_due<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, now_ms: u64) {
        let Some((_, changed_at_ms)) = self.pending.as_ref() else {
            return;
        };

        if now_ms.saturating_sub(*changed_at_ms) < SAVE_DEBOUNCE_MS {
            return;
        }

        self.write(store, now_ms);
    }

    /// Write any pending change immediately (shutdown path).
    pub fn flush<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, now_ms: u64) {
        if self.pending.is_some() {
            self.write(store, now_ms);
        }
    }

    fn write<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, now_ms: u64) {
        let Some((candidate, _)) = self.pending.take() else {
            return;
        };

        match candidate.save(store) {
            Ok(()) => {
                debug!("prefs: saved {:?}", candidate);
                self.last_saved = candidate;
            }
            Err(err) => {
                warn!("prefs: save failed, retrying later: {}", err);
                self.pending = Some((candidate, now_ms));
            }
        }
    }
}
