use std::collections::BTreeMap;

use thiserror::Error;

use super::{Card, Group, ScriptCatalog, order_by_members};

/// Built-in sample lines used until a catalog directory is configured.
/// Columns: id, English, Japanese, explanation.
pub const FRIENDS_S01E01_CARDS: [(&str, &str, &str, &str); 3] = [
    (
        "1",
        "There's nothing to tell! He's just some guy I work with!",
        "話すことなんて何もないわ！ただの仕事仲間よ！",
        "\"There's nothing to tell\" is a common way to deflect curiosity about a rumour.",
    ),
    (
        "2",
        "C'mon, you're going out with the guy! There's gotta be something wrong with him!",
        "だってその人とデートするんでしょ！何か問題があるはずよ！",
        "\"Gotta be\" is the spoken form of \"has got to be\", expressing strong certainty.",
    ),
    (
        "3",
        "Just, 'cause, I don't want her to go through what I went through with Carl- oh!",
        "ただ、私がカールとの時に経験したことを彼女に味わってほしくないの…あっ！",
        "\"Go through\" means to experience something difficult.",
    ),
];

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StaticCatalogError {
    #[error("unknown group: {0}")]
    UnknownGroup(String),
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    groups: Vec<Group>,
    cards: BTreeMap<String, Vec<Card>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group and its cards. A group with the same id is replaced.
    pub fn with_group(mut self, group: Group, cards: Vec<Card>) -> Self {
        self.groups.retain(|existing| existing.id != group.id);
        self.cards.insert(group.id.clone(), cards);
        self.groups.push(group);
        self
    }
}

impl ScriptCatalog for StaticCatalog {
    type Error = StaticCatalogError;

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn load_cards(&mut self, group_id: &str) -> Result<Vec<Card>, Self::Error> {
        let group = self
            .group(group_id)
            .ok_or_else(|| StaticCatalogError::UnknownGroup(group_id.to_string()))?;
        let cards = self.cards.get(group_id).cloned().unwrap_or_default();
        Ok(order_by_members(group, cards))
    }
}

pub fn default_friends_catalog() -> StaticCatalog {
    let cards: Vec<Card> = FRIENDS_S01E01_CARDS
        .iter()
        .map(|(id, english, japanese, explanation)| Card {
            id: id.to_string(),
            english_text: english.to_string(),
            japanese_translation: japanese.to_string(),
            explanation: explanation.to_string(),
        })
        .collect();

    let mut details = BTreeMap::new();
    details.insert("series".to_string(), serde_json::Value::from("Friends"));
    details.insert("season".to_string(), serde_json::Value::from(1));
    details.insert("episode".to_string(), serde_json::Value::from(1));

    let group = Group {
        id: "friends-s01e01".to_string(),
        title: "Friends Season 1 Episode 1: The One Where Monica Gets a Roommate".to_string(),
        category: "TV Series".to_string(),
        sub_category: Some("Friends".to_string()),
        description: None,
        details: Some(details),
        member_ids: cards.iter().map(|card| card.id.clone()).collect(),
    };

    StaticCatalog::new().with_group(group, cards)
}
