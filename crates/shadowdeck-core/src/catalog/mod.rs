//! Script groups and the cards that belong to them.

mod static_source;

pub use static_source::{
    FRIENDS_S01E01_CARDS, StaticCatalog, StaticCatalogError, default_friends_catalog,
};

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

/// One displayable sentence with its translation and explanation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub english_text: String,
    pub japanese_translation: String,
    pub explanation: String,
}

/// Named, ordered collection of cards (for example one episode's lines).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(rename = "scriptIds", alias = "memberIds", default)]
    pub member_ids: Vec<String>,
}

impl Group {
    /// Scalar detail rendered as text (`"Friends"`, `"1"`). Empty strings,
    /// zero and `false` count as absent.
    pub fn detail(&self, key: &str) -> Option<String> {
        match self.details.as_ref()?.get(key)? {
            serde_json::Value::String(value) if !value.is_empty() => Some(value.clone()),
            serde_json::Value::Number(value) if value.as_f64().is_some_and(|n| n != 0.0) => {
                Some(value.to_string())
            }
            serde_json::Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

/// Read-only catalog of groups with lazily loaded card lists.
pub trait ScriptCatalog {
    type Error: core::fmt::Display;

    fn groups(&self) -> &[Group];

    /// Load the cards of one group in display order.
    fn load_cards(&mut self, group_id: &str) -> Result<Vec<Card>, Self::Error>;

    fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups().iter().find(|group| group.id == group_id)
    }
}

/// Reorder `cards` by the group's member list.
///
/// An empty member list keeps file order. Listed ids without a card are
/// skipped; cards not listed are dropped.
pub fn order_by_members(group: &Group, cards: Vec<Card>) -> Vec<Card> {
    if group.member_ids.is_empty() {
        return cards;
    }

    let mut by_id: BTreeMap<String, Card> =
        cards.into_iter().map(|card| (card.id.clone(), card)).collect();

    let mut ordered = Vec::with_capacity(group.member_ids.len());
    for member in &group.member_ids {
        match by_id.remove(member) {
            Some(card) => ordered.push(card),
            None => debug!("catalog: group={} member={} has no card", group.id, member),
        }
    }

    if !by_id.is_empty() {
        debug!(
            "catalog: group={} dropped {} unlisted cards",
            group.id,
            by_id.len()
        );
    }

    ordered
}

/// Categories in first-appearance order, each with its groups.
pub fn groups_by_category(groups: &[Group]) -> Vec<(&str, Vec<&Group>)> {
    let mut sections: Vec<(&str, Vec<&Group>)> = Vec::new();

    for group in groups {
        match sections
            .iter_mut()
            .find(|(category, _)| *category == group.category)
        {
            Some((_, members)) => members.push(group),
            None => sections.push((group.category.as_str(), vec![group])),
        }
    }

    sections
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
