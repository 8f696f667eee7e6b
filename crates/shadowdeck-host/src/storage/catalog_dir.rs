use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use shadowdeck_core::catalog::{Card, Group, ScriptCatalog, order_by_members};
use thiserror::Error;

pub const GROUPS_FILE: &str = "scriptGroups.json";
pub const CARDS_DIR: &str = "scripts-by-group";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("group id cannot name a card file: {0}")]
    InvalidGroupId(String),
}

/// Catalog read from a directory holding `scriptGroups.json` and one
/// `scripts-by-group/<group-id>.json` card file per group.
#[derive(Debug)]
pub struct DirCatalog {
    root: PathBuf,
    groups: Vec<Group>,
}

impl DirCatalog {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let root = root.into();
        let groups: Vec<Group> = read_json(&root.join(GROUPS_FILE))?;
        info!(
            "catalog: opened {} groups={}",
            root.display(),
            groups.len()
        );
        Ok(Self { root, groups })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cards_path(&self, group_id: &str) -> Result<PathBuf, CatalogError> {
        let plain = !group_id.is_empty()
            && group_id != "."
            && group_id != ".."
            && !group_id.contains(['/', '\\']);
        if !plain {
            return Err(CatalogError::InvalidGroupId(group_id.to_string()));
        }
        Ok(self.root.join(CARDS_DIR).join(format!("{group_id}.json")))
    }
}

impl ScriptCatalog for DirCatalog {
    type Error = CatalogError;

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn load_cards(&mut self, group_id: &str) -> Result<Vec<Card>, Self::Error> {
        let group = self
            .group(group_id)
            .ok_or_else(|| CatalogError::UnknownGroup(group_id.to_string()))?;
        let path = self.cards_path(group_id)?;
        let cards: Vec<Card> = read_json(&path)?;
        debug!(
            "catalog: loaded group={} cards={} from {}",
            group_id,
            cards.len(),
            path.display()
        );
        Ok(order_by_members(group, cards))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &str = r#"[
        {
            "id": "friends-s01e01",
            "title": "Friends Season 1 Episode 1",
            "category": "TV Series",
            "subCategory": "Friends",
            "details": { "series": "Friends", "season": 1, "episode": 1 },
            "scriptIds": ["2", "1", "9"]
        },
        {
            "id": "greetings",
            "title": "Everyday greetings",
            "category": "Phrases"
        }
    ]"#;

    const FRIENDS: &str = r#"[
        { "id": 1, "englishText": "One", "japaneseTranslation": "一", "explanation": "" },
        { "id": "2", "englishText": "Two", "japaneseTranslation": "二", "explanation": "" },
        { "id": "3", "englishText": "Three", "japaneseTranslation": "三", "explanation": "" }
    ]"#;

    fn catalog_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GROUPS_FILE), GROUPS).unwrap();
        fs::create_dir(dir.path().join(CARDS_DIR)).unwrap();
        fs::write(
            dir.path().join(CARDS_DIR).join("friends-s01e01.json"),
            FRIENDS,
        )
        .unwrap();
        dir
    }

    #[test]
    fn groups_load_with_details() {
        let dir = catalog_dir();
        let catalog = DirCatalog::open(dir.path()).unwrap();
        assert_eq!(catalog.groups().len(), 2);

        let friends = catalog.group("friends-s01e01").unwrap();
        assert_eq!(friends.sub_category.as_deref(), Some("Friends"));
        assert_eq!(friends.detail("season").as_deref(), Some("1"));
        assert!(catalog.group("greetings").unwrap().member_ids.is_empty());
    }

    #[test]
    fn cards_follow_member_order() {
        let dir = catalog_dir();
        let mut catalog = DirCatalog::open(dir.path()).unwrap();
        let ids: Vec<String> = catalog
            .load_cards("friends-s01e01")
            .unwrap()
            .into_iter()
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn missing_card_file_is_an_io_error() {
        let dir = catalog_dir();
        let mut catalog = DirCatalog::open(dir.path()).unwrap();
        assert!(matches!(
            catalog.load_cards("greetings"),
            Err(CatalogError::Io { .. })
        ));
        assert!(matches!(
            catalog.load_cards("nope"),
            Err(CatalogError::UnknownGroup(_))
        ));
    }

    #[test]
    fn malformed_groups_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GROUPS_FILE), "{}").unwrap();
        assert!(matches!(
            DirCatalog::open(dir.path()),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn path_like_group_ids_are_rejected() {
        let dir = catalog_dir();
        let catalog = DirCatalog::open(dir.path()).unwrap();
        assert!(matches!(
            catalog.cards_path("../secrets"),
            Err(CatalogError::InvalidGroupId(_))
        ));
    }
}
