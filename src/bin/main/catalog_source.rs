use std::path::Path;

use log::info;
use shadowdeck_core::catalog::{
    Card, Group, ScriptCatalog, StaticCatalog, StaticCatalogError, default_friends_catalog,
};
use shadowdeck_host::storage::{CatalogError, DirCatalog};
use thiserror::Error;

/// Catalog chosen at startup: a data directory or the built-in sample group.
pub(super) enum CatalogSource {
    Directory(DirCatalog),
    Builtin(StaticCatalog),
}

#[derive(Debug, Error)]
pub(super) enum CatalogSourceError {
    #[error(transparent)]
    Directory(#[from] CatalogError),
    #[error(transparent)]
    Builtin(#[from] StaticCatalogError),
}

impl CatalogSource {
    pub(super) fn open(data_dir: Option<&Path>) -> Result<Self, CatalogError> {
        match data_dir {
            Some(dir) => Ok(Self::Directory(DirCatalog::open(dir)?)),
            None => {
                info!("catalog: no data directory, using the built-in sample group");
                Ok(Self::Builtin(default_friends_catalog()))
            }
        }
    }
}

impl ScriptCatalog for CatalogSource {
    type Error = CatalogSourceError;

    fn groups(&self) -> &[Group] {
        match self {
            Self::Directory(catalog) => catalog.groups(),
            Self::Builtin(catalog) => catalog.groups(),
        }
    }

    fn load_cards(&mut self, group_id: &str) -> Result<Vec<Card>, Self::Error> {
        Ok(match self {
            Self::Directory(catalog) => catalog.load_cards(group_id)?,
            Self::Builtin(catalog) => catalog.load_cards(group_id)?,
        })
    }
}
