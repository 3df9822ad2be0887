use serde::Deserialize;
use tracing::debug;

use crate::core::error::CatalogError;

use super::catalog::Catalog;
use super::materials::{tag_mask, Archetype, MaterialId, Movement, Tag};
use super::rules::Rule;

impl Catalog {
    /// Build a catalog from a JSON content bundle.
    ///
    /// Id 0 is implicitly empty and cannot be defined; 255 is the
    /// out-of-bounds sentinel.
    pub fn from_bundle_json(json: &str) -> Result<Self, CatalogError> {
        let bundle: BundleRoot = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    fn from_bundle(bundle: BundleRoot) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();

        for el in bundle.materials.into_iter() {
            if el.id > MaterialId::MAX as u16 {
                return Err(CatalogError::IdOutOfRange(el.id));
            }
            let id = el.id as MaterialId;

            let archetype = Archetype {
                name: el.name,
                color: el.color,
                movement: el.movement,
                tags: tag_mask(&el.tags),
                immobile: el.immobile,
                spawner: el.spawner,
                creature: el.creature,
                handler: el.handler,
                rules: el.rules,
            };
            catalog.insert(id, archetype)?;
        }

        debug!(materials = catalog.material_count(), "content bundle loaded");
        Ok(catalog)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleRoot {
    materials: Vec<BundleMaterial>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleMaterial {
    id: u16,
    name: String,
    #[serde(default)]
    color: u32,
    #[serde(default, flatten)]
    movement: Movement,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    immobile: bool,
    #[serde(default)]
    spawner: bool,
    #[serde(default)]
    creature: bool,
    #[serde(default)]
    handler: Option<String>,
    #[serde(default)]
    rules: Vec<Rule>,
}
