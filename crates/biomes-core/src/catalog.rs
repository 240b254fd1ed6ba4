//! In-memory biome catalog.
//!
//! Built once from the `biomes` section of the configuration and then only
//! read. Lookups are case-insensitive on the biome identifier; iteration is
//! sorted by identifier.

use std::collections::BTreeMap;

use tracing::{info, warn};

use biomes_types::{Actor, BiomeDefinition, Message, MessageKey, placeholders};

use crate::authorize::format_cost;
use crate::collaborators::MessageSink;
use crate::config::BiomeEntry;

/// Biome definitions available for change requests.
#[derive(Debug, Clone, Default)]
pub struct BiomeCatalog {
    biomes: BTreeMap<String, BiomeDefinition>,
}

impl BiomeCatalog {
    /// Build a catalog for `world_name` from configuration entries.
    ///
    /// Later entries for the same biome replace earlier ones.
    pub fn from_config(world_name: &str, entries: &[BiomeEntry]) -> Self {
        let mut biomes = BTreeMap::new();
        for entry in entries {
            let key = entry.biome.to_ascii_lowercase();
            let definition = BiomeDefinition {
                unique_id: format!("{world_name}_{}", entry.biome),
                biome: entry.biome.to_ascii_uppercase(),
                friendly_name: entry
                    .friendly_name
                    .clone()
                    .unwrap_or_else(|| entry.biome.clone()),
                description: entry.description.clone(),
                required_tier: entry.island_level,
                cost: entry.cost,
                permission: entry.permission.clone(),
            };
            if biomes.insert(key, definition).is_some() {
                warn!(biome = %entry.biome, "Duplicate biome entry, overwriting");
            }
        }
        info!(count = biomes.len(), world = world_name, "Biome catalog loaded");
        Self { biomes }
    }

    /// Look up a biome by identifier, ignoring case.
    pub fn get(&self, biome: &str) -> Option<&BiomeDefinition> {
        self.biomes.get(&biome.to_ascii_lowercase())
    }

    /// All biomes, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &BiomeDefinition> {
        self.biomes.values()
    }

    /// Number of biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Send the info listing for `biome` to `actor`.
    ///
    /// Returns `false` (and sends nothing) if the biome is unknown.
    pub fn describe(&self, actor: &Actor, biome: &str, sink: &dyn MessageSink) -> bool {
        let Some(definition) = self.get(biome) else {
            return false;
        };
        let lines = [
            Message::new(MessageKey::InfoHeader)
                .with(placeholders::NAME, definition.friendly_name.clone()),
            Message::new(MessageKey::InfoType).with(placeholders::TYPE, definition.biome.clone()),
            Message::new(MessageKey::InfoDescription)
                .with(placeholders::DESCRIPTION, single_line(&definition.description)),
            Message::new(MessageKey::InfoLevel)
                .with(placeholders::LEVEL, definition.required_tier.to_string()),
            Message::new(MessageKey::InfoCost).with(placeholders::COST, format_cost(definition.cost)),
        ];
        for line in lines {
            sink.notify(actor, line);
        }
        true
    }
}

/// Collapse a multi-line description onto one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
