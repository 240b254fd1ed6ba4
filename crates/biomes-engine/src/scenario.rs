//! Scripted console scenarios.
//!
//! A scenario file describes a small world (actors, their regions, balances
//! and tiers) and a list of biome changes to run against it, the way a
//! console operator would issue them. Names are resolved to IDs once, in
//! [`Scenario::build`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use biomes_core::{BiomeCatalog, InMemoryFunds, InMemoryRegistry, Settings, StaticTiers};
use biomes_types::{
    Actor, ActorId, BlockPos, BoundedRegion, RegionId, UpdateMode, UpdateRequest, WorldId,
};

use crate::error::EngineError;

/// Environment variable that overrides the scenario file location.
pub const SCENARIO_PATH_ENV: &str = "BIOMES_SCENARIO";

/// Scenario file used when [`SCENARIO_PATH_ENV`] is not set.
pub const DEFAULT_SCENARIO_PATH: &str = "biomes-scenario.yaml";

// -----------------------------------------------------------------------
// File format
// -----------------------------------------------------------------------

/// A scenario as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Whether an economy is configured (enables cost checks).
    #[serde(default = "default_true")]
    pub economy: bool,

    /// Whether a tier provider is configured (enables tier checks).
    #[serde(default = "default_true")]
    pub tiers: bool,

    /// Actors, keyed by name.
    #[serde(default)]
    pub actors: Vec<ActorEntry>,

    /// Owned regions.
    #[serde(default)]
    pub regions: Vec<RegionEntry>,

    /// Biome info listings to print.
    #[serde(default)]
    pub info: Vec<InfoEntry>,

    /// Biome changes to run, in order.
    #[serde(default)]
    pub changes: Vec<ChangeEntry>,
}

/// An actor entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActorEntry {
    /// Unique display name.
    pub name: String,
    /// World name the actor is in.
    pub world: String,
    /// Current position.
    #[serde(default)]
    pub position: BlockPos,
    /// Granted permission nodes.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Whether the actor has an interactive session.
    #[serde(default = "default_true")]
    pub interactive: bool,
    /// Starting balance.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// Tier in the actor's world.
    #[serde(default)]
    pub tier: Option<u64>,
}

/// A region entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionEntry {
    /// Owner's name.
    pub owner: String,
    /// World name.
    pub world: String,
    /// Center block.
    pub center: BlockPos,
    /// Half-extent.
    pub range: u32,
}

/// An info listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfoEntry {
    /// Who receives the listing.
    pub actor: String,
    /// Biome identifier.
    pub biome: String,
}

/// A biome change entry. Missing fields fall back to [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeEntry {
    /// Acting actor's name.
    pub actor: String,
    /// Target actor's name. Defaults to the acting actor.
    #[serde(default)]
    pub target: Option<String>,
    /// World name. Defaults to the target's current world.
    #[serde(default)]
    pub world: Option<String>,
    /// Biome identifier.
    pub biome: String,
    /// Update mode.
    #[serde(default)]
    pub mode: Option<UpdateMode>,
    /// Chunk count or square side.
    #[serde(default)]
    pub size: Option<i32>,
    /// Whether to withdraw the cost.
    #[serde(default)]
    pub withdraw: Option<bool>,
}

const fn default_true() -> bool {
    true
}

impl Scenario {
    /// Scenario file location: `$BIOMES_SCENARIO`, else `biomes-scenario.yaml`.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(SCENARIO_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_SCENARIO_PATH), PathBuf::from)
    }

    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Scenario {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] if the YAML is invalid.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        serde_yml::from_str(yaml).map_err(|e| EngineError::Scenario {
            message: format!("failed to parse scenario YAML: {e}"),
        })
    }

    /// Resolve names to IDs and build the in-memory collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActor`] if a region names an owner that
    /// is not listed under `actors`.
    pub fn build(&self) -> Result<ScenarioWorld, EngineError> {
        let mut worlds = BTreeMap::new();
        let mut actors = BTreeMap::new();
        let mut funds = InMemoryFunds::new();
        let mut tiers = StaticTiers::new();

        for entry in &self.actors {
            let world = world_id(&mut worlds, &entry.world);
            let actor = Actor {
                id: ActorId::new(),
                name: entry.name.clone(),
                world,
                position: entry.position,
                permissions: entry.permissions.clone(),
                interactive: entry.interactive,
            };
            if let Some(balance) = entry.balance {
                funds = funds.with_balance(actor.id, balance);
            }
            if let Some(tier) = entry.tier {
                tiers = tiers.with_tier(actor.id, world, tier);
            }
            actors.insert(entry.name.clone(), actor);
        }

        let mut registry = InMemoryRegistry::new();
        for entry in &self.regions {
            let owner = actors
                .get(&entry.owner)
                .ok_or_else(|| EngineError::UnknownActor(entry.owner.clone()))?;
            registry.insert(BoundedRegion {
                id: RegionId::new(),
                owner: owner.id,
                world: world_id(&mut worlds, &entry.world),
                center: entry.center,
                range: entry.range,
            });
        }

        info!(
            worlds = worlds.len(),
            actors = actors.len(),
            regions = registry.len(),
            "Scenario world built"
        );

        Ok(ScenarioWorld {
            worlds,
            actors,
            registry: Arc::new(registry),
            funds: self.economy.then(|| Arc::new(funds)),
            tiers: self.tiers.then(|| Arc::new(tiers)),
        })
    }
}

fn world_id(worlds: &mut BTreeMap<String, WorldId>, name: &str) -> WorldId {
    *worlds.entry(name.to_owned()).or_default()
}

// -----------------------------------------------------------------------
// Resolved world
// -----------------------------------------------------------------------

/// A scenario with names resolved to IDs.
#[derive(Debug)]
pub struct ScenarioWorld {
    /// World IDs by name.
    pub worlds: BTreeMap<String, WorldId>,
    /// Actors by name.
    pub actors: BTreeMap<String, Actor>,
    /// Region registry.
    pub registry: Arc<InMemoryRegistry>,
    /// Economy, if enabled.
    pub funds: Option<Arc<InMemoryFunds>>,
    /// Tier provider, if enabled.
    pub tiers: Option<Arc<StaticTiers>>,
}

impl ScenarioWorld {
    /// Look up an actor by name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActor`] if no actor has that name.
    pub fn actor(&self, name: &str) -> Result<&Actor, EngineError> {
        self.actors
            .get(name)
            .ok_or_else(|| EngineError::UnknownActor(name.to_owned()))
    }

    /// Turn a change entry into a request, filling gaps from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActor`] or [`EngineError::UnknownBiome`]
    /// if a name does not resolve.
    pub fn request(
        &self,
        change: &ChangeEntry,
        catalog: &BiomeCatalog,
        settings: &Settings,
    ) -> Result<UpdateRequest, EngineError> {
        let acting = self.actor(&change.actor)?;
        let target = match &change.target {
            Some(name) => self.actor(name)?,
            None => acting,
        };
        let biome = catalog
            .get(&change.biome)
            .ok_or_else(|| EngineError::UnknownBiome(change.biome.clone()))?;
        let world = change
            .world
            .as_ref()
            .and_then(|name| self.worlds.get(name).copied())
            .unwrap_or(target.world);

        Ok(UpdateRequest {
            acting: acting.clone(),
            target: target.clone(),
            world,
            biome: biome.clone(),
            mode: change.mode.unwrap_or(settings.default_mode),
            magnitude: change.size.unwrap_or(settings.default_size),
            withdraw_funds: change.withdraw.unwrap_or(settings.withdraw_funds),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use biomes_core::{BiomesConfig, FundsProvider, RegionRegistry, TierProvider};
    use rust_decimal_macros::dec;

    use super::*;

    const SCENARIO: &str = r"
actors:
  - name: alex
    world: overworld
    position: { x: 10, y: 64, z: 12 }
    permissions: [biomes.set.desert]
    balance: 40
    tier: 7
  - name: console
    world: overworld
    interactive: false
regions:
  - owner: alex
    world: overworld
    center: { x: 0, z: 0 }
    range: 64
changes:
  - actor: alex
    biome: desert
    mode: chunk
    size: 2
  - actor: console
    target: alex
    biome: DESERT
";

    fn catalog() -> (BiomeCatalog, Settings) {
        let config = BiomesConfig::parse("biomes:\n  - biome: DESERT\n    cost: 10\n").unwrap();
        (
            BiomeCatalog::from_config("overworld", &config.biomes),
            config.settings,
        )
    }

    #[test]
    fn build_resolves_names_and_collaborators() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let world = scenario.build().unwrap();

        let alex = world.actor("alex").unwrap();
        let overworld = *world.worlds.get("overworld").unwrap();
        assert_eq!(world.worlds.len(), 1);
        assert!(alex.interactive);
        assert!(!world.actor("console").unwrap().interactive);
        assert!(world.registry.owned_region(overworld, alex.id).is_some());
        assert_eq!(world.funds.as_ref().map(|f| f.balance(alex.id)), Some(dec!(40)));
        assert!(world.funds.as_ref().unwrap().has_at_least(alex.id, dec!(40)));
        assert_eq!(
            world.tiers.as_ref().and_then(|t| t.current_tier(alex.id, overworld)),
            Some(7)
        );
    }

    #[test]
    fn disabled_economy_and_tiers_are_absent() {
        let yaml = format!("economy: false\ntiers: false\n{SCENARIO}");
        let world = Scenario::parse(&yaml).unwrap().build().unwrap();
        assert!(world.funds.is_none());
        assert!(world.tiers.is_none());
    }

    #[test]
    fn requests_fall_back_to_settings() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let world = scenario.build().unwrap();
        let (catalog, settings) = catalog();

        let own = world
            .request(scenario.changes.first().unwrap(), &catalog, &settings)
            .unwrap();
        assert!(own.is_self_service());
        assert_eq!(own.mode, UpdateMode::Chunk);
        assert_eq!(own.magnitude, 2);

        let console = world
            .request(scenario.changes.get(1).unwrap(), &catalog, &settings)
            .unwrap();
        assert!(!console.is_self_service());
        assert_eq!(console.mode, settings.default_mode);
        assert_eq!(console.magnitude, settings.default_size);
        assert_eq!(console.world, console.target.world);
        assert!(console.withdraw_funds);
    }

    #[test]
    fn unknown_names_are_errors() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let world = scenario.build().unwrap();
        let (catalog, settings) = catalog();

        let mut change = scenario.changes.first().unwrap().clone();
        change.biome = String::from("mesa");
        assert!(matches!(
            world.request(&change, &catalog, &settings),
            Err(EngineError::UnknownBiome(name)) if name == "mesa"
        ));

        change.actor = String::from("nobody");
        assert!(matches!(
            world.request(&change, &catalog, &settings),
            Err(EngineError::UnknownActor(name)) if name == "nobody"
        ));
    }

    #[test]
    fn region_with_unknown_owner_is_rejected() {
        let yaml = "regions:\n  - owner: ghost\n    world: w\n    center: { x: 0, z: 0 }\n    range: 5\n";
        let result = Scenario::parse(yaml).unwrap().build();
        assert!(matches!(result, Err(EngineError::UnknownActor(name)) if name == "ghost"));
    }
}
