//! End-to-end tests for biome change requests.
//!
//! Each test wires the in-memory collaborators to a real mutation queue and
//! drives requests through the public API only.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::Arc;

use biomes_core::{
    BiomeCatalog, BiomeChangeService, BiomesConfig, ChangeOutcome, Collaborators, InMemoryFunds,
    InMemoryRegistry, MutationQueue, RecordingSink, StaticTiers, mutation_queue,
};
use biomes_types::{
    Actor, ActorId, BlockPos, BoundedRegion, DenialReason, MessageKey, RegionId, UpdateMode,
    UpdateRequest, WorldId,
};
use rust_decimal_macros::dec;

const CONFIG: &str = r#"
settings:
  world_name: "sky"
  default_mode: CHUNK
  default_size: 1

biomes:
  - biome: MUSHROOM_FIELDS
    friendly_name: "Mushroom Fields"
    islandLevel: 20
    cost: 75
    permission: "biomes.set.mushroom"
  - biome: PLAINS
"#;

struct World {
    id: WorldId,
    player: Actor,
    visitor: Actor,
    console: Actor,
    catalog: BiomeCatalog,
    config: BiomesConfig,
    funds: Arc<InMemoryFunds>,
    sink: Arc<RecordingSink>,
    service: BiomeChangeService,
    queue: MutationQueue,
}

fn actor(name: &str, world: WorldId, position: BlockPos, interactive: bool) -> Actor {
    Actor {
        id: ActorId::new(),
        name: name.to_owned(),
        world,
        position,
        permissions: BTreeSet::new(),
        interactive,
    }
}

fn world() -> World {
    let config = BiomesConfig::parse(CONFIG).unwrap();
    let catalog = BiomeCatalog::from_config(&config.settings.world_name, &config.biomes);
    let id = WorldId::new();

    let mut player = actor("player", id, BlockPos::new(1030, 70, -1010), true);
    player.permissions.insert(String::from("biomes.set.mushroom"));
    let visitor = actor("visitor", id, BlockPos::new(1000, 70, -1000), true);
    let console = actor("console", id, BlockPos::default(), false);

    let registry = InMemoryRegistry::new().with_region(BoundedRegion {
        id: RegionId::new(),
        owner: player.id,
        world: id,
        center: BlockPos::new(1000, 0, -1000),
        range: 50,
    });
    let funds = Arc::new(InMemoryFunds::new().with_balance(player.id, dec!(80)));
    let tiers = StaticTiers::new().with_tier(player.id, id, 21);
    let sink = Arc::new(RecordingSink::new());
    let (executor, queue) = mutation_queue();

    let collaborators = Collaborators::new(Arc::new(registry), Arc::new(executor), sink.clone())
        .with_funds(funds.clone())
        .with_tiers(Arc::new(tiers));

    World {
        id,
        player,
        visitor,
        console,
        catalog,
        config,
        funds,
        sink,
        service: BiomeChangeService::new(collaborators),
        queue,
    }
}

impl World {
    fn request(&self, acting: &Actor, target: &Actor, mode: Option<UpdateMode>) -> UpdateRequest {
        UpdateRequest {
            acting: acting.clone(),
            target: target.clone(),
            world: self.id,
            biome: self.catalog.get("mushroom_fields").unwrap().clone(),
            mode: mode.unwrap_or(self.config.settings.default_mode),
            magnitude: self.config.settings.default_size,
            withdraw_funds: self.config.settings.withdraw_funds,
        }
    }
}

#[tokio::test]
async fn player_changes_own_chunk_and_pays() {
    let mut w = world();
    let request = w.request(&w.player, &w.player, None);

    let outcome = w.service.apply(&request).unwrap();

    // Chunk (64, -64) holds the player; region spans 950..=1050.
    let bound = outcome.bound().unwrap();
    assert_eq!(
        (bound.min_x(), bound.max_x(), bound.min_z(), bound.max_z()),
        (1024, 1039, -1024, -1009)
    );
    assert_eq!(w.funds.balance(w.player.id), dec!(5));

    let job = w.queue.next().await.unwrap();
    assert_eq!(job.biome, "MUSHROOM_FIELDS");
    assert_eq!(job.bound, bound);
    assert!(w.queue.try_next().is_none());
}

#[tokio::test]
async fn second_purchase_is_refused_for_lack_of_money() {
    let mut w = world();
    let request = w.request(&w.player, &w.player, Some(UpdateMode::Island));

    let first = w.service.apply(&request).unwrap();
    let second = w.service.apply(&request).unwrap();

    assert!(first.bound().is_some());
    assert_eq!(
        second,
        ChangeOutcome::Denied {
            reason: DenialReason::NotEnoughMoney
        }
    );
    let sent = w.sink.messages();
    assert_eq!(sent.len(), 1);
    let (_, message) = sent.first().unwrap();
    assert_eq!(message.key, MessageKey::NotEnoughMoney);
    assert_eq!(message.substitution("[number]"), Some("75.0"));

    assert!(w.queue.next().await.is_some());
    assert!(w.queue.try_next().is_none());
}

#[test]
fn visitor_cannot_change_someone_elses_chunk_without_standing_there() {
    let mut w = world();
    w.visitor.position = BlockPos::new(5000, 64, 5000);
    let request = w.request(&w.visitor, &w.player, Some(UpdateMode::Square));

    let outcome = w.service.apply(&request).unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Denied {
            reason: DenialReason::MissingAdminIsland
        }
    );
    let sent = w.sink.messages();
    assert_eq!(sent.first().map(|(to, _)| *to), Some(w.visitor.id));
    assert!(w.queue.try_next().is_none());
}

#[test]
fn console_island_change_needs_only_target_ownership() {
    let mut w = world();
    let request = w.request(&w.console, &w.player, Some(UpdateMode::Island));

    let outcome = w.service.apply(&request).unwrap();

    let bound = outcome.bound().unwrap();
    assert_eq!(
        (bound.min_x(), bound.max_x(), bound.min_z(), bound.max_z()),
        (950, 1050, -1050, -950)
    );
    assert_eq!(bound.area(), 101 * 101);
    let job = w.queue.try_next().unwrap();
    assert_eq!(job.initiator, w.console.id);
}

#[test]
fn console_chunk_change_is_silent_when_target_is_away() {
    let mut w = world();
    w.player.position = BlockPos::new(0, 64, 0);
    let request = w.request(&w.console, &w.player, None);

    let outcome = w.service.apply(&request).unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Denied {
            reason: DenialReason::TargetNotOnIsland
        }
    );
    assert!(w.sink.is_empty());
    assert!(w.queue.try_next().is_none());
}

#[test]
fn repeated_authorization_has_no_side_effects() {
    let w = world();
    let request = w.request(&w.player, &w.player, None);

    let outcomes: Vec<_> = (0..3)
        .map(|_| w.service.authorizer().authorize(&request))
        .collect();

    assert!(outcomes.windows(2).all(|pair| pair.first() == pair.get(1)));
    assert!(outcomes.iter().all(biomes_core::Authorization::is_allowed));
    assert_eq!(w.funds.balance(w.player.id), dec!(80));
    assert!(w.sink.is_empty());
}
