//! Shared fixture for the unit tests: one world, an owner with a region at
//! the origin, a neighbour region, an admin standing outside both and a
//! console actor.

use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal_macros::dec;

use biomes_types::{
    Actor, ActorId, BiomeDefinition, BlockPos, BoundedRegion, RegionId, UpdateMode,
    UpdateRequest, WorldId,
};

use crate::authorize::RequestAuthorizer;
use crate::bounds::RegionBoundsCalculator;
use crate::collaborators::Collaborators;
use crate::executor::{MutationQueue, QueuedExecutor, mutation_queue};
use crate::memory::{InMemoryFunds, InMemoryRegistry, RecordingSink};

pub(crate) struct Fixture {
    pub world: WorldId,
    pub owner: Actor,
    pub admin: Actor,
    pub console: Actor,
    pub region: BoundedRegion,
    pub neighbour_region: BoundedRegion,
    pub biome: BiomeDefinition,
    pub registry: Arc<InMemoryRegistry>,
    pub funds: Arc<InMemoryFunds>,
    pub sink: Arc<RecordingSink>,
    pub executor: QueuedExecutor,
    pub queue: MutationQueue,
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

impl Fixture {
    pub fn new() -> Self {
        let world = WorldId::new();
        let mut owner = actor("owner", world, BlockPos::new(5, 64, 5), true);
        owner.permissions.insert(String::from("biomes.set.desert"));
        let admin = actor("admin", world, BlockPos::new(500, 64, 500), true);
        let console = actor("console", world, BlockPos::default(), false);
        let neighbour = ActorId::new();

        let region = BoundedRegion {
            id: RegionId::new(),
            owner: owner.id,
            world,
            center: BlockPos::new(0, 0, 0),
            range: 100,
        };
        let neighbour_region = BoundedRegion {
            id: RegionId::new(),
            owner: neighbour,
            world,
            center: BlockPos::new(300, 0, 0),
            range: 50,
        };
        let registry = InMemoryRegistry::new()
            .with_region(region.clone())
            .with_region(neighbour_region.clone());

        let biome = BiomeDefinition {
            unique_id: String::from("world_desert"),
            biome: String::from("DESERT"),
            friendly_name: String::from("Desert"),
            description: String::from("Hot and dry."),
            required_tier: 0,
            cost: dec!(10),
            permission: String::from("biomes.set.desert"),
        };
        let funds = InMemoryFunds::new().with_balance(owner.id, dec!(100));
        let (executor, queue) = mutation_queue();

        Self {
            world,
            owner,
            admin,
            console,
            region,
            neighbour_region,
            biome,
            registry: Arc::new(registry),
            funds: Arc::new(funds),
            sink: Arc::new(RecordingSink::new()),
            executor,
            queue,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.registry.clone(),
            Arc::new(self.executor.clone()),
            self.sink.clone(),
        )
        .with_funds(self.funds.clone())
    }

    pub fn authorizer(&self) -> RequestAuthorizer {
        RequestAuthorizer::new(self.collaborators())
    }

    pub fn calculator(&self) -> RegionBoundsCalculator {
        RegionBoundsCalculator::new(self.collaborators())
    }

    pub fn request(
        &self,
        acting: &Actor,
        target: &Actor,
        mode: UpdateMode,
        magnitude: i32,
    ) -> UpdateRequest {
        UpdateRequest {
            acting: acting.clone(),
            target: target.clone(),
            world: self.world,
            biome: self.biome.clone(),
            mode,
            magnitude,
            withdraw_funds: true,
        }
    }
}
