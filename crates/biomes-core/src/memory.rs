//! In-memory collaborators.
//!
//! These back the test suites and the scripted console driver. They play
//! the same role as a stub decision source: real enough to exercise every
//! branch of the core, with no external systems behind them.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use tracing::info;

use biomes_types::{Actor, ActorId, BlockPos, BoundedRegion, Message, RegionId, WorldId};

use crate::collaborators::{FundsError, FundsProvider, MessageSink, RegionRegistry, TierProvider};

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// A fixed set of regions, keyed by region ID.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    regions: BTreeMap<RegionId, BoundedRegion>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }

    /// Add (or replace) a region.
    #[must_use]
    pub fn with_region(mut self, region: BoundedRegion) -> Self {
        self.insert(region);
        self
    }

    /// Add (or replace) a region.
    pub fn insert(&mut self, region: BoundedRegion) {
        self.regions.insert(region.id, region);
    }

    /// Number of regions held.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions are held.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionRegistry for InMemoryRegistry {
    fn owned_region(&self, world: WorldId, actor: ActorId) -> Option<BoundedRegion> {
        self.regions
            .values()
            .find(|r| r.world == world && r.owner == actor)
            .cloned()
    }

    fn region_at(&self, world: WorldId, pos: BlockPos) -> Option<BoundedRegion> {
        self.regions
            .values()
            .find(|r| r.world == world && r.contains(pos))
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Funds
// ---------------------------------------------------------------------------

/// Decimal balances per actor. Unknown actors hold zero.
#[derive(Debug, Default)]
pub struct InMemoryFunds {
    balances: Mutex<BTreeMap<ActorId, Decimal>>,
}

impl InMemoryFunds {
    /// Create an economy where everyone is broke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `actor`'s balance.
    #[must_use]
    pub fn with_balance(self, actor: ActorId, amount: Decimal) -> Self {
        self.set_balance(actor, amount);
        self
    }

    /// Set `actor`'s balance.
    pub fn set_balance(&self, actor: ActorId, amount: Decimal) {
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(actor, amount);
    }

    /// Current balance of `actor`.
    pub fn balance(&self, actor: ActorId) -> Decimal {
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&actor)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl FundsProvider for InMemoryFunds {
    fn has_at_least(&self, actor: ActorId, amount: Decimal) -> bool {
        self.balance(actor) >= amount
    }

    fn withdraw(&self, actor: ActorId, amount: Decimal) -> Result<(), FundsError> {
        let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let available = balances.get(&actor).copied().unwrap_or(Decimal::ZERO);
        if available < amount {
            return Err(FundsError::Insufficient {
                actor,
                requested: amount,
                available,
            });
        }
        let remaining = available.checked_sub(amount).ok_or(FundsError::Backend {
            message: String::from("balance underflow"),
        })?;
        balances.insert(actor, remaining);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Fixed tiers per `(actor, world)`.
#[derive(Debug, Clone, Default)]
pub struct StaticTiers {
    tiers: BTreeMap<(ActorId, WorldId), u64>,
}

impl StaticTiers {
    /// Create a provider that knows no tiers.
    pub const fn new() -> Self {
        Self {
            tiers: BTreeMap::new(),
        }
    }

    /// Record `actor`'s tier in `world`.
    #[must_use]
    pub fn with_tier(mut self, actor: ActorId, world: WorldId, tier: u64) -> Self {
        self.tiers.insert((actor, world), tier);
        self
    }
}

impl TierProvider for StaticTiers {
    fn current_tier(&self, actor: ActorId, world: WorldId) -> Option<u64> {
        self.tiers.get(&(actor, world)).copied()
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Keeps every message it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(ActorId, Message)>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn messages(&self) -> Vec<(ActorId, Message)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of messages sent so far.
    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been sent.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageSink for RecordingSink {
    fn notify(&self, actor: &Actor, message: Message) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((actor.id, message));
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn notify(&self, actor: &Actor, message: Message) {
        let substitutions = message
            .substitutions
            .iter()
            .map(|(placeholder, value)| format!("{placeholder}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        info!(actor = %actor.name, key = %message.key, %substitutions, "Message");
    }
}
