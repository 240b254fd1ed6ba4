//! Interfaces to the systems the core consults but does not own.
//!
//! Every collaborator is injected explicitly through [`Collaborators`];
//! nothing is looked up from ambient global state. Funds and tiers are
//! optional: an absent provider means the corresponding check does not
//! apply.

use std::sync::Arc;

use rust_decimal::Decimal;

use biomes_types::{
    Actor, ActorId, BlockPos, BoundedRegion, JobId, Message, MutationJob, WorldId,
};

/// Errors reported by a [`FundsProvider`] withdrawal.
#[derive(Debug, thiserror::Error)]
pub enum FundsError {
    /// The actor holds less than the requested amount.
    #[error("insufficient funds for {actor}: wanted {requested}, have {available}")]
    Insufficient {
        /// The actor being charged.
        actor: ActorId,
        /// Amount requested.
        requested: Decimal,
        /// Amount actually held.
        available: Decimal,
    },

    /// The economy backend refused or failed the transaction.
    #[error("economy backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// Errors reported by a [`MutationExecutor`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The work queue no longer accepts jobs.
    #[error("mutation queue closed, job {job} dropped")]
    QueueClosed {
        /// The job that could not be enqueued.
        job: JobId,
    },
}

/// Lookup of bounded regions ("islands") by owner or by position.
pub trait RegionRegistry: Send + Sync {
    /// The region `actor` owns in `world`, if any.
    fn owned_region(&self, world: WorldId, actor: ActorId) -> Option<BoundedRegion>;

    /// The region containing `pos` in `world`, if any.
    fn region_at(&self, world: WorldId, pos: BlockPos) -> Option<BoundedRegion>;
}

/// Balance checks and withdrawals.
pub trait FundsProvider: Send + Sync {
    /// Whether `actor` holds at least `amount`.
    fn has_at_least(&self, actor: ActorId, amount: Decimal) -> bool;

    /// Take `amount` from `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`FundsError`] if the withdrawal did not happen.
    fn withdraw(&self, actor: ActorId, amount: Decimal) -> Result<(), FundsError>;
}

/// Progression tiers ("island level").
pub trait TierProvider: Send + Sync {
    /// Current tier of `actor` in `world`, or `None` if unknown.
    fn current_tier(&self, actor: ActorId, world: WorldId) -> Option<u64>;
}

/// Accepts terrain mutation jobs and runs them in the background.
///
/// Implementations must return promptly; the caller never waits for the
/// terrain to be rewritten.
pub trait MutationExecutor: Send + Sync {
    /// Whether a job dispatched now would be accepted. Checked before the
    /// acting actor is charged.
    fn is_accepting(&self) -> bool;

    /// Enqueue `job`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] if the job could not be accepted.
    fn dispatch(&self, job: MutationJob) -> Result<(), ExecutorError>;
}

/// Delivers localized messages to actors.
pub trait MessageSink: Send + Sync {
    /// Send `message` to `actor`.
    fn notify(&self, actor: &Actor, message: Message);
}

/// The full set of collaborators handed to the authorizer and calculator.
#[derive(Clone)]
pub struct Collaborators {
    /// Region ownership and point lookup.
    pub regions: Arc<dyn RegionRegistry>,
    /// Economy, if one is configured.
    pub funds: Option<Arc<dyn FundsProvider>>,
    /// Tier provider, if one is configured.
    pub tiers: Option<Arc<dyn TierProvider>>,
    /// Terrain mutation executor.
    pub executor: Arc<dyn MutationExecutor>,
    /// Message delivery.
    pub messages: Arc<dyn MessageSink>,
}

impl Collaborators {
    /// Bundle the required collaborators, with no funds or tier provider.
    pub fn new(
        regions: Arc<dyn RegionRegistry>,
        executor: Arc<dyn MutationExecutor>,
        messages: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            regions,
            funds: None,
            tiers: None,
            executor,
            messages,
        }
    }

    /// Enable cost checks and withdrawals.
    #[must_use]
    pub fn with_funds(mut self, funds: Arc<dyn FundsProvider>) -> Self {
        self.funds = Some(funds);
        self
    }

    /// Enable tier checks.
    #[must_use]
    pub fn with_tiers(mut self, tiers: Arc<dyn TierProvider>) -> Self {
        self.tiers = Some(tiers);
        self
    }
}

impl core::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collaborators")
            .field("funds", &self.funds.is_some())
            .field("tiers", &self.tiers.is_some())
            .finish_non_exhaustive()
    }
}
