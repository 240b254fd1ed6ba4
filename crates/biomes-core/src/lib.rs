//! Biome change authorization, region bounds and mutation dispatch.
//!
//! A biome change runs in two steps, always in this order:
//!
//! 1. [`RequestAuthorizer::authorize`] decides whether the acting actor may
//!    change the target's region and picks the anchor position. It only
//!    reads; a denial sends one message to the acting actor.
//! 2. [`RegionBoundsCalculator::compute`] turns the mode, magnitude and
//!    anchor into a bound clipped to the owned region, withdraws the cost
//!    and enqueues the terrain mutation.
//!
//! [`BiomeChangeService`] wraps both steps for callers.
//!
//! # Modules
//!
//! - [`authorize`] -- Decision table of paths and guards ([`RequestAuthorizer`])
//! - [`bounds`] -- Bound geometry and dispatch ([`RegionBoundsCalculator`])
//! - [`catalog`] -- In-memory biome catalog and info listing ([`BiomeCatalog`])
//! - [`collaborators`] -- Traits for regions, funds, tiers, executor, messages
//! - [`config`] -- `biomes-config.yaml` loading ([`BiomesConfig`])
//! - [`executor`] -- Queue-backed mutation executor
//! - [`memory`] -- In-memory collaborators for tests and scripted runs
//! - [`service`] -- Authorize + compute orchestration ([`BiomeChangeService`])

pub mod authorize;
pub mod bounds;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod executor;
pub mod memory;
pub mod service;

#[cfg(test)]
mod testkit;

// Re-export primary types at crate root for convenience.
pub use authorize::{Authorization, AuthorizationPath, Guard, RequestAuthorizer, format_cost};
pub use bounds::{BoundsError, RegionBoundsCalculator, compute_bound};
pub use catalog::BiomeCatalog;
pub use collaborators::{
    Collaborators, ExecutorError, FundsError, FundsProvider, MessageSink, MutationExecutor,
    RegionRegistry, TierProvider,
};
pub use config::{BiomeEntry, BiomesConfig, ConfigError, LoggingConfig, Settings};
pub use executor::{MutationQueue, QueuedExecutor, mutation_queue};
pub use memory::{InMemoryFunds, InMemoryRegistry, LogSink, RecordingSink, StaticTiers};
pub use service::{BiomeChangeService, BiomeError, ChangeOutcome};
