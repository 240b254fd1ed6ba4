//! Shared type definitions for biome change authorization.
//!
//! Everything the authorizer, the bounds calculator and their collaborators
//! pass between each other lives here.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for actors, worlds, regions and jobs
//! - [`enums`] -- Update modes, denial reasons and message keys
//! - [`structs`] -- Actors, regions, biome definitions, requests, bounds

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DenialReason, MessageKey, ParseUpdateModeError, UpdateMode};
pub use ids::{ActorId, JobId, RegionId, WorldId};
pub use structs::{
    Actor, BiomeDefinition, BlockPos, BoundedRegion, CHUNK_SIZE, Message, MutationJob,
    RegionBound, UpdateRequest, placeholders,
};
