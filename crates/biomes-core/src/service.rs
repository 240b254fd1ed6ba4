//! Orchestration of a full biome change: authorize, then compute and
//! dispatch.

use tracing::debug;

use biomes_types::{ActorId, DenialReason, RegionBound, UpdateRequest};

use crate::authorize::RequestAuthorizer;
use crate::bounds::{BoundsError, RegionBoundsCalculator};
use crate::collaborators::Collaborators;

/// Errors that can occur after a request has been authorized.
#[derive(Debug, thiserror::Error)]
pub enum BiomeError {
    /// The target's region disappeared between authorization and bounds
    /// computation.
    #[error("target {target} no longer owns a region")]
    RegionVanished {
        /// The target actor.
        target: ActorId,
    },

    /// Bounds computation or dispatch failed.
    #[error("bounds error: {source}")]
    Bounds {
        /// The underlying bounds error.
        #[from]
        source: BoundsError,
    },
}

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Authorization refused the request; nothing was charged or dispatched.
    Denied {
        /// Why.
        reason: DenialReason,
    },
    /// The mutation job was enqueued for `bound`.
    Dispatched {
        /// Columns that will be rewritten.
        bound: RegionBound,
    },
}

impl ChangeOutcome {
    /// The dispatched bound, if the request went through.
    pub const fn bound(&self) -> Option<RegionBound> {
        match self {
            Self::Dispatched { bound } => Some(*bound),
            Self::Denied { .. } => None,
        }
    }
}

/// Runs authorize + compute as one call, in that order.
#[derive(Debug, Clone)]
pub struct BiomeChangeService {
    collaborators: Collaborators,
    authorizer: RequestAuthorizer,
    calculator: RegionBoundsCalculator,
}

impl BiomeChangeService {
    /// Create a service over the given collaborators.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            authorizer: RequestAuthorizer::new(collaborators.clone()),
            calculator: RegionBoundsCalculator::new(collaborators.clone()),
            collaborators,
        }
    }

    /// The authorizer used by [`apply`](Self::apply).
    pub const fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }

    /// Authorize `request` and, if allowed, compute its bound and dispatch
    /// the mutation.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeError`] if an authorized request could not be
    /// dispatched. Denials are not errors.
    pub fn apply(&self, request: &UpdateRequest) -> Result<ChangeOutcome, BiomeError> {
        let authorization = self.authorizer.authorize(request);
        if let Some(reason) = authorization.denial {
            return Ok(ChangeOutcome::Denied { reason });
        }

        let region = self
            .collaborators
            .regions
            .owned_region(request.world, request.target.id)
            .ok_or(BiomeError::RegionVanished {
                target: request.target.id,
            })?;
        let anchor = authorization.anchor.unwrap_or(request.target.position);
        debug!(path = ?authorization.path, ?anchor, "Biome change authorized");

        let bound = self.calculator.compute(request, anchor, &region)?;
        Ok(ChangeOutcome::Dispatched { bound })
    }
}
