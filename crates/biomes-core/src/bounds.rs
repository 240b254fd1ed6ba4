//! Region bounds computation and mutation dispatch.
//!
//! [`compute_bound`] is the pure geometry: it turns an update mode, a
//! magnitude and an anchor into a rectangle clipped to the owned region.
//! [`RegionBoundsCalculator::compute`] is the terminal step of a biome
//! change: it computes the bound, takes payment and enqueues the job.

use tracing::{error, info, warn};

use biomes_types::{
    BlockPos, BoundedRegion, CHUNK_SIZE, MutationJob, RegionBound, UpdateMode, UpdateRequest,
};

use crate::collaborators::{Collaborators, ExecutorError};

/// Errors from [`RegionBoundsCalculator::compute`].
#[derive(Debug, thiserror::Error)]
pub enum BoundsError {
    /// The mode and magnitude produced no columns. Proxy paths do not
    /// validate magnitude, so a non-positive one ends up here; nothing is
    /// charged or dispatched.
    #[error("{mode} update with magnitude {magnitude} covers no columns")]
    EmptyBound {
        /// Requested mode.
        mode: UpdateMode,
        /// Requested magnitude.
        magnitude: i32,
    },

    /// The executor refused the job.
    #[error("dispatch failed: {source}")]
    Dispatch {
        /// The underlying executor error.
        #[from]
        source: ExecutorError,
    },
}

/// Compute the columns affected by an update, clipped to `region`.
///
/// Returns `None` when the result would be empty.
pub fn compute_bound(
    mode: UpdateMode,
    magnitude: i32,
    anchor: BlockPos,
    region: &BoundedRegion,
) -> Option<RegionBound> {
    match mode {
        UpdateMode::Island => Some(region.bound()),
        UpdateMode::Chunk => {
            let (cx, cz) = anchor.chunk();
            let (min_x, max_x) = chunk_axis(cx, magnitude, region.min_x(), region.max_x());
            let (min_z, max_z) = chunk_axis(cz, magnitude, region.min_z(), region.max_z());
            RegionBound::new(min_x, max_x, min_z, max_z)
        }
        UpdateMode::Square => {
            let half = magnitude.checked_div(2).unwrap_or(0);
            let (min_x, max_x) = square_axis(anchor.x, half, region.min_x(), region.max_x());
            let (min_z, max_z) = square_axis(anchor.z, half, region.min_z(), region.max_z());
            RegionBound::new(min_x, max_x, min_z, max_z)
        }
    }
}

/// `2n - 1` chunks: `n - 1` before the anchor chunk, the anchor chunk, and
/// `n - 1` after it.
fn chunk_axis(chunk: i32, n: i32, region_min: i32, region_max: i32) -> (i32, i32) {
    let first = chunk.saturating_sub(n.saturating_sub(1));
    let end = chunk.saturating_add(n);
    let min = region_min.max(first.saturating_mul(CHUNK_SIZE));
    let max = region_max.min(end.saturating_mul(CHUNK_SIZE).saturating_sub(1));
    (min, max)
}

/// Negative coordinates swap which clamp feeds which side. Kept as is; see
/// DESIGN.md.
fn square_axis(coord: i32, half: i32, region_min: i32, region_max: i32) -> (i32, i32) {
    if coord < 0 {
        let max = region_min.max(coord.saturating_add(half));
        let min = region_max.min(coord.saturating_sub(half));
        (min, max)
    } else {
        let min = region_min.max(coord.saturating_sub(half));
        let max = region_max.min(coord.saturating_add(half));
        (min, max)
    }
}

/// Computes the update bound, charges the acting actor and dispatches the
/// terrain mutation.
#[derive(Debug, Clone)]
pub struct RegionBoundsCalculator {
    collaborators: Collaborators,
}

impl RegionBoundsCalculator {
    /// Create a calculator over the given collaborators.
    pub const fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Compute the bound for an authorized `request` and hand it to the
    /// mutation executor.
    ///
    /// Must only be called after a successful authorization. A failed
    /// withdrawal is logged and does not stop dispatch. Nothing is charged
    /// unless the executor is accepting jobs.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::EmptyBound`] if the bound is empty, or
    /// [`BoundsError::Dispatch`] if the executor is not accepting jobs. In
    /// both cases nothing is charged or dispatched.
    pub fn compute(
        &self,
        request: &UpdateRequest,
        anchor: BlockPos,
        region: &BoundedRegion,
    ) -> Result<RegionBound, BoundsError> {
        let Some(bound) = compute_bound(request.mode, request.magnitude, anchor, region) else {
            error!(
                mode = %request.mode,
                magnitude = request.magnitude,
                region = %region.id,
                "Computed an empty update bound, skipping biome change"
            );
            return Err(BoundsError::EmptyBound {
                mode: request.mode,
                magnitude: request.magnitude,
            });
        };

        let job = MutationJob::new(bound, &request.biome.biome, request.world, request.acting.id);
        let job_id = job.id;
        if !self.collaborators.executor.is_accepting() {
            warn!(
                %job_id,
                acting = %request.acting.name,
                "Mutation executor closed, biome change not charged"
            );
            return Err(ExecutorError::QueueClosed { job: job_id }.into());
        }

        let withdrawal = self
            .collaborators
            .funds
            .as_ref()
            .filter(|_| request.withdraw_funds)
            .map(|funds| funds.withdraw(request.acting.id, request.biome.cost));
        if let Some(Err(err)) = withdrawal {
            warn!(
                acting = %request.acting.name,
                cost = %request.biome.cost,
                %err,
                "Withdrawal failed, continuing with biome change"
            );
        }

        self.collaborators.executor.dispatch(job)?;

        info!(
            %job_id,
            biome = %request.biome.biome,
            mode = %request.mode,
            min_x = bound.min_x(),
            max_x = bound.max_x(),
            min_z = bound.min_z(),
            max_z = bound.max_z(),
            "Biome update dispatched"
        );
        Ok(bound)
    }
}
