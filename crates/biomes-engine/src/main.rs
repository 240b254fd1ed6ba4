//! Console driver for scripted biome changes.
//!
//! Loads the biome catalog from `biomes-config.yaml`, builds a small world
//! from a scenario file, and runs each scripted biome change through the
//! authorize + compute pipeline. Dispatched mutation jobs are drained by a
//! worker task that stands in for the terrain writer.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$BIOMES_CONFIG` (or `biomes-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the biome catalog
//! 4. Load the scenario and resolve its world
//! 5. Create the mutation queue and spawn the worker
//! 6. Print biome info listings
//! 7. Run the scripted biome changes
//! 8. Close the queue, wait for the worker, log the summary

mod error;
mod scenario;

use std::path::Path;
use std::sync::Arc;

use biomes_core::{
    BiomeCatalog, BiomeChangeService, BiomesConfig, ChangeOutcome, Collaborators, FundsProvider,
    LogSink, MutationQueue, RegionRegistry, TierProvider, mutation_queue,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::Scenario;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration or the scenario cannot be loaded, or
/// the mutation worker fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = BiomesConfig::path_from_env();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        world_name = config.settings.world_name,
        default_mode = %config.settings.default_mode,
        default_size = config.settings.default_size,
        withdraw_funds = config.settings.withdraw_funds,
        "biomes-engine starting"
    );

    // 3. Build the biome catalog.
    let catalog = BiomeCatalog::from_config(&config.settings.world_name, &config.biomes);
    info!(biomes = catalog.len(), "Biome catalog built");

    // 4. Load the scenario.
    let scenario_path = Scenario::path_from_env();
    let scenario = Scenario::from_file(&scenario_path)?;
    let world = scenario.build()?;

    // 5. Create the mutation queue and worker.
    let (executor, queue) = mutation_queue();
    let worker = tokio::spawn(drain(queue));

    let mut collaborators = Collaborators::new(
        Arc::clone(&world.registry) as Arc<dyn RegionRegistry>,
        Arc::new(executor),
        Arc::new(LogSink),
    );
    if let Some(funds) = &world.funds {
        collaborators = collaborators.with_funds(Arc::clone(funds) as Arc<dyn FundsProvider>);
    }
    if let Some(tiers) = &world.tiers {
        collaborators = collaborators.with_tiers(Arc::clone(tiers) as Arc<dyn TierProvider>);
    }
    let service = BiomeChangeService::new(collaborators);

    // 6. Biome info listings.
    for entry in &scenario.info {
        let actor = world.actor(&entry.actor)?;
        if !catalog.describe(actor, &entry.biome, &LogSink) {
            warn!(actor = %actor.name, biome = entry.biome, "Unknown biome in info request");
        }
    }

    // 7. Scripted biome changes.
    let mut dispatched: u32 = 0;
    let mut denied: u32 = 0;
    let mut failed: u32 = 0;
    for change in &scenario.changes {
        let request = match world.request(change, &catalog, &config.settings) {
            Ok(request) => request,
            Err(e) => {
                warn!(actor = change.actor, error = %e, "Skipping scripted change");
                failed = failed.saturating_add(1);
                continue;
            }
        };

        match service.apply(&request) {
            Ok(ChangeOutcome::Dispatched { bound }) => {
                dispatched = dispatched.saturating_add(1);
                info!(
                    actor = %request.acting.name,
                    target_actor = %request.target.name,
                    biome = request.biome.biome,
                    mode = %request.mode,
                    min_x = bound.min_x(),
                    max_x = bound.max_x(),
                    min_z = bound.min_z(),
                    max_z = bound.max_z(),
                    "Biome change dispatched"
                );
            }
            Ok(ChangeOutcome::Denied { reason }) => {
                denied = denied.saturating_add(1);
                info!(
                    actor = %request.acting.name,
                    target_actor = %request.target.name,
                    biome = request.biome.biome,
                    ?reason,
                    "Biome change denied"
                );
            }
            Err(e) => {
                failed = failed.saturating_add(1);
                warn!(actor = %request.acting.name, error = %e, "Biome change failed");
            }
        }
    }

    // 8. Close the queue and wait for the worker.
    drop(service);
    let written = worker.await.map_err(|e| EngineError::Worker {
        message: format!("{e}"),
    })?;

    info!(
        dispatched,
        denied,
        failed,
        jobs_written = written,
        "biomes-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<BiomesConfig, EngineError> {
    if path.exists() {
        Ok(BiomesConfig::from_file(path)?)
    } else {
        Ok(BiomesConfig::default())
    }
}

/// Drain the mutation queue until every sender is gone. Returns the number
/// of jobs taken.
async fn drain(mut queue: MutationQueue) -> u64 {
    let mut written: u64 = 0;
    while let Some(job) = queue.next().await {
        written = written.saturating_add(1);
        info!(
            job_id = %job.id,
            world = %job.world,
            initiator = %job.initiator,
            biome = job.biome,
            columns = job.bound.area(),
            queued_at = %job.queued_at,
            "Mutation job taken"
        );
    }
    written
}
