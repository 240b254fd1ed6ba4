//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: biomes_core::ConfigError,
    },

    /// The scenario file could not be read or parsed.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the failure.
        message: String,
    },

    /// A scenario entry names an actor that does not exist.
    #[error("unknown actor: {0}")]
    UnknownActor(String),

    /// A scenario entry names a biome missing from the catalog.
    #[error("unknown biome: {0}")]
    UnknownBiome(String),

    /// The mutation worker task failed.
    #[error("mutation worker error: {message}")]
    Worker {
        /// Description of the failure.
        message: String,
    },
}
