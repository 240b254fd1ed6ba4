//! Enumeration types: update modes, denial reasons and message keys.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Update mode
// ---------------------------------------------------------------------------

/// Selects which part of the owned region a biome change affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum UpdateMode {
    /// The whole owned region. Magnitude is ignored.
    Island,
    /// `2N - 1` aligned 16x16 chunks per axis, centered on the anchor chunk.
    Chunk,
    /// A square of side `magnitude` centered on the anchor.
    Square,
}

impl UpdateMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 3] = [Self::Island, Self::Chunk, Self::Square];

    /// Upper-case name used in configuration and commands.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Island => "ISLAND",
            Self::Chunk => "CHUNK",
            Self::Square => "SQUARE",
        }
    }

    /// Whether the mode ignores the request magnitude.
    pub const fn ignores_magnitude(self) -> bool {
        matches!(self, Self::Island)
    }
}

impl core::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An update mode name that matched none of [`UpdateMode::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown update mode: {0}")]
pub struct ParseUpdateModeError(pub String);

impl FromStr for UpdateMode {
    type Err = ParseUpdateModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseUpdateModeError(s.to_owned()))
    }
}

impl TryFrom<String> for UpdateMode {
    type Error = ParseUpdateModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Message keys
// ---------------------------------------------------------------------------

/// Localization key for a message sent to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// The actor lacks the biome permission.
    MissingPermission,
    /// A chunk/square magnitude was not positive.
    IncorrectRange,
    /// The actor owns no region in the world.
    MissingIsland,
    /// The actor is not standing on the region they own.
    NotOnIsland,
    /// The actor cannot afford the biome.
    NotEnoughMoney,
    /// The target's tier is too low for the biome.
    NotEnoughLevel,
    /// An admin is not standing on the target's region.
    MissingAdminIsland,
    /// Biome info: header line.
    InfoHeader,
    /// Biome info: biome type line.
    InfoType,
    /// Biome info: description line.
    InfoDescription,
    /// Biome info: required tier line.
    InfoLevel,
    /// Biome info: cost line.
    InfoCost,
}

impl MessageKey {
    /// The dotted localization key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingPermission => "biomes.messages.errors.missing-permission",
            Self::IncorrectRange => "biomes.messages.errors.incorrect-range",
            Self::MissingIsland => "biomes.messages.errors.missing-island",
            Self::NotOnIsland => "biomes.messages.errors.not-on-island",
            Self::NotEnoughMoney => "biomes.messages.errors.not-enough-money",
            Self::NotEnoughLevel => "biomes.messages.errors.not-enough-level",
            Self::MissingAdminIsland => "biomes.messages.errors.missing-admin-island",
            Self::InfoHeader => "biomes.info.message.header",
            Self::InfoType => "biomes.info.message.type",
            Self::InfoDescription => "biomes.info.message.description",
            Self::InfoLevel => "biomes.info.message.level",
            Self::InfoCost => "biomes.info.message.cost",
        }
    }
}

impl core::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Denial reasons
// ---------------------------------------------------------------------------

/// Why an update request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialReason {
    /// Acting actor lacks the biome permission.
    MissingPermission,
    /// Magnitude was not positive for a chunk or square update.
    IncorrectRange,
    /// The relevant actor owns no region in the world.
    MissingIsland,
    /// The acting actor is not on the region they own.
    NotOnIsland,
    /// Funds are below the biome cost.
    NotEnoughMoney,
    /// The target's tier does not exceed the required tier.
    NotEnoughLevel,
    /// A live admin is not standing on the target's region.
    MissingAdminIsland,
    /// A non-interactive change whose target is off their region.
    ///
    /// Logged only; nobody is notified.
    TargetNotOnIsland,
}

impl DenialReason {
    /// The message sent to the acting actor, or `None` for silent denials.
    pub const fn message_key(self) -> Option<MessageKey> {
        match self {
            Self::MissingPermission => Some(MessageKey::MissingPermission),
            Self::IncorrectRange => Some(MessageKey::IncorrectRange),
            Self::MissingIsland => Some(MessageKey::MissingIsland),
            Self::NotOnIsland => Some(MessageKey::NotOnIsland),
            Self::NotEnoughMoney => Some(MessageKey::NotEnoughMoney),
            Self::NotEnoughLevel => Some(MessageKey::NotEnoughLevel),
            Self::MissingAdminIsland => Some(MessageKey::MissingAdminIsland),
            Self::TargetNotOnIsland => None,
        }
    }
}
