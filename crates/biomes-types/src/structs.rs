//! Core entity structs: actors, regions, biome definitions, requests and
//! the bounds handed to the terrain mutation executor.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{MessageKey, UpdateMode};
use crate::ids::{ActorId, JobId, RegionId, WorldId};

/// Side length of an aligned chunk column, in blocks.
pub const CHUNK_SIZE: i32 = 16;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// An integer block position. `y` is carried along but never used by
/// region arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west coordinate.
    pub x: i32,
    /// Height.
    #[serde(default)]
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a position from its three coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Index of the aligned chunk containing this position, `(cx, cz)`.
    ///
    /// Uses floor division so that e.g. `x = -1` lands in chunk `-1`.
    pub const fn chunk(self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_SIZE), self.z.div_euclid(CHUNK_SIZE))
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// A participant that can own a region or initiate a biome change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identity.
    pub id: ActorId,
    /// Display name used in messages and logs.
    pub name: String,
    /// World the actor is currently in.
    pub world: WorldId,
    /// Current block position.
    pub position: BlockPos,
    /// Granted permission nodes.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// `true` for a live interactive agent, `false` for a passive target or
    /// a console with no interactive session.
    #[serde(default)]
    pub interactive: bool,
}

impl Actor {
    /// Whether the actor holds `permission`. An empty permission is always
    /// granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        permission.is_empty() || self.permissions.contains(permission)
    }
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// A square ownership area ("island") centered on a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedRegion {
    /// Region identity. Presence checks compare this, never geometry.
    pub id: RegionId,
    /// The owning actor.
    pub owner: ActorId,
    /// World the region lives in.
    pub world: WorldId,
    /// Center block. Only `x` and `z` matter.
    pub center: BlockPos,
    /// Half-extent in blocks.
    pub range: u32,
}

impl BoundedRegion {
    fn half_extent(&self) -> i32 {
        i32::try_from(self.range).unwrap_or(i32::MAX)
    }

    /// Smallest x coordinate covered by the region.
    pub fn min_x(&self) -> i32 {
        self.center.x.saturating_sub(self.half_extent())
    }

    /// Largest x coordinate covered by the region.
    pub fn max_x(&self) -> i32 {
        self.center.x.saturating_add(self.half_extent())
    }

    /// Smallest z coordinate covered by the region.
    pub fn min_z(&self) -> i32 {
        self.center.z.saturating_sub(self.half_extent())
    }

    /// Largest z coordinate covered by the region.
    pub fn max_z(&self) -> i32 {
        self.center.z.saturating_add(self.half_extent())
    }

    /// Whether `pos` lies inside the region (inclusive on both ends).
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min_x()..=self.max_x()).contains(&pos.x)
            && (self.min_z()..=self.max_z()).contains(&pos.z)
    }

    /// The region's full extent as a [`RegionBound`].
    pub fn bound(&self) -> RegionBound {
        RegionBound {
            min_x: self.min_x(),
            max_x: self.max_x(),
            min_z: self.min_z(),
            max_z: self.max_z(),
        }
    }
}

/// An axis-aligned rectangle of block columns, inclusive on all sides.
///
/// Always satisfies `min_x <= max_x` and `min_z <= max_z`; [`RegionBound::new`]
/// refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegionBound {
    min_x: i32,
    max_x: i32,
    min_z: i32,
    max_z: i32,
}

impl RegionBound {
    /// Build a bound, or `None` if either axis is inverted.
    pub const fn new(min_x: i32, max_x: i32, min_z: i32, max_z: i32) -> Option<Self> {
        if min_x > max_x || min_z > max_z {
            return None;
        }
        Some(Self { min_x, max_x, min_z, max_z })
    }

    /// Smallest x coordinate.
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Largest x coordinate.
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Smallest z coordinate.
    pub const fn min_z(&self) -> i32 {
        self.min_z
    }

    /// Largest z coordinate.
    pub const fn max_z(&self) -> i32 {
        self.max_z
    }

    /// Number of block columns along x.
    pub const fn width_x(&self) -> u32 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    /// Number of block columns along z.
    pub const fn width_z(&self) -> u32 {
        self.max_z.abs_diff(self.min_z).saturating_add(1)
    }

    /// Total number of block columns covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width_x()).saturating_mul(u64::from(self.width_z()))
    }

    /// Whether the column at `(x, z)` is covered.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }
}

// ---------------------------------------------------------------------------
// Biomes
// ---------------------------------------------------------------------------

/// A biome that actors may apply to their region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeDefinition {
    /// Catalog-wide unique ID, `<world>_<biome>`.
    pub unique_id: String,
    /// Biome type identifier handed to the mutation executor.
    pub biome: String,
    /// Human-readable name.
    pub friendly_name: String,
    /// Free-form description shown by the info listing.
    #[serde(default)]
    pub description: String,
    /// Minimum tier the target must exceed. Zero disables the check.
    #[serde(default)]
    pub required_tier: u64,
    /// Price withdrawn from the acting actor.
    #[serde(default)]
    pub cost: Decimal,
    /// Permission node the acting actor needs for self-service changes.
    #[serde(default)]
    pub permission: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A single biome change request. Built by the caller, consumed by one
/// authorize + compute pair, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Who issued the change.
    pub acting: Actor,
    /// Whose region is modified.
    pub target: Actor,
    /// World the change applies to.
    pub world: WorldId,
    /// Biome to apply.
    pub biome: BiomeDefinition,
    /// Which part of the region to change.
    pub mode: UpdateMode,
    /// Chunk count or square side, depending on `mode`.
    pub magnitude: i32,
    /// Whether the biome cost is taken from the acting actor.
    pub withdraw_funds: bool,
}

impl UpdateRequest {
    /// Whether the acting actor modifies their own region.
    pub fn is_self_service(&self) -> bool {
        self.acting.id == self.target.id
    }
}

// ---------------------------------------------------------------------------
// Mutation jobs
// ---------------------------------------------------------------------------

/// Work item handed to the terrain mutation executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationJob {
    /// Job identity, for log correlation.
    pub id: JobId,
    /// Columns to rewrite.
    pub bound: RegionBound,
    /// Biome type identifier.
    pub biome: String,
    /// World to rewrite in.
    pub world: WorldId,
    /// Actor that initiated the change.
    pub initiator: ActorId,
    /// When the job was enqueued.
    pub queued_at: DateTime<Utc>,
}

impl MutationJob {
    /// Create a job stamped with a fresh ID and the current time.
    pub fn new(bound: RegionBound, biome: &str, world: WorldId, initiator: ActorId) -> Self {
        Self {
            id: JobId::new(),
            bound,
            biome: biome.to_owned(),
            world,
            initiator,
            queued_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Placeholder tokens substituted into localized messages.
pub mod placeholders {
    /// Permission node.
    pub const PERMISSION: &str = "[permission]";
    /// Generic number (range, cost, tier).
    pub const NUMBER: &str = "[number]";
    /// Another actor's display name.
    pub const USER: &str = "[user]";
    /// Biome friendly name.
    pub const NAME: &str = "[name]";
    /// Biome type identifier.
    pub const TYPE: &str = "[type]";
    /// Biome description.
    pub const DESCRIPTION: &str = "[description]";
    /// Required tier.
    pub const LEVEL: &str = "[level]";
    /// Biome cost.
    pub const COST: &str = "[cost]";
}

/// A localized message addressed to an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Localization key.
    pub key: MessageKey,
    /// `(placeholder, value)` pairs, in order.
    pub substitutions: Vec<(&'static str, String)>,
}

impl Message {
    /// A message without substitutions.
    pub const fn new(key: MessageKey) -> Self {
        Self {
            key,
            substitutions: Vec::new(),
        }
    }

    /// Add a substitution.
    #[must_use]
    pub fn with(mut self, placeholder: &'static str, value: impl Into<String>) -> Self {
        self.substitutions.push((placeholder, value.into()));
        self
    }

    /// Value substituted for `placeholder`, if any.
    pub fn substitution(&self, placeholder: &str) -> Option<&str> {
        self.substitutions
            .iter()
            .find(|(p, _)| *p == placeholder)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn region(x: i32, z: i32, range: u32) -> BoundedRegion {
        BoundedRegion {
            id: RegionId::new(),
            owner: ActorId::new(),
            world: WorldId::new(),
            center: BlockPos::new(x, 64, z),
            range,
        }
    }

    #[test]
    fn chunk_index_floors_negative_coordinates() {
        assert_eq!(BlockPos::new(0, 0, 15).chunk(), (0, 0));
        assert_eq!(BlockPos::new(16, 0, -1).chunk(), (1, -1));
        assert_eq!(BlockPos::new(-16, 0, -17).chunk(), (-1, -2));
    }

    #[test]
    fn region_extent_is_center_plus_minus_range() {
        let r = region(10, -20, 5);
        assert_eq!((r.min_x(), r.max_x()), (5, 15));
        assert_eq!((r.min_z(), r.max_z()), (-25, -15));
        assert!(r.contains(BlockPos::new(15, 0, -25)));
        assert!(!r.contains(BlockPos::new(16, 0, -20)));
    }

    #[test]
    fn region_bound_rejects_inverted_axes() {
        assert!(RegionBound::new(1, 0, 0, 0).is_none());
        assert!(RegionBound::new(0, 0, 3, 2).is_none());
        let b = RegionBound::new(-2, 2, 0, 15);
        assert_eq!(b.map(|b| (b.width_x(), b.width_z(), b.area())), Some((5, 16, 80)));
    }

    #[test]
    fn empty_permission_is_always_granted() {
        let actor = Actor {
            id: ActorId::new(),
            name: String::from("alex"),
            world: WorldId::new(),
            position: BlockPos::default(),
            permissions: BTreeSet::from([String::from("biomes.set.desert")]),
            interactive: true,
        };
        assert!(actor.has_permission(""));
        assert!(actor.has_permission("biomes.set.desert"));
        assert!(!actor.has_permission("biomes.set.jungle"));
    }

    #[test]
    fn biome_definition_defaults_optional_fields() {
        let json = r#"{"unique_id":"w_desert","biome":"DESERT","friendly_name":"Desert"}"#;
        let biome: BiomeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(biome.required_tier, 0);
        assert_eq!(biome.cost, Decimal::ZERO);
        assert!(biome.permission.is_empty());
    }

    #[test]
    fn message_substitutions_are_looked_up_by_placeholder() {
        let msg = Message::new(MessageKey::NotEnoughMoney).with(placeholders::NUMBER, "5.0");
        assert_eq!(msg.substitution(placeholders::NUMBER), Some("5.0"));
        assert_eq!(msg.substitution(placeholders::USER), None);
    }
}
