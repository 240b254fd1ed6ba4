//! Request authorization as an explicit decision table.
//!
//! Every request is classified into exactly one [`AuthorizationPath`]. Each
//! path carries an ordered list of named [`Guard`]s; they run top to bottom
//! and the first failure decides the outcome:
//!
//! | Path | Guards |
//! |------|--------|
//! | `SelfService` | permission, range, owns region, standing on own region, funds, tier |
//! | `ProxyIsland` | target owns region |
//! | `ProxyLiveAdmin` | admin standing on target's region |
//! | `ProxySilent` | target standing on own region |
//!
//! Authorization only reads. The single side effect is the denial message
//! sent to the acting actor; the silent path logs instead.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use biomes_types::{
    Actor, BlockPos, BoundedRegion, DenialReason, Message, UpdateMode, UpdateRequest,
    placeholders,
};

use crate::collaborators::Collaborators;

/// Which branch of the decision table a request follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationPath {
    /// The acting actor changes their own region.
    SelfService,
    /// Someone else changes the target's whole region.
    ProxyIsland,
    /// A live admin changes part of the target's region from inside it.
    ProxyLiveAdmin,
    /// A non-interactive caller changes part of the target's region around
    /// the target's position.
    ProxySilent,
}

/// A single named precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    /// Acting actor holds the biome permission.
    Permission,
    /// Magnitude is positive unless the mode ignores it.
    Range,
    /// Acting actor owns a region in the request world.
    OwnsRegion,
    /// Acting actor stands on the region they own.
    StandingOnOwnRegion,
    /// Acting actor can afford the biome.
    Funds,
    /// Target's tier exceeds the required tier.
    Tier,
    /// Target owns a region in the request world.
    TargetOwnsRegion,
    /// Acting actor stands on the region the target owns.
    AdminOnTargetRegion,
    /// Target stands on the region they own.
    TargetOnOwnRegion,
}

impl AuthorizationPath {
    /// Pick the path for `request`. Exactly one applies.
    pub fn classify(request: &UpdateRequest) -> Self {
        if request.is_self_service() {
            Self::SelfService
        } else if request.mode == UpdateMode::Island {
            Self::ProxyIsland
        } else if request.acting.interactive {
            Self::ProxyLiveAdmin
        } else {
            Self::ProxySilent
        }
    }

    /// Guards evaluated for this path, in order.
    pub const fn guards(self) -> &'static [Guard] {
        match self {
            Self::SelfService => &[
                Guard::Permission,
                Guard::Range,
                Guard::OwnsRegion,
                Guard::StandingOnOwnRegion,
                Guard::Funds,
                Guard::Tier,
            ],
            Self::ProxyIsland => &[Guard::TargetOwnsRegion],
            Self::ProxyLiveAdmin => &[Guard::AdminOnTargetRegion],
            Self::ProxySilent => &[Guard::TargetOnOwnRegion],
        }
    }

    /// Position used as the center of chunk and square updates.
    const fn anchor(self, request: &UpdateRequest) -> BlockPos {
        match self {
            Self::SelfService | Self::ProxyLiveAdmin => request.acting.position,
            Self::ProxyIsland | Self::ProxySilent => request.target.position,
        }
    }

    /// Whether the anchor is reported even when the request is denied.
    const fn anchors_before_guards(self) -> bool {
        matches!(self, Self::ProxyIsland)
    }
}

/// Result of [`RequestAuthorizer::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
    /// Branch the request followed.
    pub path: AuthorizationPath,
    /// Anchor for bounds computation. Always set when allowed; also set on
    /// a denied [`AuthorizationPath::ProxyIsland`] request.
    pub anchor: Option<BlockPos>,
    /// Why the request was refused, if it was.
    pub denial: Option<DenialReason>,
}

impl Authorization {
    /// Whether the change may proceed.
    pub const fn is_allowed(&self) -> bool {
        self.denial.is_none()
    }
}

/// A failed guard: the reason, plus the message to send (if any).
#[derive(Debug)]
struct Denial {
    reason: DenialReason,
    message: Option<Message>,
}

impl Denial {
    fn notify(reason: DenialReason) -> Self {
        Self {
            reason,
            message: reason.message_key().map(Message::new),
        }
    }

    fn notify_with(reason: DenialReason, placeholder: &'static str, value: String) -> Self {
        Self {
            reason,
            message: reason.message_key().map(|key| Message::new(key).with(placeholder, value)),
        }
    }

    const fn silent(reason: DenialReason) -> Self {
        Self {
            reason,
            message: None,
        }
    }
}

/// Decides whether a biome change may proceed.
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    collaborators: Collaborators,
}

impl RequestAuthorizer {
    /// Create an authorizer over the given collaborators.
    pub const fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Run the decision table for `request`.
    ///
    /// On denial exactly one message is sent to the acting actor, except on
    /// the silent path, which logs a warning instead.
    pub fn authorize(&self, request: &UpdateRequest) -> Authorization {
        let path = AuthorizationPath::classify(request);
        let anchor = path.anchor(request);

        let failed = path
            .guards()
            .iter()
            .find_map(|guard| self.check(*guard, request).err());

        match failed {
            None => Authorization {
                path,
                anchor: Some(anchor),
                denial: None,
            },
            Some(denial) => {
                debug!(
                    acting = %request.acting.name,
                    target_actor = %request.target.name,
                    ?path,
                    reason = ?denial.reason,
                    "Biome change denied"
                );
                if let Some(message) = denial.message {
                    self.collaborators.messages.notify(&request.acting, message);
                }
                Authorization {
                    path,
                    anchor: path.anchors_before_guards().then_some(anchor),
                    denial: Some(denial.reason),
                }
            }
        }
    }

    fn check(&self, guard: Guard, request: &UpdateRequest) -> Result<(), Denial> {
        match guard {
            Guard::Permission => {
                let permission = &request.biome.permission;
                if request.acting.has_permission(permission) {
                    Ok(())
                } else {
                    Err(Denial::notify_with(
                        DenialReason::MissingPermission,
                        placeholders::PERMISSION,
                        permission.clone(),
                    ))
                }
            }
            Guard::Range => {
                if request.mode.ignores_magnitude() || request.magnitude > 0 {
                    Ok(())
                } else {
                    Err(Denial::notify_with(
                        DenialReason::IncorrectRange,
                        placeholders::NUMBER,
                        request.magnitude.to_string(),
                    ))
                }
            }
            Guard::OwnsRegion | Guard::TargetOwnsRegion => {
                if self.owned_region(request).is_some() {
                    Ok(())
                } else {
                    Err(Denial::notify(DenialReason::MissingIsland))
                }
            }
            Guard::StandingOnOwnRegion => {
                let owned = self.owned_region(request);
                if self.stands_on(&request.acting, owned.as_ref()) {
                    Ok(())
                } else {
                    Err(Denial::notify(DenialReason::NotOnIsland))
                }
            }
            Guard::Funds => self.check_funds(request),
            Guard::Tier => self.check_tier(request),
            Guard::AdminOnTargetRegion => {
                let owned = self.owned_region(request);
                if self.stands_on(&request.acting, owned.as_ref()) {
                    Ok(())
                } else {
                    Err(Denial::notify_with(
                        DenialReason::MissingAdminIsland,
                        placeholders::USER,
                        request.target.name.clone(),
                    ))
                }
            }
            Guard::TargetOnOwnRegion => {
                let owned = self.owned_region(request);
                if self.stands_on(&request.target, owned.as_ref()) {
                    Ok(())
                } else {
                    warn!(
                        target_actor = %request.target.name,
                        "Biome change for {} is not possible as they are not on their island",
                        request.target.name
                    );
                    Err(Denial::silent(DenialReason::TargetNotOnIsland))
                }
            }
        }
    }

    fn check_funds(&self, request: &UpdateRequest) -> Result<(), Denial> {
        let Some(funds) = &self.collaborators.funds else {
            return Ok(());
        };
        let cost = request.biome.cost;
        if funds.has_at_least(request.acting.id, cost) {
            Ok(())
        } else {
            Err(Denial::notify_with(
                DenialReason::NotEnoughMoney,
                placeholders::NUMBER,
                format_cost(cost),
            ))
        }
    }

    fn check_tier(&self, request: &UpdateRequest) -> Result<(), Denial> {
        let Some(tiers) = &self.collaborators.tiers else {
            return Ok(());
        };
        let required = request.biome.required_tier;
        match tiers.current_tier(request.target.id, request.world) {
            Some(current) if required > 0 && current <= required => Err(Denial::notify_with(
                DenialReason::NotEnoughLevel,
                placeholders::NUMBER,
                required.to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// The region the target owns in the request world.
    fn owned_region(&self, request: &UpdateRequest) -> Option<BoundedRegion> {
        self.collaborators
            .regions
            .owned_region(request.world, request.target.id)
    }

    /// Whether `who`'s position resolves to exactly `owned`. Identity is
    /// compared, not geometry.
    fn stands_on(&self, who: &Actor, owned: Option<&BoundedRegion>) -> bool {
        let Some(owned) = owned else {
            return false;
        };
        self.collaborators
            .regions
            .region_at(who.world, who.position)
            .is_some_and(|here| here.id == owned.id)
    }
}

/// Render a cost with at least one fractional digit (`5` becomes `5.0`).
pub fn format_cost(cost: Decimal) -> String {
    let mut normalized = cost.normalize();
    if normalized.scale() == 0 {
        normalized.rescale(1);
    }
    normalized.to_string()
}
