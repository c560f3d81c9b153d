//! Timed pickup effects
//!
//! Each `PowerUpKind` maps to one mutation of the player record and, for the
//! timed kinds, one inverse mutation. The caller is responsible for
//! scheduling `revert` at the expiry `apply` returns; `revert` itself ignores
//! calls that arrive before the recorded expiry, so a stale timer for an
//! earlier activation cannot cut a newer one short.

use crate::config::PowerUpDurations;
use crate::error::ActionError;
use log::debug;
use shared::{ActiveEffect, Player, PowerUpKind, MAX_ACTIVE_POWER_UPS};

pub const SPEED_MULTIPLIER: f32 = 1.8;
pub const DAMAGE_MULTIPLIER: f32 = 2.0;
pub const SHIELD_POINTS: f32 = 50.0;
/// Fraction of max health restored by a health pickup
pub const HEALTH_BOOST: f32 = 0.35;
/// Divisor applied to a weapon's fire interval under rapid fire
pub const RAPID_FIRE_FACTOR: u64 = 2;

fn admission(player: &Player, kind: PowerUpKind, now: u64) -> Result<(), ActionError> {
    if !kind.counts_toward_cap() {
        return Ok(());
    }

    if player.is_effect_live(kind, now) {
        return Err(ActionError::PowerUpAlreadyActive(kind));
    }

    if player.capped_effect_count(now) >= MAX_ACTIVE_POWER_UPS {
        return Err(ActionError::PowerUpCapReached(MAX_ACTIVE_POWER_UPS));
    }

    Ok(())
}

/// Whether `kind` could be applied to `player` right now
pub fn can_apply(player: &Player, kind: PowerUpKind, now: u64) -> bool {
    admission(player, kind, now).is_ok()
}

/// Applies `kind` to `player` and returns the effect's expiry time.
///
/// On rejection the player is left untouched and the pickup should stay in
/// the world.
pub fn apply(
    player: &mut Player,
    kind: PowerUpKind,
    now: u64,
    durations: &PowerUpDurations,
) -> Result<u64, ActionError> {
    admission(player, kind, now)?;

    match kind {
        PowerUpKind::Speed => player.speed = player.base_speed * SPEED_MULTIPLIER,
        PowerUpKind::MultiShot => player.has_multi_shot = true,
        PowerUpKind::Health => {
            player.health = player
                .max_health
                .min(player.health + player.max_health * HEALTH_BOOST)
        }
        PowerUpKind::Damage => player.damage_multiplier *= DAMAGE_MULTIPLIER,
        PowerUpKind::Shield => player.shield += SHIELD_POINTS,
        PowerUpKind::RapidFire => player.has_rapid_fire = true,
        PowerUpKind::Fire => player.has_fire = true,
    }

    let expires_at = now + durations.for_kind(kind);
    player.active_power_ups.insert(
        kind,
        ActiveEffect {
            active: true,
            expires_at,
        },
    );

    debug!(
        "Player {} gained {} until {}",
        player.id,
        kind.name(),
        expires_at
    );
    Ok(expires_at)
}

/// Undoes `kind` on `player` if it is active and has reached its expiry.
///
/// Returns false when there was nothing to revert. Shield points are not
/// removed: the effect slot frees up, but the shield only drains by
/// absorbing damage.
pub fn revert(player: &mut Player, kind: PowerUpKind, now: u64) -> bool {
    let Some(effect) = player.active_power_ups.get_mut(&kind) else {
        return false;
    };
    if !effect.active || effect.expires_at > now {
        return false;
    }
    effect.active = false;

    match kind {
        PowerUpKind::Speed => player.speed = player.base_speed,
        PowerUpKind::MultiShot => player.has_multi_shot = false,
        PowerUpKind::Damage => {
            player.damage_multiplier = (player.damage_multiplier / DAMAGE_MULTIPLIER).max(1.0)
        }
        PowerUpKind::RapidFire => player.has_rapid_fire = false,
        PowerUpKind::Fire => player.has_fire = false,
        PowerUpKind::Health | PowerUpKind::Shield => {}
    }

    debug!("Player {} lost {}", player.id, kind.name());
    true
}

/// Reverts every effect on `player` whose expiry has passed
pub fn sweep_expired(player: &mut Player, now: u64) -> usize {
    let expired: Vec<PowerUpKind> = player
        .active_power_ups
        .iter()
        .filter(|(_, effect)| effect.active && effect.expires_at <= now)
        .map(|(kind, _)| *kind)
        .collect();

    expired
        .into_iter()
        .filter(|kind| revert(player, *kind, now))
        .count()
}
