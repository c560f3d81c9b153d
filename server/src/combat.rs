//! Projectile hit resolution against the entity store
//!
//! Damage math itself lives in `shared::combat`; this pass decides who was
//! hit, mutates the victim and shooter, and reports what happened so the
//! simulation can schedule burns and notify clients.

use crate::store::EntityStore;
use log::debug;
use shared::{absorb_damage, circles_overlap, raw_damage, DamageOutcome, Player, Weapon};

#[derive(Debug, Clone)]
pub struct HitReport {
    pub projectile_id: u32,
    pub shooter_id: u32,
    pub victim_id: u32,
    /// Shooter's equipped weapon at the moment of the hit, or the fired
    /// weapon when the shooter is gone
    pub weapon: Weapon,
    /// None when the shooter no longer exists and no damage was dealt
    pub damage: Option<DamageOutcome>,
    pub shooter_has_fire: bool,
    /// The victim's final state if this hit eliminated them
    pub eliminated: Option<Player>,
}

/// Resolves every projectile currently overlapping a player other than its
/// owner.
///
/// Each projectile hits at most one player (the first overlap found) and is
/// removed on that hit. Damage is keyed off the weapon the shooter has
/// equipped when the hit lands, so switching weapons mid-flight changes it. Eliminated victims are removed from the store before
/// the next projectile is checked, and their killer's score is incremented.
pub fn resolve_projectile_hits(store: &mut EntityStore) -> Vec<HitReport> {
    let projectile_ids: Vec<u32> = store.projectiles.keys().copied().collect();
    let mut reports = Vec::new();

    for projectile_id in projectile_ids {
        let Some(projectile) = store.projectiles.get(&projectile_id) else {
            continue;
        };

        let victim_id = store
            .players
            .values()
            .find(|player| {
                player.id != projectile.owner_id
                    && circles_overlap(
                        projectile.x,
                        projectile.y,
                        projectile.radius,
                        player.x,
                        player.y,
                        player.radius,
                    )
            })
            .map(|player| player.id);

        let Some(victim_id) = victim_id else {
            continue;
        };
        let Some(projectile) = store.projectiles.remove(&projectile_id) else {
            continue;
        };

        let mut report = HitReport {
            projectile_id,
            shooter_id: projectile.owner_id,
            victim_id,
            weapon: projectile.weapon,
            damage: None,
            shooter_has_fire: false,
            eliminated: None,
        };

        let Some(shooter) = store.players.get(&projectile.owner_id) else {
            debug!(
                "Projectile {} hit player {} after its shooter left",
                projectile_id, victim_id
            );
            reports.push(report);
            continue;
        };

        report.weapon = shooter.equipped;
        let damage = raw_damage(shooter.equipped, shooter.class, shooter.damage_multiplier);
        report.shooter_has_fire = shooter.has_fire;

        let Some(victim) = store.players.get_mut(&victim_id) else {
            continue;
        };
        report.damage = Some(absorb_damage(&mut victim.shield, &mut victim.health, damage));

        if !victim.is_alive() {
            report.eliminated = store.remove_player(victim_id);
            if let Some(shooter) = store.players.get_mut(&projectile.owner_id) {
                shooter.score += 1;
            }
        }

        reports.push(report);
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{PlayerClass, PROJECTILE_RADIUS};

    fn store_with_pair() -> (EntityStore, u32, u32) {
        let mut store = EntityStore::new();
        let shooter = store.add_player("shooter".to_string(), PlayerClass::Gunner, 100.0, 100.0);
        let victim = store.add_player("victim".to_string(), PlayerClass::Mage, 500.0, 500.0);
        (store, shooter, victim)
    }

    fn fire_at(store: &mut EntityStore, owner: u32, weapon: Weapon, x: f32, y: f32) -> u32 {
        if let Some(player) = store.players.get_mut(&owner) {
            player.equipped = weapon;
        }
        store.spawn_projectile(owner, weapon, (x, y), (0.0, 0.0), PROJECTILE_RADIUS)
    }

    #[test]
    fn test_hit_applies_class_and_damage_multipliers_through_shield() {
        let (mut store, shooter, victim) = store_with_pair();
        store.players.get_mut(&shooter).unwrap().damage_multiplier = 2.0;
        store.players.get_mut(&victim).unwrap().shield = 10.0;
        fire_at(&mut store, shooter, Weapon::Pistol, 505.0, 500.0);

        let reports = resolve_projectile_hits(&mut store);

        assert_eq!(reports.len(), 1);
        let victim = &store.players[&victim];
        assert_eq!(victim.shield, 0.0);
        assert_approx_eq!(victim.health, 58.0, 1e-4);
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_ignores_its_owner() {
        let (mut store, shooter, _) = store_with_pair();
        fire_at(&mut store, shooter, Weapon::Pistol, 100.0, 100.0);

        assert!(resolve_projectile_hits(&mut store).is_empty());
        assert_eq!(store.projectiles.len(), 1);
        assert_eq!(store.players[&shooter].health, 100.0);
    }

    #[test]
    fn test_missing_shooter_deals_no_damage_but_consumes_projectile() {
        let (mut store, shooter, victim) = store_with_pair();
        fire_at(&mut store, shooter, Weapon::Sniper, 500.0, 500.0);
        store.remove_player(shooter);

        let reports = resolve_projectile_hits(&mut store);

        assert_eq!(reports.len(), 1);
        assert!(reports[0].damage.is_none());
        assert_eq!(store.players[&victim].health, 100.0);
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn test_lethal_hit_removes_victim_and_scores() {
        let (mut store, shooter, victim) = store_with_pair();
        store.players.get_mut(&victim).unwrap().health = 5.0;
        fire_at(&mut store, shooter, Weapon::SubmachineGun, 500.0, 500.0);
        // Second projectile on the same spot finds nobody left to hit
        fire_at(&mut store, shooter, Weapon::SubmachineGun, 500.0, 500.0);

        let reports = resolve_projectile_hits(&mut store);

        assert_eq!(reports.len(), 1);
        let eliminated = reports[0].eliminated.as_ref().unwrap();
        assert_eq!(eliminated.id, victim);
        assert!(!store.players.contains_key(&victim));
        assert_eq!(store.players[&shooter].score, 1);
        assert_eq!(store.projectiles.len(), 1);
    }

    #[test]
    fn test_report_carries_fire_flag() {
        let (mut store, shooter, _) = store_with_pair();
        store.players.get_mut(&shooter).unwrap().has_fire = true;
        fire_at(&mut store, shooter, Weapon::Shuriken, 500.0, 500.0);

        let reports = resolve_projectile_hits(&mut store);
        assert!(reports[0].shooter_has_fire);
        assert_eq!(reports[0].weapon, Weapon::Shuriken);
    }

    #[test]
    fn test_switching_weapon_mid_flight_uses_equipped_damage() {
        let (mut store, shooter, victim) = store_with_pair();
        fire_at(&mut store, shooter, Weapon::Sniper, 500.0, 500.0);
        store.players.get_mut(&shooter).unwrap().equipped = Weapon::Fist;

        let reports = resolve_projectile_hits(&mut store);

        // Fist 40 scaled by the gunner's light multiplier of 1.3
        assert_approx_eq!(store.players[&victim].health, 48.0, 1e-4);
        assert_eq!(reports[0].weapon, Weapon::Fist);
    }

    #[test]
    fn test_touching_edges_is_not_a_hit() {
        let (mut store, shooter, _) = store_with_pair();
        // Mage radius 12 plus projectile radius 5
        fire_at(&mut store, shooter, Weapon::Pistol, 517.0, 500.0);

        assert!(resolve_projectile_hits(&mut store).is_empty());
    }
}
