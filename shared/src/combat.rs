//! Pure movement and damage math
//!
//! These functions carry no state and are used identically by the server's
//! simulation and the client's prediction replay, so both sides agree on
//! where a sequence of inputs leaves a player.

use crate::entity::{PlayerClass, Projectile, Weapon};
use crate::{MOVE_STEP, MULTI_SHOT_SPREAD};

/// Rectangular world, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Converts a direction input into a position delta for a player moving at `speed`
pub fn movement_delta(dir_x: f32, dir_y: f32, speed: f32) -> (f32, f32) {
    (dir_x * MOVE_STEP * speed, dir_y * MOVE_STEP * speed)
}

/// Keeps a circle of `radius` entirely inside the world.
///
/// Non-finite coordinates are reset to the world centre before clamping.
pub fn clamp_to_world(x: f32, y: f32, radius: f32, bounds: WorldBounds) -> (f32, f32) {
    let x = if x.is_finite() { x } else { bounds.width / 2.0 };
    let y = if y.is_finite() { y } else { bounds.height / 2.0 };

    let max_x = (bounds.width - radius).max(radius);
    let max_y = (bounds.height - radius).max(radius);

    (x.clamp(radius, max_x), y.clamp(radius, max_y))
}

/// Applies a raw position delta and clamps the result
pub fn apply_movement(
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    radius: f32,
    bounds: WorldBounds,
) -> (f32, f32) {
    clamp_to_world(x + dx, y + dy, radius, bounds)
}

pub fn advance_projectile(projectile: &mut Projectile) {
    projectile.x += projectile.vel_x;
    projectile.y += projectile.vel_y;
}

/// True once the circle has fully left the world on any side.
///
/// A projectile whose centre has crossed an edge (e.g. `x < 0`) but whose
/// circle still touches the world is kept until the whole circle is out.
pub fn is_out_of_bounds(x: f32, y: f32, radius: f32, bounds: WorldBounds) -> bool {
    if !x.is_finite() || !y.is_finite() {
        return true;
    }

    x - radius >= bounds.width || x + radius <= 0.0 || y - radius >= bounds.height || y + radius <= 0.0
}

/// Strict overlap test between two circles
pub fn circles_overlap(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt() < ar + br
}

pub fn projectile_velocity(angle: f32, speed: f32) -> (f32, f32) {
    (angle.cos() * speed, angle.sin() * speed)
}

/// Firing angles for one trigger pull: the aimed angle, plus one shot either
/// side when multi-shot is active
pub fn shot_angles(angle: f32, multi_shot: bool) -> Vec<f32> {
    if multi_shot {
        vec![angle, angle - MULTI_SHOT_SPREAD, angle + MULTI_SHOT_SPREAD]
    } else {
        vec![angle]
    }
}

/// Damage a single hit deals before shield absorption
pub fn raw_damage(weapon: Weapon, shooter_class: PlayerClass, damage_multiplier: f32) -> f32 {
    weapon.damage() * shooter_class.weapon_multiplier(weapon.weapon_type()) * damage_multiplier
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub shield_absorbed: f32,
    pub health_lost: f32,
}

/// Applies `damage` to a shield-then-health pool.
///
/// The shield floors at zero and health is never increased; a non-positive
/// or non-finite amount is treated as zero.
pub fn absorb_damage(shield: &mut f32, health: &mut f32, damage: f32) -> DamageOutcome {
    let damage = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
    let available_shield = shield.max(0.0);

    let shield_absorbed = damage.min(available_shield);
    let health_lost = damage - shield_absorbed;

    *shield = available_shield - shield_absorbed;
    *health -= health_lost;

    DamageOutcome {
        shield_absorbed,
        health_lost,
    }
}

/// Moves `current` a fixed fraction of the way towards `target`
pub fn smooth_towards(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn world() -> WorldBounds {
        WorldBounds::new(1000.0, 1000.0)
    }

    #[test]
    fn test_large_left_move_clamps_to_radius() {
        let (x, y) = apply_movement(500.0, 500.0, -600.0, 0.0, 14.0, world());
        assert_eq!(x, 14.0);
        assert_eq!(y, 500.0);
    }

    #[test]
    fn test_clamp_keeps_circle_inside_every_edge() {
        let radius = 12.0;
        for (x, y) in [(-50.0, -50.0), (2000.0, 2000.0), (0.0, 999.0), (500.0, 1.0)] {
            let (cx, cy) = clamp_to_world(x, y, radius, world());
            assert!(cx >= radius && cx <= 1000.0 - radius);
            assert!(cy >= radius && cy <= 1000.0 - radius);
        }
    }

    #[test]
    fn test_clamp_recovers_from_nan() {
        let (x, y) = clamp_to_world(f32::NAN, f32::INFINITY, 10.0, world());
        assert_eq!(x, 500.0);
        assert_eq!(y, 500.0);
    }

    #[test]
    fn test_movement_delta_scales_by_five_times_speed() {
        let (dx, dy) = movement_delta(-1.0, 0.0, 1.2);
        assert_approx_eq!(dx, -6.0, 1e-5);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn test_out_of_bounds_requires_full_exit() {
        assert!(!is_out_of_bounds(2.0, 500.0, 5.0, world()));
        assert!(is_out_of_bounds(-5.0, 500.0, 5.0, world()));
        // Centre past the edge with the circle still overlapping the world
        assert!(!is_out_of_bounds(-4.0, 500.0, 5.0, world()));
        assert!(is_out_of_bounds(-1.0, 500.0, 0.5, world()));
        assert!(is_out_of_bounds(500.0, 1005.0, 5.0, world()));
        assert!(is_out_of_bounds(f32::NAN, 500.0, 5.0, world()));
    }

    #[test]
    fn test_circles_touching_do_not_overlap() {
        assert!(!circles_overlap(0.0, 0.0, 5.0, 10.0, 0.0, 5.0));
        assert!(circles_overlap(0.0, 0.0, 5.0, 9.9, 0.0, 5.0));
    }

    #[test]
    fn test_raw_damage_combines_all_multipliers() {
        // Gunner light multiplier is 1.3
        let damage = raw_damage(Weapon::Pistol, PlayerClass::Gunner, 2.0);
        assert_approx_eq!(damage, 52.0, 1e-4);
    }

    #[test]
    fn test_shield_partially_absorbs() {
        let mut shield = 10.0;
        let mut health = 100.0;
        let outcome = absorb_damage(&mut shield, &mut health, 52.0);

        assert_eq!(shield, 0.0);
        assert_approx_eq!(health, 58.0, 1e-4);
        assert_approx_eq!(outcome.shield_absorbed, 10.0, 1e-4);
        assert_approx_eq!(outcome.health_lost, 42.0, 1e-4);
    }

    #[test]
    fn test_shield_fully_absorbs() {
        let mut shield = 50.0;
        let mut health = 100.0;
        absorb_damage(&mut shield, &mut health, 20.0);

        assert_eq!(shield, 30.0);
        assert_eq!(health, 100.0);
    }

    #[test]
    fn test_damage_monotonicity() {
        for s in [0.0_f32, 5.0, 20.0, 75.0] {
            for d in [0.0_f32, 1.0, 20.0, 52.0, 200.0] {
                let mut shield = s;
                let mut health = 100.0;
                absorb_damage(&mut shield, &mut health, d);

                assert_approx_eq!(shield, (s - d).max(0.0), 1e-4);
                assert_approx_eq!(100.0 - health, (d - s).max(0.0), 1e-4);
                assert!(health <= 100.0);
            }
        }
    }

    #[test]
    fn test_negative_damage_never_heals() {
        let mut shield = 0.0;
        let mut health = 40.0;
        absorb_damage(&mut shield, &mut health, -15.0);
        assert_eq!(health, 40.0);
    }

    #[test]
    fn test_multi_shot_fans_out() {
        let angles = shot_angles(1.0, true);
        assert_eq!(angles.len(), 3);
        assert_approx_eq!(angles[1], 1.0 - MULTI_SHOT_SPREAD, 1e-6);
        assert_approx_eq!(angles[2], 1.0 + MULTI_SHOT_SPREAD, 1e-6);
        assert_eq!(shot_angles(1.0, false), vec![1.0]);
    }

    #[test]
    fn test_smoothing_halves_distance() {
        assert_eq!(smooth_towards(0.0, 100.0, 0.5), 50.0);
        assert_eq!(smooth_towards(50.0, 100.0, 0.5), 75.0);
    }
}
