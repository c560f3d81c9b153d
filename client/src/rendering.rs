use crate::game::{ClientGameState, RenderedPlayer};
use macroquad::prelude::*;
use shared::{Pickup, PickupKind, PowerUpKind, Weapon};

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub ping_ms: u64,
    pub fake_ping_ms: u64,
}

/// Maps world coordinates to the screen so the local player stays centred
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Camera {
    pub fn centred_on(x: f32, y: f32, screen_width: f32, screen_height: f32) -> Self {
        Self {
            offset_x: screen_width / 2.0 - x,
            offset_y: screen_height / 2.0 - y,
        }
    }

    pub fn to_screen(self, x: f32, y: f32) -> (f32, f32) {
        (x + self.offset_x, y + self.offset_y)
    }

    pub fn to_world(self, x: f32, y: f32) -> (f32, f32) {
        (x - self.offset_x, y - self.offset_y)
    }
}

/// Camera for the current frame: on the local player, or the world centre
pub fn frame_camera(game: &ClientGameState) -> Camera {
    let (x, y) = match game.local_player() {
        Some(local) => (local.draw_x, local.draw_y),
        None => (game.bounds.width / 2.0, game.bounds.height / 2.0),
    };
    Camera::centred_on(x, y, screen_width(), screen_height())
}

fn weapon_color(weapon: Weapon) -> Color {
    match weapon {
        Weapon::Fist => LIGHTGRAY,
        Weapon::Pistol => Color::from_rgba(200, 200, 80, 255),
        Weapon::SubmachineGun => ORANGE,
        Weapon::Sniper => Color::from_rgba(80, 200, 255, 255),
        Weapon::Shuriken => Color::from_rgba(180, 180, 255, 255),
    }
}

fn power_up_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Health => GREEN,
        PowerUpKind::Speed => YELLOW,
        PowerUpKind::Damage => RED,
        PowerUpKind::Shield => BLUE,
        PowerUpKind::MultiShot => MAGENTA,
        PowerUpKind::RapidFire => ORANGE,
        PowerUpKind::Fire => Color::from_rgba(255, 90, 0, 255),
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn render(&mut self, game: &ClientGameState, config: UiConfig) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        let camera = frame_camera(game);
        self.draw_world_border(game, camera);

        for pickup in game.weapon_pickups.values().chain(game.power_up_pickups.values()) {
            self.draw_pickup(pickup, camera);
        }

        for projectile in &game.projectiles {
            let (x, y) = camera.to_screen(projectile.x, projectile.y);
            draw_circle(x, y, projectile.radius, weapon_color(projectile.weapon));
        }

        for player in game.players.values() {
            let is_local = Some(player.state.id) == game.local_id;
            self.draw_player(player, is_local, camera);
        }

        self.draw_ui(game, config);
    }

    fn draw_world_border(&mut self, game: &ClientGameState, camera: Camera) {
        let (x, y) = camera.to_screen(0.0, 0.0);
        draw_rectangle_lines(
            x,
            y,
            game.bounds.width,
            game.bounds.height,
            4.0,
            Color::from_rgba(68, 68, 68, 255),
        );
    }

    fn draw_pickup(&mut self, pickup: &Pickup, camera: Camera) {
        let (x, y) = camera.to_screen(pickup.x, pickup.y);
        match pickup.kind {
            PickupKind::Weapon(weapon) => {
                draw_rectangle_lines(
                    x - pickup.radius,
                    y - pickup.radius,
                    pickup.radius * 2.0,
                    pickup.radius * 2.0,
                    2.0,
                    weapon_color(weapon),
                );
                draw_text(weapon.name(), x - pickup.radius, y - pickup.radius - 4.0, 14.0, WHITE);
            }
            PickupKind::PowerUp(kind) => {
                draw_circle_lines(x, y, pickup.radius, 2.0, power_up_color(kind));
            }
        }
    }

    fn draw_player(&mut self, player: &RenderedPlayer, is_local: bool, camera: Camera) {
        let state = &player.state;
        let (x, y) = camera.to_screen(player.draw_x, player.draw_y);
        let color = if is_local {
            GREEN
        } else {
            Color::from_rgba(255, 68, 68, 255)
        };

        draw_circle(x, y, state.radius, color);
        if state.shield > 0.0 {
            draw_circle_lines(x, y, state.radius + 3.0, 2.0, BLUE);
        }
        if state.punching {
            draw_circle_lines(x, y, state.radius + 8.0, 1.0, WHITE);
        }

        // Health bar
        let bar_width = state.radius * 2.0;
        let fraction = (state.health / state.max_health).clamp(0.0, 1.0);
        let bar_y = y - state.radius - 8.0;
        draw_rectangle(x - state.radius, bar_y, bar_width, 4.0, DARKGRAY);
        draw_rectangle(x - state.radius, bar_y, bar_width * fraction, 4.0, GREEN);

        draw_text(&state.username, x - state.radius, bar_y - 4.0, 14.0, WHITE);
    }

    fn draw_ui(&mut self, game: &ClientGameState, config: UiConfig) {
        let y_start = 10.0;
        let indicator_size = 12.0;
        let spacing = 25.0;

        let features = [
            ("P", game.prediction_enabled),
            ("R", game.reconciliation_enabled),
            ("I", game.interpolation_enabled),
        ];

        for (i, (label, enabled)) in features.iter().enumerate() {
            let x = 10.0 + (i as f32) * spacing;
            let color = if *enabled { GREEN } else { RED };

            draw_rectangle(x, y_start, indicator_size, indicator_size, color);
            draw_rectangle_lines(x, y_start, indicator_size, indicator_size, 1.0, WHITE);

            draw_text(label, x + 3.0, y_start + indicator_size + 12.0, 12.0, WHITE);
        }

        let ping_text = format!("{}ms (+{} fake)", config.ping_ms, config.fake_ping_ms);
        draw_text(&ping_text, 10.0, y_start + 45.0, 16.0, WHITE);

        let mut line_y = y_start + 65.0;
        if let Some(local) = game.local_player() {
            let state = &local.state;
            let slots: Vec<&str> = state
                .inventory
                .iter()
                .map(|slot| slot.map_or("-", |weapon| weapon.name()))
                .collect();
            let status = format!(
                "HP {:.0}/{:.0}  Shield {:.0}  Score {}  [{}] holding {}",
                state.health,
                state.max_health,
                state.shield,
                state.score,
                slots.join(" | "),
                state.equipped.name()
            );
            draw_text(&status, 10.0, line_y, 16.0, WHITE);
            line_y += 20.0;

            let effects: Vec<&str> = state
                .active_power_ups
                .iter()
                .filter(|(_, effect)| effect.active)
                .map(|(kind, _)| kind.name())
                .collect();
            if !effects.is_empty() {
                draw_text(&effects.join(", "), 10.0, line_y, 16.0, YELLOW);
            }
        }

        if game.eliminated {
            let message = "Eliminated! Press Enter to respawn";
            draw_text(message, screen_width() / 2.0 - 150.0, screen_height() / 2.0, 24.0, RED);
        }

        let board_x = screen_width() - 200.0;
        draw_text("Leaderboard", board_x, 20.0, 18.0, WHITE);
        for (i, entry) in game.leaderboard.iter().enumerate() {
            let line = format!("{}. {} {}", i + 1, entry.username, entry.score);
            draw_text(&line, board_x, 40.0 + i as f32 * 16.0, 14.0, WHITE);
        }

        let feed_y = screen_height() - 20.0 * game.kill_feed.len() as f32;
        for (i, line) in game.kill_feed.iter().enumerate() {
            draw_text(line, 10.0, feed_y + i as f32 * 20.0, 16.0, LIGHTGRAY);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
