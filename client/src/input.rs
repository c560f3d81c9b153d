//! Keyboard and mouse sampling with change detection

use macroquad::prelude::*;
use shared::InputAction;
use std::time::{Duration, Instant};

/// Minimum spacing between movement commands
const MOVE_INTERVAL: Duration = Duration::from_millis(16);
/// Minimum spacing between shoot requests while the button is held
const SHOOT_INTERVAL: Duration = Duration::from_millis(50);

/// What the player asked for during one frame
#[derive(Debug, Default)]
pub struct FrameInput {
    /// (prediction, reconciliation, interpolation)
    pub toggles: (bool, bool, bool),
    pub respawn: bool,
    pub actions: Vec<InputAction>,
    /// Cursor position in screen space when a shot was requested
    pub shoot_at: Option<(f32, f32)>,
}

/// Turns held direction keys into a unit direction, or None when idle
pub fn movement_direction(up: bool, down: bool, left: bool, right: bool) -> Option<(f32, f32)> {
    let dx = right as i8 - left as i8;
    let dy = down as i8 - up as i8;
    if dx == 0 && dy == 0 {
        return None;
    }

    let (dx, dy) = (dx as f32, dy as f32);
    let length = (dx * dx + dy * dy).sqrt();
    Some((dx / length, dy / length))
}

/// Samples macroquad input each frame and turns it into game actions
pub struct InputManager {
    last_move_sent: Instant,
    last_shot_sent: Instant,

    // Previous frame key states for edge detection
    prev_key_1: bool,
    prev_key_2: bool,
    prev_key_3: bool,
    prev_key_q: bool,
    prev_key_f: bool,
    prev_key_e: bool,
    prev_key_f1: bool,
    prev_key_f2: bool,
    prev_key_f3: bool,
    prev_key_enter: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            last_move_sent: Instant::now(),
            last_shot_sent: Instant::now(),
            prev_key_1: false,
            prev_key_2: false,
            prev_key_3: false,
            prev_key_q: false,
            prev_key_f: false,
            prev_key_e: false,
            prev_key_f1: false,
            prev_key_f2: false,
            prev_key_f3: false,
            prev_key_enter: false,
        }
    }

    pub fn update(&mut self) -> FrameInput {
        let mut frame = FrameInput::default();

        // Movement (WASD or arrow keys)
        let up = is_key_down(KeyCode::W) || is_key_down(KeyCode::Up);
        let down = is_key_down(KeyCode::S) || is_key_down(KeyCode::Down);
        let left = is_key_down(KeyCode::A) || is_key_down(KeyCode::Left);
        let right = is_key_down(KeyCode::D) || is_key_down(KeyCode::Right);

        if let Some((dx, dy)) = movement_direction(up, down, left, right) {
            if self.last_move_sent.elapsed() >= MOVE_INTERVAL {
                frame.actions.push(InputAction::Move { dx, dy });
                self.last_move_sent = Instant::now();
            }
        }

        let key_1 = is_key_down(KeyCode::Key1);
        let key_2 = is_key_down(KeyCode::Key2);
        let key_3 = is_key_down(KeyCode::Key3);
        let key_q = is_key_down(KeyCode::Q);
        let key_f = is_key_down(KeyCode::F);
        let key_e = is_key_down(KeyCode::E);
        let key_f1 = is_key_down(KeyCode::F1);
        let key_f2 = is_key_down(KeyCode::F2);
        let key_f3 = is_key_down(KeyCode::F3);
        let key_enter = is_key_down(KeyCode::Enter);

        // Detect key press events (current && !previous)
        if key_1 && !self.prev_key_1 {
            frame.actions.push(InputAction::SelectSlot { slot: 0 });
        }
        if key_2 && !self.prev_key_2 {
            frame.actions.push(InputAction::SelectSlot { slot: 1 });
        }
        if key_3 && !self.prev_key_3 {
            frame.actions.push(InputAction::SelectSlot { slot: 2 });
        }
        if key_q && !self.prev_key_q {
            frame.actions.push(InputAction::DropWeapon);
        }
        if key_f && !self.prev_key_f {
            frame.actions.push(InputAction::PickUpWeapon);
        }
        if key_e && !self.prev_key_e {
            frame.actions.push(InputAction::Punch);
        }
        frame.toggles = (
            key_f1 && !self.prev_key_f1,
            key_f2 && !self.prev_key_f2,
            key_f3 && !self.prev_key_f3,
        );
        frame.respawn = key_enter && !self.prev_key_enter;

        self.prev_key_1 = key_1;
        self.prev_key_2 = key_2;
        self.prev_key_3 = key_3;
        self.prev_key_q = key_q;
        self.prev_key_f = key_f;
        self.prev_key_e = key_e;
        self.prev_key_f1 = key_f1;
        self.prev_key_f2 = key_f2;
        self.prev_key_f3 = key_f3;
        self.prev_key_enter = key_enter;

        if is_mouse_button_down(MouseButton::Left) && self.last_shot_sent.elapsed() >= SHOOT_INTERVAL
        {
            frame.shoot_at = Some(mouse_position());
            self.last_shot_sent = Instant::now();
        }

        frame
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
