use glam::Vec3;

use vsim_engine::input::{InputEvent, Key, KeyState};

/// What a key press asks the render loop to do.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    /// Move the camera eye by this offset.
    MoveEye(Vec3),
    ToggleRain,
    Exit,
}

/// Maps key presses to [`Command`]s.
///
/// W/S move along Z, A/D along X and Q/E along Y, one `step` per press.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Controls {
    step: f32,
}

impl Controls {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    pub fn map(&self, key: Key) -> Option<Command> {
        let s = self.step;
        let cmd = match key {
            Key::Escape => Command::Exit,
            Key::W => Command::MoveEye(Vec3::new(0.0, 0.0, s)),
            Key::S => Command::MoveEye(Vec3::new(0.0, 0.0, -s)),
            Key::A => Command::MoveEye(Vec3::new(-s, 0.0, 0.0)),
            Key::D => Command::MoveEye(Vec3::new(s, 0.0, 0.0)),
            Key::Q => Command::MoveEye(Vec3::new(0.0, -s, 0.0)),
            Key::E => Command::MoveEye(Vec3::new(0.0, s, 0.0)),
            Key::I => Command::ToggleRain,
            _ => return None,
        };
        Some(cmd)
    }

    /// Key releases carry no command.
    pub fn on_key_up(&self, _key: Key) {}

    /// Translates one input event. Every press maps, repeats included.
    pub fn handle(&self, event: &InputEvent) -> Option<Command> {
        match *event {
            InputEvent::Key { key, state: KeyState::Pressed, .. } => self.map(key),
            InputEvent::Key { key, state: KeyState::Released, .. } => {
                self.on_key_up(key);
                None
            }
            _ => None,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(1.0)
    }
}
