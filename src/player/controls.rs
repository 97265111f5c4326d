use crate::engine::KeyState;

// ==================== Key bindings ====================
// KeyboardEvent.code values, layout independent
const LEFT: &[&str] = &["ArrowLeft"];
const RIGHT: &[&str] = &["ArrowRight"];
const JUMP: &[&str] = &["KeyZ", "Space"];
const DASH: &[&str] = &["KeyX", "ShiftLeft", "ShiftRight"];
const SHOOT: &[&str] = &["KeyA", "KeyJ"];
const QUIT: &[&str] = &["Escape"];

pub const LEGEND: &str = "←/→ run | Z/SPACE jump | X/SHIFT dash | A/J shoot | ESC quit";

/// What the player is holding this update, decoupled from the keyboard
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dash: bool,
    pub shoot: bool,
    pub quit: bool,
}

impl Controls {
    pub fn from_keys(keys: &KeyState) -> Self {
        let held = |bindings: &[&str]| bindings.iter().any(|code| keys.is_pressed(code));
        Controls {
            left: held(LEFT),
            right: held(RIGHT),
            jump: held(JUMP),
            dash: held(DASH),
            shoot: held(SHOOT),
            quit: held(QUIT) || keys.quit_requested(),
        }
    }

    /// Actions held now that were not held in `previous`
    pub fn rising_edges(&self, previous: &Controls) -> Controls {
        Controls {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            jump: self.jump && !previous.jump,
            dash: self.dash && !previous.dash,
            shoot: self.shoot && !previous.shoot,
            quit: self.quit && !previous.quit,
        }
    }
}
