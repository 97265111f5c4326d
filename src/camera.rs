use crate::settings::VIEWPORT_WIDTH;

/// Horizontal scroll, the player stays centered. Not clamped to the world,
/// so near the start the offset is negative.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Camera {
    offset: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    pub fn update(&mut self, player_world_x: f32) {
        self.offset = player_world_x - VIEWPORT_WIDTH / 2.0;
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}
