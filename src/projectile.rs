use crate::engine::Rect;
use crate::player::PelletSpawn;
use crate::settings::{PELLET_SPEED, VIEWPORT_WIDTH};
use crate::sprite::Frame;

/// Result of advancing a pellet one update
/// - Active  : still (at least partly) on screen
/// - Removed : fully left the viewport, terminal
pub enum Flight {
    Active(Pellet),
    Removed,
}

/// Buster shot. Moves in world space, keeps the screen height it was fired at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pellet {
    frame: Frame,
    world_x: f32,
    screen_y: f32,
    velocity_x: f32,
}

impl Pellet {
    pub fn new(frame: Frame, spawn: PelletSpawn) -> Self {
        Pellet {
            frame,
            world_x: spawn.world_x,
            screen_y: spawn.screen_y,
            velocity_x: PELLET_SPEED * spawn.direction.sign(),
        }
    }

    /// Consumes the pellet, a removed pellet can't come back
    pub fn update(mut self, camera_offset: f32) -> Flight {
        self.world_x += self.velocity_x;
        let rect = self.screen_rect(camera_offset);
        if rect.right() < 0.0 || rect.left() > VIEWPORT_WIDTH {
            Flight::Removed
        } else {
            Flight::Active(self)
        }
    }

    /// Centered on (world_x - camera_offset, screen_y)
    pub fn screen_rect(&self, camera_offset: f32) -> Rect {
        let size = self.frame.size();
        Rect {
            x: self.world_x - camera_offset - size.width * 0.5,
            y: self.screen_y - size.height * 0.5,
            width: size.width,
            height: size.height,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn world_x(&self) -> f32 {
        self.world_x
    }

    pub fn velocity_x(&self) -> f32 {
        self.velocity_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Facing;
    use crate::sprite::hunter::Animations;
    use approx::assert_relative_eq;

    fn pellet(world_x: f32, direction: Facing) -> Pellet {
        Pellet::new(
            Animations::default().pellet,
            PelletSpawn {
                world_x,
                screen_y: 380.0,
                direction,
            },
        )
    }

    fn active(flight: Flight) -> Pellet {
        match flight {
            Flight::Active(pellet) => pellet,
            Flight::Removed => panic!("pellet should still be flying"),
        }
    }

    #[test]
    fn velocity_follows_direction() {
        assert_relative_eq!(pellet(0.0, Facing::Right).velocity_x(), PELLET_SPEED);
        assert_relative_eq!(pellet(0.0, Facing::Left).velocity_x(), -PELLET_SPEED);
    }

    #[test]
    fn screen_rect_is_world_minus_camera() {
        let moved = active(pellet(500.0, Facing::Right).update(100.0));
        assert_relative_eq!(moved.world_x(), 512.0);
        let rect = moved.screen_rect(100.0);
        assert_relative_eq!(rect.center().x, 412.0);
        assert_relative_eq!(rect.center().y, 380.0);
    }

    #[test]
    fn removed_once_fully_past_the_right_edge() {
        // 28px wide, left edge = center - 14
        let camera_offset = 0.0;
        let edge = VIEWPORT_WIDTH + 14.0;
        let touching = active(pellet(edge - PELLET_SPEED, Facing::Right).update(camera_offset));
        assert_relative_eq!(touching.screen_rect(camera_offset).left(), VIEWPORT_WIDTH);
        assert!(matches!(touching.update(camera_offset), Flight::Removed));
    }

    #[test]
    fn removed_once_fully_past_the_left_edge() {
        let camera_offset = 1000.0;
        let start = 1000.0 - 14.0 + PELLET_SPEED;
        let touching = active(pellet(start, Facing::Left).update(camera_offset));
        assert_relative_eq!(touching.screen_rect(camera_offset).right(), 0.0);
        assert!(matches!(touching.update(camera_offset), Flight::Removed));
    }

    #[test]
    fn camera_moving_along_keeps_it_alive() {
        let mut pellet = pellet(480.0, Facing::Right);
        let mut camera_offset = 0.0;
        for _ in 0..200 {
            camera_offset += PELLET_SPEED;
            pellet = active(pellet.update(camera_offset));
        }
    }
}
