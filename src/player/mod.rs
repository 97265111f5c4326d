//! The hero : physics, actions and the pose shown on screen.
//!
//! Horizontal motion lives in world space (`world_x`), vertical motion in
//! screen space (`feet_y`). The screen rectangle is always derived from those
//! two plus the camera offset, never stored.
pub mod animation;
pub mod controls;

use self::animation::{Animator, Motion, Pose};
pub use self::controls::Controls;
use crate::engine::{Point, Rect};
use crate::settings::{
    DASH_SPEED, DASH_TIME_MS, GRAVITY, GROUND_Y, JUMP_VELOCITY, MUZZLE_FORWARD, MUZZLE_RISE,
    RUN_SPEED, SHOOT_COOLDOWN_MS, SPRITE_SCALE,
};
use crate::sprite::hunter::Animations;
use crate::sprite::{self, Frame};
use std::rc::Rc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 or +1
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Where and which way a new pellet starts
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PelletSpawn {
    pub world_x: f32,
    pub screen_y: f32,
    pub direction: Facing,
}

/// Intents the player hands back to whoever owns the world
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlayerCommand {
    Fire(PelletSpawn),
}

/// Countdowns in milliseconds, positive while the action runs
#[derive(Debug, Default, Copy, Clone, PartialEq)]
struct ActionTimers {
    dash: f32,
    shoot: f32,
    shoot_cooldown: f32,
}

pub struct Player {
    animations: Rc<Animations>,
    world_x: f32,
    feet_y: f32,
    velocity_x: f32,
    velocity_y: f32,
    speed: f32,
    facing: Facing,
    on_ground: bool,
    timers: ActionTimers,
    animator: Animator,
    pose: Pose,
    previous: Controls,
}

impl Player {
    pub fn new(animations: Rc<Animations>) -> Self {
        Player {
            animations,
            world_x: 0.0,
            feet_y: GROUND_Y,
            velocity_x: 0.0,
            velocity_y: 0.0,
            speed: RUN_SPEED,
            facing: Facing::Right,
            on_ground: true,
            timers: ActionTimers::default(),
            animator: Animator::default(),
            pose: Pose::STANDING,
            previous: Controls::default(),
        }
    }

    /// input, then physics, then animation
    pub fn update(&mut self, delta_ms: f32, controls: Controls) -> Vec<PlayerCommand> {
        let commands = self.handle_input(controls);
        self.apply_physics(delta_ms);
        self.animate(delta_ms);
        commands
    }

    pub fn handle_input(&mut self, controls: Controls) -> Vec<PlayerCommand> {
        let mut commands = Vec::new();
        let pressed = controls.rising_edges(&self.previous);
        self.previous = controls;

        self.velocity_x = 0.0;
        if controls.left {
            self.velocity_x = -self.speed;
            self.facing = Facing::Left;
        }
        // right is checked last and wins when both are held
        if controls.right {
            self.velocity_x = self.speed;
            self.facing = Facing::Right;
        }

        if pressed.jump {
            self.jump();
        }
        if pressed.dash {
            self.start_dash();
        }
        if pressed.shoot {
            commands.extend(self.shoot());
        }
        commands
    }

    /// Grounded only, airborne presses are dropped
    pub fn jump(&mut self) {
        if !self.on_ground {
            return;
        }
        self.velocity_y = JUMP_VELOCITY;
        self.on_ground = false;
        self.animator.restart_jump();
    }

    pub fn start_dash(&mut self) {
        if self.on_ground && self.timers.dash <= 0.0 {
            self.timers.dash = DASH_TIME_MS;
            self.speed = DASH_SPEED;
        }
    }

    pub fn shoot(&mut self) -> Option<PlayerCommand> {
        if self.timers.shoot_cooldown > 0.0 {
            return None;
        }
        self.timers.shoot = SHOOT_COOLDOWN_MS;
        self.timers.shoot_cooldown = SHOOT_COOLDOWN_MS;

        let forward = MUZZLE_FORWARD * SPRITE_SCALE * self.facing.sign();
        let center_y = self.feet_y - self.frame().size().height * 0.5;
        Some(PlayerCommand::Fire(PelletSpawn {
            world_x: self.world_x + forward,
            screen_y: center_y - MUZZLE_RISE * SPRITE_SCALE,
            direction: self.facing,
        }))
    }

    pub fn apply_physics(&mut self, delta_ms: f32) {
        self.world_x = (self.world_x + self.velocity_x).max(0.0);

        self.velocity_y += GRAVITY;
        self.feet_y += self.velocity_y;
        if self.feet_y >= GROUND_Y {
            self.feet_y = GROUND_Y;
            self.velocity_y = 0.0;
            self.on_ground = true;
        }

        if self.timers.dash > 0.0 {
            self.timers.dash -= delta_ms;
            if self.timers.dash <= 0.0 {
                self.speed = RUN_SPEED;
            }
        }
        if self.timers.shoot > 0.0 {
            self.timers.shoot -= delta_ms;
        }
        if self.timers.shoot_cooldown > 0.0 {
            self.timers.shoot_cooldown -= delta_ms;
        }
    }

    pub fn animate(&mut self, delta_ms: f32) {
        let motion = Motion {
            on_ground: self.on_ground,
            velocity_x: self.velocity_x,
            velocity_y: self.velocity_y,
            dash_timer: self.timers.dash,
            shoot_timer: self.timers.shoot,
        };
        self.pose = self.animator.animate(&motion, &self.animations, delta_ms);
    }

    pub fn frame(&self) -> Frame {
        self.pose.frame(&self.animations, self.facing)
    }

    /// Where the current frame is drawn. The bottom-center is pinned to
    /// (world_x - camera_offset, feet_y) whatever frame is showing.
    pub fn screen_rect(&self, camera_offset: f32) -> Rect {
        sprite::anchor_bottom_center(
            self.frame().size(),
            Point {
                x: self.world_x - camera_offset,
                y: self.feet_y,
            },
        )
    }

    pub fn world_x(&self) -> f32 {
        self.world_x
    }

    pub fn velocity_x(&self) -> f32 {
        self.velocity_x
    }

    pub fn velocity_y(&self) -> f32 {
        self.velocity_y
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn dash_timer(&self) -> f32 {
        self.timers.dash
    }

    pub fn shoot_timer(&self) -> f32 {
        self.timers.shoot
    }

    pub fn shoot_cooldown(&self) -> f32 {
        self.timers.shoot_cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::animation::Action;
    use super::*;
    use crate::settings::PELLET_SPEED;
    use approx::assert_relative_eq;

    const DT: f32 = 16.0;

    fn player() -> Player {
        Player::new(Rc::new(Animations::default()))
    }

    fn holding(configure: impl FnOnce(&mut Controls)) -> Controls {
        let mut controls = Controls::default();
        configure(&mut controls);
        controls
    }

    #[test]
    fn physics_moves_by_velocity_and_clamps_at_zero() {
        let mut player = player();
        player.world_x = 10.0;
        player.velocity_x = 4.0;
        player.apply_physics(DT);
        assert_relative_eq!(player.world_x(), 14.0);

        player.velocity_x = -8.0;
        player.apply_physics(0.0);
        assert_relative_eq!(player.world_x(), 6.0);
        player.apply_physics(0.0);
        assert_relative_eq!(player.world_x(), 0.0);
    }

    #[test]
    fn right_wins_when_both_held() {
        let mut player = player();
        player.handle_input(holding(|c| {
            c.left = true;
            c.right = true;
        }));
        assert_relative_eq!(player.velocity_x(), RUN_SPEED);
        assert_eq!(player.facing(), Facing::Right);

        player.handle_input(holding(|c| c.left = true));
        assert_relative_eq!(player.velocity_x(), -RUN_SPEED);
        assert_eq!(player.facing(), Facing::Left);

        player.handle_input(Controls::default());
        assert_relative_eq!(player.velocity_x(), 0.0);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn jump_needs_ground_and_a_fresh_press() {
        let mut player = player();
        let jump = holding(|c| c.jump = true);

        player.update(DT, jump);
        assert!(!player.is_on_ground());
        assert!(player.velocity_y() < 0.0);

        // released then pressed again in the air : no double jump
        player.update(DT, Controls::default());
        let before = player.velocity_y();
        player.update(DT, jump);
        assert_relative_eq!(player.velocity_y(), before + GRAVITY);
    }

    #[test]
    fn held_jump_does_not_rejump_on_landing() {
        let mut player = player();
        let jump = holding(|c| c.jump = true);
        for _ in 0..120 {
            player.update(DT, jump);
        }
        assert!(player.is_on_ground());
        assert_relative_eq!(player.velocity_y(), 0.0);
    }

    #[test]
    fn jump_lands_back_on_the_ground_line() {
        let mut player = player();
        player.update(DT, holding(|c| c.jump = true));
        let mut peak = GROUND_Y;
        for _ in 0..120 {
            player.update(DT, Controls::default());
            peak = peak.min(player.feet_y);
        }
        assert!(peak < GROUND_Y);
        assert!(player.is_on_ground());
        assert_relative_eq!(player.feet_y, GROUND_Y);
    }

    #[test]
    fn dash_while_dashing_is_a_no_op() {
        let mut player = player();
        player.start_dash();
        assert_relative_eq!(player.dash_timer(), DASH_TIME_MS);
        assert_relative_eq!(player.speed(), DASH_SPEED);

        player.apply_physics(100.0);
        player.start_dash();
        assert_relative_eq!(player.dash_timer(), DASH_TIME_MS - 100.0);
    }

    #[test]
    fn dash_needs_ground() {
        let mut player = player();
        player.jump();
        player.start_dash();
        assert_relative_eq!(player.dash_timer(), 0.0);
        assert_relative_eq!(player.speed(), RUN_SPEED);
    }

    #[test]
    fn dash_speed_reverts_exactly_when_timer_runs_out() {
        let mut player = player();
        player.start_dash();
        player.apply_physics(DASH_TIME_MS - 1.0);
        assert_relative_eq!(player.speed(), DASH_SPEED);
        player.apply_physics(1.0);
        assert!(player.dash_timer() <= 0.0);
        assert_relative_eq!(player.speed(), RUN_SPEED);
    }

    #[test]
    fn dash_speed_applies_to_movement_from_next_update() {
        let mut player = player();
        let dash_right = holding(|c| {
            c.right = true;
            c.dash = true;
        });
        player.update(DT, dash_right);
        assert_relative_eq!(player.world_x(), RUN_SPEED);
        player.update(DT, dash_right);
        assert_relative_eq!(player.world_x(), RUN_SPEED + DASH_SPEED);
    }

    #[test]
    fn shoot_sets_both_timers_and_spawns_one_pellet() {
        let mut player = player();
        player.facing = Facing::Left;
        player.world_x = 200.0;

        let command = player.shoot();
        assert_relative_eq!(player.shoot_timer(), SHOOT_COOLDOWN_MS);
        assert_relative_eq!(player.shoot_cooldown(), SHOOT_COOLDOWN_MS);

        let Some(PlayerCommand::Fire(spawn)) = command else {
            panic!("expected a pellet");
        };
        assert_eq!(spawn.direction, Facing::Left);
        assert_relative_eq!(spawn.world_x, 200.0 - MUZZLE_FORWARD * SPRITE_SCALE);
        let body = player.screen_rect(0.0);
        assert_relative_eq!(spawn.screen_y, body.center().y - MUZZLE_RISE * SPRITE_SCALE);
        assert_relative_eq!(PELLET_SPEED * spawn.direction.sign(), -PELLET_SPEED);
    }

    #[test]
    fn shoot_during_cooldown_is_a_no_op() {
        let mut player = player();
        assert!(player.shoot().is_some());
        player.apply_physics(50.0);

        assert!(player.shoot().is_none());
        assert_relative_eq!(player.shoot_timer(), SHOOT_COOLDOWN_MS - 50.0);
        assert_relative_eq!(player.shoot_cooldown(), SHOOT_COOLDOWN_MS - 50.0);
    }

    #[test]
    fn shoot_fires_on_press_not_while_held() {
        let mut player = player();
        let shoot = holding(|c| c.shoot = true);
        let mut fired = 0;
        for _ in 0..60 {
            fired += player.update(DT, shoot).len();
        }
        assert_eq!(fired, 1);

        player.update(DT, Controls::default());
        assert_eq!(player.update(DT, shoot).len(), 1);
    }

    #[test]
    fn shoot_pose_shows_on_the_ground() {
        let mut player = player();
        player.update(DT, holding(|c| c.shoot = true));
        assert_eq!(player.pose().action, Action::Shoot);
        for _ in 0..12 {
            player.update(DT, Controls::default());
        }
        assert_eq!(player.pose().action, Action::Idle);
    }

    #[test]
    fn frame_swaps_keep_the_feet_planted() {
        let mut player = player();
        player.world_x = 300.0;
        let camera_offset = 120.0;
        let standing = player.screen_rect(camera_offset);

        player.update(DT, holding(|c| c.dash = true));
        assert_eq!(player.pose().action, Action::Dash);
        let dashing = player.screen_rect(camera_offset);

        assert_ne!(standing.height, dashing.height);
        assert_eq!(standing.mid_bottom(), dashing.mid_bottom());
        assert_relative_eq!(dashing.mid_bottom().x, 180.0);
    }

    #[test]
    fn airborne_pose_is_a_jump_frame() {
        let mut player = player();
        player.update(DT, holding(|c| c.jump = true));
        assert_eq!(player.pose().action, Action::Jump);
        assert!(player.pose().index < 3);
    }
}
