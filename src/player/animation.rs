use super::Facing;
use crate::settings::{
    APEX_BAND, DASH_SECOND_FRAME_AT, DASH_TIME_MS, JUMP_ANIM_MS, MOVE_DEADZONE, RUN_ANIM_MS,
};
use crate::sprite::hunter::Animations;
use crate::sprite::{Frame, FrameSet};

// first frames of the jump strip loop while rising, the apex frame follows
const ASCENT_FRAMES: usize = 3;
const APEX_FRAME: usize = 3;
const FIRST_DESCENT_FRAME: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Idle,
    Run,
    Jump,
    Dash,
    Shoot,
}

/// Which frame the player shows
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pose {
    pub action: Action,
    pub index: usize,
}

impl Pose {
    pub const STANDING: Pose = Pose {
        action: Action::Idle,
        index: 0,
    };

    pub fn frame(&self, animations: &Animations, facing: Facing) -> Frame {
        frames_for(animations, self.action).frame(facing, self.index)
    }
}

fn frames_for(animations: &Animations, action: Action) -> &FrameSet {
    match action {
        Action::Idle => &animations.idle,
        Action::Run => &animations.run,
        Action::Jump => &animations.jump,
        Action::Dash => &animations.dash,
        Action::Shoot => &animations.shoot,
    }
}

/// The slice of player state the animation reads
#[derive(Debug, Copy, Clone)]
pub struct Motion {
    pub on_ground: bool,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub dash_timer: f32,
    pub shoot_timer: f32,
}

/// ELI5:
/// ┌────────────── Pose selection, first match wins ─────────────┐
/// │  grounded + dash timer     →  Dash  (frame 1 past 40%)      │
/// │  airborne   vy < -3        →  Jump  0..3 looping            │
/// │             |vy| <= 3      →  Jump  3 (apex)                │
/// │             vy > 3         →  Jump  4.. clamped at last     │
/// │  grounded   moving         →  Run   looping                 │
/// │             still          →  Idle                          │
/// │  grounded + shoot timer    →  Shoot 0 replaces Run / Idle   │
/// └─────────────────────────────────────────────────────────────┘
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Animator {
    run_index: usize,
    run_timer: f32,
    jump_index: usize,
    jump_timer: f32,
}

impl Animator {
    /// Takeoff restarts the jump strip
    pub fn restart_jump(&mut self) {
        self.jump_index = 0;
        self.jump_timer = 0.0;
    }

    pub fn animate(&mut self, motion: &Motion, animations: &Animations, delta_ms: f32) -> Pose {
        if motion.on_ground && motion.dash_timer > 0.0 {
            let index = if motion.dash_timer < DASH_TIME_MS * DASH_SECOND_FRAME_AT {
                1
            } else {
                0
            };
            return Pose {
                action: Action::Dash,
                index,
            };
        }

        if !motion.on_ground {
            return self.airborne(motion.velocity_y, animations.jump.len(), delta_ms);
        }

        self.grounded(motion, animations.run.len(), delta_ms)
    }

    fn airborne(&mut self, velocity_y: f32, jump_frames: usize, delta_ms: f32) -> Pose {
        let index = if velocity_y < -APEX_BAND {
            if self.tick_jump(delta_ms) {
                self.jump_index = (self.jump_index + 1) % ASCENT_FRAMES;
            }
            self.jump_index
        } else if velocity_y <= APEX_BAND {
            self.jump_index = APEX_FRAME;
            self.jump_timer = 0.0;
            APEX_FRAME
        } else {
            if self.tick_jump(delta_ms) {
                self.jump_index = (self.jump_index + 1).min(jump_frames.saturating_sub(1));
            }
            self.jump_index.max(FIRST_DESCENT_FRAME)
        };

        Pose {
            action: Action::Jump,
            index,
        }
    }

    fn grounded(&mut self, motion: &Motion, run_frames: usize, delta_ms: f32) -> Pose {
        let mut pose = if motion.velocity_x.abs() > MOVE_DEADZONE {
            self.run_timer += delta_ms;
            if self.run_timer > RUN_ANIM_MS {
                self.run_timer = 0.0;
                self.run_index = (self.run_index + 1) % run_frames.max(1);
            }
            Pose {
                action: Action::Run,
                index: self.run_index,
            }
        } else {
            self.run_index = 0;
            Pose::STANDING
        };

        if motion.shoot_timer > 0.0 {
            pose = Pose {
                action: Action::Shoot,
                index: 0,
            };
        }
        pose
    }

    fn tick_jump(&mut self, delta_ms: f32) -> bool {
        self.jump_timer += delta_ms;
        if self.jump_timer > JUMP_ANIM_MS {
            self.jump_timer = 0.0;
            true
        } else {
            false
        }
    }
}
