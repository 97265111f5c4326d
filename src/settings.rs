//! Compiled-in tunables. Distances are pixels, velocities pixels per update,
//! durations milliseconds.

// ==================== Viewport ====================
pub const VIEWPORT_WIDTH: f32 = 960.0;
pub const VIEWPORT_HEIGHT: f32 = 540.0;
/// screen y of the flat ground plane, feet rest on it
pub const GROUND_Y: f32 = 440.0;

// ==================== Movement ====================
pub const RUN_SPEED: f32 = 4.0;
pub const DASH_SPEED: f32 = 8.0;
pub const JUMP_VELOCITY: f32 = -14.0; // negative because top left is origin
pub const GRAVITY: f32 = 0.8;
/// horizontal speed below this counts as standing still
pub const MOVE_DEADZONE: f32 = 0.1;

// ==================== Actions ====================
pub const DASH_TIME_MS: f32 = 400.0;
/// second dash frame once less than this share of the dash is left
pub const DASH_SECOND_FRAME_AT: f32 = 0.6;
/// shoot pose and refire delay share one duration
pub const SHOOT_COOLDOWN_MS: f32 = 150.0;
pub const PELLET_SPEED: f32 = 12.0;
/// muzzle sits this far ahead of the body center, in sheet pixels
pub const MUZZLE_FORWARD: f32 = 15.0;
/// and this far above the body center, in sheet pixels
pub const MUZZLE_RISE: f32 = 2.0;

// ==================== Animation ====================
pub const SPRITE_SCALE: f32 = 2.0;
pub const RUN_ANIM_MS: f32 = 60.0;
pub const JUMP_ANIM_MS: f32 = 90.0;
/// |velocity_y| at or under this shows the apex frame
pub const APEX_BAND: f32 = 3.0;

// ==================== Stage ====================
pub const PARALLAX_FACTOR: f32 = 0.5;
pub const PLATFORM_TOP_HEIGHT: f32 = 12.0;
pub const STRIPE_SPACING: f32 = 60.0;
pub const STRIPE_WIDTH: f32 = STRIPE_SPACING / 3.0;
pub const STRIPE_HEIGHT: f32 = 6.0;
pub const STRIPE_DROP: f32 = 16.0;

// ==================== Palette ====================
pub mod colors {
    pub const BACKGROUND: &str = "#141828";
    pub const PLATFORM_TOP: &str = "#5a6e8c";
    pub const PLATFORM_BOTTOM: &str = "#2c3446";
    pub const GROUND_STRIPE: &str = "#3c4a62";
    pub const UI_TEXT: &str = "#dce6f0";
    pub const DISTANCE_TEXT: &str = "#ffd25a";
    /// sheet background, cleared to transparent at load
    pub const COLOR_KEY: [u8; 3] = [255, 0, 255];
}

pub mod fonts {
    pub const LEGEND: &str = "16px monospace";
    pub const DISTANCE: &str = "20px monospace";
}

// ==================== Assets ====================
pub mod assets {
    pub const SPRITE_SHEET: &str = "assets/hunter_sheet.png";
    pub const BACKGROUND: &str = "assets/background.png";
    pub const MUSIC: &str = "assets/bgm.mp3";
    pub const SHOT_SOUND: &str = "assets/shot.wav";
}
