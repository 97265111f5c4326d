use crate::browser;
use crate::camera::Camera;
use crate::engine::{self, Game, KeyState, Music, Renderer, Sound};
use crate::player::{Controls, Player, PlayerCommand};
use crate::projectile::{Flight, Pellet};
use crate::settings::{assets, colors};
use crate::sprite::hunter::Animations;
use crate::stage::{self, Scenery};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

/// TABLE
/// ┌──────────────────────── one World::step ────────────────────────┐
/// │                                                                 │
/// │  Controls ──► Player.update ──► commands (Fire ...)             │
/// │                    │                                            │
/// │                    ▼ world_x                                    │
/// │               Camera.update ──► offset                          │
/// │                                    │                            │
/// │  commands ──► new Pellets ─────────┤                            │
/// │                                    ▼                            │
/// │               Pellet.update(offset) ──► Active / Removed        │
/// │                                                                 │
/// └─────────────────────────────────────────────────────────────────┘
/// The camera must see the player's new position and pellets must see the
/// new camera, the order above is the only order `step` runs in.
pub struct World {
    player: Player,
    camera: Camera,
    pellets: Vec<Pellet>,
    animations: Rc<Animations>,
    quit: bool,
}

/// Things the owner of the world may want to react to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    ShotFired,
}

impl World {
    pub fn new(animations: Rc<Animations>) -> Self {
        let player = Player::new(animations.clone());
        let mut camera = Camera::new();
        camera.update(player.world_x());
        World {
            player,
            camera,
            pellets: Vec::new(),
            animations,
            quit: false,
        }
    }

    pub fn step(&mut self, delta_ms: f32, controls: Controls) -> Vec<WorldEvent> {
        let mut events = Vec::new();

        let commands = self.player.update(delta_ms, controls);
        self.camera.update(self.player.world_x());

        for command in commands {
            match command {
                PlayerCommand::Fire(spawn) => {
                    self.pellets.push(Pellet::new(self.animations.pellet, spawn));
                    events.push(WorldEvent::ShotFired);
                }
            }
        }

        let camera_offset = self.camera.offset();
        self.pellets = std::mem::take(&mut self.pellets)
            .into_iter()
            .filter_map(|pellet| match pellet.update(camera_offset) {
                Flight::Active(pellet) => Some(pellet),
                Flight::Removed => None,
            })
            .collect();

        if controls.quit {
            self.quit = true;
        }
        events
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pellets(&self) -> &[Pellet] {
        &self.pellets
    }

    pub fn camera_offset(&self) -> f32 {
        self.camera.offset()
    }

    /// What the HUD reports
    pub fn distance(&self) -> f32 {
        self.player.world_x()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// Everything loaded from the network. Only the sheet is required.
pub struct Assets {
    sheet: HtmlCanvasElement,
    background: Option<HtmlImageElement>,
    audio: Audio,
}

/// Audio keeps loading after the game has started. A slot stays empty until
/// its clip is ready, or for good when the clip is missing.
#[derive(Clone, Default)]
pub struct Audio {
    music: Rc<RefCell<Option<Music>>>,
    shot: Rc<RefCell<Option<Sound>>>,
    stopped: Rc<Cell<bool>>,
}

impl Audio {
    fn load_in_background() -> Self {
        let audio = Audio::default();

        let slots = audio.clone();
        browser::spawn_local(async move {
            if let Some(music) = BusterRun::load_music().await {
                if !slots.stopped.get() {
                    music.start();
                    *slots.music.borrow_mut() = Some(music);
                }
            }
        });

        let slots = audio.clone();
        browser::spawn_local(async move {
            if let Some(shot) = BusterRun::load_shot().await {
                if !slots.stopped.get() {
                    *slots.shot.borrow_mut() = Some(shot);
                }
            }
        });

        audio
    }

    fn resume_music(&self) {
        if let Some(music) = self.music.borrow().as_ref() {
            music.ensure_playing();
        }
    }

    fn play_shot(&self) {
        if let Some(shot) = self.shot.borrow().as_ref() {
            shot.play();
        }
    }

    fn stop(&self) {
        self.stopped.set(true);
        if let Some(music) = self.music.borrow().as_ref() {
            music.stop();
        }
        if let Some(shot) = self.shot.borrow().as_ref() {
            shot.stop();
        }
    }
}

pub struct Run {
    world: World,
    assets: Assets,
    presses_seen: u64,
}

pub enum BusterRun {
    /// Initialize state while resources are being loaded
    /// Transition to `Loaded` once initialization is complete
    Loading,

    /// Playing, until quit
    Loaded(Run),
}

impl BusterRun {
    pub fn new() -> Self {
        BusterRun::Loading
    }

    async fn load_sheet() -> Result<HtmlCanvasElement> {
        let image = engine::load_image(assets::SPRITE_SHEET)
            .await
            .with_context(|| {
                format!("Failed to load sprite sheet from : {}", assets::SPRITE_SHEET)
            })?;
        engine::color_keyed_sheet(&image, colors::COLOR_KEY)
            .with_context(|| format!("Failed to color key sprite sheet : {}", assets::SPRITE_SHEET))
    }

    async fn load_background() -> Option<HtmlImageElement> {
        optional("background", engine::load_image(assets::BACKGROUND).await)
    }

    async fn load_music() -> Option<Music> {
        optional("music", engine::load_audio(assets::MUSIC).await).map(Music::new)
    }

    async fn load_shot() -> Option<Sound> {
        optional("shot sound", engine::load_audio(assets::SHOT_SOUND).await).map(Sound::new)
    }
}

impl Default for BusterRun {
    fn default() -> Self {
        BusterRun::new()
    }
}

/// True once per key that went down since the last call. Music retries
/// ride on these, a held key must not retry every update.
fn fresh_press(presses_seen: &mut u64, keystate: &KeyState) -> bool {
    let presses = keystate.presses();
    let fresh = presses != *presses_seen;
    *presses_seen = presses;
    fresh
}

/// Missing optional assets switch their feature off for the session
fn optional<T>(name: &str, loaded: Result<T>) -> Option<T> {
    match loaded {
        Ok(asset) => Some(asset),
        Err(err) => {
            log!("[assets] {} disabled : {:#}", name, err);
            None
        }
    }
}

#[async_trait(?Send)]
impl Game for BusterRun {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            BusterRun::Loading => {
                // images load side by side, total time is the slowest one.
                // audio may wait for a user gesture so it never holds them up
                let audio = Audio::load_in_background();
                let (sheet, background) = join!(Self::load_sheet(), Self::load_background());
                let assets = Assets {
                    sheet: sheet?,
                    background,
                    audio,
                };

                let world = World::new(Rc::new(Animations::default()));
                Ok(Box::new(BusterRun::Loaded(Run {
                    world,
                    assets,
                    presses_seen: 0,
                })))
            }
            BusterRun::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState, delta_ms: f32) {
        if let BusterRun::Loaded(run) = self {
            if fresh_press(&mut run.presses_seen, keystate) {
                run.assets.audio.resume_music();
            }

            let events = run.world.step(delta_ms, Controls::from_keys(keystate));
            for event in events {
                match event {
                    WorldEvent::ShotFired => run.assets.audio.play_shot(),
                }
            }
        }
    }

    fn draw(&self, renderer: &Renderer) -> Result<()> {
        match self {
            BusterRun::Loaded(run) => stage::draw(
                renderer,
                &run.world,
                &Scenery {
                    sheet: &run.assets.sheet,
                    background: run.assets.background.as_ref(),
                },
            ),
            BusterRun::Loading => Ok(()),
        }
    }

    fn is_running(&self) -> bool {
        match self {
            BusterRun::Loaded(run) => !run.world.quit_requested(),
            BusterRun::Loading => true,
        }
    }

    fn shutdown(&mut self, renderer: &Renderer) {
        if let BusterRun::Loaded(run) = self {
            run.assets.audio.stop();
            run.world.pellets.clear();
        }
        renderer.clear(&stage::VIEWPORT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Facing;
    use crate::settings::{PELLET_SPEED, RUN_SPEED, SHOOT_COOLDOWN_MS, VIEWPORT_WIDTH};
    use approx::assert_relative_eq;

    const DT: f32 = 16.0;

    fn world() -> World {
        World::new(Rc::new(Animations::default()))
    }

    fn right() -> Controls {
        Controls {
            right: true,
            ..Controls::default()
        }
    }

    fn shoot() -> Controls {
        Controls {
            shoot: true,
            ..Controls::default()
        }
    }

    #[test]
    fn holding_right_runs_four_pixels_per_update() {
        let mut world = world();
        for n in 1..=50 {
            world.step(DT, right());
            assert_relative_eq!(world.player().world_x(), RUN_SPEED * n as f32);
        }
        assert_eq!(stage::distance_label(world.distance()), "Distance: 0200px");
    }

    #[test]
    fn camera_tracks_the_player_every_step() {
        let mut world = world();
        assert_relative_eq!(world.camera_offset(), -VIEWPORT_WIDTH / 2.0);
        for _ in 0..10 {
            world.step(DT, right());
            assert_relative_eq!(
                world.camera_offset(),
                world.player().world_x() - VIEWPORT_WIDTH / 2.0
            );
        }
    }

    #[test]
    fn shot_spawns_one_pellet_and_one_event() {
        let mut world = world();
        let events = world.step(DT, shoot());
        assert_eq!(events, vec![WorldEvent::ShotFired]);
        assert_eq!(world.pellets().len(), 1);

        let pellet = &world.pellets()[0];
        assert_relative_eq!(pellet.velocity_x(), PELLET_SPEED * Facing::Right.sign());
        assert_relative_eq!(world.player().shoot_timer(), SHOOT_COOLDOWN_MS - DT);
    }

    #[test]
    fn refire_inside_cooldown_is_dropped() {
        let mut world = world();
        world.step(DT, shoot());
        // release, then press again 50ms after the first shot
        world.step(DT, Controls::default());
        world.step(18.0, Controls::default());
        let cooldown_before = world.player().shoot_cooldown();
        assert_relative_eq!(cooldown_before, SHOOT_COOLDOWN_MS - 50.0);

        let events = world.step(DT, shoot());
        assert!(events.is_empty());
        assert_eq!(world.pellets().len(), 1);
        assert_relative_eq!(world.player().shoot_cooldown(), cooldown_before - DT);
        assert_relative_eq!(world.player().shoot_timer(), cooldown_before - DT);
    }

    #[test]
    fn pellet_is_dropped_after_leaving_the_screen() {
        let mut world = world();
        world.step(DT, shoot());
        let mut updates = 0;
        while !world.pellets().is_empty() {
            world.step(DT, Controls::default());
            updates += 1;
            assert!(updates < 100, "pellet never left the screen");
        }
        // ~ half a viewport at 12px per update
        assert!(updates > 30);
    }

    #[test]
    fn pellets_are_advanced_against_the_new_camera() {
        let mut world = world();
        world.step(DT, shoot());
        let before = world.pellets()[0].world_x();
        world.step(DT, right());

        let pellet = &world.pellets()[0];
        assert_relative_eq!(pellet.world_x(), before + PELLET_SPEED);
        let expected_center = pellet.world_x() - world.camera_offset();
        assert_relative_eq!(
            pellet.screen_rect(world.camera_offset()).center().x,
            expected_center
        );
    }

    #[test]
    fn only_new_key_presses_retry_the_music() {
        let mut seen = 0;
        let mut keys = KeyState::new();
        assert!(!fresh_press(&mut seen, &keys));

        keys.set_pressed("ArrowRight");
        assert!(fresh_press(&mut seen, &keys));
        // held across many updates, autorepeat included
        for _ in 0..60 {
            keys.set_pressed("ArrowRight");
            assert!(!fresh_press(&mut seen, &keys));
        }

        keys.set_pressed("KeyA");
        assert!(fresh_press(&mut seen, &keys));
        assert!(!fresh_press(&mut seen, &keys));
    }

    #[test]
    fn quit_control_is_recorded() {
        let mut world = world();
        assert!(!world.quit_requested());
        world.step(
            DT,
            Controls {
                quit: true,
                ..Controls::default()
            },
        );
        assert!(world.quit_requested());
    }
}
