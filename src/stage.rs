//! Presentation only. Everything here reads the world and issues draw calls,
//! nothing here feeds back into gameplay.
use crate::engine::{Point, Rect, Renderer};
use crate::game::World;
use crate::player::controls::LEGEND;
use crate::settings::{
    colors, fonts, GROUND_Y, PARALLAX_FACTOR, PLATFORM_TOP_HEIGHT, STRIPE_DROP, STRIPE_HEIGHT,
    STRIPE_SPACING, STRIPE_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
};
use anyhow::Result;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

const LEGEND_POSITION: Point = Point { x: 16.0, y: 12.0 };
const DISTANCE_POSITION: Point = Point {
    x: VIEWPORT_WIDTH - 260.0,
    y: 10.0,
};

pub const VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: VIEWPORT_WIDTH,
    height: VIEWPORT_HEIGHT,
};

/// Images the stage draws from
pub struct Scenery<'a> {
    pub sheet: &'a HtmlCanvasElement,
    pub background: Option<&'a HtmlImageElement>,
}

/// TABLE:
/// ┌──────── draw order, back to front ────────┐
/// │ 1. clear          flat background color   │
/// │ 2. background     parallax tiles, if any  │
/// │ 3. ground         bands + moving stripes  │
/// │ 4. player                                 │
/// │ 5. pellets                                │
/// │ 6. HUD            legend + distance       │
/// └───────────────────────────────────────────┘
pub fn draw(renderer: &Renderer, world: &World, scenery: &Scenery) -> Result<()> {
    let camera_offset = world.camera_offset();

    renderer.fill_rect(&VIEWPORT, colors::BACKGROUND);

    if let Some(background) = scenery.background {
        for x in background_tiles(camera_offset, background.natural_width() as f32) {
            renderer.draw_image(background, &Point { x, y: 0.0 })?;
        }
    }

    draw_ground(renderer, camera_offset);

    let player = world.player();
    renderer.draw_frame(
        scenery.sheet,
        &player.frame(),
        &player.screen_rect(camera_offset),
    )?;

    for pellet in world.pellets() {
        renderer.draw_frame(
            scenery.sheet,
            pellet.frame(),
            &pellet.screen_rect(camera_offset),
        )?;
    }

    renderer.fill_text(LEGEND, &LEGEND_POSITION, fonts::LEGEND, colors::UI_TEXT)?;
    renderer.fill_text(
        &distance_label(world.distance()),
        &DISTANCE_POSITION,
        fonts::DISTANCE,
        colors::DISTANCE_TEXT,
    )
}

fn draw_ground(renderer: &Renderer, camera_offset: f32) {
    let [top, bottom] = ground_bands();
    renderer.fill_rect(&top, colors::PLATFORM_TOP);
    renderer.fill_rect(&bottom, colors::PLATFORM_BOTTOM);

    for x in stripe_positions(camera_offset) {
        renderer.fill_rect(
            &Rect {
                x,
                y: GROUND_Y + STRIPE_DROP,
                width: STRIPE_WIDTH,
                height: STRIPE_HEIGHT,
            },
            colors::GROUND_STRIPE,
        );
    }
}

/// Platform surface, then the ground below it down to the viewport bottom
pub fn ground_bands() -> [Rect; 2] {
    [
        Rect {
            x: 0.0,
            y: GROUND_Y,
            width: VIEWPORT_WIDTH,
            height: PLATFORM_TOP_HEIGHT,
        },
        Rect {
            x: 0.0,
            y: GROUND_Y + PLATFORM_TOP_HEIGHT,
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT - GROUND_Y - PLATFORM_TOP_HEIGHT,
        },
    ]
}

/// Left edges of the background copies covering the viewport. The background
/// scrolls at half the camera speed.
pub fn background_tiles(camera_offset: f32, background_width: f32) -> Vec<f32> {
    if background_width < 1.0 {
        return Vec::new();
    }
    let shift = wrapped(camera_offset * PARALLAX_FACTOR, background_width);
    repeat_from(-shift, background_width)
}

/// Left edges of the ground stripes, they scroll with the camera
pub fn stripe_positions(camera_offset: f32) -> Vec<f32> {
    let shift = wrapped(camera_offset, STRIPE_SPACING);
    repeat_from(-shift, STRIPE_SPACING)
}

pub fn distance_label(distance: f32) -> String {
    format!("Distance: {:04}px", distance as i64)
}

// whole pixels, always in [0, period) even for a negative camera
fn wrapped(offset: f32, period: f32) -> f32 {
    (offset.trunc() as i64).rem_euclid(period as i64) as f32
}

fn repeat_from(start: f32, step: f32) -> Vec<f32> {
    let mut positions = Vec::new();
    let mut x = start;
    while x < VIEWPORT_WIDTH {
        positions.push(x);
        x += step;
    }
    positions
}
