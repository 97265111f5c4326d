//! Frame layout of the hero sheet and the animations cut from it.
use super::{scale_frames, slice_padded, Frame, FrameSet, Padding, SheetRect};
use crate::settings::SPRITE_SCALE;

/// Hard-coded pixel rectangles, one list per action
pub struct AnimationTable {
    pub run: &'static [SheetRect],
    pub jump: &'static [SheetRect],
    pub dash: &'static [SheetRect],
    pub shoot: &'static [SheetRect],
    pub pellet: SheetRect,
    /// sheets without a dedicated standing pose reuse the first run frame
    pub idle: Option<SheetRect>,
}

const RUN: [SheetRect; 11] = [
    SheetRect::new(106, 108, 30, 33),
    SheetRect::new(137, 108, 20, 33),
    SheetRect::new(158, 108, 23, 33),
    SheetRect::new(181, 108, 32, 33),
    SheetRect::new(213, 108, 34, 33),
    SheetRect::new(247, 108, 26, 33),
    SheetRect::new(276, 108, 22, 33),
    SheetRect::new(298, 108, 25, 33),
    SheetRect::new(326, 108, 30, 33),
    SheetRect::new(357, 108, 34, 33),
    SheetRect::new(391, 108, 29, 33),
];

const JUMP: [SheetRect; 8] = [
    SheetRect::new(168, 66, 29, 34),
    SheetRect::new(202, 63, 24, 37),
    SheetRect::new(231, 61, 15, 39),
    SheetRect::new(253, 61, 18, 39),
    SheetRect::new(274, 61, 23, 39),
    SheetRect::new(299, 61, 27, 39),
    SheetRect::new(331, 62, 24, 38),
    SheetRect::new(356, 68, 30, 32),
];

const DASH: [SheetRect; 2] = [
    SheetRect::new(317, 163, 38, 26),
    SheetRect::new(361, 158, 38, 31),
];

const SHOOT: [SheetRect; 2] = [
    SheetRect::new(133, 66, 30, 34),
    SheetRect::new(168, 66, 29, 34),
];

pub const HUNTER: AnimationTable = AnimationTable {
    run: &RUN,
    jump: &JUMP,
    dash: &DASH,
    shoot: &SHOOT,
    pellet: SheetRect::new(112, 73, 14, 3),
    idle: None,
};

// per action border, keeps the feet line of every frame consistent
const RUN_PADDING: Padding = Padding::new(0, 1, 0, 1);
const JUMP_PADDING: Padding = Padding::new(0, 10, 0, 2);
const DASH_PADDING: Padding = Padding::new(0, 2, 0, 2);
const SHOOT_PADDING: Padding = Padding::new(0, 2, 0, 2);

/// Every animation of the hero, sliced, scaled and mirrored
#[derive(Debug, Clone)]
pub struct Animations {
    pub idle: FrameSet,
    pub run: FrameSet,
    pub jump: FrameSet,
    pub dash: FrameSet,
    pub shoot: FrameSet,
    pub pellet: Frame,
}

impl Animations {
    pub fn new(table: &AnimationTable) -> Self {
        let cut = |rects: &[SheetRect], padding: Padding| {
            FrameSet::from_right(scale_frames(&slice_padded(rects, padding), SPRITE_SCALE))
        };

        let idle_rect = table.idle.or_else(|| table.run.first().copied());
        let idle = match idle_rect {
            Some(rect) => cut(&[rect], RUN_PADDING),
            None => cut(table.run, RUN_PADDING),
        };

        Animations {
            idle,
            run: cut(table.run, RUN_PADDING),
            jump: cut(table.jump, JUMP_PADDING),
            dash: cut(table.dash, DASH_PADDING),
            shoot: cut(table.shoot, SHOOT_PADDING),
            pellet: scale_frames(&slice_padded(&[table.pellet], Padding::NONE), SPRITE_SCALE)[0],
        }
    }
}

impl Default for Animations {
    fn default() -> Self {
        Animations::new(&HUNTER)
    }
}
