// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                  From sheet pixels to an on-screen frame                 │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Step              │ Result                                               │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ SheetRect         │ exact crop on the sheet, hard-coded in hunter.rs     │
// │ slice_padded      │ crop + transparent border (Padding)                  │
// │ scale_frames      │ padded box * scale                                   │
// │ flip_frames_...   │ mirrored copy for the left-facing set                │
// │ FrameSet          │ right + left sequences for one action                │
// └───────────────────┴──────────────────────────────────────────────────────┘
// Frames never own pixels. The sheet is color keyed once at load (see
// engine::color_keyed_sheet) and frames only describe where to read from it
// and how big the result is.
pub mod hunter;

use crate::engine::{Point, Rect, Size};
use crate::player::Facing;

/// Pixel rectangle on a sheet
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SheetRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl SheetRect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        SheetRect { x, y, w, h }
    }
}

/// Transparent border around a crop, in sheet pixels
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Padding {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Padding {
    pub const NONE: Padding = Padding::new(0, 0, 0, 0);

    pub const fn new(left: u16, top: u16, right: u16, bottom: u16) -> Self {
        Padding {
            left,
            top,
            right,
            bottom,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    source: SheetRect,
    padding: Padding,
    scale: f32,
    flipped: bool,
}

impl Frame {
    pub fn new(source: SheetRect, padding: Padding) -> Self {
        Frame {
            source,
            padding,
            scale: 1.0,
            flipped: false,
        }
    }

    pub fn source(&self) -> SheetRect {
        self.source
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Padded and scaled size, truncated to whole pixels
    pub fn size(&self) -> Size {
        let width = self.padding.left + self.source.w + self.padding.right;
        let height = self.padding.top + self.source.h + self.padding.bottom;
        Size {
            width: (f32::from(width) * self.scale).trunc(),
            height: (f32::from(height) * self.scale).trunc(),
        }
    }

    /// Where the sheet crop lands inside `destination`. Mirroring swaps the
    /// left and right padding.
    pub fn crop_destination(&self, destination: &Rect) -> Rect {
        let leading = if self.flipped {
            self.padding.right
        } else {
            self.padding.left
        };
        Rect {
            x: destination.x + f32::from(leading) * self.scale,
            y: destination.y + f32::from(self.padding.top) * self.scale,
            width: f32::from(self.source.w) * self.scale,
            height: f32::from(self.source.h) * self.scale,
        }
    }

    fn scaled(mut self, scale: f32) -> Self {
        self.scale *= scale;
        self
    }

    fn mirrored(mut self) -> Self {
        self.flipped = !self.flipped;
        self
    }
}

/// Crops every rect exactly and pads it with a transparent border.
pub fn slice_padded(rects: &[SheetRect], padding: Padding) -> Vec<Frame> {
    rects
        .iter()
        .map(|&source| Frame::new(source, padding))
        .collect()
}

pub fn scale_frames(frames: &[Frame], scale: f32) -> Vec<Frame> {
    frames.iter().map(|frame| frame.scaled(scale)).collect()
}

pub fn flip_frames_horizontal(frames: &[Frame]) -> Vec<Frame> {
    frames.iter().map(|frame| frame.mirrored()).collect()
}

/// One animation, both facings. Built once at load, never mutated.
#[derive(Debug, Clone)]
pub struct FrameSet {
    right: Vec<Frame>,
    left: Vec<Frame>,
}

impl FrameSet {
    /// `right` must not be empty
    pub fn from_right(right: Vec<Frame>) -> Self {
        let left = flip_frames_horizontal(&right);
        FrameSet { right, left }
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Out of range indices clamp to the last frame
    pub fn frame(&self, facing: Facing, index: usize) -> Frame {
        let frames = match facing {
            Facing::Right => &self.right,
            Facing::Left => &self.left,
        };
        frames[index.min(self.last_index())]
    }
}

/// Box of `size` whose bottom-center sits on `mid_bottom`. Swapping frames
/// through this keeps the feet planted whatever the frame dimensions.
pub fn anchor_bottom_center(size: Size, mid_bottom: Point) -> Rect {
    Rect {
        x: mid_bottom.x - size.width * 0.5,
        y: mid_bottom.y - size.height,
        width: size.width,
        height: size.height,
    }
}

/// Makes every `key` colored pixel of an RGBA buffer fully transparent.
/// Returns how many pixels were cleared.
pub fn apply_color_key(rgba: &mut [u8], key: [u8; 3]) -> usize {
    let mut cleared = 0;
    for pixel in rgba.chunks_exact_mut(4) {
        if pixel[..3] == key {
            pixel[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CROP: SheetRect = SheetRect::new(106, 108, 30, 33);

    #[test]
    fn padding_grows_the_frame() {
        let frames = slice_padded(&[CROP], Padding::new(0, 10, 0, 2));
        let size = frames[0].size();
        assert_relative_eq!(size.width, 30.0);
        assert_relative_eq!(size.height, 45.0);
    }

    #[test]
    fn scale_truncates_to_whole_pixels_and_composes() {
        let frames = slice_padded(&[CROP], Padding::new(0, 1, 0, 1));
        let scaled = scale_frames(&frames, 1.5);
        // 35 * 1.5 = 52.5
        assert_relative_eq!(scaled[0].size().width, 45.0);
        assert_relative_eq!(scaled[0].size().height, 52.0);

        let twice = scale_frames(&scale_frames(&frames, 2.0), 2.0);
        assert_relative_eq!(twice[0].size().width, 120.0);
    }

    #[test]
    fn flip_keeps_size_and_toggles() {
        let frames = scale_frames(&slice_padded(&[CROP], Padding::new(3, 0, 1, 0)), 2.0);
        let flipped = flip_frames_horizontal(&frames);
        assert!(flipped[0].is_flipped());
        assert_eq!(flipped[0].size(), frames[0].size());
        assert!(!flip_frames_horizontal(&flipped)[0].is_flipped());
    }

    #[test]
    fn crop_sits_inside_padding_and_mirrors() {
        let frame = scale_frames(&slice_padded(&[CROP], Padding::new(3, 2, 1, 0)), 2.0)[0];
        let destination = Rect::new(Point { x: 100.0, y: 50.0 }, frame.size());

        let crop = frame.crop_destination(&destination);
        assert_relative_eq!(crop.x, 106.0);
        assert_relative_eq!(crop.y, 54.0);
        assert_relative_eq!(crop.width, 60.0);
        assert_relative_eq!(crop.height, 66.0);

        let mirrored = flip_frames_horizontal(&[frame])[0].crop_destination(&destination);
        assert_relative_eq!(mirrored.x, 102.0);
        assert_relative_eq!(mirrored.right(), destination.right() - 6.0);
    }

    #[test]
    fn frame_set_clamps_and_picks_facing() {
        let rects = [CROP, SheetRect::new(137, 108, 20, 33)];
        let set = FrameSet::from_right(slice_padded(&rects, Padding::NONE));
        assert_eq!(set.len(), 2);
        assert!(!set.frame(Facing::Right, 0).is_flipped());
        assert!(set.frame(Facing::Left, 0).is_flipped());
        assert_eq!(set.frame(Facing::Right, 9).source(), rects[1]);
    }

    #[test]
    fn anchor_keeps_bottom_center() {
        let feet = Point { x: 480.0, y: 440.0 };
        let wide = anchor_bottom_center(
            Size {
                width: 76.0,
                height: 52.0,
            },
            feet,
        );
        let tall = anchor_bottom_center(
            Size {
                width: 30.0,
                height: 98.0,
            },
            feet,
        );
        assert_eq!(wide.mid_bottom(), feet);
        assert_eq!(tall.mid_bottom(), feet);
        assert_relative_eq!(tall.top(), 342.0);
    }

    #[test]
    fn color_key_clears_only_exact_matches() {
        let mut rgba = vec![
            255, 0, 255, 255, // key
            255, 0, 254, 255, // near miss
            10, 20, 30, 255, // sprite
            255, 0, 255, 128, // key, half transparent already
        ];
        let cleared = apply_color_key(&mut rgba, [255, 0, 255]);
        assert_eq!(cleared, 2);
        assert_eq!(rgba[3], 0);
        assert_eq!(rgba[7], 255);
        assert_eq!(rgba[11], 255);
        assert_eq!(rgba[15], 0);
    }
}
