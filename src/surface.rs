//! Drawable-surface abstraction shared by the graph core and the presenter.
//!
//! The core decides *what* a tile shows and *when* it is stale; a presenter
//! owns the pixels. A [`Tile`] carries a position, fixed local bounds and a
//! dirty flag. Painting goes through the [`Canvas`] trait so the same paint
//! code drives the pixmap renderer and the recording test double.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle: `(x, y)` is the minimum corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when the two rectangles share a region of non-zero area.
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque gray from a 0.0–1.0 white level.
    pub fn gray(white: f32) -> Self {
        let v = (white.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(v, v, v)
    }
}

/// Screen-space state of one drawable item.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Where the minimum corner of `bounds` sits in view coordinates.
    position: Point,
    /// Local coordinate space the item paints in. Fixed for the tile's life.
    bounds: Rect,
    needs_display: bool,
}

impl Tile {
    /// New tiles start dirty: nothing has been painted yet.
    pub fn new(bounds: Rect, position: Point) -> Self {
        Self {
            position,
            bounds,
            needs_display: true,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The tile's rectangle in view coordinates.
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.bounds.width,
            self.bounds.height,
        )
    }

    pub fn intersects(&self, visible: &Rect) -> bool {
        self.frame().intersects(visible)
    }

    pub fn needs_display(&self) -> bool {
        self.needs_display
    }

    pub fn set_needs_display(&mut self) {
        self.needs_display = true;
    }

    /// Called by the presenter once the tile's pixels match its content.
    pub fn mark_displayed(&mut self) {
        self.needs_display = false;
    }
}

/// Drawing context handed to paint callbacks. Coordinates are in the
/// painting item's local space (its tile bounds).
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Stroke independent line segments, each a `(start, end)` pair.
    fn stroke_segments(&mut self, segments: &[(Point, Point)], color: Rgba, width: f32);

    /// Place a short text run right-aligned inside `rect`.
    fn draw_text(&mut self, text: &str, rect: Rect, color: Rgba);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Rgba },
    Stroke { segments: Vec<(Point, Point)>, color: Rgba, width: f32 },
    Text { text: String, rect: Rect, color: Rgba },
}

/// Canvas that records calls instead of drawing. Used to inspect paint output.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stroke batches drawn in the given color.
    pub fn strokes_in(&self, color: Rgba) -> Vec<&[(Point, Point)]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke { segments, color: c, .. } if *c == color => {
                    Some(segments.as_slice())
                }
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_segments(&mut self, segments: &[(Point, Point)], color: Rgba, width: f32) {
        self.ops.push(DrawOp::Stroke {
            segments: segments.to_vec(),
            color,
            width,
        });
    }

    fn draw_text(&mut self, text: &str, rect: Rect, color: Rgba) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            rect,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let view = Rect::new(0.0, 0.0, 320.0, 112.0);
        assert!(Rect::new(300.0, 0.0, 32.0, 112.0).intersects(&view));
        assert!(Rect::new(-31.0, 0.0, 32.0, 112.0).intersects(&view));
        assert!(!Rect::new(330.0, 0.0, 32.0, 112.0).intersects(&view));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let view = Rect::new(0.0, 0.0, 320.0, 112.0);
        assert!(!Rect::new(320.0, 0.0, 32.0, 112.0).intersects(&view));
        assert!(!Rect::new(-32.0, 0.0, 32.0, 112.0).intersects(&view));
        assert!(!Rect::new(0.0, 112.0, 32.0, 10.0).intersects(&view));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let view = Rect::new(0.0, 0.0, 320.0, 112.0);
        assert!(!Rect::new(10.0, 10.0, 0.0, 10.0).intersects(&view));
        assert!(!view.intersects(&Rect::default()));
    }

    #[test]
    fn test_tile_frame_follows_position() {
        let mut tile = Tile::new(Rect::new(0.0, -56.0, 32.0, 112.0), Point::new(-2.0, 0.0));
        assert_eq!(tile.frame(), Rect::new(-2.0, 0.0, 32.0, 112.0));
        tile.translate(1.0, 0.0);
        assert_eq!(tile.frame().x, -1.0);
        // Local bounds are unaffected by movement
        assert_eq!(tile.bounds().y, -56.0);
    }

    #[test]
    fn test_tile_dirty_flag() {
        let mut tile = Tile::new(Rect::new(0.0, 0.0, 4.0, 4.0), Point::default());
        assert!(tile.needs_display());
        tile.mark_displayed();
        assert!(!tile.needs_display());
        tile.set_needs_display();
        assert!(tile.needs_display());
    }

    #[test]
    fn test_gray_levels() {
        assert_eq!(Rgba::gray(0.0), Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::gray(1.0), Rgba::WHITE);
        assert_eq!(Rgba::gray(0.6), Rgba::rgb(153, 153, 153));
    }
}
