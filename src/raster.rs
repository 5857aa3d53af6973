//! Pixel presenter for a [`GraphView`], backed by `tiny-skia`.
//!
//! Each segment owns a cached pixmap keyed by its id. A render pass repaints
//! only tiles flagged dirty, then composites background, visible tiles and
//! the overlay into one frame. Recycled segments keep their id, so their
//! pixmap is reused rather than reallocated.

use crate::graph_view::GraphView;
use crate::segment::SegmentId;
use crate::style::GraphStyle;
use crate::surface::{Canvas, Point, Rect, Rgba};
use log::warn;
use std::collections::HashMap;
use tiny_skia::{
    Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke, Transform,
};

/// Text placed by a paint call, for presenters that render text themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Pixel rectangle the text is right-aligned in
    pub rect: Rect,
    pub color: Rgba,
}

/// A [`Canvas`] drawing into a pixmap whose top-left pixel corresponds to
/// the minimum corner of `bounds`.
pub struct PixmapCanvas<'a> {
    pixmap: &'a mut Pixmap,
    transform: Transform,
    offset: Point,
    texts: &'a mut Vec<TextRun>,
}

impl<'a> PixmapCanvas<'a> {
    pub fn new(pixmap: &'a mut Pixmap, bounds: Rect, texts: &'a mut Vec<TextRun>) -> Self {
        Self {
            pixmap,
            transform: Transform::from_translate(-bounds.x, -bounds.y),
            offset: Point::new(-bounds.x, -bounds.y),
            texts,
        }
    }
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

impl Canvas for PixmapCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
            self.pixmap
                .fill_rect(r, &paint_for(color), self.transform, None);
        }
    }

    fn stroke_segments(&mut self, segments: &[(Point, Point)], color: Rgba, width: f32) {
        let mut pb = PathBuilder::new();
        for (a, b) in segments {
            pb.move_to(a.x, a.y);
            pb.line_to(b.x, b.y);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint_for(color), &stroke, self.transform, None);
    }

    fn draw_text(&mut self, text: &str, rect: Rect, color: Rgba) {
        self.texts.push(TextRun {
            text: text.to_string(),
            rect: Rect::new(
                rect.x + self.offset.x,
                rect.y + self.offset.y,
                rect.width,
                rect.height,
            ),
            color,
        });
    }
}

/// Work done by one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Tiles whose pixels were redrawn
    pub repainted: usize,
    /// Tiles copied into the frame
    pub composited: usize,
    /// Tiles left out of the frame because they are off screen
    pub skipped: usize,
}

impl RenderStats {
    fn accumulate(&mut self, other: RenderStats) {
        self.repainted += other.repainted;
        self.composited += other.composited;
        self.skipped += other.skipped;
    }
}

fn straight(p: PremultipliedColorU8) -> Rgba {
    let c = p.demultiply();
    Rgba {
        r: c.red(),
        g: c.green(),
        b: c.blue(),
        a: c.alpha(),
    }
}

fn blank_pixmap(bounds: Rect) -> Option<Pixmap> {
    let w = bounds.width.ceil().max(1.0) as u32;
    let h = bounds.height.ceil().max(1.0) as u32;
    Pixmap::new(w, h)
}

pub struct ViewRenderer {
    frame: Pixmap,
    background: Pixmap,
    tiles: HashMap<SegmentId, Pixmap>,
    overlay: Option<Pixmap>,
    overlay_texts: Vec<TextRun>,
    texts: Vec<TextRun>,
    totals: RenderStats,
}

impl ViewRenderer {
    /// Allocate the frame for `view` and paint its static background.
    /// Returns None if a pixmap of the view's size cannot be allocated.
    pub fn new(view: &GraphView, style: &GraphStyle) -> Option<Self> {
        let frame = blank_pixmap(view.visible_bounds())?;
        let mut background = frame.clone();
        let mut unused = Vec::new();
        let mut canvas =
            PixmapCanvas::new(&mut background, view.background_bounds(), &mut unused);
        view.paint_background(&mut canvas, style);

        Some(Self {
            frame,
            background,
            tiles: HashMap::new(),
            overlay: None,
            overlay_texts: Vec::new(),
            texts: Vec::new(),
            totals: RenderStats::default(),
        })
    }

    /// Repaint dirty tiles and composite a fresh frame.
    pub fn render(&mut self, view: &mut GraphView, style: &GraphStyle) -> RenderStats {
        let mut stats = RenderStats::default();

        let tiles = &mut self.tiles;
        stats.repainted = view.paint_dirty_segments(|segment| {
            let bounds = segment.tile().bounds();
            if !tiles.contains_key(&segment.id()) {
                match blank_pixmap(bounds) {
                    Some(pixmap) => {
                        tiles.insert(segment.id(), pixmap);
                    }
                    None => {
                        warn!("cannot allocate tile for {}", segment.id());
                        return;
                    }
                }
            }
            if let Some(pixmap) = tiles.get_mut(&segment.id()) {
                let mut texts = Vec::new();
                let mut canvas = PixmapCanvas::new(pixmap, bounds, &mut texts);
                segment.paint(&mut canvas, style);
            }
        });

        let overlay = &mut self.overlay;
        let overlay_texts = &mut self.overlay_texts;
        view.paint_overlay_if_dirty(|ov| {
            let bounds = ov.tile().bounds();
            if overlay.is_none() {
                *overlay = blank_pixmap(bounds);
            }
            if let Some(pixmap) = overlay.as_mut() {
                overlay_texts.clear();
                let mut canvas = PixmapCanvas::new(pixmap, bounds, overlay_texts);
                ov.paint(&mut canvas, style);
            }
        });

        self.frame.data_mut().copy_from_slice(self.background.data());
        let visible = view.visible_bounds();
        for segment in view.segments() {
            if !segment.is_visible(&visible) {
                stats.skipped += 1;
                continue;
            }
            if let Some(pixmap) = self.tiles.get(&segment.id()) {
                let pos = segment.position();
                self.frame.draw_pixmap(
                    pos.x.round() as i32,
                    pos.y.round() as i32,
                    pixmap.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                stats.composited += 1;
            }
        }

        self.texts.clear();
        if let Some(pixmap) = &self.overlay {
            let pos = view.overlay().tile().position();
            self.frame.draw_pixmap(
                pos.x.round() as i32,
                pos.y.round() as i32,
                pixmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
            self.texts.extend(self.overlay_texts.iter().map(|run| TextRun {
                rect: Rect::new(
                    run.rect.x + pos.x,
                    run.rect.y + pos.y,
                    run.rect.width,
                    run.rect.height,
                ),
                ..run.clone()
            }));
        }

        self.totals.accumulate(stats);
        stats
    }

    /// The last composited frame.
    pub fn frame(&self) -> &Pixmap {
        &self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.frame.pixel(x, y).map(straight)
    }

    /// Copy of the last frame as straight-alpha colors, row-major.
    pub fn pixels(&self) -> Vec<Rgba> {
        self.frame.pixels().iter().copied().map(straight).collect()
    }

    /// Text runs of the last frame, in frame pixel coordinates.
    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    /// Number of tile pixmaps allocated so far.
    pub fn cached_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Sum of every render pass so far.
    pub fn totals(&self) -> RenderStats {
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_CAPACITY;

    fn setup(width: f32) -> (GraphView, ViewRenderer, GraphStyle) {
        let style = GraphStyle::default();
        let view = GraphView::with_width(width, &style);
        let renderer = ViewRenderer::new(&view, &style).unwrap();
        (view, renderer, style)
    }

    #[test]
    fn test_first_render_paints_tile_and_overlay() {
        let (mut view, mut renderer, style) = setup(320.0);
        let stats = renderer.render(&mut view, &style);
        assert_eq!(stats.repainted, 1);
        assert_eq!(stats.composited, 1);
        assert_eq!(renderer.cached_tiles(), 1);
        assert_eq!((renderer.width(), renderer.height()), (320, 112));
        // Overlay labels are published in frame coordinates
        assert_eq!(renderer.texts().len(), 7);
        assert_eq!(renderer.texts()[0].text, "+3.0");
        assert_eq!(renderer.texts()[0].rect, Rect::new(2.0, 0.0, 24.0, 16.0));
    }

    #[test]
    fn test_only_dirty_tiles_repaint() {
        let (mut view, mut renderer, style) = setup(320.0);
        for _ in 0..200 {
            view.add_sample(0.5, 0.0, -0.5);
        }
        renderer.render(&mut view, &style);
        assert_eq!(renderer.render(&mut view, &style).repainted, 0);

        view.add_sample(0.5, 0.0, -0.5);
        let stats = renderer.render(&mut view, &style);
        assert_eq!(stats.repainted, 1);
        assert_eq!(stats.composited, view.segment_count());
    }

    #[test]
    fn test_background_and_data_pixels() {
        let (mut view, mut renderer, style) = setup(320.0);
        for _ in 0..HISTORY_CAPACITY {
            view.add_sample(1.0, 0.0, 0.0);
        }
        renderer.render(&mut view, &style);

        // Far right, beyond every tile: plain background
        assert_eq!(renderer.pixel(300, 20), Some(style.background));
        // Topmost gridline sits on pixel row 7
        let grid = renderer.pixel(300, 7).unwrap();
        assert!(grid.r.abs_diff(style.gridline.r) <= 2, "got {:?}", grid);
        let above = renderer.pixel(300, 3).unwrap();
        assert_eq!(above, style.background);

        // The full segment now spans x = 31..64; x = +1.0 draws at row 40
        let p = renderer.pixel(45, 40).unwrap();
        assert!(p.r > p.g + 40, "expected red trace, got {:?}", p);
    }

    #[test]
    fn test_recycled_segment_reuses_its_pixmap() {
        let (mut view, mut renderer, style) = setup(40.0);
        for i in 0..2000 {
            view.add_sample((i as f64 * 0.1).sin(), 0.0, 0.0);
            if i % 7 == 0 {
                renderer.render(&mut view, &style);
            }
        }
        assert!(view.stats().recycled > 0);
        assert_eq!(renderer.cached_tiles(), view.segment_count());
    }

    #[test]
    fn test_offscreen_tiles_are_skipped() {
        let (mut view, mut renderer, style) = setup(40.0);
        // Two segments; the first scrolls past x = 40 before the pool recycles it
        for _ in 0..HISTORY_CAPACITY + 10 {
            view.add_sample(0.0, 0.0, 0.0);
        }
        let stats = renderer.render(&mut view, &style);
        assert_eq!(view.segment_count(), 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.composited, 1);
    }
}
