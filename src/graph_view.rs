use crate::overlay::TextOverlay;
use crate::history::SEGMENT_WIDTH;
use crate::segment::{draw_gridlines, GraphSegment, SegmentId};
use crate::style::GraphStyle;
use crate::surface::{Canvas, Point, Rect};
use crate::types::Triple;
use log::{debug, trace};
use std::collections::VecDeque;

/// Where a graph lives on screen and how it moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    /// Visible region in view coordinates (origin top-left)
    pub bounds: Rect,
    /// Position given to every freshly spawned or recycled segment
    pub spawn: Point,
    /// Horizontal shift applied to every segment per sample
    pub scroll_step: f32,
}

impl ViewGeometry {
    /// Segments spawn two units left of the view edge, under the overlay,
    /// and move one unit right per sample.
    pub const SPAWN_X: f32 = -2.0;

    pub fn new(width: f32, style: &GraphStyle) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width.max(1.0), style.graph_height),
            spawn: Point::new(Self::SPAWN_X, 0.0),
            scroll_step: 1.0,
        }
    }

    /// Upper bound on live segments for this view: ⌈width / segment⌉ + 1.
    pub fn max_segments(&self) -> usize {
        (self.bounds.width / SEGMENT_WIDTH).ceil() as usize + 1
    }
}

/// How the pool found the next active segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// The oldest segment was still on screen; a new one was created.
    Spawned(SegmentId),
    /// The oldest segment had scrolled out and was reused.
    Recycled(SegmentId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub samples: u64,
    pub spawned: u64,
    pub recycled: u64,
}

/// A scrolling three-channel graph built from a pool of segments.
///
/// Segments are ordered newest first. The front segment is the only one
/// accepting samples. When it fills, the oldest segment is reused if it has
/// scrolled out of view; otherwise a new segment is added. Every sample
/// shifts every segment by one scroll step, so the pool never holds more
/// than [`ViewGeometry::max_segments`] segments however long it runs.
pub struct GraphView {
    geometry: ViewGeometry,
    segment_bounds: Rect,
    segments: VecDeque<GraphSegment>,
    active: SegmentId,
    overlay: TextOverlay,
    next_id: u32,
    stats: PoolStats,
    last_rollover: Option<Rollover>,
}

impl GraphView {
    /// # Panics
    /// Panics if the style's segment width differs from [`SEGMENT_WIDTH`];
    /// segments are spaced by their sample count, not by the style.
    pub fn new(geometry: ViewGeometry, style: &GraphStyle) -> Self {
        assert_eq!(
            style.segment_width, SEGMENT_WIDTH,
            "segment width must match the history capacity"
        );
        let mut view = Self {
            geometry,
            segment_bounds: GraphSegment::tile_bounds(style),
            segments: VecDeque::new(),
            active: SegmentId(0),
            overlay: TextOverlay::new(style),
            next_id: 0,
            stats: PoolStats::default(),
            last_rollover: None,
        };
        view.active = view.spawn_segment();
        view
    }

    pub fn with_width(width: f32, style: &GraphStyle) -> Self {
        Self::new(ViewGeometry::new(width, style), style)
    }

    /// Record one sample and scroll every segment by one step.
    ///
    /// A segment that filled on the previous sample is retired here, before
    /// the new sample is recorded, so each sample lands in exactly one
    /// segment: 33 samples per segment, none dropped or repeated.
    pub fn add_sample(&mut self, x: f64, y: f64, z: f64) {
        if self.active().is_full() {
            let lead_in = self.active().latest();
            let rollover = self.recycle_or_spawn();
            trace!("rollover at sample {}: {:?}", self.stats.samples + 1, rollover);
            self.active_mut().set_lead_in(lead_in);
        }

        if self.active_mut().append(x, y, z) {
            trace!("{} full", self.active);
        }

        let step = self.geometry.scroll_step;
        for segment in self.segments.iter_mut() {
            segment.scroll_by(step);
        }

        self.stats.samples += 1;
        if self.stats.samples % 1000 == 0 {
            debug!(
                "GraphView: {} samples, {} segments ({} spawned, {} recycled)",
                self.stats.samples,
                self.segments.len(),
                self.stats.spawned,
                self.stats.recycled
            );
        }
    }

    pub fn add(&mut self, sample: Triple) {
        self.add_sample(sample.x, sample.y, sample.z);
    }

    fn recycle_or_spawn(&mut self) -> Rollover {
        let oldest_visible = match self.segments.back() {
            Some(oldest) => oldest.is_visible(&self.geometry.bounds),
            None => panic!("recycle from an empty segment pool"),
        };

        let rollover = if oldest_visible {
            Rollover::Spawned(self.spawn_segment())
        } else {
            let mut segment = match self.segments.pop_back() {
                Some(segment) => segment,
                None => panic!("recycle from an empty segment pool"),
            };
            segment.reset();
            segment.set_position(self.geometry.spawn);
            let id = segment.id();
            self.segments.push_front(segment);
            self.stats.recycled += 1;
            Rollover::Recycled(id)
        };

        self.active = match rollover {
            Rollover::Spawned(id) | Rollover::Recycled(id) => id,
        };
        self.last_rollover = Some(rollover);
        rollover
    }

    fn spawn_segment(&mut self) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        self.segments
            .push_front(GraphSegment::new(id, self.segment_bounds, self.geometry.spawn));
        self.stats.spawned += 1;
        id
    }

    fn active_mut(&mut self) -> &mut GraphSegment {
        let id = self.active;
        match self.segments.front_mut() {
            Some(segment) if segment.id() == id => segment,
            _ => panic!("active segment {} is not the front of the pool", id),
        }
    }

    pub fn active(&self) -> &GraphSegment {
        match self.segments.front() {
            Some(segment) if segment.id() == self.active => segment,
            _ => panic!("active segment {} is not the front of the pool", self.active),
        }
    }

    pub fn active_id(&self) -> SegmentId {
        self.active
    }

    /// Segments, newest first.
    pub fn segments(&self) -> impl Iterator<Item = &GraphSegment> {
        self.segments.iter()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&GraphSegment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn overlay(&self) -> &TextOverlay {
        &self.overlay
    }

    pub fn geometry(&self) -> &ViewGeometry {
        &self.geometry
    }

    pub fn visible_bounds(&self) -> Rect {
        self.geometry.bounds
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn last_rollover(&self) -> Option<Rollover> {
        self.last_rollover
    }

    /// Newest sample, from the front segment.
    pub fn latest(&self) -> Option<Triple> {
        self.segments.front().and_then(|s| s.latest())
    }

    /// Text for assistive readers describing the newest sample.
    pub fn current_accessibility_text(&self) -> Option<String> {
        self.segments.front().and_then(|s| s.accessibility_value())
    }

    /// Hand every dirty, visible segment to `paint`, then mark it displayed.
    /// Clean segments are skipped. Off-screen segments keep their dirty flag;
    /// they only come back on screen after a recycle. Returns how many were
    /// painted.
    pub fn paint_dirty_segments<F>(&mut self, mut paint: F) -> usize
    where
        F: FnMut(&GraphSegment),
    {
        let visible = self.geometry.bounds;
        let mut painted = 0;
        for segment in self
            .segments
            .iter_mut()
            .filter(|s| s.needs_display() && s.is_visible(&visible))
        {
            paint(segment);
            segment.mark_displayed();
            painted += 1;
        }
        painted
    }

    /// Hand the overlay to `paint` if it has never been drawn.
    pub fn paint_overlay_if_dirty<F>(&mut self, paint: F) -> bool
    where
        F: FnOnce(&TextOverlay),
    {
        if !self.overlay.needs_display() {
            return false;
        }
        paint(&self.overlay);
        self.overlay.mark_displayed();
        true
    }

    /// Local bounds of the view background, zero line at y = 0.
    pub fn background_bounds(&self) -> Rect {
        let b = self.geometry.bounds;
        Rect::new(0.0, -b.height / 2.0, b.width, b.height)
    }

    /// Background behind the segments: fill plus full-width gridlines.
    pub fn paint_background(&self, canvas: &mut dyn Canvas, style: &GraphStyle) {
        let bounds = self.background_bounds();
        canvas.fill_rect(bounds, style.background);
        draw_gridlines(canvas, style, bounds.x, bounds.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_CAPACITY;

    fn view(width: f32) -> GraphView {
        GraphView::with_width(width, &GraphStyle::default())
    }

    #[test]
    fn test_starts_with_one_active_segment() {
        let v = view(320.0);
        assert_eq!(v.segment_count(), 1);
        assert_eq!(v.active().position(), Point::new(-2.0, 0.0));
        assert_eq!(v.current_accessibility_text(), None);
        assert_eq!(v.stats().spawned, 1);
    }

    #[test]
    fn test_each_sample_scrolls_every_segment() {
        let mut v = view(100.0);
        for i in 0..1000 {
            let before: Vec<(SegmentId, f32)> =
                v.segments().map(|s| (s.id(), s.position().x)).collect();
            let recycled_before = v.stats().recycled;
            v.add_sample(i as f64, 0.0, 0.0);
            let recycled = match v.last_rollover() {
                Some(Rollover::Recycled(id)) if v.stats().recycled > recycled_before => Some(id),
                _ => None,
            };
            for (id, x) in before {
                let seg = v.segment(id).unwrap();
                if Some(id) == recycled {
                    assert_eq!(seg.position().x, ViewGeometry::SPAWN_X + 1.0);
                } else {
                    assert_eq!(seg.position().x, x + 1.0);
                }
            }
            // Newest first means left to right on screen
            let xs: Vec<f32> = v.segments().map(|s| s.position().x).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "order broken: {:?}", xs);
        }
    }

    #[test]
    fn test_overflow_sample_opens_next_segment() {
        let mut v = view(320.0);
        for i in 1..=HISTORY_CAPACITY {
            v.add_sample(i as f64, 0.0, 0.0);
        }
        let first = v.active_id();
        assert!(v.active().is_full());
        v.add_sample(34.0, 0.0, 0.0);
        assert_ne!(v.active_id(), first);
        assert_eq!(v.last_rollover(), Some(Rollover::Spawned(v.active_id())));
        assert_eq!(v.active().history().len(), 1);
        assert_eq!(v.latest(), Some(Triple::new(34.0, 0.0, 0.0)));
        // The old segment kept exactly its 33 samples
        let old = v.segment(first).unwrap();
        assert_eq!(old.history().len(), HISTORY_CAPACITY);
        assert_eq!(old.latest(), Some(Triple::new(33.0, 0.0, 0.0)));
    }

    #[test]
    fn test_offscreen_oldest_is_recycled() {
        // A view narrower than one segment: the oldest leaves quickly
        let mut v = view(20.0);
        let first = v.active_id();
        for _ in 0..HISTORY_CAPACITY {
            v.add_sample(1.0, 1.0, 1.0);
        }
        // First segment moved 33 units: its frame starts at x=31, past the view
        assert!(!v.active().is_visible(&v.visible_bounds()));
        v.add_sample(2.0, 2.0, 2.0);
        assert_eq!(v.last_rollover(), Some(Rollover::Recycled(first)));
        assert_eq!(v.active_id(), first);
        assert_eq!(v.segment_count(), 1);
        // Reset, moved back to spawn, then scrolled once
        assert_eq!(v.active().position(), Point::new(-1.0, 0.0));
        assert_eq!(v.active().history().len(), 1);
    }

    #[test]
    fn test_pool_stays_bounded() {
        let style = GraphStyle::default();
        for width in [20.0, 64.0, 100.0, 320.0, 333.0] {
            let mut v = GraphView::with_width(width, &style);
            let bound = v.geometry().max_segments();
            for i in 0..5000 {
                v.add_sample((i as f64).sin(), 0.0, 0.0);
                assert!(v.segment_count() <= bound, "width {} grew to {}", width, v.segment_count());
            }
            assert!(v.stats().recycled > 0);
        }
    }

    #[test]
    fn test_paint_dirty_skips_clean_segments() {
        let mut v = view(320.0);
        assert_eq!(v.paint_dirty_segments(|_| {}), 1);
        assert_eq!(v.paint_dirty_segments(|_| {}), 0);
        v.add_sample(1.0, 0.0, 0.0);
        let mut painted = Vec::new();
        v.paint_dirty_segments(|s| painted.push(s.id()));
        assert_eq!(painted, vec![v.active_id()]);
    }

    #[test]
    fn test_offscreen_segment_is_not_repainted() {
        let mut v = view(20.0);
        assert_eq!(v.paint_dirty_segments(|_| {}), 1);
        // Left edge at -2 + 22 = 20: touching the view edge only
        for _ in 0..22 {
            v.add_sample(1.0, 0.0, 0.0);
        }
        assert!(!v.active().is_visible(&v.visible_bounds()));
        assert_eq!(v.paint_dirty_segments(|_| {}), 0);
        v.add_sample(1.0, 0.0, 0.0);
        assert_eq!(v.paint_dirty_segments(|_| {}), 0);
        assert!(v.active().needs_display());

        // Sample 34 recycles it back to the spawn point; it paints again
        for _ in 23..=HISTORY_CAPACITY {
            v.add_sample(2.0, 0.0, 0.0);
        }
        assert!(matches!(v.last_rollover(), Some(Rollover::Recycled(_))));
        assert_eq!(v.paint_dirty_segments(|_| {}), 1);
    }

    #[test]
    #[should_panic(expected = "segment width")]
    fn test_mismatched_segment_width_panics() {
        let style = GraphStyle {
            segment_width: 64.0,
            ..GraphStyle::default()
        };
        GraphView::with_width(320.0, &style);
    }

    #[test]
    fn test_overlay_painted_once() {
        let mut v = view(320.0);
        assert!(v.paint_overlay_if_dirty(|_| {}));
        assert!(!v.paint_overlay_if_dirty(|_| {}));
        v.add_sample(1.0, 1.0, 1.0);
        assert!(!v.paint_overlay_if_dirty(|_| {}));
    }
}
