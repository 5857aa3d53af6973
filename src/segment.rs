use crate::history::{Channel, SampleHistory, HISTORY_CAPACITY};
use crate::style::GraphStyle;
use crate::surface::{Canvas, Point, Rect, Tile};
use crate::types::Triple;
use std::fmt;

/// Stable identity of a segment within its pool. Survives recycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg#{}", self.0)
    }
}

/// One fixed-width slice of the scrolling timeline.
///
/// Holds up to 33 samples and the tile they are painted into. The segment
/// marks its tile dirty on every change; the presenter repaints it and
/// clears the flag. A segment that is not appended to is never repainted.
#[derive(Debug, Clone)]
pub struct GraphSegment {
    id: SegmentId,
    history: SampleHistory,
    tile: Tile,
    /// Newest sample of the segment that was active before this one.
    /// Only painted, as the joint between the two tiles.
    lead_in: Option<Triple>,
}

impl GraphSegment {
    pub fn new(id: SegmentId, bounds: Rect, position: Point) -> Self {
        Self {
            id,
            history: SampleHistory::new(),
            tile: Tile::new(bounds, position),
            lead_in: None,
        }
    }

    /// Tile bounds for a segment: the style's segment width plus one column
    /// on the right for the joint to the previous segment.
    pub fn tile_bounds(style: &GraphStyle) -> Rect {
        let mut bounds = style.segment_bounds();
        bounds.width += 1.0;
        bounds
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// Record one sample. Returns true when the segment just became full and
    /// the caller must find a new active segment.
    pub fn append(&mut self, x: f64, y: f64, z: f64) -> bool {
        let full = self.history.append(x, y, z);
        self.tile.set_needs_display();
        full
    }

    /// Clear all samples for reuse. Position is left to the pool.
    pub fn reset(&mut self) {
        self.history.reset();
        self.lead_in = None;
        self.tile.set_needs_display();
    }

    pub fn lead_in(&self) -> Option<Triple> {
        self.lead_in
    }

    pub(crate) fn set_lead_in(&mut self, lead_in: Option<Triple>) {
        self.lead_in = lead_in;
        self.tile.set_needs_display();
    }

    pub fn is_full(&self) -> bool {
        self.history.is_full()
    }

    pub fn is_visible(&self, view_bounds: &Rect) -> bool {
        self.tile.intersects(view_bounds)
    }

    pub fn position(&self) -> Point {
        self.tile.position()
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.tile.set_position(position);
    }

    pub(crate) fn scroll_by(&mut self, dx: f32) {
        self.tile.translate(dx, 0.0);
    }

    pub fn needs_display(&self) -> bool {
        self.tile.needs_display()
    }

    pub fn mark_displayed(&mut self) {
        self.tile.mark_displayed();
    }

    /// Newest sample, if any has been recorded since the last reset.
    pub fn latest(&self) -> Option<Triple> {
        self.history.latest()
    }

    /// Spoken description of the newest sample.
    pub fn accessibility_value(&self) -> Option<String> {
        self.latest()
            .map(|t| format!("x {:.3}, y {:.3}, z {:.3}", t.x, t.y, t.z))
    }

    /// Paint background, gridlines and one polyline per channel into the
    /// tile's local space. Every slot is drawn: slots not yet written sit at
    /// zero, so a partly filled segment shows a flat run at the zero line.
    /// With a lead-in, each polyline gets one more segment out to x = 33
    /// joining it to the previous tile.
    pub fn paint(&self, canvas: &mut dyn Canvas, style: &GraphStyle) {
        let bounds = self.tile.bounds();
        canvas.fill_rect(bounds, style.background);
        draw_gridlines(canvas, style, bounds.x, bounds.width);

        let oldest = HISTORY_CAPACITY - 1;
        let mut lines = Vec::with_capacity(HISTORY_CAPACITY);
        for channel in Channel::ALL {
            let values = self.history.channel(channel);
            lines.clear();
            lines.extend(values.windows(2).enumerate().map(|(i, pair)| {
                (
                    Point::new(i as f32, style.scale_value(pair[0])),
                    Point::new((i + 1) as f32, style.scale_value(pair[1])),
                )
            }));
            canvas.stroke_segments(&lines, style.channel_color(channel), style.line_width);

            if let Some(lead_in) = self.lead_in {
                let previous = match channel {
                    Channel::X => lead_in.x,
                    Channel::Y => lead_in.y,
                    Channel::Z => lead_in.z,
                };
                let joint = [(
                    Point::new(oldest as f32, style.scale_value(values[oldest])),
                    Point::new(HISTORY_CAPACITY as f32, style.scale_value(previous)),
                )];
                canvas.stroke_segments(&joint, style.channel_color(channel), style.line_width);
            }
        }
    }
}

/// Horizontal gridlines across `[x, x + width)` at the style's fixed offsets.
pub fn draw_gridlines(canvas: &mut dyn Canvas, style: &GraphStyle, x: f32, width: f32) {
    let lines: Vec<(Point, Point)> = style
        .gridline_offsets()
        .into_iter()
        .map(|y| (Point::new(x, y), Point::new(x + width, y)))
        .collect();
    canvas.stroke_segments(&lines, style.gridline, style.line_width);
}
