//! Fixed axis-label strip drawn above every segment tile.
//!
//! It covers the spawn point at the left edge of the view, which hides the
//! fact that the newest segment is only partly filled.

use crate::segment::draw_gridlines;
use crate::style::GraphStyle;
use crate::surface::{Canvas, Point, Rect, Tile};

/// Horizontal inset of the label column.
const LABEL_INSET: f32 = 2.0;
/// Width of the short gridline stubs to the right of the labels.
const STUB_WIDTH: f32 = 6.0;

#[derive(Debug, Clone)]
pub struct TextOverlay {
    tile: Tile,
    labels: Vec<(String, Rect)>,
}

impl TextOverlay {
    pub fn new(style: &GraphStyle) -> Self {
        let bounds = style.segment_bounds();
        Self {
            tile: Tile::new(bounds, Point::new(0.0, 0.0)),
            labels: axis_labels(style, bounds),
        }
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub fn labels(&self) -> &[(String, Rect)] {
        &self.labels
    }

    pub fn needs_display(&self) -> bool {
        self.tile.needs_display()
    }

    pub fn mark_displayed(&mut self) {
        self.tile.mark_displayed();
    }

    pub fn paint(&self, canvas: &mut dyn Canvas, style: &GraphStyle) {
        let bounds = self.tile.bounds();
        canvas.fill_rect(bounds, style.background);
        draw_gridlines(canvas, style, bounds.max_x() - STUB_WIDTH, STUB_WIDTH);
        for (text, rect) in &self.labels {
            canvas.draw_text(text, *rect, style.label_color);
        }
    }
}

/// One label per gridline band, reading the data value at the band's center.
fn axis_labels(style: &GraphStyle, bounds: Rect) -> Vec<(String, Rect)> {
    let rows = (bounds.height / style.grid_spacing).floor() as usize;
    let width = bounds.width - STUB_WIDTH - LABEL_INSET;
    (0..rows)
        .map(|row| {
            let top = bounds.y + row as f32 * style.grid_spacing;
            let center = top + style.grid_spacing / 2.0;
            let value = -(center as f64) / style.vertical_scale;
            let rect = Rect::new(bounds.x + LABEL_INSET, top, width, style.grid_spacing);
            (format_label(value), rect)
        })
        .collect()
}

fn format_label(value: f64) -> String {
    if value.abs() < 0.05 {
        " 0.0".to_string()
    } else {
        format!("{:+.1}", value)
    }
}
