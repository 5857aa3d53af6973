//! Graph style: colors and scales used by every paint call.
//!
//! Built once at startup (defaults, or a JSON file) and passed by reference
//! into painting. Never mutated while graphs are live.

use crate::history::{Channel, SEGMENT_WIDTH};
use crate::surface::{Rect, Rgba};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub background: Rgba,
    pub gridline: Rgba,
    pub x_color: Rgba,
    pub y_color: Rgba,
    pub z_color: Rgba,
    pub label_color: Rgba,
    /// Stroke width for gridlines and data lines
    pub line_width: f32,
    /// Display units per data unit on the vertical axis
    pub vertical_scale: f64,
    /// Offset of the topmost gridline from the zero line (negative = above)
    pub grid_first: f32,
    pub grid_spacing: f32,
    /// Width of one segment; fixed by the history capacity at one display
    /// unit per sample. Files giving any other value are rejected.
    pub segment_width: f32,
    /// Height of the graph band; zero sits in the middle
    pub graph_height: f32,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            background: Rgba::gray(0.6),
            gridline: Rgba::gray(0.5),
            x_color: Rgba::rgb(255, 0, 0),
            y_color: Rgba::rgb(0, 255, 0),
            z_color: Rgba::rgb(0, 0, 255),
            label_color: Rgba::WHITE,
            line_width: 1.0,
            vertical_scale: 16.0,
            grid_first: -48.5,
            grid_spacing: 16.0,
            segment_width: SEGMENT_WIDTH,
            graph_height: 112.0,
        }
    }
}

impl GraphStyle {
    /// Load from a JSON file. Returns None if file is absent or malformed.
    /// Missing fields take their default values.
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<GraphStyle>(&data) {
            Ok(s) => match s.problem() {
                None => {
                    info!("Loaded graph style from {:?}", path);
                    Some(s)
                }
                Some(problem) => {
                    warn!("Graph style {:?} ignored: {}", path, problem);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to parse graph style {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, json)?;
        info!("Graph style saved to {:?}", path);
        Ok(())
    }

    /// Why this style cannot drive a graph, if it cannot.
    fn problem(&self) -> Option<String> {
        if self.segment_width != SEGMENT_WIDTH {
            return Some(format!(
                "segment_width must be {} (one unit per sample), got {}",
                SEGMENT_WIDTH, self.segment_width
            ));
        }
        if !(self.graph_height.is_finite() && self.graph_height >= 1.0) {
            return Some(format!("graph_height {} is not a positive size", self.graph_height));
        }
        if !(self.grid_spacing.is_finite() && self.grid_spacing > 0.0) {
            return Some(format!("grid_spacing {} is not positive", self.grid_spacing));
        }
        if !self.grid_first.is_finite() || self.grid_first.abs() > self.graph_height / 2.0 {
            return Some(format!(
                "grid_first {} lies outside the {}-high graph",
                self.grid_first, self.graph_height
            ));
        }
        if !(self.vertical_scale.is_finite() && self.vertical_scale > 0.0) {
            return Some(format!("vertical_scale {} is not positive", self.vertical_scale));
        }
        if !(self.line_width.is_finite() && self.line_width >= 0.0) {
            return Some(format!("line_width {} is not a valid stroke", self.line_width));
        }
        None
    }

    pub fn channel_color(&self, channel: Channel) -> Rgba {
        match channel {
            Channel::X => self.x_color,
            Channel::Y => self.y_color,
            Channel::Z => self.z_color,
        }
    }

    /// Local bounds of a segment tile: zero line at y = 0.
    pub fn segment_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            -self.graph_height / 2.0,
            self.segment_width,
            self.graph_height,
        )
    }

    /// Vertical offsets of the horizontal gridlines, symmetric about zero.
    /// Lines outside the graph band are left out.
    pub fn gridline_offsets(&self) -> Vec<f32> {
        let first = self.grid_first as f64;
        let spacing = self.grid_spacing as f64;
        let half = self.graph_height as f64 / 2.0;
        if !(first.is_finite() && spacing.is_finite() && spacing > 0.0 && half.is_finite()) {
            return Vec::new();
        }

        let last = (-first).min(half);
        let mut i = ((-half - first) / spacing).ceil().max(0.0);
        let mut ys = Vec::new();
        loop {
            let y = first + i * spacing;
            if y > last {
                break;
            }
            ys.push(y as f32);
            i += 1.0;
        }
        ys
    }

    /// Map a data value to a vertical display offset. Positive values draw upward.
    pub fn scale_value(&self, value: f64) -> f32 {
        (-value * self.vertical_scale) as f32
    }
}
