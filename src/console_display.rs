use crate::surface::Rgba;
use crate::types::*;
use crossbeam_channel::Receiver;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Width of the axis-label gutter left of the graph.
const GUTTER: usize = 6;

/// Renders the composited graph in a true-color terminal, two pixel rows
/// per text row using upper half blocks.
pub struct ConsoleDisplay {
    rx: Receiver<DisplayFrame>,
    columns: usize,
}

impl ConsoleDisplay {
    /// `columns` is the widest the graph may be printed; wider frames are
    /// sampled down to fit.
    pub fn new(rx: Receiver<DisplayFrame>, columns: usize) -> Self {
        Self {
            rx,
            columns: columns.max(1),
        }
    }

    pub fn run(&self) {
        let mut stdout = io::stdout();
        for frame in self.rx.iter() {
            // Clear screen and move cursor home
            print!("\x1b[2J\x1b[H{}", render_frame(&frame, self.columns));
            let _ = stdout.flush();
        }
    }
}

/// The full dashboard for one frame, ANSI escapes included.
pub fn render_frame(frame: &DisplayFrame, columns: usize) -> String {
    let mut out = String::new();
    let state = if frame.running { "running" } else { "stopped" };

    let _ = writeln!(out, "  {}", frame.title);
    let _ = writeln!(
        out,
        "  interval {} ms   samples {}   segments {}   [{}]",
        frame.interval.as_millis(),
        frame.samples,
        frame.segments,
        state
    );
    let _ = writeln!(out);

    let step = frame.width.div_ceil(columns.max(1) as u32).max(1);
    let text_rows = frame.height.div_ceil(2);
    for row in 0..text_rows {
        let top = row * 2;
        let _ = write!(out, "{:>width$} ", label_for_row(frame, top), width = GUTTER - 1);
        let mut x = 0;
        while x < frame.width {
            let upper = frame.pixel(x, top).unwrap_or(BLACK);
            let lower = frame.pixel(x, top + 1).unwrap_or(BLACK);
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m▀",
                upper.r, upper.g, upper.b, lower.r, lower.g, lower.b
            );
            x += step;
        }
        let _ = writeln!(out, "\x1b[0m");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", frame.readout.join("   "));
    if let Some(text) = &frame.accessibility {
        let _ = writeln!(out, "  ({})", text);
    }
    out
}

const BLACK: Rgba = Rgba::rgb(0, 0, 0);

/// Overlay label whose vertical center falls on this pair of pixel rows.
fn label_for_row(frame: &DisplayFrame, top: u32) -> &str {
    frame
        .labels
        .iter()
        .find(|run| {
            let center = (run.rect.y + run.rect.height / 2.0).floor() as i64;
            center == top as i64 || center == top as i64 + 1
        })
        .map(|run| run.text.trim())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::TextRun;
    use crate::surface::Rect;
    use std::time::Duration;

    fn frame(width: u32, height: u32) -> DisplayFrame {
        DisplayFrame {
            title: "accelerometer".to_string(),
            readout: ["x: 0.000", "y: 0.000", "z: -1.000"].map(String::from),
            interval: Duration::from_millis(60),
            running: true,
            width,
            height,
            pixels: vec![Rgba::rgb(10, 20, 30); (width * height) as usize],
            labels: vec![TextRun {
                text: "+1.0".to_string(),
                rect: Rect::new(2.0, 0.0, 24.0, 16.0),
                color: Rgba::WHITE,
            }],
            accessibility: Some("x 0.000, y 0.000, z -1.000".to_string()),
            samples: 12,
            segments: 1,
        }
    }

    #[test]
    fn test_render_rows_and_header() {
        let out = render_frame(&frame(8, 6), 80);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  accelerometer");
        assert!(lines[1].contains("interval 60 ms"));
        assert!(lines[1].contains("[running]"));
        // 6 pixel rows print as 3 text rows of 8 half blocks
        let graph: Vec<&&str> = lines.iter().filter(|l| l.contains('▀')).collect();
        assert_eq!(graph.len(), 3);
        assert!(graph.iter().all(|l| l.matches('▀').count() == 8));
        assert!(graph[0].contains("\x1b[38;2;10;20;30m"));
        assert!(out.contains("x: 0.000   y: 0.000   z: -1.000"));
        assert!(out.contains("(x 0.000, y 0.000, z -1.000)"));
    }

    #[test]
    fn test_wide_frames_are_sampled_down() {
        let out = render_frame(&frame(320, 2), 80);
        let row = out.lines().find(|l| l.contains('▀')).unwrap();
        assert_eq!(row.matches('▀').count(), 80);
    }

    #[test]
    fn test_label_lands_on_its_band_center() {
        let f = frame(4, 16);
        // Band 0..16 is centered on pixel row 8: text row 4
        assert_eq!(label_for_row(&f, 8), "+1.0");
        assert_eq!(label_for_row(&f, 6), "");
        let out = render_frame(&f, 80);
        let rows: Vec<&str> = out.lines().filter(|l| l.contains('▀')).collect();
        assert!(rows[4].starts_with(" +1.0 "));
    }
}
