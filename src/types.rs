use crate::raster::TextRun;
use crate::surface::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

// ─── Sample data ────────────────────────────────────────────────────────────

/// One reading of a three-axis channel group (x, y, z), in sensor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triple {
    pub const ZERO: Triple = Triple { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.3}, {:+.3}, {:+.3})", self.x, self.y, self.z)
    }
}

/// Complete motion reading at a moment in time.
/// Produced by the simulator, consumed by the graph controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionFrame {
    /// Microseconds since session start
    pub timestamp_us: u64,
    /// Raw accelerometer output in g (gravity included)
    pub acceleration: Triple,
    /// Raw gyro output in rad/s
    pub rotation_rate: Triple,
    /// Attitude as (roll, pitch, yaw) in radians
    pub attitude: Triple,
    /// Gravity component of the acceleration, in g
    pub gravity: Triple,
    /// Acceleration with gravity removed, in g
    pub user_acceleration: Triple,
}

impl MotionFrame {
    /// Device lying flat and still: gravity straight down the z axis.
    pub fn at_rest(timestamp_us: u64) -> Self {
        let gravity = Triple::new(0.0, 0.0, -1.0);
        Self {
            timestamp_us,
            acceleration: gravity,
            rotation_rate: Triple::ZERO,
            attitude: Triple::ZERO,
            gravity,
            user_acceleration: Triple::ZERO,
        }
    }
}

impl fmt::Display for MotionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>10}µs  acc{}  rot{}  att{}",
            self.timestamp_us, self.acceleration, self.rotation_rate, self.attitude,
        )
    }
}

// ─── Graph selection ────────────────────────────────────────────────────────

/// Which sensor stream the application graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphMode {
    /// One graph of raw acceleration
    Accelerometer,
    /// One graph of raw rotation rate
    Gyro,
    /// Four graphs fed from the fused device-motion reading
    DeviceMotion,
}

impl GraphMode {
    /// Number of channel groups (independent graphs) this mode keeps fed.
    pub fn graph_count(self) -> usize {
        match self {
            GraphMode::Accelerometer | GraphMode::Gyro => 1,
            GraphMode::DeviceMotion => MotionGraph::ALL.len(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GraphMode::Accelerometer => "accelerometer",
            GraphMode::Gyro => "gyro",
            GraphMode::DeviceMotion => "deviceMotion",
        }
    }
}

/// The device-motion sub-graphs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionGraph {
    Attitude,
    RotationRate,
    Gravity,
    UserAcceleration,
}

impl MotionGraph {
    pub const ALL: [MotionGraph; 4] = [
        MotionGraph::Attitude,
        MotionGraph::RotationRate,
        MotionGraph::Gravity,
        MotionGraph::UserAcceleration,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            MotionGraph::Attitude => "deviceMotion.attitude",
            MotionGraph::RotationRate => "deviceMotion.rotationRate",
            MotionGraph::Gravity => "deviceMotion.gravity",
            MotionGraph::UserAcceleration => "deviceMotion.userAcceleration",
        }
    }

    /// Pick this sub-graph's triple out of a full reading.
    pub fn select(self, frame: &MotionFrame) -> Triple {
        match self {
            MotionGraph::Attitude => frame.attitude,
            MotionGraph::RotationRate => frame.rotation_rate,
            MotionGraph::Gravity => frame.gravity,
            MotionGraph::UserAcceleration => frame.user_acceleration,
        }
    }

    pub fn axis_names(self) -> [&'static str; 3] {
        match self {
            MotionGraph::Attitude => ATTITUDE_AXIS_NAMES,
            _ => AXIS_NAMES,
        }
    }
}

// ─── Inter-thread messages ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum InputEvent {
    Motion(MotionFrame),
}

/// One composited view, sent from the controller to a presenter.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub title: String,
    /// One "name: value" label per axis
    pub readout: [String; 3],
    pub interval: Duration,
    pub running: bool,
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` pixels
    pub pixels: Vec<Rgba>,
    pub labels: Vec<TextRun>,
    pub accessibility: Option<String>,
    pub samples: u64,
    pub segments: usize,
}

impl DisplayFrame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

// ─── Session clock ──────────────────────────────────────────────────────────

/// Monotonic clock for the graphing session.
#[derive(Clone)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Update interval ────────────────────────────────────────────────────────

/// Fastest update interval a sensor stream is driven at.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(10);
/// Interval added per slider step.
pub const UPDATE_INTERVAL_STEP: Duration = Duration::from_millis(5);
pub const SLIDER_MAX: u32 = 100;

/// Map an interval-slider position (0..=100) to a sample interval:
/// 10 ms at the left stop, 510 ms at the right stop.
pub fn update_interval_for_slider(slider: u32) -> Duration {
    MIN_UPDATE_INTERVAL + UPDATE_INTERVAL_STEP * slider.min(SLIDER_MAX)
}

// ─── Constants ──────────────────────────────────────────────────────────────

pub const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];
pub const ATTITUDE_AXIS_NAMES: [&str; 3] = ["roll", "pitch", "yaw"];
