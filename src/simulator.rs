use crate::history::Channel;
use crate::types::*;
use crossbeam_channel::Sender;
use log::info;
use std::f64::consts::PI;
use std::thread;
use std::time::Duration;

/// Generates plausible motion readings so the graphs can be driven without
/// a physical sensor.
pub struct Simulator {
    clock: SessionClock,
    tx: Sender<InputEvent>,
    interval: Duration,
    frames_sent: u64,
}

/// Mutable state that evolves as gestures are applied.
#[derive(Clone, Copy, Default)]
struct SimState {
    /// (roll, pitch, yaw) in radians
    attitude: Triple,
    rotation_rate: Triple,
    user_acceleration: Triple,
}

impl SimState {
    /// Unit gravity vector in the device frame for the current attitude.
    fn gravity(&self) -> Triple {
        let (roll, pitch) = (self.attitude.x, self.attitude.y);
        Triple::new(
            -pitch.cos() * roll.sin(),
            pitch.sin(),
            -pitch.cos() * roll.cos(),
        )
    }

    fn frame(&self, timestamp_us: u64) -> MotionFrame {
        let gravity = self.gravity();
        MotionFrame {
            timestamp_us,
            acceleration: Triple::new(
                gravity.x + self.user_acceleration.x,
                gravity.y + self.user_acceleration.y,
                gravity.z + self.user_acceleration.z,
            ),
            rotation_rate: self.rotation_rate,
            attitude: self.attitude,
            gravity,
            user_acceleration: self.user_acceleration,
        }
    }
}

impl Simulator {
    /// `interval` is the time between frames, normally from
    /// [`update_interval_for_slider`].
    pub fn new(clock: SessionClock, tx: Sender<InputEvent>, interval: Duration) -> Self {
        Self {
            clock,
            tx,
            interval,
            frames_sent: 0,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Run the demo sequence, then keep reporting the final state until the
    /// receiver hangs up. Blocks the calling thread.
    pub fn run(&mut self) {
        info!(
            "Simulator starting demo sequence ({} ms interval)...",
            self.interval.as_millis()
        );
        let mut state = SimState::default();

        if !self.run_script(&demo_sequence(), &mut state) {
            info!("Simulator stopped: receiver closed after {} frames", self.frames_sent);
            return;
        }

        info!("Demo sequence complete. Holding final state...");
        state.rotation_rate = Triple::ZERO;
        state.user_acceleration = Triple::ZERO;
        while self.emit_tick(&state) {}
        info!("Simulator stopped: receiver closed after {} frames", self.frames_sent);
    }

    /// Play `gestures` from a resting device. Returns false if the receiver
    /// hung up before the script finished.
    pub fn play(&mut self, gestures: &[Gesture]) -> bool {
        let mut state = SimState::default();
        self.run_script(gestures, &mut state)
    }

    fn run_script(&mut self, gestures: &[Gesture], state: &mut SimState) -> bool {
        gestures.iter().all(|g| self.execute(g, state))
    }

    fn ticks_for(&self, ms: u32) -> u64 {
        let tick_us = self.interval.as_micros().max(1) as u64;
        (ms as u64 * 1000 / tick_us).max(1)
    }

    fn tick_secs(&self) -> f64 {
        self.interval.as_secs_f64().max(1e-3)
    }

    fn execute(&mut self, gesture: &Gesture, state: &mut SimState) -> bool {
        match *gesture {
            Gesture::Hold { ms } => {
                info!("  hold {}ms", ms);
                state.rotation_rate = Triple::ZERO;
                state.user_acceleration = Triple::ZERO;
                for _ in 0..self.ticks_for(ms) {
                    if !self.emit_tick(state) {
                        return false;
                    }
                }
            }

            Gesture::Tilt { roll, pitch, ms } => {
                let from = state.attitude;
                info!(
                    "  tilt roll {:+.2} → {:+.2}, pitch {:+.2} → {:+.2} over {}ms",
                    from.x, roll, from.y, pitch, ms
                );
                let ticks = self.ticks_for(ms);
                let dt = self.tick_secs();
                for i in 1..=ticks {
                    let t = smoothstep(i as f64 / ticks as f64);
                    let prev = state.attitude;
                    state.attitude.x = lerp(from.x, roll, t);
                    state.attitude.y = lerp(from.y, pitch, t);
                    state.rotation_rate = Triple::new(
                        (state.attitude.x - prev.x) / dt,
                        (state.attitude.y - prev.y) / dt,
                        0.0,
                    );
                    if !self.emit_tick(state) {
                        return false;
                    }
                }
                state.rotation_rate = Triple::ZERO;
            }

            Gesture::Spin { rate, ms } => {
                info!("  spin {:+.2} rad/s for {}ms", rate, ms);
                let dt = self.tick_secs();
                state.rotation_rate = Triple::new(0.0, 0.0, rate);
                for _ in 0..self.ticks_for(ms) {
                    state.attitude.z = wrap_angle(state.attitude.z + rate * dt);
                    if !self.emit_tick(state) {
                        return false;
                    }
                }
                state.rotation_rate = Triple::ZERO;
            }

            Gesture::Shake {
                axis,
                amplitude,
                rate_hz,
                ms,
            } => {
                info!(
                    "  shake {:?} ±{:.2}g at {}Hz for {}ms",
                    axis, amplitude, rate_hz, ms
                );
                let dt = self.tick_secs();
                for i in 0..self.ticks_for(ms) {
                    let v = amplitude * (2.0 * PI * rate_hz * i as f64 * dt).sin();
                    state.user_acceleration = match axis {
                        Channel::X => Triple::new(v, 0.0, 0.0),
                        Channel::Y => Triple::new(0.0, v, 0.0),
                        Channel::Z => Triple::new(0.0, 0.0, v),
                    };
                    if !self.emit_tick(state) {
                        return false;
                    }
                }
                state.user_acceleration = Triple::ZERO;
            }
        }
        true
    }

    /// Emit one frame and sleep one interval. Returns false once the
    /// receiver is gone.
    fn emit_tick(&mut self, state: &SimState) -> bool {
        let frame = state.frame(self.clock.now_us());
        if self.tx.send(InputEvent::Motion(frame)).is_err() {
            return false;
        }
        self.frames_sent += 1;
        thread::sleep(self.interval);
        true
    }
}

// ─── Gesture types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Keep still.
    Hold { ms: u32 },
    /// Ease to an absolute roll/pitch (radians).
    Tilt { roll: f64, pitch: f64, ms: u32 },
    /// Turn about the vertical axis at a constant rate (rad/s).
    Spin { rate: f64, ms: u32 },
    /// Sinusoidal user acceleration along one axis (g).
    Shake {
        axis: Channel,
        amplitude: f64,
        rate_hz: f64,
        ms: u32,
    },
}

/// Roughly 12 seconds of handling: tilts, a spin and shakes on each axis.
fn demo_sequence() -> Vec<Gesture> {
    vec![
        Gesture::Hold { ms: 500 },

        // Pick the device up and tip it toward the user
        Gesture::Tilt { roll: 0.0, pitch: 0.6, ms: 800 },
        Gesture::Hold { ms: 400 },
        Gesture::Tilt { roll: -0.8, pitch: 0.6, ms: 700 },
        Gesture::Hold { ms: 300 },

        // Flat again, then turn it around on the table
        Gesture::Tilt { roll: 0.0, pitch: 0.0, ms: 900 },
        Gesture::Spin { rate: 2.5, ms: 1500 },
        Gesture::Hold { ms: 300 },
        Gesture::Spin { rate: -1.2, ms: 1000 },

        // Shake along each axis
        Gesture::Shake { axis: Channel::X, amplitude: 1.5, rate_hz: 4.0, ms: 1000 },
        Gesture::Hold { ms: 200 },
        Gesture::Shake { axis: Channel::Y, amplitude: 1.0, rate_hz: 6.0, ms: 800 },
        Gesture::Hold { ms: 200 },
        Gesture::Shake { axis: Channel::Z, amplitude: 2.5, rate_hz: 3.0, ms: 800 },

        // Stand it up on its edge and leave it there
        Gesture::Tilt { roll: 1.2, pitch: 0.1, ms: 1200 },
        Gesture::Hold { ms: 1000 },
    ]
}

// ─── Math helpers ───────────────────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smooth interpolation (ease in/out)
fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap to (-π, π].
fn wrap_angle(a: f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}
