use crate::graph_view::GraphView;
use crate::raster::ViewRenderer;
use crate::style::GraphStyle;
use crate::types::*;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

/// The graph controller receives motion frames, routes each one to the
/// graph(s) of the current mode, and periodically renders the displayed
/// graph for downstream presenters.
///
/// # Modes
///
/// Accelerometer and gyro modes keep one graph. Device-motion mode keeps
/// four, all fed from the same frame; [`select_graph`](Self::select_graph)
/// only chooses which one is shown.
///
/// # Lifecycle
///
/// Frames are accepted between [`start`](Self::start) and
/// [`stop`](Self::stop). Frames arriving while stopped are dropped.
pub struct GraphController {
    mode: GraphMode,
    selected: MotionGraph,
    style: GraphStyle,
    width: f32,
    views: Vec<GraphView>,
    renderers: Vec<Option<ViewRenderer>>,
    running: bool,
    interval: Duration,
    frames_accepted: u64,
    frames_dropped: u64,
}

impl GraphController {
    pub fn new(mode: GraphMode, width: f32, style: GraphStyle) -> Self {
        let mut controller = Self {
            mode,
            selected: MotionGraph::Attitude,
            style,
            width,
            views: Vec::new(),
            renderers: Vec::new(),
            running: false,
            interval: MIN_UPDATE_INTERVAL,
            frames_accepted: 0,
            frames_dropped: 0,
        };
        controller.build_views();
        controller
    }

    fn build_views(&mut self) {
        let count = self.mode.graph_count();
        self.views = (0..count)
            .map(|_| GraphView::with_width(self.width, &self.style))
            .collect();
        self.renderers = (0..count).map(|_| None).collect();
    }

    /// Begin accepting frames delivered every `interval`.
    pub fn start(&mut self, interval: Duration) {
        self.interval = interval;
        self.running = true;
        info!(
            "Graph controller started: {} every {} ms",
            self.mode.name(),
            interval.as_millis()
        );
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(
                "Graph controller stopped after {} frames ({} dropped)",
                self.frames_accepted, self.frames_dropped
            );
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    /// Switch the sensor stream being graphed. Every graph starts empty.
    pub fn set_mode(&mut self, mode: GraphMode) {
        if mode == self.mode {
            return;
        }
        info!("Graph mode {} → {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.build_views();
    }

    pub fn selected_graph(&self) -> MotionGraph {
        self.selected
    }

    /// Choose which device-motion graph is displayed.
    pub fn select_graph(&mut self, graph: MotionGraph) {
        if graph != self.selected {
            info!("Displaying {}", graph.title());
        }
        self.selected = graph;
    }

    /// Feed one frame to the graphs. Returns false if it was dropped
    /// because the controller is stopped.
    pub fn handle_frame(&mut self, frame: &MotionFrame) -> bool {
        if !self.running {
            self.frames_dropped += 1;
            trace!("dropped frame at {}µs: stopped", frame.timestamp_us);
            return false;
        }

        match self.mode {
            GraphMode::Accelerometer => self.views[0].add(frame.acceleration),
            GraphMode::Gyro => self.views[0].add(frame.rotation_rate),
            GraphMode::DeviceMotion => {
                for graph in MotionGraph::ALL {
                    self.views[graph.index()].add(graph.select(frame));
                }
            }
        }

        self.frames_accepted += 1;
        if self.frames_accepted % 1000 == 0 {
            debug!(
                "GraphController: {} frames, {} dropped",
                self.frames_accepted, self.frames_dropped
            );
            trace!("Latest: {}", frame);
        }
        true
    }

    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    fn displayed_index(&self) -> usize {
        match self.mode {
            GraphMode::DeviceMotion => self.selected.index(),
            _ => 0,
        }
    }

    /// The graph currently shown.
    pub fn displayed(&self) -> &GraphView {
        &self.views[self.displayed_index()]
    }

    /// Every graph kept fed in the current mode, in display order.
    pub fn views(&self) -> &[GraphView] {
        &self.views
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            GraphMode::DeviceMotion => self.selected.title(),
            mode => mode.name(),
        }
    }

    /// "name: value" per axis for the newest sample of the displayed graph.
    pub fn readout(&self) -> [String; 3] {
        let names = match self.mode {
            GraphMode::DeviceMotion => self.selected.axis_names(),
            _ => AXIS_NAMES,
        };
        let latest = self.displayed().latest().unwrap_or(Triple::ZERO);
        let values = [latest.x, latest.y, latest.z];
        [0, 1, 2].map(|i| format!("{}: {:.3}", names[i], values[i]))
    }

    /// Repaint and composite the displayed graph.
    pub fn render_frame(&mut self) -> Option<DisplayFrame> {
        let index = self.displayed_index();
        if self.renderers[index].is_none() {
            self.renderers[index] = ViewRenderer::new(&self.views[index], &self.style);
            if self.renderers[index].is_none() {
                warn!("Cannot allocate a {}-wide frame", self.width);
                return None;
            }
        }
        let (width, height, pixels, labels) = {
            let renderer = self.renderers[index].as_mut()?;
            let stats = renderer.render(&mut self.views[index], &self.style);
            trace!("render: {:?}", stats);
            (
                renderer.width(),
                renderer.height(),
                renderer.pixels(),
                renderer.texts().to_vec(),
            )
        };

        Some(DisplayFrame {
            title: self.title().to_string(),
            readout: self.readout(),
            interval: self.interval,
            running: self.running,
            width,
            height,
            pixels,
            labels,
            accessibility: self.displayed().current_accessibility_text(),
            samples: self.displayed().stats().samples,
            segments: self.displayed().segment_count(),
        })
    }

    /// Consume events until the producer hangs up (or `limit` has passed),
    /// rendering the displayed graph `display_hz` times a second to
    /// `display_tx`. Returning drops the receiver, which stops the producer.
    pub fn run(
        &mut self,
        input_rx: Receiver<InputEvent>,
        display_tx: Option<Sender<DisplayFrame>>,
        display_hz: u32,
        limit: Option<Duration>,
    ) {
        info!("Graph controller running ({} graphs)", self.views.len());
        let period = Duration::from_secs_f64(1.0 / display_hz.max(1) as f64);
        let started = Instant::now();
        let mut last_render = Instant::now();
        let mut rendered: u64 = 0;

        loop {
            if let Some(limit) = limit {
                if started.elapsed() >= limit {
                    info!("Run time of {} s reached", limit.as_secs_f64());
                    break;
                }
            }
            match input_rx.recv_timeout(period) {
                Ok(InputEvent::Motion(frame)) => {
                    self.handle_frame(&frame);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(tx) = &display_tx {
                if last_render.elapsed() >= period {
                    last_render = Instant::now();
                    if let Some(frame) = self.render_frame() {
                        let _ = tx.send(frame);
                        rendered += 1;
                    }
                }
            }
        }

        self.stop();
        info!(
            "Graph controller shutting down after {} frames, {} renders",
            self.frames_accepted, rendered
        );
    }
}
