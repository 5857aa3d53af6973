use motion_graph::console_display;
use motion_graph::coordinator::GraphController;
use motion_graph::simulator;
use motion_graph::style::GraphStyle;
use motion_graph::types::*;

use clap::{Parser, ValueEnum};
use crossbeam_channel::bounded;
use log::{info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Accelerometer,
    Gyro,
    DeviceMotion,
}

impl From<ModeArg> for GraphMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Accelerometer => GraphMode::Accelerometer,
            ModeArg::Gyro => GraphMode::Gyro,
            ModeArg::DeviceMotion => GraphMode::DeviceMotion,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphArg {
    Attitude,
    RotationRate,
    Gravity,
    UserAcceleration,
}

impl From<GraphArg> for MotionGraph {
    fn from(g: GraphArg) -> Self {
        match g {
            GraphArg::Attitude => MotionGraph::Attitude,
            GraphArg::RotationRate => MotionGraph::RotationRate,
            GraphArg::Gravity => MotionGraph::Gravity,
            GraphArg::UserAcceleration => MotionGraph::UserAcceleration,
        }
    }
}

#[derive(Parser)]
#[command(name = "motion-graph")]
#[command(about = "Live scrolling graphs of simulated motion sensor data")]
struct Cli {
    /// Sensor stream to graph
    #[arg(long, value_enum, default_value = "accelerometer")]
    mode: ModeArg,

    /// Device-motion graph to display (all four are fed)
    #[arg(long, value_enum, default_value = "attitude")]
    graph: GraphArg,

    /// Update-interval slider: 10 ms + 5 ms per step
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=100))]
    slider: u32,

    /// View width in display units (one unit per sample)
    #[arg(long, default_value_t = 320.0)]
    width: f32,

    /// Console display refresh rate (Hz)
    #[arg(long, default_value_t = 20)]
    display_hz: u32,

    /// Widest the console graph may be printed, in terminal columns
    #[arg(long, default_value_t = 160)]
    columns: usize,

    /// Graph style JSON (colors, scale, gridlines)
    #[arg(long)]
    style: Option<PathBuf>,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    seconds: u64,

    /// Run without the console display (logging only)
    #[arg(long)]
    no_console: bool,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let cli = Cli::parse();
    let clock = SessionClock::new();
    let mode = GraphMode::from(cli.mode);
    let interval = update_interval_for_slider(cli.slider);

    let style = match &cli.style {
        Some(path) => GraphStyle::load(path).unwrap_or_else(|| {
            warn!("Using default graph style");
            GraphStyle::default()
        }),
        None => GraphStyle::default(),
    };

    info!("═══════════════════════════════════════════════");
    info!("  MOTION GRAPH v{}", env!("CARGO_PKG_VERSION"));
    info!("  Mode: {}", mode.name());
    info!("  Interval: {} ms (slider {})", interval.as_millis(), cli.slider);
    info!("  View: {} units wide", cli.width);
    if !cli.no_console {
        info!("  UI: Console");
    }
    info!("═══════════════════════════════════════════════");

    // Channel: simulator → controller
    let (input_tx, input_rx) = bounded::<InputEvent>(4096);

    let mut handles = Vec::new();

    // ─── Console display ────────────────────────────────────────────
    let display_tx = if cli.no_console {
        None
    } else {
        let (tx, rx) = bounded::<DisplayFrame>(4);
        let columns = cli.columns;
        handles.push(thread::Builder::new().name("display".into()).spawn(move || {
            console_display::ConsoleDisplay::new(rx, columns).run();
        }).unwrap());
        Some(tx)
    };

    // ─── Graph controller ───────────────────────────────────────────
    let width = cli.width;
    let hz = cli.display_hz;
    let graph = MotionGraph::from(cli.graph);
    let limit = (cli.seconds > 0).then(|| Duration::from_secs(cli.seconds));
    handles.push(thread::Builder::new().name("controller".into()).spawn(move || {
        let mut controller = GraphController::new(mode, width, style);
        controller.select_graph(graph);
        controller.start(interval);
        controller.run(input_rx, display_tx, hz, limit);
    }).unwrap());

    // ─── Input source ───────────────────────────────────────────────
    info!("Starting simulator...");
    let sim_clock = clock.clone();
    handles.push(thread::Builder::new().name("simulator".into()).spawn(move || {
        simulator::Simulator::new(sim_clock, input_tx, interval).run();
    }).unwrap());

    info!("Running. Press Ctrl+C to stop.");
    for h in handles {
        let _ = h.join();
    }
}
