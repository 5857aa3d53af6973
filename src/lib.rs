pub mod console_display;
pub mod coordinator;
pub mod graph_view;
pub mod history;
pub mod overlay;
pub mod raster;
pub mod segment;
pub mod simulator;
pub mod style;
pub mod surface;
pub mod types;
