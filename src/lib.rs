//! Software-rendered vehicle instrument cluster.
//!
//! The core is a gauge engine: nice-number tick generation, value/angle
//! mapping over a circular sweep, exponential needle smoothing, and an
//! engine-RPM simulation with asymmetric accel/decel dynamics and idle
//! jitter. On top of it sits a small dashboard front end that renders a
//! speedometer, tachometer, and temperature gauge into a pixel buffer,
//! driven by JSON telemetry or by the simulation.
//!
//! ```no_run
//! use cockpit::{Cluster, ClusterCommand, ClusterConfig};
//! use std::sync::mpsc;
//!
//! let (sender, receiver) = mpsc::channel();
//! sender.send(ClusterCommand::Speed(88.0)).unwrap();
//! Cluster::new(ClusterConfig::default()).run(receiver).unwrap();
//! ```

pub mod animation;
pub mod cluster;
pub mod engine;
pub mod gauge;
pub mod render;
pub mod telemetry;

pub use animation::{AnimatedValue, LoopingValue};
pub use cluster::{Cluster, ClusterCommand, ClusterConfig, Gauge};
pub use engine::{Engine, EngineConfig};
pub use gauge::{GaugeConfig, TickMark, Ticks};
pub use render::Color;
pub use telemetry::Telemetry;

/// Errors from the windowing and rendering front end. The gauge math
/// itself is total and has no error paths.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window error: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("could not parse font {0}")]
    Font(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
