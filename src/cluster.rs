//! The dashboard: three gauges, an engine simulation fallback, and the
//! frame-driven window loop.
//!
//! All state transitions happen on the redraw callback: compute the
//! wall-clock delta since the previous frame, drain the command channel,
//! apply targets, then tick every animated value and the engine exactly
//! once before rendering. Ticks are strictly sequential; closing the
//! window tears the loop down and nothing updates afterwards.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use tracing::{debug, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::animation::AnimatedValue;
use crate::engine::{Engine, EngineConfig};
use crate::gauge::{GaugeConfig, Ticks};
use crate::render::{self, Canvas, Color, DialLayout, DialStyle};
use crate::telemetry::Telemetry;
use crate::ClusterError;

/// Commands accepted by the cluster's channel, the way external telemetry
/// and demo drivers feed the gauges.
#[derive(Debug, Clone)]
pub enum ClusterCommand {
    /// A full telemetry sample; missing fields leave targets unchanged.
    Telemetry(Telemetry),
    /// Speedometer target in display units.
    Speed(f64),
    /// Tachometer target in RPM.
    Rpm(f64),
    /// Temperature gauge target in Fahrenheit.
    OilTempFahrenheit(f64),
}

/// One gauge: immutable geometry, cached ticks, and the animated needle.
/// Ticks are generated once at construction and stay stable for the
/// gauge's lifetime.
#[derive(Debug, Clone)]
pub struct Gauge {
    pub config: GaugeConfig,
    pub ticks: Ticks,
    needle: AnimatedValue,
}

impl Gauge {
    pub fn new(
        config: GaugeConfig,
        major_tick_count: usize,
        minor_ticks_per_major: usize,
        smoothing: f64,
    ) -> Self {
        let ticks = config.generate_ticks(major_tick_count, minor_ticks_per_major);
        Self {
            config,
            ticks,
            needle: AnimatedValue::new(config.min_value).with_smoothing(smoothing),
        }
    }

    pub fn set_target(&mut self, value: f64) {
        self.needle.set_target(value);
    }

    pub fn tick(&mut self) {
        self.needle.tick();
    }

    pub fn displayed(&self) -> f64 {
        self.needle.displayed()
    }

    /// Needle angle in dial degrees, recomputed from the displayed value.
    pub fn needle_angle(&self) -> f64 {
        self.config.value_to_angle(self.needle.displayed())
    }
}

/// Cluster-wide configuration.
#[derive(Debug, Clone, Builder)]
pub struct ClusterConfig {
    #[builder(default = "Cockpit".to_string())]
    pub title: String,
    #[builder(default = 960)]
    pub window_width: usize,
    #[builder(default = 420)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    /// Label font; tick labels and readouts are skipped when absent.
    pub font_path: Option<PathBuf>,
    #[builder(default = 0.1)]
    pub needle_smoothing: f64,
    #[builder(default = 160.0)]
    pub speed_max: f64,
    #[builder(default = 320.0)]
    pub temp_max: f64,
    #[builder(default)]
    pub engine: EngineConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Speedometer, tachometer, and temperature gauge plus the engine
/// simulation that drives the tachometer until real RPM data shows up.
pub struct Cluster {
    config: ClusterConfig,
    speed: Gauge,
    tach: Gauge,
    temp: Gauge,
    engine: Engine<ThreadRng>,
    gear: Option<String>,
    /// Set once any external RPM arrives; the simulation stops steering
    /// the tachometer from then on.
    has_rpm_source: bool,
}

impl Cluster {
    pub fn new(config: ClusterConfig) -> Self {
        let smoothing = config.needle_smoothing;
        let speed = Gauge::new(
            GaugeConfig::builder()
                .min_value(0.0)
                .max_value(config.speed_max)
                .start_angle(-120.0)
                .end_angle(90.0)
                .build(),
            15,
            4,
            smoothing,
        );
        let tach = Gauge::new(
            GaugeConfig::builder()
                .min_value(0.0)
                .max_value(config.engine.max_rpm)
                .start_angle(-120.0)
                .end_angle(60.0)
                .build(),
            8,
            4,
            smoothing,
        );
        let temp = Gauge::new(
            GaugeConfig::builder()
                .min_value(0.0)
                .max_value(config.temp_max)
                .start_angle(-90.0)
                .end_angle(90.0)
                .build(),
            4,
            4,
            smoothing,
        );
        let engine = Engine::new(config.engine);
        Self {
            config,
            speed,
            tach,
            temp,
            engine,
            gear: None,
            has_rpm_source: false,
        }
    }

    pub fn speedometer(&self) -> &Gauge {
        &self.speed
    }

    pub fn tachometer(&self) -> &Gauge {
        &self.tach
    }

    pub fn temperature(&self) -> &Gauge {
        &self.temp
    }

    pub fn engine(&self) -> &Engine<ThreadRng> {
        &self.engine
    }

    pub fn gear(&self) -> Option<&str> {
        self.gear.as_deref()
    }

    pub fn start_revving(&mut self) {
        self.engine.start_revving();
    }

    pub fn stop_revving(&mut self) {
        self.engine.stop_revving();
    }

    /// Route a command to the gauges it targets.
    pub fn apply(&mut self, command: ClusterCommand) {
        match command {
            ClusterCommand::Telemetry(sample) => {
                if let Some(speed) = sample.speed_display() {
                    self.speed.set_target(speed);
                }
                if let Some(rpm) = sample.rpm_display() {
                    self.tach.set_target(rpm);
                    self.has_rpm_source = true;
                }
                if let Some(temp) = sample.oil_temp_fahrenheit() {
                    self.temp.set_target(temp);
                }
                if sample.gear.is_some() {
                    self.gear = sample.gear;
                }
            }
            ClusterCommand::Speed(value) => self.speed.set_target(value),
            ClusterCommand::Rpm(value) => {
                self.tach.set_target(value);
                self.has_rpm_source = true;
            }
            ClusterCommand::OilTempFahrenheit(value) => self.temp.set_target(value),
        }
    }

    /// One frame's worth of state updates.
    pub fn tick(&mut self, dt: Duration) {
        self.engine.tick(dt.as_secs_f64());
        if !self.has_rpm_source {
            self.tach.set_target(self.engine.rpm());
        }
        self.speed.tick();
        self.tach.tick();
        self.temp.tick();
    }

    /// Open the window and run the frame loop until it is closed,
    /// draining `receiver` once per frame.
    pub fn run(mut self, receiver: Receiver<ClusterCommand>) -> Result<(), ClusterError> {
        let font = match &self.config.font_path {
            Some(path) => Some(render::load_font(path)?),
            None => None,
        };

        let logical_width = self.config.window_width;
        let logical_height = self.config.window_height;
        info!(
            width = logical_width,
            height = logical_height,
            title = %self.config.title,
            "opening cluster window"
        );

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                logical_width as f64,
                logical_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();
        let mut last_update = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        // Pointer held on the dash acts as the throttle.
                        if button == MouseButton::Left {
                            match state {
                                ElementState::Pressed => self.engine.start_revving(),
                                ElementState::Released => self.engine.stop_revving(),
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = now.duration_since(last_update);
                        last_update = now;

                        let mut received = 0usize;
                        while let Ok(command) = receiver.try_recv() {
                            self.apply(command);
                            received += 1;
                        }
                        if received > 0 {
                            debug!(count = received, "applied telemetry commands");
                        }
                        self.tick(dt);

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        self.render(&mut canvas, fb_width, fb_height, font.as_ref());
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }

    fn render(
        &self,
        canvas: &mut Canvas,
        width: usize,
        height: usize,
        font: Option<&rusttype::Font>,
    ) {
        canvas.clear(Color::WHITE);

        let (speed_layout, tach_layout, temp_layout) = layouts(width, height);
        let speed_style = DialStyle::default();
        let small_style = scaled(&speed_style, 0.7);

        // Speedometer, center.
        render::draw_dial(
            canvas,
            speed_layout,
            (self.speed.config.start_angle, self.speed.config.end_angle),
            &self.speed.ticks,
            &speed_style,
            font,
            Color::BLACK,
        );
        render::draw_needle(
            canvas,
            speed_layout,
            self.speed.needle_angle(),
            &speed_style,
            Color::BLACK,
        );
        if let Some(font) = font {
            let readout = format!("{:.0}", self.speed.displayed());
            render::draw_text(
                canvas,
                speed_layout.cx,
                speed_layout.cy + speed_layout.radius / 2,
                &readout,
                font,
                speed_style.label_font_size * 1.4,
                Color::BLACK,
            );
        }

        // Tachometer, right, with the red-line band and a needle that
        // turns red inside it.
        let red_line = self.engine.config().red_line;
        render::draw_band(
            canvas,
            tach_layout,
            self.tach.config.value_to_angle(red_line),
            self.tach.config.end_angle,
            &small_style,
            Color::RED,
        );
        render::draw_dial(
            canvas,
            tach_layout,
            (self.tach.config.start_angle, self.tach.config.end_angle),
            &self.tach.ticks,
            &small_style,
            font,
            Color::BLACK,
        );
        let tach_color = if self.tach.displayed() >= red_line {
            Color::RED
        } else {
            Color::BLACK
        };
        render::draw_needle(
            canvas,
            tach_layout,
            self.tach.needle_angle(),
            &small_style,
            tach_color,
        );
        if let (Some(font), Some(gear)) = (font, self.gear.as_deref()) {
            render::draw_text(
                canvas,
                tach_layout.cx,
                tach_layout.cy + tach_layout.radius / 2,
                gear,
                font,
                small_style.label_font_size,
                Color::BLACK,
            );
        }

        // Temperature, left.
        render::draw_dial(
            canvas,
            temp_layout,
            (self.temp.config.start_angle, self.temp.config.end_angle),
            &self.temp.ticks,
            &small_style,
            font,
            Color::BLACK,
        );
        render::draw_needle(
            canvas,
            temp_layout,
            self.temp.needle_angle(),
            &small_style,
            Color::BLACK,
        );
    }
}

/// Dial placement: big speedometer in the middle, tachometer right,
/// temperature left.
fn layouts(width: usize, height: usize) -> (DialLayout, DialLayout, DialLayout) {
    let cy = height as i32 / 2;
    let speed_r = (height as i32 / 2 - 40).max(20);
    let small_r = (speed_r * 2 / 3).max(10);
    let speed = DialLayout {
        cx: width as i32 / 2,
        cy,
        radius: speed_r,
    };
    let tach = DialLayout {
        cx: speed.cx + speed_r + small_r + 20,
        cy,
        radius: small_r,
    };
    let temp = DialLayout {
        cx: speed.cx - speed_r - small_r - 20,
        cy,
        radius: small_r,
    };
    (speed, tach, temp)
}

fn scaled(base: &DialStyle, factor: f64) -> DialStyle {
    DialStyle {
        arc_thickness: ((base.arc_thickness as f64 * factor) as i32).max(1),
        major_tick_length: ((base.major_tick_length as f64 * factor) as i32).max(2),
        minor_tick_length: ((base.minor_tick_length as f64 * factor) as i32).max(1),
        needle_back_length: base.needle_back_length * factor,
        label_font_size: (base.label_font_size * factor as f32).max(8.0),
        ticks_to_labels_distance: base.ticks_to_labels_distance * factor,
        band_width: ((base.band_width as f64 * factor) as i32).max(2),
        ..base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_sets_targets_without_moving_needles() {
        let mut cluster = Cluster::new(ClusterConfig::default());
        let sample = Telemetry::parse(
            r#"{"gear":"2","electrics":{"wheelspeed":20.0,"rpmTacho":3000.0,"oil":0.5}}"#,
        )
        .unwrap();
        cluster.apply(ClusterCommand::Telemetry(sample));

        assert_eq!(cluster.speedometer().displayed(), 0.0);
        assert_eq!(cluster.gear(), Some("2"));

        cluster.tick(Duration::from_millis(16));
        assert!(cluster.speedometer().displayed() > 0.0);
        assert!(cluster.speedometer().displayed() < 46.0);
    }

    #[test]
    fn partial_telemetry_leaves_other_targets_alone() {
        let mut cluster = Cluster::new(ClusterConfig::default());
        cluster.apply(ClusterCommand::Speed(100.0));
        let rpm_only = Telemetry::parse(r#"{"electrics":{"rpmTacho":2000.0}}"#).unwrap();
        cluster.apply(ClusterCommand::Telemetry(rpm_only));

        for _ in 0..300 {
            cluster.tick(Duration::from_millis(16));
        }
        assert_eq!(cluster.speedometer().displayed(), 100.0);
        assert_eq!(cluster.tachometer().displayed(), 2000.0);
    }

    #[test]
    fn engine_drives_the_tachometer_until_rpm_arrives() {
        let mut cluster = Cluster::new(ClusterConfig::default());
        cluster.start_revving();
        for _ in 0..120 {
            cluster.tick(Duration::from_millis(16));
        }
        assert!(cluster.tachometer().displayed() > 1000.0);

        cluster.apply(ClusterCommand::Rpm(1500.0));
        for _ in 0..300 {
            cluster.tick(Duration::from_millis(16));
        }
        assert_eq!(cluster.tachometer().displayed(), 1500.0);
    }

    #[test]
    fn gauges_use_the_documented_sweeps() {
        let cluster = Cluster::new(ClusterConfig::default());
        let speed = cluster.speedometer().config;
        assert_eq!((speed.start_angle, speed.end_angle), (-120.0, 90.0));
        assert_eq!(speed.max_value, 160.0);
        // Midpoint scenario from the speedometer sweep.
        assert!((speed.value_to_angle(80.0) - (-15.0)).abs() < 1e-9);

        assert!(!cluster.speedometer().ticks.major.is_empty());
        assert!(!cluster.tachometer().ticks.major.is_empty());
        assert!(!cluster.temperature().ticks.major.is_empty());
    }

    #[test]
    fn layouts_keep_dials_inside_the_window() {
        let (speed, tach, temp) = layouts(960, 420);
        assert!(tach.cx + tach.radius <= 960);
        assert!(temp.cx - temp.radius >= 0);
        assert!(speed.cy + speed.radius <= 420);
    }
}
