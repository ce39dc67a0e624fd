//! Blip the simulated engine's throttle and watch the tachometer chase it.
//!
//! The window also responds to the mouse: hold the left button to rev.

use cockpit::{Cluster, ClusterCommand, ClusterConfig, Engine, EngineConfig};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<(), cockpit::ClusterError> {
    let config = ClusterConfig::builder().title("Rev demo".to_string()).build();
    let cluster = Cluster::new(config);

    let (sender, receiver) = mpsc::channel();

    // A second engine runs in this thread and feeds the cluster over the
    // channel, the same path real telemetry takes.
    thread::spawn(move || {
        let mut engine = Engine::new(EngineConfig::default());
        let mut last = Instant::now();
        let started = Instant::now();
        loop {
            thread::sleep(Duration::from_millis(16));
            let now = Instant::now();
            engine.tick(now.duration_since(last).as_secs_f64());
            last = now;

            // Two seconds on the throttle, two seconds off.
            if started.elapsed().as_secs() % 4 < 2 {
                engine.start_revving();
            } else {
                engine.stop_revving();
            }

            if sender.send(ClusterCommand::Rpm(engine.rpm())).is_err() {
                break;
            }
        }
    });

    println!("Tachometer follows a simulated engine blipping its throttle.");
    println!("Hold the left mouse button to rev the cluster's own engine.");
    cluster.run(receiver)
}
