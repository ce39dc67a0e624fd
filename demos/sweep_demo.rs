//! Drive the speedometer with a looping sawtooth value.

use cockpit::{Cluster, ClusterCommand, ClusterConfig, LoopingValue};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<(), cockpit::ClusterError> {
    let config = ClusterConfig::builder()
        .title("Sweep demo".to_string())
        .build();
    let cluster = Cluster::new(config);

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut sweep = LoopingValue::new(0.0, 160.0, Duration::from_secs(6), 2.0);
        let mut last = Instant::now();
        loop {
            thread::sleep(Duration::from_millis(16));
            let now = Instant::now();
            sweep.tick(now.duration_since(last));
            last = now;
            if sender.send(ClusterCommand::Speed(sweep.value())).is_err() {
                break;
            }
        }
    });

    cluster.run(receiver)
}
