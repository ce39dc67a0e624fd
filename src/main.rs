use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cockpit::{Cluster, ClusterCommand, ClusterConfig, LoopingValue, Telemetry};

fn main() -> Result<(), cockpit::ClusterError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse --title, --font and --demo from the command line.
    let mut title = "Cockpit".to_string();
    let mut font_path: Option<PathBuf> = None;
    let mut demo = false;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => {
                if let Some(t) = args.next() {
                    title = t;
                }
            }
            "--font" => {
                font_path = args.next().map(PathBuf::from);
            }
            "--demo" => demo = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }

    let config = ClusterConfig::builder()
        .title(title)
        .maybe_font_path(font_path)
        .build();
    let cluster = Cluster::new(config);

    let (sender, receiver) = mpsc::channel();

    if demo {
        // Sawtooth sweep on the speedometer instead of live data.
        info!("running in demo mode");
        let demo_sender = sender.clone();
        thread::spawn(move || {
            let mut sweep = LoopingValue::new(0.0, 160.0, Duration::from_secs(8), 1.0);
            let mut last = Instant::now();
            loop {
                thread::sleep(Duration::from_millis(16));
                let now = Instant::now();
                sweep.tick(now.duration_since(last));
                last = now;
                if demo_sender
                    .send(ClusterCommand::Speed(sweep.value()))
                    .is_err()
                {
                    break;
                }
            }
        });
    }

    // Telemetry arrives as one JSON object per stdin line. Lines that do
    // not parse are logged and skipped; the gauges keep their last targets.
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match Telemetry::parse(&line) {
                Ok(sample) => {
                    if sender.send(ClusterCommand::Telemetry(sample)).is_err() {
                        break;
                    }
                }
                Err(err) => debug!(%err, "dropping malformed telemetry line"),
            }
        }
    });

    cluster.run(receiver)
}
