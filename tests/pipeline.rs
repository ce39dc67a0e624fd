//! End-to-end flow without a window: JSON telemetry in, needle angles out.

use std::time::Duration;

use cockpit::{Cluster, ClusterCommand, ClusterConfig, Telemetry};

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn telemetry_line_moves_all_three_needles() {
    let mut cluster = Cluster::new(ClusterConfig::default());
    let sample = Telemetry::parse(
        r#"{"gear":"4","electrics":{"wheelspeed":30.0,"rpmTacho":5200.0,"oil":0.8}}"#,
    )
    .unwrap();
    cluster.apply(ClusterCommand::Telemetry(sample));

    for _ in 0..400 {
        cluster.tick(FRAME);
    }

    // wheelspeed 30 m/s -> 69 display units
    assert!((cluster.speedometer().displayed() - 69.0).abs() < 1e-9);
    assert_eq!(cluster.tachometer().displayed(), 5200.0);
    // round(0.8 * 130) = 104 C -> 219.2 F
    assert!((cluster.temperature().displayed() - 219.2).abs() < 1e-9);
    assert_eq!(cluster.gear(), Some("4"));

    // Needle angles come straight from the gauge mapping.
    let speed = cluster.speedometer();
    let expected = speed.config.value_to_angle(speed.displayed());
    assert!((speed.needle_angle() - expected).abs() < 1e-9);
}

#[test]
fn malformed_telemetry_leaves_prior_targets_in_place() {
    let mut cluster = Cluster::new(ClusterConfig::default());
    cluster.apply(ClusterCommand::Speed(120.0));

    // A later sample without a wheelspeed must not disturb the speedometer.
    let no_speed = Telemetry::parse(r#"{"electrics":{"oil":0.1}}"#).unwrap();
    cluster.apply(ClusterCommand::Telemetry(no_speed));

    for _ in 0..400 {
        cluster.tick(FRAME);
    }
    assert_eq!(cluster.speedometer().displayed(), 120.0);
}

#[test]
fn speedometer_ticks_are_nice_and_ascending() {
    let cluster = Cluster::new(ClusterConfig::default());
    let ticks = &cluster.speedometer().ticks;

    assert!(!ticks.major.is_empty());
    let increment = ticks.major[1].value - ticks.major[0].value;
    for pair in ticks.major.windows(2) {
        assert!(pair[1].value > pair[0].value);
        assert!(((pair[1].value - pair[0].value) - increment).abs() < 1e-9);
        assert!(pair[1].angle > pair[0].angle);
    }
    // Labels land on round multiples of the increment.
    for tick in &ticks.major {
        let steps = tick.value / increment;
        assert!((steps - steps.round()).abs() < 1e-9, "{} off-grid", tick.value);
    }
}
