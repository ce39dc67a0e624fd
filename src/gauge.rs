//! Dial geometry: value/angle mapping and tick generation.
//!
//! Angles are in degrees with 0 at the top of the dial and clockwise
//! positive, so a typical speedometer sweep runs from -120 to +90.

use bon::Builder;

/// Nice increments for tick labels, normalized to [1, 10).
/// Nearest candidate wins; the earlier entry wins an exact tie.
const NICE_INCREMENTS: [f64; 8] = [1.0, 2.0, 2.5, 5.0, 10.0, 100.0, 500.0, 1000.0];

/// A single tick mark: where it sits on the dial and what it labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub angle: f64,
    pub value: f64,
}

/// Generated tick marks, ascending by value. Majors get labels,
/// minors are the short unlabeled marks between them.
#[derive(Debug, Clone, Default)]
pub struct Ticks {
    pub major: Vec<TickMark>,
    pub minor: Vec<TickMark>,
}

impl Ticks {
    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty()
    }
}

/// Immutable per-gauge geometry: a value range mapped onto an angular sweep.
#[derive(Debug, Clone, Copy, Builder)]
pub struct GaugeConfig {
    pub min_value: f64,
    pub max_value: f64,
    #[builder(default = -120.0)]
    pub start_angle: f64,
    #[builder(default = 120.0)]
    pub end_angle: f64,
}

impl GaugeConfig {
    /// Map a value to its needle angle. Out-of-range values are clamped,
    /// never rejected; a degenerate range maps everything to the start of
    /// the sweep.
    pub fn value_to_angle(&self, value: f64) -> f64 {
        let span = self.max_value - self.min_value;
        if span <= 0.0 {
            return self.start_angle;
        }
        let bounded = value.clamp(self.min_value, self.max_value);
        let t = (bounded - self.min_value) / span;
        self.start_angle + t * (self.end_angle - self.start_angle)
    }

    /// Inverse of [`value_to_angle`](Self::value_to_angle): angles outside
    /// the sweep clamp to the nearer end of the value range.
    pub fn angle_to_value(&self, angle: f64) -> f64 {
        let sweep = self.end_angle - self.start_angle;
        if sweep == 0.0 {
            return self.min_value;
        }
        let t = ((angle - self.start_angle) / sweep).clamp(0.0, 1.0);
        self.min_value + t * (self.max_value - self.min_value)
    }

    /// Generate major and minor tick marks.
    ///
    /// `major_tick_count` is advisory: it shapes the target density, but the
    /// increment is snapped to a nice number and the actual count follows
    /// from how many multiples of it land inside the range. Labels come out
    /// as 0, 20, 40... rather than 0, 17, 34... for arbitrary ranges.
    /// Degenerate inputs produce an empty tick set.
    pub fn generate_ticks(&self, major_tick_count: usize, minor_ticks_per_major: usize) -> Ticks {
        let mut ticks = Ticks::default();
        let range = self.max_value - self.min_value;
        if major_tick_count < 2 || range <= 0.0 {
            return ticks;
        }

        let increment = nice_increment(range, major_tick_count);
        let start_val = (self.min_value / increment).ceil() * increment;
        let end_val = (self.max_value / increment).floor() * increment;
        if start_val > end_val {
            // Increment rounded past the whole range; callers tolerate zero ticks.
            return ticks;
        }
        let major_count = ((end_val - start_val) / increment).floor() as usize + 1;

        for i in 0..major_count {
            let value = start_val + i as f64 * increment;
            ticks.major.push(TickMark {
                angle: self.value_to_angle(value),
                value,
            });

            // Minor ticks fill the gap up to the next major, not past the last one.
            if i + 1 < major_count {
                let minor_increment = increment / (minor_ticks_per_major as f64 + 1.0);
                for j in 1..=minor_ticks_per_major {
                    let minor_value = value + j as f64 * minor_increment;
                    ticks.minor.push(TickMark {
                        angle: self.value_to_angle(minor_value),
                        value: minor_value,
                    });
                }
            }
        }
        ticks
    }
}

/// Snap the rough increment for a range/count pair to a nice number.
fn nice_increment(range: f64, target_tick_count: usize) -> f64 {
    let rough = range / (target_tick_count as f64 - 1.0);
    let magnitude = rough.log10().floor();
    let normalized = rough / 10f64.powf(magnitude);
    let nice = NICE_INCREMENTS
        .iter()
        .copied()
        .fold(NICE_INCREMENTS[0], |prev, curr| {
            if (curr - normalized).abs() < (prev - normalized).abs() {
                curr
            } else {
                prev
            }
        });
    nice * 10f64.powf(magnitude)
}
