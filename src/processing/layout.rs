//! Sensing-element geometry and contact estimation
//!
//! The 12 pressure elements sit in four staggered rows of three on a
//! 12 × 6 unit surface:
//!
//! ```text
//!  y
//!  5.25 │      9       10       11
//!  3.75 │  6       7        8
//!  2.25 │      3        4        5
//!  0.75 │  0       1        2
//!       └──1───3───5───7───9───11──▶ x
//! ```

use crate::protocol::constants::PRESSURE_CHANNELS;
use serde::Serialize;

/// Element centres, indexed by pressure channel
pub const ELEMENT_POSITIONS: [(f64, f64); PRESSURE_CHANNELS] = [
    (1.0, 0.75),
    (5.0, 0.75),
    (9.0, 0.75),
    (3.0, 2.25),
    (7.0, 2.25),
    (11.0, 2.25),
    (1.0, 3.75),
    (5.0, 3.75),
    (9.0, 3.75),
    (3.0, 5.25),
    (7.0, 5.25),
    (11.0, 5.25),
];

/// Estimated point of contact on the sensor surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ContactPoint {
    pub x: f64,
    pub y: f64,
}

/// Total pressure and the pressure-weighted centroid of the elements
///
/// Below `noise_floor` total pressure the position is pinned to (0, 0) so
/// an unloaded sensor does not jitter.
pub fn estimate_contact(
    pressure: &[f64; PRESSURE_CHANNELS],
    noise_floor: f64,
) -> (ContactPoint, f64) {
    let total: f64 = pressure.iter().sum();
    if total < noise_floor {
        return (ContactPoint::default(), total);
    }

    let (sx, sy) = pressure
        .iter()
        .zip(ELEMENT_POSITIONS.iter())
        .fold((0.0, 0.0), |(sx, sy), (&p, &(x, y))| (sx + p * x, sy + p * y));

    (
        ContactPoint {
            x: sx / total,
            y: sy / total,
        },
        total,
    )
}
