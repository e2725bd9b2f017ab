/// Risk score calculation.
///
/// A deliberately coarse threshold model, not a continuous function: low
/// rainfall and low water level contribute independent, additive penalties.
/// The output is always one of {0, 40, 60, 100}. Any float input is
/// accepted — negative readings simply fall below threshold like any other
/// low value; the model clamps, it never rejects.

/// Rainfall below this (mm) indicates drought stress on the source.
pub const RAINFALL_DEFICIT_MM: f64 = 50.0;

/// Water level below this (m) indicates depletion.
pub const LOW_WATER_LEVEL_M: f64 = 20.0;

const RAINFALL_PENALTY: i32 = 40;
const WATER_LEVEL_PENALTY: i32 = 60;

/// Compute the risk score for a pair of readings. Pure, no I/O.
pub fn calculate_risk(rainfall: f64, water_level: f64) -> i32 {
    let mut risk = 0;

    if rainfall < RAINFALL_DEFICIT_MM {
        risk += RAINFALL_PENALTY;
    }
    if water_level < LOW_WATER_LEVEL_M {
        risk += WATER_LEVEL_PENALTY;
    }

    risk.min(100)
}
