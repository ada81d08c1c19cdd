//! Stand-in temperatures for when the weather source is unreachable.
//!
//! The series is seasonal (cold January, warm July) with a little noise, and
//! fully determined by `(location, year)` so repeated runs draw the same chart.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use ledgerlens_core::PeriodKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lowest value the series produces, °F.
pub const SYNTHETIC_MIN_F: f64 = 30.0;

/// Highest value the series produces, °F.
pub const SYNTHETIC_MAX_F: f64 = 90.0;

/// Builds the 12-month synthetic series for `location` and `year`.
pub fn synthetic_series(location: &str, year: i32) -> BTreeMap<PeriodKey, f64> {
    let mut rng = StdRng::seed_from_u64(seed(location, year));
    let mid = (SYNTHETIC_MIN_F + SYNTHETIC_MAX_F) / 2.0;
    let swing = (SYNTHETIC_MAX_F - SYNTHETIC_MIN_F) / 2.0 - 5.0;

    PeriodKey::ALL
        .iter()
        .map(|&period| {
            // peaks in July
            let phase = (f64::from(period.month()) - 7.0) / 12.0 * TAU;
            let noise: f64 = rng.gen_range(-3.0..=3.0);
            let value = (mid + swing * phase.cos() + noise).clamp(SYNTHETIC_MIN_F, SYNTHETIC_MAX_F);
            (period, (value * 10.0).round() / 10.0)
        })
        .collect()
}

/// FNV-1a over the normalized location and the year.
fn seed(location: &str, year: i32) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    location
        .trim()
        .to_lowercase()
        .bytes()
        .chain(year.to_le_bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
