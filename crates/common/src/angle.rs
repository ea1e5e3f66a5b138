//! Heading arithmetic in degrees.

/// Signed shortest-path error from `current` to `desired`, in `(-180, 180]`.
///
/// A difference of exactly half a turn is reported as `+180`.
pub fn compute_error(current: f64, desired: f64) -> f64 {
    let diff = (desired - current).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Fold a heading into `[0, 360)`.
pub fn normalize_heading(heading: f64) -> f64 {
    let h = heading.rem_euclid(360.0);
    // rem_euclid can round up to 360.0 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}
