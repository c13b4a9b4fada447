//! Angle helpers shared by fitting and rotation sync.

/// Tolerance used when snapping an angle to a multiple of 90 degrees.
const QUARTER_TURN_EPS: f64 = 1e-9;

/// Reduces a rotation to `(-360, 360)` keeping the sign of the input.
///
/// This is the remainder used when combining north angles and offsets, so
/// `-3.18` stays `-3.18` and `395.0` becomes `35.0`.
pub fn wrap_rotation_deg(angle_deg: f64) -> f64 {
    let wrapped = angle_deg % 360.0;
    if wrapped == 0.0 {
        // Collapse -0.0 so comparisons against 0.0 behave.
        0.0
    } else {
        wrapped
    }
}

/// Returns the number of clockwise quarter turns (0-3) if `angle_deg` is a
/// multiple of 90 degrees.
pub(crate) fn quarter_turns(angle_deg: f64) -> Option<u8> {
    let quarters = angle_deg / 90.0;
    let rounded = quarters.round();
    if (quarters - rounded).abs() < QUARTER_TURN_EPS {
        Some(rounded.rem_euclid(4.0) as u8)
    } else {
        None
    }
}

/// Computes absolute sine and cosine for an angle in degrees.
///
/// Exact multiples of 90 degrees return exact zeros and ones.
pub(crate) fn abs_sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    match quarter_turns(angle_deg) {
        Some(0 | 2) => (0.0, 1.0),
        Some(_) => (1.0, 0.0),
        None => {
            let (sin, cos) = angle_deg.to_radians().sin_cos();
            (sin.abs(), cos.abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{abs_sin_cos_deg, quarter_turns, wrap_rotation_deg};

    #[test]
    fn wrap_rotation_keeps_sign() {
        assert!((wrap_rotation_deg(-3.18) + 3.18).abs() < 1e-12);
        assert!((wrap_rotation_deg(395.0) - 35.0).abs() < 1e-12);
        assert!((wrap_rotation_deg(-370.0) + 10.0).abs() < 1e-12);
        assert_eq!(wrap_rotation_deg(-360.0), 0.0);
        assert!(wrap_rotation_deg(-360.0).is_sign_positive());
    }

    #[test]
    fn quarter_turns_detects_multiples() {
        assert_eq!(quarter_turns(0.0), Some(0));
        assert_eq!(quarter_turns(-90.0), Some(3));
        assert_eq!(quarter_turns(450.0), Some(1));
        assert_eq!(quarter_turns(180.0 + 1e-12), Some(2));
        assert_eq!(quarter_turns(45.0), None);
    }

    #[test]
    fn abs_sin_cos_is_exact_on_axes() {
        assert_eq!(abs_sin_cos_deg(90.0), (1.0, 0.0));
        assert_eq!(abs_sin_cos_deg(-180.0), (0.0, 1.0));
        let (s, c) = abs_sin_cos_deg(-30.0);
        assert!((s - 0.5).abs() < 1e-12);
        assert!((c - 3f64.sqrt() / 2.0).abs() < 1e-12);
    }
}
