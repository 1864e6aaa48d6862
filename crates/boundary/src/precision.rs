//! Display precision and decimal rounding.
//!
//! Records are rounded half-up on the decimal representation of a value
//! (2.675 → 2.68), not on its binary expansion (where `2.675_f64` sits just
//! below the midpoint and `f64::round`-based schemes produce 2.67).

/// Decimal places for displayed lengths, areas and coordinates.
pub const DISPLAY_PRECISION: u32 = 2;
/// Decimal places for small error magnitudes and standard deviations.
pub const CALC_PRECISION: u32 = 4;

/// Values at or beyond this magnitude are returned unchanged by `round_half_up`.
const ROUND_LIMIT: f64 = 1e15;

/// Round `value` to `places` decimals, ties away from zero, on its shortest
/// decimal representation.
///
/// Non-finite values and magnitudes `>= 1e15` are returned unchanged.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    if !value.is_finite() || value.abs() >= ROUND_LIMIT {
        return value;
    }
    // `Display` for f64 prints the shortest string that round-trips, never in
    // exponent form.
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = match repr.split_once('.') {
        Some((i, f)) => (i, f),
        None => return value,
    };
    let places = places as usize;
    if frac_part.len() <= places {
        return value;
    }
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .map(|b| b - b'0')
        .collect();
    if frac_part.as_bytes()[places] >= b'5' {
        // Propagate the carry from the last kept digit.
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }
    let split = digits.len() - places;
    let int_digits: String = digits[..split].iter().map(|d| char::from(b'0' + d)).collect();
    let frac_digits: String = digits[split..].iter().map(|d| char::from(b'0' + d)).collect();
    let text = if frac_digits.is_empty() {
        int_digits
    } else {
        format!("{int_digits}.{frac_digits}")
    };
    let magnitude: f64 = text.parse().unwrap_or(value.abs());
    if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Round to `DISPLAY_PRECISION` decimals.
#[inline]
pub fn round_display(value: f64) -> f64 {
    round_half_up(value, DISPLAY_PRECISION)
}

/// `|a - b| <= tolerance`.
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
