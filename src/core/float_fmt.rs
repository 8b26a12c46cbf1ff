//! Float formatting helpers that are safe on wasm.
//!
//! Rust's core float-to-decimal formatting has had wasm-facing panics in some
//! toolchain/browser combinations (see `dragon.rs` panics). To avoid that class
//! of issues, these helpers do **not** use `format!` on floats.
//!
//! They:
//! - Handle `NaN`/`±Inf` explicitly.
//! - For finite values, scale + round into an `i64`, then format integers.
//!
//! The exponential form mirrors JavaScript's `Number.prototype.toExponential`
//! (`1.2346e-3`, `5.0000e+0`) so values read the same as the service's other clients.

fn non_finite(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_sign_positive() {
        "Inf".to_string()
    } else {
        "-Inf".to_string()
    }
}

/// Fixed-point with exactly `decimals` fractional digits.
pub fn fmt_f64_fixed(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return non_finite(v);
    }

    // Clamp decimals to something reasonable to avoid huge powers.
    let decimals = decimals.min(9);
    let scale_i64 = 10_i64.pow(decimals as u32);
    let scale_f = scale_i64 as f64;

    let scaled = (v * scale_f).round();
    // Keep within i64 range. If it doesn't fit, degrade gracefully.
    if !scaled.is_finite() || scaled.abs() >= (i64::MAX as f64) {
        return fmt_f64_exp(v, decimals);
    }

    let scaled_i = scaled as i64;
    let negative = scaled_i < 0;
    let abs_i = scaled_i.abs();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    push_split(&mut out, abs_i, scale_i64, decimals);
    out
}

/// Exponential notation with `decimals` fractional mantissa digits.
pub fn fmt_f64_exp(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return non_finite(v);
    }

    let decimals = decimals.min(9);
    let scale_i64 = 10_i64.pow(decimals as u32);
    let scale_f = scale_i64 as f64;

    let negative = v < 0.0;
    let abs = v.abs();

    let (mut exp, mut scaled) = if abs == 0.0 {
        (0_i32, 0_i64)
    } else {
        let mut exp = abs.log10().floor() as i32;
        let mut mantissa = scale_down(abs, exp);
        // log10 can land one off near exact powers of ten.
        if mantissa >= 10.0 {
            exp += 1;
            mantissa = scale_down(abs, exp);
        } else if mantissa < 1.0 {
            exp -= 1;
            mantissa = scale_down(abs, exp);
        }
        (exp, (mantissa * scale_f).round() as i64)
    };

    // Rounding can carry into a new digit (9.99996 -> 10.0000).
    if scaled >= 10 * scale_i64 {
        scaled /= 10;
        exp += 1;
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    push_split(&mut out, scaled, scale_i64, decimals);
    out.push('e');
    if exp < 0 {
        out.push('-');
        exp = -exp;
    } else {
        out.push('+');
    }
    out.push_str(&exp.to_string());
    out
}

/// Shortest fixed-point rendering up to 6 fractional digits (`0`, `0.5`, `-5.12`).
pub fn fmt_f64_plain(v: f64) -> String {
    let s = fmt_f64_fixed(v, 6);
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn scale_down(abs: f64, exp: i32) -> f64 {
    // 10^exp underflows for subnormal inputs; split the scaling in two steps.
    if exp < -300 {
        (abs * 1e300) / 10_f64.powi(exp + 300)
    } else {
        abs / 10_f64.powi(exp)
    }
}

fn push_split(out: &mut String, abs_scaled: i64, scale: i64, decimals: usize) {
    let int_part = abs_scaled / scale;
    let frac_part = abs_scaled % scale;
    out.push_str(&int_part.to_string());

    if decimals > 0 {
        out.push('.');
        let frac_str = frac_part.to_string();
        // Left-pad with zeros.
        for _ in 0..decimals.saturating_sub(frac_str.len()) {
            out.push('0');
        }
        out.push_str(&frac_str);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pads_and_rounds() {
        assert_eq!(fmt_f64_fixed(1.23456, 4), "1.2346");
        assert_eq!(fmt_f64_fixed(0.5, 3), "0.500");
        assert_eq!(fmt_f64_fixed(-2.0, 2), "-2.00");
        assert_eq!(fmt_f64_fixed(0.00004, 4), "0.0000");
        assert_eq!(fmt_f64_fixed(12.0, 0), "12");
    }

    #[test]
    fn exponential_matches_javascript_style() {
        assert_eq!(fmt_f64_exp(0.0012345678, 4), "1.2346e-3");
        assert_eq!(fmt_f64_exp(5.0, 4), "5.0000e+0");
        assert_eq!(fmt_f64_exp(0.0, 4), "0.0000e+0");
        assert_eq!(fmt_f64_exp(-1234.5, 2), "-1.23e+3");
        assert_eq!(fmt_f64_exp(1000.0, 4), "1.0000e+3");
        assert_eq!(fmt_f64_exp(1e-12, 2), "1.00e-12");
    }

    #[test]
    fn exponential_carries_rounding_into_the_exponent() {
        assert_eq!(fmt_f64_exp(9.99996, 4), "1.0000e+1");
        assert_eq!(fmt_f64_exp(0.099999999, 3), "1.000e-1");
    }

    #[test]
    fn non_finite_values_are_spelled_out() {
        assert_eq!(fmt_f64_fixed(f64::NAN, 3), "NaN");
        assert_eq!(fmt_f64_exp(f64::INFINITY, 4), "Inf");
        assert_eq!(fmt_f64_exp(f64::NEG_INFINITY, 4), "-Inf");
    }

    #[test]
    fn huge_fixed_values_fall_back_to_exponential() {
        assert_eq!(fmt_f64_fixed(1e300, 4), "1.0000e+300");
    }

    #[test]
    fn plain_trims_trailing_zeros() {
        assert_eq!(fmt_f64_plain(0.0), "0");
        assert_eq!(fmt_f64_plain(1.0), "1");
        assert_eq!(fmt_f64_plain(0.5), "0.5");
        assert_eq!(fmt_f64_plain(-5.12), "-5.12");
        assert_eq!(fmt_f64_plain(-0.0000001), "0");
    }
}
