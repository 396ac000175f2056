//! Rounded linear domain mapping
//!
//! The spectrum engine maps a frequency span onto a fixed bin grid and back.
//! Both directions round to the nearest unit instead of truncating; with
//! plain integer division the error accumulates toward the top of the span
//! and the last bin ends up off by a full step.

/// Map `value` from `[from_min, from_max]` onto `[to_min, to_max]`, rounded
///
/// The input is clamped into its domain first, so out-of-range values map
/// to the nearest edge. A degenerate input domain maps everything to
/// `to_min`.
#[must_use]
pub fn convert_domain(value: u32, from_min: u32, from_max: u32, to_min: u32, to_max: u32) -> u32 {
    if from_min >= from_max {
        return to_min;
    }

    let from_range = u64::from(from_max - from_min);
    let to_range = u64::from(to_max.saturating_sub(to_min));

    let value = value.clamp(from_min, from_max);

    let scaled = u64::from(value - from_min) * to_range;
    let mapped = (scaled + from_range / 2) / from_range + u64::from(to_min);

    // The rounded result cannot exceed to_max, but keep the cast honest.
    mapped.min(u64::from(to_max)) as u32
}

/// Round `value` to the nearest multiple of `step`
///
/// `step == 0` is treated as "no grid" and returns the value unchanged.
#[must_use]
pub const fn round_to_step(value: u32, step: u32) -> u32 {
    if step == 0 {
        return value;
    }
    let rem = value % step;
    if rem > step / 2 {
        value.saturating_add(step - rem)
    } else {
        value - rem
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn convert_domain_endpoints() {
        assert_eq!(convert_domain(100, 100, 200, 0, 127), 0);
        assert_eq!(convert_domain(200, 100, 200, 0, 127), 127);
    }

    #[test]
    fn convert_domain_rounds_midpoint_up() {
        // 150 maps to 63.5, which rounds to 64
        assert_eq!(convert_domain(150, 100, 200, 0, 127), 64);
    }

    #[test]
    fn convert_domain_clamps_input() {
        assert_eq!(convert_domain(0, 100, 200, 0, 127), 0);
        assert_eq!(convert_domain(999, 100, 200, 0, 127), 127);
    }

    #[test]
    fn convert_domain_degenerate_input_domain() {
        assert_eq!(convert_domain(150, 100, 100, 0, 127), 0);
    }

    #[test]
    fn convert_domain_wide_values_do_not_overflow() {
        // Full frequency domain scaled to full frequency domain
        let v = convert_domain(1_300_000_000, 500_000, 1_300_000_000, 500_000, 1_300_000_000);
        assert_eq!(v, 1_300_000_000);
    }

    #[test]
    fn round_to_step_nearest() {
        assert_eq!(round_to_step(145_012_000, 25_000), 145_000_000);
        assert_eq!(round_to_step(145_013_000, 25_000), 145_025_000);
        assert_eq!(round_to_step(145_025_000, 25_000), 145_025_000);
    }

    #[test]
    fn round_to_step_zero_step() {
        assert_eq!(round_to_step(42, 0), 42);
    }
}
