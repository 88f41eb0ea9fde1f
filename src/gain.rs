//! Gain evaluation: is a recompressed candidate worth keeping?

/// Absolute saving above which a candidate is always kept (2 KB)
pub const ABSOLUTE_GAIN_THRESHOLD: i64 = 2048;
/// Relative saving above which a candidate is kept, given the byte floor
pub const RELATIVE_GAIN_THRESHOLD: f64 = 0.2;
/// Minimum saving for the relative rule to apply
pub const RELATIVE_GAIN_FLOOR: i64 = 100;

/// The gain is worth it when it's over 2KB, or over 20% as long as
/// it's more than 100 bytes.
pub fn gain_is_enough(old_size: u64, new_size: u64) -> bool {
    let gain = old_size as i64 - new_size as i64;
    if gain <= 0 {
        return false;
    }
    let ratio = gain as f64 / old_size as f64;
    gain > ABSOLUTE_GAIN_THRESHOLD || (ratio > RELATIVE_GAIN_THRESHOLD && gain > RELATIVE_GAIN_FLOOR)
}

/// Percentage saved going from `old_size` to `new_size`
pub fn reduction_percent(old_size: u64, new_size: u64) -> f64 {
    if old_size == 0 {
        0.0
    } else {
        ((old_size as f64 - new_size as f64) / old_size as f64) * 100.0
    }
}
