//! Sample-level math: volume mapping and 16-bit conversion.
//!
//! All functions are allocation-free and suitable for `no_std`.

/// Volume scale value that maps to unity gain.
pub const NEUTRAL_VOLUME_SCALE: u8 = 5;

/// Highest meaningful value on the user volume scale.
pub const MAX_VOLUME_SCALE: u8 = 9;

/// Largest volume multiplier.
pub const MAX_VOLUME: f32 = 2.0;

/// Maps the 0-9 user volume scale onto a gain multiplier.
///
/// The scale is divided by 5 and clamped into `[0.0, 2.0]`, so 5 is unity,
/// 0 is silence and 9 is 1.8x. Inputs outside the scale are clamped rather
/// than rejected.
///
/// # Example
/// ```rust
/// use ampfront_core::volume_from_scale;
///
/// assert_eq!(volume_from_scale(5.0), 1.0);
/// assert_eq!(volume_from_scale(-3.0), 0.0);
/// assert_eq!(volume_from_scale(40.0), 2.0);
/// ```
#[inline]
pub fn volume_from_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 0.0;
    }
    (scale / NEUTRAL_VOLUME_SCALE as f32).clamp(0.0, MAX_VOLUME)
}

/// Converts a processed sample to `i16`, clamping to the 16-bit range.
///
/// Fractional parts are truncated toward zero. NaN becomes 0.
#[inline]
pub fn clamp_i16(sample: f32) -> i16 {
    // `as` saturates and maps NaN to 0
    sample.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Reads the little-endian `i16` pair at the start of `bytes`.
///
/// Returns `None` when fewer than four bytes are available.
#[inline]
pub fn read_stereo_le(bytes: &[u8]) -> Option<(i16, i16)> {
    match bytes {
        [l0, l1, r0, r1, ..] => Some((
            i16::from_le_bytes([*l0, *l1]),
            i16::from_le_bytes([*r0, *r1]),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_neutral_is_unity() {
        assert_eq!(volume_from_scale(NEUTRAL_VOLUME_SCALE as f32), 1.0);
    }

    #[test]
    fn test_volume_scale_endpoints() {
        assert_eq!(volume_from_scale(0.0), 0.0);
        assert!((volume_from_scale(MAX_VOLUME_SCALE as f32) - 1.8).abs() < 1e-6);
        assert_eq!(volume_from_scale(10.0), MAX_VOLUME);
        assert_eq!(volume_from_scale(f32::NAN), 0.0);
    }

    #[test]
    fn test_clamp_i16() {
        assert_eq!(clamp_i16(40000.0), i16::MAX);
        assert_eq!(clamp_i16(-40000.0), i16::MIN);
        assert_eq!(clamp_i16(123.9), 123);
        assert_eq!(clamp_i16(-123.9), -123);
        assert_eq!(clamp_i16(f32::NAN), 0);
    }

    #[test]
    fn test_read_stereo_le() {
        assert_eq!(read_stereo_le(&[0x01, 0x00, 0xFF, 0xFF]), Some((1, -1)));
        assert_eq!(read_stereo_le(&[0x01, 0x00, 0xFF]), None);
    }
}
