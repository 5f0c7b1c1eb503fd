// Gain range validation per target kind

use std::ops::RangeInclusive;

/// Master volume range in dB
pub const MASTER_GAIN_RANGE: RangeInclusive<f64> = -127.0..=0.0;

/// Per-input gain range in dB
pub const INPUT_GAIN_RANGE: RangeInclusive<f64> = -72.0..=12.0;

/// What a gain value is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Master,
    Input,
}

impl TargetKind {
    /// Inclusive valid range for this target
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            TargetKind::Master => MASTER_GAIN_RANGE,
            TargetKind::Input => INPUT_GAIN_RANGE,
        }
    }
}

/// Check a gain value against the range of its target, bounds inclusive
///
/// Non-finite values are never valid.
pub fn validate(kind: TargetKind, value: f64) -> bool {
    kind.range().contains(&value)
}
