// Parametric filter design (RBJ audio EQ cookbook)

use crate::catalogue::FilterBand;
use serde::Deserialize;
use std::f64::consts::PI;

/// Sample rate the unit runs its input PEQ at
pub const DEVICE_SAMPLE_RATE: f64 = 96_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FilterType {
    PeakingEQ,
    LowShelf,
    HighShelf,
}

/// A parametric filter as published in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FilterDefinition {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Centre or corner frequency in Hz
    pub freq: f64,
    /// Gain in dB
    pub gain: f64,
    pub q: f64,
}

impl FilterDefinition {
    /// Reason this filter cannot be realised at `sample_rate`, if any
    pub fn check(&self, sample_rate: f64) -> Option<String> {
        if !(self.freq.is_finite() && self.freq > 0.0 && self.freq < sample_rate / 2.0) {
            return Some(format!("frequency {} Hz out of range", self.freq));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return Some(format!("Q {} must be positive", self.q));
        }
        if !self.gain.is_finite() {
            return Some("gain is not finite".to_string());
        }
        None
    }

    /// Design the biquad at `sample_rate`, in device convention
    pub fn design(&self, sample_rate: f64) -> FilterBand {
        let a = 10f64.powf(self.gain / 40.0);
        let w0 = 2.0 * PI * self.freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * self.q);

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::PeakingEQ => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            FilterType::LowShelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + k),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - k),
                    (a + 1.0) + (a - 1.0) * cos_w0 + k,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - k,
                )
            }
            FilterType::HighShelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + k),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - k),
                    (a + 1.0) - (a - 1.0) * cos_w0 + k,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - k,
                )
            }
        };

        // Device wants normalised coefficients with inverted feedback terms
        FilterBand {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -a1 / a0,
            a2: -a2 / a0,
        }
    }
}
