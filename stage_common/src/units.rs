//! Conversion between physical units and device pulse units.
//!
//! | Quantity     | Physical | Device      |
//! |--------------|----------|-------------|
//! | Position     | mm       | pulse       |
//! | Velocity     | m/s      | pulse/ms    |
//! | Acceleration | m/s²     | pulse/ms²   |
//!
//! m/s equals mm/ms, so velocity scales by `pulse_per_mm` directly and
//! acceleration by `pulse_per_mm / 1000`.

use crate::consts::FALLBACK_PULSE_PER_MM;
use serde::{Deserialize, Serialize};

/// Per-axis unit converter.
///
/// Holds the configured scale verbatim; a scale <= 0 is replaced by
/// [`FALLBACK_PULSE_PER_MM`] whenever it is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConverter {
    pulse_per_mm: f64,
}

impl UnitConverter {
    /// Create a converter from the configured pulses per millimetre.
    pub const fn new(pulse_per_mm: f64) -> Self {
        Self { pulse_per_mm }
    }

    /// Configured scale, as stored.
    pub const fn configured_scale(&self) -> f64 {
        self.pulse_per_mm
    }

    /// Scale actually used for conversion.
    #[inline]
    pub fn scale(&self) -> f64 {
        if self.pulse_per_mm <= 0.0 {
            FALLBACK_PULSE_PER_MM
        } else {
            self.pulse_per_mm
        }
    }

    /// m/s² → pulse/ms².
    #[inline]
    pub fn acceleration_to_device(&self, mpss: f64) -> f64 {
        mpss * self.scale() / 1000.0
    }

    /// m/s → pulse/ms.
    #[inline]
    pub fn velocity_to_device(&self, mps: f64) -> f64 {
        mps * self.scale()
    }

    /// mm → whole pulses, rounded to nearest.
    #[inline]
    pub fn mm_to_pulses(&self, mm: f64) -> i32 {
        (mm * self.scale()).round() as i32
    }

    /// pulses → mm.
    #[inline]
    pub fn pulses_to_mm(&self, pulses: f64) -> f64 {
        pulses / self.scale()
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(FALLBACK_PULSE_PER_MM)
    }
}
