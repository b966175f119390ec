/// Largest quantized climate value.
pub const CLIMATE_MAX: u8 = 15;

/// Quantized per-column climate sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Climate {
    pub temperature: u8,
    pub humidity: u8,
}

impl Climate {
    pub fn new(temperature: u8, humidity: u8) -> Self {
        Self {
            temperature: temperature.min(CLIMATE_MAX),
            humidity: humidity.min(CLIMATE_MAX),
        }
    }

    /// Maps a unit value onto `0..=CLIMATE_MAX`.
    #[inline]
    pub fn quantize(v: f32) -> u8 {
        (v.clamp(0.0, 1.0) * CLIMATE_MAX as f32).round() as u8
    }
}
