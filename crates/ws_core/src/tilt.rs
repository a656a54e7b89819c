use serde::{Deserialize, Serialize};

/// Planet axial tilt setting.
///
/// Tilt controls how strongly seasonal temperature swings scale with
/// distance from the equator; it is a preset field, not a simulation
/// detail, so it is a small enum rather than a free angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxialTilt {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
    VeryHigh,
}

impl AxialTilt {
    /// All variants in slider order.
    pub fn all() -> &'static [AxialTilt] {
        &[
            Self::VeryLow,
            Self::Low,
            Self::Normal,
            Self::High,
            Self::VeryHigh,
        ]
    }

    /// Display name for UI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    /// Slider index (0-4).
    pub fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(2)
    }

    /// Variant for a slider index, clamped into range.
    pub fn from_index(index: usize) -> Self {
        let all = Self::all();
        all[index.min(all.len() - 1)]
    }

    /// Peak seasonal temperature swing (degrees C) at the poles.
    fn polar_amplitude(&self) -> f32 {
        match self {
            Self::VeryLow => 3.0,
            Self::Low => 8.0,
            Self::Normal => 18.0,
            Self::High => 28.0,
            Self::VeryHigh => 40.0,
        }
    }

    /// Seasonal shift amplitude at a normalized distance from the
    /// equator (0.0 = equator, 1.0 = pole). Grows quadratically so the
    /// tropics stay mild even at high tilt.
    pub fn seasonal_amplitude(&self, distance_from_equator: f32) -> f32 {
        let d = distance_from_equator.clamp(0.0, 1.0);
        self.polar_amplitude() * d * d
    }
}
