use crate::error::FireError;
use serde::{Deserialize, Serialize};

/// Largest precision the random draw accepts
pub const MAX_PRECISION_BITS: u32 = 64;

/// Tunable fire parameters, read by the simulation on every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireSettings {
    /// Maximum intensity lost per step, scaled by the random draw (>= 0)
    pub fade_speed: f32,
    /// Lateral displacement magnitude applied to the random draw
    pub spread: f32,
    /// Constant lateral bias (positive = drift right)
    pub wind: f32,
    /// Significant low bits of each random draw (0-64, 0 = no fade or spread)
    pub precision_bits: u32,
    /// Whether the bottom row burns (255) or is extinguished (0)
    pub fire_active: bool,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            fade_speed: 4.5,
            spread: 1.0,
            wind: 0.0,
            precision_bits: 16,
            fire_active: true,
        }
    }
}

impl FireSettings {
    /// Check every field, returning the first offending one
    pub fn validate(&self) -> Result<(), FireError> {
        check_fade_speed(self.fade_speed)?;
        check_finite("spread", self.spread)?;
        check_finite("wind", self.wind)?;
        check_precision_bits(self.precision_bits)?;
        Ok(())
    }

    /// Adjust fade speed within bounds
    pub fn adjust_fade_speed(&mut self, delta: f32) {
        self.fade_speed = (self.fade_speed + delta).clamp(0.0, 50.0);
    }

    /// Adjust spread within bounds
    pub fn adjust_spread(&mut self, delta: f32) {
        self.spread = (self.spread + delta).clamp(0.0, 10.0);
    }

    /// Adjust wind within bounds
    pub fn adjust_wind(&mut self, delta: f32) {
        self.wind = (self.wind + delta).clamp(-5.0, 5.0);
    }

    /// Adjust precision bits within bounds
    pub fn adjust_precision_bits(&mut self, delta: i32) {
        let bits = (self.precision_bits as i32 + delta).clamp(0, MAX_PRECISION_BITS as i32);
        self.precision_bits = bits as u32;
    }
}

pub(crate) fn check_fade_speed(value: f32) -> Result<(), FireError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FireError::InvalidParameter {
            name: "fade speed",
            value,
        })
    }
}

pub(crate) fn check_finite(name: &'static str, value: f32) -> Result<(), FireError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FireError::InvalidParameter { name, value })
    }
}

pub(crate) fn check_precision_bits(bits: u32) -> Result<(), FireError> {
    if bits <= MAX_PRECISION_BITS {
        Ok(())
    } else {
        Err(FireError::InvalidPrecision(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = FireSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.fire_active);
        assert_eq!(settings.precision_bits, 16);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_fade = FireSettings {
            fade_speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_fade.validate(),
            Err(FireError::InvalidParameter { name: "fade speed", .. })
        ));

        let bad_wind = FireSettings {
            wind: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad_wind.validate(),
            Err(FireError::InvalidParameter { name: "wind", .. })
        ));

        let bad_bits = FireSettings {
            precision_bits: 65,
            ..Default::default()
        };
        assert_eq!(bad_bits.validate(), Err(FireError::InvalidPrecision(65)));
    }

    #[test]
    fn test_adjust_clamps() {
        let mut settings = FireSettings::default();
        settings.adjust_fade_speed(-100.0);
        assert_eq!(settings.fade_speed, 0.0);
        settings.adjust_wind(100.0);
        assert_eq!(settings.wind, 5.0);
        settings.adjust_precision_bits(-20);
        assert_eq!(settings.precision_bits, 0);
        settings.adjust_precision_bits(200);
        assert_eq!(settings.precision_bits, 64);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: FireSettings = serde_json::from_str(r#"{"wind": 1.5}"#).unwrap();
        assert_eq!(parsed.wind, 1.5);
        assert_eq!(parsed.fade_speed, 4.5);
        assert!(parsed.fire_active);
    }
}
